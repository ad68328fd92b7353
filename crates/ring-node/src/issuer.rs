//! Periodic token issuer.
//!
//! Runs as its own task: waits `initial_delay`, issues a token, then issues
//! one every `interval` until the shutdown channel flips to `true` (or its
//! sender is dropped). Each issue runs on a separate task so a slow neighbor
//! never pushes back the schedule.

use std::sync::Arc;

use ring_core::Circulator;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use crate::config::IssueSchedule;

/// Start the issuing loop for `circulator`.
pub fn spawn_issuer(
    circulator: Arc<Circulator>,
    schedule: IssueSchedule,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Issuer started: first token in {:?}, then every {:?}",
            schedule.initial_delay, schedule.interval
        );

        tokio::select! {
            _ = time::sleep(schedule.initial_delay) => {}
            _ = stopped(&mut shutdown) => {
                info!("Issuer stopped before first token");
                return;
            }
        }

        // First tick completes immediately
        let mut ticker = time::interval(schedule.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let circulator = Arc::clone(&circulator);
                    tokio::spawn(async move {
                        let outcome = circulator.issue().await;
                        debug!("Issued token outcome: {:?}", outcome);
                    });
                }
                _ = stopped(&mut shutdown) => {
                    info!("Issuer stopped");
                    return;
                }
            }
        }
    })
}

/// Resolves once shutdown is requested or the sender is gone.
pub(crate) async fn stopped(shutdown: &mut watch::Receiver<bool>) {
    while !*shutdown.borrow_and_update() {
        // A dropped sender also means stop
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}
