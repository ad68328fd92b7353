//! Node assembly: wires the circulator, recorder, routes and issuer together.

use std::sync::Arc;

use anyhow::Result;
use ring_core::{Circulator, StatusRecorder};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

use crate::config::NodeConfig;
use crate::http_transport::HttpTransport;
use crate::issuer::{spawn_issuer, stopped};
use crate::server::NodeServer;
use crate::{status_api, token_api};

/// A fully wired ring node, ready to serve.
pub struct RingNode {
    config: NodeConfig,
    circulator: Arc<Circulator>,
    recorder: Arc<StatusRecorder>,
}

impl RingNode {
    pub fn new(config: NodeConfig) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(config.request_timeout)?);
        let recorder = Arc::new(StatusRecorder::new());
        let circulator = Arc::new(Circulator::new(
            config.identity.clone(),
            transport,
            Arc::clone(&recorder),
        ));

        Ok(Self {
            config,
            circulator,
            recorder,
        })
    }

    pub fn recorder(&self) -> &Arc<StatusRecorder> {
        &self.recorder
    }

    /// Build the server with token and status routes registered.
    pub fn server(&self) -> NodeServer {
        NodeServer::new()
            .register(token_api::routes(Arc::clone(&self.circulator)))
            .register(status_api::routes(Arc::clone(&self.recorder)))
    }

    /// Serve on `listener` until `shutdown` flips to `true`.
    ///
    /// Initiator nodes also run the periodic issuer, which is stopped through
    /// the same signal.
    pub async fn run(self, listener: TcpListener, shutdown: watch::Receiver<bool>) -> Result<()> {
        let issuer = self.config.initiator.then(|| {
            spawn_issuer(
                Arc::clone(&self.circulator),
                self.config.schedule,
                shutdown.clone(),
            )
        });

        let mut server_shutdown = shutdown;
        let result = self
            .server()
            .serve(listener, async move {
                stopped(&mut server_shutdown).await;
            })
            .await;

        if let Some(issuer) = issuer {
            issuer.abort();
        }

        info!("Node {} shut down", self.config.identity.id);
        result
    }
}
