//! ring-node: one member of a ring health check.
//!
//! Serves:
//! - `POST /token`: token passing between nodes
//! - `POST /issue`: issue a token on demand
//! - `GET /status`: last completed traversal
//! - `GET /health`: liveness probe
//!
//! With `--initiator` the node also issues a token periodically.

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ring_node::server::NodeServer;
use ring_node::{Cli, NodeConfig, RingNode};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging - respects RUST_LOG env var, defaults to info (or debug with --verbose)
    let default_filter = if cli.verbose {
        "info,ring_node=debug,ring_core=debug,tower_http=debug"
    } else {
        "info,ring_node=info,ring_core=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = NodeConfig::from_cli(&cli).context("Invalid configuration")?;

    if config.identity.is_end_of_chain() {
        warn!("No neighbor specified. This node is the end of the chain.");
    }
    info!(
        "Starting node with config: {}, initiator={}",
        config.identity, config.initiator
    );

    let listener = NodeServer::bind(&config.identity.bind_addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.identity.listen_addr))?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    let node = RingNode::new(config)?;
    info!("API endpoint: /status, P2P endpoint: /token");
    node.run(listener, shutdown_rx).await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
