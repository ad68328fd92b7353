//! HTTP server owning the node's route table.
//!
//! Components contribute their own `Router`s through `register()`; nothing
//! is registered globally. The server is built once at startup and consumed
//! by `serve()`.

use std::future::Future;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Default)]
pub struct NodeServer {
    router: Router,
}

impl NodeServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a component's routes into the table.
    pub fn register(mut self, routes: Router) -> Self {
        self.router = self.router.merge(routes);
        self
    }

    /// Final router with request tracing applied.
    pub fn into_router(self) -> Router {
        self.router.layer(TraceLayer::new_for_http())
    }

    /// Bind to an address and return the TCP listener.
    pub async fn bind(addr: &str) -> Result<TcpListener> {
        let listener = TcpListener::bind(addr).await?;
        info!("Node server listening on {}", listener.local_addr()?);
        Ok(listener)
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        axum::serve(listener, self.into_router())
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}
