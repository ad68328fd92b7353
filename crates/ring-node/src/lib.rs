//! ring-node library: exposes the node components for testing.
//!
//! This is a thin library layer over the binary, allowing integration tests
//! to start real nodes on local ports.

pub mod config;
pub mod http_transport;
pub mod issuer;
pub mod node;
pub mod server;
pub mod status_api;
pub mod token_api;

// Re-export key types for convenience
pub use config::{Cli, ConfigError, IssueSchedule, NodeConfig};
pub use http_transport::HttpTransport;
pub use node::RingNode;
pub use server::NodeServer;
pub use status_api::StatusResponse;
