//! TokenTransport trait for delivering tokens between nodes.
//!
//! Implementations:
//! - HTTP: `POST {address}/token` with a JSON body (ring-node)
//! - In-memory simulated networks (tests)

use async_trait::async_trait;
use thiserror::Error;

use crate::Token;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Node unreachable at {address}: {reason}")]
    Unreachable { address: String, reason: String },

    #[error("Delivery to {address} timed out")]
    Timeout { address: String },

    #[error("Failed to encode token: {0}")]
    Encode(String),
}

pub type Result<T> = std::result::Result<T, TransportError>;

/// How a reachable node answered a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The remote endpoint accepted the token
    Acknowledged,
    /// The remote endpoint answered with a non-success status
    Rejected { status: u16 },
}

/// Sends a token to another node's token-receive endpoint.
///
/// `Err` means the node could not be reached at all (connection refused,
/// timeout, ...). A node that answers, even with an error status, returns
/// `Ok`.
#[async_trait]
pub trait TokenTransport: Send + Sync {
    async fn deliver(&self, address: &str, token: &Token) -> Result<Delivery>;
}
