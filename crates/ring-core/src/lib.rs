//! ring-core: Token circulation protocol for logical ring health checks.
//!
//! Each node knows exactly one downstream neighbor. A token issued by one node
//! travels hop-by-hop, collecting each node's public address, until it arrives
//! back at its issuer. This crate provides:
//! - The `Token` wire model and static `NodeIdentity`
//! - The `TokenTransport` trait the protocol sends through
//! - The `Circulator` forwarding/fallback state machine
//! - The `StatusRecorder` single-slot store of the last completed traversal

pub mod circulator;
pub mod identity;
pub mod status;
pub mod token;
pub mod transport;

pub use circulator::{Circulator, DropReason, ForwardOutcome, Receipt};
pub use identity::NodeIdentity;
pub use status::{CompletedTraversal, StatusRecorder};
pub use token::Token;
pub use transport::{Delivery, TokenTransport, TransportError};
