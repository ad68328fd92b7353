//! Token circulator: forwarding and fallback decisions for one node.
//!
//! Per-token lifecycle:
//! 1. `issue()` creates a token signed by this node and forwards it
//! 2. Every other node `receive()`s it, signs it, and forwards it
//! 3. When the issuer receives it back, the traversal is recorded
//!
//! If a hop cannot reach its neighbor, the token is sent straight back to
//! the issuer (`signers[0]`) instead of being lost. If the issuer cannot be
//! reached either, the token is dropped. Fallbacks never go to a third node,
//! so a broken link cannot cause forwarding loops.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::transport::{Delivery, TokenTransport, TransportError};
use crate::{NodeIdentity, StatusRecorder, Token};

/// Result of handing a token to this node.
#[derive(Debug)]
pub enum Receipt {
    /// This node issued the token; the traversal was recorded
    Closed,
    /// The token was signed and passed on
    Forwarded(ForwardOutcome),
    /// The token was refused before signing
    Dropped(DropReason),
}

/// What happened to a token after a forward attempt.
#[derive(Debug)]
pub enum ForwardOutcome {
    /// The neighbor acknowledged the token
    Delivered,
    /// The neighbor answered with a non-success status; counted as forwarded
    Anomaly { status: u16 },
    /// The neighbor was missing or unreachable; the token went back to its issuer
    ReturnedToIssuer,
    /// The token is gone for good
    Dropped(DropReason),
}

/// Why a token was dropped.
#[derive(Debug)]
pub enum DropReason {
    /// No issuer address to fall back to
    EmptySigners,
    /// The fallback delivery to the issuer failed too
    IssuerUnreachable(TransportError),
}

/// Token-passing logic for a single node.
///
/// Holds no per-token state: every call works only from the token payload
/// and the static identity, so calls for different tokens run concurrently.
pub struct Circulator {
    identity: NodeIdentity,
    transport: Arc<dyn TokenTransport>,
    recorder: Arc<StatusRecorder>,
}

impl Circulator {
    pub fn new(
        identity: NodeIdentity,
        transport: Arc<dyn TokenTransport>,
        recorder: Arc<StatusRecorder>,
    ) -> Self {
        Self {
            identity,
            transport,
            recorder,
        }
    }

    pub fn identity(&self) -> &NodeIdentity {
        &self.identity
    }

    pub fn recorder(&self) -> &Arc<StatusRecorder> {
        &self.recorder
    }

    /// Create a new token signed by this node and send it around the ring.
    pub async fn issue(&self) -> ForwardOutcome {
        info!("Node {} is issuing a new token", self.identity.id);
        let token = Token::issue(
            self.identity.id.clone(),
            Utc::now().timestamp(),
            self.identity.public_addr.clone(),
        );
        self.forward(&token).await
    }

    /// Handle a token delivered to this node.
    ///
    /// Closes the loop if this node is the issuer, whatever `signers`
    /// contains. Otherwise signs and forwards. A foreign token without an
    /// issuer address is dropped unsigned, so this node never becomes its
    /// fallback target.
    pub async fn receive(&self, mut token: Token) -> Receipt {
        debug!(
            "Node {} received token from issuer {} ({} signer(s))",
            self.identity.id,
            token.issuer,
            token.hops()
        );

        if token.issuer == self.identity.id {
            self.close(&token);
            return Receipt::Closed;
        }

        if self.lacks_return_path(&token) {
            error!(
                "Dropping token from issuer {}: signers list is empty",
                token.issuer
            );
            return Receipt::Dropped(DropReason::EmptySigners);
        }

        token.sign(self.identity.public_addr.clone());
        Receipt::Forwarded(self.forward(&token).await)
    }

    /// Whether `token` is someone else's and carries no issuer address.
    pub fn lacks_return_path(&self, token: &Token) -> bool {
        token.issuer != self.identity.id && token.signers.is_empty()
    }

    /// Send the token to the neighbor, falling back to the issuer if the
    /// neighbor is missing or unreachable.
    pub async fn forward(&self, token: &Token) -> ForwardOutcome {
        let Some(neighbor) = self.identity.neighbor.as_deref() else {
            debug!("Node {} has no neighbor", self.identity.id);
            return self.return_to_issuer(token).await;
        };

        debug!(
            "Node {} forwarding token to neighbor {}",
            self.identity.id, neighbor
        );

        match self.transport.deliver(neighbor, token).await {
            Ok(Delivery::Acknowledged) => {
                info!("Token forwarded to neighbor {}", neighbor);
                ForwardOutcome::Delivered
            }
            Ok(Delivery::Rejected { status }) => {
                // Reachable neighbor: no fallback, no retry
                warn!("Neighbor {} returned non-OK status {}", neighbor, status);
                ForwardOutcome::Anomaly { status }
            }
            Err(e) => {
                warn!("Neighbor {} is unreachable: {}", neighbor, e);
                self.return_to_issuer(token).await
            }
        }
    }

    /// Single direct delivery to `signers[0]`. Failure drops the token.
    pub async fn return_to_issuer(&self, token: &Token) -> ForwardOutcome {
        let Some(issuer_address) = token.issuer_address() else {
            error!(
                "Cannot return token from issuer {} to its issuer: signers list is empty",
                token.issuer
            );
            return ForwardOutcome::Dropped(DropReason::EmptySigners);
        };

        info!("Returning token to issuer at {}", issuer_address);

        match self.transport.deliver(issuer_address, token).await {
            Ok(Delivery::Acknowledged) => {
                info!("Token returned to issuer {}", token.issuer);
                ForwardOutcome::ReturnedToIssuer
            }
            Ok(Delivery::Rejected { status }) => {
                warn!(
                    "Issuer {} returned non-OK status {} for returned token",
                    issuer_address, status
                );
                ForwardOutcome::ReturnedToIssuer
            }
            Err(e) => {
                error!(
                    "Token from issuer {} lost: failed to return it to {}: {}",
                    token.issuer, issuer_address, e
                );
                ForwardOutcome::Dropped(DropReason::IssuerUnreachable(e))
            }
        }
    }

    fn close(&self, token: &Token) {
        info!(
            issuer = %token.issuer,
            hops = token.hops(),
            path = ?token.signers,
            "Ring health check result: token returned to its issuer"
        );
        self.recorder.record(token);
    }
}
