//! Status recorder: single-slot store of the last completed traversal.
//!
//! Written by the circulator when a token returns to its issuer, read by the
//! status endpoint. Uses a `RwLock` so concurrent readers never wait on each
//! other and a writer only holds the lock long enough to swap the slot.

use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::Token;

/// A token that made it all the way around the ring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletedTraversal {
    /// ID of the issuing node
    pub issuer: String,
    /// When the token was issued, in seconds since the Unix epoch
    pub issued_at: i64,
    /// When the token arrived back at its issuer
    pub completed_at: DateTime<Utc>,
    /// Full path, issuer first
    pub signers: Vec<String>,
}

impl CompletedTraversal {
    pub fn from_token(token: &Token, completed_at: DateTime<Utc>) -> Self {
        Self {
            issuer: token.issuer.clone(),
            issued_at: token.issued_at,
            completed_at,
            signers: token.signers.clone(),
        }
    }
}

/// Concurrency-safe holder of the most recent `CompletedTraversal`.
///
/// Share it with `Arc<StatusRecorder>`. Both operations are infallible: a
/// poisoned lock still holds a fully written value, so it is recovered
/// rather than propagated.
#[derive(Debug, Default)]
pub struct StatusRecorder {
    last_completed: RwLock<Option<CompletedTraversal>>,
}

impl StatusRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a copy of `token` as the latest completed traversal, replacing
    /// any previous one. Last writer wins.
    pub fn record(&self, token: &Token) {
        self.record_at(token, Utc::now());
    }

    /// Same as `record` with an explicit completion time.
    pub fn record_at(&self, token: &Token, completed_at: DateTime<Utc>) {
        // Build the copy before taking the lock
        let traversal = CompletedTraversal::from_token(token, completed_at);
        *self
            .last_completed
            .write()
            .unwrap_or_else(|e| e.into_inner()) = Some(traversal);
    }

    /// Copy of the latest completed traversal, or `None` if no token has
    /// returned yet.
    pub fn read(&self) -> Option<CompletedTraversal> {
        self.last_completed
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}
