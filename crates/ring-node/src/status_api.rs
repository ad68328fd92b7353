//! Status endpoints.
//!
//! - `GET /status`: last completed ring traversal, or "pending"
//! - `GET /health`: liveness probe

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use ring_core::StatusRecorder;
use serde::{Deserialize, Serialize};

/// Shown until the first token has come back around.
pub const PENDING_MESSAGE: &str = "No token has completed a full circle yet.";

/// JSON body of `GET /status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// "ok" or "pending"
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StatusResponse {
    fn from_recorder(recorder: &StatusRecorder) -> Self {
        match recorder.read() {
            Some(traversal) => Self {
                status: "ok".to_string(),
                last_completed_at: Some(traversal.completed_at),
                signers: Some(traversal.signers),
                message: None,
            },
            None => Self {
                status: "pending".to_string(),
                last_completed_at: None,
                signers: None,
                message: Some(PENDING_MESSAGE.to_string()),
            },
        }
    }
}

/// Routes for observing ring health.
pub fn routes(recorder: Arc<StatusRecorder>) -> Router {
    Router::new()
        .route("/status", get(status_handler))
        .route("/health", get(health))
        .with_state(recorder)
}

/// Handler for `GET /status`
async fn status_handler(State(recorder): State<Arc<StatusRecorder>>) -> Json<StatusResponse> {
    Json(StatusResponse::from_recorder(&recorder))
}

/// Handler for `GET /health`
async fn health() -> &'static str {
    "ok"
}
