//! Token endpoints.
//!
//! - `POST /token`: receive a token from the previous node (or a fallback)
//! - `POST /issue`: operator trigger to issue a token right now

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use ring_core::{Circulator, Receipt, Token};
use tracing::{debug, warn};

use crate::http_transport::TOKEN_PATH;

/// Routes for token passing, backed by this node's circulator.
pub fn routes(circulator: Arc<Circulator>) -> Router {
    Router::new()
        .route(TOKEN_PATH, post(receive_handler))
        .route("/issue", post(issue_handler))
        .with_state(circulator)
}

/// Handler for `POST /token`
///
/// Malformed bodies, and foreign tokens with no issuer address to fall back
/// to, are rejected with 400 and never reach the circulator. Valid tokens
/// are handed to a background task, so the sender gets its acknowledgment
/// without waiting on the rest of the ring.
async fn receive_handler(
    State(circulator): State<Arc<Circulator>>,
    payload: Result<Json<Token>, JsonRejection>,
) -> impl IntoResponse {
    let token = match payload {
        Ok(Json(token)) => token,
        Err(rejection) => {
            warn!("Rejected malformed token: {}", rejection.body_text());
            return (StatusCode::BAD_REQUEST, "Invalid token format");
        }
    };

    if circulator.lacks_return_path(&token) {
        warn!(
            "Rejected token from issuer {}: signers list is empty",
            token.issuer
        );
        return (StatusCode::BAD_REQUEST, "Token has no signers");
    }

    debug!(
        "Node {} accepted token from issuer {}",
        circulator.identity().id,
        token.issuer
    );

    tokio::spawn(async move {
        if let Receipt::Forwarded(outcome) = circulator.receive(token).await {
            debug!("Forward finished: {:?}", outcome);
        }
    });

    (StatusCode::OK, "OK")
}

/// Handler for `POST /issue`
async fn issue_handler(State(circulator): State<Arc<Circulator>>) -> impl IntoResponse {
    tokio::spawn(async move {
        let outcome = circulator.issue().await;
        debug!("Manually issued token: {:?}", outcome);
    });

    (StatusCode::ACCEPTED, "Token issued")
}
