//! HTTP token delivery: `POST {address}/token` with a JSON body.

use std::time::Duration;

use async_trait::async_trait;
use ring_core::transport::{Delivery, Result, TokenTransport, TransportError};
use ring_core::Token;
use tracing::debug;

/// Path of the token-receive endpoint on every node.
pub const TOKEN_PATH: &str = "/token";

/// Delivers tokens over HTTP with a per-request timeout.
///
/// Timeouts and connection errors map to `TransportError`, which triggers the
/// circulator's fallback. Any HTTP response, whatever its status, means the
/// node was reached.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Full URL of a node's token endpoint.
    pub fn token_url(address: &str) -> String {
        format!("{}{}", address.trim_end_matches('/'), TOKEN_PATH)
    }
}

#[async_trait]
impl TokenTransport for HttpTransport {
    async fn deliver(&self, address: &str, token: &Token) -> Result<Delivery> {
        let url = Self::token_url(address);
        debug!("POST {} ({} signer(s))", url, token.hops());

        let response = self
            .client
            .post(&url)
            .json(token)
            .send()
            .await
            .map_err(|e| classify(address, e))?;

        let status = response.status();
        if status.is_success() {
            Ok(Delivery::Acknowledged)
        } else {
            Ok(Delivery::Rejected {
                status: status.as_u16(),
            })
        }
    }
}

fn classify(address: &str, e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout {
            address: address.to_string(),
        }
    } else if e.is_builder() {
        TransportError::Encode(e.to_string())
    } else {
        TransportError::Unreachable {
            address: address.to_string(),
            reason: e.to_string(),
        }
    }
}
