//! Token: the traversal record passed around the ring.
//!
//! Serialized as JSON on the wire:
//! `{"issuer": "a", "issued_at": 1700000000, "signers": ["http://a:8080"]}`

use serde::{Deserialize, Serialize};

/// A traversal record in flight.
///
/// `signers` holds the public addresses of every node that handled the token,
/// in hop order. The first entry is the issuer's own address and is the only
/// place a failing hop can send the token back to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// ID of the node that created this token
    pub issuer: String,
    /// Creation time in seconds since the Unix epoch
    pub issued_at: i64,
    /// Public addresses of the nodes visited so far (issuer first)
    #[serde(default)]
    pub signers: Vec<String>,
}

impl Token {
    /// Create a fresh token signed only by its issuer.
    pub fn issue(issuer: impl Into<String>, issued_at: i64, issuer_address: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            issued_at,
            signers: vec![issuer_address.into()],
        }
    }

    /// Address the token falls back to when a hop fails.
    pub fn issuer_address(&self) -> Option<&str> {
        self.signers.first().map(String::as_str)
    }

    /// Append a node's public address. Entries are never removed or reordered.
    pub fn sign(&mut self, address: impl Into<String>) {
        self.signers.push(address.into());
    }

    /// Number of nodes that have signed, issuer included.
    pub fn hops(&self) -> usize {
        self.signers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_signs_with_issuer_address() {
        let token = Token::issue("a", 1_700_000_000, "http://localhost:8080");

        assert_eq!(token.issuer, "a");
        assert_eq!(token.issued_at, 1_700_000_000);
        assert_eq!(token.signers, vec!["http://localhost:8080"]);
        assert_eq!(token.issuer_address(), Some("http://localhost:8080"));
    }

    #[test]
    fn test_sign_appends_in_order() {
        let mut token = Token::issue("a", 0, "http://a");
        token.sign("http://b");
        token.sign("http://c");

        assert_eq!(token.signers, vec!["http://a", "http://b", "http://c"]);
        assert_eq!(token.issuer_address(), Some("http://a"));
        assert_eq!(token.hops(), 3);
    }

    #[test]
    fn test_wire_format() {
        let token = Token::issue("node-1", 42, "http://localhost:8080");
        let json = serde_json::to_value(&token).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "issuer": "node-1",
                "issued_at": 42,
                "signers": ["http://localhost:8080"],
            })
        );
    }

    #[test]
    fn test_missing_signers_decodes_as_empty() {
        let token: Token = serde_json::from_str(r#"{"issuer":"a","issued_at":1}"#).unwrap();
        assert!(token.signers.is_empty());
        assert_eq!(token.issuer_address(), None);
    }

    #[test]
    fn test_rejects_malformed_payloads() {
        assert!(serde_json::from_str::<Token>("not json").is_err());
        assert!(serde_json::from_str::<Token>(r#"{"issued_at":1,"signers":[]}"#).is_err());
        assert!(serde_json::from_str::<Token>(r#"{"issuer":"a","issued_at":"soon"}"#).is_err());
        assert!(serde_json::from_str::<Token>(r#"{"issuer":"a","issued_at":1,"signers":[3]}"#).is_err());
    }
}
