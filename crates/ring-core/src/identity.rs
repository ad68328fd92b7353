//! Static per-process identity of a ring node.

use std::fmt::{self, Display, Formatter};

/// Who this node is and where its single downstream neighbor lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIdentity {
    /// Unique node ID, compared against `Token::issuer`
    pub id: String,
    /// Address the node listens on (`:8080` or `host:port`)
    pub listen_addr: String,
    /// Base URL other nodes use to reach this node
    pub public_addr: String,
    /// Base URL of the next node in the ring (None = end of chain)
    pub neighbor: Option<String>,
}

impl NodeIdentity {
    /// Build an identity, deriving the public address from the listen
    /// address when none is given.
    ///
    /// Empty strings count as unset. Trailing slashes are stripped from URLs
    /// so `{addr}/token` is always well-formed.
    pub fn new(
        id: impl Into<String>,
        listen_addr: impl Into<String>,
        public_addr: Option<String>,
        neighbor: Option<String>,
    ) -> Self {
        let listen_addr = listen_addr.into();
        let public_addr = non_empty(public_addr)
            .map(|addr| trim_url(&addr))
            .unwrap_or_else(|| default_public_addr(&listen_addr));
        let neighbor = non_empty(neighbor).map(|addr| trim_url(&addr));

        Self {
            id: id.into(),
            listen_addr,
            public_addr,
            neighbor,
        }
    }

    /// Socket address to bind the listener to.
    ///
    /// `:8080` binds every interface, anything else is used as-is.
    pub fn bind_addr(&self) -> String {
        if self.listen_addr.starts_with(':') {
            format!("0.0.0.0{}", self.listen_addr)
        } else {
            self.listen_addr.clone()
        }
    }

    /// Whether this node is the last one in the chain.
    pub fn is_end_of_chain(&self) -> bool {
        self.neighbor.is_none()
    }
}

impl Display for NodeIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id={}, addr={}, public_addr={}, neighbor={}",
            self.id,
            self.listen_addr,
            self.public_addr,
            self.neighbor.as_deref().unwrap_or("<none>")
        )
    }
}

/// `http://localhost:PORT` for wildcard or missing hosts, `http://HOST:PORT` otherwise.
fn default_public_addr(listen_addr: &str) -> String {
    let (host, port) = match listen_addr.rsplit_once(':') {
        Some((host, port)) => (host, port),
        None => ("", listen_addr),
    };

    let host = host.trim_start_matches('[').trim_end_matches(']');
    let host = match host {
        "" | "0.0.0.0" | "::" => "localhost",
        other => other,
    };

    if host.contains(':') {
        format!("http://[{}]:{}", host, port)
    } else {
        format!("http://{}:{}", host, port)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn trim_url(addr: &str) -> String {
    addr.trim().trim_end_matches('/').to_string()
}
