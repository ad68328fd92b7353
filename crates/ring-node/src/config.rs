//! Command-line and environment configuration.

use std::time::Duration;

use clap::Parser;
use ring_core::NodeIdentity;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required flag: --id must be a non-empty node ID")]
    MissingId,

    #[error("--interval-secs must be greater than zero")]
    ZeroInterval,

    #[error("--request-timeout-secs must be greater than zero")]
    ZeroTimeout,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "ring-node")]
#[command(about = "Ring health check node: passes a token around a ring of neighbors")]
pub struct Cli {
    /// ID of this node
    #[arg(long, env = "RING_NODE_ID")]
    pub id: String,

    /// Address to listen on (e.g. ":8080" or "127.0.0.1:8080")
    #[arg(long, default_value = ":8080", env = "RING_LISTEN_ADDR")]
    pub addr: String,

    /// Publicly reachable URL (defaults to http://localhost:PORT)
    #[arg(long, env = "RING_PUBLIC_ADDR")]
    pub public_addr: Option<String>,

    /// Full address of the next node in the ring (e.g. http://localhost:8081)
    #[arg(long, env = "RING_NEIGHBOR")]
    pub neighbor: Option<String>,

    /// Issue tokens periodically from this node
    #[arg(long, env = "RING_INITIATOR")]
    pub initiator: bool,

    /// Delay before the first token is issued
    #[arg(long, default_value_t = 3, env = "RING_INITIAL_DELAY_SECS")]
    pub initial_delay_secs: u64,

    /// Interval between issued tokens
    #[arg(long, default_value_t = 15, env = "RING_INTERVAL_SECS")]
    pub interval_secs: u64,

    /// Timeout for delivering a token to another node
    #[arg(long, default_value_t = 10, env = "RING_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: u64,

    /// Enable verbose logging
    #[arg(long)]
    pub verbose: bool,
}

/// When an initiator issues tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssueSchedule {
    /// Wait before the first token, giving the rest of the ring time to start
    pub initial_delay: Duration,
    /// Time between tokens after the first
    pub interval: Duration,
}

impl Default for IssueSchedule {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(3),
            interval: Duration::from_secs(15),
        }
    }
}

/// Validated node configuration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub identity: NodeIdentity,
    /// Whether this node runs the periodic issuer
    pub initiator: bool,
    pub schedule: IssueSchedule,
    pub request_timeout: Duration,
}

impl NodeConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        if cli.id.trim().is_empty() {
            return Err(ConfigError::MissingId);
        }
        if cli.interval_secs == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if cli.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(Self {
            identity: NodeIdentity::new(
                cli.id.trim(),
                cli.addr.clone(),
                cli.public_addr.clone(),
                cli.neighbor.clone(),
            ),
            initiator: cli.initiator,
            schedule: IssueSchedule {
                initial_delay: Duration::from_secs(cli.initial_delay_secs),
                interval: Duration::from_secs(cli.interval_secs),
            },
            request_timeout: Duration::from_secs(cli.request_timeout_secs),
        })
    }
}
