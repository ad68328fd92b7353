//! End-to-end tests for ring-node.
//!
//! Starts real nodes on local ports and passes tokens between them over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use ring_core::{NodeIdentity, StatusRecorder};
use ring_node::{IssueSchedule, NodeConfig, RingNode, StatusResponse};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::timeout;

/// A node running in the background of a test.
struct TestNode {
    public_addr: String,
    recorder: Arc<StatusRecorder>,
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<anyhow::Result<()>>,
}

impl TestNode {
    async fn stop(self) {
        self.shutdown.send(true).unwrap();
        timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("Node did not shut down")
            .expect("Node task panicked")
            .expect("Node returned an error");
    }
}

// ============================================================================
// Helpers
// ============================================================================

async fn bind() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get local addr");
    (listener, addr)
}

fn url(addr: SocketAddr) -> String {
    format!("http://{}", addr)
}

fn config(id: &str, addr: SocketAddr, neighbor: Option<String>, initiator: bool) -> NodeConfig {
    NodeConfig {
        identity: NodeIdentity::new(id, addr.to_string(), Some(url(addr)), neighbor),
        initiator,
        schedule: IssueSchedule {
            initial_delay: Duration::ZERO,
            interval: Duration::from_secs(3600),
        },
        request_timeout: Duration::from_secs(2),
    }
}

fn start(config: NodeConfig, listener: TcpListener) -> TestNode {
    let public_addr = config.identity.public_addr.clone();
    let node = RingNode::new(config).expect("Failed to build node");
    let recorder = Arc::clone(node.recorder());
    let (shutdown, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(node.run(listener, shutdown_rx));

    TestNode {
        public_addr,
        recorder,
        shutdown,
        handle,
    }
}

/// Start `ids.len()` nodes wired into a closed ring, in order.
async fn start_ring(ids: &[&str]) -> Vec<TestNode> {
    let mut bound = Vec::new();
    for _ in ids {
        bound.push(bind().await);
    }

    let addrs: Vec<SocketAddr> = bound.iter().map(|(_, addr)| *addr).collect();
    bound
        .into_iter()
        .enumerate()
        .map(|(i, (listener, addr))| {
            let neighbor = url(addrs[(i + 1) % addrs.len()]);
            start(config(ids[i], addr, Some(neighbor), false), listener)
        })
        .collect()
}

async fn get_status(node: &TestNode) -> StatusResponse {
    reqwest::get(format!("{}/status", node.public_addr))
        .await
        .expect("Status request failed")
        .json()
        .await
        .expect("Invalid status JSON")
}

async fn post_issue(node: &TestNode) {
    let response = reqwest::Client::new()
        .post(format!("{}/issue", node.public_addr))
        .send()
        .await
        .expect("Issue request failed");
    assert_eq!(response.status(), reqwest::StatusCode::ACCEPTED);
}

/// Poll `/status` until it reports a completed traversal.
async fn wait_for_ok(node: &TestNode) -> StatusResponse {
    timeout(Duration::from_secs(10), async {
        loop {
            let status = get_status(node).await;
            if status.status == "ok" {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
    })
    .await
    .expect("Timed out waiting for a completed traversal")
}

// ============================================================================
// Ring traversal
// ============================================================================

#[tokio::test]
async fn test_three_node_ring_completes() {
    let nodes = start_ring(&["a", "b", "c"]).await;

    assert_eq!(get_status(&nodes[0]).await.status, "pending");

    post_issue(&nodes[0]).await;
    let status = wait_for_ok(&nodes[0]).await;

    let expected: Vec<String> = nodes.iter().map(|n| n.public_addr.clone()).collect();
    assert_eq!(status.signers, Some(expected));
    assert!(status.last_completed_at.is_some());
    assert!(status.message.is_none());

    // Non-issuers never record
    assert_eq!(get_status(&nodes[1]).await.status, "pending");
    assert_eq!(get_status(&nodes[2]).await.status, "pending");

    for node in nodes {
        node.stop().await;
    }
}

#[tokio::test]
async fn test_initiator_issues_on_startup() {
    let (listener, addr) = bind().await;
    let node = start(config("solo", addr, None, true), listener);

    let status = wait_for_ok(&node).await;
    assert_eq!(status.signers, Some(vec![url(addr)]));

    node.stop().await;
}

#[tokio::test]
async fn test_dead_neighbor_returns_token_to_issuer() {
    let (listener_a, addr_a) = bind().await;
    let (listener_b, addr_b) = bind().await;
    // Reserve a port, then free it so nothing answers there
    let (dead, addr_dead) = bind().await;
    drop(dead);

    let a = start(config("a", addr_a, Some(url(addr_b)), false), listener_a);
    let b = start(config("b", addr_b, Some(url(addr_dead)), false), listener_b);

    post_issue(&a).await;
    let status = wait_for_ok(&a).await;

    assert_eq!(status.signers, Some(vec![url(addr_a), url(addr_b)]));

    a.stop().await;
    b.stop().await;
}

#[tokio::test]
async fn test_lost_token_leaves_status_pending() {
    // b's neighbor and the issuer are both gone by the time b forwards
    let (listener_b, addr_b) = bind().await;
    let (dead, addr_dead) = bind().await;
    drop(dead);

    let b = start(config("b", addr_b, Some(url(addr_dead)), false), listener_b);

    let token = serde_json::json!({
        "issuer": "a",
        "issued_at": 1_700_000_000,
        "signers": [url(addr_dead)],
    });
    let response = reqwest::Client::new()
        .post(format!("{}/token", b.public_addr))
        .json(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(b.recorder.read().is_none());
    assert_eq!(get_status(&b).await.status, "pending");

    b.stop().await;
}

// ============================================================================
// Endpoint behavior
// ============================================================================

#[tokio::test]
async fn test_malformed_token_rejected_over_http() {
    let (listener, addr) = bind().await;
    let node = start(config("a", addr, None, false), listener);

    let response = reqwest::Client::new()
        .post(format!("{}/token", node.public_addr))
        .header("content-type", "application/json")
        .body("{\"issuer\": 7}")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(response.text().await.unwrap(), "Invalid token format");
    assert!(node.recorder.read().is_none());

    node.stop().await;
}

#[tokio::test]
async fn test_own_token_closes_on_arrival() {
    let (listener, addr) = bind().await;
    let node = start(config("a", addr, Some("http://127.0.0.1:9".to_string()), false), listener);

    let token = serde_json::json!({
        "issuer": "a",
        "issued_at": 1_700_000_000,
        "signers": [],
    });
    reqwest::Client::new()
        .post(format!("{}/token", node.public_addr))
        .json(&token)
        .send()
        .await
        .unwrap();

    let status = wait_for_ok(&node).await;
    assert_eq!(status.signers, Some(vec![]));

    node.stop().await;
}
