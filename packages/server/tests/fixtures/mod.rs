//! Test fixtures for integration tests.
//!
//! Starts the gateway in-process on an ephemeral loopback port.

#![allow(dead_code)]

use std::{net::SocketAddr, time::Duration};

use boatdash_server::{GatewayConfig, ServerError, domain::Ipv4Cidr};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};

/// Running gateway, shut down when dropped
pub struct TestServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<Result<(), ServerError>>>,
}

impl TestServer {
    /// Gateway whose access-point subnet does not contain loopback peers
    pub async fn start() -> Self {
        Self::start_with(Self::config()).await
    }

    /// Gateway that treats loopback peers as access-point clients
    pub async fn start_local() -> Self {
        Self::start_with(GatewayConfig {
            ap_subnet: loopback_subnet(),
            ..Self::config()
        })
        .await
    }

    /// Default test configuration: no snapshot ticker, short timeouts
    pub fn config() -> GatewayConfig {
        GatewayConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            telemetry_interval_ms: 0,
            read_timeout_ms: 500,
            send_timeout_ms: 200,
            ..GatewayConfig::default()
        }
    }

    pub async fn start_with(config: GatewayConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(boatdash_server::serve(listener, config, async move {
            let _ = shutdown_rx.await;
        }));

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    /// Trigger graceful shutdown and wait for the server to stop
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            tokio::time::timeout(Duration::from_secs(5), task)
                .await
                .expect("Server did not stop in time")
                .expect("Server task panicked")
                .expect("Server returned an error");
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub fn loopback_subnet() -> Ipv4Cidr {
    "127.0.0.0/8".parse().expect("valid CIDR")
}

/// Poll `/api/clients` until `connected` equals `expected`
pub async fn wait_for_clients(server: &TestServer, expected: u64) {
    let client = reqwest::Client::new();
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let body: serde_json::Value = client
            .get(format!("{}/api/clients", server.base_url()))
            .send()
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse JSON");
        if body["connected"] == expected {
            return;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "expected {expected} clients, registry reports {body}"
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
