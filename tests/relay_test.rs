//! Integration tests for the relay client against a running server

use face_enroll_agent::capture::{CaptureLoop, TickOutcome};
use face_enroll_agent::relay::{RelayClient, RelayConfig};
use face_enroll_agent::server::{run, ServerConfig, ECHO_PREFIX};
use face_enroll_agent::source::ScriptedSource;
use face_enroll_agent::store::create_shared_store;
use face_enroll_agent::Descriptor;
use std::path::PathBuf;
use std::time::Duration;

fn empty_dirs(name: &str) -> (PathBuf, PathBuf) {
    let base = std::env::temp_dir().join("face-enroll-relay-test").join(name);
    let static_dir = base.join("public");
    let models_dir = base.join("models");
    std::fs::create_dir_all(&static_dir).expect("Failed to create static dir");
    std::fs::create_dir_all(&models_dir).expect("Failed to create models dir");
    (static_dir, models_dir)
}

/// Start a server on a random port and return a loopback address for it.
async fn start_server(name: &str) -> (std::net::SocketAddr, tokio::sync::oneshot::Sender<()>) {
    let (static_dir, models_dir) = empty_dirs(name);
    let config = ServerConfig::new(0, static_dir, models_dir);
    let (addr, shutdown_tx) = run(config).await.expect("Failed to start server");
    tokio::time::sleep(Duration::from_millis(100)).await;

    // The server binds all interfaces; tests dial loopback.
    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], addr.port()));
    (addr, shutdown_tx)
}

#[tokio::test]
async fn test_send_descriptor_returns_labeled_echo() {
    let (addr, shutdown_tx) = start_server("send").await;

    let config = RelayConfig::new(addr.ip().to_string(), addr.port());
    let mut client = RelayClient::connect(&config)
        .await
        .expect("Failed to connect relay");

    let descriptor = Descriptor::new(vec![2.0, 3.0, 4.0]);
    let echo = client
        .send_descriptor(&descriptor)
        .await
        .expect("Send failed");

    assert_eq!(echo, format!("{ECHO_PREFIX}[2.0,3.0,4.0]"));

    client.close().await.expect("Close failed");
    let _ = shutdown_tx.send(());
}

#[tokio::test]
async fn test_capture_and_send_flow() {
    let (addr, shutdown_tx) = start_server("pipeline").await;

    // Two detection ticks feed the window before the user-triggered send.
    let store = create_shared_store();
    let source =
        ScriptedSource::from_descriptors(vec![vec![1.0, 2.0, 3.0], vec![3.0, 4.0, 5.0]]);
    let mut capture = CaptureLoop::new(source, 10, 3).with_store(store.clone());

    assert!(matches!(capture.tick().unwrap(), TickOutcome::Captured(_)));
    assert!(matches!(capture.tick().unwrap(), TickOutcome::Captured(_)));

    let snapshot = capture.latest().expect("No snapshot cached");
    assert_eq!(snapshot.averaged.values(), &[2.0, 3.0, 4.0]);
    assert_eq!(snapshot.scalar, 3.0);

    let config = RelayConfig::new(addr.ip().to_string(), addr.port());
    let mut client = RelayClient::connect(&config)
        .await
        .expect("Failed to connect relay");

    let echo = client
        .send_descriptor(&snapshot.averaged)
        .await
        .expect("Send failed");
    store.record_send();
    store.record_received(echo.clone());

    assert!(echo.starts_with(ECHO_PREFIX));
    assert_eq!(store.received_messages(), vec![echo]);
    assert_eq!(store.stats().sends, 1);

    client.close().await.expect("Close failed");
    let _ = shutdown_tx.send(());
}

#[tokio::test]
async fn test_connect_to_unreachable_relay_fails() {
    // Port 1 is never bound in the test environment.
    let config = RelayConfig::new("127.0.0.1", 1);
    let result = RelayClient::connect(&config).await;
    assert!(result.is_err());
}
