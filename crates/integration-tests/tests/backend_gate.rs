//! Backend router, connectivity gate, and catalog feed over real sockets.

use std::sync::Arc;
use std::time::Duration;

use oakmint_core::ProductId;
use oakmint_integration_tests::{backend_router, base_url, spawn_backend};
use oakmint_storefront::catalog::feed;
use oakmint_storefront::gate::{ConnectivityGate, HttpHealthProbe};
use reqwest::{Client, StatusCode};
use tokio::net::TcpListener;

const FAST: Duration = Duration::from_millis(50);

fn gate_for(client: &Client, base: &url::Url) -> ConnectivityGate {
    let url = base.join("/api/health").expect("Valid health URL");
    ConnectivityGate::spawn(Arc::new(HttpHealthProbe::new(client.clone(), url)), FAST)
}

#[tokio::test]
async fn test_gate_opens_on_first_probe_when_backend_is_up() {
    let base = spawn_backend().await;
    let client = Client::new();

    let gate = gate_for(&client, &base);
    let connectivity = tokio::time::timeout(Duration::from_secs(5), gate.wait_until_ready())
        .await
        .expect("Gate should open");

    assert!(connectivity.connected);
    assert_eq!(connectivity.attempts, 0);
    assert!(gate.is_ready());
}

#[tokio::test]
async fn test_gate_retries_until_backend_starts() {
    // Reserve a port, release it, and start the backend there later.
    let reserved = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to reserve port");
    let addr = reserved.local_addr().expect("Listener has no address");
    drop(reserved);

    let client = Client::new();
    let gate = gate_for(&client, &base_url(addr));

    tokio::time::sleep(FAST * 4).await;
    let waiting = gate.current();
    assert!(!waiting.connected);
    assert!(waiting.attempts >= 1, "attempts: {}", waiting.attempts);

    let listener = TcpListener::bind(addr).await.expect("Failed to rebind port");
    tokio::spawn(async move {
        axum::serve(listener, backend_router()).await.expect("Test server error");
    });

    let ready = tokio::time::timeout(Duration::from_secs(5), gate.wait_until_ready())
        .await
        .expect("Gate should open once the backend is up");
    assert!(ready.connected);
    assert!(ready.attempts >= waiting.attempts);

    // Polling has stopped; the counter no longer moves.
    tokio::time::sleep(FAST * 3).await;
    assert_eq!(gate.current(), ready);
}

#[tokio::test]
async fn test_feed_fetches_bundled_catalog() {
    let base = spawn_backend().await;

    let catalog = feed::fetch(&Client::new(), &base)
        .await
        .expect("Feed should load");

    assert_eq!(catalog.len(), 16);
    let table = catalog
        .get_by_id(&ProductId::new("3"))
        .expect("Product 3 exists");
    assert_eq!(table.name, "Atlas Dining Table");
    assert_eq!(catalog.get_featured().len(), 8);
}

#[tokio::test]
async fn test_backend_status_codes() {
    let base = spawn_backend().await;
    let client = Client::new();

    let response = client
        .get(base.join("/api/products/999").expect("Valid URL"))
        .send()
        .await
        .expect("Request should complete");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client
        .get(base.join("/api/search?q=oak").expect("Valid URL"))
        .send()
        .await
        .expect("Request should complete");
    assert_eq!(response.status(), StatusCode::OK);
}
