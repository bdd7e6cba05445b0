//! Integration tests for Oakmint.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p oakmint-integration-tests
//! ```
//!
//! Everything runs in-process: the backend router and a mock wallet node are
//! served on ephemeral loopback ports, and snapshots go to temp directories.
//!
//! # Test Categories
//!
//! - `backend_gate` - Backend router, connectivity gate, catalog feed
//! - `session_reload` - Cart and wallet rehydration across restarts
//! - `wallet_rpc` - JSON-RPC wallet provider against a mock node

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use oakmint_core::WalletAddress;
use oakmint_storefront::catalog::Catalog;
use oakmint_storefront::config::{SentryConfig, StorefrontConfig};
use oakmint_storefront::routes;
use oakmint_storefront::state::AppState;
use oakmint_storefront::wallet::{ConnectError, WalletProvider};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use url::Url;

/// Serve `app` on an ephemeral loopback port and return its base URL.
pub async fn serve(app: Router) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server error");
    });
    base_url(addr)
}

/// Serve the catalog backend with the bundled dataset.
pub async fn spawn_backend() -> Url {
    serve(backend_router()).await
}

/// The backend router over the bundled dataset.
pub fn backend_router() -> Router {
    let config = StorefrontConfig {
        host: [127, 0, 0, 1].into(),
        port: 0,
        catalog_path: None,
        sentry: SentryConfig::default(),
    };
    let catalog = Catalog::bundled().expect("Bundled catalog is valid");
    routes::router(AppState::new(config, catalog))
}

/// `http://<addr>`.
pub fn base_url(addr: SocketAddr) -> Url {
    Url::parse(&format!("http://{addr}")).expect("Loopback address is a valid URL")
}

/// A deterministic wallet address ending in `last` repeated.
pub fn address(last: char) -> WalletAddress {
    WalletAddress::parse(&format!("0x{}", last.to_string().repeat(40))).expect("Valid test address")
}

/// Provider with a fixed authorized account.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    account: Option<WalletAddress>,
}

impl StaticProvider {
    pub const fn new(account: Option<WalletAddress>) -> Self {
        Self { account }
    }
}

#[async_trait]
impl WalletProvider for StaticProvider {
    async fn request_accounts(&self) -> Result<WalletAddress, ConnectError> {
        self.account.clone().ok_or(ConnectError::UserRejected)
    }

    async fn current_accounts(&self) -> Option<WalletAddress> {
        self.account.clone()
    }
}

/// Scripted JSON-RPC wallet node.
#[derive(Debug, Clone, Default)]
pub struct MockNode {
    inner: Arc<Mutex<MockNodeState>>,
}

#[derive(Debug, Default)]
struct MockNodeState {
    accounts: Vec<String>,
    authorized: bool,
    request_error: Option<(i64, String)>,
    methods: Vec<String>,
}

impl MockNode {
    /// A node holding `accounts`, none authorized yet.
    pub fn with_accounts(accounts: &[&str]) -> Self {
        let node = Self::default();
        node.state().accounts = accounts.iter().map(ToString::to_string).collect();
        node
    }

    /// Answer `eth_requestAccounts` with a JSON-RPC error.
    pub fn fail_requests(&self, code: i64, message: &str) {
        self.state().request_error = Some((code, message.to_string()));
    }

    /// Answer `eth_requestAccounts` normally again.
    pub fn accept_requests(&self) {
        self.state().request_error = None;
    }

    /// Methods received, in order.
    pub fn methods(&self) -> Vec<String> {
        self.state().methods.clone()
    }

    /// Serve the node and return its endpoint.
    pub async fn spawn(&self) -> Url {
        serve(Router::new().route("/", post(rpc)).with_state(self.clone())).await
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockNodeState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn rpc(State(node): State<MockNode>, Json(request): Json<Value>) -> Json<Value> {
    let id = request.get("id").cloned().unwrap_or(Value::Null);
    let method = request
        .get("method")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let mut state = node.state();
    state.methods.push(method.clone());

    let body = match method.as_str() {
        "eth_requestAccounts" => match state.request_error.clone() {
            Some((code, message)) => json!({ "code": code, "message": message }),
            None => {
                state.authorized = true;
                return Json(json!({ "jsonrpc": "2.0", "id": id, "result": state.accounts }));
            }
        },
        "eth_accounts" => {
            let accounts = if state.authorized { state.accounts.clone() } else { Vec::new() };
            return Json(json!({ "jsonrpc": "2.0", "id": id, "result": accounts }));
        }
        _ => json!({ "code": -32601, "message": "Method not found" }),
    };

    Json(json!({ "jsonrpc": "2.0", "id": id, "error": body }))
}
