//! Shell startup: wait for the backend, then rehydrate the session.

use std::sync::Arc;

use oakmint_storefront::catalog::{Catalog, CatalogError, feed};
use oakmint_storefront::config::ShellConfig;
use oakmint_storefront::gate::{Connectivity, ConnectivityGate, HttpHealthProbe};
use oakmint_storefront::persistence::{FileStore, PersistenceError};
use oakmint_storefront::session::Session;
use oakmint_storefront::wallet::{JsonRpcWalletProvider, UnavailableWalletProvider, WalletProvider};
use thiserror::Error;
use tracing::{info, instrument};

/// Errors that can occur before the first command runs.
#[derive(Debug, Error)]
pub enum StartupError {
    /// Interrupted while waiting for the backend.
    #[error("Interrupted while waiting for the backend")]
    Interrupted,

    /// The poller stopped without reaching the backend.
    #[error("Backend never became ready")]
    BackendUnavailable,

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Block until the readiness endpoint answers, logging each retry.
///
/// Ctrl+C cancels the wait; dropping the gate stops the poller.
#[instrument(skip_all, fields(url = %config.health_url()))]
pub async fn wait_for_backend(
    config: &ShellConfig,
    client: &reqwest::Client,
) -> Result<Connectivity, StartupError> {
    let probe = Arc::new(HttpHealthProbe::new(client.clone(), config.health_url()));
    let gate = ConnectivityGate::spawn(probe, config.health_interval);
    let mut updates = gate.subscribe();

    let ready = async {
        loop {
            let current = *updates.borrow_and_update();
            if current.connected {
                return Some(current);
            }
            if current.attempts > 0 {
                info!(attempts = current.attempts, "Waiting for backend");
            }
            if updates.changed().await.is_err() {
                return None;
            }
        }
    };

    tokio::select! {
        connectivity = ready => {
            let connectivity = connectivity.ok_or(StartupError::BackendUnavailable)?;
            info!(attempts = connectivity.attempts, "Backend ready");
            Ok(connectivity)
        }
        _ = tokio::signal::ctrl_c() => Err(StartupError::Interrupted),
    }
}

/// Load the catalog and rehydrate cart and wallet from the data directory.
#[instrument(skip_all, fields(data_dir = %config.data_dir.display()))]
pub async fn open_session(config: &ShellConfig, client: &reqwest::Client) -> Result<Session, StartupError> {
    let catalog = match &config.catalog_path {
        Some(path) => Catalog::load(path)?,
        None => feed::fetch(client, &config.backend_url).await?,
    };

    let store = Arc::new(FileStore::open(&config.data_dir)?);

    let provider: Arc<dyn WalletProvider> = match config.wallet_rpc_endpoint() {
        Some(endpoint) => Arc::new(JsonRpcWalletProvider::new(client.clone(), endpoint)),
        None => Arc::new(UnavailableWalletProvider),
    };

    Ok(Session::start(catalog, provider, store).await)
}
