//! Wallet session state machine.
//!
//! ```text
//! Disconnected --connect--> Connecting --ok--> Connected
//!                               |                  |
//!                               +--err--> Failed   +--disconnect / account change--> Disconnected
//!                                           |
//!                                           +--connect--> Connecting
//! ```
//!
//! The session owns the only copy of the state and publishes every
//! transition on a `watch` channel. `connect()` is single-flight: while a
//! request is outstanding further calls return the current snapshot without
//! touching the provider. `disconnect()` during `Connecting` bumps a
//! generation counter so the late provider answer is discarded.

mod provider;
mod rpc;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use oakmint_core::{ConnectErrorKind, WalletAddress, WalletStatus};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::error::add_breadcrumb;
use crate::persistence::{self, SnapshotStore, keys};

pub use provider::{ConnectError, INSTALL_URL, UnavailableWalletProvider, WalletProvider};
pub use rpc::{JsonRpcWalletProvider, USER_REJECTED_CODE};

/// Point-in-time view of the wallet session.
///
/// `address` is present iff `Connected`; `last_error` iff `Failed`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletSnapshot {
    pub status: WalletStatus,
    pub address: Option<WalletAddress>,
    pub last_error: Option<ConnectError>,
}

impl WalletSnapshot {
    const fn connecting() -> Self {
        Self {
            status: WalletStatus::Connecting,
            address: None,
            last_error: None,
        }
    }

    const fn connected(address: WalletAddress) -> Self {
        Self {
            status: WalletStatus::Connected,
            address: Some(address),
            last_error: None,
        }
    }

    const fn failed(error: ConnectError) -> Self {
        Self {
            status: WalletStatus::Failed,
            address: None,
            last_error: Some(error),
        }
    }

    /// Tag of the last failure, if the session is `Failed`.
    #[must_use]
    pub fn last_error_kind(&self) -> Option<ConnectErrorKind> {
        self.last_error.as_ref().map(ConnectError::kind)
    }
}

/// What survives a restart: the last connected address.
#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedWallet {
    address: Option<WalletAddress>,
}

/// Shared wallet session. Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct WalletSession {
    inner: Arc<WalletSessionInner>,
}

struct WalletSessionInner {
    provider: Arc<dyn WalletProvider>,
    store: Arc<dyn SnapshotStore>,
    state: watch::Sender<WalletSnapshot>,
    generation: AtomicU64,
}

impl std::fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletSession")
            .field("state", &*self.inner.state.borrow())
            .finish_non_exhaustive()
    }
}

impl WalletSession {
    /// A disconnected session.
    #[must_use]
    pub fn new(provider: Arc<dyn WalletProvider>, store: Arc<dyn SnapshotStore>) -> Self {
        Self::with_snapshot(provider, store, WalletSnapshot::default())
    }

    fn with_snapshot(
        provider: Arc<dyn WalletProvider>,
        store: Arc<dyn SnapshotStore>,
        snapshot: WalletSnapshot,
    ) -> Self {
        let (state, _) = watch::channel(snapshot);
        Self {
            inner: Arc::new(WalletSessionInner {
                provider,
                store,
                state,
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Rehydrate the session at startup.
    ///
    /// The session starts `Connected`, without passing through `Connecting`,
    /// only when an address was remembered from the last session and the
    /// provider still reports that same account. Anything else, including a
    /// session the user explicitly disconnected, starts `Disconnected`.
    #[instrument(skip_all)]
    pub async fn start(provider: Arc<dyn WalletProvider>, store: Arc<dyn SnapshotStore>) -> Self {
        let remembered = persistence::restore::<PersistedWallet>(store.as_ref(), keys::WALLET)
            .and_then(|p| p.address);

        let snapshot = match remembered {
            None => WalletSnapshot::default(),
            Some(remembered) => match provider.current_accounts().await {
                Some(address) if address == remembered => {
                    info!(address = %address.short(), "Wallet reconnected");
                    WalletSnapshot::connected(address)
                }
                Some(address) => {
                    info!(address = %address.short(), "Wallet account changed since last session");
                    WalletSnapshot::default()
                }
                None => {
                    info!("Remembered wallet is no longer authorized");
                    WalletSnapshot::default()
                }
            },
        };

        let session = Self::with_snapshot(provider, store, snapshot);
        session.persist();
        session
    }

    /// Current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> WalletSnapshot {
        self.inner.state.borrow().clone()
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> WalletStatus {
        self.inner.state.borrow().status
    }

    /// Connected address, if any.
    #[must_use]
    pub fn address(&self) -> Option<WalletAddress> {
        self.inner.state.borrow().address.clone()
    }

    /// Whether protected content may be shown.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.status().unlocks_content()
    }

    /// The connect prompt cannot be dismissed; this is always `false`.
    #[must_use]
    pub const fn prompt_dismissed(&self) -> bool {
        false
    }

    /// Receive every subsequent transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<WalletSnapshot> {
        self.inner.state.subscribe()
    }

    /// Ask the provider for an account.
    ///
    /// Only starts from `Disconnected` or `Failed`; otherwise returns the
    /// current snapshot. The provider request runs on its own task so a
    /// dropped caller never strands the session in `Connecting`.
    #[instrument(skip(self))]
    pub async fn connect(&self) -> WalletSnapshot {
        let mut generation = 0;
        let started = self.inner.state.send_if_modified(|state| {
            if !matches!(state.status, WalletStatus::Disconnected | WalletStatus::Failed) {
                return false;
            }
            generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *state = WalletSnapshot::connecting();
            true
        });

        if !started {
            debug!(status = %self.status(), "Connect ignored");
            return self.snapshot();
        }

        add_breadcrumb("wallet", "Connect requested", None);

        let session = self.clone();
        let task = tokio::spawn(async move {
            let result = session.inner.provider.request_accounts().await;
            session.finish_connect(generation, result)
        });

        match task.await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "Connect task failed");
                self.finish_connect(generation, Err(ConnectError::ProviderError(e.to_string())))
            }
        }
    }

    fn finish_connect(
        &self,
        generation: u64,
        result: Result<WalletAddress, ConnectError>,
    ) -> WalletSnapshot {
        let mut outcome = None;
        let applied = self.inner.state.send_if_modified(|state| {
            if self.inner.generation.load(Ordering::SeqCst) != generation
                || state.status != WalletStatus::Connecting
            {
                return false;
            }
            *state = match &result {
                Ok(address) => WalletSnapshot::connected(address.clone()),
                Err(error) => WalletSnapshot::failed(error.clone()),
            };
            outcome = Some(state.clone());
            true
        });

        if !applied {
            debug!("Discarding stale connect result");
            return self.snapshot();
        }

        match &result {
            Ok(address) => {
                info!(address = %address.short(), "Wallet connected");
                let short = address.short();
                add_breadcrumb("wallet", "Connected", Some(&[("address", short.as_str())]));
            }
            Err(error) => {
                warn!(error = %error, kind = %error.kind(), "Wallet connection failed");
                let kind = error.kind().to_string();
                add_breadcrumb("wallet", "Connection failed", Some(&[("kind", kind.as_str())]));
            }
        }
        self.persist();
        outcome.unwrap_or_else(|| self.snapshot())
    }

    /// Drop the connection. Any in-flight connect result is discarded.
    #[instrument(skip(self))]
    pub fn disconnect(&self) -> WalletSnapshot {
        self.inner.state.send_modify(|state| {
            self.inner.generation.fetch_add(1, Ordering::SeqCst);
            *state = WalletSnapshot::default();
        });
        info!("Wallet disconnected");
        add_breadcrumb("wallet", "Disconnected", None);
        self.persist();
        self.snapshot()
    }

    /// Re-read the provider's current account and apply change detection.
    pub async fn refresh(&self) -> WalletSnapshot {
        let current = self.inner.provider.current_accounts().await;
        self.handle_accounts_changed(current)
    }

    /// React to the provider reporting its authorized account.
    ///
    /// A connected session resets to `Disconnected` when the provider
    /// reports no account or a different one. Other states are untouched.
    #[instrument(skip(self))]
    pub fn handle_accounts_changed(&self, account: Option<WalletAddress>) -> WalletSnapshot {
        let reset = self.inner.state.send_if_modified(|state| {
            if state.status != WalletStatus::Connected || state.address == account {
                return false;
            }
            self.inner.generation.fetch_add(1, Ordering::SeqCst);
            *state = WalletSnapshot::default();
            true
        });

        if reset {
            info!("Wallet account changed; session reset");
            add_breadcrumb("wallet", "Account changed", None);
            self.persist();
        }
        self.snapshot()
    }

    fn persist(&self) {
        let record = PersistedWallet {
            address: self.address(),
        };
        persistence::persist(self.inner.store.as_ref(), keys::WALLET, &record);
    }
}
