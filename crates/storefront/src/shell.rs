//! Which screen the shell may show.
//!
//! A pure function of the connectivity and wallet state, evaluated on every
//! render. Protected content is reachable only when the backend has been
//! reached *and* the wallet is connected. The connect prompt has no close
//! action: the only ways out are a successful connection or leaving.

use oakmint_core::WalletStatus;

use crate::gate::Connectivity;
use crate::wallet::{ConnectError, INSTALL_URL, WalletSnapshot};

/// Mandatory connect overlay contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectPrompt {
    /// A request is outstanding; the connect action is disabled.
    pub connecting: bool,
    /// Why the last attempt failed, if it did.
    pub error: Option<ConnectError>,
    /// Shown when no wallet was detected.
    pub install_url: Option<&'static str>,
}

/// What the shell renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Blocked until the backend answers; shows the retry counter.
    WaitingForBackend { attempts: u32 },
    /// Blocked behind the wallet overlay.
    ConnectWallet(ConnectPrompt),
    /// Catalog, cart, and detail views.
    App,
}

impl Screen {
    /// Whether protected content is visible.
    #[must_use]
    pub const fn unlocks_content(&self) -> bool {
        matches!(self, Self::App)
    }
}

/// Decide the screen for the given state.
#[must_use]
pub fn screen(connectivity: Connectivity, wallet: &WalletSnapshot) -> Screen {
    if !connectivity.connected {
        return Screen::WaitingForBackend {
            attempts: connectivity.attempts,
        };
    }

    if wallet.status.unlocks_content() {
        return Screen::App;
    }

    let install_url = matches!(wallet.last_error, Some(ConnectError::ProviderUnavailable))
        .then_some(INSTALL_URL);

    Screen::ConnectWallet(ConnectPrompt {
        connecting: wallet.status == WalletStatus::Connecting,
        error: wallet.last_error.clone(),
        install_url,
    })
}
