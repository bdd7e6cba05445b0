//! Status enums for session state.

use serde::{Deserialize, Serialize};

/// Wallet connection lifecycle status.
///
/// ```text
/// Disconnected --connect--> Connecting --ok--> Connected
///                               |                  |
///                               +--err--> Failed   +--disconnect / account lost--> Disconnected
///                                           |
///                                           +--connect--> Connecting
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WalletStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

impl WalletStatus {
    /// Whether protected storefront content may be shown.
    #[must_use]
    pub const fn unlocks_content(self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl std::fmt::Display for WalletStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Why a wallet connection attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectErrorKind {
    /// No wallet extension or API was detected.
    ProviderUnavailable,
    /// The user declined the connection prompt.
    UserRejected,
    /// Any other provider failure.
    ProviderError,
}

impl std::fmt::Display for ConnectErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProviderUnavailable => write!(f, "provider_unavailable"),
            Self::UserRejected => write!(f, "user_rejected"),
            Self::ProviderError => write!(f, "provider_error"),
        }
    }
}
