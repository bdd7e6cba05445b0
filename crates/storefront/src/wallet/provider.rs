//! Wallet provider seam.

use async_trait::async_trait;
use oakmint_core::{ConnectErrorKind, WalletAddress};
use thiserror::Error;

/// Where users without a wallet are sent.
pub const INSTALL_URL: &str = "https://metamask.io/download/";

/// Why a connection attempt failed. None of these are retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    /// No wallet is installed or reachable.
    #[error("No wallet provider detected")]
    ProviderUnavailable,

    /// The user declined the connection prompt.
    #[error("Connection request rejected")]
    UserRejected,

    /// The provider answered with something other than an account.
    #[error("Wallet provider error: {0}")]
    ProviderError(String),
}

impl ConnectError {
    /// Stable tag for display and logging.
    #[must_use]
    pub const fn kind(&self) -> ConnectErrorKind {
        match self {
            Self::ProviderUnavailable => ConnectErrorKind::ProviderUnavailable,
            Self::UserRejected => ConnectErrorKind::UserRejected,
            Self::ProviderError(_) => ConnectErrorKind::ProviderError,
        }
    }
}

/// An injected wallet (browser extension, RPC node, test double).
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the user to authorize an account. May show a prompt.
    async fn request_accounts(&self) -> Result<WalletAddress, ConnectError>;

    /// The currently authorized account, without prompting.
    ///
    /// Returns `None` when nothing is authorized or the provider cannot be
    /// reached.
    async fn current_accounts(&self) -> Option<WalletAddress>;
}

/// Provider used when no wallet is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableWalletProvider;

#[async_trait]
impl WalletProvider for UnavailableWalletProvider {
    async fn request_accounts(&self) -> Result<WalletAddress, ConnectError> {
        Err(ConnectError::ProviderUnavailable)
    }

    async fn current_accounts(&self) -> Option<WalletAddress> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            ConnectError::ProviderUnavailable.kind(),
            ConnectErrorKind::ProviderUnavailable
        );
        assert_eq!(ConnectError::UserRejected.kind(), ConnectErrorKind::UserRejected);
        assert_eq!(
            ConnectError::ProviderError("boom".into()).kind(),
            ConnectErrorKind::ProviderError
        );
    }

    #[tokio::test]
    async fn test_unavailable_provider() {
        let provider = UnavailableWalletProvider;
        assert_eq!(
            provider.request_accounts().await,
            Err(ConnectError::ProviderUnavailable)
        );
        assert_eq!(provider.current_accounts().await, None);
    }
}
