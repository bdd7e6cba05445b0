//! JSON-RPC wallet provider.
//!
//! Speaks the EIP-1193 account methods over HTTP:
//!
//! - `eth_requestAccounts` - prompts for authorization
//! - `eth_accounts` - currently authorized accounts, no prompt
//!
//! JSON-RPC error `4001` is the standard "user rejected request" code.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use oakmint_core::WalletAddress;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument, warn};
use url::Url;

use super::provider::{ConnectError, WalletProvider};

/// JSON-RPC error code for a rejected request.
pub const USER_REJECTED_CODE: i64 = 4001;

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Vec<String>>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

/// Wallet reachable at a JSON-RPC endpoint.
#[derive(Debug)]
pub struct JsonRpcWalletProvider {
    client: reqwest::Client,
    endpoint: Url,
    next_id: AtomicU64,
}

impl JsonRpcWalletProvider {
    /// Create a provider for `endpoint`.
    #[must_use]
    pub const fn new(client: reqwest::Client, endpoint: Url) -> Self {
        Self {
            client,
            endpoint,
            next_id: AtomicU64::new(1),
        }
    }

    async fn call(&self, method: &str) -> Result<Vec<String>, ConnectError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": [],
        });

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?
            .error_for_status()
            .map_err(|e| ConnectError::ProviderError(e.to_string()))?;

        let response: RpcResponse = response
            .json()
            .await
            .map_err(|e| ConnectError::ProviderError(format!("malformed response: {e}")))?;

        if let Some(error) = response.error {
            return Err(if error.code == USER_REJECTED_CODE {
                ConnectError::UserRejected
            } else {
                ConnectError::ProviderError(format!("{} ({})", error.message, error.code))
            });
        }

        response
            .result
            .ok_or_else(|| ConnectError::ProviderError("response has no result".to_string()))
    }
}

fn map_transport_error(e: reqwest::Error) -> ConnectError {
    if e.is_connect() || e.is_timeout() {
        ConnectError::ProviderUnavailable
    } else {
        ConnectError::ProviderError(e.to_string())
    }
}

fn first_account(accounts: &[String]) -> Result<Option<WalletAddress>, ConnectError> {
    accounts
        .first()
        .map(|raw| {
            WalletAddress::parse(raw)
                .map_err(|e| ConnectError::ProviderError(format!("invalid account: {e}")))
        })
        .transpose()
}

#[async_trait]
impl WalletProvider for JsonRpcWalletProvider {
    #[instrument(skip(self))]
    async fn request_accounts(&self) -> Result<WalletAddress, ConnectError> {
        let accounts = self.call("eth_requestAccounts").await?;
        let address = first_account(&accounts)?
            .ok_or_else(|| ConnectError::ProviderError("no accounts returned".to_string()))?;
        debug!(address = %address.short(), "Account authorized");
        Ok(address)
    }

    #[instrument(skip(self))]
    async fn current_accounts(&self) -> Option<WalletAddress> {
        match self.call("eth_accounts").await {
            Ok(accounts) => first_account(&accounts).unwrap_or_else(|e| {
                warn!(error = %e, "Ignoring unreadable account");
                None
            }),
            Err(e) => {
                debug!(error = %e, "Could not read current accounts");
                None
            }
        }
    }
}
