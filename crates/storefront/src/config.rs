//! Configuration loaded from environment variables.
//!
//! # Backend (`StorefrontConfig`)
//!
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 5000)
//! - `STOREFRONT_CATALOG_PATH` - Product dataset JSON (default: bundled catalog)
//!
//! # Shell (`ShellConfig`)
//!
//! - `OAKMINT_BACKEND_URL` - Backend base URL (default: <http://localhost:5000>)
//! - `OAKMINT_HEALTH_PATH` - Readiness endpoint path (default: /api/health)
//! - `OAKMINT_HEALTH_INTERVAL_MS` - Readiness poll interval (default: 2000)
//! - `OAKMINT_WALLET_RPC_URL` - Wallet JSON-RPC endpoint; absent means no wallet
//! - `OAKMINT_DATA_DIR` - Session snapshot directory (default: platform data dir)
//! - `OAKMINT_CATALOG_PATH` - Product dataset JSON (default: fetched from the backend)
//!
//! # Both
//!
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate, 0.0-1.0 (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

use crate::persistence::FileStore;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Sentry settings shared by both binaries.
#[derive(Debug, Clone, PartialEq)]
pub struct SentryConfig {
    /// Sentry DSN; tracking is off when absent
    pub dsn: Option<String>,
    /// Environment tag (e.g. `production`)
    pub environment: Option<String>,
    /// Fraction of errors sent
    pub sample_rate: f32,
    /// Fraction of transactions traced
    pub traces_sample_rate: f32,
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            dsn: None,
            environment: None,
            sample_rate: 1.0,
            traces_sample_rate: 0.0,
        }
    }
}

/// Backend configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Product dataset to serve instead of the bundled one
    pub catalog_path: Option<PathBuf>,
    /// Error tracking
    pub sentry: SentryConfig,
}

/// Terminal shell configuration.
///
/// Implements `Debug` manually to redact the wallet endpoint, which may
/// embed an API key.
#[derive(Clone)]
pub struct ShellConfig {
    /// Backend base URL
    pub backend_url: Url,
    /// Readiness endpoint path on the backend
    pub health_path: String,
    /// Readiness poll interval
    pub health_interval: Duration,
    /// Wallet JSON-RPC endpoint
    pub wallet_rpc_url: Option<SecretString>,
    /// Session snapshot directory
    pub data_dir: PathBuf,
    /// Product dataset to load instead of fetching from the backend
    pub catalog_path: Option<PathBuf>,
    /// Error tracking
    pub sentry: SentryConfig,
}

impl std::fmt::Debug for ShellConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellConfig")
            .field("backend_url", &self.backend_url.as_str())
            .field("health_path", &self.health_path)
            .field("health_interval", &self.health_interval)
            .field(
                "wallet_rpc_url",
                &self.wallet_rpc_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("data_dir", &self.data_dir)
            .field("catalog_path", &self.catalog_path)
            .field("sentry", &self.sentry)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(&env_lookup)
    }

    fn from_lookup(env: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            host: parse_env_or_default(env, "STOREFRONT_HOST", "127.0.0.1")?,
            port: parse_env_or_default(env, "STOREFRONT_PORT", "5000")?,
            catalog_path: get_optional_env(env, "STOREFRONT_CATALOG_PATH").map(PathBuf::from),
            sentry: SentryConfig::from_lookup(env)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl ShellConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is invalid, or if no data
    /// directory is configured and the platform has none.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(&env_lookup)
    }

    fn from_lookup(env: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let backend_url = parse_url(env, "OAKMINT_BACKEND_URL", "http://localhost:5000")?;

        let health_path = get_env_or_default(env, "OAKMINT_HEALTH_PATH", "/api/health");
        if !health_path.starts_with('/') {
            return Err(ConfigError::InvalidEnvVar(
                "OAKMINT_HEALTH_PATH".to_string(),
                "must start with '/'".to_string(),
            ));
        }

        let interval_ms: u64 = parse_env_or_default(env, "OAKMINT_HEALTH_INTERVAL_MS", "2000")?;
        if interval_ms == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "OAKMINT_HEALTH_INTERVAL_MS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let wallet_rpc_url = match get_optional_env(env, "OAKMINT_WALLET_RPC_URL") {
            Some(raw) => {
                Url::parse(&raw).map_err(|e| {
                    ConfigError::InvalidEnvVar("OAKMINT_WALLET_RPC_URL".to_string(), e.to_string())
                })?;
                Some(SecretString::from(raw))
            }
            None => None,
        };

        let data_dir = get_optional_env(env, "OAKMINT_DATA_DIR")
            .map(PathBuf::from)
            .or_else(FileStore::default_dir)
            .ok_or_else(|| ConfigError::MissingEnvVar("OAKMINT_DATA_DIR".to_string()))?;

        Ok(Self {
            backend_url,
            health_path,
            health_interval: Duration::from_millis(interval_ms),
            wallet_rpc_url,
            data_dir,
            catalog_path: get_optional_env(env, "OAKMINT_CATALOG_PATH").map(PathBuf::from),
            sentry: SentryConfig::from_lookup(env)?,
        })
    }

    /// Full readiness URL, e.g. `http://localhost:5000/api/health`.
    #[must_use]
    pub fn health_url(&self) -> Url {
        let mut url = self.backend_url.clone();
        url.set_path(&self.health_path);
        url.set_query(None);
        url
    }

    /// Wallet endpoint, if one is configured.
    ///
    /// Validated when the configuration was loaded.
    #[must_use]
    pub fn wallet_rpc_endpoint(&self) -> Option<Url> {
        self.wallet_rpc_url
            .as_ref()
            .and_then(|secret| Url::parse(secret.expose_secret()).ok())
    }
}

impl SentryConfig {
    fn from_lookup(env: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            dsn: get_optional_env(env, "SENTRY_DSN"),
            environment: get_optional_env(env, "SENTRY_ENVIRONMENT"),
            sample_rate: parse_rate(env, "SENTRY_SAMPLE_RATE", "1.0")?,
            traces_sample_rate: parse_rate(env, "SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an optional environment variable; empty values count as absent.
fn get_optional_env(env: &dyn Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    env(key).filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(env: &dyn Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    get_optional_env(env, key).unwrap_or_else(|| default.to_string())
}

fn parse_env_or_default<T>(
    env: &dyn Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(env, key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_url(env: &dyn Fn(&str) -> Option<String>, key: &str, default: &str) -> Result<Url, ConfigError> {
    parse_env_or_default(env, key, default)
}

fn parse_rate(env: &dyn Fn(&str) -> Option<String>, key: &str, default: &str) -> Result<f32, ConfigError> {
    let rate: f32 = parse_env_or_default(env, key, default)?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be between 0.0 and 1.0".to_string(),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_storefront_defaults() {
        let config = StorefrontConfig::from_lookup(&lookup(&[])).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:5000");
        assert_eq!(config.catalog_path, None);
        assert_eq!(config.sentry, SentryConfig::default());
    }

    #[test]
    fn test_storefront_overrides() {
        let config = StorefrontConfig::from_lookup(&lookup(&[
            ("STOREFRONT_HOST", "0.0.0.0"),
            ("STOREFRONT_PORT", "8080"),
            ("STOREFRONT_CATALOG_PATH", "/srv/products.json"),
            ("SENTRY_DSN", "https://key@sentry.test/1"),
            ("SENTRY_TRACES_SAMPLE_RATE", "0.25"),
        ]))
        .unwrap();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.catalog_path, Some(PathBuf::from("/srv/products.json")));
        assert_eq!(config.sentry.dsn.as_deref(), Some("https://key@sentry.test/1"));
        assert!((config.sentry.traces_sample_rate - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn test_invalid_port() {
        let err = StorefrontConfig::from_lookup(&lookup(&[("STOREFRONT_PORT", "99999")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "STOREFRONT_PORT"));
    }

    #[test]
    fn test_invalid_sample_rate() {
        let err = StorefrontConfig::from_lookup(&lookup(&[("SENTRY_SAMPLE_RATE", "1.5")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "SENTRY_SAMPLE_RATE"));
    }

    #[test]
    fn test_shell_defaults() {
        let config = ShellConfig::from_lookup(&lookup(&[("OAKMINT_DATA_DIR", "/tmp/oakmint")])).unwrap();
        assert_eq!(config.health_url().as_str(), "http://localhost:5000/api/health");
        assert_eq!(config.health_interval, Duration::from_secs(2));
        assert!(config.wallet_rpc_url.is_none());
        assert_eq!(config.wallet_rpc_endpoint(), None);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/oakmint"));
    }

    #[test]
    fn test_shell_health_url_overrides() {
        let config = ShellConfig::from_lookup(&lookup(&[
            ("OAKMINT_DATA_DIR", "/tmp/oakmint"),
            ("OAKMINT_BACKEND_URL", "http://10.0.0.5:9000/ignored?x=1"),
            ("OAKMINT_HEALTH_PATH", "/ready"),
            ("OAKMINT_HEALTH_INTERVAL_MS", "250"),
        ]))
        .unwrap();
        assert_eq!(config.health_url().as_str(), "http://10.0.0.5:9000/ready");
        assert_eq!(config.health_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_shell_rejects_bad_values() {
        for (key, value) in [
            ("OAKMINT_BACKEND_URL", "not a url"),
            ("OAKMINT_HEALTH_PATH", "api/health"),
            ("OAKMINT_HEALTH_INTERVAL_MS", "0"),
            ("OAKMINT_HEALTH_INTERVAL_MS", "soon"),
            ("OAKMINT_WALLET_RPC_URL", "::"),
        ] {
            let err = ShellConfig::from_lookup(&lookup(&[("OAKMINT_DATA_DIR", "/tmp/x"), (key, value)]))
                .unwrap_err();
            assert!(
                matches!(&err, ConfigError::InvalidEnvVar(k, _) if k == key),
                "{key}={value}: {err}"
            );
        }
    }

    #[test]
    fn test_shell_debug_redacts_wallet_endpoint() {
        let config = ShellConfig::from_lookup(&lookup(&[
            ("OAKMINT_DATA_DIR", "/tmp/oakmint"),
            ("OAKMINT_WALLET_RPC_URL", "https://rpc.test/v3/super_secret_key"),
        ]))
        .unwrap();

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_key"));
        assert_eq!(
            config.wallet_rpc_endpoint().unwrap().as_str(),
            "https://rpc.test/v3/super_secret_key"
        );
    }

    #[test]
    fn test_empty_values_fall_back_to_defaults() {
        let config = StorefrontConfig::from_lookup(&lookup(&[("STOREFRONT_PORT", "  ")])).unwrap();
        assert_eq!(config.port, 5000);
    }
}
