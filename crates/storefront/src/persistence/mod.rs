//! Snapshot persistence for session state.
//!
//! Cart and wallet state are written to a key-value [`SnapshotStore`] after
//! every mutation and read back once at startup. Writes are best-effort: a
//! failed write is logged and never rolls back the in-memory change, which
//! stays authoritative for the running session.

mod file;

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub use file::FileStore;

/// Schema version written into every snapshot envelope.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Storage keys for session snapshots.
pub mod keys {
    /// Key for the cart lines.
    pub const CART: &str = "cart";

    /// Key for the last known wallet session.
    pub const WALLET: &str = "wallet";
}

/// Errors raised by a [`SnapshotStore`].
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Writing a snapshot failed.
    #[error("Persistence write failed for {key}: {source}")]
    WriteFailed {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading a snapshot failed.
    #[error("Persistence read failed for {key}: {source}")]
    ReadFailed {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot could not be encoded or decoded.
    #[error("Snapshot encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Keys must be non-empty and limited to `[A-Za-z0-9_-]`.
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// Key-value storage surviving for the lifetime of a session.
pub trait SnapshotStore: Send + Sync {
    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn save(&self, key: &str, value: &str) -> Result<(), PersistenceError>;

    /// Delete the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn remove(&self, key: &str) -> Result<(), PersistenceError>;
}

/// In-process store; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    version: u32,
    saved_at: DateTime<Utc>,
    data: &'a T,
}

#[derive(Deserialize)]
struct Envelope<T> {
    version: u32,
    #[allow(dead_code)]
    saved_at: DateTime<Utc>,
    data: T,
}

/// Write a versioned snapshot of `data` under `key`.
///
/// # Errors
///
/// Returns an error if encoding or the underlying write fails.
pub fn write_snapshot<T: Serialize>(
    store: &dyn SnapshotStore,
    key: &str,
    data: &T,
) -> Result<(), PersistenceError> {
    let envelope = EnvelopeRef {
        version: SNAPSHOT_VERSION,
        saved_at: Utc::now(),
        data,
    };
    let json = serde_json::to_string(&envelope)?;
    store.save(key, &json)
}

/// Best-effort snapshot write. Failures are logged and swallowed.
pub fn persist<T: Serialize>(store: &dyn SnapshotStore, key: &str, data: &T) {
    match write_snapshot(store, key, data) {
        Ok(()) => debug!(key, "Snapshot persisted"),
        Err(e) => warn!(key, error = %e, "Failed to persist snapshot; keeping in-memory state"),
    }
}

/// Read the snapshot stored under `key`.
///
/// Missing, unreadable, or version-mismatched snapshots yield `None`, so a
/// corrupt snapshot degrades to a fresh session instead of a failed start.
pub fn restore<T: DeserializeOwned>(store: &dyn SnapshotStore, key: &str) -> Option<T> {
    let raw = match store.load(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!(key, error = %e, "Failed to read snapshot");
            return None;
        }
    };

    match serde_json::from_str::<Envelope<T>>(&raw) {
        Ok(envelope) if envelope.version == SNAPSHOT_VERSION => Some(envelope.data),
        Ok(envelope) => {
            warn!(
                key,
                version = envelope.version,
                expected = SNAPSHOT_VERSION,
                "Discarding snapshot with unknown version"
            );
            None
        }
        Err(e) => {
            warn!(key, error = %e, "Discarding unreadable snapshot");
            None
        }
    }
}

fn validate_key(key: &str) -> Result<(), PersistenceError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(PersistenceError::InvalidKey(key.to_owned()))
    }
}
