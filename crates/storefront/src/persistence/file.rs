//! File-backed snapshot store: one JSON document per key.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{PersistenceError, SnapshotStore, validate_key};

/// Directory name used under the platform data directory.
const APP_DIR: &str = "oakmint";

/// Stores each key as `<dir>/<key>.json`.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// crash mid-write never leaves a truncated snapshot behind.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| PersistenceError::WriteFailed {
            key: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// Platform default location, e.g. `~/.local/share/oakmint` on Linux.
    #[must_use]
    pub fn default_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join(APP_DIR))
    }

    /// Root directory of this store.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, PersistenceError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl SnapshotStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistenceError::ReadFailed {
                key: key.to_owned(),
                source,
            }),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        let write_failed = |source| PersistenceError::WriteFailed {
            key: key.to_owned(),
            source,
        };
        std::fs::write(&tmp, value).map_err(write_failed)?;
        std::fs::rename(&tmp, &path).map_err(write_failed)
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(PersistenceError::WriteFailed {
                key: key.to_owned(),
                source,
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_save_load_remove() {
        let temp = tempfile::tempdir().unwrap();
        let store = FileStore::open(temp.path()).unwrap();

        assert_eq!(store.load("cart").unwrap(), None);

        store.save("cart", "[1,2,3]").unwrap();
        assert_eq!(store.load("cart").unwrap().as_deref(), Some("[1,2,3]"));
        assert!(temp.path().join("cart.json").exists());
        assert!(!temp.path().join("cart.json.tmp").exists());

        store.save("cart", "[]").unwrap();
        assert_eq!(store.load("cart").unwrap().as_deref(), Some("[]"));

        store.remove("cart").unwrap();
        assert_eq!(store.load("cart").unwrap(), None);
        store.remove("cart").unwrap();
    }

    #[test]
    fn test_open_creates_nested_dir() {
        let temp = tempfile::tempdir().unwrap();
        let nested = temp.path().join("a").join("b");
        let store = FileStore::open(&nested).unwrap();
        assert_eq!(store.dir(), nested.as_path());
        assert!(nested.is_dir());
    }

    #[test]
    fn test_rejects_path_traversal_keys() {
        let temp = tempfile::tempdir().unwrap();
        let store = FileStore::open(temp.path()).unwrap();
        assert!(matches!(
            store.save("../escape", "x"),
            Err(PersistenceError::InvalidKey(_))
        ));
    }
}
