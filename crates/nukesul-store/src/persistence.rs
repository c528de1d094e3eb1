//! Client-side key/value persistence.
//!
//! Plays the role browser local storage plays for a web client: a flat map
//! of string keys to string values that survives restarts. Values are stored
//! verbatim; callers own the encoding.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;

/// Fixed persistence keys.
pub mod keys {
    /// JSON array of cart items.
    pub const CART: &str = "cart";

    /// `"true"` once the customer has placed an order.
    pub const ORDER_PLACED: &str = "orderPlaced";

    /// Bearer token for the admin API.
    pub const ADMIN_TOKEN: &str = "adminToken";

    /// In-progress admin product edit.
    pub const EDITING_PRODUCT: &str = "editingProduct";
}

/// Read/write/clear access to persisted string values.
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, or `None` if the key was never set.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the backing medium cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes the key. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the backing medium cannot be written.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Reads `key` and parses it as JSON. Absent keys yield `None`.
///
/// # Errors
///
/// Returns [`StoreError::Malformed`] when the stored text is not valid JSON
/// for `T`, or any read error from the store.
pub fn get_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(key)? {
        None => Ok(None),
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Malformed {
                key: key.to_owned(),
                source,
            }),
    }
}

/// Serializes `value` as JSON and writes it under `key`.
///
/// # Errors
///
/// Returns [`StoreError::Encode`] if serialization fails, or any write error
/// from the store.
pub fn set_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value).map_err(|source| StoreError::Encode {
        key: key.to_owned(),
        source,
    })?;
    store.set(key, &raw)
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

/// One file per key inside a state directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens (creating if needed) the state directory.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are fixed identifiers; anything outside [A-Za-z0-9_-] is
        // replaced so a key can never name a path outside `dir`.
        let file: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(file)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, value).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(key, bytes = value.len(), "persisted");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(key, "removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-process store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store, e.g. with a cart persisted by an earlier session.
    #[must_use]
    pub fn with_entry(self, key: &str, value: &str) -> Self {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.to_owned());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> FileStore {
        let dir = std::env::temp_dir().join(format!("nukesul-store-{}", uuid::Uuid::new_v4()));
        FileStore::open(dir).unwrap()
    }

    #[test]
    fn file_store_round_trip() {
        let store = temp_store();
        assert_eq!(store.get(keys::CART).unwrap(), None);

        store.set(keys::CART, r#"[{"id":"1-small"}]"#).unwrap();
        assert_eq!(
            store.get(keys::CART).unwrap().as_deref(),
            Some(r#"[{"id":"1-small"}]"#)
        );

        store.set(keys::CART, "[]").unwrap();
        assert_eq!(store.get(keys::CART).unwrap().as_deref(), Some("[]"));

        store.remove(keys::CART).unwrap();
        assert_eq!(store.get(keys::CART).unwrap(), None);
        store.remove(keys::CART).unwrap();

        let _ = std::fs::remove_dir_all(store.dir());
    }

    #[test]
    fn file_store_keys_stay_inside_dir() {
        let store = temp_store();
        let path = store.path_for("../escape");
        assert_eq!(path.parent(), Some(store.dir()));
        let _ = std::fs::remove_dir_all(store.dir());
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::new().with_entry(keys::ADMIN_TOKEN, "abc");
        assert_eq!(store.get(keys::ADMIN_TOKEN).unwrap().as_deref(), Some("abc"));
        store.remove(keys::ADMIN_TOKEN).unwrap();
        assert_eq!(store.get(keys::ADMIN_TOKEN).unwrap(), None);
    }

    #[test]
    fn get_json_reports_malformed_values() {
        let store = MemoryStore::new().with_entry(keys::CART, "{not json");
        let err = get_json::<Vec<serde_json::Value>>(&store, keys::CART).unwrap_err();
        assert!(matches!(err, StoreError::Malformed { ref key, .. } if key == "cart"));
    }

    #[test]
    fn set_json_then_get_json() {
        let store = MemoryStore::new();
        set_json(&store, "numbers", &[1, 2, 3]).unwrap();
        let back: Option<Vec<i32>> = get_json(&store, "numbers").unwrap();
        assert_eq!(back, Some(vec![1, 2, 3]));
    }
}
