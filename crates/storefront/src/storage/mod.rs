//! Persistent key/value storage for client state.
//!
//! # Architecture
//!
//! - [`KeyValueStore`] is the storage port: get/set/remove of string values
//!   by key. [`MemoryStore`] backs tests, [`FileStore`] backs the CLI.
//! - [`PersistentStore`] is the adapter the state containers talk to. It adds
//!   JSON (de)serialization and contains every failure: errors are logged and
//!   swallowed so in-memory state keeps working when persistence does not.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Storage keys used by the state containers.
pub mod keys {
    /// Raw bearer token of the current session.
    pub const AUTH_TOKEN: &str = "auth_token";

    /// JSON array of wishlist entries.
    pub const WISHLIST: &str = "wishlist";

    /// JSON array of cart line items.
    pub const CART: &str = "cart";
}

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing medium failed.
    #[error("I/O error for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The value does not fit in the remaining space.
    #[error("quota exceeded writing {key}: needs {needed} bytes, quota is {quota}")]
    QuotaExceeded {
        key: String,
        needed: usize,
        quota: usize,
    },

    /// The key cannot be mapped onto the backend.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    /// Another holder of the store panicked mid-write.
    #[error("storage lock poisoned")]
    Poisoned,
}

/// Storage port: string values by key.
///
/// Implementations must be safe to share between the containers of one
/// storefront; writes complete before the call returns.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// JSON adapter over a [`KeyValueStore`] that never fails its callers.
///
/// Cheap to clone; clones share the backend.
#[derive(Clone)]
pub struct PersistentStore {
    backend: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for PersistentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentStore").finish_non_exhaustive()
    }
}

impl PersistentStore {
    /// Wrap a storage backend.
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Wrap an already shared storage backend.
    #[must_use]
    pub fn from_shared(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Load and decode the JSON value under `key`.
    ///
    /// Returns `None` when the key is missing, unreadable, or does not decode
    /// as `T`; the last two cases are logged.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.load_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!(key, error = %error, "Discarding undecodable stored value");
                None
            }
        }
    }

    /// Encode `value` as JSON and store it under `key`.
    ///
    /// Returns whether the value was persisted. Failures are logged.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        match serde_json::to_string(value) {
            Ok(json) => self.save_raw(key, &json),
            Err(error) => {
                tracing::warn!(key, error = %error, "Failed to encode value for storage");
                false
            }
        }
    }

    /// Load the raw string under `key`.
    pub fn load_raw(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(key, error = %error, "Failed to read from storage");
                None
            }
        }
    }

    /// Store a raw string under `key`. Returns whether it was persisted.
    pub fn save_raw(&self, key: &str, value: &str) -> bool {
        match self.backend.set(key, value) {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(key, error = %error, "Failed to write to storage");
                false
            }
        }
    }

    /// Delete `key`. Returns whether the backend confirmed the delete.
    pub fn remove(&self, key: &str) -> bool {
        match self.backend.remove(key) {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(key, error = %error, "Failed to remove from storage");
                false
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: u32,
        text: String,
    }

    #[test]
    fn test_json_round_trip() {
        let store = PersistentStore::new(MemoryStore::new());
        let notes = vec![
            Note {
                id: 1,
                text: "one".into(),
            },
            Note {
                id: 2,
                text: "two".into(),
            },
        ];
        assert!(store.save("notes", &notes));
        let loaded: Vec<Note> = store.load("notes").unwrap();
        assert_eq!(loaded, notes);
    }

    #[test]
    fn test_missing_key_loads_none() {
        let store = PersistentStore::new(MemoryStore::new());
        assert!(store.load::<Vec<Note>>("notes").is_none());
    }

    #[test]
    fn test_garbage_is_discarded() {
        let backend = MemoryStore::new();
        backend.set("notes", "{not json").unwrap();
        let store = PersistentStore::new(backend);
        assert!(store.load::<Vec<Note>>("notes").is_none());
    }

    #[test]
    fn test_quota_failure_is_swallowed() {
        let store = PersistentStore::new(MemoryStore::with_quota(4));
        assert!(!store.save("notes", &vec!["far too long for the quota"]));
        assert!(store.load::<Vec<String>>("notes").is_none());
    }

    #[test]
    fn test_raw_values_are_not_json_encoded() {
        let backend = MemoryStore::new();
        let store = PersistentStore::new(backend.clone());
        store.save_raw(keys::AUTH_TOKEN, "abc123");
        assert_eq!(backend.get(keys::AUTH_TOKEN).unwrap().as_deref(), Some("abc123"));
        assert!(store.remove(keys::AUTH_TOKEN));
        assert!(store.load_raw(keys::AUTH_TOKEN).is_none());
    }
}
