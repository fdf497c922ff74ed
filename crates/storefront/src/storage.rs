//! Injectable key-value storage.
//!
//! Browser hosts back this with `localStorage`; tests and native hosts use
//! [`MemoryStorage`]. Values are raw strings; JSON payloads go through the
//! [`get_json`]/[`set_json`] helpers, which treat malformed persisted data
//! as absent rather than raising.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Well-known storage keys.
///
/// The key names match what the browser storefront persisted, so a wasm
/// host sitting on real `localStorage` stays compatible with existing data.
pub mod keys {
    /// JSON array of cart line items.
    pub const CART: &str = "cart";

    /// JSON session record of the signed-in user.
    pub const USER: &str = "dreamx_user";

    /// Raw auth token string.
    pub const TOKEN: &str = "token";

    /// JSON array of saved address entries.
    pub const ADDRESSES: &str = "addresses";

    /// Raw email address awaiting verification.
    pub const PENDING_VERIFICATION_EMAIL: &str = "pendingVerificationEmail";
}

/// Key-value storage with string keys and values.
///
/// Implementations must be usable from multiple tasks; the storefront is
/// single-writer in practice (one tab), so no transactional guarantees are
/// required beyond per-call atomicity.
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str);

    /// Delete the value stored under `key`, if any.
    fn remove(&self, key: &str);
}

/// In-memory [`KeyValueStorage`] implementation.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(key);
    }
}

/// Read and deserialize a JSON value from storage.
///
/// Malformed JSON is treated as absent: the parse failure is logged at
/// `warn` and `None` is returned, matching the storefront's tolerance for
/// stale or hand-edited persisted state.
pub fn get_json<T: DeserializeOwned>(storage: &dyn KeyValueStorage, key: &str) -> Option<T> {
    let raw = storage.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(error) => {
            tracing::warn!(key, %error, "discarding malformed persisted value");
            None
        }
    }
}

/// Serialize and store a JSON value.
pub fn set_json<T: Serialize>(storage: &dyn KeyValueStorage, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(raw) => storage.set(key, &raw),
        Err(error) => {
            tracing::error!(key, %error, "failed to serialize value for storage");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("k"), None);

        storage.set("k", "v1");
        assert_eq!(storage.get("k").as_deref(), Some("v1"));

        storage.set("k", "v2");
        assert_eq!(storage.get("k").as_deref(), Some("v2"));

        storage.remove("k");
        assert_eq!(storage.get("k"), None);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let storage = MemoryStorage::new();
        storage.remove("missing");
        assert_eq!(storage.get("missing"), None);
    }

    #[test]
    fn test_json_round_trip() {
        let storage = MemoryStorage::new();
        set_json(&storage, "nums", &vec![1, 2, 3]);
        let nums: Vec<i32> = get_json(&storage, "nums").unwrap();
        assert_eq!(nums, vec![1, 2, 3]);
    }

    #[test]
    fn test_malformed_json_reads_as_absent() {
        let storage = MemoryStorage::new();
        storage.set("nums", "{not json");
        let nums: Option<Vec<i32>> = get_json(&storage, "nums");
        assert_eq!(nums, None);
    }
}
