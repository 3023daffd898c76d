//! Persistent GET response cache.
//!
//! Entries are stored as JSON `{ "etag": ..., "data": ... }` under a fixed
//! prefix plus the request path. They never expire; an entry lives until a
//! later 2xx overwrites it or the store is cleared externally.

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::cache::RESPONSE_PREFIX;
use crate::core::error::CacheError;
use crate::utils::dom;

/// Cached response for one GET path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    pub data: Value,
}

/// String key-value store backing the cache.
pub trait CacheStore {
    fn read(&self, key: &str) -> Result<Option<String>, CacheError>;
    fn write(&self, key: &str, value: &str) -> Result<(), CacheError>;
}

/// `localStorage`, scoped to the browser profile and shared across tabs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageStore;

impl CacheStore for LocalStorageStore {
    fn read(&self, key: &str) -> Result<Option<String>, CacheError> {
        let storage = dom::local_storage().ok_or(CacheError::StorageUnavailable)?;
        storage.get_item(key).map_err(|_| CacheError::ReadFailed)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let storage = dom::local_storage().ok_or(CacheError::StorageUnavailable)?;
        storage
            .set_item(key, value)
            .map_err(|_| CacheError::WriteFailed)
    }
}

/// In-memory store for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RefCell<HashMap<String, String>>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

#[cfg(test)]
impl CacheStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Typed view over a [`CacheStore`].
#[derive(Debug, Default)]
pub struct ResponseCache<S> {
    store: S,
}

impl<S: CacheStore> ResponseCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Storage key for a request path.
    pub fn key(path: &str) -> String {
        format!("{}{}", RESPONSE_PREFIX, path)
    }

    /// Read the entry for `path`, if any.
    pub fn get(&self, path: &str) -> Result<Option<CacheEntry>, CacheError> {
        let Some(json) = self.store.read(&Self::key(path))? else {
            return Ok(None);
        };
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|_| CacheError::Corrupt(path.to_string()))
    }

    /// Overwrite the entry for `path`.
    pub fn put(&self, path: &str, entry: &CacheEntry) -> Result<(), CacheError> {
        let json = serde_json::to_string(entry).map_err(|_| CacheError::SerializationFailed)?;
        self.store.write(&Self::key(path), &json)
    }
}


#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn local_storage_round_trip() {
        let store = LocalStorageStore;
        store.write("folio.test:key", "value").unwrap();
        assert_eq!(
            store.read("folio.test:key").unwrap(),
            Some("value".to_string())
        );
        assert_eq!(store.read("folio.test:absent").unwrap(), None);
    }
}
