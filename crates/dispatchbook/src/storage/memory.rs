//! Volatile key-value store.
//!
//! Keeps blobs in a map for the lifetime of the value. Reads and writes can
//! be made to fail on demand, which stands in for an unavailable or full
//! medium.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::error::{Error, Result};

use super::KeyValueStore;

/// In-memory [`KeyValueStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
    fail_reads: Cell<bool>,
    fail_writes: Cell<bool>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with the given entries.
    #[must_use]
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        store.entries.borrow_mut().extend(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into())),
        );
        store
    }

    /// Make every subsequent read fail.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    /// Make every subsequent write fail, as a full medium would.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// The raw blob under `key`, bypassing failure injection.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        if self.fail_reads.get() {
            return Err(Error::storage(key, "medium unavailable"));
        }
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes.get() {
            return Err(Error::storage(key, "quota exceeded"));
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_and_set() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_with_entries() {
        let store = MemoryStore::with_entries([("a", "1"), ("b", "2")]);
        assert_eq!(store.raw("a").as_deref(), Some("1"));
        assert_eq!(store.raw("b").as_deref(), Some("2"));
    }

    #[test]
    fn test_failing_reads() {
        let store = MemoryStore::with_entries([("a", "1")]);
        store.set_fail_reads(true);
        let err = store.get("a").unwrap_err();
        assert!(err.is_storage_error());
        store.set_fail_reads(false);
        assert!(store.get("a").is_ok());
    }

    #[test]
    fn test_failing_writes_leave_previous_value() {
        let store = MemoryStore::with_entries([("a", "1")]);
        store.set_fail_writes(true);
        assert!(store.set("a", "2").unwrap_err().is_storage_error());
        assert_eq!(store.raw("a").as_deref(), Some("1"));
    }
}
