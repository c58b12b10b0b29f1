//! In-memory key-value storage
//!
//! Stands in for durable storage in tests and for sessions where nothing
//! should touch disk. Clones share one namespace, so a test can keep a
//! handle and inspect or sabotage the storage a repository owns.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::error::{StoreError, StoreResult};
use super::KeyValueStorage;

#[derive(Debug, Default)]
struct Inner {
    items: HashMap<String, String>,
    quota_bytes: Option<u64>,
    disabled: bool,
}

/// Shared in-memory namespace of string slots
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Rc<RefCell<Inner>>,
}

impl MemoryStorage {
    /// Empty storage with no size limit
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty storage that rejects writes past `quota_bytes` in total
    pub fn with_quota(quota_bytes: u64) -> Self {
        let storage = Self::new();
        storage.inner.borrow_mut().quota_bytes = Some(quota_bytes);
        storage
    }

    /// Storage that refuses every read and write
    pub fn disabled() -> Self {
        let storage = Self::new();
        storage.set_disabled(true);
        storage
    }

    /// Turn storage off or back on for every clone
    pub fn set_disabled(&self, disabled: bool) {
        self.inner.borrow_mut().disabled = disabled;
    }

    /// Number of slots currently held
    pub fn len(&self) -> usize {
        self.inner.borrow().items.len()
    }

    /// Whether no slot holds a value
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().items.is_empty()
    }

    fn unavailable(key: &str) -> StoreError {
        StoreError::Unavailable {
            key: key.to_string(),
            reason: "storage is disabled".to_string(),
        }
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        let inner = self.inner.borrow();
        if inner.disabled {
            return Err(Self::unavailable(key));
        }
        Ok(inner.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> StoreResult<()> {
        let mut inner = self.inner.borrow_mut();
        if inner.disabled {
            return Err(Self::unavailable(key));
        }

        if let Some(limit) = inner.quota_bytes {
            let used: usize = inner
                .items
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = (used + key.len() + value.len()) as u64;
            if needed > limit {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                    reason: format!("{} bytes needed, limit is {} bytes", needed, limit),
                });
            }
        }

        inner.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> StoreResult<()> {
        let mut inner = self.inner.borrow_mut();
        if inner.disabled {
            return Err(Self::unavailable(key));
        }
        inner.items.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let mut storage = MemoryStorage::new();
        assert!(storage.is_empty());

        storage.set_item("links", "[]").unwrap();
        assert_eq!(storage.get_item("links").unwrap().as_deref(), Some("[]"));
        assert_eq!(storage.len(), 1);

        storage.remove_item("links").unwrap();
        assert!(storage.get_item("links").unwrap().is_none());
    }

    #[test]
    fn test_clones_share_namespace() {
        let mut writer = MemoryStorage::new();
        let reader = writer.clone();

        writer.set_item("theme", "dark").unwrap();
        assert_eq!(reader.get_item("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_disabled_rejects_everything() {
        let mut storage = MemoryStorage::disabled();

        assert!(matches!(
            storage.get_item("links"),
            Err(StoreError::Unavailable { .. })
        ));
        assert!(matches!(
            storage.set_item("links", "[]"),
            Err(StoreError::Unavailable { .. })
        ));

        storage.set_disabled(false);
        storage.set_item("links", "[]").unwrap();
    }

    #[test]
    fn test_quota_counts_keys_and_values() {
        let mut storage = MemoryStorage::with_quota(10);

        // "links" (5) + "[]" (2) = 7
        storage.set_item("links", "[]").unwrap();

        // "theme" (5) + "dark" (4) = 9, plus 7 already used
        let err = storage.set_item("theme", "dark").unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { .. }));

        // Replacing an existing slot only counts the new value
        storage.set_item("links", "[1,2]").unwrap();
    }
}
