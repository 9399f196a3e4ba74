//! In-memory storage testing utilities
//!
//! - [`InMemoryStorage`]: HashMap-backed key-value storage with write counting
//! - [`FailingStorage`]: storage whose reads and/or writes always fail

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Lock poisoning only happens after a test already panicked

use reminders_core::storage::{KeyValueStorage, StorageError, StorageFuture};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

/// In-memory key-value storage for fast, deterministic testing.
///
/// Clones share the same data, so a test can keep one handle for
/// inspection while the store owns another.
///
/// # Example
///
/// ```
/// use reminders_testing::InMemoryStorage;
/// use reminders_core::storage::KeyValueStorage;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let storage = InMemoryStorage::new();
/// storage.set_item("slot", "{}".to_string()).await?;
/// assert_eq!(storage.get_item("slot").await?, Some("{}".to_string()));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryStorage {
    data: Arc<RwLock<HashMap<String, String>>>,
    writes: Arc<AtomicUsize>,
}

impl InMemoryStorage {
    /// Create a new empty in-memory storage
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage pre-populated with one slot
    #[must_use]
    pub fn with_item(key: &str, value: impl Into<String>) -> Self {
        let storage = Self::new();
        storage
            .data
            .write()
            .unwrap()
            .insert(key.to_string(), value.into());
        storage
    }

    /// Synchronous read for assertions
    #[must_use]
    pub fn value(&self, key: &str) -> Option<String> {
        self.data.read().unwrap().get(key).cloned()
    }

    /// Number of successful `set_item` calls so far
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Check if a key exists in the storage
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.read().unwrap().contains_key(key)
    }
}

impl KeyValueStorage for InMemoryStorage {
    fn get_item<'a>(&'a self, key: &'a str) -> StorageFuture<'a, Option<String>> {
        Box::pin(async move { Ok(self.value(key)) })
    }

    fn set_item<'a>(&'a self, key: &'a str, value: String) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            self.data.write().unwrap().insert(key.to_string(), value);
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }
}

/// Storage that fails on demand.
///
/// Reads fail with [`StorageError::Unavailable`] when `fail_reads` is set;
/// writes fail with [`StorageError::Io`] when `fail_writes` is set.
/// Operations that are not set to fail behave like an empty store.
#[derive(Clone, Debug)]
pub struct FailingStorage {
    fail_reads: bool,
    fail_writes: bool,
}

impl FailingStorage {
    /// Every operation fails
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fail_reads: true,
            fail_writes: true,
        }
    }

    /// Reads succeed (nothing stored), writes fail
    #[must_use]
    pub const fn write_only_failures() -> Self {
        Self {
            fail_reads: false,
            fail_writes: true,
        }
    }
}

impl Default for FailingStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStorage for FailingStorage {
    fn get_item<'a>(&'a self, _key: &'a str) -> StorageFuture<'a, Option<String>> {
        let fail = self.fail_reads;
        Box::pin(async move {
            if fail {
                Err(StorageError::Unavailable("storage offline".to_string()))
            } else {
                Ok(None)
            }
        })
    }

    fn set_item<'a>(&'a self, _key: &'a str, _value: String) -> StorageFuture<'a, ()> {
        let fail = self.fail_writes;
        Box::pin(async move {
            if fail {
                Err(StorageError::Io("disk full".to_string()))
            } else {
                Ok(())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_round_trip() {
        let storage = InMemoryStorage::new();
        assert_eq!(storage.get_item("k").await.unwrap(), None);

        storage.set_item("k", "v".to_string()).await.unwrap();
        assert_eq!(storage.get_item("k").await.unwrap(), Some("v".to_string()));
        assert_eq!(storage.write_count(), 1);

        assert!(storage.contains_key("k"));
        assert!(!storage.contains_key("other"));
    }

    #[tokio::test]
    async fn test_clones_share_data() {
        let storage = InMemoryStorage::with_item("k", "v");
        let other = storage.clone();
        other.set_item("k", "w".to_string()).await.unwrap();
        assert_eq!(storage.value("k"), Some("w".to_string()));
    }

    #[tokio::test]
    async fn test_failing_storage() {
        let storage = FailingStorage::new();
        assert!(storage.get_item("k").await.is_err());
        assert!(storage.set_item("k", String::new()).await.is_err());

        let writes_only = FailingStorage::write_only_failures();
        assert_eq!(writes_only.get_item("k").await.unwrap(), None);
        assert!(writes_only.set_item("k", String::new()).await.is_err());
    }
}
