//! Durable key-value storage for persisted snapshots.
//!
//! The store mirrors its full state into a single named slot of a host-provided
//! key-value area. This module defines the abstraction over that area; concrete
//! backends live elsewhere:
//!
//! - `FileStorage` (in the `reminders` crate): one file per key on local disk
//! - `InMemoryStorage` / `FailingStorage` (in `reminders-testing`): deterministic tests
//!
//! # Dyn Compatibility
//!
//! This trait uses explicit `Pin<Box<dyn Future>>` returns instead of `async fn`
//! so it can be used as `Arc<dyn KeyValueStorage>`. Effects returned by reducers
//! capture the storage handle and must be `'static`.

use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Boxed future returned by [`KeyValueStorage`] operations
pub type StorageFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StorageError>> + Send + 'a>>;

/// Errors that can occur during storage operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The key is not a valid slot name for this backend.
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    /// Reading or writing the underlying medium failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// The backend is not available (unmounted, closed, denied).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl From<std::io::Error> for StorageError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

/// Async string key-value storage.
///
/// Mirrors the surface of a mobile platform's async storage: values are
/// opaque strings, a missing key is `Ok(None)` rather than an error.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to be shared between the store
/// and the effects it spawns.
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be read.
    fn get_item<'a>(&'a self, key: &'a str) -> StorageFuture<'a, Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the value cannot be written.
    fn set_item<'a>(&'a self, key: &'a str, value: String) -> StorageFuture<'a, ()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_convert_to_storage_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error = StorageError::from(io);
        assert!(matches!(error, StorageError::Io(ref msg) if msg.contains("denied")));
    }

    #[test]
    fn storage_error_display() {
        let error = StorageError::Unavailable("closed".to_string());
        assert_eq!(error.to_string(), "Storage unavailable: closed");
    }
}
