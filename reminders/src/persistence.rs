//! Snapshot persistence.
//!
//! The whole state is stored as one JSON document under a single key:
//!
//! ```json
//! { "state": { "lists": [...], "currentListId": "..." }, "version": 0 }
//! ```
//!
//! Timestamps are written as RFC 3339 strings and parsed back into
//! `DateTime<Utc>` on load. A document with any other version, or one that
//! fails to parse, is treated as unreadable and the default dataset is used.

use crate::defaults;
use crate::types::{ReminderAction, ReminderState};
use reminders_core::effect::Effect;
use reminders_core::environment::Clock;
use reminders_core::storage::{KeyValueStorage, StorageError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

/// Storage key of the persisted document
pub const STORAGE_KEY: &str = "reminder-lists-storage";

/// Version written into (and required from) the persisted document
pub const STATE_VERSION: u32 = 0;

/// Errors raised while reading or writing the persisted state
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Storage backend failure
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// JSON encoding or decoding failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Document written by an incompatible version
    #[error("unsupported state version {found} (expected {STATE_VERSION})")]
    UnsupportedVersion {
        /// Version found in the document
        found: u32,
    },

    /// Document parsed but breaks a state invariant
    #[error("invalid persisted state: {0}")]
    Invalid(String),
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    state: &'a ReminderState,
    version: u32,
}

#[derive(Deserialize)]
struct Envelope {
    state: ReminderState,
    version: u32,
}

/// Encode a state into the persisted document
///
/// # Errors
///
/// Returns [`PersistenceError::Serialization`] if JSON encoding fails.
pub fn encode(state: &ReminderState) -> Result<String, PersistenceError> {
    let json = serde_json::to_string(&EnvelopeRef {
        state,
        version: STATE_VERSION,
    })?;
    Ok(json)
}

/// Decode a persisted document
///
/// A `currentListId` naming no list is repointed at the first list.
///
/// # Errors
///
/// Returns an error if the document is not valid JSON of the expected shape,
/// carries another version, or contains duplicate list or item ids.
pub fn decode(json: &str) -> Result<ReminderState, PersistenceError> {
    let envelope: Envelope = serde_json::from_str(json)?;
    if envelope.version != STATE_VERSION {
        return Err(PersistenceError::UnsupportedVersion {
            found: envelope.version,
        });
    }

    let mut state = envelope.state;

    let mut list_ids = HashSet::new();
    for list in state.lists.iter() {
        if !list_ids.insert(&list.id) {
            return Err(PersistenceError::Invalid(format!(
                "duplicate list id {}",
                list.id
            )));
        }
        let mut item_ids = HashSet::new();
        for item in list.items.iter() {
            if !item_ids.insert(&item.id) {
                return Err(PersistenceError::Invalid(format!(
                    "duplicate item id {} in list {}",
                    item.id, list.id
                )));
            }
        }
    }

    if let Some(current) = &state.current_list_id {
        if state.list(current).is_none() {
            tracing::warn!(
                current_list_id = %current,
                "Persisted current list does not exist, selecting first list"
            );
            state.current_list_id = state.lists.first().map(|list| list.id.clone());
        }
    }

    Ok(state)
}

/// Where the initial state came from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadSource {
    /// Restored from storage
    Persisted,
    /// Nothing stored under the key
    DefaultsMissing,
    /// Something was stored but could not be read
    DefaultsUnreadable(String),
    /// Supplied by the caller; storage was not read
    Provided,
}

/// Load the persisted state, falling back to the default dataset
///
/// Never fails: every problem is logged and answered with defaults.
pub async fn load(
    storage: &dyn KeyValueStorage,
    key: &str,
    clock: &dyn Clock,
) -> (ReminderState, LoadSource) {
    match storage.get_item(key).await {
        Ok(Some(json)) => match decode(&json) {
            Ok(state) => {
                tracing::info!(key, lists = state.lists.len(), "Restored reminder state");
                (state, LoadSource::Persisted)
            },
            Err(error) => {
                tracing::warn!(key, %error, "Persisted reminder state unreadable, using defaults");
                (
                    defaults::default_state(clock),
                    LoadSource::DefaultsUnreadable(error.to_string()),
                )
            },
        },
        Ok(None) => {
            tracing::info!(key, "No persisted reminder state, using defaults");
            (defaults::default_state(clock), LoadSource::DefaultsMissing)
        },
        Err(error) => {
            tracing::warn!(key, %error, "Failed to read reminder state, using defaults");
            (
                defaults::default_state(clock),
                LoadSource::DefaultsUnreadable(error.to_string()),
            )
        },
    }
}

/// Serializes writes of encoded snapshots to one storage key
///
/// Writes are ordered by state revision: a snapshot older than the last
/// one written is dropped, so concurrent background writes cannot leave
/// a stale document behind.
pub struct SnapshotWriter {
    storage: Arc<dyn KeyValueStorage>,
    key: String,
    last_written: Mutex<Option<u64>>,
}

impl SnapshotWriter {
    /// Creates a writer for `key`
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            last_written: Mutex::new(None),
        }
    }

    /// Storage key written to
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Backing storage
    #[must_use]
    pub fn storage(&self) -> Arc<dyn KeyValueStorage> {
        Arc::clone(&self.storage)
    }

    /// Write the encoded snapshot of `revision`
    ///
    /// Returns `Ok(false)` when the same or a newer revision was already
    /// written and nothing was done.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Storage`] if the backend rejects the write.
    pub async fn write(&self, revision: u64, json: String) -> Result<bool, PersistenceError> {
        let mut last_written = self.last_written.lock().await;
        if last_written.is_some_and(|last| revision <= last) {
            tracing::trace!(revision, "Snapshot already persisted, skipping");
            return Ok(false);
        }

        self.storage.set_item(&self.key, json).await?;
        *last_written = Some(revision);
        tracing::debug!(key = %self.key, revision, "Persisted reminder state");
        Ok(true)
    }

    /// Encode and write `state`
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the storage write fails.
    pub async fn save(&self, state: &ReminderState) -> Result<bool, PersistenceError> {
        let json = encode(state)?;
        self.write(state.revision, json).await
    }
}

impl std::fmt::Debug for SnapshotWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotWriter")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// Background write of the given snapshot
///
/// Encoding happens now, against the snapshot the reducer just produced.
/// A failure comes back as [`ReminderAction::PersistFailed`].
pub fn persist_effect(writer: Arc<SnapshotWriter>, state: &ReminderState) -> Effect<ReminderAction> {
    let revision = state.revision;
    match encode(state) {
        Ok(json) => Effect::future(async move {
            match writer.write(revision, json).await {
                Ok(_) => None,
                Err(error) => {
                    tracing::warn!(revision, %error, "Failed to persist reminder state");
                    Some(ReminderAction::PersistFailed {
                        error: error.to_string(),
                    })
                },
            }
        }),
        Err(error) => {
            tracing::error!(revision, %error, "Failed to encode reminder state");
            let error = error.to_string();
            Effect::future(async move { Some(ReminderAction::PersistFailed { error }) })
        },
    }
}
