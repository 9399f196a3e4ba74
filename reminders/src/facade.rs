//! The reminder store as an application-facing handle.
//!
//! [`Reminders`] wraps the runtime [`Store`] with one method per operation.
//! It generates ids and timestamps through the environment, applies the
//! persistence mode, and hands out immutable snapshots for rendering.

use crate::persistence::{self, LoadSource, PersistenceError};
use crate::reducer::{PersistenceMode, ReminderEnvironment, ReminderReducer};
use crate::types::{
    CategoryGroup, ItemId, ListId, Progress, ReminderAction, ReminderList, ReminderState,
};
use reminders_runtime::{Store, StoreError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;

/// Runtime store specialised to reminder lists
pub type ReminderStore = Store<ReminderState, ReminderAction, ReminderEnvironment, ReminderReducer>;

/// Errors surfaced by [`Reminders`]
#[derive(Debug, Error)]
pub enum ReminderError {
    /// The store rejected the action or did not drain in time
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A write the caller waited on failed
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Handle to the reminder lists store
///
/// Cheap to clone; clones share the same store.
#[derive(Clone)]
pub struct Reminders {
    store: ReminderStore,
    load_source: LoadSource,
}

impl Reminders {
    /// Load the persisted state (or the defaults) and start a store
    pub async fn open(environment: ReminderEnvironment) -> Self {
        let (state, load_source) = persistence::load(
            environment.snapshots.storage().as_ref(),
            environment.snapshots.key(),
            environment.clock.as_ref(),
        )
        .await;
        Self {
            store: Store::new(state, ReminderReducer::new(), environment),
            load_source,
        }
    }

    /// Start a store from an explicit state, skipping storage reads
    #[must_use]
    pub fn with_state(state: ReminderState, environment: ReminderEnvironment) -> Self {
        Self {
            store: Store::new(state, ReminderReducer::new(), environment),
            load_source: LoadSource::Provided,
        }
    }

    /// Where the initial state came from
    #[must_use]
    pub const fn load_source(&self) -> &LoadSource {
        &self.load_source
    }

    /// Underlying runtime store
    #[must_use]
    pub const fn store(&self) -> &ReminderStore {
        &self.store
    }

    /// Send `action`; returns whether it produced a new revision.
    ///
    /// In strict mode only a changed state is written, so not-found
    /// mutations stay silent no-ops even when storage is failing.
    async fn apply(&self, action: ReminderAction) -> Result<bool, ReminderError> {
        let (_, transition) = self
            .store
            .send_observed(action, |s| s.revision)
            .await?;
        let changed = transition.changed();
        if changed && self.store.environment().persistence == PersistenceMode::Strict {
            self.flush().await?;
        }
        Ok(changed)
    }

    async fn dispatch(&self, action: ReminderAction) -> Result<(), ReminderError> {
        self.apply(action).await.map(|_| ())
    }

    /// Create an empty list; it is appended but not selected
    ///
    /// # Errors
    ///
    /// Fails if the store is shutting down, or in strict mode if the write fails.
    pub async fn add_list(
        &self,
        name: impl Into<String>,
        emoji: impl Into<String>,
        color: impl Into<String>,
    ) -> Result<ListId, ReminderError> {
        let id = ListId::new(self.store.environment().ids.next_id());
        self.dispatch(ReminderAction::AddList {
            id: id.clone(),
            name: name.into(),
            emoji: emoji.into(),
            color: color.into(),
        })
        .await?;
        Ok(id)
    }

    /// Remove a list; if it was current, the first remaining list becomes current
    ///
    /// # Errors
    ///
    /// Fails if the store is shutting down, or in strict mode if the write fails.
    pub async fn delete_list(&self, list_id: &ListId) -> Result<(), ReminderError> {
        self.dispatch(ReminderAction::DeleteList {
            list_id: list_id.clone(),
        })
        .await
    }

    /// Replace a list's name, emoji and color
    ///
    /// # Errors
    ///
    /// Fails if the store is shutting down, or in strict mode if the write fails.
    pub async fn update_list(
        &self,
        list_id: &ListId,
        name: impl Into<String>,
        emoji: impl Into<String>,
        color: impl Into<String>,
    ) -> Result<(), ReminderError> {
        self.dispatch(ReminderAction::UpdateList {
            list_id: list_id.clone(),
            name: name.into(),
            emoji: emoji.into(),
            color: color.into(),
        })
        .await
    }

    /// Select the list to show; the id is not checked
    ///
    /// # Errors
    ///
    /// Fails if the store is shutting down, or in strict mode if the write fails.
    pub async fn set_current_list(&self, list_id: &ListId) -> Result<(), ReminderError> {
        self.dispatch(ReminderAction::SetCurrentList {
            list_id: list_id.clone(),
        })
        .await
    }

    /// The current list, if set and existing
    pub async fn current_list(&self) -> Option<ReminderList> {
        self.store.state(|s| s.current_list().cloned()).await
    }

    /// Append an item to the current list
    ///
    /// Returns the new item's id, or `None` when there is no current list.
    ///
    /// # Errors
    ///
    /// Fails if the store is shutting down, or in strict mode if the write fails.
    pub async fn add_item(
        &self,
        title: impl Into<String>,
        category: impl Into<String>,
    ) -> Result<Option<ItemId>, ReminderError> {
        let id = ItemId::new(self.store.environment().ids.next_id());
        let added = self
            .apply(ReminderAction::AddItem {
                id: id.clone(),
                title: title.into(),
                category: category.into(),
            })
            .await?;
        Ok(added.then_some(id))
    }

    /// Flip an item of the current list
    ///
    /// # Errors
    ///
    /// Fails if the store is shutting down, or in strict mode if the write fails.
    pub async fn toggle_item(&self, item_id: &ItemId) -> Result<(), ReminderError> {
        self.dispatch(ReminderAction::ToggleItem {
            item_id: item_id.clone(),
        })
        .await
    }

    /// Remove an item from the current list
    ///
    /// # Errors
    ///
    /// Fails if the store is shutting down, or in strict mode if the write fails.
    pub async fn delete_item(&self, item_id: &ItemId) -> Result<(), ReminderError> {
        self.dispatch(ReminderAction::DeleteItem {
            item_id: item_id.clone(),
        })
        .await
    }

    /// Replace title and category of an item in the current list
    ///
    /// # Errors
    ///
    /// Fails if the store is shutting down, or in strict mode if the write fails.
    pub async fn update_item(
        &self,
        item_id: &ItemId,
        title: impl Into<String>,
        category: impl Into<String>,
    ) -> Result<(), ReminderError> {
        self.dispatch(ReminderAction::UpdateItem {
            item_id: item_id.clone(),
            title: title.into(),
            category: category.into(),
        })
        .await
    }

    /// Uncheck every item of the current list
    ///
    /// # Errors
    ///
    /// Fails if the store is shutting down, or in strict mode if the write fails.
    pub async fn reset_all_items(&self) -> Result<(), ReminderError> {
        self.dispatch(ReminderAction::ResetAllItems).await
    }

    /// Remove every item of the current list in `category`
    ///
    /// # Errors
    ///
    /// Fails if the store is shutting down, or in strict mode if the write fails.
    pub async fn delete_category(&self, category: impl Into<String>) -> Result<(), ReminderError> {
        self.dispatch(ReminderAction::DeleteCategory {
            category: category.into(),
        })
        .await
    }

    /// Unchecked items in the current list
    pub async fn unchecked_count(&self) -> usize {
        self.store.state(ReminderState::unchecked_count).await
    }

    /// Completed versus total items in the current list
    pub async fn total_progress(&self) -> Progress {
        self.store.state(ReminderState::total_progress).await
    }

    /// Current list grouped by category
    pub async fn items_by_category(&self) -> Vec<CategoryGroup> {
        self.store.state(ReminderState::items_by_category).await
    }

    /// Immutable snapshot of the whole state
    ///
    /// Later mutations never show through a snapshot already taken.
    pub async fn snapshot(&self) -> ReminderState {
        self.store.state(ReminderState::clone).await
    }

    /// Receive every action applied to the store, after it is applied
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ReminderAction> {
        self.store.subscribe_actions()
    }

    /// Write the current snapshot now, unless it is already stored
    ///
    /// # Errors
    ///
    /// Returns [`ReminderError::Persistence`] if encoding or the write fails.
    pub async fn flush(&self) -> Result<(), ReminderError> {
        let snapshot = self.snapshot().await;
        self.store.environment().snapshots.save(&snapshot).await?;
        Ok(())
    }

    /// Stop accepting actions, wait for background writes, then flush
    ///
    /// The final flush runs even when draining times out.
    ///
    /// # Errors
    ///
    /// Returns the drain timeout first, otherwise the flush failure.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), ReminderError> {
        let drained = self.store.shutdown(timeout).await;
        let flushed = self.flush().await;
        if let Err(error) = &drained {
            tracing::warn!(%error, "Reminder store did not drain before shutdown");
        }
        drained?;
        flushed
    }
}

impl std::fmt::Debug for Reminders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reminders")
            .field("environment", self.store.environment())
            .field("load_source", &self.load_source)
            .finish_non_exhaustive()
    }
}
