//! Reminder reducer.
//!
//! Every mutation goes through [`ReminderReducer`]. A mutation that changes
//! nothing (unknown id, no current list, duplicate id) leaves the state
//! untouched: no new snapshot, no revision bump, no persistence.

use crate::persistence::{self, STORAGE_KEY, SnapshotWriter};
use crate::types::{ItemId, ListId, ReminderAction, ReminderItem, ReminderList, ReminderState};
use reminders_core::environment::{Clock, IdGenerator};
use reminders_core::storage::KeyValueStorage;
use reminders_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// When mutations reach storage
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PersistenceMode {
    /// The reducer emits a background write; failures come back as
    /// [`ReminderAction::PersistFailed`] and are never reported to the caller
    #[default]
    FireAndForget,
    /// No background write; the caller awaits the write after each mutation
    /// and sees its error
    Strict,
}

impl std::str::FromStr for PersistenceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fire-and-forget" | "background" => Ok(Self::FireAndForget),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown persistence mode: {other}")),
        }
    }
}

/// Environment for the reminder reducer
#[derive(Clone)]
pub struct ReminderEnvironment {
    /// Timestamps for new lists and items
    pub clock: Arc<dyn Clock>,
    /// Ids for new lists and items
    pub ids: Arc<dyn IdGenerator>,
    /// Ordered writer for the persisted snapshot
    pub snapshots: Arc<SnapshotWriter>,
    /// When mutations reach storage
    pub persistence: PersistenceMode,
}

impl ReminderEnvironment {
    /// Creates an environment persisting under [`STORAGE_KEY`] in fire-and-forget mode
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        storage: Arc<dyn KeyValueStorage>,
    ) -> Self {
        Self {
            clock,
            ids,
            snapshots: Arc::new(SnapshotWriter::new(storage, STORAGE_KEY)),
            persistence: PersistenceMode::default(),
        }
    }

    /// Use another storage key
    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.snapshots = Arc::new(SnapshotWriter::new(self.snapshots.storage(), key));
        self
    }

    /// Use another persistence mode
    #[must_use]
    pub const fn with_persistence(mut self, persistence: PersistenceMode) -> Self {
        self.persistence = persistence;
        self
    }
}

impl std::fmt::Debug for ReminderEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReminderEnvironment")
            .field("snapshots", &self.snapshots)
            .field("persistence", &self.persistence)
            .finish_non_exhaustive()
    }
}

/// Reducer for reminder lists
#[derive(Clone, Debug, Default)]
pub struct ReminderReducer;

impl ReminderReducer {
    /// Creates a new `ReminderReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn add_list(state: &mut ReminderState, list: ReminderList) -> bool {
        if state.list(&list.id).is_some() {
            tracing::warn!(list_id = %list.id, "List id already taken, ignoring");
            return false;
        }
        Arc::make_mut(&mut state.lists).push(list);
        true
    }

    fn delete_list(state: &mut ReminderState, list_id: &ListId) -> bool {
        let Some(index) = state.list_position(list_id) else {
            return false;
        };
        Arc::make_mut(&mut state.lists).remove(index);

        if state.current_list_id.as_ref() == Some(list_id) {
            state.current_list_id = state.lists.first().map(|list| list.id.clone());
        }
        true
    }

    fn update_list(
        state: &mut ReminderState,
        list_id: &ListId,
        name: String,
        emoji: String,
        color: String,
    ) -> bool {
        let Some(index) = state.list_position(list_id) else {
            return false;
        };
        let list = &mut Arc::make_mut(&mut state.lists)[index];
        list.name = name;
        list.emoji = emoji;
        list.color = color;
        true
    }

    fn set_current_list(state: &mut ReminderState, list_id: ListId) -> bool {
        if state.current_list_id.as_ref() == Some(&list_id) {
            return false;
        }
        if state.list(&list_id).is_none() {
            tracing::debug!(list_id = %list_id, "Selecting a list that does not exist");
        }
        state.current_list_id = Some(list_id);
        true
    }

    /// Items of the current list, copied on write.
    ///
    /// Only call once the mutation is known to change something.
    fn current_items_mut(state: &mut ReminderState, index: usize) -> &mut Vec<ReminderItem> {
        let list = &mut Arc::make_mut(&mut state.lists)[index];
        Arc::make_mut(&mut list.items)
    }

    fn add_item(state: &mut ReminderState, item: ReminderItem) -> bool {
        let Some(index) = state.current_position() else {
            tracing::debug!("No current list, item not added");
            return false;
        };
        if state.lists[index].item(&item.id).is_some() {
            tracing::warn!(item_id = %item.id, "Item id already taken, ignoring");
            return false;
        }
        Self::current_items_mut(state, index).push(item);
        true
    }

    fn with_current_item(
        state: &mut ReminderState,
        item_id: &ItemId,
        apply: impl FnOnce(&mut Vec<ReminderItem>, usize),
    ) -> bool {
        let Some(index) = state.current_position() else {
            return false;
        };
        let Some(position) = state.lists[index].item_position(item_id) else {
            return false;
        };
        apply(Self::current_items_mut(state, index), position);
        true
    }

    fn reset_all_items(state: &mut ReminderState) -> bool {
        let Some(index) = state.current_position() else {
            return false;
        };
        if state.lists[index].items.iter().all(|item| !item.is_checked) {
            return false;
        }
        for item in Self::current_items_mut(state, index) {
            item.is_checked = false;
        }
        true
    }

    fn delete_category(state: &mut ReminderState, category: &str) -> bool {
        let Some(index) = state.current_position() else {
            return false;
        };
        if !state.lists[index]
            .items
            .iter()
            .any(|item| item.category == category)
        {
            return false;
        }
        Self::current_items_mut(state, index).retain(|item| item.category != category);
        true
    }
}

impl Reducer for ReminderReducer {
    type State = ReminderState;
    type Action = ReminderAction;
    type Environment = ReminderEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let changed = match action {
            ReminderAction::AddList {
                id,
                name,
                emoji,
                color,
            } => Self::add_list(
                state,
                ReminderList::new(id, name, emoji, color, env.clock.now()),
            ),

            ReminderAction::DeleteList { list_id } => Self::delete_list(state, &list_id),

            ReminderAction::UpdateList {
                list_id,
                name,
                emoji,
                color,
            } => Self::update_list(state, &list_id, name, emoji, color),

            ReminderAction::SetCurrentList { list_id } => Self::set_current_list(state, list_id),

            ReminderAction::AddItem {
                id,
                title,
                category,
            } => Self::add_item(
                state,
                ReminderItem::new(id, title, category, env.clock.now()),
            ),

            ReminderAction::ToggleItem { item_id } => {
                Self::with_current_item(state, &item_id, |items, position| {
                    items[position].is_checked = !items[position].is_checked;
                })
            },

            ReminderAction::DeleteItem { item_id } => {
                Self::with_current_item(state, &item_id, |items, position| {
                    items.remove(position);
                })
            },

            ReminderAction::UpdateItem {
                item_id,
                title,
                category,
            } => Self::with_current_item(state, &item_id, |items, position| {
                items[position].title = title;
                items[position].category = category;
            }),

            ReminderAction::ResetAllItems => Self::reset_all_items(state),

            ReminderAction::DeleteCategory { category } => Self::delete_category(state, &category),

            ReminderAction::PersistFailed { error } => {
                state.last_persist_error = Some(error);
                return SmallVec::new();
            },
        };

        if !changed {
            return SmallVec::new();
        }

        state.revision += 1;
        match env.persistence {
            PersistenceMode::FireAndForget => {
                smallvec![persistence::persist_effect(Arc::clone(&env.snapshots), state)]
            },
            PersistenceMode::Strict => SmallVec::new(),
        }
    }
}
