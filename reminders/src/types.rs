//! Domain types for reminder lists.
//!
//! A [`ReminderState`] is an ordered sequence of [`ReminderList`]s plus the id of
//! the list currently on screen. Each list owns an ordered sequence of
//! [`ReminderItem`]s; insertion order is display order.
//!
//! Both sequences live behind `Arc`. The reducer replaces them with
//! `Arc::make_mut`, so a snapshot cloned out of the store keeps seeing exactly
//! what it saw when it was taken, and "did anything change?" is a pointer
//! comparison.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Unique identifier for a reminder list
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListId(String);

impl ListId {
    /// Creates a `ListId` from any string
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ListId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl std::fmt::Display for ListId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a reminder item
///
/// Ids are plain strings, but an item is only ever addressed through the
/// list that owns it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Creates an `ItemId` from any string
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single checkable entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderItem {
    /// Unique identifier, stable for the item's lifetime
    pub id: ItemId,
    /// Display text
    pub title: String,
    /// Completion flag
    pub is_checked: bool,
    /// Free-text label used for grouping
    pub category: String,
    /// When the item was created
    pub created_at: DateTime<Utc>,
}

impl ReminderItem {
    /// Creates a new, unchecked item
    #[must_use]
    pub fn new(
        id: ItemId,
        title: impl Into<String>,
        category: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            is_checked: false,
            category: category.into(),
            created_at,
        }
    }
}

/// Completed versus total items of one list
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Progress {
    /// Items with `is_checked == true`
    pub completed: usize,
    /// All items
    pub total: usize,
}

impl Progress {
    /// Items still unchecked
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.total.saturating_sub(self.completed)
    }

    /// Whether every item is checked (an empty list is not complete)
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}

/// Items of one category, in display order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryGroup {
    /// Category label
    pub category: String,
    /// Items carrying that label, in list order
    pub items: Vec<ReminderItem>,
}

/// A named, emoji/color-tagged collection of items
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderList {
    /// Unique identifier
    pub id: ListId,
    /// Display name
    pub name: String,
    /// Display emoji
    pub emoji: String,
    /// Display color token (e.g. `bg-blue-500`)
    pub color: String,
    /// Items in display order
    pub items: Arc<Vec<ReminderItem>>,
    /// When the list was created
    pub created_at: DateTime<Utc>,
}

impl ReminderList {
    /// Creates a new, empty list
    #[must_use]
    pub fn new(
        id: ListId,
        name: impl Into<String>,
        emoji: impl Into<String>,
        color: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            emoji: emoji.into(),
            color: color.into(),
            items: Arc::new(Vec::new()),
            created_at,
        }
    }

    /// Builder-style helper to attach items
    #[must_use]
    pub fn with_items(mut self, items: Vec<ReminderItem>) -> Self {
        self.items = Arc::new(items);
        self
    }

    /// Returns an item by id
    #[must_use]
    pub fn item(&self, id: &ItemId) -> Option<&ReminderItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub(crate) fn item_position(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }

    /// Number of unchecked items
    #[must_use]
    pub fn unchecked_count(&self) -> usize {
        self.items.iter().filter(|item| !item.is_checked).count()
    }

    /// Completed versus total items
    #[must_use]
    pub fn progress(&self) -> Progress {
        let completed = self.items.iter().filter(|item| item.is_checked).count();
        Progress {
            completed,
            total: self.items.len(),
        }
    }

    /// Items grouped by category
    ///
    /// Groups appear in the order their category first occurs; items keep
    /// their list order inside a group.
    #[must_use]
    pub fn items_by_category(&self) -> Vec<CategoryGroup> {
        let mut groups: Vec<CategoryGroup> = Vec::new();
        for item in self.items.iter() {
            match groups.iter_mut().find(|g| g.category == item.category) {
                Some(group) => group.items.push(item.clone()),
                None => groups.push(CategoryGroup {
                    category: item.category.clone(),
                    items: vec![item.clone()],
                }),
            }
        }
        groups
    }
}

/// Full store state: one snapshot
///
/// Only `lists` and `current_list_id` are persisted.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderState {
    /// Lists in display order; ids are unique
    pub lists: Arc<Vec<ReminderList>>,
    /// The list on screen, if any
    pub current_list_id: Option<ListId>,
    /// Bumped by every change that has to reach storage
    #[serde(skip)]
    pub revision: u64,
    /// Most recent background persistence failure of this session
    #[serde(skip)]
    pub last_persist_error: Option<String>,
}

impl ReminderState {
    /// Creates a state from lists and a current list id
    #[must_use]
    pub fn new(lists: Vec<ReminderList>, current_list_id: Option<ListId>) -> Self {
        Self {
            lists: Arc::new(lists),
            current_list_id,
            revision: 0,
            last_persist_error: None,
        }
    }

    /// Returns a list by id
    #[must_use]
    pub fn list(&self, id: &ListId) -> Option<&ReminderList> {
        self.lists.iter().find(|list| &list.id == id)
    }

    pub(crate) fn list_position(&self, id: &ListId) -> Option<usize> {
        self.lists.iter().position(|list| &list.id == id)
    }

    pub(crate) fn current_position(&self) -> Option<usize> {
        self.current_list_id
            .as_ref()
            .and_then(|id| self.list_position(id))
    }

    /// The current list; `None` if unset or pointing at no list
    #[must_use]
    pub fn current_list(&self) -> Option<&ReminderList> {
        self.current_list_id.as_ref().and_then(|id| self.list(id))
    }

    /// Unchecked items in the current list (0 without one)
    #[must_use]
    pub fn unchecked_count(&self) -> usize {
        self.current_list()
            .map_or(0, ReminderList::unchecked_count)
    }

    /// Progress of the current list (`0/0` without one)
    #[must_use]
    pub fn total_progress(&self) -> Progress {
        self.current_list()
            .map(ReminderList::progress)
            .unwrap_or_default()
    }

    /// Category groups of the current list (empty without one)
    #[must_use]
    pub fn items_by_category(&self) -> Vec<CategoryGroup> {
        self.current_list()
            .map(ReminderList::items_by_category)
            .unwrap_or_default()
    }

    /// Whether `other` shares this snapshot's list storage and current list.
    ///
    /// Cheap change detection: a mutation always replaces `lists`.
    #[must_use]
    pub fn same_snapshot(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.lists, &other.lists) && self.current_list_id == other.current_list_id
    }
}

/// Actions accepted by the reminder reducer
///
/// Ids for new lists and items are chosen by the caller, so the caller
/// knows them without reading the state back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReminderAction {
    /// Append a new empty list
    AddList {
        /// Id of the new list
        id: ListId,
        /// Display name
        name: String,
        /// Display emoji
        emoji: String,
        /// Display color token
        color: String,
    },

    /// Remove a list and its items
    DeleteList {
        /// List to remove
        list_id: ListId,
    },

    /// Replace a list's display metadata
    UpdateList {
        /// List to update
        list_id: ListId,
        /// New name
        name: String,
        /// New emoji
        emoji: String,
        /// New color token
        color: String,
    },

    /// Make a list current (the id is not checked)
    SetCurrentList {
        /// List to show
        list_id: ListId,
    },

    /// Append an unchecked item to the current list
    AddItem {
        /// Id of the new item
        id: ItemId,
        /// Display text
        title: String,
        /// Category label
        category: String,
    },

    /// Flip an item of the current list
    ToggleItem {
        /// Item to flip
        item_id: ItemId,
    },

    /// Remove an item from the current list
    DeleteItem {
        /// Item to remove
        item_id: ItemId,
    },

    /// Replace title and category of an item in the current list
    UpdateItem {
        /// Item to update
        item_id: ItemId,
        /// New title
        title: String,
        /// New category
        category: String,
    },

    /// Uncheck every item of the current list
    ResetAllItems,

    /// Remove every item of the current list carrying `category`
    DeleteCategory {
        /// Category label to clear
        category: String,
    },

    /// Feedback: a background write of the state failed
    PersistFailed {
        /// Error message
        error: String,
    },
}
