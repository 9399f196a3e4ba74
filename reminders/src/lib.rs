//! Reminder lists: named checklists of items, grouped by category.
//!
//! The crate provides:
//!
//! - Domain types and derived queries ([`ReminderState`], [`ReminderList`],
//!   [`ReminderItem`], [`Progress`])
//! - A pure reducer over [`ReminderAction`]s with copy-on-write snapshots
//! - Persistence of the whole state as one versioned JSON document, with a
//!   fallback to a built-in dataset
//! - [`Reminders`], an async handle with one method per operation
//! - [`FileStorage`], a directory-backed storage backend
//!
//! # Quick Start
//!
//! ```no_run
//! use reminders::{Reminders, ReminderEnvironment, FileStorage};
//! use reminders_core::environment::{SystemClock, UuidIdGenerator};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let env = ReminderEnvironment::new(
//!     Arc::new(SystemClock),
//!     Arc::new(UuidIdGenerator),
//!     Arc::new(FileStorage::new("./.reminders")),
//! );
//! let reminders = Reminders::open(env).await;
//!
//! if let Some(id) = reminders.add_item("Umbrella", "Weather").await? {
//!     reminders.toggle_item(&id).await?;
//! }
//! println!("{} left", reminders.unchecked_count().await);
//!
//! reminders.shutdown(Duration::from_secs(5)).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod defaults;
pub mod facade;
pub mod file_storage;
pub mod persistence;
pub mod reducer;
pub mod types;

pub use config::Config;
pub use facade::{ReminderError, ReminderStore, Reminders};
pub use file_storage::FileStorage;
pub use persistence::{LoadSource, PersistenceError, STORAGE_KEY};
pub use reducer::{PersistenceMode, ReminderEnvironment, ReminderReducer};
pub use types::{
    CategoryGroup, ItemId, ListId, Progress, ReminderAction, ReminderItem, ReminderList,
    ReminderState,
};
