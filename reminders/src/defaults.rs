//! Built-in dataset used on first launch or when the stored state is unreadable.

use crate::types::{ItemId, ListId, ReminderItem, ReminderList, ReminderState};
use reminders_core::environment::Clock;

/// Id of the list selected in the default dataset
pub const DEFAULT_LIST_ID: &str = "leaving-home";

/// Three starter lists, with "Leaving Home" selected
///
/// Every timestamp is taken from `clock`.
#[must_use]
pub fn default_state(clock: &dyn Clock) -> ReminderState {
    let now = clock.now();
    let item = |id: &str, title: &str, category: &str| {
        ReminderItem::new(ItemId::from(id), title, category, now)
    };

    let lists = vec![
        ReminderList::new(ListId::from(DEFAULT_LIST_ID), "Leaving Home", "🏠", "bg-blue-500", now)
            .with_items(vec![
                item("1", "Keys", "Essential"),
                item("2", "Wallet", "Essential"),
                item("3", "Phone", "Essential"),
                item("4", "Sunglasses", "Personal"),
            ]),
        ReminderList::new(ListId::from("travel-prep"), "Travel Prep", "✈️", "bg-purple-500", now)
            .with_items(vec![
                item("travel-1", "Passport", "Documents"),
                item("travel-2", "Tickets", "Documents"),
                item("travel-3", "Chargers", "Electronics"),
            ]),
        ReminderList::new(ListId::from("gym-session"), "Gym Session", "💪", "bg-green-500", now)
            .with_items(vec![
                item("gym-1", "Water Bottle", "Essentials"),
                item("gym-2", "Towel", "Essentials"),
                item("gym-3", "Headphones", "Personal"),
            ]),
    ];

    ReminderState::new(lists, Some(ListId::from(DEFAULT_LIST_ID)))
}
