//! End-to-end tests through the `Reminders` handle.

#![allow(clippy::unwrap_used)]

use reminders::{
    ItemId, ListId, LoadSource, PersistenceMode, Progress, ReminderAction, ReminderEnvironment,
    ReminderError, Reminders, STORAGE_KEY,
};
use reminders_testing::{FailingStorage, InMemoryStorage, SequentialIdGenerator, test_clock};
use std::sync::Arc;
use std::time::Duration;

fn env_with(storage: Arc<dyn reminders_core::storage::KeyValueStorage>) -> ReminderEnvironment {
    ReminderEnvironment::new(
        Arc::new(test_clock()),
        Arc::new(SequentialIdGenerator::new("gen")),
        storage,
    )
}

async fn open_fresh() -> (Reminders, InMemoryStorage) {
    let storage = InMemoryStorage::new();
    let reminders = Reminders::open(env_with(Arc::new(storage.clone()))).await;
    (reminders, storage)
}

/// Wait until background writes have finished.
async fn settle(reminders: &Reminders) {
    for _ in 0..200 {
        if reminders.store().pending_effects() == 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

#[tokio::test]
async fn toggling_an_item_of_the_default_list() {
    let (reminders, _storage) = open_fresh().await;
    assert_eq!(reminders.load_source(), &LoadSource::DefaultsMissing);
    assert_eq!(reminders.unchecked_count().await, 4);

    reminders.toggle_item(&ItemId::from("1")).await.unwrap();

    assert_eq!(reminders.unchecked_count().await, 3);
    let current = reminders.current_list().await.unwrap();
    assert!(current.item(&ItemId::from("1")).unwrap().is_checked);
}

#[tokio::test]
async fn new_list_gets_first_item() {
    let (reminders, _storage) = open_fresh().await;

    let packing = reminders
        .add_list("Packing", "🎒", "bg-pink-500")
        .await
        .unwrap();
    assert_eq!(packing, ListId::from("gen-1"));
    reminders.set_current_list(&packing).await.unwrap();
    let socks = reminders.add_item("Socks", "Clothes").await.unwrap();

    assert_eq!(socks, Some(ItemId::from("gen-2")));
    let current = reminders.current_list().await.unwrap();
    assert_eq!(current.name, "Packing");
    assert_eq!(current.items.len(), 1);
    assert_eq!(
        reminders.total_progress().await,
        Progress {
            completed: 0,
            total: 1
        }
    );
}

#[tokio::test]
async fn the_store_deletes_the_last_list() {
    let (reminders, _storage) = open_fresh().await;
    reminders
        .delete_list(&ListId::from("travel-prep"))
        .await
        .unwrap();
    reminders
        .delete_list(&ListId::from("gym-session"))
        .await
        .unwrap();

    // Refusing to delete the last list is left to the UI
    reminders
        .delete_list(&ListId::from("leaving-home"))
        .await
        .unwrap();

    let snapshot = reminders.snapshot().await;
    assert!(snapshot.lists.is_empty());
    assert!(snapshot.current_list_id.is_none());
    assert!(reminders.current_list().await.is_none());
    assert_eq!(reminders.add_item("Orphan", "None").await.unwrap(), None);
}

#[tokio::test]
async fn selecting_an_unknown_list_is_accepted() {
    let (reminders, _storage) = open_fresh().await;

    reminders
        .set_current_list(&ListId::from("does-not-exist"))
        .await
        .unwrap();

    let snapshot = reminders.snapshot().await;
    assert_eq!(snapshot.current_list_id, Some(ListId::from("does-not-exist")));
    assert!(reminders.current_list().await.is_none());
    assert_eq!(reminders.unchecked_count().await, 0);
}

#[tokio::test]
async fn item_operations_only_touch_the_current_list() {
    let (reminders, _storage) = open_fresh().await;
    let before = reminders.snapshot().await;

    reminders.toggle_item(&ItemId::from("travel-1")).await.unwrap();
    reminders.delete_item(&ItemId::from("gym-1")).await.unwrap();
    reminders
        .update_item(&ItemId::from("travel-2"), "Visa", "Documents")
        .await
        .unwrap();

    let snapshot = reminders.snapshot().await;
    assert!(before.same_snapshot(&snapshot));
    let travel = snapshot.list(&ListId::from("travel-prep")).unwrap();
    assert!(!travel.item(&ItemId::from("travel-1")).unwrap().is_checked);
    assert_eq!(travel.item(&ItemId::from("travel-2")).unwrap().title, "Tickets");
    let gym = snapshot.list(&ListId::from("gym-session")).unwrap();
    assert_eq!(gym.items.len(), 3);
}

#[tokio::test]
async fn updating_an_unknown_list_changes_nothing() {
    let (reminders, storage) = open_fresh().await;
    let before = reminders.snapshot().await;

    reminders
        .update_list(&ListId::from("nope"), "Ghost", "👻", "bg-black")
        .await
        .unwrap();
    settle(&reminders).await;

    let after = reminders.snapshot().await;
    assert!(before.same_snapshot(&after));
    assert!(after.lists.iter().all(|list| list.name != "Ghost"));
    assert_eq!(storage.write_count(), 0);
}

#[tokio::test]
async fn snapshots_are_not_affected_by_later_mutations() {
    let (reminders, _storage) = open_fresh().await;
    let before = reminders.snapshot().await;

    reminders.toggle_item(&ItemId::from("2")).await.unwrap();
    reminders.delete_category("Personal").await.unwrap();

    let after = reminders.snapshot().await;
    assert!(!before.same_snapshot(&after));
    assert_eq!(before.unchecked_count(), 4);
    assert_eq!(before.current_list().unwrap().items.len(), 4);
    assert_eq!(after.current_list().unwrap().items.len(), 3);
}

#[tokio::test]
async fn categories_group_and_delete() {
    let (reminders, _storage) = open_fresh().await;
    reminders.add_item("Umbrella", "Weather").await.unwrap();
    reminders
        .update_item(&ItemId::from("4"), "Sun hat", "Weather")
        .await
        .unwrap();

    let groups = reminders.items_by_category().await;
    let names: Vec<_> = groups.iter().map(|g| g.category.as_str()).collect();
    assert_eq!(names, vec!["Essential", "Weather"]);
    assert_eq!(groups[1].items.len(), 2);

    reminders.delete_category("Weather").await.unwrap();
    assert_eq!(reminders.total_progress().await.total, 3);
}

#[tokio::test]
async fn reset_unchecks_everything() {
    let (reminders, _storage) = open_fresh().await;
    for id in ["1", "2", "3", "4"] {
        reminders.toggle_item(&ItemId::from(id)).await.unwrap();
    }
    assert!(reminders.total_progress().await.is_complete());

    reminders.reset_all_items().await.unwrap();
    assert_eq!(reminders.unchecked_count().await, 4);
}

#[tokio::test]
async fn subscribers_see_each_mutation() {
    let (reminders, _storage) = open_fresh().await;
    let mut rx = reminders.subscribe();

    reminders
        .update_list(&ListId::from("leaving-home"), "Out the door", "🚪", "bg-teal-500")
        .await
        .unwrap();

    let action = rx.recv().await.unwrap();
    assert!(matches!(action, ReminderAction::UpdateList { name, .. } if name == "Out the door"));
    assert_eq!(reminders.current_list().await.unwrap().emoji, "🚪");
}

#[tokio::test]
async fn mutations_persist_and_reload() {
    let (reminders, storage) = open_fresh().await;
    reminders.toggle_item(&ItemId::from("3")).await.unwrap();
    reminders.add_list("Errands", "🛒", "bg-orange-500").await.unwrap();
    settle(&reminders).await;

    let document: serde_json::Value =
        serde_json::from_str(&storage.value(STORAGE_KEY).unwrap()).unwrap();
    assert_eq!(document["version"], 0);
    assert_eq!(document["state"]["lists"].as_array().unwrap().len(), 4);

    let reopened = Reminders::open(env_with(Arc::new(storage.clone()))).await;
    assert_eq!(reopened.load_source(), &LoadSource::Persisted);
    assert_eq!(reopened.unchecked_count().await, 3);
    assert_eq!(reopened.snapshot().await.lists.len(), 4);
}

#[tokio::test]
async fn noop_mutations_do_not_write() {
    let (reminders, storage) = open_fresh().await;

    reminders.toggle_item(&ItemId::from("missing")).await.unwrap();
    reminders.reset_all_items().await.unwrap();
    reminders
        .set_current_list(&ListId::from("leaving-home"))
        .await
        .unwrap();
    reminders
        .update_item(&ItemId::from("travel-1"), "Renamed", "Documents")
        .await
        .unwrap();
    settle(&reminders).await;

    assert_eq!(storage.write_count(), 0);
}

#[tokio::test]
async fn strict_mode_noops_do_not_write() {
    let storage = InMemoryStorage::new();
    let env = env_with(Arc::new(storage.clone())).with_persistence(PersistenceMode::Strict);
    let reminders = Reminders::open(env).await;

    reminders.toggle_item(&ItemId::from("missing")).await.unwrap();
    reminders
        .update_list(&ListId::from("nope"), "Ghost", "👻", "bg-black")
        .await
        .unwrap();
    reminders.reset_all_items().await.unwrap();

    assert_eq!(storage.write_count(), 0);
    assert!(!storage.contains_key(STORAGE_KEY));
}

#[tokio::test]
async fn strict_mode_noops_succeed_on_failing_storage() {
    let env = env_with(Arc::new(FailingStorage::write_only_failures()))
        .with_persistence(PersistenceMode::Strict);
    let reminders = Reminders::open(env).await;
    let before = reminders.snapshot().await;

    reminders.toggle_item(&ItemId::from("missing")).await.unwrap();
    reminders
        .update_list(&ListId::from("nope"), "Ghost", "👻", "bg-black")
        .await
        .unwrap();
    reminders
        .delete_list(&ListId::from("nope"))
        .await
        .unwrap();

    assert!(before.same_snapshot(&reminders.snapshot().await));
}

#[tokio::test]
async fn add_item_reports_the_item_while_lists_switch() {
    let (reminders, _storage) = open_fresh().await;
    let lists = [ListId::from("leaving-home"), ListId::from("travel-prep")];

    let tasks: Vec<_> = (0..16)
        .map(|n| {
            let reminders = reminders.clone();
            let list = lists[n % 2].clone();
            tokio::spawn(async move {
                if n % 3 == 0 {
                    reminders.set_current_list(&list).await.unwrap();
                }
                reminders.add_item(format!("Item {n}"), "Misc").await.unwrap()
            })
        })
        .collect();

    for task in tasks {
        let id = task.await.unwrap().unwrap();
        let snapshot = reminders.snapshot().await;
        assert!(
            snapshot.lists.iter().any(|list| list.item(&id).is_some()),
            "{id} missing"
        );
    }
}

#[tokio::test]
async fn background_failure_during_shutdown_is_recorded() {
    let reminders = Reminders::open(env_with(Arc::new(FailingStorage::new()))).await;

    reminders.toggle_item(&ItemId::from("2")).await.unwrap();
    let result = reminders.shutdown(Duration::from_secs(1)).await;

    assert!(matches!(result, Err(ReminderError::Persistence(_))));
    let snapshot = reminders.snapshot().await;
    assert!(snapshot.last_persist_error.unwrap().contains("disk full"));
}

#[tokio::test]
async fn unreadable_document_falls_back_to_defaults() {
    let storage = InMemoryStorage::with_item(
        STORAGE_KEY,
        r#"{"state":{"lists":[],"currentListId":null},"version":7}"#,
    );
    let reminders = Reminders::open(env_with(Arc::new(storage))).await;

    assert!(matches!(
        reminders.load_source(),
        LoadSource::DefaultsUnreadable(_)
    ));
    assert_eq!(reminders.snapshot().await.lists.len(), 3);
}

#[tokio::test]
async fn background_write_failures_stay_internal() {
    let reminders = Reminders::open(env_with(Arc::new(FailingStorage::new()))).await;

    reminders.toggle_item(&ItemId::from("1")).await.unwrap();
    settle(&reminders).await;

    let snapshot = reminders.snapshot().await;
    assert_eq!(snapshot.unchecked_count(), 3);
    assert!(snapshot.last_persist_error.unwrap().contains("disk full"));
}

#[tokio::test]
async fn strict_mode_reports_write_failures() {
    let env = env_with(Arc::new(FailingStorage::write_only_failures()))
        .with_persistence(PersistenceMode::Strict);
    let reminders = Reminders::open(env).await;

    let result = reminders.toggle_item(&ItemId::from("1")).await;

    assert!(matches!(result, Err(ReminderError::Persistence(_))));
    // The in-memory change still happened
    assert_eq!(reminders.unchecked_count().await, 3);
}

#[tokio::test]
async fn strict_mode_writes_before_returning() {
    let storage = InMemoryStorage::new();
    let env = env_with(Arc::new(storage.clone())).with_persistence(PersistenceMode::Strict);
    let reminders = Reminders::open(env).await;

    reminders.toggle_item(&ItemId::from("1")).await.unwrap();

    assert_eq!(storage.write_count(), 1);
    let stored = storage.value(STORAGE_KEY).unwrap();
    assert!(stored.contains("\"isChecked\":true"));
}

#[tokio::test]
async fn shutdown_flushes_and_rejects_new_work() {
    let (reminders, storage) = open_fresh().await;
    reminders.toggle_item(&ItemId::from("4")).await.unwrap();

    reminders.shutdown(Duration::from_secs(1)).await.unwrap();

    assert!(storage.contains_key(STORAGE_KEY));
    let result = reminders.toggle_item(&ItemId::from("1")).await;
    assert!(matches!(result, Err(ReminderError::Store(_))));
}

#[tokio::test]
async fn custom_storage_key() {
    let storage = InMemoryStorage::new();
    let env = env_with(Arc::new(storage.clone()))
        .with_storage_key("alt-key")
        .with_persistence(PersistenceMode::Strict);
    let reminders = Reminders::open(env).await;

    reminders.toggle_item(&ItemId::from("1")).await.unwrap();

    assert!(storage.contains_key("alt-key"));
    assert!(!storage.contains_key(STORAGE_KEY));
}
