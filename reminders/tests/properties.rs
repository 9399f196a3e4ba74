//! Property tests for the reminder reducer.
//!
//! Random action sequences are applied to the default dataset; the
//! properties must hold for every reachable state.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use reminders::defaults::default_state;
use reminders::{
    ItemId, ListId, PersistenceMode, ReminderAction, ReminderEnvironment, ReminderReducer,
    ReminderState,
};
use reminders_core::reducer::Reducer;
use reminders_testing::{InMemoryStorage, SequentialIdGenerator, test_clock};
use std::collections::HashSet;
use std::sync::Arc;

/// A step resolved against the state it is applied to
#[derive(Clone, Debug)]
enum Step {
    Apply(ReminderAction),
    SelectExisting(usize),
    DeleteCurrent,
}

fn env() -> ReminderEnvironment {
    ReminderEnvironment::new(
        Arc::new(test_clock()),
        Arc::new(SequentialIdGenerator::default()),
        Arc::new(InMemoryStorage::new()),
    )
    .with_persistence(PersistenceMode::Strict)
}

fn item_id() -> impl Strategy<Value = ItemId> {
    prop::sample::select(vec!["1", "2", "3", "4", "travel-1", "gym-2", "n-0", "n-1", "n-2"])
        .prop_map(ItemId::from)
}

fn list_id() -> impl Strategy<Value = ListId> {
    prop::sample::select(vec!["leaving-home", "travel-prep", "gym-session", "l-0", "l-1"])
        .prop_map(ListId::from)
}

fn category() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["Essential", "Personal", "Documents", "Misc"])
        .prop_map(String::from)
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => item_id().prop_map(|item_id| Step::Apply(ReminderAction::ToggleItem { item_id })),
        2 => (item_id(), category()).prop_map(|(id, category)| Step::Apply(ReminderAction::AddItem {
            id,
            title: "Thing".to_string(),
            category,
        })),
        1 => item_id().prop_map(|item_id| Step::Apply(ReminderAction::DeleteItem { item_id })),
        1 => (item_id(), category()).prop_map(|(item_id, category)| Step::Apply(ReminderAction::UpdateItem {
            item_id,
            title: "Renamed".to_string(),
            category,
        })),
        1 => Just(Step::Apply(ReminderAction::ResetAllItems)),
        1 => category().prop_map(|category| Step::Apply(ReminderAction::DeleteCategory { category })),
        1 => list_id().prop_map(|id| Step::Apply(ReminderAction::AddList {
            id,
            name: "List".to_string(),
            emoji: "📋".to_string(),
            color: "bg-gray-500".to_string(),
        })),
        1 => list_id().prop_map(|list_id| Step::Apply(ReminderAction::DeleteList { list_id })),
        1 => list_id().prop_map(|list_id| Step::Apply(ReminderAction::UpdateList {
            list_id,
            name: "Renamed list".to_string(),
            emoji: "🗂️".to_string(),
            color: "bg-slate-500".to_string(),
        })),
        1 => (0usize..8).prop_map(Step::SelectExisting),
        1 => Just(Step::DeleteCurrent),
    ]
}

fn run(steps: &[Step]) -> ReminderState {
    let reducer = ReminderReducer::new();
    let env = env();
    let mut state = default_state(&test_clock());
    for step in steps {
        let action = match step {
            Step::Apply(action) => action.clone(),
            Step::SelectExisting(index) => {
                if state.lists.is_empty() {
                    continue;
                }
                ReminderAction::SetCurrentList {
                    list_id: state.lists[index % state.lists.len()].id.clone(),
                }
            },
            Step::DeleteCurrent => match &state.current_list_id {
                Some(list_id) => ReminderAction::DeleteList {
                    list_id: list_id.clone(),
                },
                None => continue,
            },
        };
        let _ = reducer.reduce(&mut state, action, &env);
    }
    state
}

fn apply(state: &mut ReminderState, action: ReminderAction) {
    let _ = ReminderReducer::new().reduce(state, action, &env());
}

proptest! {
    #[test]
    fn queries_agree_with_each_other(steps in prop::collection::vec(step(), 0..40)) {
        let state = run(&steps);
        let progress = state.total_progress();

        prop_assert_eq!(state.unchecked_count(), progress.total - progress.completed);
        prop_assert_eq!(state.current_list().is_none(), state.current_list_id.is_none()
            || state.list(state.current_list_id.as_ref().unwrap()).is_none());
    }

    #[test]
    fn ids_stay_unique(steps in prop::collection::vec(step(), 0..40)) {
        let state = run(&steps);

        let list_ids: HashSet<_> = state.lists.iter().map(|l| &l.id).collect();
        prop_assert_eq!(list_ids.len(), state.lists.len());
        for list in state.lists.iter() {
            let item_ids: HashSet<_> = list.items.iter().map(|i| &i.id).collect();
            prop_assert_eq!(item_ids.len(), list.items.len());
        }
    }

    #[test]
    fn current_list_never_dangles_without_explicit_selection(
        steps in prop::collection::vec(step(), 0..40),
    ) {
        let state = run(&steps);
        if let Some(current) = &state.current_list_id {
            prop_assert!(state.list(current).is_some());
        }
    }

    #[test]
    fn toggle_twice_is_identity(
        steps in prop::collection::vec(step(), 0..30),
        pick in 0usize..16,
    ) {
        let mut state = run(&steps);
        let Some(list) = state.current_list() else {
            return Ok(());
        };
        if list.items.is_empty() {
            return Ok(());
        }
        let item_id = list.items[pick % list.items.len()].id.clone();
        let before = state.lists.clone();

        apply(&mut state, ReminderAction::ToggleItem { item_id: item_id.clone() });
        prop_assert_ne!(&before, &state.lists);
        apply(&mut state, ReminderAction::ToggleItem { item_id });
        prop_assert_eq!(before, state.lists);
    }

    #[test]
    fn reset_is_idempotent(steps in prop::collection::vec(step(), 0..30)) {
        let mut state = run(&steps);

        apply(&mut state, ReminderAction::ResetAllItems);
        let once = state.clone();
        apply(&mut state, ReminderAction::ResetAllItems);

        prop_assert!(once.same_snapshot(&state));
        prop_assert_eq!(once.revision, state.revision);
        if let Some(list) = state.current_list() {
            prop_assert!(list.items.iter().all(|item| !item.is_checked));
        }
    }

    #[test]
    fn deleting_current_list_selects_a_remaining_one(
        steps in prop::collection::vec(step(), 0..30),
    ) {
        let mut state = run(&steps);
        let Some(current) = state.current_list().map(|l| l.id.clone()) else {
            return Ok(());
        };
        if state.lists.len() < 2 {
            return Ok(());
        }

        apply(&mut state, ReminderAction::DeleteList { list_id: current.clone() });

        let next = state.current_list_id.clone().unwrap();
        prop_assert_ne!(&next, &current);
        prop_assert!(state.list(&next).is_some());
        prop_assert_eq!(&state.lists[0].id, &next);
    }

    #[test]
    fn mutations_on_unknown_ids_change_nothing(
        steps in prop::collection::vec(step(), 0..30),
    ) {
        let mut state = run(&steps);
        let before = state.clone();

        apply(&mut state, ReminderAction::UpdateList {
            list_id: ListId::from("unknown-list"),
            name: "X".to_string(),
            emoji: "X".to_string(),
            color: "X".to_string(),
        });
        apply(&mut state, ReminderAction::DeleteList { list_id: ListId::from("unknown-list") });
        apply(&mut state, ReminderAction::ToggleItem { item_id: ItemId::from("unknown-item") });
        apply(&mut state, ReminderAction::UpdateItem {
            item_id: ItemId::from("unknown-item"),
            title: "X".to_string(),
            category: "X".to_string(),
        });
        apply(&mut state, ReminderAction::DeleteItem { item_id: ItemId::from("unknown-item") });

        prop_assert!(before.same_snapshot(&state));
        prop_assert_eq!(before.revision, state.revision);
    }

    #[test]
    fn add_item_appends_one_unchecked_item(
        steps in prop::collection::vec(step(), 0..30),
        title in "[A-Za-z ]{1,12}",
        cat in category(),
    ) {
        let mut state = run(&steps);
        let Some(before) = state.current_list().map(|l| l.items.len()) else {
            return Ok(());
        };

        apply(&mut state, ReminderAction::AddItem {
            id: ItemId::from("fresh"),
            title: title.clone(),
            category: cat.clone(),
        });

        let list = state.current_list().unwrap();
        prop_assert_eq!(list.items.len(), before + 1);
        let added = list.items.last().unwrap();
        prop_assert_eq!(&added.title, &title);
        prop_assert_eq!(&added.category, &cat);
        prop_assert!(!added.is_checked);
    }
}
