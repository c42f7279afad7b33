//! Properties of the list filter over arbitrary task collections.

use chrono::{TimeZone, Utc};
use goal_digger_core::{derive_filtered_view, ListFilter, Task};
use proptest::prelude::*;
use uuid::Uuid;

const LIST_POOL: [u128; 3] = [1, 2, 3];

fn task_strategy() -> impl Strategy<Value = Task> {
    (
        any::<u128>(),
        "[a-z]{1,8}",
        any::<bool>(),
        prop::option::of(prop::sample::select(LIST_POOL.to_vec())),
    )
        .prop_map(|(id, title, completed, list)| Task {
            task_id: Uuid::from_u128(id),
            user_id: Uuid::from_u128(42),
            title,
            description: None,
            completed,
            created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            list_id: list.map(Uuid::from_u128),
            due_date: None,
        })
}

proptest! {
    #[test]
    fn all_is_identity(tasks in prop::collection::vec(task_strategy(), 0..20)) {
        let view = derive_filtered_view(&tasks, &ListFilter::All);
        let view: Vec<Task> = view.into_iter().cloned().collect();
        prop_assert_eq!(view, tasks);
    }

    #[test]
    fn unassigned_is_ordered_subset_without_list(tasks in prop::collection::vec(task_strategy(), 0..20)) {
        let before = tasks.clone();
        let view = derive_filtered_view(&tasks, &ListFilter::Unassigned);
        let expected: Vec<&Task> = tasks.iter().filter(|t| t.list_id.is_none()).collect();
        prop_assert_eq!(view, expected);
        prop_assert_eq!(&tasks, &before);
    }

    #[test]
    fn list_selects_exact_references(
        tasks in prop::collection::vec(task_strategy(), 0..20),
        pick in prop::sample::select(LIST_POOL.to_vec()),
    ) {
        let list_id = Uuid::from_u128(pick);
        let view = derive_filtered_view(&tasks, &ListFilter::List(list_id));
        let expected: Vec<&Task> = tasks.iter().filter(|t| t.list_id == Some(list_id)).collect();
        prop_assert_eq!(view, expected);
    }
}
