//! Property-based tests for board state invariants.
//!
//! Uses proptest to verify:
//! 1. After a merge every task id lives in exactly one column and each
//!    column is sorted by order with no duplicate orders.
//! 2. Inserting a task lands it at the clamped index, keeps the task count
//!    and leaves the destination numbered `0..n`.
//! 3. Re-inserting a task at its current position changes nothing.
//! 4. Assignee resolution is idempotent.

use std::collections::{BTreeMap, HashSet};

use proptest::prelude::*;
use serde_json::{Map, Value, json};

use kanban::board::{BoardStore, plan_insert};
use kanban::contacts::{Directory, resolve};
use kanban_proto::column::ColumnId;
use kanban_proto::task::TaskId;

// --- Strategies ---

/// A board of up to 12 tasks `t0..`, each in a random column with a
/// small (often duplicated) order.
fn arb_board() -> impl Strategy<Value = Value> {
    prop::collection::vec((0..4usize, 0..4i64), 0..12).prop_map(|tasks| {
        let mut columns: BTreeMap<&'static str, Map<String, Value>> = BTreeMap::new();
        for (i, (column, order)) in tasks.into_iter().enumerate() {
            columns
                .entry(ColumnId::ALL[column].as_str())
                .or_default()
                .insert(format!("t{i}"), json!({"order": order, "title": format!("Task {i}")}));
        }
        Value::Object(
            columns
                .into_iter()
                .map(|(key, tasks)| (key.to_string(), Value::Object(tasks)))
                .collect(),
        )
    })
}

fn merged(board: &Value) -> BoardStore {
    let mut store = BoardStore::new();
    store.merge(Some(board));
    store
}

fn all_ids(store: &BoardStore) -> Vec<TaskId> {
    ColumnId::ALL
        .iter()
        .flat_map(|c| store.get(*c).into_iter().map(|t| t.id.clone()))
        .collect()
}

// --- Properties ---

proptest! {
    #[test]
    fn merge_keeps_ids_unique_and_columns_sorted(board in arb_board()) {
        let store = merged(&board);
        let ids = all_ids(&store);
        let unique: HashSet<&TaskId> = ids.iter().collect();
        prop_assert_eq!(unique.len(), ids.len());

        for column in ColumnId::ALL {
            let orders: Vec<i64> = store.get(column).iter().map(|t| t.order).collect();
            prop_assert!(orders.windows(2).all(|w| w[0] < w[1]), "{:?}", orders);
            for task in store.get(column) {
                prop_assert_eq!(store.locate(&task.id), Some(column));
            }
        }
    }

    #[test]
    fn insert_lands_at_the_clamped_index(
        board in arb_board(),
        pick in any::<prop::sample::Index>(),
        target in 0..4usize,
        index in 0..16usize,
    ) {
        let mut store = merged(&board);
        let ids = all_ids(&store);
        prop_assume!(!ids.is_empty());
        let id = pick.get(&ids).clone();
        let target = ColumnId::ALL[target];
        let before = store.len();

        let others = store.get(target).iter().filter(|t| t.id != id).count();
        let plan = plan_insert(&store, &id, target, index).unwrap();
        store.apply(&plan);

        prop_assert_eq!(store.len(), before);
        prop_assert_eq!(store.locate(&id), Some(target));
        let column = store.get(target);
        prop_assert_eq!(&column[index.min(others)].id, &id);
        let orders: Vec<i64> = column.iter().map(|t| t.order).collect();
        let unique: HashSet<i64> = orders.iter().copied().collect();
        prop_assert_eq!(unique.len(), orders.len());
    }

    #[test]
    fn insert_at_current_position_is_a_no_op(
        board in arb_board(),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut store = merged(&board);
        let ids = all_ids(&store);
        prop_assume!(!ids.is_empty());
        let id = pick.get(&ids).clone();
        let column = store.locate(&id).unwrap();
        let position = store.get(column).iter().position(|t| t.id == id).unwrap();
        let before = store.to_snapshot();

        let plan = plan_insert(&store, &id, column, position).unwrap();
        prop_assert!(!store.apply(&plan));
        prop_assert_eq!(store.to_snapshot(), before);
    }

    #[test]
    fn resolution_is_idempotent(
        picks in prop::collection::vec(0..6usize, 0..8),
    ) {
        let directory = Directory::build(Some(&json!({
            "c1": {"name": "Anna Muster", "email": "anna@example.com"},
            "c2": {"name": "Ben Braun"},
            "c3": {"email": "cleo@example.com"}
        })));
        let tokens = ["c1", "ANNA MUSTER", "ben braun", "cleo@example.com", "nobody", "c9"];
        let raw = Value::Array(picks.iter().map(|i| Value::from(tokens[*i])).collect());

        let once = resolve(&raw, &directory);
        let twice = resolve(&json!(once), &directory);
        prop_assert_eq!(&once, &twice);
        prop_assert!(once.iter().all(|id| directory.contains_id(id)));
    }
}
