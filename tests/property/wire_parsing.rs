//! Property-based tests for lenient wire parsing.
//!
//! Uses proptest to verify:
//! 1. Arbitrary JSON never panics any decoder (`Task`, `RawContact`, `BoardSnapshot`).
//! 2. Decoding a board keeps every task in the column it was filed under.
//! 3. A task re-decoded from its written form is stable, and an untouched
//!    task writes its stored record back verbatim.
//! 4. Column keys round-trip, and only the exact stored keys parse.

use std::collections::BTreeMap;

use proptest::prelude::*;
use serde_json::{Map, Value, json};

use kanban_proto::{BoardSnapshot, ColumnId, RawContact, Task};

// --- Strategies ---

/// Strategy for arbitrary JSON values, a few levels deep.
fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        any::<f64>()
            .prop_filter("finite", |f| f.is_finite())
            .prop_map(Value::from),
        "[a-z0-9 @.,#-]{0,16}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-zA-Z]{1,10}", inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

/// Strategy for task-shaped objects with plausibly typed and mistyped fields.
fn arb_task_json() -> impl Strategy<Value = Value> {
    (
        prop_oneof![any::<i64>().prop_map(Value::from), arb_json()],
        "[^\u{0}]{0,40}",
        prop_oneof![
            Just(json!("urgent")),
            Just(json!("HIGH")),
            Just(json!("low")),
            arb_json()
        ],
        prop_oneof![Just(json!("2026-05-01")), Just(json!("not a date")), arb_json()],
        arb_json(),
    )
        .prop_map(|(order, title, priority, due, subtasks)| {
            json!({
                "order": order,
                "title": title,
                "priority": priority,
                "dueDate": due,
                "subtasks": subtasks,
            })
        })
}

/// Strategy for a board document under the four column keys.
fn arb_board() -> impl Strategy<Value = Value> {
    prop::collection::vec((0..4usize, "[a-z][a-z0-9]{0,6}", arb_task_json()), 0..16).prop_map(
        |entries| {
            let mut columns: BTreeMap<&'static str, Map<String, Value>> = BTreeMap::new();
            for (column, id, task) in entries {
                columns
                    .entry(ColumnId::ALL[column].as_str())
                    .or_default()
                    .insert(id, task);
            }
            Value::Object(
                columns
                    .into_iter()
                    .map(|(key, tasks)| (key.to_string(), Value::Object(tasks)))
                    .collect(),
            )
        },
    )
}

// --- Properties ---

proptest! {
    #[test]
    fn decoders_never_panic(value in arb_json()) {
        let _ = Task::from_wire("t", ColumnId::Todo, &value);
        let _ = RawContact::from_wire(&value);
        let _ = BoardSnapshot::from_wire(Some(&value));
    }

    #[test]
    fn tasks_stay_in_their_column(board in arb_board()) {
        let snapshot = BoardSnapshot::from_wire(Some(&board));
        let mut expected = 0;
        for column in ColumnId::ALL {
            let stored = board.get(column.as_str()).and_then(Value::as_object).map_or(0, Map::len);
            prop_assert_eq!(snapshot.column(column).len(), stored);
            prop_assert!(snapshot.column(column).iter().all(|t| t.column == column));
            expected += stored;
        }
        prop_assert_eq!(snapshot.len(), expected);
    }

    #[test]
    fn canonical_form_is_stable(value in arb_task_json()) {
        let first = Task::from_wire("t1", ColumnId::Done, &value).unwrap();
        let second = Task::from_wire("t1", ColumnId::Done, &first.to_wire()).unwrap();
        let third = Task::from_wire("t1", ColumnId::Done, &second.to_wire()).unwrap();
        prop_assert_eq!(second, third);
    }

    #[test]
    fn untouched_task_writes_back_its_record(value in arb_task_json()) {
        let task = Task::from_wire("t1", ColumnId::Todo, &value).unwrap();
        prop_assert_eq!(task.to_wire(), value);
    }

    #[test]
    fn column_keys_round_trip(index in 0..4usize) {
        let column = ColumnId::ALL[index];
        prop_assert_eq!(ColumnId::parse(column.as_str()), Some(column));
    }

    #[test]
    fn parsed_column_keys_are_written_back_identically(key in "[a-zA-Z_ -]{0,12}") {
        if let Some(column) = ColumnId::parse(&key) {
            prop_assert_eq!(column.as_str(), key.as_str());
        }
    }
}
