//! Board snapshots and patch paths.
//!
//! A board snapshot is the JSON value stored under [`BOARD_ROOT`]:
//!
//! ```text
//! { "todo": { "<taskId>": { ...task without id... } }, "inprogress": { ... }, ... }
//! ```
//!
//! Patches and writes address the same tree with paths relative to
//! [`BOARD_ROOT`], either a whole task (`"{column}/{taskId}"`) or a single
//! field (`"{column}/{taskId}/order"`, `"{column}/{taskId}/subtasks"`).

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::column::ColumnId;
use crate::task::{Task, TaskId};

/// Root path of the board in the remote store.
pub const BOARD_ROOT: &str = "board";

/// Root path of the contact list in the remote store.
pub const CONTACTS_ROOT: &str = "contacts";

/// Atomic multi-key update: relative path → new value, `None` deletes.
pub type Patch = BTreeMap<String, Option<Value>>;

/// Relative path of a whole task record.
#[must_use]
pub fn task_key(column: ColumnId, id: &TaskId) -> String {
    format!("{column}/{id}")
}

/// Relative path of a task's `order` field.
#[must_use]
pub fn order_key(column: ColumnId, id: &TaskId) -> String {
    format!("{column}/{id}/order")
}

/// Relative path of a task's subtask list.
#[must_use]
pub fn subtasks_key(column: ColumnId, id: &TaskId) -> String {
    format!("{column}/{id}/subtasks")
}

/// A parsed board snapshot.
///
/// Tasks keep the iteration order of their column object, which is the
/// insertion order used to break `order` ties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardSnapshot {
    columns: BTreeMap<ColumnId, Vec<Task>>,
}

impl BoardSnapshot {
    /// Parses a snapshot. `None`, `null` and non-object values yield an
    /// empty board; unknown column keys, non-object columns and non-object
    /// task records are skipped. Every column is present in the result.
    #[must_use]
    pub fn from_wire(value: Option<&Value>) -> Self {
        let mut columns: BTreeMap<ColumnId, Vec<Task>> =
            ColumnId::ALL.iter().map(|c| (*c, Vec::new())).collect();

        let Some(root) = value.and_then(Value::as_object) else {
            return Self { columns };
        };

        for (key, tasks) in root {
            let Some(column) = ColumnId::parse(key) else {
                continue;
            };
            let Some(tasks) = tasks.as_object() else {
                continue;
            };
            let slot = columns.entry(column).or_default();
            slot.extend(
                tasks
                    .iter()
                    .filter_map(|(id, record)| Task::from_wire(id, column, record)),
            );
        }

        Self { columns }
    }

    /// Encodes a set of columns back into the stored shape.
    #[must_use]
    pub fn to_wire<'a, I>(columns: I) -> Value
    where
        I: IntoIterator<Item = (ColumnId, &'a [Task])>,
    {
        let mut root = Map::new();
        for (column, tasks) in columns {
            let records: Map<String, Value> = tasks
                .iter()
                .map(|t| (t.id.as_str().to_string(), t.to_wire()))
                .collect();
            if !records.is_empty() {
                root.insert(column.as_str().to_string(), Value::Object(records));
            }
        }
        Value::Object(root)
    }

    /// Tasks of one column in snapshot order.
    #[must_use]
    pub fn column(&self, column: ColumnId) -> &[Task] {
        self.columns.get(&column).map_or(&[][..], Vec::as_slice)
    }

    /// Consumes the snapshot, yielding every column.
    #[must_use]
    pub fn into_columns(self) -> BTreeMap<ColumnId, Vec<Task>> {
        self.columns
    }

    /// Total number of tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.values().map(Vec::len).sum()
    }

    /// Whether the snapshot holds no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
