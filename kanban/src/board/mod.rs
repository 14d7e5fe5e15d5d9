//! Authoritative in-memory model of the board.
//!
//! [`BoardStore`] holds every task partitioned by column. It has exactly two
//! writers: [`BoardStore::merge`] for remote snapshots and
//! [`BoardStore::apply`] / [`BoardStore::replace_task`] for local edits.
//! Callers never mutate a task in place; they replace whole records.

pub mod layout;
pub mod reorder;

use std::collections::BTreeMap;

use kanban_proto::column::ColumnId;
use kanban_proto::snapshot::BoardSnapshot;
use kanban_proto::task::{Task, TaskId};
use serde_json::Value;

pub use layout::{BoardLayout, Bounds, CardSlot, DropZone, Point, ScrollTarget, ZoneId};
pub use reorder::{MovePlan, plan_insert, plan_move, preview_index};

/// Tasks partitioned by column.
///
/// Each column keeps its tasks in insertion order; [`BoardStore::get`]
/// presents them sorted by `order`, with insertion order breaking ties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardStore {
    columns: BTreeMap<ColumnId, Vec<Task>>,
}

impl Default for BoardStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardStore {
    /// Creates an empty board with all four columns.
    #[must_use]
    pub fn new() -> Self {
        Self {
            columns: ColumnId::ALL.iter().map(|c| (*c, Vec::new())).collect(),
        }
    }

    /// Replaces the whole model from a remote snapshot.
    ///
    /// This is a full replace, not a diff: local edits that the snapshot
    /// has not absorbed yet are discarded. Columns missing from the
    /// snapshot become empty. If a column carries duplicate `order`
    /// values, its local copy is renumbered to display positions so that
    /// orders stay unique.
    pub fn merge(&mut self, snapshot: Option<&Value>) {
        let mut columns = BoardSnapshot::from_wire(snapshot).into_columns();
        for (column, tasks) in &mut columns {
            if normalize_orders(tasks) {
                tracing::debug!(%column, "renumbered column with duplicate order values");
            }
        }
        self.columns = columns;
        tracing::debug!(tasks = self.len(), "board merged from snapshot");
    }

    /// Tasks of a column sorted ascending by `order` (stable).
    #[must_use]
    pub fn get(&self, column: ColumnId) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self
            .columns
            .get(&column)
            .map(|tasks| tasks.iter().collect())
            .unwrap_or_default();
        tasks.sort_by_key(|t| t.order);
        tasks
    }

    /// The column currently holding a task.
    #[must_use]
    pub fn locate(&self, id: &TaskId) -> Option<ColumnId> {
        self.columns
            .iter()
            .find(|(_, tasks)| tasks.iter().any(|t| &t.id == id))
            .map(|(column, _)| *column)
    }

    /// Looks up a task by id.
    #[must_use]
    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.columns
            .values()
            .flat_map(|tasks| tasks.iter())
            .find(|t| &t.id == id)
    }

    /// Replaces a whole task record, moving it if its column changed.
    ///
    /// A task the board does not know yet is appended to its column.
    pub fn replace_task(&mut self, task: Task) {
        if let Some(current) = self.locate(&task.id)
            && current != task.column
        {
            self.remove(current, &task.id);
        }
        let tasks = self.columns.entry(task.column).or_default();
        if let Some(slot) = tasks.iter_mut().find(|t| t.id == task.id) {
            *slot = task;
        } else {
            tasks.push(task);
        }
    }

    /// Applies a move plan locally. Returns `true` if anything changed.
    ///
    /// The moved task is taken from wherever the board currently holds it,
    /// then every task named in the plan's renumbering gets its new order.
    /// Tasks named in the renumbering that the board no longer holds are
    /// ignored.
    pub fn apply(&mut self, plan: &MovePlan) -> bool {
        let before = self.clone();

        self.replace_task(plan.moved.clone());

        if let Some(tasks) = self.columns.get_mut(&plan.to) {
            for (id, order) in &plan.renumbered {
                if let Some(task) = tasks.iter_mut().find(|t| &t.id == id) {
                    task.order = *order;
                }
            }
        }

        let changed = *self != before;
        tracing::debug!(
            task = %plan.task_id,
            from = %plan.from,
            to = %plan.to,
            index = plan.index,
            changed,
            "applied move plan"
        );
        changed
    }

    /// Total number of tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.values().map(Vec::len).sum()
    }

    /// Whether the board holds no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of tasks in one column.
    #[must_use]
    pub fn count(&self, column: ColumnId) -> usize {
        self.columns.get(&column).map_or(0, Vec::len)
    }

    /// Encodes the model in the stored snapshot shape.
    #[must_use]
    pub fn to_snapshot(&self) -> Value {
        BoardSnapshot::to_wire(
            self.columns
                .iter()
                .map(|(column, tasks)| (*column, tasks.as_slice())),
        )
    }

    fn remove(&mut self, column: ColumnId, id: &TaskId) -> Option<Task> {
        let tasks = self.columns.get_mut(&column)?;
        let idx = tasks.iter().position(|t| &t.id == id)?;
        Some(tasks.remove(idx))
    }
}

/// Renumbers a column to its display positions if its orders are not
/// unique. Returns `true` if it did.
fn normalize_orders(tasks: &mut [Task]) -> bool {
    let mut by_order: Vec<usize> = (0..tasks.len()).collect();
    by_order.sort_by_key(|&i| tasks[i].order);
    let unique = by_order
        .windows(2)
        .all(|w| tasks[w[0]].order != tasks[w[1]].order);
    if unique {
        return false;
    }
    for (position, idx) in by_order.into_iter().enumerate() {
        tasks[idx].order = i64::try_from(position).unwrap_or(i64::MAX);
    }
    true
}
