//! Reorder engine: turns a drop position into a [`MovePlan`].
//!
//! A plan is computed against two inputs that may disagree: the layout of
//! the last rendered frame and the store as it is right now. A remote merge
//! can land between render and drop, so the engine re-reads the dragged
//! task's real column from the store and ignores rendered cards the store
//! no longer holds in the target column.

use kanban_proto::column::ColumnId;
use kanban_proto::snapshot::{Patch, order_key, task_key};
use kanban_proto::task::{Task, TaskId};
use serde_json::Value;

use super::BoardStore;
use super::layout::{BoardLayout, ZoneId};

/// The full effect of moving one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan {
    /// Task being moved.
    pub task_id: TaskId,
    /// Column the task is taken from.
    pub from: ColumnId,
    /// Column the task lands in.
    pub to: ColumnId,
    /// Position of the task in the destination sequence.
    pub index: usize,
    /// The task record as it will be stored in the destination.
    pub moved: Task,
    /// New `order` of every task in the destination, moved task included,
    /// in display order.
    pub renumbered: Vec<(TaskId, i64)>,
}

impl MovePlan {
    /// Whether the task changes column.
    #[must_use]
    pub fn is_cross_column(&self) -> bool {
        self.from != self.to
    }

    /// Encodes the plan as one atomic patch relative to the board root.
    ///
    /// A cross-column move deletes `{from}/{id}`, writes the record at
    /// `{to}/{id}` (as stored, with only the new `order`) and renumbers the other destination tasks field by
    /// field. The source column is left with a gap. A same-column move is
    /// only the renumbering.
    #[must_use]
    pub fn to_patch(&self) -> Patch {
        let mut patch = Patch::new();
        if self.is_cross_column() {
            patch.insert(task_key(self.from, &self.task_id), None);
            patch.insert(task_key(self.to, &self.task_id), Some(self.moved.to_wire()));
        }
        for (id, order) in &self.renumbered {
            if self.is_cross_column() && id == &self.task_id {
                continue;
            }
            patch.insert(order_key(self.to, id), Some(Value::from(*order)));
        }
        patch
    }

    /// Destination ids in their new display order.
    #[must_use]
    pub fn sequence(&self) -> Vec<&TaskId> {
        self.renumbered.iter().map(|(id, _)| id).collect()
    }
}

/// Computes the plan for dropping `dragged` on a zone at `pointer_y`.
///
/// The insertion anchor is the first rendered card of the target column
/// (top to bottom, dragged card excluded) whose vertical midpoint lies
/// strictly below the pointer; with no such card the task is appended.
/// Returns `None` when the zone is not rendered or the task no longer
/// exists.
#[must_use]
pub fn plan_move(
    layout: &BoardLayout,
    store: &BoardStore,
    zone: &ZoneId,
    pointer_y: f64,
    dragged: &TaskId,
    source: ColumnId,
) -> Option<MovePlan> {
    let Some(target) = layout.zone_column(zone) else {
        tracing::debug!(%zone, "drop on unknown zone ignored");
        return None;
    };
    let Some(from) = store.locate(dragged) else {
        tracing::debug!(task = %dragged, "dragged task vanished before drop");
        return None;
    };
    if from != source {
        tracing::debug!(task = %dragged, %source, actual = %from, "drag source re-resolved at drop");
    }
    let (sequence, index) = drop_sequence(layout, store, target, pointer_y, dragged);
    let task = store.task(dragged)?.clone();
    Some(build_plan(store, task, from, target, sequence, index))
}

/// Computes the plan for inserting `dragged` at `index` of `target`,
/// using the store's order only. The index is clamped to the column.
#[must_use]
pub fn plan_insert(
    store: &BoardStore,
    dragged: &TaskId,
    target: ColumnId,
    index: usize,
) -> Option<MovePlan> {
    let from = store.locate(dragged)?;
    let task = store.task(dragged)?.clone();
    let sequence: Vec<TaskId> = store
        .get(target)
        .into_iter()
        .filter(|t| &t.id != dragged)
        .map(|t| t.id.clone())
        .collect();
    let index = index.min(sequence.len());
    Some(build_plan(store, task, from, target, sequence, index))
}

/// Where a drop at `pointer_y` would land, for drag-over feedback.
#[must_use]
pub fn preview_index(
    layout: &BoardLayout,
    store: &BoardStore,
    zone: &ZoneId,
    pointer_y: f64,
    dragged: &TaskId,
) -> Option<(ColumnId, usize)> {
    let target = layout.zone_column(zone)?;
    let (_, index) = drop_sequence(layout, store, target, pointer_y, dragged);
    Some((target, index))
}

/// The destination sequence without the dragged task, and the index the
/// dragged task is inserted at.
fn drop_sequence(
    layout: &BoardLayout,
    store: &BoardStore,
    target: ColumnId,
    pointer_y: f64,
    dragged: &TaskId,
) -> (Vec<TaskId>, usize) {
    let rendered: Vec<_> = layout
        .cards_in(target)
        .into_iter()
        .filter(|c| &c.task_id != dragged && store.locate(&c.task_id) == Some(target))
        .collect();
    let anchor = rendered.iter().position(|c| c.bounds.mid_y() - pointer_y > 0.0);

    let mut sequence: Vec<TaskId> = rendered.iter().map(|c| c.task_id.clone()).collect();
    for task in store.get(target) {
        if &task.id != dragged && !sequence.contains(&task.id) {
            sequence.push(task.id.clone());
        }
    }
    let index = anchor.unwrap_or(sequence.len());
    (sequence, index)
}

fn build_plan(
    store: &BoardStore,
    mut task: Task,
    from: ColumnId,
    to: ColumnId,
    mut sequence: Vec<TaskId>,
    index: usize,
) -> MovePlan {
    sequence.insert(index, task.id.clone());

    let current: Vec<&Task> = store.get(to);
    let unchanged = from == to
        && current.len() == sequence.len()
        && current.iter().zip(&sequence).all(|(t, id)| &t.id == id);

    let renumbered: Vec<(TaskId, i64)> = if unchanged {
        current.iter().map(|t| (t.id.clone(), t.order)).collect()
    } else {
        sequence
            .into_iter()
            .enumerate()
            .map(|(i, id)| (id, i64::try_from(i).unwrap_or(i64::MAX)))
            .collect()
    };

    if let Some((_, order)) = renumbered.iter().find(|(id, _)| id == &task.id) {
        task.order = *order;
    }
    task.column = to;

    tracing::debug!(
        task = %task.id,
        %from,
        %to,
        index,
        unchanged,
        "computed move plan"
    );

    MovePlan {
        task_id: task.id.clone(),
        from,
        to,
        index,
        moved: task,
        renumbered,
    }
}
