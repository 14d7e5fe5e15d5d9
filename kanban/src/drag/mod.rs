//! Drag gesture controllers.
//!
//! Both input variants drive the same lifecycle:
//!
//! ```text
//! Idle ──start──▶ Dragging ──drop/end──▶ (Dropped | Cancelled) ──▶ Idle
//! ```
//!
//! Controllers never touch the store. A successful gesture yields a
//! [`MovePlan`] which the caller applies and submits; a cancelled one
//! yields nothing, leaving the board exactly as it was.

pub mod autoscroll;
pub mod pointer;
pub mod touch;

use kanban_proto::column::ColumnId;
use kanban_proto::task::TaskId;

use crate::board::{BoardLayout, BoardStore, MovePlan, ZoneId, plan_move, preview_index};

pub use autoscroll::{AutoScroll, ScrollStep};
pub use pointer::PointerDrag;
pub use touch::TouchDrag;

/// What a gesture carries from start to drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragPayload {
    /// The dragged task.
    pub task_id: TaskId,
    /// Column the task was in when the gesture began. Only a hint: the
    /// real column is re-read from the store at drop time.
    pub from: ColumnId,
}

/// Where a controller is in its lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragPhase {
    /// No gesture in progress.
    #[default]
    Idle,
    /// A task is being dragged.
    Dragging(DragPayload),
    /// The drop has happened; waiting for the gesture to end.
    Dropped(DragPayload),
}

/// Result of finishing a gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    /// The task was dropped on a zone and this plan describes the move.
    Dropped(MovePlan),
    /// Nothing happens.
    Cancelled,
}

impl DragOutcome {
    /// The plan, if the gesture produced one.
    #[must_use]
    pub fn into_plan(self) -> Option<MovePlan> {
        match self {
            Self::Dropped(plan) => Some(plan),
            Self::Cancelled => None,
        }
    }
}

/// Insertion feedback shown while hovering a zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropPreview {
    /// Hovered zone.
    pub zone: ZoneId,
    /// Column the zone drops into.
    pub column: ColumnId,
    /// Index the task would be inserted at.
    pub index: usize,
}

/// Behavior shared by the pointer and touch controllers.
pub trait DragController {
    /// Current phase.
    fn phase(&self) -> &DragPhase;

    /// Abandons any gesture and returns to [`DragPhase::Idle`].
    fn cancel(&mut self);

    /// The payload of the gesture in progress, if any.
    fn payload(&self) -> Option<&DragPayload> {
        match self.phase() {
            DragPhase::Idle => None,
            DragPhase::Dragging(payload) | DragPhase::Dropped(payload) => Some(payload),
        }
    }

    /// Whether a task is being dragged right now.
    fn is_dragging(&self) -> bool {
        matches!(self.phase(), DragPhase::Dragging(_))
    }
}

/// Computes the outcome of dropping `payload` on `zone` at `pointer_y`.
pub(crate) fn resolve_drop(
    layout: &BoardLayout,
    store: &BoardStore,
    zone: &ZoneId,
    pointer_y: f64,
    payload: &DragPayload,
) -> DragOutcome {
    plan_move(layout, store, zone, pointer_y, &payload.task_id, payload.from)
        .map_or(DragOutcome::Cancelled, DragOutcome::Dropped)
}

/// Computes the hover preview for `payload` over `zone`.
pub(crate) fn resolve_preview(
    layout: &BoardLayout,
    store: &BoardStore,
    zone: &ZoneId,
    pointer_y: f64,
    payload: &DragPayload,
) -> Option<DropPreview> {
    preview_index(layout, store, zone, pointer_y, &payload.task_id).map(|(column, index)| {
        DropPreview {
            zone: zone.clone(),
            column,
            index,
        }
    })
}
