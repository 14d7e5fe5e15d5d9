//! Desktop pointer drag.
//!
//! Mirrors native drag and drop: `drag_start` on the card, any number of
//! `drag_over` events on zones (preview only), at most one `drop`, then
//! `drag_end`, which fires whether or not a drop happened.

use kanban_proto::column::ColumnId;
use kanban_proto::task::TaskId;

use super::{
    DragController, DragOutcome, DragPayload, DragPhase, DropPreview, resolve_drop,
    resolve_preview,
};
use crate::board::{BoardLayout, BoardStore, ZoneId};

/// Pointer drag state machine.
#[derive(Debug, Clone, Default)]
pub struct PointerDrag {
    phase: DragPhase,
}

impl PointerDrag {
    /// Creates an idle controller.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts dragging a task. A gesture already in progress is replaced.
    pub fn drag_start(&mut self, task_id: TaskId, from: ColumnId) {
        tracing::debug!(task = %task_id, %from, "pointer drag started");
        self.phase = DragPhase::Dragging(DragPayload { task_id, from });
    }

    /// Insertion preview while hovering a zone. Never changes any state.
    #[must_use]
    pub fn drag_over(
        &self,
        layout: &BoardLayout,
        store: &BoardStore,
        zone: &ZoneId,
        pointer_y: f64,
    ) -> Option<DropPreview> {
        let DragPhase::Dragging(payload) = &self.phase else {
            return None;
        };
        resolve_preview(layout, store, zone, pointer_y, payload)
    }

    /// Drops the dragged task on a zone.
    ///
    /// Returns [`DragOutcome::Cancelled`] when no drag is in progress or the
    /// drop cannot be resolved. The controller stays in
    /// [`DragPhase::Dropped`] until [`PointerDrag::drag_end`].
    pub fn drop(
        &mut self,
        layout: &BoardLayout,
        store: &BoardStore,
        zone: &ZoneId,
        pointer_y: f64,
    ) -> DragOutcome {
        let DragPhase::Dragging(payload) = std::mem::take(&mut self.phase) else {
            return DragOutcome::Cancelled;
        };
        let outcome = resolve_drop(layout, store, zone, pointer_y, &payload);
        self.phase = DragPhase::Dropped(payload);
        outcome
    }

    /// Ends the gesture. Always returns to idle.
    ///
    /// Returns `true` if the gesture ended without a drop.
    pub fn drag_end(&mut self) -> bool {
        let cancelled = matches!(self.phase, DragPhase::Dragging(_));
        if cancelled {
            tracing::debug!("pointer drag ended without drop");
        }
        self.phase = DragPhase::Idle;
        cancelled
    }
}

impl DragController for PointerDrag {
    fn phase(&self) -> &DragPhase {
        &self.phase
    }

    fn cancel(&mut self) {
        self.phase = DragPhase::Idle;
    }
}
