//! Touch drag.
//!
//! Touch events carry no drop target, so the controller tracks the zone
//! under the finger itself: every `touch_move` re-evaluates it and only the
//! latest one is remembered. Lifting the finger outside every zone
//! cancels the gesture.

use kanban_proto::column::ColumnId;
use kanban_proto::task::TaskId;

use super::autoscroll::{AutoScroll, ScrollStep};
use super::{DragController, DragOutcome, DragPayload, DragPhase, resolve_drop};
use crate::board::{BoardLayout, BoardStore, Point, ZoneId};

/// Touch drag state machine with edge auto-scroll.
#[derive(Debug, Clone, Default)]
pub struct TouchDrag {
    phase: DragPhase,
    highlighted: Option<ZoneId>,
    last_point: Option<Point>,
    scroll: Option<ScrollStep>,
    autoscroll: AutoScroll,
}

impl TouchDrag {
    /// Creates an idle controller.
    #[must_use]
    pub fn new(autoscroll: AutoScroll) -> Self {
        Self {
            autoscroll,
            ..Self::default()
        }
    }

    /// Starts dragging a task from where the finger went down.
    pub fn touch_start(&mut self, task_id: TaskId, from: ColumnId, point: Point) {
        tracing::debug!(task = %task_id, %from, "touch drag started");
        self.phase = DragPhase::Dragging(DragPayload { task_id, from });
        self.highlighted = None;
        self.last_point = Some(point);
        self.scroll = None;
    }

    /// Follows the finger. Returns the zone now highlighted, if any.
    pub fn touch_move(&mut self, point: Point, layout: &BoardLayout) -> Option<&ZoneId> {
        if !self.is_dragging() {
            return None;
        }
        self.last_point = Some(point);
        self.highlighted = layout.zone_at(point).map(|zone| zone.id.clone());
        self.scroll = self.autoscroll.step(point, layout);
        self.highlighted.as_ref()
    }

    /// Zone currently under the finger.
    #[must_use]
    pub const fn highlighted(&self) -> Option<&ZoneId> {
        self.highlighted.as_ref()
    }

    /// Scrolling to perform on this tick, if the finger is near an edge.
    #[must_use]
    pub const fn scroll_step(&self) -> Option<ScrollStep> {
        self.scroll
    }

    /// Lifts the finger. Always returns to idle.
    ///
    /// The drop uses the last highlighted zone and the last known finger
    /// position; with no highlighted zone the gesture is cancelled.
    pub fn touch_end(&mut self, layout: &BoardLayout, store: &BoardStore) -> DragOutcome {
        let phase = std::mem::take(&mut self.phase);
        let zone = self.highlighted.take();
        let point = self.last_point.take();
        self.scroll = None;

        let DragPhase::Dragging(payload) = phase else {
            return DragOutcome::Cancelled;
        };
        let (Some(zone), Some(point)) = (zone, point) else {
            tracing::debug!(task = %payload.task_id, "touch released outside any zone");
            return DragOutcome::Cancelled;
        };
        resolve_drop(layout, store, &zone, point.y, &payload)
    }
}

impl DragController for TouchDrag {
    fn phase(&self) -> &DragPhase {
        &self.phase
    }

    fn cancel(&mut self) {
        self.phase = DragPhase::Idle;
        self.highlighted = None;
        self.last_point = None;
        self.scroll = None;
    }
}
