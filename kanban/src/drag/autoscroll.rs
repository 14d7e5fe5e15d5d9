//! Edge auto-scroll for touch drags.
//!
//! While a finger is within `margin` of the top or bottom edge of the
//! viewport, the nearest scrollable container scrolls toward that edge.
//! Speed grows linearly from zero at the margin boundary to `max_speed` at
//! the edge (and beyond it). Inside the dead zone the speed is zero.

use crate::board::{BoardLayout, Bounds, Point, ScrollTarget};

/// One tick worth of scrolling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollStep {
    /// Container to scroll.
    pub target: ScrollTarget,
    /// Signed distance per tick; negative scrolls up.
    pub delta: f64,
}

/// Edge auto-scroll parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoScroll {
    margin: f64,
    max_speed: f64,
}

impl Default for AutoScroll {
    fn default() -> Self {
        Self::new(3.0, 2.0)
    }
}

impl AutoScroll {
    /// Creates an auto-scroller. Negative values are treated as zero.
    #[must_use]
    pub fn new(margin: f64, max_speed: f64) -> Self {
        Self {
            margin: margin.max(0.0),
            max_speed: max_speed.max(0.0),
        }
    }

    /// Edge margin.
    #[must_use]
    pub const fn margin(&self) -> f64 {
        self.margin
    }

    /// Speed at the very edge.
    #[must_use]
    pub const fn max_speed(&self) -> f64 {
        self.max_speed
    }

    /// Signed scroll speed for a finger at `y`.
    #[must_use]
    pub fn velocity(&self, y: f64, viewport: Bounds) -> f64 {
        if self.margin <= 0.0 {
            return 0.0;
        }
        let from_top = y - viewport.y;
        let from_bottom = viewport.bottom() - y;
        if from_top < self.margin {
            -self.speed_for(from_top)
        } else if from_bottom < self.margin {
            self.speed_for(from_bottom)
        } else {
            0.0
        }
    }

    /// The scroll to perform for a finger at `point`, or `None` in the
    /// dead zone.
    #[must_use]
    pub fn step(&self, point: Point, layout: &BoardLayout) -> Option<ScrollStep> {
        let delta = self.velocity(point.y, layout.viewport());
        (delta != 0.0).then(|| ScrollStep {
            target: layout.scroll_target_at(point),
            delta,
        })
    }

    fn speed_for(&self, distance: f64) -> f64 {
        let proximity = ((self.margin - distance) / self.margin).clamp(0.0, 1.0);
        self.max_speed * proximity
    }
}
