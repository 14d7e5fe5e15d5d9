//! Geometry of the rendered board.
//!
//! The render layer rebuilds a [`BoardLayout`] on every frame: one
//! [`DropZone`] per column and one [`CardSlot`] per task, keyed by task id.
//! The reorder engine and the drag controllers only ever consult this map;
//! they never query the terminal or the widgets.
//!
//! Coordinates are in the same unit as pointer events. Cards scrolled out
//! of their column keep their virtual position (above or below the zone),
//! so the visual order of a column always covers every rendered task.

use std::collections::HashMap;
use std::fmt;

use kanban_proto::column::ColumnId;
use kanban_proto::task::TaskId;

use super::BoardStore;

/// A pointer or touch position.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position, growing downwards.
    pub y: f64,
}

impl Point {
    /// Creates a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Bounds {
    /// Creates a rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Bottom edge (exclusive).
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Right edge (exclusive).
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Vertical midpoint.
    #[must_use]
    pub fn mid_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Whether the point lies inside (left/top inclusive).
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Whether `other` lies entirely inside this rectangle.
    #[must_use]
    pub fn encloses(&self, other: &Self) -> bool {
        other.x >= self.x
            && other.right() <= self.right()
            && other.y >= self.y
            && other.bottom() <= self.bottom()
    }
}

/// Identity of a drop zone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ZoneId(String);

impl ZoneId {
    /// Creates a zone id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The conventional id of a column's task list.
    #[must_use]
    pub fn for_column(column: ColumnId) -> Self {
        Self(format!("{column}-list"))
    }

    /// String form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A column's task list, which accepts drops.
#[derive(Debug, Clone, PartialEq)]
pub struct DropZone {
    /// Zone identity.
    pub id: ZoneId,
    /// Column the zone drops into.
    pub column: ColumnId,
    /// Visible area of the list.
    pub bounds: Bounds,
    /// Height of all cards stacked.
    pub content_height: f64,
    /// Current scroll offset of the list.
    pub scroll_offset: f64,
}

impl DropZone {
    /// Whether the list has more content than fits.
    #[must_use]
    pub fn is_scrollable(&self) -> bool {
        self.content_height > self.bounds.height
    }

    /// Largest valid scroll offset.
    #[must_use]
    pub fn max_scroll(&self) -> f64 {
        (self.content_height - self.bounds.height).max(0.0)
    }
}

/// Where a rendered task card sits.
#[derive(Debug, Clone, PartialEq)]
pub struct CardSlot {
    /// Task shown by the card.
    pub task_id: TaskId,
    /// Column the card was rendered in.
    pub column: ColumnId,
    /// Card rectangle (virtual when scrolled out of view).
    pub bounds: Bounds,
}

/// The nearest scrollable container of a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollTarget {
    /// A column's task list.
    Column(ColumnId),
    /// The board as a whole.
    Board,
}

/// Id → geometry map of one rendered frame.
#[derive(Debug, Clone, Default)]
pub struct BoardLayout {
    viewport: Bounds,
    zones: Vec<DropZone>,
    cards: Vec<CardSlot>,
    by_id: HashMap<TaskId, usize>,
}

impl BoardLayout {
    /// Creates an empty layout for a viewport.
    #[must_use]
    pub fn new(viewport: Bounds) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    /// Lays out every column of the board as a vertical stack of equally
    /// tall cards, shifted up by the column's scroll offset (clamped to the
    /// scrollable range).
    #[must_use]
    pub fn compute<F>(
        store: &BoardStore,
        viewport: Bounds,
        lists: &[(ColumnId, Bounds)],
        card_height: f64,
        scroll_offset: F,
    ) -> Self
    where
        F: Fn(ColumnId) -> f64,
    {
        let mut layout = Self::new(viewport);
        for (column, bounds) in lists {
            let tasks = store.get(*column);
            #[allow(clippy::cast_precision_loss)]
            let content_height = tasks.len() as f64 * card_height;
            let mut zone = DropZone {
                id: ZoneId::for_column(*column),
                column: *column,
                bounds: *bounds,
                content_height,
                scroll_offset: 0.0,
            };
            zone.scroll_offset = scroll_offset(*column).clamp(0.0, zone.max_scroll());

            let mut top = bounds.y - zone.scroll_offset;
            for task in tasks {
                layout.add_card(CardSlot {
                    task_id: task.id.clone(),
                    column: *column,
                    bounds: Bounds::new(bounds.x, top, bounds.width, card_height),
                });
                top += card_height;
            }
            layout.add_zone(zone);
        }
        layout
    }

    /// Registers a drop zone, replacing one with the same id.
    pub fn add_zone(&mut self, zone: DropZone) {
        if let Some(existing) = self.zones.iter_mut().find(|z| z.id == zone.id) {
            *existing = zone;
        } else {
            self.zones.push(zone);
        }
    }

    /// Registers a card, replacing the slot of the same task.
    pub fn add_card(&mut self, slot: CardSlot) {
        if let Some(&idx) = self.by_id.get(&slot.task_id) {
            self.cards[idx] = slot;
        } else {
            self.by_id.insert(slot.task_id.clone(), self.cards.len());
            self.cards.push(slot);
        }
    }

    /// The visible area of the board.
    #[must_use]
    pub const fn viewport(&self) -> Bounds {
        self.viewport
    }

    /// All drop zones.
    #[must_use]
    pub fn zones(&self) -> &[DropZone] {
        &self.zones
    }

    /// Looks up a zone by id.
    #[must_use]
    pub fn zone(&self, id: &ZoneId) -> Option<&DropZone> {
        self.zones.iter().find(|z| &z.id == id)
    }

    /// The column a zone drops into, if the zone is still rendered.
    #[must_use]
    pub fn zone_column(&self, id: &ZoneId) -> Option<ColumnId> {
        self.zone(id).map(|z| z.column)
    }

    /// The zone of a column.
    #[must_use]
    pub fn zone_for_column(&self, column: ColumnId) -> Option<&DropZone> {
        self.zones.iter().find(|z| z.column == column)
    }

    /// The zone under a point.
    #[must_use]
    pub fn zone_at(&self, point: Point) -> Option<&DropZone> {
        self.zones.iter().find(|z| z.bounds.contains(point))
    }

    /// The slot of a task.
    #[must_use]
    pub fn card(&self, id: &TaskId) -> Option<&CardSlot> {
        self.by_id.get(id).map(|&idx| &self.cards[idx])
    }

    /// The visible card under a point.
    #[must_use]
    pub fn card_at(&self, point: Point) -> Option<&CardSlot> {
        let zone = self.zone_at(point)?;
        self.cards
            .iter()
            .find(|c| c.column == zone.column && c.bounds.contains(point))
    }

    /// Cards of a column, top to bottom.
    #[must_use]
    pub fn cards_in(&self, column: ColumnId) -> Vec<&CardSlot> {
        let mut cards: Vec<&CardSlot> = self.cards.iter().filter(|c| c.column == column).collect();
        cards.sort_by(|a, b| a.bounds.y.total_cmp(&b.bounds.y));
        cards
    }

    /// Whether a card is fully inside its zone.
    #[must_use]
    pub fn is_visible(&self, slot: &CardSlot) -> bool {
        self.zone_for_column(slot.column)
            .is_some_and(|zone| zone.bounds.encloses(&slot.bounds))
    }

    /// The nearest scrollable container under a point.
    #[must_use]
    pub fn scroll_target_at(&self, point: Point) -> ScrollTarget {
        self.zone_at(point)
            .filter(|z| z.is_scrollable())
            .map_or(ScrollTarget::Board, |z| ScrollTarget::Column(z.column))
    }
}
