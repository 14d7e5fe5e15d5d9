//! Terminal UI rendering.

pub mod board_view;
pub mod detail_view;
pub mod status_bar;
pub mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
};

use crate::app::App;
use crate::board::{BoardLayout, Bounds};

/// Main draw function for the entire UI.
///
/// Returns the board geometry of this frame so the caller can hit-test
/// mouse input against exactly what was shown.
pub fn draw(frame: &mut Frame, app: &App) -> BoardLayout {
    // Board above, status bar at the bottom
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    let layout = board_view::render(frame, main_chunks[0], app);
    status_bar::render(frame, main_chunks[1], app);

    if app.detail().is_open() {
        detail_view::render(frame, main_chunks[0], app);
    }
    layout
}

/// Terminal cells to layout coordinates.
fn rect_bounds(rect: Rect) -> Bounds {
    Bounds::new(
        f64::from(rect.x),
        f64::from(rect.y),
        f64::from(rect.width),
        f64::from(rect.height),
    )
}
