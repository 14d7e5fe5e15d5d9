//! Theme and styling constants for the TUI.

use kanban_proto::task::Priority;
use ratatui::style::{Color, Modifier, Style};

/// Primary foreground color.
pub const FG_PRIMARY: Color = Color::White;

/// Secondary foreground color (dimmed text).
pub const FG_SECONDARY: Color = Color::Gray;

/// Highlight color for the selection.
pub const HIGHLIGHT: Color = Color::Cyan;

/// Color of a zone that would receive a drop.
pub const DROP_TARGET: Color = Color::Yellow;

/// Error notification color.
pub const ERROR: Color = Color::Red;

/// Info notification color.
pub const INFO: Color = Color::Green;

/// Fallback for contacts and categories without a usable color.
pub const FALLBACK: Color = Color::Rgb(153, 153, 153);

/// Normal text style.
#[must_use]
pub fn normal() -> Style {
    Style::default().fg(FG_PRIMARY)
}

/// Dimmed text style (metadata, dragged cards).
#[must_use]
pub fn dimmed() -> Style {
    Style::default().fg(FG_SECONDARY)
}

/// Bold text style.
#[must_use]
pub fn bold() -> Style {
    Style::default().fg(FG_PRIMARY).add_modifier(Modifier::BOLD)
}

/// Highlighted style (selected card and column borders).
#[must_use]
pub fn highlighted() -> Style {
    Style::default().fg(HIGHLIGHT).add_modifier(Modifier::BOLD)
}

/// Border style of the zone under a drag.
#[must_use]
pub fn drop_target() -> Style {
    Style::default().fg(DROP_TARGET).add_modifier(Modifier::BOLD)
}

/// Style for the status bar background (dark background with white foreground).
#[must_use]
pub fn status_bar_bg() -> Style {
    Style::default().fg(Color::White).bg(Color::Rgb(30, 30, 50))
}

/// Style for panel titles with a given color (bold).
#[must_use]
pub fn panel_title(color: Color) -> Style {
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

/// Color of a priority badge.
#[must_use]
pub const fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::Urgent => Color::Rgb(255, 61, 0),
        Priority::Medium => Color::Rgb(255, 168, 0),
        Priority::Low => Color::Rgb(122, 226, 41),
    }
}

/// Parses `#rgb` or `#rrggbb`.
#[must_use]
pub fn hex_color(text: &str) -> Option<Color> {
    let hex = text.trim().strip_prefix('#')?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut it = hex.chars().map(|c| channel(&c.to_string()).map(|v| v * 17));
            Some(Color::Rgb(it.next()??, it.next()??, it.next()??))
        }
        6 => Some(Color::Rgb(
            channel(hex.get(0..2)?)?,
            channel(hex.get(2..4)?)?,
            channel(hex.get(4..6)?)?,
        )),
        _ => None,
    }
}

/// [`hex_color`] with the fallback gray.
#[must_use]
pub fn hex_color_or_fallback(text: &str) -> Color {
    hex_color(text).unwrap_or(FALLBACK)
}
