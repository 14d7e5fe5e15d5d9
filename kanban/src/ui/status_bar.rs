//! Status bar rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme;
use crate::app::{App, NotificationLevel};

/// Render the status bar at the bottom of the screen.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let help_text = if app.detail().is_editing() {
        "Tab: next field | Ctrl+S: save | Esc: cancel"
    } else if app.detail().is_open() {
        "e: edit | ↑↓ Enter/1-9: toggle subtask | Esc: close"
    } else {
        "←→↑↓/hjkl: select | HJKL: move | Enter: open | m: drag mode | q: quit"
    };

    let mut spans = vec![
        Span::styled("Kanban", theme::bold()),
        Span::raw(" | "),
        Span::raw(format!("{} tasks", app.board().len())),
        Span::raw(" | "),
        Span::styled(format!("drag: {}", app.drag_mode()), theme::dimmed()),
    ];
    if let Some(task_id) = app.dragged_task() {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(format!("moving {task_id}"), theme::drop_target()));
    }
    spans.push(Span::raw(" | "));
    match app.notifications().last() {
        Some(note) => {
            let color = match note.level {
                NotificationLevel::Info => theme::INFO,
                NotificationLevel::Error => theme::ERROR,
            };
            spans.push(Span::styled(note.text.as_str(), theme::bold().fg(color)));
        }
        None => spans.push(Span::styled(help_text, theme::dimmed())),
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(theme::status_bar_bg());
    frame.render_widget(paragraph, area);
}
