//! Task detail popup.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::theme;
use crate::app::{App, EditorField};
use crate::detail::{DetailView, TaskDraft};

/// Render the detail popup centered in `area`.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let Some(view) = app.detail().view(app.board(), app.directory()) else {
        return;
    };
    let popup = centered(area, 70, 80);
    let lines = match view.draft {
        Some(draft) => editor_lines(draft, app),
        None => detail_lines(&view, app.subtask_cursor()),
    };
    let title = if view.draft.is_some() {
        " Edit task (Tab: next field, Ctrl+S: save, Esc: cancel) "
    } else {
        " Task (e: edit, ↑↓/Enter: toggle subtask, Esc: close) "
    };
    let block = Block::default()
        .title(Span::styled(title, theme::panel_title(theme::HIGHLIGHT)))
        .borders(Borders::ALL)
        .border_style(theme::highlighted());

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        popup,
    );
}

fn detail_lines<'a>(view: &DetailView<'a>, cursor: usize) -> Vec<Line<'a>> {
    let task = view.task;
    let mut lines = vec![
        Line::from(Span::styled(task.title.as_str(), theme::bold())),
        Line::from(vec![
            Span::styled(
                task.category.as_str(),
                theme::normal().fg(theme::hex_color_or_fallback(&task.category_color)),
            ),
            Span::raw("  "),
            Span::styled(
                task.priority.as_str(),
                theme::normal().fg(theme::priority_color(task.priority)),
            ),
        ]),
        Line::raw(""),
        Line::raw(task.description.as_str()),
        Line::raw(""),
    ];
    if let Some(due) = task.due_date {
        lines.push(Line::from(vec![
            Span::styled("Due: ", theme::dimmed()),
            Span::raw(due.format("%d.%m.%Y").to_string()),
        ]));
    }
    if let Some(created) = task.created_at {
        lines.push(Line::from(vec![
            Span::styled("Created: ", theme::dimmed()),
            Span::raw(created.format("%d.%m.%Y").to_string()),
        ]));
    }

    lines.push(Line::styled("Assigned to:", theme::dimmed()));
    for contact in &view.assignees {
        lines.push(Line::from(vec![
            Span::styled(
                format!(" {} ", contact.initials),
                theme::bold().fg(theme::hex_color_or_fallback(&contact.color)),
            ),
            Span::raw(contact.name.as_str()),
        ]));
    }

    if !task.subtasks.is_empty() {
        lines.push(Line::styled("Subtasks:", theme::dimmed()));
        for (i, subtask) in task.subtasks.iter().enumerate() {
            let mark = if subtask.done { "[x]" } else { "[ ]" };
            let style = if i == cursor { theme::highlighted() } else { theme::normal() };
            lines.push(Line::styled(format!(" {} {mark} {}", i + 1, subtask.text), style));
        }
    }
    lines
}

fn editor_lines<'a>(draft: &'a TaskDraft, app: &'a App) -> Vec<Line<'a>> {
    let editor = app.editor();
    let mut lines = Vec::new();
    for field in EditorField::ALL {
        let focused = field == editor.field;
        let label_style = if focused {
            theme::highlighted()
        } else {
            theme::dimmed()
        };
        let value = if focused && field != EditorField::Priority && field != EditorField::Subtasks {
            format!("{}▏", editor.buffer)
        } else {
            match field {
                EditorField::Title => draft.title.clone(),
                EditorField::Description => draft.description.clone(),
                EditorField::DueDate => draft
                    .due_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
                EditorField::Priority => draft.priority.as_str().to_string(),
                EditorField::Assignees => draft.assignee_text(app.directory()),
                EditorField::Subtasks => String::new(),
            }
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{:<12}", field.label()), label_style),
            Span::raw(value),
        ]));
    }

    let subtasks_focused = editor.field == EditorField::Subtasks;
    for (i, subtask) in draft.subtasks.iter().enumerate() {
        let mark = if subtask.done { "[x]" } else { "[ ]" };
        let style = if subtasks_focused && i == editor.subtask_cursor {
            theme::highlighted()
        } else {
            theme::normal()
        };
        lines.push(Line::styled(format!("  {mark} {}", subtask.text), style));
    }
    if subtasks_focused {
        lines.push(Line::from(vec![
            Span::styled("  + ", theme::dimmed()),
            Span::raw(format!("{}▏", editor.buffer)),
        ]));
    }
    lines
}

/// A rectangle of `percent_x` by `percent_y` centered in `area`.
fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
