//! Board columns and task cards.

use kanban_proto::column::ColumnId;
use kanban_proto::task::Task;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::{rect_bounds, theme};
use crate::app::App;
use crate::board::{BoardLayout, Bounds, ZoneId};
use crate::contacts::resolve_contacts;

/// Render the four columns and return the geometry they were drawn with.
pub fn render(frame: &mut Frame, area: Rect, app: &App) -> BoardLayout {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    let highlighted = app.highlighted_zone();
    let mut lists = Vec::with_capacity(ColumnId::ALL.len());
    for (column, chunk) in ColumnId::ALL.into_iter().zip(chunks.iter()) {
        let is_target = highlighted.is_some_and(|z| *z == ZoneId::for_column(column));
        let border = if is_target {
            theme::drop_target()
        } else if column == app.selected_column() {
            theme::highlighted()
        } else {
            theme::normal()
        };
        let block = Block::default()
            .title(Span::styled(
                format!("{} ({})", column.title(), app.board().count(column)),
                theme::panel_title(theme::FG_PRIMARY),
            ))
            .borders(Borders::ALL)
            .border_style(border);
        lists.push((column, rect_bounds(block.inner(*chunk))));
        frame.render_widget(block, *chunk);
    }

    let layout = BoardLayout::compute(
        app.board(),
        rect_bounds(area),
        &lists,
        f64::from(app.card_height()),
        |column| app.column_scroll(column),
    );

    for (column, _) in &lists {
        render_cards(frame, &layout, *column, app);
        render_drop_marker(frame, &layout, *column, app);
    }
    layout
}

fn render_cards(frame: &mut Frame, layout: &BoardLayout, column: ColumnId, app: &App) {
    let selected = app.selected_task().map(|t| &t.id);
    let dragged = app.dragged_task();
    for slot in layout.cards_in(column) {
        if !layout.is_visible(slot) {
            continue;
        }
        let Some(task) = app.board().task(&slot.task_id) else {
            continue;
        };
        let is_dragged = dragged == Some(&task.id);
        let border = if is_dragged {
            theme::drop_target()
        } else if selected == Some(&task.id) {
            theme::highlighted()
        } else {
            theme::dimmed()
        };
        let lines = if is_dragged {
            vec![Line::styled("moving…", theme::dimmed())]
        } else {
            card_lines(task, app)
        };
        let card = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(Span::styled(task.title.clone(), theme::bold())),
        );
        frame.render_widget(card, to_rect(slot.bounds));
    }
}

fn card_lines<'a>(task: &'a Task, app: &'a App) -> Vec<Line<'a>> {
    let mut first = vec![Span::styled(
        task.priority.as_str(),
        theme::normal().fg(theme::priority_color(task.priority)),
    )];
    if !task.category.is_empty() {
        first.push(Span::raw(" "));
        first.push(Span::styled(
            task.category.as_str(),
            theme::normal().fg(theme::hex_color_or_fallback(&task.category_color)),
        ));
    }
    if !task.subtasks.is_empty() {
        first.push(Span::styled(
            format!(" {}/{}", task.subtasks_done(), task.subtasks.len()),
            theme::dimmed(),
        ));
    }

    let mut second: Vec<Span<'a>> = resolve_contacts(task.assignees.raw(), app.directory())
        .into_iter()
        .flat_map(|contact| {
            [
                Span::styled(
                    contact.initials.as_str(),
                    theme::bold().fg(theme::hex_color_or_fallback(&contact.color)),
                ),
                Span::raw(" "),
            ]
        })
        .collect();
    if let Some(due) = task.due_date {
        second.push(Span::styled(due.format("%d.%m.%Y").to_string(), theme::dimmed()));
    }
    vec![Line::from(first), Line::from(second)]
}

/// Draw the insertion marker of the current drag preview.
fn render_drop_marker(frame: &mut Frame, layout: &BoardLayout, column: ColumnId, app: &App) {
    let Some(preview) = app.drop_preview().filter(|p| p.column == column) else {
        return;
    };
    let Some(zone) = layout.zone_for_column(column) else {
        return;
    };
    #[allow(clippy::cast_precision_loss)]
    let y = zone.bounds.y + preview.index as f64 * f64::from(app.card_height()) - zone.scroll_offset;
    if y < zone.bounds.y || y >= zone.bounds.bottom() {
        return;
    }
    let marker = Bounds::new(zone.bounds.x, y, zone.bounds.width, 1.0);
    let rect = to_rect(marker);
    let line = "─".repeat(usize::from(rect.width));
    frame.render_widget(Paragraph::new(line).style(theme::drop_target()), rect);
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_rect(bounds: Bounds) -> Rect {
    Rect::new(
        bounds.x.max(0.0) as u16,
        bounds.y.max(0.0) as u16,
        bounds.width.max(0.0) as u16,
        bounds.height.max(0.0) as u16,
    )
}
