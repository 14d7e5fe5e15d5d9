//! Application state and event handling.
//!
//! [`App`] is the composition root of the client. It owns the board store,
//! the contact directory, the last rendered layout, both drag controllers
//! and the detail overlay, and it is the only code that writes the store.
//! Input handlers return the [`SyncCommand`] a user action requires; the
//! main loop forwards it to the sync coordinator.

use std::collections::{BTreeMap, VecDeque};
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use kanban_proto::column::ColumnId;
use kanban_proto::task::{Task, TaskId};
use serde_json::Value;

use crate::board::{BoardLayout, BoardStore, MovePlan, Point, ScrollTarget, ZoneId, plan_insert};
use crate::config::{ClientConfig, DragMode};
use crate::contacts::Directory;
use crate::detail::{DetailError, DetailOverlay, TaskWrite};
use crate::drag::{
    DragController, DragOutcome, DropPreview, PointerDrag, TouchDrag, resolve_preview,
};
use crate::sync::{SyncCommand, SyncEvent};

/// Maximum number of notifications kept at once.
const MAX_NOTIFICATIONS: usize = 5;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Confirmation or hint.
    Info,
    /// Something failed.
    Error,
}

/// A transient message in the status bar.
#[derive(Debug, Clone)]
pub struct Notification {
    /// Text shown.
    pub text: String,
    /// Severity.
    pub level: NotificationLevel,
    expires_at: Instant,
}

/// Field focused in the task editor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditorField {
    /// Title text.
    #[default]
    Title,
    /// Description text.
    Description,
    /// Due date text (`YYYY-MM-DD`).
    DueDate,
    /// Priority selector.
    Priority,
    /// Assignee text (names, emails or ids).
    Assignees,
    /// Subtask list.
    Subtasks,
}

impl EditorField {
    /// All fields in tab order.
    pub const ALL: [Self; 6] = [
        Self::Title,
        Self::Description,
        Self::DueDate,
        Self::Priority,
        Self::Assignees,
        Self::Subtasks,
    ];

    /// Label shown next to the field.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Description => "Description",
            Self::DueDate => "Due date",
            Self::Priority => "Priority",
            Self::Assignees => "Assignees",
            Self::Subtasks => "Subtasks",
        }
    }

    const fn position(self) -> usize {
        match self {
            Self::Title => 0,
            Self::Description => 1,
            Self::DueDate => 2,
            Self::Priority => 3,
            Self::Assignees => 4,
            Self::Subtasks => 5,
        }
    }

    const fn next(self) -> Self {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    const fn prev(self) -> Self {
        Self::ALL[(self.position() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Text input state of the task editor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorInput {
    /// Focused field.
    pub field: EditorField,
    /// Text being typed into the focused field.
    pub buffer: String,
    /// Selected subtask in the subtask field.
    pub subtask_cursor: usize,
}

/// A mouse press on a card that may become a drag or a click.
#[derive(Debug, Clone)]
struct PendingPress {
    task_id: TaskId,
    column: ColumnId,
    moved: bool,
}

/// Main application state.
pub struct App {
    board: BoardStore,
    directory: Directory,
    layout: BoardLayout,
    detail: DetailOverlay,
    pointer: PointerDrag,
    touch: TouchDrag,
    drag_mode: DragMode,
    pending: Option<PendingPress>,
    drop_preview: Option<DropPreview>,
    selected_column: ColumnId,
    selected_index: usize,
    column_scroll: BTreeMap<ColumnId, f64>,
    notifications: VecDeque<Notification>,
    editor: EditorInput,
    subtask_cursor: usize,
    board_path: String,
    card_height: u16,
    max_title_len: usize,
    notification_ttl: Duration,
    /// Whether the app should quit.
    pub should_quit: bool,
}

impl App {
    /// Creates an empty board configured from `config`.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            board: BoardStore::new(),
            directory: Directory::default(),
            layout: BoardLayout::default(),
            detail: DetailOverlay::new(),
            pointer: PointerDrag::new(),
            touch: TouchDrag::new(config.autoscroll()),
            drag_mode: config.drag_mode,
            pending: None,
            drop_preview: None,
            selected_column: ColumnId::Todo,
            selected_index: 0,
            column_scroll: BTreeMap::new(),
            notifications: VecDeque::new(),
            editor: EditorInput::default(),
            subtask_cursor: 0,
            board_path: config.board_path.trim_matches('/').to_string(),
            card_height: config.card_height,
            max_title_len: config.max_title_len,
            notification_ttl: config.notification_ttl,
            should_quit: false,
        }
    }

    // -- Accessors ---------------------------------------------------------

    /// The board model.
    #[must_use]
    pub const fn board(&self) -> &BoardStore {
        &self.board
    }

    /// The contact directory.
    #[must_use]
    pub const fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Geometry of the last rendered frame.
    #[must_use]
    pub const fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    /// The detail overlay.
    #[must_use]
    pub const fn detail(&self) -> &DetailOverlay {
        &self.detail
    }

    /// Active drag controller kind.
    #[must_use]
    pub const fn drag_mode(&self) -> DragMode {
        self.drag_mode
    }

    /// Rows per card.
    #[must_use]
    pub const fn card_height(&self) -> u16 {
        self.card_height
    }

    /// Selected column.
    #[must_use]
    pub const fn selected_column(&self) -> ColumnId {
        self.selected_column
    }

    /// Index of the selected card within its column.
    #[must_use]
    pub const fn selected_index(&self) -> usize {
        self.selected_index
    }

    /// The selected task.
    #[must_use]
    pub fn selected_task(&self) -> Option<&Task> {
        self.board
            .get(self.selected_column)
            .get(self.selected_index)
            .copied()
    }

    /// Insertion preview while dragging.
    #[must_use]
    pub const fn drop_preview(&self) -> Option<&DropPreview> {
        self.drop_preview.as_ref()
    }

    /// Zone highlighted by the current gesture.
    #[must_use]
    pub fn highlighted_zone(&self) -> Option<&ZoneId> {
        match self.drag_mode {
            DragMode::Pointer => self.drop_preview.as_ref().map(|p| &p.zone),
            DragMode::Touch => self.touch.highlighted(),
        }
    }

    /// Task being dragged right now.
    #[must_use]
    pub fn dragged_task(&self) -> Option<&TaskId> {
        let payload = match self.drag_mode {
            DragMode::Pointer => self.pointer.payload(),
            DragMode::Touch => self.touch.payload(),
        };
        payload.map(|p| &p.task_id)
    }

    /// Scroll offset of a column list, in rows.
    #[must_use]
    pub fn column_scroll(&self, column: ColumnId) -> f64 {
        self.column_scroll.get(&column).copied().unwrap_or(0.0)
    }

    /// Live notifications, oldest first.
    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter()
    }

    /// Editor input state.
    #[must_use]
    pub const fn editor(&self) -> &EditorInput {
        &self.editor
    }

    /// Selected subtask in the read-only detail view.
    #[must_use]
    pub const fn subtask_cursor(&self) -> usize {
        self.subtask_cursor
    }

    /// Stores the geometry of the frame just drawn.
    pub fn set_layout(&mut self, layout: BoardLayout) {
        self.layout = layout;
    }

    // -- Remote state ------------------------------------------------------

    /// Replaces the board with a remote snapshot.
    pub fn apply_board_snapshot(&mut self, snapshot: Option<&Value>) {
        self.board.merge(snapshot);
        if self.detail.reconcile(&self.board) {
            self.editor = EditorInput::default();
            self.notify("The open task was removed", NotificationLevel::Info);
        }
        self.clamp_selection();
    }

    /// Rebuilds the directory from a contacts snapshot.
    pub fn apply_contacts_snapshot(&mut self, snapshot: Option<&Value>) {
        self.directory = Directory::build(snapshot);
    }

    /// Applies one event from the sync coordinator.
    pub fn handle_sync_event(&mut self, event: SyncEvent) {
        match event {
            SyncEvent::BoardSnapshot(snapshot) => self.apply_board_snapshot(snapshot.as_ref()),
            SyncEvent::ContactsSnapshot(snapshot) => {
                self.apply_contacts_snapshot(snapshot.as_ref());
            }
            SyncEvent::WriteFailed { target, error } => {
                self.notify(
                    format!("Could not save changes to {target}: {error}"),
                    NotificationLevel::Error,
                );
            }
        }
    }

    /// Adds a notification, dropping the oldest beyond the limit.
    pub fn notify(&mut self, text: impl Into<String>, level: NotificationLevel) {
        self.notifications.push_back(Notification {
            text: text.into(),
            level,
            expires_at: Instant::now() + self.notification_ttl,
        });
        while self.notifications.len() > MAX_NOTIFICATIONS {
            self.notifications.pop_front();
        }
    }

    /// Periodic work: expire notifications and run touch auto-scroll.
    pub fn tick(&mut self, now: Instant) {
        self.notifications.retain(|n| n.expires_at > now);
        if self.touch.is_dragging()
            && let Some(step) = self.touch.scroll_step()
        {
            self.scroll(step.target, step.delta);
        }
    }

    // -- Keyboard ----------------------------------------------------------

    /// Handles a key press. Returns the write the action requires, if any.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<SyncCommand> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return None;
        }
        if self.detail.is_editing() {
            self.handle_editor_key(key)
        } else if self.detail.is_open() {
            self.handle_detail_key(key)
        } else {
            self.handle_board_key(key)
        }
    }

    fn handle_board_key(&mut self, key: KeyEvent) -> Option<SyncCommand> {
        match key.code {
            KeyCode::Esc if self.pending.is_some() => {
                self.cancel_gestures();
                None
            }
            KeyCode::Esc | KeyCode::Char('q') => {
                self.should_quit = true;
                None
            }
            KeyCode::Left | KeyCode::Char('h') => {
                if let Some(column) = self.selected_column.prev() {
                    self.select_column(column);
                }
                None
            }
            KeyCode::Right | KeyCode::Char('l') => {
                if let Some(column) = self.selected_column.next() {
                    self.select_column(column);
                }
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_index = self.selected_index.saturating_sub(1);
                self.ensure_selection_visible();
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected_index += 1;
                self.clamp_selection();
                self.ensure_selection_visible();
                None
            }
            KeyCode::Char('H') => {
                let target = self.selected_column.prev()?;
                self.move_selected(target, self.selected_index)
            }
            KeyCode::Char('L') => {
                let target = self.selected_column.next()?;
                self.move_selected(target, self.selected_index)
            }
            KeyCode::Char('K') => {
                let index = self.selected_index.checked_sub(1)?;
                self.move_selected(self.selected_column, index)
            }
            KeyCode::Char('J') => self.move_selected(self.selected_column, self.selected_index + 1),
            KeyCode::Enter => {
                if let Some(id) = self.selected_task().map(|t| t.id.clone()) {
                    self.open_detail(id);
                }
                None
            }
            KeyCode::Char('m') => {
                self.cancel_gestures();
                self.drag_mode = match self.drag_mode {
                    DragMode::Pointer => DragMode::Touch,
                    DragMode::Touch => DragMode::Pointer,
                };
                self.notify(format!("Drag mode: {}", self.drag_mode), NotificationLevel::Info);
                None
            }
            _ => None,
        }
    }

    fn handle_detail_key(&mut self, key: KeyEvent) -> Option<SyncCommand> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.detail.close();
                None
            }
            KeyCode::Char('e') => {
                match self.detail.begin_edit(&self.board, &self.directory) {
                    Ok(()) => {
                        self.editor = EditorInput::default();
                        self.load_field();
                    }
                    Err(e) => self.notify(e.to_string(), NotificationLevel::Error),
                }
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.subtask_cursor = self.subtask_cursor.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let last = self.open_subtask_count().saturating_sub(1);
                self.subtask_cursor = (self.subtask_cursor + 1).min(last);
                None
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_open_subtask(self.subtask_cursor),
            KeyCode::Char(c) if ('1'..='9').contains(&c) => {
                let index = c.to_digit(10).and_then(|d| usize::try_from(d).ok())? - 1;
                self.subtask_cursor = index;
                self.toggle_open_subtask(index)
            }
            _ => None,
        }
    }

    fn open_subtask_count(&self) -> usize {
        self.detail
            .task_id()
            .and_then(|id| self.board.task(id))
            .map_or(0, |task| task.subtasks.len())
    }

    fn toggle_open_subtask(&mut self, index: usize) -> Option<SyncCommand> {
        match self.detail.toggle_subtask(index, &mut self.board) {
            Ok(write) => Some(self.write_command(write)),
            Err(e) => {
                self.notify(e.to_string(), NotificationLevel::Error);
                None
            }
        }
    }

    fn handle_editor_key(&mut self, key: KeyEvent) -> Option<SyncCommand> {
        let control = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('s') if control => return self.save_detail(),
            KeyCode::Esc => {
                self.detail.cancel_edit();
                self.editor = EditorInput::default();
                return None;
            }
            KeyCode::Tab => {
                self.switch_field(self.editor.field.next());
                return None;
            }
            KeyCode::BackTab => {
                self.switch_field(self.editor.field.prev());
                return None;
            }
            _ => {}
        }

        let field = self.editor.field;
        let Some(draft) = self.detail.draft_mut() else {
            return None;
        };
        let mut failure = None;
        match (field, key.code) {
            (EditorField::Priority, KeyCode::Char(' ') | KeyCode::Enter | KeyCode::Left | KeyCode::Right) => {
                draft.cycle_priority();
            }
            (EditorField::Subtasks, KeyCode::Up) => {
                self.editor.subtask_cursor = self.editor.subtask_cursor.saturating_sub(1);
            }
            (EditorField::Subtasks, KeyCode::Down) => {
                let last = draft.subtasks.len().saturating_sub(1);
                self.editor.subtask_cursor = (self.editor.subtask_cursor + 1).min(last);
            }
            (EditorField::Subtasks, KeyCode::Enter) => {
                if draft.add_subtask(&self.editor.buffer) {
                    self.editor.buffer.clear();
                    self.editor.subtask_cursor = draft.subtasks.len() - 1;
                } else if let Err(e) = draft.toggle_subtask(self.editor.subtask_cursor) {
                    failure = Some(e);
                }
            }
            (EditorField::Subtasks, KeyCode::Delete) => {
                if draft.remove_subtask(self.editor.subtask_cursor).is_ok() {
                    let last = draft.subtasks.len().saturating_sub(1);
                    self.editor.subtask_cursor = self.editor.subtask_cursor.min(last);
                }
            }
            (EditorField::Priority, _) => {}
            (_, KeyCode::Char(c)) if !control => self.editor.buffer.push(c),
            (_, KeyCode::Backspace) => {
                self.editor.buffer.pop();
            }
            _ => {}
        }
        if let Some(e) = failure {
            self.notify(e.to_string(), NotificationLevel::Error);
        }
        None
    }

    // -- Mouse -------------------------------------------------------------

    /// Handles a mouse event. Returns the write a completed drag requires.
    pub fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Option<SyncCommand> {
        if self.detail.is_open() {
            return None;
        }
        let point = Point::new(f64::from(mouse.column) + 0.5, f64::from(mouse.row) + 0.5);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.press(point);
                None
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                self.drag_to(point);
                None
            }
            MouseEventKind::Up(MouseButton::Left) => self.release(point),
            MouseEventKind::ScrollDown => {
                self.scroll(self.layout.scroll_target_at(point), 1.0);
                None
            }
            MouseEventKind::ScrollUp => {
                self.scroll(self.layout.scroll_target_at(point), -1.0);
                None
            }
            _ => None,
        }
    }

    fn press(&mut self, point: Point) {
        self.cancel_gestures();
        let Some(slot) = self.layout.card_at(point) else {
            return;
        };
        let task_id = slot.task_id.clone();
        let column = slot.column;
        if let Some(index) = self
            .board
            .get(column)
            .iter()
            .position(|t| t.id == task_id)
        {
            self.selected_column = column;
            self.selected_index = index;
        }
        if self.drag_mode == DragMode::Touch {
            self.touch.touch_start(task_id.clone(), column, point);
        }
        self.pending = Some(PendingPress {
            task_id,
            column,
            moved: false,
        });
    }

    fn drag_to(&mut self, point: Point) {
        let Some(pending) = self.pending.as_mut() else {
            return;
        };
        pending.moved = true;
        match self.drag_mode {
            DragMode::Pointer => {
                if !self.pointer.is_dragging() {
                    self.pointer.drag_start(pending.task_id.clone(), pending.column);
                }
                self.drop_preview = self.layout.zone_at(point).and_then(|zone| {
                    self.pointer
                        .drag_over(&self.layout, &self.board, &zone.id, point.y)
                });
            }
            DragMode::Touch => {
                self.touch.touch_move(point, &self.layout);
                self.drop_preview = match (self.touch.highlighted(), self.touch.payload()) {
                    (Some(zone), Some(payload)) => {
                        resolve_preview(&self.layout, &self.board, zone, point.y, payload)
                    }
                    _ => None,
                };
            }
        }
    }

    fn release(&mut self, point: Point) -> Option<SyncCommand> {
        let pending = self.pending.take()?;
        self.drop_preview = None;
        let outcome = match self.drag_mode {
            DragMode::Pointer if self.pointer.is_dragging() => {
                let outcome = match self.layout.zone_at(point).map(|z| z.id.clone()) {
                    Some(zone) => self.pointer.drop(&self.layout, &self.board, &zone, point.y),
                    None => DragOutcome::Cancelled,
                };
                self.pointer.drag_end();
                outcome
            }
            DragMode::Pointer => DragOutcome::Cancelled,
            DragMode::Touch => self.touch.touch_end(&self.layout, &self.board),
        };

        match outcome {
            DragOutcome::Dropped(plan) => self.commit_plan(&plan),
            DragOutcome::Cancelled => {
                if !pending.moved {
                    self.open_detail(pending.task_id);
                }
                None
            }
        }
    }

    fn cancel_gestures(&mut self) {
        self.pointer.cancel();
        self.touch.cancel();
        self.pending = None;
        self.drop_preview = None;
    }

    // -- Helpers -----------------------------------------------------------

    /// Applies a move locally and returns the patch to submit. A plan that
    /// changes nothing yields no command.
    pub fn commit_plan(&mut self, plan: &MovePlan) -> Option<SyncCommand> {
        if !self.board.apply(plan) {
            return None;
        }
        self.selected_column = plan.to;
        self.selected_index = plan.index;
        self.ensure_selection_visible();
        Some(SyncCommand::Patch {
            prefix: self.board_path.clone(),
            updates: plan.to_patch(),
        })
    }

    fn move_selected(&mut self, target: ColumnId, index: usize) -> Option<SyncCommand> {
        let task_id = self.selected_task()?.id.clone();
        let plan = plan_insert(&self.board, &task_id, target, index)?;
        self.commit_plan(&plan)
    }

    fn open_detail(&mut self, task_id: TaskId) {
        self.subtask_cursor = 0;
        if let Err(e) = self.detail.open(task_id, &self.board) {
            self.notify(e.to_string(), NotificationLevel::Error);
        }
    }

    fn save_detail(&mut self) -> Option<SyncCommand> {
        if let Err(e) = self.commit_field() {
            self.notify(e.to_string(), NotificationLevel::Error);
            return None;
        }
        match self.detail.save(&mut self.board, self.max_title_len) {
            Ok(write) => {
                self.editor = EditorInput::default();
                self.notify("Task saved", NotificationLevel::Info);
                Some(self.write_command(write))
            }
            Err(e) => {
                self.notify(e.to_string(), NotificationLevel::Error);
                None
            }
        }
    }

    fn write_command(&self, write: TaskWrite) -> SyncCommand {
        SyncCommand::Write {
            path: format!("{}/{}", self.board_path, write.path),
            value: write.value,
        }
    }

    fn switch_field(&mut self, field: EditorField) {
        if let Err(e) = self.commit_field() {
            self.notify(e.to_string(), NotificationLevel::Error);
            return;
        }
        self.editor.field = field;
        self.load_field();
    }

    /// Moves the typed text into the draft.
    fn commit_field(&mut self) -> Result<(), DetailError> {
        let Some(draft) = self.detail.draft_mut() else {
            return Ok(());
        };
        let buffer = &self.editor.buffer;
        match self.editor.field {
            EditorField::Title => draft.title.clone_from(buffer),
            EditorField::Description => draft.description.clone_from(buffer),
            EditorField::DueDate => draft.set_due_date_text(buffer)?,
            EditorField::Assignees => draft.set_assignee_text(buffer, &self.directory),
            EditorField::Priority | EditorField::Subtasks => {}
        }
        Ok(())
    }

    /// Fills the input buffer from the draft.
    fn load_field(&mut self) {
        let Some(draft) = self.detail.draft() else {
            return;
        };
        self.editor.buffer = match self.editor.field {
            EditorField::Title => draft.title.clone(),
            EditorField::Description => draft.description.clone(),
            EditorField::DueDate => draft
                .due_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            EditorField::Assignees => draft.assignee_text(&self.directory),
            EditorField::Priority | EditorField::Subtasks => String::new(),
        };
    }

    fn select_column(&mut self, column: ColumnId) {
        self.selected_column = column;
        self.clamp_selection();
        self.ensure_selection_visible();
    }

    fn clamp_selection(&mut self) {
        let count = self.board.count(self.selected_column);
        self.selected_index = self.selected_index.min(count.saturating_sub(1));
    }

    /// Scrolls the selected column so the selected card is fully shown.
    fn ensure_selection_visible(&mut self) {
        let Some(zone) = self.layout.zone_for_column(self.selected_column) else {
            return;
        };
        let height = f64::from(self.card_height);
        #[allow(clippy::cast_precision_loss)]
        let top = self.selected_index as f64 * height;
        let view = zone.bounds.height;
        let current = self.column_scroll(self.selected_column);
        let offset = if top < current {
            top
        } else if top + height > current + view {
            top + height - view
        } else {
            current
        };
        self.column_scroll.insert(self.selected_column, offset.max(0.0));
    }

    fn scroll(&mut self, target: ScrollTarget, delta: f64) {
        // The board always fits the terminal width; only lists scroll.
        let ScrollTarget::Column(column) = target else {
            return;
        };
        let max = self
            .layout
            .zone_for_column(column)
            .map_or(0.0, |zone| zone.max_scroll());
        let offset = (self.column_scroll(column) + delta).clamp(0.0, max);
        self.column_scroll.insert(column, offset);
    }
}
