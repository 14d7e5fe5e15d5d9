//! Integration tests for the task detail overlay and editor.
//!
//! Exercises the Closed → Open → Editing → Open → Closed state machine,
//! draft validation, subtask handling and the writes the editor produces.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use kanban::app::{App, EditorField, NotificationLevel};
use kanban::board::BoardStore;
use kanban::config::ClientConfig;
use kanban::contacts::Directory;
use kanban::detail::{DetailError, DetailOverlay, DetailState};
use kanban::sync::SyncCommand;
use kanban_proto::task::{Priority, TaskId};
use serde_json::json;

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

fn store() -> BoardStore {
    let mut store = BoardStore::new();
    store.merge(Some(&json!({
        "todo": {
            "t1": {
                "order": 0,
                "title": "Write docs",
                "priority": "low",
                "createdAt": "2026-10-01T08:00:00Z",
                "assignees": {"name": "Anna Muster"},
                "subtasks": [{"text": "Outline", "done": false}]
            }
        }
    })));
    store
}

fn directory() -> Directory {
    Directory::build(Some(&json!({
        "c1": {"name": "Anna Muster"},
        "c2": {"name": "Ben Braun", "email": "ben@example.com"}
    })))
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        assert!(app.handle_key_event(key(KeyCode::Char(c))).is_none());
    }
}

fn clear_field(app: &mut App) {
    for _ in 0..app.editor().buffer.chars().count() {
        app.handle_key_event(key(KeyCode::Backspace));
    }
}

fn focus(app: &mut App, field: EditorField) {
    while app.editor().field != field {
        app.handle_key_event(key(KeyCode::Tab));
    }
}

fn editing_app() -> App {
    let mut app = App::new(&ClientConfig::default());
    app.apply_contacts_snapshot(Some(&json!({
        "c1": {"name": "Anna Muster"},
        "c2": {"name": "Ben Braun", "email": "ben@example.com"}
    })));
    app.apply_board_snapshot(Some(&store().to_snapshot()));
    app.handle_key_event(key(KeyCode::Enter));
    app.handle_key_event(key(KeyCode::Char('e')));
    assert!(app.detail().is_editing());
    app
}

// ---------------------------------------------------------------------------
// Overlay state machine
// ---------------------------------------------------------------------------

#[test]
fn full_lifecycle_returns_to_closed() {
    let mut store = store();
    let directory = directory();
    let mut overlay = DetailOverlay::new();
    assert_eq!(overlay.state(), &DetailState::Closed);

    overlay.open(TaskId::new("t1"), &store).unwrap();
    let view = overlay.view(&store, &directory).unwrap();
    assert_eq!(view.task.title, "Write docs");
    assert_eq!(view.assignees.len(), 1);
    assert!(view.draft.is_none());

    overlay.begin_edit(&store, &directory).unwrap();
    overlay.draft_mut().unwrap().cycle_priority();
    let write = overlay.save(&mut store, 256).unwrap();
    assert_eq!(write.value["priority"], json!("urgent"));
    assert!(overlay.is_open() && !overlay.is_editing());

    overlay.close();
    assert_eq!(overlay.state(), &DetailState::Closed);
    assert_eq!(store.task(&TaskId::new("t1")).unwrap().priority, Priority::Urgent);
}

#[test]
fn operations_in_the_wrong_state_are_rejected() {
    let mut store = store();
    let directory = directory();
    let mut overlay = DetailOverlay::new();
    assert_eq!(overlay.begin_edit(&store, &directory), Err(DetailError::NotOpen));
    assert_eq!(overlay.save(&mut store, 256), Err(DetailError::NotEditing));
    assert_eq!(overlay.toggle_subtask(0, &mut store), Err(DetailError::NotOpen));

    overlay.open(TaskId::new("t1"), &store).unwrap();
    overlay.begin_edit(&store, &directory).unwrap();
    assert_eq!(overlay.toggle_subtask(0, &mut store), Err(DetailError::Editing));
}

#[test]
fn validation_errors_keep_the_editor_open() {
    let mut store = store();
    let directory = directory();
    let mut overlay = DetailOverlay::new();
    overlay.open(TaskId::new("t1"), &store).unwrap();
    overlay.begin_edit(&store, &directory).unwrap();

    let draft = overlay.draft_mut().unwrap();
    draft.due_date = NaiveDate::from_ymd_opt(2026, 9, 30);
    assert!(matches!(
        overlay.save(&mut store, 256),
        Err(DetailError::DueBeforeCreation { .. })
    ));
    assert!(overlay.is_editing());

    let draft = overlay.draft_mut().unwrap();
    draft.due_date = NaiveDate::from_ymd_opt(2026, 10, 1);
    draft.title = "x".repeat(11);
    assert_eq!(overlay.save(&mut store, 10), Err(DetailError::TitleTooLong { max: 10 }));

    overlay.draft_mut().unwrap().title = "   ".into();
    assert_eq!(overlay.save(&mut store, 10), Err(DetailError::TitleEmpty));
    assert_eq!(store.task(&TaskId::new("t1")).unwrap().title, "Write docs");
}

// ---------------------------------------------------------------------------
// Editor through the app
// ---------------------------------------------------------------------------

#[test]
fn editing_every_field_produces_one_write() {
    let mut app = editing_app();

    clear_field(&mut app);
    type_text(&mut app, "Write user docs");

    focus(&mut app, EditorField::Description);
    type_text(&mut app, "Install and usage");

    focus(&mut app, EditorField::DueDate);
    type_text(&mut app, "2026-12-24");

    focus(&mut app, EditorField::Priority);
    app.handle_key_event(key(KeyCode::Char(' ')));

    focus(&mut app, EditorField::Assignees);
    assert_eq!(app.editor().buffer, "Anna Muster");
    type_text(&mut app, ", ben@example.com");

    focus(&mut app, EditorField::Subtasks);
    type_text(&mut app, "Examples");
    app.handle_key_event(key(KeyCode::Enter));
    app.handle_key_event(key(KeyCode::Up));
    app.handle_key_event(key(KeyCode::Enter));

    let Some(SyncCommand::Write { path, value }) = app.handle_key_event(ctrl('s')) else {
        panic!("expected a write");
    };
    assert_eq!(path, "board/todo/t1");
    assert_eq!(value["title"], json!("Write user docs"));
    assert_eq!(value["description"], json!("Install and usage"));
    assert_eq!(value["dueDate"], json!("2026-12-24"));
    assert_eq!(value["priority"], json!("urgent"));
    assert_eq!(value["assignees"], json!(["c1", "c2"]));
    assert_eq!(
        value["subtasks"],
        json!([{"text": "Outline", "done": true}, {"text": "Examples", "done": false}])
    );
    assert_eq!(value["order"], json!(0));
    assert_eq!(value["createdAt"], json!("2026-10-01T08:00:00Z"));
    assert!(app.detail().is_open() && !app.detail().is_editing());
}

#[test]
fn escape_discards_the_draft() {
    let mut app = editing_app();
    clear_field(&mut app);
    type_text(&mut app, "Scrapped");
    app.handle_key_event(key(KeyCode::Esc));
    assert!(app.detail().is_open() && !app.detail().is_editing());
    assert_eq!(app.board().task(&TaskId::new("t1")).unwrap().title, "Write docs");

    app.handle_key_event(key(KeyCode::Esc));
    assert!(!app.detail().is_open());
    assert!(!app.should_quit);
}

#[test]
fn deleting_subtasks_in_the_editor() {
    let mut app = editing_app();
    focus(&mut app, EditorField::Subtasks);
    app.handle_key_event(key(KeyCode::Delete));
    let Some(SyncCommand::Write { value, .. }) = app.handle_key_event(ctrl('s')) else {
        panic!("expected a write");
    };
    assert!(value.get("subtasks").is_none_or(|s| s == &json!([])));
}

#[test]
fn open_detail_toggles_subtasks_by_number() {
    let mut app = App::new(&ClientConfig::default());
    app.apply_board_snapshot(Some(&store().to_snapshot()));
    app.handle_key_event(key(KeyCode::Enter));

    assert!(app.handle_key_event(key(KeyCode::Char('5'))).is_none());
    let Some(SyncCommand::Write { path, value }) = app.handle_key_event(key(KeyCode::Char('1'))) else {
        panic!("expected a write");
    };
    assert_eq!(path, "board/todo/t1/subtasks");
    assert_eq!(value, json!([{"text": "Outline", "done": true}]));
    assert_eq!(app.board().task(&TaskId::new("t1")).unwrap().subtasks_done(), 1);
}

#[test]
fn open_detail_cursor_reaches_every_subtask() {
    let subtasks: Vec<String> = (1..=12).map(|i| format!("Step {i}")).collect();
    let mut app = App::new(&ClientConfig::default());
    app.apply_board_snapshot(Some(&json!({
        "todo": {"t1": {"order": 0, "title": "Long checklist", "subtasks": subtasks}}
    })));
    app.handle_key_event(key(KeyCode::Enter));

    for _ in 0..15 {
        assert!(app.handle_key_event(key(KeyCode::Down)).is_none());
    }
    assert_eq!(app.subtask_cursor(), 11);
    let Some(SyncCommand::Write { path, value }) = app.handle_key_event(key(KeyCode::Enter)) else {
        panic!("expected a write");
    };
    assert_eq!(path, "board/todo/t1/subtasks");
    assert_eq!(value[11], json!({"text": "Step 12", "done": true}));

    app.handle_key_event(key(KeyCode::Up));
    assert!(app.handle_key_event(key(KeyCode::Char(' '))).is_some());
    let task = app.board().task(&TaskId::new("t1")).unwrap();
    assert!(task.subtasks[10].done && task.subtasks[11].done);
    assert_eq!(task.subtasks_done(), 2);
}

#[test]
fn toggling_in_an_empty_subtask_list_reports_an_error() {
    let mut app = App::new(&ClientConfig::default());
    app.apply_board_snapshot(Some(&json!({"todo": {"t1": {"order": 0, "title": "Bare"}}})));
    app.handle_key_event(key(KeyCode::Enter));
    app.handle_key_event(key(KeyCode::Char('e')));
    focus(&mut app, EditorField::Subtasks);

    assert!(app.handle_key_event(key(KeyCode::Enter)).is_none());
    assert!(app.detail().is_editing());
    assert!(app.notifications().any(|n| n.level == NotificationLevel::Error));
}
