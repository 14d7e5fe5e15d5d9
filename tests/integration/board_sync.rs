//! Integration tests for the live sync loop.
//!
//! Wires an [`App`] to a [`MemoryStore`] through the sync coordinator and
//! checks that local moves are patched, remote changes replace local state,
//! and rejected writes surface without rolling anything back.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use kanban::app::{App, NotificationLevel};
use kanban::config::ClientConfig;
use kanban::persistence::{MemoryStore, Persistence, PersistenceError};
use kanban::sync::{SyncCommand, SyncConfig, SyncEvent, spawn_sync};
use kanban_proto::column::ColumnId;
use kanban_proto::snapshot::Patch;
use kanban_proto::task::TaskId;
use serde_json::{Value, json};
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

fn document() -> Value {
    json!({
        "board": {
            "todo": {"t1": {"order": 0, "title": "One"}, "t2": {"order": 1, "title": "Two"}},
            "done": {"d1": {"order": 0, "title": "Done", "subtasks": ["a", "b"]}}
        },
        "contacts": {"c1": {"name": "Anna Muster"}}
    })
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

async fn next_event(rx: &mut mpsc::Receiver<SyncEvent>) -> SyncEvent {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for a sync event")
        .expect("sync channel closed")
}

/// Starts sync and applies the initial board and contacts snapshots.
async fn connected(
    store: &Arc<MemoryStore>,
    config: &ClientConfig,
) -> (App, mpsc::Sender<SyncCommand>, mpsc::Receiver<SyncEvent>) {
    let (tx, mut rx) = spawn_sync(Arc::clone(store), config.to_sync_config())
        .await
        .unwrap();
    let mut app = App::new(config);
    for _ in 0..2 {
        app.handle_sync_event(next_event(&mut rx).await);
    }
    (app, tx, rx)
}

fn column_ids(app: &App, column: ColumnId) -> Vec<String> {
    app.board().get(column).iter().map(|t| t.id.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn initial_snapshots_populate_board_and_directory() {
    let store = Arc::new(MemoryStore::with_root(document()));
    let (app, _tx, _rx) = connected(&store, &ClientConfig::default()).await;
    assert_eq!(app.board().len(), 3);
    assert_eq!(app.directory().len(), 1);
    assert_eq!(column_ids(&app, ColumnId::Todo), vec!["t1", "t2"]);
}

#[tokio::test]
async fn local_move_is_patched_and_echoed_back() {
    let store = Arc::new(MemoryStore::with_root(document()));
    let (mut app, tx, mut rx) = connected(&store, &ClientConfig::default()).await;

    let command = app.handle_key_event(key(KeyCode::Char('L'))).unwrap();
    tx.send(command).await.unwrap();

    let SyncEvent::BoardSnapshot(snapshot) = next_event(&mut rx).await else {
        panic!("expected a board snapshot");
    };
    let local = app.board().to_snapshot();
    app.apply_board_snapshot(snapshot.as_ref());
    assert_eq!(app.board().to_snapshot(), local);

    assert!(store.value_at("board/todo/t1").is_none());
    assert_eq!(store.value_at("board/inprogress/t1/title"), Some(json!("One")));
    assert_eq!(store.value_at("board/todo/t2/order"), Some(json!(1)));
}

#[tokio::test]
async fn rejected_patch_keeps_local_move_until_next_merge() {
    let store = Arc::new(MemoryStore::with_root(document()));
    let (mut app, tx, mut rx) = connected(&store, &ClientConfig::default()).await;
    let pre_move = store.value_at("board");

    store.fail_next(1);
    let command = app.handle_key_event(key(KeyCode::Char('L'))).unwrap();
    tx.send(command).await.unwrap();

    let event = next_event(&mut rx).await;
    assert!(matches!(
        event,
        SyncEvent::WriteFailed { error: PersistenceError::Rejected { .. }, .. }
    ));
    app.handle_sync_event(event);

    // The optimistic move stays visible.
    assert_eq!(app.board().locate(&TaskId::new("t1")), Some(ColumnId::InProgress));
    assert!(app.notifications().any(|n| n.level == NotificationLevel::Error));

    // The next snapshot is authoritative and reverts it.
    app.apply_board_snapshot(pre_move.as_ref());
    assert_eq!(app.board().locate(&TaskId::new("t1")), Some(ColumnId::Todo));
    assert_eq!(column_ids(&app, ColumnId::Todo), vec!["t1", "t2"]);
}

#[tokio::test]
async fn remote_deletion_closes_the_open_detail() {
    let store = Arc::new(MemoryStore::with_root(document()));
    let (mut app, _tx, mut rx) = connected(&store, &ClientConfig::default()).await;

    app.handle_key_event(key(KeyCode::Enter));
    assert_eq!(app.detail().task_id(), Some(&TaskId::new("t1")));

    store.write("board/todo/t1", Value::Null).await.unwrap();
    app.handle_sync_event(next_event(&mut rx).await);

    assert!(!app.detail().is_open());
    assert_eq!(column_ids(&app, ColumnId::Todo), vec!["t2"]);
}

#[tokio::test]
async fn subtask_toggle_is_written_through() {
    let store = Arc::new(MemoryStore::with_root(document()));
    let (mut app, tx, mut rx) = connected(&store, &ClientConfig::default()).await;

    for _ in 0..3 {
        app.handle_key_event(key(KeyCode::Right));
    }
    app.handle_key_event(key(KeyCode::Enter));
    let command = app.handle_key_event(key(KeyCode::Char('2'))).unwrap();
    tx.send(command).await.unwrap();
    app.handle_sync_event(next_event(&mut rx).await);

    assert_eq!(
        store.value_at("board/done/d1/subtasks"),
        Some(json!([{"text": "a", "done": false}, {"text": "b", "done": true}]))
    );
    let task = app.board().task(&TaskId::new("d1")).unwrap();
    assert_eq!(task.subtasks_done(), 1);
}

#[tokio::test]
async fn contact_changes_reresolve_assignees() {
    let store = Arc::new(MemoryStore::with_root(json!({
        "board": {"todo": {"t1": {"order": 0, "assignees": "Ben Braun"}}},
        "contacts": {"c1": {"name": "Anna Muster"}}
    })));
    let (mut app, _tx, mut rx) = connected(&store, &ClientConfig::default()).await;
    let task = app.board().task(&TaskId::new("t1")).unwrap().clone();
    assert!(kanban::contacts::resolve(task.assignees.raw(), app.directory()).is_empty());

    store
        .write("contacts/c2", json!({"name": "Ben Braun"}))
        .await
        .unwrap();
    app.handle_sync_event(next_event(&mut rx).await);
    assert_eq!(
        kanban::contacts::resolve(task.assignees.raw(), app.directory()),
        vec!["c2"]
    );
}

#[tokio::test]
async fn configured_board_path_prefixes_every_write() {
    let store = Arc::new(MemoryStore::with_root(json!({
        "team": {"board": {"todo": {"t1": {"order": 0, "title": "One"}}}}
    })));
    let config = ClientConfig {
        board_path: "team/board".into(),
        ..ClientConfig::default()
    };
    let (mut app, tx, mut rx) = connected(&store, &config).await;
    assert_eq!(app.board().len(), 1);

    let command = app.handle_key_event(key(KeyCode::Char('L'))).unwrap();
    assert!(matches!(&command, SyncCommand::Patch { prefix, .. } if prefix == "team/board"));
    tx.send(command).await.unwrap();
    app.handle_sync_event(next_event(&mut rx).await);
    assert!(store.value_at("team/board/inprogress/t1").is_some());
}

#[tokio::test]
async fn invalid_paths_are_reported_not_panicked() {
    let store = Arc::new(MemoryStore::new());
    let (tx, mut rx) = spawn_sync(Arc::clone(&store), SyncConfig::default())
        .await
        .unwrap();
    next_event(&mut rx).await;
    next_event(&mut rx).await;

    let mut updates = Patch::new();
    updates.insert("todo/t#1/order".into(), Some(json!(0)));
    tx.send(SyncCommand::Patch {
        prefix: "board".into(),
        updates,
    })
    .await
    .unwrap();
    assert!(matches!(
        next_event(&mut rx).await,
        SyncEvent::WriteFailed { error: PersistenceError::InvalidPath(_), .. }
    ));
}

#[tokio::test]
async fn move_writes_back_the_stored_record() {
    let record = json!({
        "title": "X",
        "createdAt": "2026-03-10T09:00:00Z",
        "createdBy": "u7",
        "dueDate": "31.12.2026",
        "order": 3
    });
    let store = Arc::new(MemoryStore::with_root(json!({"board": {"todo": {"t1": record}}})));
    let (mut app, tx, mut rx) = connected(&store, &ClientConfig::default()).await;

    let command = app.handle_key_event(key(KeyCode::Char('L'))).unwrap();
    tx.send(command).await.unwrap();
    app.handle_sync_event(next_event(&mut rx).await);

    let mut expected = record;
    expected["order"] = json!(0);
    assert_eq!(store.value_at("board/inprogress/t1"), Some(expected));
    assert!(store.value_at("board/todo").is_none());
}

#[tokio::test]
async fn unrecognized_column_keys_are_left_alone() {
    let store = Arc::new(MemoryStore::with_root(json!({
        "board": {
            "in-progress": {"x1": {"title": "Legacy", "order": 0}},
            "todo": {"t1": {"title": "One", "order": 0}}
        }
    })));
    let (mut app, tx, mut rx) = connected(&store, &ClientConfig::default()).await;
    assert_eq!(app.board().len(), 1);
    assert_eq!(app.board().locate(&TaskId::new("x1")), None);

    let command = app.handle_key_event(key(KeyCode::Char('L'))).unwrap();
    tx.send(command).await.unwrap();
    let SyncEvent::BoardSnapshot(snapshot) = next_event(&mut rx).await else {
        panic!("expected a board snapshot");
    };
    app.apply_board_snapshot(snapshot.as_ref());

    assert_eq!(app.board().len(), 1);
    assert_eq!(column_ids(&app, ColumnId::InProgress), vec!["t1"]);
    assert_eq!(
        store.value_at("board/in-progress/x1"),
        Some(json!({"title": "Legacy", "order": 0}))
    );
}
