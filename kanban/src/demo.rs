//! Demo data for running the board without a remote store.

use std::path::Path;

use kanban_proto::decode_document;
use kanban_proto::snapshot::{BOARD_ROOT, CONTACTS_ROOT};
use serde_json::{Value, json};

use crate::config::ConfigError;
use crate::persistence::{Persistence, PersistenceError};

/// A small board exercising every stored assignee shape.
#[must_use]
pub fn demo_document() -> Value {
    json!({
        "contacts": {
            "c1": {"name": "Anna Muster", "email": "anna@example.com", "initials": "AM", "color": "#ff7a00"},
            "c2": {"name": "Ben Braun", "email": "ben@example.com", "initials": "BB", "color": "#9327ff"},
            "c3": {"name": "Cleo Stein", "email": "cleo@example.com", "initials": "CS", "color": "#00bee8"},
            "c4": {"name": "Dario Lenz", "email": "dario@example.com"}
        },
        "board": {
            "todo": {
                "t1": {
                    "title": "Draft onboarding guide",
                    "description": "Cover setup, first task and review flow.",
                    "category": "Docs",
                    "categoryColor": "#1fd7c1",
                    "priority": "medium",
                    "order": 0,
                    "dueDate": "2026-11-20",
                    "createdAt": "2026-10-01T08:00:00Z",
                    "assignees": "Anna Muster, ben@example.com",
                    "subtasks": [{"text": "Outline", "done": true}, {"text": "First draft", "done": false}]
                },
                "t2": {
                    "title": "Fix login timeout",
                    "category": "Bug",
                    "categoryColor": "#ff3d00",
                    "priority": "urgent",
                    "order": 1,
                    "createdAt": 1_790_000_000_000_i64,
                    "assignees": ["c3"]
                }
            },
            "inprogress": {
                "p1": {
                    "title": "Board drag and drop",
                    "description": "Pointer and touch reordering.",
                    "category": "Feature",
                    "categoryColor": "#0038ff",
                    "priority": "urgent",
                    "order": 0,
                    "assignees": [{"id": "c2"}, {"email": "cleo@example.com"}],
                    "subtasks": ["Pointer", "Touch", "Auto-scroll"]
                }
            },
            "awaiting": {
                "a1": {
                    "title": "Legal review of terms",
                    "category": "Ops",
                    "priority": "low",
                    "order": 0,
                    "assignees": {"name": "Dario Lenz"}
                }
            },
            "done": {
                "d1": {
                    "title": "Project kickoff",
                    "category": "Ops",
                    "priority": "medium",
                    "order": 0,
                    "assignees": "c1, c2, c3, c4",
                    "subtasks": {"0": {"text": "Agenda", "done": true}, "1": {"text": "Notes", "done": true}}
                }
            }
        }
    })
}

/// Reads a seed document from disk.
///
/// # Errors
///
/// [`ConfigError::ReadSeed`] if the file cannot be read,
/// [`ConfigError::ParseSeed`] if it is not JSON.
pub fn load_seed(path: &Path) -> Result<Value, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadSeed {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(decode_document(&text)?)
}

/// Writes the `board` and `contacts` subtrees of a seed document to their
/// configured paths. Missing subtrees are left alone.
///
/// # Errors
///
/// Returns the collaborator's error if a write fails.
pub async fn seed_store<P: Persistence>(
    store: &P,
    document: &Value,
    board_path: &str,
    contacts_path: &str,
) -> Result<(), PersistenceError> {
    for (key, path) in [(BOARD_ROOT, board_path), (CONTACTS_ROOT, contacts_path)] {
        if let Some(subtree) = document.get(key) {
            store.write(path, subtree.clone()).await?;
        }
    }
    tracing::info!(board_path, contacts_path, "store seeded");
    Ok(())
}
