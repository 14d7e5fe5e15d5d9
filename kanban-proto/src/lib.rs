//! Shared wire model for the kanban board.
//!
//! The remote store holds loosely-typed JSON. Everything in this crate
//! parses leniently: malformed entries are skipped or defaulted, never
//! rejected, so a single bad record cannot take down a whole board.

pub mod column;
pub mod contact;
pub mod snapshot;
pub mod task;

pub use column::ColumnId;
pub use contact::{Contact, RawContact};
pub use snapshot::{BOARD_ROOT, BoardSnapshot, CONTACTS_ROOT, Patch};
pub use task::{Assignees, Priority, Subtask, Task, TaskId};

/// Errors produced when decoding wire data strictly.
#[derive(Debug, thiserror::Error)]
pub enum ProtoError {
    /// A column key that is not one of the four board columns.
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    /// A document that is not valid JSON.
    #[error("invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parses a JSON document, typically a seed file holding `board` and
/// `contacts` subtrees.
///
/// # Errors
///
/// Returns [`ProtoError::Json`] if the text is not valid JSON.
pub fn decode_document(text: &str) -> Result<serde_json::Value, ProtoError> {
    Ok(serde_json::from_str(text)?)
}
