//! Persistence collaborator abstraction.
//!
//! The board core never talks to a database directly. It consumes a
//! [`Persistence`] implementation that exposes a JSON tree addressed by
//! slash-separated paths:
//!
//! - [`Persistence::subscribe`]: push stream of snapshots of a subtree
//! - [`Persistence::write`]: whole-value set (`null` deletes)
//! - [`Persistence::patch`]: atomic multi-key update under a prefix
//! - [`Persistence::append`]: store under a freshly generated child key
//!
//! [`memory::MemoryStore`] is the in-process implementation used by the
//! binary and the tests.

pub mod memory;

use kanban_proto::snapshot::Patch;
use serde_json::Value;
use tokio::sync::mpsc;

pub use memory::MemoryStore;

/// Characters a path segment may not contain.
const FORBIDDEN_CHARS: [char; 5] = ['.', '#', '$', '[', ']'];

/// Errors reported by a persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PersistenceError {
    /// The path is empty where a key is required, has an empty segment or
    /// a forbidden character.
    #[error("invalid path: {0:?}")]
    InvalidPath(String),

    /// The store refused the operation.
    #[error("write to {path} rejected: {reason}")]
    Rejected {
        /// Path of the refused operation.
        path: String,
        /// Why it was refused.
        reason: String,
    },

    /// The store is gone.
    #[error("persistence closed")]
    Closed,
}

/// An ordered stream of snapshots of one subtree.
///
/// The first item is the value at subscription time. `None` items mean
/// the subtree is empty.
#[derive(Debug)]
pub struct Subscription {
    path: String,
    rx: mpsc::UnboundedReceiver<Option<Value>>,
}

impl Subscription {
    /// Wraps a channel fed by a persistence implementation.
    #[must_use]
    pub const fn new(path: String, rx: mpsc::UnboundedReceiver<Option<Value>>) -> Self {
        Self { path, rx }
    }

    /// Subscribed path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Waits for the next snapshot. Returns `None` once the store closed
    /// the stream.
    pub async fn next(&mut self) -> Option<Option<Value>> {
        self.rx.recv().await
    }

    /// Takes an already delivered snapshot without waiting.
    pub fn try_next(&mut self) -> Option<Option<Value>> {
        self.rx.try_recv().ok()
    }
}

/// Async access to the remote JSON tree.
pub trait Persistence: Send + Sync {
    /// Subscribes to a subtree.
    fn subscribe(
        &self,
        path: &str,
    ) -> impl std::future::Future<Output = Result<Subscription, PersistenceError>> + Send;

    /// Replaces the value at `path`. `Value::Null` deletes it.
    fn write(
        &self,
        path: &str,
        value: Value,
    ) -> impl std::future::Future<Output = Result<(), PersistenceError>> + Send;

    /// Applies every update relative to `prefix` in one atomic step.
    /// Keys may span several segments; `None` deletes.
    fn patch(
        &self,
        prefix: &str,
        updates: Patch,
    ) -> impl std::future::Future<Output = Result<(), PersistenceError>> + Send;

    /// Stores `value` under a new child of `path` and returns its key.
    fn append(
        &self,
        path: &str,
        value: Value,
    ) -> impl std::future::Future<Output = Result<String, PersistenceError>> + Send;
}

/// Splits a slash-separated path into segments.
///
/// Leading and trailing slashes are ignored, so `""` and `"/"` are the
/// root (no segments).
///
/// # Errors
///
/// Returns [`PersistenceError::InvalidPath`] on an empty segment or a
/// forbidden character.
pub fn split_path(path: &str) -> Result<Vec<String>, PersistenceError> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    trimmed
        .split('/')
        .map(|segment| {
            if segment.is_empty() || segment.contains(FORBIDDEN_CHARS) {
                Err(PersistenceError::InvalidPath(path.to_string()))
            } else {
                Ok(segment.to_string())
            }
        })
        .collect()
}
