//! In-process persistence backed by a JSON tree.
//!
//! Behaves like a realtime database: empty objects and `null` leaves
//! vanish, every subscriber whose path overlaps a change receives a fresh
//! snapshot of its subtree, and `append` keys sort by creation time
//! (UUID v7). Failures can be injected with [`MemoryStore::fail_next`].

use parking_lot::Mutex;
use serde_json::{Map, Value};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::{Persistence, PersistenceError, Subscription, split_path};
use kanban_proto::snapshot::Patch;

struct Subscriber {
    path: Vec<String>,
    tx: mpsc::UnboundedSender<Option<Value>>,
}

struct Inner {
    root: Value,
    subscribers: Vec<Subscriber>,
    failures: usize,
}

/// In-memory JSON tree with subscriptions.
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_root(Value::Null)
    }

    /// Creates a store holding `root`.
    #[must_use]
    pub fn with_root(mut root: Value) -> Self {
        prune(&mut root);
        Self {
            inner: Mutex::new(Inner {
                root,
                subscribers: Vec::new(),
                failures: 0,
            }),
        }
    }

    /// Makes the next `count` write, patch or append calls fail.
    pub fn fail_next(&self, count: usize) {
        self.inner.lock().failures = count;
    }

    /// Reads the value at `path`, `None` if absent or invalid.
    #[must_use]
    pub fn value_at(&self, path: &str) -> Option<Value> {
        let segments = split_path(path).ok()?;
        lookup(&self.inner.lock().root, &segments).cloned()
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        let mut inner = self.inner.lock();
        inner.subscribers.retain(|s| !s.tx.is_closed());
        inner.subscribers.len()
    }

    fn apply(&self, path: &str, changes: Vec<(Vec<String>, Value)>) -> Result<(), PersistenceError> {
        let mut inner = self.inner.lock();
        if inner.failures > 0 {
            inner.failures -= 1;
            tracing::debug!(path, "injected persistence failure");
            return Err(PersistenceError::Rejected {
                path: path.to_string(),
                reason: "injected failure".to_string(),
            });
        }

        let changed: Vec<Vec<String>> = changes.iter().map(|(segments, _)| segments.clone()).collect();
        for (segments, value) in changes {
            set_at(&mut inner.root, &segments, value);
        }
        prune(&mut inner.root);

        let Inner {
            root, subscribers, ..
        } = &mut *inner;
        subscribers.retain(|sub| {
            if !changed.iter().any(|c| overlaps(&sub.path, c)) {
                return !sub.tx.is_closed();
            }
            sub.tx.send(lookup(root, &sub.path).cloned()).is_ok()
        });
        Ok(())
    }
}

impl Persistence for MemoryStore {
    async fn subscribe(&self, path: &str) -> Result<Subscription, PersistenceError> {
        let segments = split_path(path)?;
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock();
        // The receiver is alive, so the initial send cannot fail.
        let _ = tx.send(lookup(&inner.root, &segments).cloned());
        inner.subscribers.push(Subscriber { path: segments, tx });
        drop(inner);
        Ok(Subscription::new(path.to_string(), rx))
    }

    async fn write(&self, path: &str, value: Value) -> Result<(), PersistenceError> {
        let segments = split_path(path)?;
        self.apply(path, vec![(segments, value)])
    }

    async fn patch(&self, prefix: &str, updates: Patch) -> Result<(), PersistenceError> {
        let base = split_path(prefix)?;
        let mut changes = Vec::with_capacity(updates.len());
        for (key, value) in updates {
            let mut segments = base.clone();
            let relative = split_path(&key)?;
            if relative.is_empty() {
                return Err(PersistenceError::InvalidPath(key));
            }
            segments.extend(relative);
            changes.push((segments, value.unwrap_or(Value::Null)));
        }
        self.apply(prefix, changes)
    }

    async fn append(&self, path: &str, value: Value) -> Result<String, PersistenceError> {
        let mut segments = split_path(path)?;
        let key = Uuid::now_v7().simple().to_string();
        segments.push(key.clone());
        self.apply(path, vec![(segments, value)])?;
        Ok(key)
    }
}

/// Whether one path is a prefix of the other.
fn overlaps(a: &[String], b: &[String]) -> bool {
    a.iter().zip(b).all(|(x, y)| x == y)
}

fn lookup<'a>(root: &'a Value, segments: &[String]) -> Option<&'a Value> {
    let mut node = root;
    for segment in segments {
        node = node.as_object()?.get(segment)?;
    }
    (!node.is_null()).then_some(node)
}

fn set_at(node: &mut Value, segments: &[String], value: Value) {
    let Some((head, rest)) = segments.split_first() else {
        *node = value;
        return;
    };
    if !node.is_object() {
        if value.is_null() {
            return;
        }
        *node = Value::Object(Map::new());
    }
    let Value::Object(map) = node else {
        return;
    };
    if rest.is_empty() && value.is_null() {
        map.remove(head);
    } else {
        set_at(map.entry(head.clone()).or_insert(Value::Null), rest, value);
    }
}

/// Drops `null` members and empty containers. Returns `true` if the node
/// itself ended up empty.
fn prune(node: &mut Value) -> bool {
    match node {
        Value::Object(map) => {
            map.retain(|_, child| !prune(child));
            if map.is_empty() {
                *node = Value::Null;
                return true;
            }
            false
        }
        Value::Array(items) => {
            if items.is_empty() {
                *node = Value::Null;
                return true;
            }
            false
        }
        Value::Null => true,
        Value::Bool(_) | Value::Number(_) | Value::String(_) => false,
    }
}
