//! Task wire types for the kanban board.
//!
//! A task is stored remotely as `board/{column}/{taskId}` with the id and
//! column implied by its path. [`Task::from_wire`] re-derives the local
//! record from that pair and tolerates every historical field shape.
//! The record itself is kept alongside, and [`Task::to_wire`] writes it
//! back with only the fields this client changed replaced, so unknown
//! fields and their original shapes survive.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::column::ColumnId;

/// Maximum allowed task title length in characters.
pub const MAX_TASK_TITLE_LENGTH: usize = 256;

/// Order assigned to a task whose record carries no usable `order` field.
///
/// Such tasks sort after every ordered task in their column.
pub const ORDER_UNSET: i64 = i64::MAX;

/// Identifier of a task, assigned by the remote store.
///
/// Stable across column moves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Creates a task identifier from its string form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string form of this identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Needs attention first.
    Urgent,
    /// The default.
    #[default]
    Medium,
    /// Can wait.
    Low,
}

impl Priority {
    /// All priorities from most to least pressing.
    pub const ALL: [Self; 3] = [Self::Urgent, Self::Medium, Self::Low];

    /// Parses a priority case-insensitively. Unknown values map to
    /// [`Priority::Medium`].
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "urgent" | "high" => Self::Urgent,
            "low" => Self::Low,
            _ => Self::Medium,
        }
    }

    /// Wire spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Next priority in the editing cycle (urgent → medium → low → urgent).
    #[must_use]
    pub const fn cycle(self) -> Self {
        match self {
            Self::Urgent => Self::Medium,
            Self::Medium => Self::Low,
            Self::Low => Self::Urgent,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A checklist entry inside a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    /// What needs doing.
    pub text: String,
    /// Whether it has been done.
    pub done: bool,
}

impl Subtask {
    /// Creates an open subtask.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            done: false,
        }
    }

    /// Parses a subtask from either a bare string or an object with
    /// `text` (or `title`) and `done`.
    #[must_use]
    pub fn from_wire(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => Some(Self::new(text.clone())),
            Value::Object(obj) => {
                let text = obj
                    .get("text")
                    .or_else(|| obj.get("title"))
                    .and_then(Value::as_str)?
                    .to_string();
                let done = obj.get("done").and_then(Value::as_bool).unwrap_or(false);
                Some(Self { text, done })
            }
            _ => None,
        }
    }
}

/// The assignee field exactly as it was stored.
///
/// Historically this field held free-text names, emails, contact ids,
/// comma-separated lists or contact snapshots. It is kept verbatim so it
/// can be resolved against whatever the contact directory currently holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Assignees(Value);

impl Assignees {
    /// Wraps a raw stored value.
    #[must_use]
    pub const fn from_raw(value: Value) -> Self {
        Self(value)
    }

    /// Builds the canonical form: an array of contact ids.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(Value::Array(
            ids.into_iter().map(|id| Value::String(id.into())).collect(),
        ))
    }

    /// The stored value.
    #[must_use]
    pub const fn raw(&self) -> &Value {
        &self.0
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::Object(obj) => obj.is_empty(),
            Value::Bool(_) | Value::Number(_) => false,
        }
    }
}

/// A task as held by the board.
///
/// Equality compares the modeled fields only, not the stored record.
#[derive(Debug, Clone)]
pub struct Task {
    /// Store-assigned identifier.
    pub id: TaskId,
    /// Column the task currently lives in.
    pub column: ColumnId,
    /// Position key within the column.
    pub order: i64,
    /// Short title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Optional due date.
    pub due_date: Option<NaiveDate>,
    /// Category label.
    pub category: String,
    /// Category color, as stored (usually a CSS hex string).
    pub category_color: String,
    /// Priority.
    pub priority: Priority,
    /// Assignee references, verbatim.
    pub assignees: Assignees,
    /// Checklist.
    pub subtasks: Vec<Subtask>,
    /// When the task was created.
    pub created_at: Option<DateTime<Utc>>,
    /// The record this task was read from, if any.
    stored: Option<Map<String, Value>>,
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.column == other.column
            && self.order == other.order
            && self.title == other.title
            && self.description == other.description
            && self.due_date == other.due_date
            && self.category == other.category
            && self.category_color == other.category_color
            && self.priority == other.priority
            && self.assignees == other.assignees
            && self.subtasks == other.subtasks
            && self.created_at == other.created_at
    }
}

impl Eq for Task {}

/// Canonical wire shape of a task (id and column live in the path).
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireTask<'a> {
    title: &'a str,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    due_date: Option<NaiveDate>,
    category: &'a str,
    category_color: &'a str,
    priority: Priority,
    order: i64,
    assignees: &'a Assignees,
    subtasks: &'a [Subtask],
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<i64>,
}

impl Task {
    /// Creates an empty task in the given column.
    pub fn new(id: impl Into<String>, column: ColumnId, order: i64) -> Self {
        Self {
            id: TaskId::new(id),
            column,
            order,
            title: String::new(),
            description: String::new(),
            due_date: None,
            category: String::new(),
            category_color: String::new(),
            priority: Priority::default(),
            assignees: Assignees::default(),
            subtasks: Vec::new(),
            created_at: None,
            stored: None,
        }
    }

    /// Re-derives a task from its stored record, injecting the id and
    /// column implied by the record's path.
    ///
    /// Returns `None` only when the record is not an object.
    #[must_use]
    pub fn from_wire(id: &str, column: ColumnId, value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            stored: Some(obj.clone()),
            ..Self::from_fields(id, column, obj)
        })
    }

    fn from_fields(id: &str, column: ColumnId, obj: &Map<String, Value>) -> Self {
        Self {
            id: TaskId::new(id),
            column,
            order: obj.get("order").and_then(parse_order).unwrap_or(ORDER_UNSET),
            title: text_field(obj, "title"),
            description: text_field(obj, "description"),
            due_date: obj.get("dueDate").and_then(parse_date),
            category: text_field(obj, "category"),
            category_color: text_field(obj, "categoryColor"),
            priority: obj
                .get("priority")
                .and_then(Value::as_str)
                .map(Priority::parse_lenient)
                .unwrap_or_default(),
            assignees: Assignees::from_raw(obj.get("assignees").cloned().unwrap_or(Value::Null)),
            subtasks: obj.get("subtasks").map(parse_subtasks).unwrap_or_default(),
            created_at: obj.get("createdAt").and_then(parse_timestamp),
            stored: None,
        }
    }

    /// The record this task was read from, if it came from the store.
    #[must_use]
    pub const fn stored(&self) -> Option<&Map<String, Value>> {
        self.stored.as_ref()
    }

    /// Encodes the task for writing.
    ///
    /// A task read from the store yields its stored record with only the
    /// fields that differ from what was read replaced (or removed, when a
    /// field was cleared). Anything else, including fields this client
    /// does not model and values it could not parse, is written back as
    /// stored. A task with no stored record is written in canonical form.
    #[must_use]
    pub fn to_wire(&self) -> Value {
        let current = self.canonical();
        let Some(stored) = &self.stored else {
            return Value::Object(current);
        };
        let read = Self::from_fields(self.id.as_str(), self.column, stored).canonical();
        let mut record = stored.clone();
        for key in current.keys().chain(read.keys()) {
            let now = current.get(key);
            if now == read.get(key) {
                continue;
            }
            match now {
                Some(value) => record.insert(key.clone(), value.clone()),
                None => record.remove(key),
            };
        }
        Value::Object(record)
    }

    fn canonical(&self) -> Map<String, Value> {
        let wire = WireTask {
            title: &self.title,
            description: &self.description,
            due_date: self.due_date,
            category: &self.category,
            category_color: &self.category_color,
            priority: self.priority,
            order: self.order,
            assignees: &self.assignees,
            subtasks: &self.subtasks,
            created_at: self.created_at.map(|at| at.timestamp_millis()),
        };
        match serde_json::to_value(wire) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Number of finished subtasks.
    #[must_use]
    pub fn subtasks_done(&self) -> usize {
        self.subtasks.iter().filter(|s| s.done).count()
    }
}

fn text_field(obj: &Map<String, Value>, key: &str) -> String {
    match obj.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn parse_order(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_date(value: &Value) -> Option<NaiveDate> {
    let raw = value.as_str()?.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        Value::String(s) => {
            let raw = s.trim();
            DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
                .or_else(|| {
                    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                        .map(|dt| dt.and_utc())
                })
        }
        _ => None,
    }
}

fn parse_subtasks(value: &Value) -> Vec<Subtask> {
    match value {
        Value::Array(items) => items.iter().filter_map(Subtask::from_wire).collect(),
        // Index-keyed objects come from stores that turn sparse arrays into maps.
        Value::Object(obj) => {
            let mut entries: Vec<(u64, &Value)> = obj
                .iter()
                .filter_map(|(key, v)| key.parse().ok().map(|idx| (idx, v)))
                .collect();
            entries.sort_by_key(|(idx, _)| *idx);
            entries
                .into_iter()
                .filter_map(|(_, v)| Subtask::from_wire(v))
                .collect()
        }
        _ => Vec::new(),
    }
}
