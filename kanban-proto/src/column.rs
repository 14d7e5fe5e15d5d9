//! The fixed set of board columns.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtoError;

/// One of the four kanban stages a task can occupy.
///
/// The set is closed. Variants are declared in display order, so the
/// derived `Ord` sorts columns left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ColumnId {
    /// Not started.
    #[serde(rename = "todo")]
    Todo,
    /// Actively being worked on.
    #[serde(rename = "inprogress")]
    InProgress,
    /// Waiting for someone else's feedback.
    #[serde(rename = "awaiting")]
    Awaiting,
    /// Finished.
    #[serde(rename = "done")]
    Done,
}

impl ColumnId {
    /// All columns in display order.
    pub const ALL: [Self; 4] = [Self::Todo, Self::InProgress, Self::Awaiting, Self::Done];

    /// The key used for this column in the remote store.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "inprogress",
            Self::Awaiting => "awaiting",
            Self::Done => "done",
        }
    }

    /// Human-readable column heading.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Todo => "To do",
            Self::InProgress => "In progress",
            Self::Awaiting => "Awaiting feedback",
            Self::Done => "Done",
        }
    }

    /// Zero-based position of the column on the board.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Todo => 0,
            Self::InProgress => 1,
            Self::Awaiting => 2,
            Self::Done => 3,
        }
    }

    /// The column to the left, if any.
    #[must_use]
    pub const fn prev(self) -> Option<Self> {
        match self {
            Self::Todo => None,
            Self::InProgress => Some(Self::Todo),
            Self::Awaiting => Some(Self::InProgress),
            Self::Done => Some(Self::Awaiting),
        }
    }

    /// The column to the right, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Todo => Some(Self::InProgress),
            Self::InProgress => Some(Self::Awaiting),
            Self::Awaiting => Some(Self::Done),
            Self::Done => None,
        }
    }

    /// Parses a stored column key. Only the exact keys written by
    /// [`ColumnId::as_str`] are accepted, so every parsed task can be
    /// addressed again under the key it was read from.
    #[must_use]
    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|column| column.as_str() == key)
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnId {
    type Err = ProtoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ProtoError::UnknownColumn(s.to_string()))
    }
}
