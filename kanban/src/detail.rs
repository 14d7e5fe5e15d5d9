//! Task detail overlay and subtask state machine.
//!
//! ```text
//! Closed ──open──▶ Open ──begin_edit──▶ Editing ──save / cancel_edit──▶ Open ──close──▶ Closed
//! ```
//!
//! The overlay state is the single source of truth for what the detail
//! view shows; rendering is a projection of it. While `Editing`, the
//! [`TaskDraft`] is a working copy separate from the store's record until
//! it is saved.

use chrono::NaiveDate;
use kanban_proto::contact::Contact;
use kanban_proto::snapshot::{subtasks_key, task_key};
use kanban_proto::task::{Assignees, Priority, Subtask, Task, TaskId};
use serde_json::{Value, json};
use thiserror::Error;

use crate::board::BoardStore;
use crate::contacts::{Directory, resolve, resolve_contacts, resolve_text};

/// Errors from detail operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DetailError {
    /// No task is open.
    #[error("no task is open")]
    NotOpen,
    /// The operation needs the editor.
    #[error("the task is not being edited")]
    NotEditing,
    /// Subtasks cannot be toggled directly while editing.
    #[error("finish editing before toggling subtasks")]
    Editing,
    /// The task disappeared from the board.
    #[error("task no longer exists: {0}")]
    TaskMissing(TaskId),
    /// The due date precedes the creation date.
    #[error("due date {due} is before the creation date {created}")]
    DueBeforeCreation {
        /// Requested due date.
        due: NaiveDate,
        /// Day the task was created.
        created: NaiveDate,
    },
    /// The title is blank.
    #[error("task title cannot be empty")]
    TitleEmpty,
    /// The title is over the limit.
    #[error("task title too long (max {max} characters)")]
    TitleTooLong {
        /// Allowed number of characters.
        max: usize,
    },
    /// The due date text is not a date.
    #[error("invalid due date {0:?}, expected YYYY-MM-DD")]
    InvalidDueDate(String),
    /// No subtask at this index.
    #[error("no subtask at position {0}")]
    SubtaskOutOfRange(usize),
}

/// A whole-value write produced by the overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskWrite {
    /// Path relative to the board root.
    pub path: String,
    /// New value.
    pub value: Value,
}

/// Editable working copy of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Due date.
    pub due_date: Option<NaiveDate>,
    /// Priority.
    pub priority: Priority,
    /// Canonical contact ids.
    pub assignees: Vec<String>,
    /// Checklist.
    pub subtasks: Vec<Subtask>,
}

impl TaskDraft {
    /// Copies the editable fields of a task, resolving its assignees.
    #[must_use]
    pub fn from_task(task: &Task, directory: &Directory) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: task.due_date,
            priority: task.priority,
            assignees: resolve(task.assignees.raw(), directory),
            subtasks: task.subtasks.clone(),
        }
    }

    /// Parses a `YYYY-MM-DD` due date. Blank text clears it.
    ///
    /// # Errors
    ///
    /// Returns [`DetailError::InvalidDueDate`] if the text is not a date;
    /// the draft is left unchanged.
    pub fn set_due_date_text(&mut self, text: &str) -> Result<(), DetailError> {
        let text = text.trim();
        if text.is_empty() {
            self.due_date = None;
            return Ok(());
        }
        self.due_date = Some(
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .map_err(|_| DetailError::InvalidDueDate(text.to_string()))?,
        );
        Ok(())
    }

    /// Replaces the assignees with whatever the text resolves to.
    /// Unknown names are dropped.
    pub fn set_assignee_text(&mut self, text: &str, directory: &Directory) {
        self.assignees = resolve_text(text, directory);
    }

    /// Assignees as editable text (display names, comma separated).
    #[must_use]
    pub fn assignee_text(&self, directory: &Directory) -> String {
        self.assignees
            .iter()
            .filter_map(|id| directory.contact(id))
            .map(|c| if c.name.is_empty() { c.id.as_str() } else { c.name.as_str() })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Appends an open subtask. Blank text is ignored.
    pub fn add_subtask(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        self.subtasks.push(Subtask::new(text));
        true
    }

    /// Removes a subtask.
    ///
    /// # Errors
    ///
    /// Returns [`DetailError::SubtaskOutOfRange`] for a bad index.
    pub fn remove_subtask(&mut self, index: usize) -> Result<Subtask, DetailError> {
        if index >= self.subtasks.len() {
            return Err(DetailError::SubtaskOutOfRange(index));
        }
        Ok(self.subtasks.remove(index))
    }

    /// Flips a subtask in the draft.
    ///
    /// # Errors
    ///
    /// Returns [`DetailError::SubtaskOutOfRange`] for a bad index.
    pub fn toggle_subtask(&mut self, index: usize) -> Result<(), DetailError> {
        let subtask = self
            .subtasks
            .get_mut(index)
            .ok_or(DetailError::SubtaskOutOfRange(index))?;
        subtask.done = !subtask.done;
        Ok(())
    }

    /// Moves to the next priority.
    pub const fn cycle_priority(&mut self) {
        self.priority = self.priority.cycle();
    }

    fn validate(&self, task: &Task, max_title_len: usize) -> Result<(), DetailError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(DetailError::TitleEmpty);
        }
        if title.chars().count() > max_title_len {
            return Err(DetailError::TitleTooLong { max: max_title_len });
        }
        if let (Some(due), Some(created)) = (self.due_date, task.created_at) {
            let created = created.date_naive();
            if due < created {
                return Err(DetailError::DueBeforeCreation { due, created });
            }
        }
        Ok(())
    }

    fn apply_to(&self, task: &Task) -> Task {
        let mut updated = task.clone();
        updated.title = self.title.trim().to_string();
        updated.description.clone_from(&self.description);
        updated.due_date = self.due_date;
        updated.priority = self.priority;
        updated.assignees = Assignees::from_ids(self.assignees.iter().cloned());
        updated.subtasks.clone_from(&self.subtasks);
        updated
    }
}

/// Overlay state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DetailState {
    /// Nothing shown.
    #[default]
    Closed,
    /// A task is shown read-only.
    Open {
        /// Shown task.
        task_id: TaskId,
    },
    /// A task is being edited.
    Editing {
        /// Edited task.
        task_id: TaskId,
        /// Working copy.
        draft: TaskDraft,
    },
}

/// Everything the detail view renders.
#[derive(Debug)]
pub struct DetailView<'a> {
    /// The store's record.
    pub task: &'a Task,
    /// Resolved assignees.
    pub assignees: Vec<&'a Contact>,
    /// The working copy, while editing.
    pub draft: Option<&'a TaskDraft>,
}

/// The task detail overlay.
#[derive(Debug, Clone, Default)]
pub struct DetailOverlay {
    state: DetailState,
}

impl DetailOverlay {
    /// Creates a closed overlay.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &DetailState {
        &self.state
    }

    /// Whether the overlay is shown.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        !matches!(self.state, DetailState::Closed)
    }

    /// Whether the editor is active.
    #[must_use]
    pub const fn is_editing(&self) -> bool {
        matches!(self.state, DetailState::Editing { .. })
    }

    /// The shown task id.
    #[must_use]
    pub const fn task_id(&self) -> Option<&TaskId> {
        match &self.state {
            DetailState::Closed => None,
            DetailState::Open { task_id } | DetailState::Editing { task_id, .. } => Some(task_id),
        }
    }

    /// Opens a task. Any edit in progress is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`DetailError::TaskMissing`] if the board has no such task.
    pub fn open(&mut self, task_id: TaskId, store: &BoardStore) -> Result<(), DetailError> {
        if store.task(&task_id).is_none() {
            return Err(DetailError::TaskMissing(task_id));
        }
        tracing::debug!(task = %task_id, "detail opened");
        self.state = DetailState::Open { task_id };
        Ok(())
    }

    /// Projects the overlay for rendering.
    #[must_use]
    pub fn view<'a>(&'a self, store: &'a BoardStore, directory: &'a Directory) -> Option<DetailView<'a>> {
        let task = store.task(self.task_id()?)?;
        let draft = match &self.state {
            DetailState::Editing { draft, .. } => Some(draft),
            _ => None,
        };
        Some(DetailView {
            task,
            assignees: resolve_contacts(task.assignees.raw(), directory),
            draft,
        })
    }

    /// Enters the editor with a fresh working copy. Already editing is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// [`DetailError::NotOpen`] when closed, [`DetailError::TaskMissing`]
    /// when the task vanished.
    pub fn begin_edit(&mut self, store: &BoardStore, directory: &Directory) -> Result<(), DetailError> {
        let task_id = match &self.state {
            DetailState::Closed => return Err(DetailError::NotOpen),
            DetailState::Editing { .. } => return Ok(()),
            DetailState::Open { task_id } => task_id.clone(),
        };
        let task = store
            .task(&task_id)
            .ok_or_else(|| DetailError::TaskMissing(task_id.clone()))?;
        let draft = TaskDraft::from_task(task, directory);
        self.state = DetailState::Editing { task_id, draft };
        Ok(())
    }

    /// The working copy.
    #[must_use]
    pub const fn draft(&self) -> Option<&TaskDraft> {
        match &self.state {
            DetailState::Editing { draft, .. } => Some(draft),
            _ => None,
        }
    }

    /// The working copy, mutably.
    pub const fn draft_mut(&mut self) -> Option<&mut TaskDraft> {
        match &mut self.state {
            DetailState::Editing { draft, .. } => Some(draft),
            _ => None,
        }
    }

    /// Validates and saves the working copy.
    ///
    /// On success the store's record is replaced, the overlay returns to
    /// `Open` and the returned write carries the whole task. On failure
    /// nothing changes and the editor stays active.
    ///
    /// # Errors
    ///
    /// [`DetailError::NotEditing`], [`DetailError::TaskMissing`] or a
    /// validation error.
    pub fn save(&mut self, store: &mut BoardStore, max_title_len: usize) -> Result<TaskWrite, DetailError> {
        let DetailState::Editing { task_id, draft } = &self.state else {
            return Err(DetailError::NotEditing);
        };
        let task = store
            .task(task_id)
            .ok_or_else(|| DetailError::TaskMissing(task_id.clone()))?;
        draft.validate(task, max_title_len)?;

        let updated = draft.apply_to(task);
        let write = TaskWrite {
            path: task_key(updated.column, &updated.id),
            value: updated.to_wire(),
        };
        tracing::debug!(task = %updated.id, "detail saved");
        self.state = DetailState::Open {
            task_id: updated.id.clone(),
        };
        store.replace_task(updated);
        Ok(write)
    }

    /// Leaves the editor, discarding the working copy.
    pub fn cancel_edit(&mut self) {
        if let DetailState::Editing { task_id, .. } = &self.state {
            self.state = DetailState::Open {
                task_id: task_id.clone(),
            };
        }
    }

    /// Closes the overlay.
    pub fn close(&mut self) {
        self.state = DetailState::Closed;
    }

    /// Flips a subtask of the open task and writes the subtask list.
    ///
    /// # Errors
    ///
    /// [`DetailError::NotOpen`] when closed, [`DetailError::Editing`] in
    /// the editor, [`DetailError::TaskMissing`] or
    /// [`DetailError::SubtaskOutOfRange`].
    pub fn toggle_subtask(&self, index: usize, store: &mut BoardStore) -> Result<TaskWrite, DetailError> {
        let task_id = match &self.state {
            DetailState::Closed => return Err(DetailError::NotOpen),
            DetailState::Editing { .. } => return Err(DetailError::Editing),
            DetailState::Open { task_id } => task_id,
        };
        let mut task = store
            .task(task_id)
            .cloned()
            .ok_or_else(|| DetailError::TaskMissing(task_id.clone()))?;
        let subtask = task
            .subtasks
            .get_mut(index)
            .ok_or(DetailError::SubtaskOutOfRange(index))?;
        subtask.done = !subtask.done;

        let write = TaskWrite {
            path: subtasks_key(task.column, &task.id),
            value: Value::Array(
                task.subtasks
                    .iter()
                    .map(|s| json!({"text": s.text, "done": s.done}))
                    .collect(),
            ),
        };
        store.replace_task(task);
        Ok(write)
    }

    /// Closes the overlay if its task disappeared from the board.
    /// Returns `true` if it did.
    pub fn reconcile(&mut self, store: &BoardStore) -> bool {
        let gone = self.task_id().is_some_and(|id| store.task(id).is_none());
        if gone {
            tracing::debug!("detail closed, task removed remotely");
            self.state = DetailState::Closed;
        }
        gone
    }
}
