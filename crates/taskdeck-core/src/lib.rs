//! Domain types for taskdeck: tasks, their identifiers and completion filters.

/// Session credential record.
pub mod auth;
/// Validated task input.
pub mod draft;
/// Identifier types.
pub mod id;
/// Completion filters.
pub mod state;

pub use auth::Credentials;
pub use draft::{DUE_DATE_FORMAT, DraftError, TaskDraft};
pub use id::TaskId;
pub use state::{ParseStatusError, StatusFilter};

use serde::{Deserialize, Serialize};

/// A single entry of the task list, in its stored shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique token within the list.
    pub id: TaskId,
    /// Display title.
    pub title: String,
    /// Due date as `YYYY-MM-DD`.
    pub due_date: String,
    /// Completion flag.
    pub completed: bool,
}

impl Task {
    /// Create a pending task with a fresh identifier.
    pub fn new(title: impl Into<String>, due_date: impl Into<String>) -> Self {
        Self {
            id: TaskId::new(),
            title: title.into(),
            due_date: due_date.into(),
            completed: false,
        }
    }
}

/// Tasks admitted by `status`, in list order.
#[must_use]
pub fn filter_by_status(tasks: &[Task], status: StatusFilter) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| status.admits(task.completed))
        .cloned()
        .collect()
}

/// Serialize a task list into its stored JSON array form.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn encode_tasks(tasks: &[Task]) -> serde_json::Result<String> {
    serde_json::to_string(tasks)
}

/// Parse a stored JSON array back into a task list.
///
/// # Errors
/// Returns an error when `raw` is not a JSON array of task records.
pub fn decode_tasks(raw: &str) -> serde_json::Result<Vec<Task>> {
    serde_json::from_str(raw)
}
