use thiserror::Error;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

/// Calendar layout of a stored due date.
pub const DUE_DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Reasons a task draft is refused before any call is attempted.
#[derive(Debug, Error)]
pub enum DraftError {
    /// Title was empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,
    /// Due date missing or not `YYYY-MM-DD`.
    #[error("invalid due date '{input}': {source}")]
    InvalidDueDate {
        /// Raw user input.
        input: String,
        /// Parser failure.
        #[source]
        source: time::error::Parse,
    },
}

/// Validated input for a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    title: String,
    due_date: Date,
}

impl TaskDraft {
    /// Validate raw title and due date strings.
    ///
    /// # Errors
    /// Returns [`DraftError`] when the title is blank or the date does not parse.
    pub fn parse(title: &str, due_date: &str) -> Result<Self, DraftError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(DraftError::EmptyTitle);
        }
        let input = due_date.trim();
        let due_date = Date::parse(input, DUE_DATE_FORMAT).map_err(|source| DraftError::InvalidDueDate {
            input: input.to_owned(),
            source,
        })?;
        Ok(Self {
            title: title.to_owned(),
            due_date,
        })
    }

    /// Trimmed title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Parsed due date.
    #[must_use]
    pub const fn due_date(&self) -> Date {
        self.due_date
    }

    /// Due date in its stored `YYYY-MM-DD` form.
    #[must_use]
    pub fn due_date_string(&self) -> String {
        // Formatting a plain calendar date with this layout cannot fail.
        self.due_date
            .format(DUE_DATE_FORMAT)
            .unwrap_or_else(|_| self.due_date.to_string())
    }
}
