use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Completion filter applied to a task list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    /// Every task.
    #[default]
    All,
    /// Tasks not yet completed.
    Pending,
    /// Completed tasks.
    Completed,
}

impl StatusFilter {
    /// Every filter, in display order.
    pub const ALL: [Self; 3] = [Self::All, Self::Pending, Self::Completed];

    /// String representation used on the command line and in config files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    /// Whether a task with the given completion flag passes this filter.
    #[must_use]
    pub const fn admits(self, completed: bool) -> bool {
        match self {
            Self::All => true,
            Self::Pending => !completed,
            Self::Completed => completed,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a status token is not one of `all`, `pending`, `completed`.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown status filter '{0}' (expected all, pending or completed)")]
pub struct ParseStatusError(pub String);

impl FromStr for StatusFilter {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|filter| filter.as_str() == token)
            .ok_or_else(|| ParseStatusError(s.to_owned()))
    }
}
