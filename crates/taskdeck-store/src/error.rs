//! Error types for taskdeck storage.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing a key/value store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// File system operation failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Store file exists but is not a JSON object of strings.
    #[error("store file {} is corrupt: {source}", path.display())]
    Corrupt {
        /// Offending file.
        path: PathBuf,
        /// Parser failure.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to serialize store contents.
    #[error("failed to encode store contents: {0}")]
    Encode(#[from] serde_json::Error),

    /// Other unclassified error.
    #[error("store error: {0}")]
    Other(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
