use taskdeck_store::StoreError;
use thiserror::Error;

use crate::api::ApiError;

/// Result alias for application operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Errors surfaced by [`crate::AuthSession`], [`crate::TaskStore`] and [`crate::AppContext`].
#[derive(Debug, Error)]
pub enum AppError {
    /// The remote call failed or was rate limited.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Login attempted with an empty identifier or secret.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// A container was requested from a context that was built without it.
    #[error("{0} accessed without an active session")]
    NoActiveSession(&'static str),

    /// Durable storage failed.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// A value could not be serialized for storage or transport.
    #[error("failed to encode {what}: {source}")]
    Encode {
        /// What was being encoded.
        what: &'static str,
        /// Serializer failure.
        #[source]
        source: serde_json::Error,
    },
}

impl AppError {
    /// The failure was a rate-limit rejection.
    #[must_use]
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Api(ApiError::RateLimitExceeded { .. }))
    }

    pub(crate) fn encode(what: &'static str) -> impl FnOnce(serde_json::Error) -> Self {
        move |source| Self::Encode { what, source }
    }
}
