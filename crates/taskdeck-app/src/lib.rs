//! Application layer for taskdeck.
//!
//! This crate provides the rate-limited simulated API, the session and task
//! containers that call it, navigation, and configuration shared by the CLI.

pub mod api;
/// Sign-in state.
pub mod auth_session;
/// Configuration file handling.
pub mod config;
/// Container wiring.
pub mod context;
/// Application errors.
pub mod error;
/// View navigation.
pub mod router;
/// Task list state.
pub mod task_store;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use api::{
    ApiError, ApiResponse, ApiStatus, DEFAULT_LATENCY, DEFAULT_RATE_LIMIT, RateLimiter, RemoteApi,
    SimulatedApi,
};
pub use auth_session::{AUTH_FLAG_KEY, AuthSession, USER_KEY};
pub use config::{ApiConfig, AppConfig, StorageConfig};
pub use context::AppContext;
pub use error::{AppError, Result};
pub use router::{Navigation, View};
pub use task_store::{TASKS_KEY, TaskStore};
