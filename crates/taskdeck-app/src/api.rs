//! Simulated remote API guarded by a shared rate limiter.
//!
//! There is no server behind taskdeck. Every mutating operation still goes
//! through [`RemoteApi::call`], which for [`SimulatedApi`] means: a synchronous
//! admission check against the shared [`RateLimiter`], then a fixed latency
//! before the payload is echoed back.

use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::time::{Instant, sleep};
use tracing::debug;

use crate::config::ApiConfig;

/// Minimum spacing between two accepted calls.
pub const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(1000);
/// Delay before an accepted call resolves.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(500);

/// Failure of a remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Issued before the rate-limit window since the last accepted call elapsed.
    #[error("Rate limit exceeded. Please wait before making another request.")]
    RateLimitExceeded {
        /// Time left until the next call would be admitted.
        retry_after: Duration,
    },
    /// Any other failure of the remote side.
    #[error("remote call '{action}' failed: {reason}")]
    Failed {
        /// Action that failed.
        action: String,
        /// Human readable cause.
        reason: String,
    },
}

/// Outcome marker of a resolved call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiStatus {
    /// The call went through.
    Success,
}

/// Echo returned by a resolved call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    /// Action identifier passed to the call.
    pub action: String,
    /// Payload passed to the call, unchanged. `None` when the caller sent none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Always [`ApiStatus::Success`].
    pub status: ApiStatus,
}

/// Remote operations used by the session and task containers.
pub trait RemoteApi: Send + Sync {
    /// Issue `action` with an optional payload.
    ///
    /// Admission is decided when this method is called, not when the returned
    /// future is first polled.
    fn call(
        &self,
        action: &str,
        payload: Option<Value>,
    ) -> impl Future<Output = Result<ApiResponse, ApiError>> + Send;
}

/// Single-slot limiter: at most one accepted call per window, measured from
/// the last accepted call.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last_accepted: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Create a limiter that has not accepted anything yet.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_accepted: Mutex::new(None),
        }
    }

    /// Configured window length.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Instant of the most recent accepted call.
    #[must_use]
    pub fn last_accepted(&self) -> Option<Instant> {
        *self.last_accepted.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Admit a call issued now.
    ///
    /// # Errors
    /// Returns [`ApiError::RateLimitExceeded`] when the window has not elapsed.
    pub fn try_acquire(&self) -> Result<Instant, ApiError> {
        self.try_acquire_at(Instant::now())
    }

    /// Admit a call issued at `now`.
    ///
    /// Rejections leave the marker untouched; a call exactly one interval
    /// after the marker is admitted.
    ///
    /// # Errors
    /// Returns [`ApiError::RateLimitExceeded`] when the window has not elapsed.
    pub fn try_acquire_at(&self, now: Instant) -> Result<Instant, ApiError> {
        let mut last = self.last_accepted.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = *last {
            let elapsed = now.saturating_duration_since(previous);
            if elapsed < self.interval {
                return Err(ApiError::RateLimitExceeded {
                    retry_after: self.interval - elapsed,
                });
            }
        }
        *last = Some(now);
        drop(last);
        Ok(now)
    }

    /// Forget the last accepted call.
    pub fn reset(&self) {
        *self.last_accepted.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_RATE_LIMIT)
    }
}

/// In-process stand-in for the remote API.
///
/// Clones share one [`RateLimiter`], so every holder of a handle is judged
/// against the same marker.
#[derive(Debug, Clone)]
pub struct SimulatedApi {
    limiter: Arc<RateLimiter>,
    latency: Duration,
}

impl SimulatedApi {
    /// Build a handle around an existing limiter.
    #[must_use]
    pub const fn new(limiter: Arc<RateLimiter>, latency: Duration) -> Self {
        Self { limiter, latency }
    }

    /// Build a handle with a fresh limiter from configuration.
    #[must_use]
    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(
            Arc::new(RateLimiter::new(config.rate_limit())),
            config.latency(),
        )
    }

    /// Shared limiter behind this handle.
    #[must_use]
    pub const fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Simulated latency of accepted calls.
    #[must_use]
    pub const fn latency(&self) -> Duration {
        self.latency
    }
}

impl Default for SimulatedApi {
    fn default() -> Self {
        Self::new(Arc::new(RateLimiter::default()), DEFAULT_LATENCY)
    }
}

impl RemoteApi for SimulatedApi {
    fn call(
        &self,
        action: &str,
        payload: Option<Value>,
    ) -> impl Future<Output = Result<ApiResponse, ApiError>> + Send {
        let admitted = self.limiter.try_acquire();
        match &admitted {
            Ok(_) => debug!(action, "accepted simulated call"),
            Err(err) => debug!(action, %err, "rejected simulated call"),
        }
        let latency = self.latency;
        let action = action.to_owned();
        async move {
            admitted?;
            sleep(latency).await;
            Ok(ApiResponse {
                action,
                data: payload,
                status: ApiStatus::Success,
            })
        }
    }
}
