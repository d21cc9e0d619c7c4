//! Test doubles for the remote API and durable storage.

use serde_json::Value;
use std::collections::HashSet;
use std::future::{Future, ready};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use taskdeck_store::{KeyValueStore, MemoryStore, StoreError};

use crate::api::{ApiError, ApiResponse, ApiStatus, RemoteApi};

/// Remote API that resolves immediately and records every call.
#[derive(Clone, Default)]
pub struct ScriptedApi {
    inner: Arc<ScriptedApiInner>,
}

#[derive(Default)]
struct ScriptedApiInner {
    calls: Mutex<Vec<(String, Option<Value>)>>,
    failing: Mutex<HashSet<String>>,
}

impl ScriptedApi {
    pub fn fail_on(&self, action: &str) {
        guard(&self.inner.failing).insert(action.to_owned());
    }

    pub fn recover(&self, action: &str) {
        guard(&self.inner.failing).remove(action);
    }

    pub fn actions(&self) -> Vec<String> {
        guard(&self.inner.calls)
            .iter()
            .map(|(action, _)| action.clone())
            .collect()
    }

    pub fn last_payload(&self) -> Option<Value> {
        guard(&self.inner.calls)
            .last()
            .and_then(|(_, payload)| payload.clone())
    }
}

impl RemoteApi for ScriptedApi {
    fn call(
        &self,
        action: &str,
        payload: Option<Value>,
    ) -> impl Future<Output = Result<ApiResponse, ApiError>> + Send {
        guard(&self.inner.calls).push((action.to_owned(), payload.clone()));
        let outcome = if guard(&self.inner.failing).contains(action) {
            Err(ApiError::Failed {
                action: action.to_owned(),
                reason: "injected failure".into(),
            })
        } else {
            Ok(ApiResponse {
                action: action.to_owned(),
                data: payload,
                status: ApiStatus::Success,
            })
        };
        ready(outcome)
    }
}

/// Memory store whose writes can be switched off.
#[derive(Clone, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    reject_writes: Arc<AtomicBool>,
}

impl FlakyStore {
    pub fn memory(&self) -> &MemoryStore {
        &self.inner
    }

    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Other("disk full".into()));
        }
        Ok(())
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check_writable()?;
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.check_writable()?;
        self.inner.remove(key)
    }
}

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
