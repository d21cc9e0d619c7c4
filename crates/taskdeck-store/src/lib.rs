//! Durable key/value storage for taskdeck.
//!
//! Two independent scopes are used by the application: a session scope that
//! holds the authentication flag and user record, and a persistent scope that
//! holds the serialized task list. Both are plain string-to-string maps.

mod error;
mod file;

pub use error::StoreError;
pub use file::FileStore;

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Lifetime class of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageScope {
    /// Cleared when the user's session ends.
    Session,
    /// Survives across sessions.
    Persistent,
}

impl StorageScope {
    /// File name used when the scope is backed by a [`FileStore`].
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Session => "session.json",
            Self::Persistent => "store.json",
        }
    }
}

/// Minimal string key/value storage required by the application layer.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    /// Returns a store-specific error when the value cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns a store-specific error when persisting fails.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete `key`. Removing an absent key succeeds.
    ///
    /// # Errors
    /// Returns a store-specific error when persisting fails.
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Write several entries at once.
    ///
    /// The default implementation calls [`set`](Self::set) per entry. Stores
    /// that can commit atomically should override it.
    ///
    /// # Errors
    /// Propagates the first error from the underlying store.
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }

    /// Delete several keys at once.
    ///
    /// # Errors
    /// Propagates the first error from the underlying store.
    fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        for key in keys {
            self.remove(key)?;
        }
        Ok(())
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        (**self).set_many(entries)
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        (**self).remove_many(keys)
    }
}

/// In-process store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<BTreeMap<String, String>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `entries`.
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Arc::new(RwLock::new(map)),
        }
    }

    /// Copy of the current contents.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}
