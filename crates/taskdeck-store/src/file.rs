use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::{KeyValueStore, StoreError};

/// Store backed by a single JSON object file.
///
/// The whole map is held in memory and rewritten on every change. Writes go
/// to a sibling temp file that is renamed over the target, so readers never
/// observe a half-written file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`. A missing file yields an empty store.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a JSON object of strings.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
                path: path.clone(),
                source,
            })?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(StoreError::io(&path, err)),
        };
        debug!(path = %path.display(), keys = entries.len(), "opened file store");
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Open the store at `path`, starting empty when the file is corrupt.
    ///
    /// The unreadable file stays on disk until the next write replaces it.
    ///
    /// # Errors
    /// Returns an error only if the file exists but cannot be read.
    pub fn open_or_empty(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        match Self::open(&path) {
            Err(StoreError::Corrupt { path, source }) => {
                warn!(path = %path.display(), error = %source, "ignoring unreadable store file");
                Ok(Self {
                    path,
                    entries: RwLock::new(BTreeMap::new()),
                })
            }
            other => other,
        }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` to a copy of the map, write it out, then publish it.
    fn commit(&self, change: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<(), StoreError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = entries.clone();
        change(&mut next);
        if next == *entries {
            return Ok(());
        }
        self.flush(&next)?;
        *entries = next;
        drop(entries);
        Ok(())
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let dir = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(|err| StoreError::io(dir, err))?;

        let encoded = serde_json::to_vec_pretty(entries)?;
        let mut tmp = NamedTempFile::new_in(dir).map_err(|err| StoreError::io(dir, err))?;
        tmp.write_all(&encoded)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|err| StoreError::io(tmp.path(), err))?;
        tmp.persist(&self.path)
            .map_err(|err| StoreError::io(&self.path, err.error))?;
        debug!(path = %self.path.display(), keys = entries.len(), "flushed file store");
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.commit(|map| {
            map.insert(key.to_owned(), value.to_owned());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.commit(|map| {
            map.remove(key);
        })
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        self.commit(|map| {
            for (key, value) in entries {
                map.insert((*key).to_owned(), (*value).to_owned());
            }
        })
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        self.commit(|map| {
            for key in keys {
                map.remove(*key);
            }
        })
    }
}
