//! On-disk locations of the configuration file and the two stores.

use anyhow::{Result, anyhow};
use std::path::{Path, PathBuf};
use taskdeck_app::StorageConfig;
use taskdeck_app::config::CONFIG_FILE;
use taskdeck_store::StorageScope;

const APP_DIR: &str = "taskdeck";

/// Default config location: `<config_dir>/taskdeck/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// Files backing the session and persistent scopes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    pub session: PathBuf,
    pub persistent: PathBuf,
}

impl StoragePaths {
    /// Resolve store files.
    ///
    /// `--data-dir` puts both scopes in one directory unless the config names
    /// a session directory. Otherwise the config wins, then platform
    /// directories: local data for the task list, runtime (or cache) for the
    /// session.
    pub fn resolve(config: &StorageConfig, data_dir_override: Option<&Path>) -> Result<Self> {
        let data_dir = match (data_dir_override, &config.data_dir) {
            (Some(dir), _) => dir.to_path_buf(),
            (None, Some(dir)) => dir.clone(),
            (None, None) => dirs::data_local_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or_else(|| anyhow!("could not determine a data directory; pass --data-dir"))?,
        };

        let session_dir = match (&config.session_dir, data_dir_override) {
            (Some(dir), _) => dir.clone(),
            (None, Some(dir)) => dir.to_path_buf(),
            (None, None) => dirs::runtime_dir()
                .or_else(dirs::cache_dir)
                .map_or_else(|| data_dir.join("session"), |dir| dir.join(APP_DIR)),
        };

        Ok(Self {
            session: session_dir.join(StorageScope::Session.file_name()),
            persistent: data_dir.join(StorageScope::Persistent.file_name()),
        })
    }
}
