use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::api::{DEFAULT_LATENCY, DEFAULT_RATE_LIMIT};

/// File name looked up inside the configuration directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Top-level configuration loaded from `config.toml`.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// `[api]` table.
    #[serde(default)]
    pub api: ApiConfig,
    /// `[storage]` table.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from `path`. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents =
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        let config = Self::from_toml(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Parse and validate configuration text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.api.ensure_positive_window()
    }
}

/// Timing of the simulated API.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Minimum spacing between accepted calls, in milliseconds.
    #[serde(default = "default_rate_limit_ms")]
    pub rate_limit_ms: u64,
    /// Latency of accepted calls, in milliseconds.
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            rate_limit_ms: default_rate_limit_ms(),
            latency_ms: default_latency_ms(),
        }
    }
}

impl ApiConfig {
    /// Rate-limit window as a duration.
    pub const fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }

    /// Simulated latency as a duration.
    pub const fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    fn ensure_positive_window(&self) -> Result<()> {
        if self.rate_limit_ms == 0 {
            bail!("api.rate_limit_ms must be greater than zero");
        }
        Ok(())
    }
}

#[allow(clippy::cast_possible_truncation)]
const fn default_rate_limit_ms() -> u64 {
    DEFAULT_RATE_LIMIT.as_millis() as u64
}

#[allow(clippy::cast_possible_truncation)]
const fn default_latency_ms() -> u64 {
    DEFAULT_LATENCY.as_millis() as u64
}

/// Where the two stores live on disk. Unset entries fall back to platform
/// directories chosen by the binary.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory of the persistent store (task list).
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Directory of the session store (authentication flag).
    #[serde(default)]
    pub session_dir: Option<PathBuf>,
}
