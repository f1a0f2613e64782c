//! Dashboard settings persisted as JSON in the user's config directory.
//!
//! The file lives at `config_dir()/husky/config.json` unless
//! `HUSKY_CONFIG_PATH` points elsewhere. A missing file yields defaults; a
//! malformed one is reported and replaced by defaults so a bad edit never
//! locks the user out.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dirs_next::config_dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::duration::parse_duration;
use crate::expand_tilde;

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "HUSKY_CONFIG_PATH";

/// Default filename for the JSON payload.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Default minimum interval between prompt index refreshes.
pub const DEFAULT_REFRESH_RATE: &str = "2m";

/// Refresh rate applied when the configured value does not parse.
pub const FALLBACK_REFRESH_RATE: Duration = Duration::from_secs(20);

/// Default command history cap.
pub const DEFAULT_MAX_HISTORY: usize = 20;

/// Error surfaced when reading or writing the config file fails.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure (permissions, missing directory).
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization or deserialization failure.
    #[error("config serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Prompt autocompletion options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Whether the prompt offers namespace completion for the second term.
    #[serde(default = "default_autocomplete_namespace")]
    pub autocomplete_namespace: bool,
    /// Minimum interval between index refreshes, e.g. `"2m"` or `"30s"`.
    #[serde(default = "default_refresh_rate")]
    pub refresh_rate: String,
    /// Parsed form of `refresh_rate`, filled in by [`validate`](Self::validate).
    #[serde(skip)]
    pub refresh_rate_duration: Duration,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            autocomplete_namespace: true,
            refresh_rate: DEFAULT_REFRESH_RATE.to_string(),
            refresh_rate_duration: Duration::ZERO,
        }
    }
}

impl PromptConfig {
    /// Resolves the refresh rate, falling back to 20s on a malformed value.
    pub fn validate(&mut self) {
        if self.refresh_rate.is_empty() {
            self.refresh_rate = DEFAULT_REFRESH_RATE.to_string();
        }
        self.refresh_rate_duration = match parse_duration(&self.refresh_rate) {
            Ok(duration) => duration,
            Err(error) => {
                warn!(
                    rate = %self.refresh_rate,
                    error = %error,
                    "Unable to parse refresh rate; using fallback"
                );
                FALLBACK_REFRESH_RATE
            }
        };
    }
}

/// Command history options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of commands retained.
    #[serde(default = "default_max_history")]
    pub max_history: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_MAX_HISTORY,
        }
    }
}

impl HistoryConfig {
    pub fn validate(&mut self) {
        if self.max_history == 0 {
            self.max_history = DEFAULT_MAX_HISTORY;
        }
    }
}

/// Top-level persisted configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub prompt: PromptConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

impl Config {
    /// Loads and validates the configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&default_config_path())
    }

    /// Loads and validates the configuration from `path`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = read_config(path)?;
        config.prompt.validate();
        config.history.validate();
        Ok(config)
    }

    /// Writes the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }
}

/// Resolves the config file location, honoring the env override.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return expand_tilde(trimmed);
        }
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("husky")
        .join(CONFIG_FILE_NAME)
}

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    match fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str(&data) {
            Ok(config) => Ok(config),
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "Failed to parse config file; using defaults"
                );
                Ok(Config::default())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
        Err(error) => Err(ConfigError::Io(error)),
    }
}

fn default_autocomplete_namespace() -> bool {
    true
}

fn default_refresh_rate() -> String {
    DEFAULT_REFRESH_RATE.to_string()
}

fn default_max_history() -> usize {
    DEFAULT_MAX_HISTORY
}
