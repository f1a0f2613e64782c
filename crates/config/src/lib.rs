//! # husky config
//!
//! Configuration and on-disk persistence for the husky dashboard: the JSON
//! settings file (prompt refresh rate, history cap), a duration parser for
//! the human-friendly values it holds, and the persisted command history the
//! prompt is seeded from.

pub mod duration;
pub mod history_store;
pub mod settings;

pub use duration::{parse_duration, DurationParseError};
pub use history_store::{
    CommandHistoryFile, HistoryEntry, HistoryStoreError, DEFAULT_HISTORY_LIMIT, HISTORY_FILE_NAME,
    HISTORY_PATH_ENV,
};
pub use settings::{
    default_config_path, Config, ConfigError, HistoryConfig, PromptConfig, CONFIG_FILE_NAME,
    CONFIG_PATH_ENV, DEFAULT_MAX_HISTORY, DEFAULT_REFRESH_RATE, FALLBACK_REFRESH_RATE,
};

use std::path::PathBuf;

/// Expands a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let trimmed = path.trim();

    if trimmed == "~" {
        return dirs_next::home_dir().unwrap_or_else(|| PathBuf::from("~"));
    }
    if let Some(rest) = trimmed.strip_prefix("~/") {
        return dirs_next::home_dir()
            .unwrap_or_else(|| PathBuf::from("~"))
            .join(rest);
    }
    if let Some(rest) = trimmed.strip_prefix("~\\") {
        return dirs_next::home_dir()
            .unwrap_or_else(|| PathBuf::from("~"))
            .join(rest);
    }

    PathBuf::from(trimmed)
}
