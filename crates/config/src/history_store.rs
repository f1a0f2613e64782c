//! On-disk persistence for prompt command history.
//!
//! A JSON-backed store mirroring the config file's ergonomics (env override,
//! tilde expansion, config-directory fallback). Entries are kept most recent
//! first; recording a command the store already holds moves it to the front
//! and refreshes its timestamp.

use std::collections::VecDeque;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::serde::ts_seconds;
use chrono::{DateTime, Utc};
use dirs_next::config_dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::expand_tilde;

/// Environment variable controlling the history file location.
pub const HISTORY_PATH_ENV: &str = "HUSKY_HISTORY_PATH";

/// Default filename for the persisted history.
pub const HISTORY_FILE_NAME: &str = "history.json";

/// Maximum number of entries retained by the store.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Errors surfaced by history store operations.
#[derive(Debug, Error)]
pub enum HistoryStoreError {
    /// I/O failure while reading or writing the history file.
    #[error("history I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization or deserialization failure.
    #[error("history serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A persisted command with its last-used timestamp.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub command: String,
    #[serde(with = "ts_seconds")]
    pub last_used_at: DateTime<Utc>,
}

#[derive(Default, Serialize, Deserialize)]
struct HistoryFile {
    entries: VecDeque<HistoryEntry>,
}

impl HistoryFile {
    fn record(&mut self, command: &str, limit: usize) {
        if let Some(position) = self.entries.iter().position(|entry| entry.command == command) {
            self.entries.remove(position);
        }
        self.entries.push_front(HistoryEntry {
            command: command.to_string(),
            last_used_at: Utc::now(),
        });
        self.truncate(limit);
    }

    fn truncate(&mut self, limit: usize) {
        while self.entries.len() > limit {
            self.entries.pop_back();
        }
    }

    fn commands(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.command.clone()).collect()
    }
}

/// JSON-backed command history persisted on disk.
pub struct CommandHistoryFile {
    path: PathBuf,
    entries: Mutex<HistoryFile>,
    max_entries: usize,
}

impl CommandHistoryFile {
    /// Create a store at the provided path (or the default path when omitted).
    pub fn new<P: Into<Option<PathBuf>>>(path: P, max_entries: usize) -> Result<Self, HistoryStoreError> {
        let resolved_path = match path.into() {
            Some(path) => expand_tilde(path.to_string_lossy().as_ref()),
            None => default_history_path(),
        };

        let file = load_history_file(&resolved_path)?;
        Ok(Self {
            path: resolved_path,
            entries: Mutex::new(file),
            max_entries,
        })
    }

    /// Initialize a store using the default settings.
    pub fn with_defaults() -> Result<Self, HistoryStoreError> {
        Self::new(None::<PathBuf>, DEFAULT_HISTORY_LIMIT)
    }

    /// Access the underlying history path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Commands, most recent first. This is the shape the in-memory history
    /// expects when seeded at startup.
    pub fn commands(&self) -> Vec<String> {
        self.entries.lock().expect("history lock poisoned").commands()
    }

    /// Records a command use and saves. Blank input is ignored.
    pub fn record(&self, command: &str) -> Result<(), HistoryStoreError> {
        let command = command.trim();
        if command.is_empty() {
            return Ok(());
        }
        let mut entries = self.entries.lock().expect("history lock poisoned");
        entries.record(command, self.max_entries);
        self.save_locked(&entries)
    }

    /// Drops every entry and saves.
    pub fn clear(&self) -> Result<(), HistoryStoreError> {
        let mut entries = self.entries.lock().expect("history lock poisoned");
        entries.entries.clear();
        self.save_locked(&entries)
    }

    fn save_locked(&self, history_file: &HistoryFile) -> Result<(), HistoryStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(history_file)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

fn default_history_path() -> PathBuf {
    if let Ok(path) = env::var(HISTORY_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return expand_tilde(trimmed);
        }
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("husky")
        .join(HISTORY_FILE_NAME)
}

fn load_history_file(path: &Path) -> Result<HistoryFile, HistoryStoreError> {
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<HistoryFile>(&content) {
            Ok(file) => Ok(file),
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "Failed to parse history file; starting empty"
                );
                Ok(HistoryFile::default())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(HistoryFile::default()),
        Err(error) => Err(HistoryStoreError::Io(error)),
    }
}
