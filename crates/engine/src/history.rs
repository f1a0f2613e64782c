//! In-memory command history with change notification.

use std::sync::Arc;

use tracing::debug;

/// Default cap on retained commands.
pub const MAX_HISTORY: usize = 20;

/// Observes history mutations.
pub trait HistoryListener: Send + Sync {
    /// Receives the full command list, most recent first.
    fn history_changed(&self, commands: &[String]);
}

/// A bounded most-recent-first command stack.
pub struct History {
    commands: Vec<String>,
    limit: usize,
    listeners: Vec<Arc<dyn HistoryListener>>,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            commands: Vec::new(),
            limit,
            listeners: Vec::new(),
        }
    }

    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
    }

    /// Commands, most recent first.
    pub fn list(&self) -> &[String] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Records a command. Empty input and immediate repeats are dropped;
    /// everything is lowercased before storage.
    pub fn push(&mut self, command: &str) {
        if command.is_empty() {
            return;
        }

        let command = command.to_lowercase();
        if self.commands.first() == Some(&command) {
            return;
        }
        self.commands.insert(0, command);
        self.commands.truncate(self.limit);
        self.fire_history_changed();
    }

    /// Removes and returns the most recent command.
    pub fn pop(&mut self) -> Option<String> {
        if self.commands.is_empty() {
            return None;
        }
        let command = self.commands.remove(0);
        self.fire_history_changed();
        Some(command)
    }

    pub fn clear(&mut self) {
        debug!("command history cleared");
        self.commands.clear();
        self.fire_history_changed();
    }

    /// Replaces the stack wholesale, truncating to the limit.
    pub fn set(&mut self, commands: Vec<String>) {
        self.commands = commands;
        self.commands.truncate(self.limit);
        self.fire_history_changed();
    }

    pub fn add_listener(&mut self, listener: Arc<dyn HistoryListener>) {
        self.listeners.push(listener);
    }

    fn fire_history_changed(&self) {
        for listener in &self.listeners {
            listener.history_changed(&self.commands);
        }
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(MAX_HISTORY)
    }
}
