//! Prompt input buffer with a fish-style suggestion ring.
//!
//! The buffer owns the typed runes and a cached list of completion
//! candidates. Every mutation notifies registered watchers in priority order,
//! then recomputes the ring through the configured suggestion callback and
//! announces the new front-runner. Watchers are held as `Arc`s; the buffer
//! never learns who they are beyond the trait.

use std::sync::Arc;

use husky_types::{BufferKind, SuggestMode};

/// Produces the candidate list for the current text.
pub type SuggestionFunc = Box<dyn Fn(&str, SuggestMode) -> Vec<String> + Send + Sync>;

/// Observes buffer lifecycle events.
///
/// `suggestion_changed` has a default no-op so watchers that only track text
/// (the autocompleter, say) skip the ring traffic.
pub trait BuffWatcher: Send + Sync {
    /// The text changed; `suggestion` is the ring's current entry.
    fn buffer_changed(&self, text: &str, suggestion: &str);

    /// The text was accepted.
    fn buffer_completed(&self, text: &str, suggestion: &str);

    /// The buffer was activated or deactivated.
    fn buffer_active(&self, active: bool, kind: BufferKind);

    /// The suggestion ring advanced or was rebuilt.
    fn suggestion_changed(&self, _text: &str, _suggestion: &str) {}
}

/// Observes suggest-mode toggles.
pub trait SuggestModeListener: Send + Sync {
    fn suggest_mode_changed(&self, mode: SuggestMode);
}

struct ListenerEntry {
    priority: i32,
    watcher: Arc<dyn BuffWatcher>,
}

/// The prompt's input model: rune buffer, suggestion ring, listener fan-out.
pub struct SuggestBuff {
    buff: Vec<char>,
    kind: BufferKind,
    active: bool,
    listeners: Vec<ListenerEntry>,
    suggestion_fn: Option<SuggestionFunc>,
    suggestions: Vec<String>,
    suggestion_index: usize,
    suggest_mode: SuggestMode,
    mode_listeners: Vec<Arc<dyn SuggestModeListener>>,
}

impl SuggestBuff {
    pub fn new(kind: BufferKind) -> Self {
        Self {
            buff: Vec::new(),
            kind,
            active: false,
            listeners: Vec::new(),
            suggestion_fn: None,
            suggestions: Vec::new(),
            suggestion_index: 0,
            suggest_mode: SuggestMode::default(),
            mode_listeners: Vec::new(),
        }
    }

    pub fn kind(&self) -> BufferKind {
        self.kind
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_empty(&self) -> bool {
        self.buff.is_empty()
    }

    pub fn text(&self) -> String {
        self.buff.iter().collect()
    }

    pub fn set_suggestion_fn(&mut self, f: SuggestionFunc) {
        self.suggestion_fn = Some(f);
    }

    // ----- Listener registration -----

    /// Registers with the default priority.
    pub fn add_listener(&mut self, watcher: Arc<dyn BuffWatcher>) {
        self.add_listener_with_priority(watcher, 0);
    }

    /// Registers a watcher; higher priorities are notified first, ties keep
    /// registration order.
    pub fn add_listener_with_priority(&mut self, watcher: Arc<dyn BuffWatcher>, priority: i32) {
        self.listeners.push(ListenerEntry { priority, watcher });
        self.listeners.sort_by_key(|entry| std::cmp::Reverse(entry.priority));
    }

    pub fn remove_listener(&mut self, watcher: &Arc<dyn BuffWatcher>) {
        self.listeners
            .retain(|entry| !Arc::ptr_eq(&entry.watcher, watcher));
    }

    pub fn add_suggest_mode_listener(&mut self, listener: Arc<dyn SuggestModeListener>) {
        self.mode_listeners.push(listener);
    }

    pub fn remove_suggest_mode_listener(&mut self, listener: &Arc<dyn SuggestModeListener>) {
        self.mode_listeners
            .retain(|entry| !Arc::ptr_eq(entry, listener));
    }

    // ----- Text mutation -----

    /// Appends a rune.
    pub fn add(&mut self, r: char) {
        self.buff.push(r);
        self.changed();
    }

    /// Removes the last rune.
    pub fn delete(&mut self) {
        if self.buff.pop().is_some() {
            self.changed();
        }
    }

    /// Inserts a rune at `index`, clamped to the buffer end.
    pub fn insert(&mut self, r: char, index: usize) {
        let index = index.min(self.buff.len());
        self.buff.insert(index, r);
        self.changed();
    }

    /// Removes the rune at `index`; out of range is a no-op.
    pub fn delete_at(&mut self, index: usize) {
        if index >= self.buff.len() {
            return;
        }
        self.buff.remove(index);
        self.changed();
    }

    /// Removes the inclusive rune range `[lo, hi]`, clamped.
    pub fn delete_range(&mut self, lo: usize, hi: usize) {
        if self.buff.is_empty() {
            return;
        }
        let hi = hi.min(self.buff.len() - 1);
        let lo = lo.min(hi);
        self.buff.drain(lo..=hi);
        self.changed();
    }

    /// Accepts `text` as the committed input.
    pub fn set_text(&mut self, text: &str, suggestion: &str) {
        self.buff = text.chars().collect();
        self.fire_buffer_completed(text, suggestion);
    }

    /// Empties the buffer; `fire` controls whether watchers hear about it.
    pub fn clear_text(&mut self, fire: bool) {
        self.buff.clear();
        if fire {
            self.changed();
        } else {
            self.clear_suggestions();
        }
    }

    /// Clears text and ring without notifying anyone.
    pub fn reset(&mut self) {
        self.buff.clear();
        self.clear_suggestions();
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        let kind = self.kind;
        for entry in &self.listeners {
            entry.watcher.buffer_active(active, kind);
        }
    }

    // ----- Suggestion ring -----

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn current_suggestion(&self) -> Option<&str> {
        self.suggestions.get(self.suggestion_index).map(String::as_str)
    }

    /// Advances the ring, wrapping; announces and returns the new entry.
    pub fn next_suggestion(&mut self) -> Option<String> {
        if self.suggestions.is_empty() {
            return None;
        }
        self.suggestion_index = (self.suggestion_index + 1) % self.suggestions.len();
        self.announce_current()
    }

    /// Steps the ring backwards, wrapping; announces and returns the entry.
    pub fn prev_suggestion(&mut self) -> Option<String> {
        if self.suggestions.is_empty() {
            return None;
        }
        self.suggestion_index = match self.suggestion_index {
            0 => self.suggestions.len() - 1,
            index => index - 1,
        };
        self.announce_current()
    }

    pub fn clear_suggestions(&mut self) {
        self.suggestions.clear();
        self.suggestion_index = 0;
    }

    pub fn suggest_mode(&self) -> SuggestMode {
        self.suggest_mode
    }

    /// Switches suggest mode, notifying mode listeners on an actual change.
    pub fn set_suggest_mode(&mut self, mode: SuggestMode) {
        if self.suggest_mode == mode {
            return;
        }
        for listener in &self.mode_listeners {
            listener.suggest_mode_changed(mode);
        }
        self.suggest_mode = mode;
    }

    /// Recomputes the ring for the current text and announces the result.
    /// Useful when indices refreshed underneath an unchanged buffer.
    pub fn notify(&mut self) {
        self.refresh_suggestions();
    }

    // ----- Internals -----

    fn changed(&mut self) {
        let text = self.text();
        let current = self.current_suggestion().unwrap_or_default().to_string();
        for entry in &self.listeners {
            entry.watcher.buffer_changed(&text, &current);
        }
        self.refresh_suggestions();
    }

    fn refresh_suggestions(&mut self) {
        let Some(suggest) = &self.suggestion_fn else {
            return;
        };
        let text = self.text();
        self.suggestions = suggest(&text, self.suggest_mode);
        self.suggestion_index = 0;

        let front = if self.buff.is_empty() {
            ""
        } else {
            self.current_suggestion().unwrap_or_default()
        };
        let front = front.to_string();
        self.fire_suggestion_changed(&text, &front);
    }

    fn announce_current(&mut self) -> Option<String> {
        let text = self.text();
        let suggestion = self.current_suggestion()?.to_string();
        self.fire_suggestion_changed(&text, &suggestion);
        Some(suggestion)
    }

    fn fire_suggestion_changed(&self, text: &str, suggestion: &str) {
        for entry in &self.listeners {
            entry.watcher.suggestion_changed(text, suggestion);
        }
    }

    fn fire_buffer_completed(&self, text: &str, suggestion: &str) {
        for entry in &self.listeners {
            entry.watcher.buffer_completed(text, suggestion);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recorder {
        tag: &'static str,
        events: Arc<Mutex<Vec<String>>>,
    }

    impl Recorder {
        fn new(tag: &'static str, events: Arc<Mutex<Vec<String>>>) -> Arc<Self> {
            Arc::new(Self { tag, events })
        }

        fn log(&self, event: String) {
            self.events.lock().expect("events lock poisoned").push(event);
        }
    }

    impl BuffWatcher for Recorder {
        fn buffer_changed(&self, text: &str, _suggestion: &str) {
            self.log(format!("{}:changed:{text}", self.tag));
        }

        fn buffer_completed(&self, text: &str, suggestion: &str) {
            self.log(format!("{}:completed:{text}:{suggestion}", self.tag));
        }

        fn buffer_active(&self, active: bool, _kind: BufferKind) {
            self.log(format!("{}:active:{active}", self.tag));
        }

        fn suggestion_changed(&self, _text: &str, suggestion: &str) {
            self.log(format!("{}:suggestion:{suggestion}", self.tag));
        }
    }

    #[test]
    fn add_then_delete_round_trips_text() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let low = Recorder::new("low", events.clone());
        let high = Recorder::new("high", events.clone());

        let mut buff = SuggestBuff::new(BufferKind::Command);
        buff.add_listener(low);
        buff.add_listener_with_priority(high, 5);

        buff.add('p');
        buff.delete();
        assert_eq!(buff.text(), "");

        let log = events.lock().expect("events lock poisoned");
        let changed: Vec<&str> = log
            .iter()
            .filter(|e| e.contains(":changed:"))
            .map(String::as_str)
            .collect();
        assert_eq!(
            changed,
            ["high:changed:p", "low:changed:p", "high:changed:", "low:changed:"]
        );
    }

    #[test]
    fn set_text_fires_completed() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let watcher = Recorder::new("w", events.clone());

        let mut buff = SuggestBuff::new(BufferKind::Command);
        buff.add_listener(watcher);
        buff.set_text("pod kube-system", "");

        assert_eq!(buff.text(), "pod kube-system");
        let log = events.lock().expect("events lock poisoned");
        assert_eq!(log.as_slice(), ["w:completed:pod kube-system:"]);
    }

    #[test]
    fn edits_are_clamped() {
        let mut buff = SuggestBuff::new(BufferKind::Filter);
        buff.insert('a', 10);
        buff.insert('b', 0);
        assert_eq!(buff.text(), "ba");

        buff.delete_at(5);
        assert_eq!(buff.text(), "ba");

        buff.delete_range(1, 9);
        assert_eq!(buff.text(), "b");
    }

    #[test]
    fn ring_wraps_both_ways() {
        let mut buff = SuggestBuff::new(BufferKind::Command);
        buff.set_suggestion_fn(Box::new(|_, _| {
            vec!["alpha".into(), "beta".into(), "gamma".into()]
        }));
        buff.add('a');

        assert_eq!(buff.current_suggestion(), Some("alpha"));
        let k = buff.suggestions().len();
        for _ in 0..k {
            buff.next_suggestion();
        }
        assert_eq!(buff.current_suggestion(), Some("alpha"));

        assert_eq!(buff.prev_suggestion().as_deref(), Some("gamma"));
        assert_eq!(buff.next_suggestion().as_deref(), Some("alpha"));
    }

    #[test]
    fn empty_buffer_announces_blank_suggestion() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let watcher = Recorder::new("w", events.clone());

        let mut buff = SuggestBuff::new(BufferKind::Command);
        buff.set_suggestion_fn(Box::new(|_, _| vec!["alias1".into()]));
        buff.add_listener(watcher);

        buff.add('a');
        buff.delete();

        let log = events.lock().expect("events lock poisoned");
        let suggestions: Vec<&str> = log
            .iter()
            .filter(|e| e.contains(":suggestion:"))
            .map(String::as_str)
            .collect();
        assert_eq!(suggestions, ["w:suggestion:alias1", "w:suggestion:"]);
    }

    #[test]
    fn mode_listeners_fire_on_change_only() {
        struct ModeRecorder(Mutex<Vec<SuggestMode>>);
        impl SuggestModeListener for ModeRecorder {
            fn suggest_mode_changed(&self, mode: SuggestMode) {
                self.0.lock().expect("mode lock poisoned").push(mode);
            }
        }

        let recorder = Arc::new(ModeRecorder(Mutex::new(Vec::new())));
        let mut buff = SuggestBuff::new(BufferKind::Command);
        buff.add_suggest_mode_listener(recorder.clone());

        buff.set_suggest_mode(SuggestMode::AutoComplete);
        buff.set_suggest_mode(SuggestMode::FullText);
        buff.set_suggest_mode(SuggestMode::FullText);

        let seen = recorder.0.lock().expect("mode lock poisoned");
        assert_eq!(seen.as_slice(), [SuggestMode::FullText]);
    }

    #[test]
    fn active_flag_reaches_watchers() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let watcher = Recorder::new("w", events.clone());

        let mut buff = SuggestBuff::new(BufferKind::Command);
        buff.add_listener(watcher);
        buff.set_active(true);
        buff.set_active(false);

        let log = events.lock().expect("events lock poisoned");
        assert_eq!(log.as_slice(), ["w:active:true", "w:active:false"]);
    }
}
