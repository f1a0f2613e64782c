//! Prompt autocompletion over the cluster vocabularies.
//!
//! [`PromptAutocompleter`] keeps four word indices (command history, resource
//! aliases, namespaces, live-config keys) and answers [`suggest`] queries from
//! the prompt in real time. The indices are refreshed through a host callback
//! at most once per refresh window, or immediately after a cluster switch.
//!
//! Locking: one `RwLock` guards the indices — `index`/`reset` take the write
//! side, queries the read side — and a separate gate mutex serializes
//! [`update`] so concurrent refresh attempts collapse into a single callback.
//!
//! [`suggest`]: PromptAutocompleter::suggest
//! [`update`]: PromptAutocompleter::update

use std::collections::HashSet;
use std::sync::{Mutex, RwLock};
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;
use tracing::debug;

use husky_types::{BufferKind, ClusterMeta, SuggestMode, NA};

use crate::buffer::{BuffWatcher, SuggestModeListener};
use crate::history::HistoryListener;
use crate::tst::{string_search, SortMode, TernarySearchTree};

/// Index bucket fed from the command history store.
pub const BUCKET_HISTORY: &str = "history";
/// Index bucket fed from resource aliases.
pub const BUCKET_ALIASES: &str = "aliases";
/// Index bucket fed from the active cluster's namespaces.
pub const BUCKET_NAMESPACES: &str = "namespaces";
/// Index bucket holding the live-config keys; populated once, never refreshed.
pub const BUCKET_CONFIG_SET: &str = "k9sconfig-set";

/// Default minimum interval between two host refreshes.
pub const DEFAULT_REFRESH_RATE: Duration = Duration::from_secs(120);

/// Host callback repopulating the buckets via [`PromptAutocompleter::index`].
pub type UpdateFn = Box<dyn Fn(&PromptAutocompleter) + Send + Sync>;

/// Observes cluster/context switches.
pub trait ClusterInfoListener: Send + Sync {
    fn cluster_changed(&self, prev: &ClusterMeta, curr: &ClusterMeta);
}

// Verbs that either have no namespace dimension or take a non-namespace
// second argument. Anything not listed is assumed namespaced.
// TODO(prompt): replace with a per-verb completion descriptor once alias
// metadata carries one.
static DISABLE_NAMESPACE_FOR: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "alias",
        "aliases",
        "clusterrole",
        "clusterroles",
        "clusterrolebinding",
        "clusterrolebindings",
        "context",
        "contexts",
        "cr",
        "crb",
        "csr",
        "ctx",
        "namespace",
        "namespaces",
        "ns",
        "k9sconfig-set",
    ])
});

fn is_resource_namespaced(resource: &str) -> bool {
    !DISABLE_NAMESPACE_FOR.contains(resource)
}

struct Indices {
    history: TernarySearchTree,
    aliases: TernarySearchTree,
    namespaces: TernarySearchTree,
    config_set: TernarySearchTree,
    mode: SuggestMode,
    last_refresh: Option<Instant>,
    cluster: String,
    context: String,
}

impl Indices {
    fn new() -> Self {
        Self {
            history: TernarySearchTree::new(),
            aliases: TernarySearchTree::new(),
            namespaces: TernarySearchTree::new(),
            config_set: TernarySearchTree::new(),
            mode: SuggestMode::AutoComplete,
            last_refresh: None,
            cluster: String::new(),
            context: String::new(),
        }
    }

    // The config-set bucket is a static enumeration and survives resets.
    fn reset(&mut self) {
        self.history.reset();
        self.aliases.reset();
        self.namespaces.reset();
    }
}

/// Real-time suggestion source for the command prompt.
pub struct PromptAutocompleter {
    indices: RwLock<Indices>,
    refresh_gate: Mutex<()>,
    refresh_rate: Duration,
    update_fn: UpdateFn,
}

impl PromptAutocompleter {
    pub fn new(update_fn: UpdateFn, refresh_rate: Duration) -> Self {
        Self {
            indices: RwLock::new(Indices::new()),
            refresh_gate: Mutex::new(()),
            refresh_rate,
            update_fn,
        }
    }

    /// Clears the cluster-derived buckets.
    pub fn reset(&self) {
        self.indices
            .write()
            .expect("autocompleter lock poisoned")
            .reset();
    }

    /// Replaces a bucket's vocabulary. History is supplied most-recent-first
    /// and reversed before syncing so slot positions track recency. Unknown
    /// bucket names are ignored.
    pub fn index(&self, bucket: &str, words: &[String]) {
        let mut indices = self.indices.write().expect("autocompleter lock poisoned");
        match bucket {
            BUCKET_HISTORY => {
                let mut words = words.to_vec();
                words.reverse();
                indices.history.sync(&words);
            }
            BUCKET_ALIASES => indices.aliases.sync(words),
            BUCKET_NAMESPACES => indices.namespaces.sync(words),
            BUCKET_CONFIG_SET => indices.config_set.sync(words),
            _ => {}
        }
    }

    fn need_refresh(&self) -> bool {
        let indices = self.indices.read().expect("autocompleter lock poisoned");
        match indices.last_refresh {
            None => true,
            Some(at) => at.elapsed() > self.refresh_rate,
        }
    }

    /// Guarantees the next [`update`](Self::update) invokes the host callback.
    fn force_refresh(&self) {
        self.indices
            .write()
            .expect("autocompleter lock poisoned")
            .last_refresh = None;
    }

    fn refreshed(&self) {
        self.indices
            .write()
            .expect("autocompleter lock poisoned")
            .last_refresh = Some(Instant::now());
    }

    /// Invokes the host callback when the refresh window elapsed. Concurrent
    /// callers queue on the gate; the second one finds the window fresh and
    /// returns without a second callback.
    pub fn update(&self) {
        let _gate = self.refresh_gate.lock().expect("refresh gate poisoned");
        if self.need_refresh() {
            debug!("refreshing prompt indices");
            (self.update_fn)(self);
            self.refreshed();
        }
    }

    /// The no-query view: aliases alphabetically, namespaces (full-text mode
    /// only) alphabetically, then history oldest first.
    pub fn all(&self) -> Vec<String> {
        let indices = self.indices.read().expect("autocompleter lock poisoned");
        let mut entries =
            Vec::with_capacity(indices.aliases.len() + indices.namespaces.len() + indices.history.len());

        let mut aliases = indices.aliases.words();
        aliases.sort_unstable();
        entries.extend(aliases);

        if indices.mode == SuggestMode::FullText {
            let mut namespaces = indices.namespaces.words();
            namespaces.sort_unstable();
            entries.extend(namespaces);
        }

        entries.extend(indices.history.words());
        entries
    }

    /// Substring search across history, namespaces, and aliases, in that
    /// order.
    pub fn search(&self, text: &str) -> Vec<String> {
        let indices = self.indices.read().expect("autocompleter lock poisoned");
        let text = text.to_lowercase();

        let mut entries = Vec::with_capacity(20);
        entries.extend(string_search(indices.history.slots(), &text, SortMode::ByPosition));
        entries.extend(string_search(indices.namespaces.slots(), &text, SortMode::ByWord));
        entries.extend(string_search(indices.aliases.slots(), &text, SortMode::ByWord));
        entries
    }

    /// Prefix completion with two-term awareness: history hits come first
    /// (newest rotated to the top), then either alias completions for a lone
    /// term or second-term completions drawn from the verb's target bucket.
    pub fn autocomplete(&self, text: &str) -> Vec<String> {
        let indices = self.indices.read().expect("autocompleter lock poisoned");

        let mut entries: Vec<String> = Vec::with_capacity(20);
        if text.starts_with(' ') {
            return entries;
        }

        let text = text.to_lowercase();
        let mut terms: Vec<&str> = text.split_whitespace().collect();
        if terms.len() == 1 && text.ends_with(' ') {
            terms.push("");
        }

        // History hits, newest on top, chronological below.
        let matches = indices.history.autocomplete(&text, SortMode::ByPosition);
        if let Some((newest, rest)) = matches.split_last() {
            entries.push(newest.clone());
            entries.extend_from_slice(rest);
        }

        match terms.len() {
            1 => {
                // Aliases only when history had nothing to offer.
                if entries.is_empty() {
                    entries.extend(indices.aliases.autocomplete(&text, SortMode::ByWord));
                }
            }
            2 => {
                // A committed second term takes no further completion.
                if !terms[1].is_empty() && text.ends_with(' ') {
                    return entries;
                }

                let target = if terms[0] == BUCKET_CONFIG_SET {
                    &indices.config_set
                } else if is_resource_namespaced(terms[0]) {
                    &indices.namespaces
                } else {
                    return entries;
                };

                if terms[1].is_empty() {
                    entries.extend(target.words());
                } else {
                    let matches = target.autocomplete(terms[1], SortMode::ByWord);
                    if !matches.is_empty() {
                        let blank = text.rfind(' ').unwrap_or(0);
                        for word in matches {
                            let suggestion = format!("{}{}", &text[..blank + 1], word);
                            // Don't repeat a command history already offers.
                            if !indices.history.has(&suggestion) {
                                entries.push(suggestion);
                            }
                        }
                    }
                }
            }
            _ => {}
        }

        entries
    }

    /// Entry point for the prompt: empty text yields the no-query view,
    /// otherwise the active mode picks the strategy.
    pub fn suggest(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return self.all();
        }
        let mode = self
            .indices
            .read()
            .expect("autocompleter lock poisoned")
            .mode;
        match mode {
            SuggestMode::AutoComplete => self.autocomplete(text),
            SuggestMode::FullText => self.search(text),
        }
    }
}

impl BuffWatcher for PromptAutocompleter {
    fn buffer_changed(&self, _text: &str, _suggestion: &str) {}

    fn buffer_completed(&self, _text: &str, _suggestion: &str) {}

    fn buffer_active(&self, active: bool, _kind: BufferKind) {
        if active {
            self.update();
        }
    }
}

impl SuggestModeListener for PromptAutocompleter {
    fn suggest_mode_changed(&self, mode: SuggestMode) {
        self.indices
            .write()
            .expect("autocompleter lock poisoned")
            .mode = mode;
        self.update();
    }
}

impl HistoryListener for PromptAutocompleter {
    fn history_changed(&self, commands: &[String]) {
        self.index(BUCKET_HISTORY, commands);
    }
}

impl ClusterInfoListener for PromptAutocompleter {
    /// A switch to a different cluster or context drops the indexed
    /// vocabularies and forces the next update through.
    fn cluster_changed(&self, _prev: &ClusterMeta, curr: &ClusterMeta) {
        {
            let mut indices = self.indices.write().expect("autocompleter lock poisoned");
            let unchanged = curr.cluster != NA
                && indices.cluster == curr.cluster
                && indices.context != NA
                && indices.context == curr.context;
            if unchanged {
                return;
            }
            indices.cluster = curr.cluster.clone();
            indices.context = curr.context.clone();
            indices.reset();
        }
        self.force_refresh();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn strings(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn seeded() -> PromptAutocompleter {
        let completer = PromptAutocompleter::new(Box::new(|_| {}), DEFAULT_REFRESH_RATE);
        completer.index(BUCKET_HISTORY, &strings(&["history1", "history2 ns2"]));
        completer.index(BUCKET_ALIASES, &strings(&["alias1", "alias2"]));
        completer.index(BUCKET_NAMESPACES, &strings(&["ns1", "ns2"]));
        completer
    }

    #[test]
    fn single_term_completes_aliases() {
        let completer = seeded();
        assert_eq!(completer.suggest("a"), strings(&["alias1", "alias2"]));
        assert_eq!(completer.suggest("ali"), strings(&["alias1", "alias2"]));
        assert_eq!(completer.suggest("alias2"), strings(&["alias2"]));
    }

    #[test]
    fn second_term_completes_namespaces() {
        let completer = seeded();
        assert_eq!(
            completer.suggest("alias1 n"),
            strings(&["alias1 ns1", "alias1 ns2"])
        );
    }

    #[test]
    fn history_hit_is_rotated_to_the_top() {
        let completer = seeded();
        assert_eq!(
            completer.suggest("history2 n"),
            strings(&["history2 ns2", "history2 ns1"])
        );
    }

    #[test]
    fn leading_space_suggests_nothing() {
        let completer = seeded();
        assert!(completer.suggest(" a").is_empty());
    }

    #[test]
    fn committed_second_term_stops_completion() {
        let completer = seeded();
        assert!(completer.suggest("alias1 ns1 ").is_empty());
    }

    #[test]
    fn blank_second_term_lists_whole_bucket() {
        let completer = seeded();
        assert_eq!(completer.suggest("alias1 "), strings(&["ns1", "ns2"]));
    }

    #[test]
    fn namespace_frozen_verbs_get_no_second_term() {
        let completer = seeded();
        assert!(completer.suggest("ctx n").is_empty());
        assert!(completer.suggest("contexts n").is_empty());
    }

    #[test]
    fn config_set_verb_targets_config_keys() {
        let completer = seeded();
        completer.index(BUCKET_CONFIG_SET, &strings(&["logger.tail", "ui.headless"]));
        assert_eq!(
            completer.suggest("k9sconfig-set log"),
            strings(&["k9sconfig-set logger.tail"])
        );
    }

    #[test]
    fn empty_text_lists_aliases_then_history() {
        let completer = seeded();
        assert_eq!(
            completer.suggest(""),
            strings(&["alias1", "alias2", "history2 ns2", "history1"])
        );
    }

    #[test]
    fn full_text_mode_searches_substrings() {
        let completer = seeded();
        completer.suggest_mode_changed(SuggestMode::FullText);
        assert_eq!(
            completer.suggest("ns2"),
            strings(&["history2 ns2", "ns2"])
        );
    }

    #[test]
    fn full_text_all_includes_namespaces() {
        let completer = seeded();
        completer.suggest_mode_changed(SuggestMode::FullText);
        assert_eq!(
            completer.suggest(""),
            strings(&["alias1", "alias2", "ns1", "ns2", "history2 ns2", "history1"])
        );
    }

    #[test]
    fn input_is_lowercased() {
        let completer = seeded();
        assert_eq!(completer.suggest("ALIAS1 N"), strings(&["alias1 ns1", "alias1 ns2"]));
    }

    #[test]
    fn unknown_bucket_is_ignored() {
        let completer = seeded();
        completer.index("bogus", &strings(&["zzz"]));
        assert!(completer.suggest("z").is_empty());
    }

    #[test]
    fn update_respects_refresh_window() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let completer = PromptAutocompleter::new(
            Box::new(move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            }),
            Duration::from_secs(300),
        );

        completer.update();
        completer.update();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cluster_switch_resets_and_forces_refresh() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let completer = PromptAutocompleter::new(
            Box::new(move |completer| {
                seen.fetch_add(1, Ordering::SeqCst);
                completer.index(BUCKET_ALIASES, &strings(&["alias1"]));
            }),
            Duration::from_secs(300),
        );

        completer.update();
        completer.index(BUCKET_NAMESPACES, &strings(&["ns1"]));

        let prev = ClusterMeta::unknown();
        let curr = ClusterMeta::new("prod", "prod-admin");
        completer.cluster_changed(&prev, &curr);

        // Buckets dropped, next update goes through despite the window.
        assert!(completer.suggest("alias1 n").is_empty());
        completer.update();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // Same cluster and context again is a no-op.
        completer.cluster_changed(&curr, &curr);
        completer.update();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn history_listener_reindexes() {
        let completer = seeded();
        completer.history_changed(&strings(&["deploy fred", "po blee"]));
        assert_eq!(completer.suggest("po"), strings(&["po blee"]));
    }
}
