//! # husky engine
//!
//! The prompt model behind the husky dashboard: a ternary-search-tree word
//! index, the autocompleter orchestrating the cluster vocabularies, a naive
//! single-edit spellchecker, the command history, and the suggestion buffer
//! the TUI prompt feeds from.
//!
//! Everything here is synchronous; the autocompleter carries its own locking
//! so the UI loop and a background refresh can share it behind an `Arc`.

pub mod autocomplete;
pub mod buffer;
pub mod history;
pub mod spellcheck;
pub mod tst;

pub use autocomplete::{
    ClusterInfoListener, PromptAutocompleter, UpdateFn, BUCKET_ALIASES, BUCKET_CONFIG_SET,
    BUCKET_HISTORY, BUCKET_NAMESPACES, DEFAULT_REFRESH_RATE,
};
pub use buffer::{BuffWatcher, SuggestBuff, SuggestModeListener, SuggestionFunc};
pub use history::{History, HistoryListener, MAX_HISTORY};
pub use spellcheck::{Candidate, NaiveSpellChecker, SpellChecker, DEFAULT_MINIMUM_WORD_LENGTH};
pub use tst::{string_search, SortMode, TernarySearchTree, DIRTY_THRESHOLD};
