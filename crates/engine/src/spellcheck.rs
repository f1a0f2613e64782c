//! Single-edit spell checking against an indexed vocabulary.
//!
//! The checker generates every edit-distance-1 variation of the input over
//! the resource-name alphabet, keeps the ones the reference tree can extend,
//! and expands each survivor into full-word suggestions. It rescues the common
//! class of prompt typos (`pdo`, `delpoy`) without any fuzzy-matching machinery.

use std::sync::Arc;

use crate::tst::{Node, SortMode, TernarySearchTree};

/// Characters resource names are made of; variations only draw from these.
const SYMBOLS: &str = "abcdefghijklmnopqrstuvwxyz-/.";

/// Inputs shorter than this produce no candidates; one-edit expansion of a
/// couple of characters matches half the vocabulary.
pub const DEFAULT_MINIMUM_WORD_LENGTH: usize = 3;

/// A possible correction for a misspelled word.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    /// The repaired variation the suggestion was derived from.
    pub word: String,
    /// A full vocabulary word extending the variation.
    pub suggestion: String,
    /// Ranking score, reserved.
    pub score: i64,
}

/// Produces correction candidates for prompt input.
pub trait SpellChecker {
    fn candidates(&self, word: &str) -> Vec<Candidate>;
}

/// Edit-distance-1 checker resolving variations through a reference tree.
pub struct NaiveSpellChecker<'t> {
    tree: &'t TernarySearchTree,
    minimum_word_length: usize,
}

impl<'t> NaiveSpellChecker<'t> {
    pub fn new(tree: &'t TernarySearchTree, minimum_word_length: usize) -> Self {
        Self {
            tree,
            minimum_word_length,
        }
    }

    /// Drop one character at a time.
    fn delete(&self, word: &str, candidates: &mut Vec<String>) {
        for i in 0..word.len() {
            let candidate = format!("{}{}", &word[..i], &word[i + 1..]);
            if self.tree.has_prefix(&candidate) {
                candidates.push(candidate);
            }
        }
    }

    /// Swap each adjacent character pair.
    fn transpose(&self, word: &str, candidates: &mut Vec<String>) {
        let mut buf = word.as_bytes().to_vec();
        for i in 0..word.len().saturating_sub(1) {
            buf.swap(i, i + 1);
            let candidate = String::from_utf8_lossy(&buf).into_owned();
            if self.tree.has_prefix(&candidate) {
                candidates.push(candidate);
            }
            buf.swap(i, i + 1);
        }
    }

    /// Substitute each character, resolving the tail below the node the
    /// unchanged prefix lands on so the shared walk happens once per index.
    fn replace(&self, word: &str, candidates: &mut Vec<String>) {
        for i in 0..word.len() {
            let anchor: Option<&Node> = if i == 0 {
                Some(self.tree.root())
            } else {
                self.tree
                    .root()
                    .lookup(&word[..i])
                    .and_then(Node::equal_child)
            };
            let Some(anchor) = anchor else {
                continue;
            };
            for symbol in SYMBOLS.chars() {
                let candidate = format!("{}{}{}", &word[..i], symbol, &word[i + 1..]);
                if anchor.lookup(&candidate[i..]).is_some() {
                    candidates.push(candidate);
                }
            }
        }
    }

    /// Insert each alphabet character at each position, the end included.
    fn insert(&self, word: &str, candidates: &mut Vec<String>) {
        for i in 0..=word.len() {
            for symbol in SYMBOLS.chars() {
                let candidate = format!("{}{}{}", &word[..i], symbol, &word[i..]);
                if self.tree.has_prefix(&candidate) {
                    candidates.push(candidate);
                }
            }
        }
    }

    /// Every edit-distance-1 variation of `word` the reference tree can
    /// extend, deduplicated, first occurrence wins the slot.
    fn variations(&self, word: &str) -> Vec<String> {
        let mut candidates = Vec::with_capacity(100);
        self.delete(word, &mut candidates);
        self.transpose(word, &mut candidates);
        self.replace(word, &mut candidates);
        self.insert(word, &mut candidates);
        unique(candidates)
    }
}

impl SpellChecker for NaiveSpellChecker<'_> {
    /// All corrections at one edit distance. Suggestions shorter than the
    /// input are dropped, and when several variations reach the same
    /// suggestion the last one keeps the slot.
    fn candidates(&self, word: &str) -> Vec<Candidate> {
        if word.len() < self.minimum_word_length {
            return Vec::new();
        }

        let mut results: Vec<Candidate> = Vec::with_capacity(20);
        let mut seen = Node::sentinel();
        for variation in self.variations(word) {
            for suggestion in self.tree.autocomplete(&variation, SortMode::ByWord) {
                if suggestion.len() < word.len() {
                    continue;
                }
                match seen.lookup(&suggestion).and_then(Node::position) {
                    Some(index) => {
                        results[index] = Candidate {
                            word: variation.clone(),
                            suggestion,
                            score: 0,
                        };
                    }
                    None => {
                        let key: Arc<str> = Arc::from(suggestion.as_str());
                        seen.insert(&key, results.len());
                        results.push(Candidate {
                            word: variation.clone(),
                            suggestion,
                            score: 0,
                        });
                    }
                }
            }
        }
        results
    }
}

/// Order-preserving dedup through a scratch tree.
fn unique(words: Vec<String>) -> Vec<String> {
    let mut results = TernarySearchTree::new();
    for word in words {
        if !results.has(&word) {
            results.insert(&word);
        }
    }
    results.words()
}
