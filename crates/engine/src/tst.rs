//! Ternary search tree backing the prompt's word indices.
//!
//! Each node carries one character and three children: `left`/`right` for
//! characters ordering below/above it, `equal` for the next character of the
//! indexed word. Compared to a plain trie this shares prefixes without paying
//! for the full alphabet fan-out, which matters here because the tree is
//! rebuilt from cluster data every refresh window.
//!
//! Deletion is logical: word data is cleared but structural nodes stay, so
//! positions handed out to other words never shift. [`TernarySearchTree::sync`]
//! amortizes the cleanup by rebuilding once tombstones pass
//! [`DIRTY_THRESHOLD`].

use std::collections::HashSet;
use std::sync::Arc;

/// Ratio of tombstoned slots to live words above which `sync` rebuilds the
/// tree from scratch.
pub const DIRTY_THRESHOLD: f64 = 0.33;

/// Ordering applied to prefix-search results.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortMode {
    /// Natural in-order walk, which is lexicographic.
    ByWord,
    /// Ascending insertion slot, i.e. oldest insertion first.
    ByPosition,
}

/// Payload attached to a node once a word terminates on it.
#[derive(Debug)]
pub(crate) struct WordData {
    word: Arc<str>,
    position: usize,
    refcount: usize,
}

#[derive(Debug)]
pub(crate) struct Node {
    value: char,
    left: Option<Box<Node>>,
    right: Option<Box<Node>>,
    equal: Option<Box<Node>>,
    data: Option<WordData>,
}

impl Node {
    fn new(value: char) -> Self {
        Self {
            value,
            left: None,
            right: None,
            equal: None,
            data: None,
        }
    }

    /// A root placeholder; it adopts the first character of the first
    /// inserted word.
    pub(crate) fn sentinel() -> Self {
        Self::new('\0')
    }

    fn is_word(&self) -> bool {
        self.data.is_some()
    }

    /// Insertion slot recorded for the word terminating here, if any.
    pub(crate) fn position(&self) -> Option<usize> {
        self.data.as_ref().map(|data| data.position)
    }

    pub(crate) fn equal_child(&self) -> Option<&Node> {
        self.equal.as_deref()
    }

    /// Adds `word` below this node, recording `position` on the terminal
    /// node. Re-inserting an existing word bumps its refcount and returns the
    /// slot it previously occupied.
    pub(crate) fn insert(&mut self, word: &Arc<str>, position: usize) -> Option<usize> {
        let bytes = word.as_bytes();
        if bytes.is_empty() {
            return None;
        }
        if self.value == '\0' {
            self.value = bytes[0] as char;
        }

        let mut node = self;
        let mut pos = 0;
        let mut c = bytes[0] as char;
        loop {
            if c < node.value {
                node = &mut **node.left.get_or_insert_with(|| Box::new(Node::new(c)));
            } else if c > node.value {
                node = &mut **node.right.get_or_insert_with(|| Box::new(Node::new(c)));
            } else {
                pos += 1;
                if pos == bytes.len() {
                    break;
                }
                c = bytes[pos] as char;
                node = &mut **node.equal.get_or_insert_with(|| Box::new(Node::new(c)));
            }
        }

        match node.data.as_mut() {
            Some(data) => {
                let prior = data.position;
                data.position = position;
                data.refcount += 1;
                Some(prior)
            }
            None => {
                node.data = Some(WordData {
                    word: Arc::clone(word),
                    position,
                    refcount: 1,
                });
                None
            }
        }
    }

    /// Descends along `word`, treating this node as the comparison point for
    /// its first character. Returns the node the final character lands on,
    /// whether or not a word terminates there.
    pub(crate) fn lookup(&self, word: &str) -> Option<&Node> {
        let bytes = word.as_bytes();
        if bytes.is_empty() {
            return None;
        }

        let mut node = self;
        let mut pos = 0;
        loop {
            let c = bytes[pos] as char;
            if c < node.value {
                node = node.left.as_deref()?;
            } else if c > node.value {
                node = node.right.as_deref()?;
            } else {
                pos += 1;
                if pos == bytes.len() {
                    return Some(node);
                }
                node = node.equal.as_deref()?;
            }
        }
    }

    fn lookup_mut(&mut self, word: &str) -> Option<&mut Node> {
        let bytes = word.as_bytes();
        if bytes.is_empty() {
            return None;
        }

        let mut node = self;
        let mut pos = 0;
        loop {
            let c = bytes[pos] as char;
            if c < node.value {
                node = node.left.as_deref_mut()?;
            } else if c > node.value {
                node = node.right.as_deref_mut()?;
            } else {
                pos += 1;
                if pos == bytes.len() {
                    return Some(node);
                }
                node = node.equal.as_deref_mut()?;
            }
        }
    }

    fn has(&self, word: &str) -> bool {
        self.lookup(word).is_some_and(Node::is_word)
    }

    /// Drops one reference to `word`. Once the refcount reaches zero the word
    /// data is cleared and the freed slot returned; the node itself stays so
    /// sibling positions remain valid.
    fn delete(&mut self, word: &str) -> Option<usize> {
        let node = self.lookup_mut(word)?;
        let data = node.data.as_mut()?;
        data.refcount -= 1;
        if data.refcount > 0 {
            return None;
        }
        let freed = data.position;
        node.data = None;
        Some(freed)
    }

    /// In-order visit: `left`, self, `equal`, `right`. Walking the `equal`
    /// subtree of a prefix node therefore yields its words lexicographically.
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Node)) {
        if let Some(left) = &self.left {
            left.walk(visit);
        }
        visit(self);
        if let Some(equal) = &self.equal {
            equal.walk(visit);
        }
        if let Some(right) = &self.right {
            right.walk(visit);
        }
    }

    fn prefix_search(&self, prefix: &str) -> Vec<&WordData> {
        let mut matches = Vec::new();
        let Some(node) = self.lookup(prefix) else {
            return matches;
        };

        if let Some(data) = &node.data {
            matches.push(data);
        }
        if let Some(equal) = &node.equal {
            equal.walk(&mut |node| {
                if let Some(data) = &node.data {
                    matches.push(data);
                }
            });
        }
        matches
    }
}

/// String index used for the prompt's vocabularies (history, aliases,
/// namespaces, config keys).
///
/// Not internally synchronized; the autocompleter serializes access.
#[derive(Debug)]
pub struct TernarySearchTree {
    root: Node,
    words: Vec<Option<Arc<str>>>,
    longest: usize,
    length: usize,
    dirty: usize,
}

impl Default for TernarySearchTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TernarySearchTree {
    pub fn new() -> Self {
        Self {
            root: Node::sentinel(),
            words: Vec::with_capacity(100),
            longest: 0,
            length: 0,
            dirty: 0,
        }
    }

    pub(crate) fn root(&self) -> &Node {
        &self.root
    }

    /// Slot storage in insertion order; `None` marks a tombstone.
    pub(crate) fn slots(&self) -> &[Option<Arc<str>>] {
        &self.words
    }

    /// Adds `word` at the next insertion slot. Re-inserting moves the word to
    /// the fresh slot (its previous one tombstones) so position order tracks
    /// the latest insertion and `words` never yields duplicates.
    pub fn insert(&mut self, word: &str) {
        if word.is_empty() {
            return;
        }
        let stored: Arc<str> = Arc::from(word);
        let slot = self.words.len();
        match self.root.insert(&stored, slot) {
            Some(prior) => {
                self.words.push(Some(stored));
                self.words[prior] = None;
                self.dirty += 1;
            }
            None => {
                self.words.push(Some(stored));
                self.length += 1;
            }
        }
        if word.len() > self.longest {
            self.longest = word.len();
        }
    }

    /// Bulk insert that leaves already-indexed words untouched. This is the
    /// `sync` building block: refreshing the same vocabulary twice must not
    /// inflate refcounts.
    pub fn insert_all<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in words {
            let word = word.as_ref();
            if word.is_empty() || self.root.has(word) {
                continue;
            }
            self.insert(word);
        }
    }

    pub fn has(&self, word: &str) -> bool {
        self.root.has(word)
    }

    /// True when some indexed word starts with `prefix`; word data is not
    /// required on the landing node.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.root.lookup(prefix).is_some()
    }

    /// Live word count, tombstones excluded.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn delete(&mut self, word: &str) {
        if let Some(freed) = self.root.delete(word) {
            self.words[freed] = None;
            self.length -= 1;
            self.dirty += 1;
        }
    }

    /// Live words in insertion order.
    pub fn words(&self) -> Vec<String> {
        self.words
            .iter()
            .flatten()
            .map(|word| word.to_string())
            .collect()
    }

    pub fn reset(&mut self) {
        self.root = Node::sentinel();
        self.length = 0;
        self.dirty = 0;
        self.longest = 0;
        if !self.words.is_empty() {
            self.words = Vec::with_capacity(100);
        }
    }

    /// All words starting with `prefix`, ordered per `sort`. The `longest`
    /// bound is a cheap negative for queries longer than anything stored.
    pub fn autocomplete(&self, prefix: &str, sort: SortMode) -> Vec<String> {
        if prefix.len() > self.longest {
            return Vec::new();
        }
        let mut matches = self.root.prefix_search(prefix);
        if sort == SortMode::ByPosition {
            matches.sort_unstable_by_key(|data| data.position);
        }
        matches.iter().map(|data| data.word.to_string()).collect()
    }

    /// Reconciles the live set with `words`: everything listed ends up
    /// indexed, everything else is deleted. Rebuilds from scratch first when
    /// the tombstone ratio exceeds [`DIRTY_THRESHOLD`].
    pub fn sync(&mut self, words: &[String]) {
        if words.is_empty() {
            self.reset();
            return;
        }
        if self.dirty as f64 > self.length as f64 * DIRTY_THRESHOLD {
            self.reset();
        }

        let indexed = self.words();
        self.insert_all(words);

        let keep: HashSet<&str> = words.iter().map(String::as_str).collect();
        for word in &indexed {
            if !keep.contains(word.as_str()) {
                self.delete(word);
            }
        }
    }
}

/// Linear substring scan over stored slots, the fallback for queries prefix
/// lookup cannot serve.
pub fn string_search(terms: &[Option<Arc<str>>], text: &str, sort: SortMode) -> Vec<String> {
    let mut matches: Vec<String> = terms
        .iter()
        .flatten()
        .filter(|term| !term.is_empty() && term.contains(text))
        .map(|term| term.to_string())
        .collect();
    if sort == SortMode::ByWord {
        matches.sort_unstable();
    }
    matches
}
