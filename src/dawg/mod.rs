//! DAWG dictionary: construction, queries, statistics.
//!
//! [`Dawg`] is a cheaply cloneable handle over shared inner state. Words are
//! added in strictly increasing lexicographic order while the builder
//! minimizes proven-final suffixes incrementally, so the graph is minimal
//! the moment it is [`close`](Dawg::close)d. Letters are bytes; byte-wise
//! lexicographic order over UTF-8 coincides with code-point order, so any
//! sorted list of Unicode strings is valid input.

pub(crate) mod builder;
pub mod iterator;
mod mph;
pub(crate) mod node;
pub(crate) mod registry;
pub(crate) mod traverse;

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;

use self::iterator::{MatchKind, WordIter};
use self::node::NodeArena;
use self::registry::{BucketTable, INITIAL_BUCKETS};
use crate::serialization::{self, LoadError};

/// Errors surfaced by mutation and iteration.
///
/// Read-only queries never error; absence of a word is a `false`/`None`
/// result, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DawgError {
    /// Order-checked insertion received a word not strictly greater than
    /// the previously accepted one. The graph is unchanged.
    #[error("words must be added in strictly increasing order")]
    WordOrderViolation,
    /// Mutation attempted after [`Dawg::close`].
    #[error("dawg is closed, no further words can be added")]
    Frozen,
    /// The underlying graph changed after the iterator was created.
    #[error("underlying graph has changed, iterator is no longer valid")]
    StaleIterator,
}

/// Outcome of a successful insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddResult {
    /// The word was not present before.
    Created,
    /// The word was already accepted; nothing changed.
    AlreadyExists,
}

/// Lifecycle state of the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DawgState {
    /// No words accepted yet.
    Empty,
    /// Words accepted, further insertion possible.
    Active,
    /// Fully minimized; insertion is rejected with [`DawgError::Frozen`].
    Closed,
}

/// Size and shape counters for the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DawgStats {
    /// Distinct nodes reachable from the root.
    pub nodes_count: usize,
    /// Total edges over those nodes.
    pub edges_count: usize,
    /// Distinct accepted words.
    pub words_count: usize,
    /// Length in bytes of the longest accepted word.
    pub longest_word: usize,
    /// In-memory size of one node record.
    pub sizeof_node: usize,
    /// Total structural size: node records plus edge arrays.
    pub graph_size: usize,
}

pub(crate) struct DawgInner {
    pub(crate) arena: NodeArena,
    pub(crate) root: usize,
    pub(crate) count: usize,
    pub(crate) longest_word: usize,
    pub(crate) state: DawgState,
    pub(crate) prev_word: Vec<u8>,
    pub(crate) registry: BucketTable<usize, ()>,
    /// Bumped on every successful structural mutation; the sole staleness
    /// mechanism for outstanding iterators.
    pub(crate) version: u64,
    generation: u32,
    pub(crate) numbered_version: Option<u64>,
    stats_cache: Option<(u64, DawgStats)>,
}

impl DawgInner {
    pub(crate) fn new() -> Self {
        DawgInner {
            arena: NodeArena::new(),
            root: 0,
            count: 0,
            longest_word: 0,
            state: DawgState::Empty,
            prev_word: Vec::new(),
            registry: BucketTable::new(INITIAL_BUCKETS),
            version: 0,
            generation: 0,
            numbered_version: None,
            stats_cache: None,
        }
    }

    /// Hand out a fresh generation value for a visit-once traversal.
    /// On wraparound every marker is cleared once before continuing.
    pub(crate) fn next_generation(&mut self) -> u32 {
        if self.generation == u32::MAX {
            self.arena.clear_marks();
            self.generation = 0;
        }
        self.generation += 1;
        self.generation
    }

    /// Walk the match path for `word`. Returns the number of letters
    /// consumed and the last node reached.
    pub(crate) fn find(&self, word: &[u8]) -> (usize, usize) {
        let mut node = self.root;
        let mut i = 0;
        while i < word.len() {
            match self.arena.get_child(node, word[i]) {
                Some(next) => {
                    node = next;
                    i += 1;
                }
                None => break,
            }
        }
        (i, node)
    }

    pub(crate) fn contains(&self, word: &[u8]) -> bool {
        let (len, node) = self.find(word);
        len == word.len() && self.arena.get(node).eow
    }

    fn words(&self) -> Vec<String> {
        let mut words = Vec::with_capacity(self.count);
        let mut buffer = Vec::with_capacity(self.longest_word);
        self.words_aux(self.root, &mut buffer, &mut words);
        words
    }

    fn words_aux(&self, node: usize, buffer: &mut Vec<u8>, words: &mut Vec<String>) {
        if self.arena.get(node).eow {
            words.push(String::from_utf8_lossy(buffer).into_owned());
        }
        let n = self.arena.get(node).edges.len();
        for i in 0..n {
            let (letter, child) = self.arena.get(node).edges[i];
            buffer.push(letter);
            self.words_aux(child, buffer, words);
            buffer.pop();
        }
    }

    fn stats(&mut self) -> DawgStats {
        if let Some((version, cached)) = self.stats_cache {
            if version == self.version {
                return cached;
            }
        }

        let mut nodes_count = 0;
        let mut edges_count = 0;
        let mut graph_size = 0;
        let generation = self.next_generation();
        traverse::postorder_once(&mut self.arena, generation, self.root, &mut |arena, idx, _| {
            nodes_count += 1;
            edges_count += arena.get(idx).edges.len();
            graph_size += arena.node_size(idx);
        });

        let stats = DawgStats {
            nodes_count,
            edges_count,
            words_count: self.count,
            longest_word: self.longest_word,
            sizeof_node: std::mem::size_of::<node::Node>(),
            graph_size,
        };
        self.stats_cache = Some((self.version, stats));
        stats
    }

    fn to_dot(&self) -> String {
        let mut nodes: HashSet<usize> = HashSet::new();
        let mut edges: HashSet<(usize, u8, usize)> = HashSet::new();
        traverse::preorder(&self.arena, self.root, &mut |idx, _| {
            let first_visit = nodes.insert(idx);
            for (letter, child) in &self.arena.get(idx).edges {
                edges.insert((idx, *letter, *child));
            }
            first_visit
        });

        let mut out = String::from("digraph dawg {\n");
        let mut sorted_nodes: Vec<usize> = nodes.into_iter().collect();
        sorted_nodes.sort_unstable();
        for idx in sorted_nodes {
            let shape = if self.arena.get(idx).eow {
                "doublecircle"
            } else {
                "circle"
            };
            out.push_str(&format!("  node{idx} [shape={shape}, label=\"\"]\n"));
        }
        let mut sorted_edges: Vec<(usize, u8, usize)> = edges.into_iter().collect();
        sorted_edges.sort_unstable();
        for (from, letter, to) in sorted_edges {
            out.push_str(&format!(
                "  node{from} -> node{to} [label=\"{}\"]\n",
                letter as char
            ));
        }
        out.push_str("}\n");
        out
    }
}

/// A minimized acyclic word graph.
///
/// Cloning the handle shares the underlying graph; mutations through any
/// clone are visible to all and invalidate outstanding iterators via the
/// version stamp. Reads take a shared lock and may run concurrently.
#[derive(Clone)]
pub struct Dawg {
    pub(crate) inner: Arc<RwLock<DawgInner>>,
}

impl Dawg {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Dawg {
            inner: Arc::new(RwLock::new(DawgInner::new())),
        }
    }

    /// Build a closed dictionary from arbitrary terms: sorts, deduplicates,
    /// inserts, and minimizes.
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut sorted: Vec<String> = terms.into_iter().map(|s| s.as_ref().to_string()).collect();
        sorted.sort();
        sorted.dedup();

        let dawg = Dawg::new();
        {
            let mut inner = dawg.inner.write();
            for term in &sorted {
                inner.insert_word(term.as_bytes());
            }
            inner.close();
        }
        dawg
    }

    /// Add a word, enforcing strictly increasing lexicographic order.
    ///
    /// Returns [`AddResult::Created`] for a new word,
    /// [`AddResult::AlreadyExists`] if it was already accepted.
    ///
    /// # Errors
    ///
    /// [`DawgError::Frozen`] after [`close`](Self::close);
    /// [`DawgError::WordOrderViolation`] when `word` is not strictly greater
    /// than the previously added word (the graph is left unchanged).
    pub fn add_word(&self, word: &str) -> Result<AddResult, DawgError> {
        let mut inner = self.inner.write();
        if inner.state == DawgState::Closed {
            return Err(DawgError::Frozen);
        }
        if word.as_bytes() <= inner.prev_word.as_slice() {
            return Err(DawgError::WordOrderViolation);
        }
        Ok(inner.insert_word(word.as_bytes()))
    }

    /// Add a word without the order check.
    ///
    /// The incremental minimization still assumes sorted input; feeding
    /// unsorted words produces a correct trie-like graph for lookups but
    /// forfeits minimality guarantees.
    ///
    /// # Errors
    ///
    /// [`DawgError::Frozen`] after [`close`](Self::close).
    pub fn add_word_unchecked(&self, word: &str) -> Result<AddResult, DawgError> {
        let mut inner = self.inner.write();
        if inner.state == DawgState::Closed {
            return Err(DawgError::Frozen);
        }
        Ok(inner.insert_word(word.as_bytes()))
    }

    /// Check whether `word` is an accepted word.
    pub fn contains(&self, word: &str) -> bool {
        self.inner.read().contains(word.as_bytes())
    }

    /// True when at least one leading byte of `word` can be walked from the
    /// root, i.e. [`longest_prefix`](Self::longest_prefix) is nonzero.
    pub fn matches(&self, word: &str) -> bool {
        self.longest_prefix(word) > 0
    }

    /// Length of the longest prefix of `word` that forms a path from the
    /// root.
    pub fn longest_prefix(&self, word: &str) -> usize {
        self.inner.read().find(word.as_bytes()).0
    }

    /// All accepted words, in lexicographic order.
    pub fn words(&self) -> Vec<String> {
        self.inner.read().words()
    }

    /// Lazily enumerate words matching `pattern` under the given mode.
    ///
    /// Each byte of `pattern` must match the word byte at the same position,
    /// except positions holding `wildcard` (when supplied), which match any
    /// single byte. [`MatchKind`] decides how word length relates to pattern
    /// length. The iterator captures the current version stamp; any later
    /// mutation makes `next()` yield [`DawgError::StaleIterator`].
    pub fn find_all(&self, pattern: &str, wildcard: Option<u8>, kind: MatchKind) -> WordIter {
        WordIter::new(Arc::clone(&self.inner), pattern.as_bytes(), wildcard, kind)
    }

    /// Iterate over every accepted word.
    pub fn iter(&self) -> WordIter {
        self.find_all("", None, MatchKind::AtLeastPrefix)
    }

    /// Number of distinct accepted words.
    pub fn word_count(&self) -> usize {
        self.inner.read().count
    }

    /// True when no words are accepted.
    pub fn is_empty(&self) -> bool {
        self.word_count() == 0
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DawgState {
        self.inner.read().state
    }

    /// Minimize all remaining states and freeze the graph. The registry is
    /// discarded; later insertion fails with [`DawgError::Frozen`].
    /// Idempotent.
    pub fn close(&self) {
        self.inner.write().close();
    }

    /// Drop every node and return to [`DawgState::Empty`]. Outstanding
    /// iterators become stale.
    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// Node, edge, and size counters. Computed by one visit-once traversal
    /// and cached until the next mutation.
    pub fn stats(&self) -> DawgStats {
        self.inner.write().stats()
    }

    /// Render the graph in Graphviz dot format (debugging aid).
    pub fn to_dot(&self) -> String {
        self.inner.read().to_dot()
    }

    /// Serialize the graph to its binary dump format.
    pub fn save(&self) -> Vec<u8> {
        serialization::save(&mut self.inner.write())
    }

    /// Serialize directly into a writer.
    ///
    /// # Errors
    ///
    /// Any I/O error from the writer.
    pub fn save_to<W: std::io::Write>(&self, mut writer: W) -> std::io::Result<()> {
        writer.write_all(&self.save())
    }

    /// Replace this graph's contents with a previously saved dump.
    ///
    /// On success the version stamp is bumped, so outstanding iterators go
    /// stale. On failure the graph is left untouched and every node
    /// allocated during the attempt is released.
    ///
    /// # Errors
    ///
    /// A [`LoadError`] describing the corruption found.
    pub fn load(&self, bytes: &[u8]) -> Result<(), LoadError> {
        let mut fresh = serialization::read_dawg(bytes)?;
        let mut inner = self.inner.write();
        fresh.version = inner.version + 1;
        *inner = fresh;
        Ok(())
    }

    /// Construct a new dictionary from a previously saved dump.
    ///
    /// # Errors
    ///
    /// A [`LoadError`] describing the corruption found.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LoadError> {
        let inner = serialization::read_dawg(bytes)?;
        Ok(Dawg {
            inner: Arc::new(RwLock::new(inner)),
        })
    }

    /// Deserialize from a reader.
    ///
    /// # Errors
    ///
    /// [`LoadError::Io`] for read failures, otherwise as
    /// [`from_bytes`](Self::from_bytes).
    pub fn load_from<R: std::io::Read>(mut reader: R) -> Result<Self, LoadError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
    }

    /// Rank of `word` in the minimal perfect hash numbering, in
    /// `1..=word_count()`. `None` when the word is not accepted.
    pub fn word_to_index(&self, word: &str) -> Option<usize> {
        self.inner.write().word_to_index(word.as_bytes())
    }

    /// The accepted word holding `rank` in the perfect hash numbering.
    /// `None` when `rank` is outside `1..=word_count()`.
    pub fn index_to_word(&self, rank: usize) -> Option<String> {
        self.inner.write().index_to_word(rank)
    }
}

impl Default for Dawg {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Dawg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("Dawg")
            .field("state", &inner.state)
            .field("words", &inner.count)
            .field("longest_word", &inner.longest_word)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_cat_dog_dogs() {
        let dawg = Dawg::new();
        assert_eq!(dawg.add_word("cat"), Ok(AddResult::Created));
        assert_eq!(dawg.add_word("dog"), Ok(AddResult::Created));
        assert_eq!(dawg.add_word("dogs"), Ok(AddResult::Created));

        assert!(dawg.contains("dog"));
        assert!(!dawg.contains("do"));
        assert!(dawg.matches("do"));
        assert_eq!(dawg.longest_prefix("doge"), 3);
        assert_eq!(dawg.words(), vec!["cat", "dog", "dogs"]);
        assert_eq!(dawg.stats().words_count, 3);
    }

    #[test]
    fn test_empty_dawg_queries() {
        let dawg = Dawg::new();
        assert_eq!(dawg.state(), DawgState::Empty);
        assert!(!dawg.contains(""));
        assert!(!dawg.matches("anything"));
        assert_eq!(dawg.longest_prefix("abc"), 0);
        assert!(dawg.words().is_empty());
        assert!(dawg.is_empty());
    }

    #[test]
    fn test_state_transitions() {
        let dawg = Dawg::new();
        assert_eq!(dawg.state(), DawgState::Empty);

        dawg.add_word("alpha").unwrap();
        assert_eq!(dawg.state(), DawgState::Active);

        dawg.close();
        assert_eq!(dawg.state(), DawgState::Closed);
        assert_eq!(dawg.add_word("beta"), Err(DawgError::Frozen));
        assert_eq!(dawg.add_word_unchecked("beta"), Err(DawgError::Frozen));

        dawg.clear();
        assert_eq!(dawg.state(), DawgState::Empty);
        assert_eq!(dawg.word_count(), 0);
        dawg.add_word("gamma").unwrap();
        assert!(dawg.contains("gamma"));
    }

    #[test]
    fn test_stats_cached_until_mutation() {
        let dawg = Dawg::from_terms(vec!["one", "two"]);
        let first = dawg.stats();
        assert_eq!(first, dawg.stats());
        assert_eq!(first.words_count, 2);
        assert!(first.graph_size >= first.nodes_count * first.sizeof_node);
        assert_eq!(first.longest_word, 3);
    }

    #[test]
    fn test_from_terms_sorts_and_dedups() {
        let dawg = Dawg::from_terms(vec!["pear", "apple", "pear", "fig"]);
        assert_eq!(dawg.word_count(), 3);
        assert_eq!(dawg.state(), DawgState::Closed);
        assert_eq!(dawg.words(), vec!["apple", "fig", "pear"]);
    }

    #[test]
    fn test_to_dot_mentions_every_word_letter() {
        let dawg = Dawg::from_terms(vec!["ab"]);
        let dot = dawg.to_dot();
        assert!(dot.starts_with("digraph"));
        assert!(dot.contains("label=\"a\""));
        assert!(dot.contains("label=\"b\""));
        assert!(dot.contains("doublecircle"));
    }

    #[test]
    fn test_clone_shares_graph() {
        let dawg = Dawg::new();
        let alias = dawg.clone();
        dawg.add_word("shared").unwrap();
        assert!(alias.contains("shared"));
    }
}
