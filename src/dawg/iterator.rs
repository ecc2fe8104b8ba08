//! Lazy word enumeration with prefix and wildcard matching.
//!
//! The iterator drives an explicit depth-first stack instead of recursion,
//! so words are produced one at a time with no work between calls. It
//! captures the graph's version stamp at creation; any successful mutation
//! afterwards makes every subsequent `next()` yield
//! [`DawgError::StaleIterator`] rather than partial or wrong results.

use std::sync::Arc;

use parking_lot::RwLock;

use super::{DawgError, DawgInner};

/// How a word's length must relate to the pattern's length for the word to
/// be emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Only words exactly as long as the pattern.
    ExactLength,
    /// Words at least as long as the pattern (the pattern acts as a
    /// template for their head).
    AtLeastPrefix,
    /// Words no longer than the pattern.
    AtMostPrefix,
}

struct StackItem {
    node: usize,
    depth: usize,
    letter: u8,
}

/// Lazy iterator over words matching a pattern.
///
/// Created by [`Dawg::find_all`](super::Dawg::find_all); yields
/// `Result<String, DawgError>` so staleness surfaces in-band.
pub struct WordIter {
    inner: Arc<RwLock<DawgInner>>,
    version: u64,
    stack: Vec<StackItem>,
    /// Letters of the current path, grown on demand; slot 0 belongs to the
    /// root and stays unused, slot `d` holds the letter that entered the
    /// depth-`d` node.
    buffer: Vec<u8>,
    pattern: Vec<u8>,
    wildcard: Option<u8>,
    kind: MatchKind,
}

impl WordIter {
    pub(crate) fn new(
        inner: Arc<RwLock<DawgInner>>,
        pattern: &[u8],
        wildcard: Option<u8>,
        kind: MatchKind,
    ) -> Self {
        let (version, root) = {
            let guard = inner.read();
            (guard.version, guard.root)
        };
        WordIter {
            inner,
            version,
            stack: vec![StackItem {
                node: root,
                depth: 0,
                letter: 0,
            }],
            buffer: Vec::new(),
            pattern: pattern.to_vec(),
            wildcard,
            kind,
        }
    }

    /// True when a word ending at `depth` satisfies the mode's length
    /// predicate.
    fn emits_at(&self, depth: usize) -> bool {
        match self.kind {
            MatchKind::ExactLength => depth == self.pattern.len(),
            MatchKind::AtLeastPrefix => depth >= self.pattern.len(),
            MatchKind::AtMostPrefix => depth <= self.pattern.len(),
        }
    }
}

impl Iterator for WordIter {
    type Item = Result<String, DawgError>;

    fn next(&mut self) -> Option<Self::Item> {
        let inner = self.inner.read();
        if inner.version != self.version {
            return Some(Err(DawgError::StaleIterator));
        }

        while let Some(item) = self.stack.pop() {
            if item.depth >= self.buffer.len() {
                self.buffer.resize(item.depth + 1, 0);
            }
            self.buffer[item.depth] = item.letter;

            // Children sit at pattern position `item.depth`. Past the
            // pattern's end only AtLeastPrefix can still emit, so the other
            // modes stop expanding there.
            let depth = item.depth;
            if depth < self.pattern.len() {
                let symbol = self.pattern[depth];
                if self.wildcard == Some(symbol) {
                    for (letter, child) in inner.arena.get(item.node).edges.iter().rev() {
                        self.stack.push(StackItem {
                            node: *child,
                            depth: depth + 1,
                            letter: *letter,
                        });
                    }
                } else if let Some(child) = inner.arena.get_child(item.node, symbol) {
                    self.stack.push(StackItem {
                        node: child,
                        depth: depth + 1,
                        letter: symbol,
                    });
                }
            } else if self.kind == MatchKind::AtLeastPrefix {
                for (letter, child) in inner.arena.get(item.node).edges.iter().rev() {
                    self.stack.push(StackItem {
                        node: *child,
                        depth: depth + 1,
                        letter: *letter,
                    });
                }
            }

            if self.emits_at(depth) && inner.arena.get(item.node).eow {
                let word = String::from_utf8_lossy(&self.buffer[1..=depth]).into_owned();
                return Some(Ok(word));
            }
        }

        None
    }
}
