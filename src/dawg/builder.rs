//! Incremental construction and minimization.
//!
//! Insertion follows the sorted-input incremental algorithm: walk the common
//! prefix with the previous word, minimize the previous word's suffix beyond
//! the divergence point (that branch is proven final once a greater word
//! arrives), then grow the new suffix. `replace_or_register` works bottom-up,
//! so by the time a node is compared against the registry all of its
//! children are already canonical and index equality suffices.

use super::node::NodeArena;
use super::registry::Fnv1a;
use super::{AddResult, DawgInner, DawgState};

/// Content hash over (eow, edge count, (letter, child index) pairs).
/// Valid for equivalence grouping only while the children are canonical.
pub(crate) fn node_hash(arena: &NodeArena, idx: usize) -> u32 {
    let node = arena.get(idx);
    let mut hasher = Fnv1a::new();
    hasher.write_u8(node.eow as u8);
    hasher.write_usize(node.edges.len());
    for (letter, child) in &node.edges {
        hasher.write_u8(*letter);
        hasher.write_usize(*child);
    }
    hasher.finish()
}

/// Structural equivalence: same eow flag, same degree, pairwise identical
/// (letter, child-index) edges. Children are compared by identity, never
/// recursively; minimization guarantees they are canonical already.
fn equivalent(arena: &NodeArena, p: usize, q: usize) -> bool {
    let pn = arena.get(p);
    let qn = arena.get(q);
    pn.eow == qn.eow && pn.edges == qn.edges
}

impl DawgInner {
    /// Insert `word`, assuming lifecycle checks already passed.
    pub(crate) fn insert_word(&mut self, word: &[u8]) -> AddResult {
        debug_assert_ne!(self.state, DawgState::Closed);

        // 1. Skip the prefix that already exists.
        let (mut i, mut state) = self.find(word);

        // 2. The previous word's suffix beyond the divergence point can no
        //    longer change; minimize it now.
        let mut mutated = false;
        if i < self.prev_word.len() {
            let prev = std::mem::take(&mut self.prev_word);
            if let Some(next) = self.arena.get_child(state, prev[i]) {
                let replacement = self.replace_or_register(next, &prev, i + 1);
                if replacement != next {
                    self.arena.set_child(state, prev[i], replacement);
                    self.arena.free(next);
                }
            }
            mutated = true;
        }

        // 3. Grow the remaining suffix.
        while i < word.len() {
            let fresh = self.arena.alloc(false);
            self.arena.set_child(state, word[i], fresh);
            state = fresh;
            i += 1;
            mutated = true;
        }

        // 4. Mark the end of word.
        let result = if self.arena.get(state).eow {
            AddResult::AlreadyExists
        } else {
            self.arena.get_mut(state).eow = true;
            self.count += 1;
            self.longest_word = self.longest_word.max(word.len());
            mutated = true;
            AddResult::Created
        };

        if self.state == DawgState::Empty {
            self.state = DawgState::Active;
        }
        if mutated {
            self.version += 1;
        }
        self.prev_word = word.to_vec();
        result
    }

    /// Canonicalize the chain `word[index..]` hanging below `state`,
    /// deepest node first, then `state` itself. Returns the canonical node
    /// for `state`; when that differs from `state` the caller redirects its
    /// edge and frees the superseded node.
    fn replace_or_register(&mut self, state: usize, word: &[u8], index: usize) -> usize {
        if index < word.len() {
            let letter = word[index];
            if let Some(next) = self.arena.get_child(state, letter) {
                let replacement = self.replace_or_register(next, word, index + 1);
                if replacement != next {
                    self.arena.set_child(state, letter, replacement);
                    self.arena.free(next);
                }
            }
        }

        let hash = node_hash(&self.arena, state);
        if let Some((existing, ())) = self
            .registry
            .find(hash, |&candidate| equivalent(&self.arena, candidate, state))
        {
            return existing;
        }
        self.registry.insert(hash, state, ());
        state
    }

    /// Minimize everything still pending and freeze the graph.
    pub(crate) fn close(&mut self) {
        if self.state == DawgState::Closed {
            return;
        }
        if self.state == DawgState::Active {
            let prev = std::mem::take(&mut self.prev_word);
            let root = self.root;
            let replacement = self.replace_or_register(root, &prev, 0);
            if replacement != root {
                self.arena.free(root);
                self.root = replacement;
            }
        }
        self.registry.clear();
        self.state = DawgState::Closed;
        self.version += 1;
    }

    /// Drop every node and counter; the arena sweep frees the whole graph
    /// in one pass.
    pub(crate) fn clear(&mut self) {
        self.arena = NodeArena::new();
        self.root = 0;
        self.count = 0;
        self.longest_word = 0;
        self.state = DawgState::Empty;
        self.prev_word.clear();
        self.registry.clear();
        self.numbered_version = None;
        self.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dawg::{Dawg, DawgError};

    fn reachable_nodes(dawg: &Dawg) -> usize {
        dawg.stats().nodes_count
    }

    #[test]
    fn test_order_violation_leaves_graph_unchanged() {
        let dawg = Dawg::new();
        dawg.add_word("mango").unwrap();
        let stats_before = dawg.stats();

        assert_eq!(dawg.add_word("mango"), Err(DawgError::WordOrderViolation));
        assert_eq!(dawg.add_word("apple"), Err(DawgError::WordOrderViolation));

        assert_eq!(dawg.stats(), stats_before);
        assert_eq!(dawg.word_count(), 1);
    }

    #[test]
    fn test_first_empty_word_rejected_by_checked_add() {
        let dawg = Dawg::new();
        assert_eq!(dawg.add_word(""), Err(DawgError::WordOrderViolation));
    }

    #[test]
    fn test_readding_via_unchecked_is_idempotent() {
        let dawg = Dawg::new();
        dawg.add_word("same").unwrap();
        assert_eq!(dawg.add_word_unchecked("same"), Ok(AddResult::AlreadyExists));
        assert_eq!(dawg.word_count(), 1);
        assert!(dawg.contains("same"));
    }

    #[test]
    fn test_shared_suffix_collapses() {
        // "rain" and "main" must share the 3-node chain for "ain".
        let dawg = Dawg::new();
        dawg.add_word("main").unwrap();
        dawg.add_word("rain").unwrap();
        dawg.close();

        // Both first-letter successors are equivalent and merge, leaving
        // root -> shared node -> a -> i -> n(eow): 5 nodes versus 9 for
        // the naive trie.
        assert_eq!(reachable_nodes(&dawg), 5);
        assert!(dawg.contains("main"));
        assert!(dawg.contains("rain"));
    }

    #[test]
    fn test_minimality_not_worse_than_trie() {
        let words = ["talking", "testing", "running", "walking"];
        let dawg = Dawg::from_terms(words);

        let trie_nodes = 1 + words.iter().map(|w| w.len()).sum::<usize>();
        assert!(reachable_nodes(&dawg) < trie_nodes);
        for word in words {
            assert!(dawg.contains(word));
        }
    }

    #[test]
    fn test_no_false_positives_after_minimization() {
        let inserted = ["band", "banana", "bandana", "can", "candy", "cane"];
        let dawg = Dawg::from_terms(inserted);

        for word in inserted {
            assert!(dawg.contains(word), "missing {word}");
        }
        for word in ["ban", "band" /* prefix of bandana */, "ca", "bandanas", "andy"] {
            if !inserted.contains(&word) {
                assert!(!dawg.contains(word), "false positive {word}");
            }
        }
    }

    #[test]
    fn test_close_is_idempotent() {
        let dawg = Dawg::new();
        dawg.add_word("word").unwrap();
        dawg.close();
        let nodes = reachable_nodes(&dawg);
        dawg.close();
        assert_eq!(reachable_nodes(&dawg), nodes);
    }

    #[test]
    fn test_close_on_empty() {
        let dawg = Dawg::new();
        dawg.close();
        assert_eq!(dawg.state(), crate::dawg::DawgState::Closed);
        assert_eq!(dawg.add_word("late"), Err(DawgError::Frozen));
    }

    #[test]
    fn test_prefix_word_of_previous_word() {
        let dawg = Dawg::new();
        dawg.add_word("do").unwrap();
        dawg.add_word("dog").unwrap();
        dawg.add_word("dogs").unwrap();
        dawg.close();

        assert!(dawg.contains("do"));
        assert!(dawg.contains("dog"));
        assert!(dawg.contains("dogs"));
        assert!(!dawg.contains("d"));
    }

    #[test]
    fn test_slot_reuse_keeps_arena_compact() {
        // Words with heavy suffix sharing retire many nodes; the arena's
        // live count must track the reachable count closely.
        let dawg = Dawg::from_terms(vec!["aiming", "calling", "mailing", "nailing", "sailing"]);
        let reachable = reachable_nodes(&dawg);
        let live = dawg.inner.read().arena.live_count();
        assert_eq!(live, reachable);
    }
}
