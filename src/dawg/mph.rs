//! Minimal perfect hashing between words and dense ranks.
//!
//! Every node caches the number of words reachable from it; with those
//! counts a word maps to the count of accepted words lexicographically not
//! greater than it, giving a bijection onto `1..=count` (Lucchesi &
//! Kowaltowski, 1993). Counts are recomputed lazily whenever the graph's
//! version stamp moved since the last numbering.

use super::{traverse, DawgInner};

impl DawgInner {
    /// Refresh every node's reachable-word count if the graph changed.
    fn ensure_numbered(&mut self) {
        if self.numbered_version == Some(self.version) {
            return;
        }
        let generation = self.next_generation();
        traverse::postorder_once(&mut self.arena, generation, self.root, &mut |arena, idx, _| {
            let mut number = arena.get(idx).eow as usize;
            for i in 0..arena.get(idx).edges.len() {
                let child = arena.get(idx).edges[i].1;
                number += arena.get(child).number;
            }
            arena.get_mut(idx).number = number;
        });
        self.numbered_version = Some(self.version);
    }

    pub(crate) fn word_to_index(&mut self, word: &[u8]) -> Option<usize> {
        self.ensure_numbered();

        let mut index = 0;
        let mut state = self.root;
        // The empty word, when accepted, sorts before everything else.
        if self.arena.get(state).eow {
            index += 1;
        }
        for &letter in word {
            let next = self.arena.get_child(state, letter)?;
            for (edge_letter, child) in &self.arena.get(state).edges {
                if *edge_letter < letter {
                    index += self.arena.get(*child).number;
                }
            }
            state = next;
            if self.arena.get(state).eow {
                index += 1;
            }
        }

        if self.arena.get(state).eow {
            Some(index)
        } else {
            None
        }
    }

    pub(crate) fn index_to_word(&mut self, rank: usize) -> Option<String> {
        if rank < 1 || rank > self.count {
            return None;
        }
        self.ensure_numbered();

        let mut word = Vec::with_capacity(self.longest_word);
        let mut state = self.root;
        let mut remaining = rank;
        if self.arena.get(state).eow {
            remaining -= 1;
        }
        while remaining > 0 {
            let mut advanced = false;
            let degree = self.arena.get(state).edges.len();
            for i in 0..degree {
                let (letter, child) = self.arena.get(state).edges[i];
                let number = self.arena.get(child).number;
                if number < remaining {
                    remaining -= number;
                } else {
                    word.push(letter);
                    state = child;
                    if self.arena.get(state).eow {
                        remaining -= 1;
                    }
                    advanced = true;
                    break;
                }
            }
            // Counts in a correctly numbered graph always cover the rank.
            debug_assert!(advanced);
            if !advanced {
                return None;
            }
        }

        Some(String::from_utf8_lossy(&word).into_owned())
    }
}
