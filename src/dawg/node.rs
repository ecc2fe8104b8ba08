//! Arena-backed node storage for the DAWG.
//!
//! Nodes are addressed by dense indices into a vector; an index plays the
//! role the node pointer plays in a heap-allocated graph, so structural
//! equivalence can compare children by index equality alone. Slots of nodes
//! retired during minimization go onto a free list and are reused by later
//! insertions.

use smallvec::SmallVec;

/// A node in the DAWG.
///
/// Edges are kept sorted ascending by letter with no duplicates; this is
/// what makes binary-search lookup and pairwise equivalence checks valid.
#[derive(Clone, Debug)]
pub(crate) struct Node {
    /// Outgoing edges: (byte label, child index), sorted by label.
    pub edges: SmallVec<[(u8, usize); 4]>,
    /// End-of-word marker.
    pub eow: bool,
    /// Generation marker used by visit-once traversals.
    pub visited: u32,
    /// Count of words reachable from this node (perfect hashing).
    pub number: usize,
}

impl Node {
    fn new(eow: bool) -> Self {
        Node {
            edges: SmallVec::new(),
            eow,
            visited: 0,
            number: 0,
        }
    }
}

/// Owns every node of the graph.
///
/// A node with no path from the root is garbage; it keeps its slot until
/// either the builder frees it (minimization's replace step) or the whole
/// arena is dropped by `clear()`.
#[derive(Debug)]
pub(crate) struct NodeArena {
    nodes: Vec<Node>,
    free: Vec<usize>,
}

impl NodeArena {
    /// Create an arena holding only a fresh root node at index 0.
    pub fn new() -> Self {
        NodeArena {
            nodes: vec![Node::new(false)],
            free: Vec::new(),
        }
    }

    /// Allocate a node, reusing a retired slot when one is available.
    pub fn alloc(&mut self, eow: bool) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = Node::new(eow);
                idx
            }
            None => {
                self.nodes.push(Node::new(eow));
                self.nodes.len() - 1
            }
        }
    }

    /// Return a retired node's slot to the free list.
    ///
    /// The caller must have already redirected or dropped every edge that
    /// pointed at `idx`.
    pub fn free(&mut self, idx: usize) {
        self.nodes[idx].edges.clear();
        self.free.push(idx);
    }

    #[inline]
    pub fn get(&self, idx: usize) -> &Node {
        &self.nodes[idx]
    }

    #[inline]
    pub fn get_mut(&mut self, idx: usize) -> &mut Node {
        &mut self.nodes[idx]
    }

    /// Look up the child reached from `idx` via `letter`.
    #[inline]
    pub fn get_child(&self, idx: usize, letter: u8) -> Option<usize> {
        let edges = &self.nodes[idx].edges;
        edges
            .binary_search_by_key(&letter, |(l, _)| *l)
            .ok()
            .map(|pos| edges[pos].1)
    }

    /// Set the child for `letter`, replacing an existing edge or inserting
    /// a new one at the position that keeps the edge array sorted.
    pub fn set_child(&mut self, idx: usize, letter: u8, child: usize) {
        let edges = &mut self.nodes[idx].edges;
        match edges.binary_search_by_key(&letter, |(l, _)| *l) {
            Ok(pos) => edges[pos] = (letter, child),
            Err(pos) => edges.insert(pos, (letter, child)),
        }
    }

    /// Structural size of one node: the record itself plus its edge array.
    pub fn node_size(&self, idx: usize) -> usize {
        std::mem::size_of::<Node>()
            + self.nodes[idx].edges.len() * std::mem::size_of::<(u8, usize)>()
    }

    /// Reset every generation marker. Called once when the generation
    /// counter wraps around.
    pub fn clear_marks(&mut self) {
        for node in &mut self.nodes {
            node.visited = 0;
        }
    }

    /// Number of live slots (allocated minus freed); used by tests.
    #[cfg(test)]
    pub fn live_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_stay_sorted() {
        let mut arena = NodeArena::new();
        let root = 0;
        let c1 = arena.alloc(false);
        let c2 = arena.alloc(false);
        let c3 = arena.alloc(false);

        arena.set_child(root, b'm', c1);
        arena.set_child(root, b'a', c2);
        arena.set_child(root, b'z', c3);

        let letters: Vec<u8> = arena.get(root).edges.iter().map(|(l, _)| *l).collect();
        assert_eq!(letters, vec![b'a', b'm', b'z']);
    }

    #[test]
    fn test_set_child_replaces_existing_edge() {
        let mut arena = NodeArena::new();
        let c1 = arena.alloc(false);
        let c2 = arena.alloc(false);

        arena.set_child(0, b'x', c1);
        arena.set_child(0, b'x', c2);

        assert_eq!(arena.get(0).edges.len(), 1);
        assert_eq!(arena.get_child(0, b'x'), Some(c2));
    }

    #[test]
    fn test_get_child_missing() {
        let arena = NodeArena::new();
        assert_eq!(arena.get_child(0, b'a'), None);
    }

    #[test]
    fn test_free_slot_reuse() {
        let mut arena = NodeArena::new();
        let a = arena.alloc(false);
        arena.free(a);
        let b = arena.alloc(true);
        assert_eq!(a, b);
        assert!(arena.get(b).eow);
        assert!(arena.get(b).edges.is_empty());
        assert_eq!(arena.live_count(), 2);
    }
}
