//! Depth-first traversal primitives.
//!
//! Two flavors, matching the two kinds of consumers the graph has:
//!
//! - [`preorder`] may visit a shared node once per incoming path. Used where
//!   revisiting is the point (enumerating every word path) or harmless
//!   (collecting nodes/edges into a set for the dot dump).
//! - [`postorder_once`] visits each node exactly once, children before the
//!   callback, using a generation marker stored in the node. Used wherever
//!   double-processing a shared node would be wrong: statistics, dump id
//!   assignment, perfect-hash numbering.

use super::node::NodeArena;

/// Multi-visit depth-first walk; the callback fires before descending.
/// Returning `false` from the callback skips that node's children.
pub(crate) fn preorder<F>(arena: &NodeArena, root: usize, f: &mut F)
where
    F: FnMut(usize, usize) -> bool,
{
    preorder_aux(arena, root, 0, f);
}

fn preorder_aux<F>(arena: &NodeArena, node: usize, depth: usize, f: &mut F)
where
    F: FnMut(usize, usize) -> bool,
{
    if !f(node, depth) {
        return;
    }
    let n = arena.get(node).edges.len();
    for i in 0..n {
        let child = arena.get(node).edges[i].1;
        preorder_aux(arena, child, depth + 1, f);
    }
}

/// Visit-once post-order walk. A node whose `visited` marker already equals
/// `generation` is skipped; the caller must obtain `generation` from
/// `DawgInner::next_generation` so markers from earlier walks cannot collide.
pub(crate) fn postorder_once<F>(arena: &mut NodeArena, generation: u32, root: usize, f: &mut F)
where
    F: FnMut(&mut NodeArena, usize, usize),
{
    postorder_aux(arena, generation, root, 0, f);
}

fn postorder_aux<F>(arena: &mut NodeArena, generation: u32, node: usize, depth: usize, f: &mut F)
where
    F: FnMut(&mut NodeArena, usize, usize),
{
    if arena.get(node).visited == generation {
        return;
    }
    arena.get_mut(node).visited = generation;

    let n = arena.get(node).edges.len();
    for i in 0..n {
        let child = arena.get(node).edges[i].1;
        postorder_aux(arena, generation, child, depth + 1, f);
    }
    f(arena, node, depth);
}
