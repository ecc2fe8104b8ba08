//! Compact binary dump format for DAWGs.
//!
//! Nodes are written with dense integer ids assigned by one visit-once
//! post-order traversal, edges reference ids rather than arena indices,
//! and every reference is re-validated on load.
//!
//! Layout (all integers little-endian):
//!
//! ```text
//! header:  magic     u32
//!          state     u8    (0 = empty, 1 = active, 2 = closed)
//!          nodes     u64
//!          words     u64
//!          longest   u64
//!          root id   u32
//! record:  id        u32
//!          eow       u8
//!          degree    u32
//!          degree edges, each: letter u8, child id u32
//! ```
//!
//! An `Empty` graph saves zero records and root id 0. Trailing bytes past
//! the last declared record are ignored.

use crate::dawg::builder::node_hash;
use crate::dawg::node::NodeArena;
use crate::dawg::registry::{BucketTable, INITIAL_BUCKETS};
use crate::dawg::{traverse, DawgInner, DawgState};

/// High half marks byte-wide letters, low half the 32-bit id width.
const MAGIC: u32 = 0x0000_db32;

const HEADER_SIZE: usize = 4 + 1 + 8 * 3 + 4;

/// Errors detected while reading a dump.
///
/// Every kind aborts the load before any live graph is touched; nodes
/// allocated during the failed attempt are released.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Input ended before the declared records did.
    #[error("dump truncated")]
    Truncated,
    /// The magic number does not match this format.
    #[error("bad magic number")]
    BadMagic,
    /// The state byte is not one of the known lifecycle states.
    #[error("invalid state byte {0}")]
    BadState(u8),
    /// The declared root id is outside the declared node count.
    #[error("root node id out of range")]
    BadRootId,
    /// A record or edge references an id outside the declared count.
    #[error("node reference out of range")]
    DanglingNodeReference,
    /// A referenced id slot was never populated by any record.
    #[error("node id {0} missing from dump")]
    MissingNode(u32),
    /// Reading from the underlying source failed.
    #[error("i/o error")]
    Io(#[from] std::io::Error),
}

fn state_to_byte(state: DawgState) -> u8 {
    match state {
        DawgState::Empty => 0,
        DawgState::Active => 1,
        DawgState::Closed => 2,
    }
}

fn state_from_byte(byte: u8) -> Result<DawgState, LoadError> {
    match byte {
        0 => Ok(DawgState::Empty),
        1 => Ok(DawgState::Active),
        2 => Ok(DawgState::Closed),
        other => Err(LoadError::BadState(other)),
    }
}

/// Arena indices are already well distributed, so they hash as themselves.
fn index_hash(idx: usize) -> u32 {
    idx as u32
}

pub(crate) fn save(inner: &mut DawgInner) -> Vec<u8> {
    // Assign dense ids in post-order, so every edge written for a parent
    // points at an id that has already been assigned.
    let mut id_map: BucketTable<usize, u64> = BucketTable::new(INITIAL_BUCKETS);
    let mut order: Vec<usize> = Vec::new();
    if inner.state != DawgState::Empty {
        let generation = inner.next_generation();
        traverse::postorder_once(&mut inner.arena, generation, inner.root, &mut |_, idx, _| {
            id_map.insert(index_hash(idx), idx, order.len() as u64);
            order.push(idx);
        });
    }

    let edge_total: usize = order.iter().map(|&idx| inner.arena.get(idx).edges.len()).sum();
    let mut out = Vec::with_capacity(HEADER_SIZE + order.len() * 9 + edge_total * 5);

    out.extend_from_slice(&MAGIC.to_le_bytes());
    out.push(state_to_byte(inner.state));
    out.extend_from_slice(&(order.len() as u64).to_le_bytes());
    out.extend_from_slice(&(inner.count as u64).to_le_bytes());
    out.extend_from_slice(&(inner.longest_word as u64).to_le_bytes());
    let root_id = id_map
        .find(index_hash(inner.root), |&k| k == inner.root)
        .map(|(_, id)| id)
        .unwrap_or(0);
    out.extend_from_slice(&(root_id as u32).to_le_bytes());

    for (id, &idx) in order.iter().enumerate() {
        let node = inner.arena.get(idx);
        out.extend_from_slice(&(id as u32).to_le_bytes());
        out.push(node.eow as u8);
        out.extend_from_slice(&(node.edges.len() as u32).to_le_bytes());
        for &(letter, child) in &node.edges {
            out.push(letter);
            let child_id = id_map
                .find(index_hash(child), |&k| k == child)
                .map(|(_, id)| id)
                .expect("children are numbered before their parents");
            out.extend_from_slice(&(child_id as u32).to_le_bytes());
        }
    }

    out
}

struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], LoadError> {
        if self.pos + n > self.buf.len() {
            return Err(LoadError::Truncated);
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, LoadError> {
        Ok(self.take(1)?[0])
    }

    fn read_u32(&mut self) -> Result<u32, LoadError> {
        Ok(u32::from_le_bytes(self.take(4)?.try_into().expect("4 bytes")))
    }

    fn read_u64(&mut self) -> Result<u64, LoadError> {
        Ok(u64::from_le_bytes(self.take(8)?.try_into().expect("8 bytes")))
    }
}

/// Parse a dump into a fresh inner graph sharing nothing with any live one.
pub(crate) fn read_dawg(bytes: &[u8]) -> Result<DawgInner, LoadError> {
    let mut cursor = Cursor { buf: bytes, pos: 0 };

    if cursor.read_u32()? != MAGIC {
        return Err(LoadError::BadMagic);
    }
    let state = state_from_byte(cursor.read_u8()?)?;
    let nodes_count = cursor.read_u64()? as usize;
    let words_count = cursor.read_u64()? as usize;
    let longest_word = cursor.read_u64()? as usize;
    let root_id = cursor.read_u32()? as usize;

    let mut inner = DawgInner::new();
    inner.state = state;
    if state == DawgState::Empty {
        return Ok(inner);
    }

    // A record is at least 9 bytes, so the remaining input bounds any
    // believable node count. Checking before sizing `id2node` keeps a
    // corrupt header from triggering a huge allocation.
    if nodes_count > (bytes.len() - cursor.pos) / 9 {
        return Err(LoadError::Truncated);
    }
    if root_id >= nodes_count {
        return Err(LoadError::BadRootId);
    }

    // Pass 1: allocate nodes, stashing raw child ids in the edge slots.
    let mut arena = NodeArena::new();
    arena.free(0);
    let mut id2node: Vec<Option<usize>> = vec![None; nodes_count];
    for _ in 0..nodes_count {
        let id = cursor.read_u32()? as usize;
        if id >= nodes_count {
            return Err(LoadError::DanglingNodeReference);
        }
        let eow = cursor.read_u8()? != 0;
        let degree = cursor.read_u32()? as usize;

        let idx = arena.alloc(eow);
        for _ in 0..degree {
            let letter = cursor.read_u8()?;
            let child_id = cursor.read_u32()? as usize;
            arena.get_mut(idx).edges.push((letter, child_id));
        }
        id2node[id] = Some(idx);
    }

    // Pass 2: resolve ids into arena indices, validating every reference.
    for id in 0..nodes_count {
        let idx = id2node[id].ok_or(LoadError::MissingNode(id as u32))?;
        for i in 0..arena.get(idx).edges.len() {
            let (letter, child_id) = arena.get(idx).edges[i];
            if child_id >= nodes_count {
                return Err(LoadError::DanglingNodeReference);
            }
            let child = id2node[child_id].ok_or(LoadError::MissingNode(child_id as u32))?;
            arena.get_mut(idx).edges[i] = (letter, child);
        }
    }

    let root = id2node[root_id].ok_or(LoadError::MissingNode(root_id as u32))?;

    inner.arena = arena;
    inner.root = root;
    inner.count = words_count;
    // An acyclic path visits each node at most once, so the node count
    // bounds any truthful longest-word declaration.
    inner.longest_word = longest_word.min(nodes_count);

    // An active dump can keep growing, so the minimization registry is
    // rebuilt over every loaded node. The previous word is not part of the
    // format; order checking restarts from the empty word.
    if state == DawgState::Active {
        for idx in id2node.into_iter().flatten() {
            let hash = node_hash(&inner.arena, idx);
            inner.registry.insert(hash, idx, ());
        }
    }

    Ok(inner)
}
