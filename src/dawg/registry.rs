//! Open hash table shared by minimization and serialization.
//!
//! One generic bucket table serves two roles: the structural-equivalence
//! registry that drives minimization (`BucketTable<usize, ()>` keyed by a
//! content hash of the node) and the node-index → dense-id map built while
//! saving (`BucketTable<usize, u64>` keyed by the index itself). Hashing and
//! equality are supplied by the caller, so the table itself stays dumb.

/// Initial bucket count; matches the table the construction registry has
/// always started from.
pub(crate) const INITIAL_BUCKETS: usize = 1021;

const FNV_OFFSET: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Incremental FNV-1a mixer over arbitrary byte material.
#[derive(Clone, Copy)]
pub(crate) struct Fnv1a(u32);

impl Fnv1a {
    pub fn new() -> Self {
        Fnv1a(FNV_OFFSET)
    }

    #[inline]
    pub fn write_u8(&mut self, byte: u8) {
        self.0 ^= u32::from(byte);
        self.0 = self.0.wrapping_mul(FNV_PRIME);
    }

    #[inline]
    pub fn write_usize(&mut self, value: usize) {
        for byte in (value as u64).to_le_bytes() {
            self.write_u8(byte);
        }
    }

    #[inline]
    pub fn finish(self) -> u32 {
        self.0
    }
}

/// Open hash table with per-bucket chains and inline doubling resize.
///
/// Entries do not own graph nodes; a stored index is only as valid as the
/// caller keeps it (registry entries become stale once a node is superseded,
/// which is why the builder never re-reads a replaced entry).
#[derive(Debug)]
pub(crate) struct BucketTable<K, V> {
    buckets: Vec<Vec<(u32, K, V)>>,
    len: usize,
    threshold: usize,
}

impl<K: Copy + Eq, V: Copy> BucketTable<K, V> {
    pub fn new(buckets: usize) -> Self {
        BucketTable {
            buckets: (0..buckets.max(1)).map(|_| Vec::new()).collect(),
            len: 0,
            threshold: buckets.max(1) * 7 / 10,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Insert an entry, growing the table first when the 0.7 load factor
    /// would be exceeded. Amortized O(1).
    pub fn insert(&mut self, hash: u32, key: K, value: V) {
        if self.len >= self.threshold {
            self.resize(self.buckets.len() * 2);
        }
        let slot = hash as usize % self.buckets.len();
        self.buckets[slot].push((hash, key, value));
        self.len += 1;
    }

    /// Scan the chain for `hash`, applying `eq` to each candidate key.
    pub fn find<F>(&self, hash: u32, mut eq: F) -> Option<(K, V)>
    where
        F: FnMut(&K) -> bool,
    {
        let slot = hash as usize % self.buckets.len();
        self.buckets[slot]
            .iter()
            .find(|(h, k, _)| *h == hash && eq(k))
            .map(|(_, k, v)| (*k, *v))
    }

    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.len = 0;
    }

    fn resize(&mut self, new_size: usize) {
        let mut fresh: Vec<Vec<(u32, K, V)>> = (0..new_size).map(|_| Vec::new()).collect();
        for bucket in self.buckets.drain(..) {
            for entry in bucket {
                fresh[entry.0 as usize % new_size].push(entry);
            }
        }
        self.buckets = fresh;
        self.threshold = new_size * 7 / 10;
    }
}
