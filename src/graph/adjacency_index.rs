use super::Node;

const BUCKET_SIZE: usize = 4;
const EMPTY: Node = Node::MAX;

/// Hash set of neighbor ids with constant-time membership queries.
///
/// Open addressing with two candidate buckets per key (`x & mask` and `!x & mask`), four
/// slots each. A key that finds both buckets full displaces another key cuckoo-style;
/// if displacement does not settle, the table doubles and is rebuilt. Removal only clears
/// a slot, so probes of other keys are never invalidated.
#[derive(Clone, Debug)]
pub struct AdjacencyIndex {
    slots: Vec<Node>,
    mask: u32,
    len: usize,
}

impl Default for AdjacencyIndex {
    fn default() -> Self {
        Self {
            slots: vec![EMPTY; BUCKET_SIZE],
            mask: 0,
            len: 0,
        }
    }
}

impl AdjacencyIndex {
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates an index that can hold `n` keys without rebuilding
    pub fn with_capacity(n: usize) -> Self {
        let mut index = Self::default();
        index.reserve(n);
        index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Grows the table such that `n` keys fit with a load factor of at most one half
    pub fn reserve(&mut self, n: usize) {
        if 2 * n <= self.slots.len() {
            return;
        }

        let mut mask = self.mask;
        while (mask as usize + 1) * BUCKET_SIZE < 2 * n {
            mask = (mask << 1) | 1;
        }
        self.rebuild_with_mask(mask, None);
    }

    pub fn contains(&self, x: Node) -> bool {
        x != EMPTY
            && (self.bucket(self.hash1(x)).contains(&x) || self.bucket(self.hash2(x)).contains(&x))
    }

    /// Inserts `x`; returns true iff `x` was not present before
    pub fn insert(&mut self, x: Node) -> bool {
        debug_assert_ne!(x, EMPTY);
        if self.contains(x) {
            return false;
        }

        if 2 * (self.len + 1) > self.slots.len() {
            self.rebuild_with_mask((self.mask << 1) | 1, None);
        }

        if let Some(homeless) = self.place(x) {
            self.rebuild_with_mask((self.mask << 1) | 1, Some(homeless));
        }

        self.len += 1;
        true
    }

    /// Removes `x`; returns true iff `x` was present
    pub fn remove(&mut self, x: Node) -> bool {
        if x == EMPTY {
            return false;
        }

        for b in [self.hash1(x), self.hash2(x)] {
            let range = b * BUCKET_SIZE..(b + 1) * BUCKET_SIZE;
            if let Some(slot) = self.slots[range.clone()].iter().position(|&y| y == x) {
                self.slots[range.start + slot] = EMPTY;
                self.len -= 1;
                return true;
            }
        }

        false
    }

    pub fn iter(&self) -> impl Iterator<Item = Node> + '_ {
        self.slots.iter().copied().filter(|&x| x != EMPTY)
    }

    fn hash1(&self, x: Node) -> usize {
        (x & self.mask) as usize
    }

    fn hash2(&self, x: Node) -> usize {
        (!x & self.mask) as usize
    }

    fn bucket(&self, b: usize) -> &[Node] {
        &self.slots[b * BUCKET_SIZE..(b + 1) * BUCKET_SIZE]
    }

    fn try_place(&mut self, x: Node) -> bool {
        for b in [self.hash1(x), self.hash2(x)] {
            let base = b * BUCKET_SIZE;
            if let Some(slot) = self.slots[base..base + BUCKET_SIZE]
                .iter()
                .position(|&y| y == EMPTY)
            {
                self.slots[base + slot] = x;
                return true;
            }
        }
        false
    }

    /// Places `x`, displacing other keys if necessary. If the displacement chain does not
    /// settle, the key left without a slot is returned.
    fn place(&mut self, x: Node) -> Option<Node> {
        if self.try_place(x) {
            return None;
        }

        let mut pending = x;
        let mut bucket = self.hash1(pending);
        for _ in 0..(self.mask as usize + 1).max(8) {
            let base = bucket * BUCKET_SIZE;
            let evicted = self.slots[base];
            self.slots[base..base + BUCKET_SIZE].rotate_left(1);
            self.slots[base + BUCKET_SIZE - 1] = pending;
            pending = evicted;

            if self.try_place(pending) {
                return None;
            }

            // continue in the alternative bucket of the evicted key
            bucket = if bucket == self.hash2(pending) {
                self.hash1(pending)
            } else {
                self.hash2(pending)
            };
        }

        Some(pending)
    }

    fn rebuild_with_mask(&mut self, mut mask: u32, extra: Option<Node>) {
        let keys: Vec<Node> = self.iter().chain(extra).collect();

        'retry: loop {
            self.mask = mask;
            self.slots = vec![EMPTY; (mask as usize + 1) * BUCKET_SIZE];
            for &x in &keys {
                if self.place(x).is_some() {
                    mask = (mask << 1) | 1;
                    continue 'retry;
                }
            }
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use itertools::Itertools;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg64Mcg;

    use super::*;

    #[test]
    fn insert_find_remove() {
        let mut index = AdjacencyIndex::new();
        assert!(index.insert(3));
        assert!(!index.insert(3));
        assert!(index.contains(3));
        assert!(!index.contains(4));
        assert!(!index.contains(EMPTY));
        assert_eq!(index.len(), 1);

        assert!(index.remove(3));
        assert!(!index.remove(3));
        assert!(!index.contains(3));
        assert!(index.is_empty());
    }

    #[test]
    fn colliding_keys() {
        // all keys agree on their lowest bits and thus compete for the same two buckets
        let mut index = AdjacencyIndex::with_capacity(4);
        let keys = (0..100).map(|i| i * 64).collect_vec();
        for &x in &keys {
            index.insert(x);
        }
        assert_eq!(index.len(), keys.len());
        assert!(keys.iter().all(|&x| index.contains(x)));
        assert_eq!(index.iter().sorted().collect_vec(), keys);
    }

    #[test]
    fn random_against_hashset() {
        let mut rng = Pcg64Mcg::seed_from_u64(1234);

        for _ in 0..50 {
            let universe = rng.gen_range(1..2000);
            let mut index = AdjacencyIndex::new();
            let mut naive = HashSet::new();

            for _ in 0..1000 {
                let x = rng.gen_range(0..universe);
                if rng.gen_bool(0.7) {
                    assert_eq!(index.insert(x), naive.insert(x));
                } else {
                    assert_eq!(index.remove(x), naive.remove(&x));
                }
                assert_eq!(index.len(), naive.len());
            }

            for x in 0..universe {
                assert_eq!(index.contains(x), naive.contains(&x));
            }
        }
    }
}
