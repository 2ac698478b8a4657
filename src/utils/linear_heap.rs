//! Bucket-based min-heap over a dense key universe with small integer values.
//!
//! All keys are inserted at once by [`LinearHeap::build`] (counting sort by value). Afterwards
//! the heap supports `top`/`pop` in O(1) and decrementing the value of a key still in the heap
//! in O(1). Keys of equal value leave the heap in the order in which they were handed to `build`.

#[derive(Clone, Debug, Default)]
pub struct LinearHeap {
    /// keys sorted by value; `order[ptr..]` are still in the heap
    order: Vec<u32>,
    /// inverse of `order`
    rank: Vec<usize>,
    /// current value of each key
    values: Vec<u32>,
    /// `start[d]` is the number of entries (popped or not) with value below `d`
    start: Vec<usize>,
    ptr: usize,
}

impl LinearHeap {
    /// Builds a heap over `keys` (each key `< universe`) with `value(key)` as initial value
    pub fn build(
        universe: usize,
        keys: impl IntoIterator<Item = u32>,
        value: impl Fn(u32) -> u32,
    ) -> Self {
        let keys: Vec<u32> = keys.into_iter().collect();
        let mut values = vec![0; universe];
        let mut max_value = 0;
        for &k in &keys {
            values[k as usize] = value(k);
            max_value = max_value.max(values[k as usize]);
        }

        let mut start = vec![0usize; max_value as usize + 2];
        for &k in &keys {
            start[values[k as usize] as usize + 1] += 1;
        }
        for d in 1..start.len() {
            start[d] += start[d - 1];
        }

        let mut order = vec![0; keys.len()];
        let mut rank = vec![usize::MAX; universe];
        let mut next = start.clone();
        for &k in &keys {
            let slot = &mut next[values[k as usize] as usize];
            order[*slot] = k;
            rank[k as usize] = *slot;
            *slot += 1;
        }

        Self {
            order,
            rank,
            values,
            start,
            ptr: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ptr >= self.order.len()
    }

    /// Number of keys still in the heap
    pub fn len(&self) -> usize {
        self.order.len() - self.ptr
    }

    /// Returns true iff `key` was inserted and not popped yet
    pub fn contains(&self, key: u32) -> bool {
        self.rank
            .get(key as usize)
            .is_some_and(|&r| r != usize::MAX && r >= self.ptr)
    }

    pub fn value(&self, key: u32) -> u32 {
        self.values[key as usize]
    }

    /// Key with the smallest value
    pub fn top(&self) -> Option<u32> {
        self.order.get(self.ptr).copied()
    }

    pub fn pop(&mut self) -> Option<u32> {
        let top = self.top()?;
        self.ptr += 1;
        Some(top)
    }

    /// Decrements the value of `key` by one.
    /// ** Panics if `key` is not in the heap or its value is zero **
    pub fn dec(&mut self, key: u32) {
        assert!(self.contains(key));
        let value = self.values[key as usize];
        assert!(value > 0);

        // move `key` to the front of its bucket; afterwards it forms the tail of bucket `value - 1`
        let first = self.start[value as usize].max(self.ptr);
        let other = self.order[first];
        let rank = self.rank[key as usize];
        self.order.swap(first, rank);
        self.rank[other as usize] = rank;
        self.rank[key as usize] = first;

        self.start[value as usize] = first + 1;
        self.values[key as usize] = value - 1;
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg64Mcg;

    use super::*;

    #[test]
    fn pops_sorted() {
        let values = [3, 0, 2, 3, 1, 0];
        let mut heap = LinearHeap::build(6, 0..6, |k| values[k as usize]);
        let mut popped = Vec::new();
        while let Some(k) = heap.pop() {
            popped.push(k);
        }
        // stable within equal values
        assert_eq!(popped, vec![1, 5, 4, 2, 0, 3]);
        assert!(heap.is_empty());
    }

    #[test]
    fn random_decrements() {
        let mut rng = Pcg64Mcg::seed_from_u64(42);

        for _ in 0..100 {
            let n = rng.gen_range(1..60u32);
            let mut naive: Vec<u32> = (0..n).map(|_| rng.gen_range(0..10)).collect();
            let mut heap = LinearHeap::build(n as usize, 0..n, |k| naive[k as usize]);
            let mut alive = vec![true; n as usize];

            while !heap.is_empty() {
                if rng.gen_bool(0.6) {
                    let k = rng.gen_range(0..n);
                    if alive[k as usize] && naive[k as usize] > 0 {
                        heap.dec(k);
                        naive[k as usize] -= 1;
                    }
                } else {
                    let min = (0..n)
                        .filter(|&k| alive[k as usize])
                        .map(|k| naive[k as usize])
                        .min()
                        .unwrap();
                    let top = heap.pop().unwrap();
                    assert_eq!(naive[top as usize], min);
                    assert_eq!(heap.value(top), min);
                    alive[top as usize] = false;
                }

                for k in 0..n {
                    assert_eq!(heap.contains(k), alive[k as usize]);
                }
            }
        }
    }
}
