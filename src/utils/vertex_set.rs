//! A set over a fixed vertex universe whose mutations can be undone in O(1).
//!
//! The set keeps a permutation `nodes` of the universe together with its inverse
//! `positions`. Two boundaries split the permutation into three contiguous ranges:
//!
//! ```text
//!  nodes:  [ excluded (front) | active | excluded (back) ]
//!           0            front^       ^back          capacity
//! ```
//!
//! Moving a vertex between ranges swaps it with the element next to the boundary
//! and shifts the boundary by one. Since removals via [`ReversibleVertexSet::pop_front`]
//! only ever grow the front range, remembering `front_pos()` before a batch of removals
//! and later calling [`ReversibleVertexSet::restore_front`] reinstates all of them at once.
//! The back side behaves symmetrically.
//!
//! Restoring is only valid in stack order: the active range after a restore contains
//! exactly the vertices it contained at the checkpoint (possibly in a different order),
//! provided every vertex re-inserted with `push_front` in between was removed after the
//! checkpoint was taken.

use std::ops::Add;

use crate::graph::{Node, NumNodes};

#[derive(Clone, Debug, Default)]
pub struct ReversibleVertexSet {
    nodes: Vec<Node>,
    positions: Vec<usize>,
    front: usize,
    back: usize,
}

impl ReversibleVertexSet {
    /// Creates an empty set over the universe `0..capacity`
    pub fn new(capacity: NumNodes) -> Self {
        let mut set = Self::default();
        set.reserve(capacity);
        set
    }

    /// Creates a set containing exactly `nodes` (in this order)
    pub fn from_nodes(capacity: NumNodes, nodes: impl IntoIterator<Item = Node>) -> Self {
        let mut set = Self::new(capacity);
        for u in nodes {
            set.push_back(u);
        }
        set
    }

    /// Grows the universe to `0..capacity`. New vertices are placed in the excluded back range.
    pub fn reserve(&mut self, capacity: NumNodes) {
        let old = self.nodes.len();
        let capacity = capacity as usize;
        if capacity <= old {
            return;
        }

        self.nodes.extend(old as Node..capacity as Node);
        self.positions.extend(old..capacity);
    }

    pub fn capacity(&self) -> NumNodes {
        self.nodes.len() as NumNodes
    }

    /// Removes all vertices from the active range. The permutation is kept.
    pub fn clear(&mut self) {
        self.front = 0;
        self.back = 0;
    }

    pub fn len(&self) -> usize {
        self.back - self.front
    }

    pub fn is_empty(&self) -> bool {
        self.front == self.back
    }

    pub fn front_pos(&self) -> usize {
        self.front
    }

    pub fn back_pos(&self) -> usize {
        self.back
    }

    /// Returns true iff `u` is in the active range
    pub fn contains(&self, u: Node) -> bool {
        self.positions
            .get(u as usize)
            .is_some_and(|&p| self.front <= p && p < self.back)
    }

    /// Returns the vertex stored at array position `pos` (which may be outside the active range)
    pub fn at(&self, pos: usize) -> Node {
        self.nodes[pos]
    }

    /// First vertex of the active range
    pub fn first(&self) -> Option<Node> {
        (!self.is_empty()).then(|| self.nodes[self.front])
    }

    /// Last vertex of the active range; after a `push_back` this is the vertex just added
    pub fn last(&self) -> Option<Node> {
        (!self.is_empty()).then(|| self.nodes[self.back - 1])
    }

    pub fn as_slice(&self) -> &[Node] {
        &self.nodes[self.front..self.back]
    }

    pub fn iter(&self) -> impl Iterator<Item = Node> + '_ {
        self.as_slice().iter().copied()
    }

    /// Moves `u` from the front excluded range into the active range.
    /// Has no effect if `u` is not in the front excluded range.
    pub fn push_front(&mut self, u: Node) {
        self.ensure_capacity(u);
        if self.positions[u as usize] < self.front {
            self.front -= 1;
            self.swap_to(u, self.front);
        }
    }

    /// Moves `u` from the back excluded range into the active range.
    /// Has no effect if `u` is not in the back excluded range.
    pub fn push_back(&mut self, u: Node) {
        self.ensure_capacity(u);
        if self.positions[u as usize] >= self.back {
            self.swap_to(u, self.back);
            self.back += 1;
        }
    }

    /// Moves `u` from the active range into the front excluded range
    pub fn pop_front(&mut self, u: Node) {
        if self.contains(u) {
            self.swap_to(u, self.front);
            self.front += 1;
        }
    }

    /// Moves `u` from the active range into the back excluded range
    pub fn pop_back(&mut self, u: Node) {
        if self.contains(u) {
            self.back -= 1;
            self.swap_to(u, self.back);
        }
    }

    /// Resets the front boundary to a value previously obtained from [`Self::front_pos`].
    pub fn restore_front(&mut self, checkpoint: usize) {
        debug_assert!(checkpoint <= self.back);
        self.front = checkpoint;
    }

    /// Resets the back boundary to a value previously obtained from [`Self::back_pos`].
    pub fn restore_back(&mut self, checkpoint: usize) {
        debug_assert!(self.front <= checkpoint && checkpoint <= self.nodes.len());
        self.back = checkpoint;
    }

    fn swap_to(&mut self, u: Node, pos: usize) {
        let pu = self.positions[u as usize];
        let other = self.nodes[pos];
        self.nodes.swap(pu, pos);
        self.positions[u as usize] = pos;
        self.positions[other as usize] = pu;
    }

    fn ensure_capacity(&mut self, u: Node) {
        if u as usize >= self.nodes.len() {
            self.reserve((u + 1).max(u << 1));
        }
    }
}

impl Add for &ReversibleVertexSet {
    type Output = ReversibleVertexSet;

    /// Union of both sets; the members of the smaller set are pushed into a copy of the larger
    fn add(self, rhs: Self) -> Self::Output {
        let (large, small) = if self.len() >= rhs.len() {
            (self, rhs)
        } else {
            (rhs, self)
        };

        let mut result = large.clone();
        result.reserve(small.capacity());
        for u in small.iter() {
            if !result.contains(u) {
                result.push_front(u);
                result.push_back(u);
            }
        }
        result
    }
}
