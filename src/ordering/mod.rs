//! Vertex orderings and the coloring oracle derived from them.
pub mod coloring;

pub use coloring::GreedyColoring;

use itertools::Itertools;

use crate::{graph::*, utils::LinearHeap};

/// Degeneracy (smallest-last) elimination ordering.
///
/// Vertices are removed one at a time, always one of minimum residual degree. `value_of(u)`
/// is the key `u` had when it was removed; since keys are never decremented below the key of
/// the vertex currently being removed, this is the core number of `u`.
#[derive(Clone, Debug, Default)]
pub struct DegeneracyOrdering {
    ordered: Vec<Node>,
    order: Vec<NumNodes>,
    value: Vec<NumNodes>,
    degeneracy: NumNodes,
}

impl DegeneracyOrdering {
    pub fn new<G: AdjacencyList>(graph: &G) -> Self {
        let n = graph.len();
        let mut heap = LinearHeap::build(n, graph.vertices(), |u| graph.degree_of(u));
        let mut result = Self {
            ordered: Vec::with_capacity(n),
            order: vec![0; n],
            value: vec![0; n],
            degeneracy: 0,
        };

        while let Some(u) = heap.pop() {
            let key = heap.value(u);
            for &v in graph.neighbors_of(u) {
                if heap.contains(v) && heap.value(v) > key {
                    heap.dec(v);
                }
            }
            result.push(u, key);
        }

        result
    }

    /// Vertices by ascending degree, ties broken by id. Here `value_of(u)` is the degree of
    /// `u`, which is never smaller than its core number.
    pub fn by_degree<G: AdjacencyList>(graph: &G) -> Self {
        let n = graph.len();
        let mut result = Self {
            ordered: Vec::with_capacity(n),
            order: vec![0; n],
            value: vec![0; n],
            degeneracy: 0,
        };

        for u in graph.vertices().sorted_by_key(|&u| graph.degree_of(u)) {
            result.push(u, graph.degree_of(u));
        }

        result
    }

    fn push(&mut self, u: Node, value: NumNodes) {
        self.order[u as usize] = self.ordered.len() as NumNodes;
        self.value[u as usize] = value;
        self.degeneracy = self.degeneracy.max(value);
        self.ordered.push(u);
    }

    /// Vertices in elimination order
    pub fn ordered(&self) -> &[Node] {
        &self.ordered
    }

    /// Position of `u` in the elimination order
    pub fn order_of(&self, u: Node) -> NumNodes {
        self.order[u as usize]
    }

    /// Core number of `u` (degree for [`DegeneracyOrdering::by_degree`])
    pub fn value_of(&self, u: Node) -> NumNodes {
        self.value[u as usize]
    }

    /// Largest value
    pub fn degeneracy(&self) -> NumNodes {
        self.degeneracy
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}
