//! Preprocessing rules that shrink a graph without losing any solution that is larger than
//! a known lower bound.
pub mod butterfly;
pub mod cores;
pub mod edge;
pub mod reducer;

pub use butterfly::*;
pub use cores::*;
pub use edge::*;
pub use reducer::Reducer;

use crate::graph::{BiGraph, Graph, GraphEdgeOrder, GraphNodeOrder, NumNodes};

pub trait ReductionRule<G> {
    const NAME: &str;

    /// Applies the rule and returns the reduced graph. Vertices of the result are labelled
    /// by their ids in `graph`.
    fn apply_rule(&mut self, graph: G) -> G;
}

/// Size information the [`Reducer`] reports before and after each rule
pub trait ReducibleGraph: GraphEdgeOrder {
    fn total_number_of_nodes(&self) -> NumNodes;
}

impl ReducibleGraph for Graph {
    fn total_number_of_nodes(&self) -> NumNodes {
        self.number_of_nodes()
    }
}

impl ReducibleGraph for BiGraph {
    fn total_number_of_nodes(&self) -> NumNodes {
        BiGraph::total_number_of_nodes(self)
    }
}
