//! Exact search for maximum k-defective cliques and maximal k-biplexes.
//!
//! Both problems relax cliques (bicliques) by allowing each vertex to miss up to `k` other
//! members. The solvers in [`exact`] combine graph reductions, a degeneracy ordering of seed
//! vertices and a branch-and-bound search on reversible vertex sets.

pub mod algorithm;
pub mod errors;
pub mod exact;
pub mod graph;
pub mod heuristic;
pub mod io;
pub mod log;
pub mod ordering;
pub mod reduction;
pub mod utils;

pub mod prelude {
    pub use super::algorithm::*;
    pub use super::exact::*;
    pub use super::graph::*;
    pub use super::heuristic::*;
    pub use super::io::{BiGraphReader, BiplexWriter, GraphEdgeListReader, SolutionWriter};
}

#[cfg(test)]
mod testing;
