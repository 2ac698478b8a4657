use std::error::Error;

use thiserror::Error;

use crate::graph::{Node, NumNodes};

/// Trait for checking invariants in datastructures
pub trait InvariantCheck<E: Error> {
    fn is_correct(&self) -> Result<(), E>;
}

/// Errors reported before a search starts; the search itself has no recoverable errors
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("defect budget must be non-negative, got k={0}")]
    InvalidBudget(i64),

    #[error("search mode {mode} is not supported by the {solver} solver")]
    UnsupportedMode {
        mode: &'static str,
        solver: &'static str,
    },

    #[error("both sides of a biplex must be required to hold at least one vertex, got q={0}")]
    InvalidSideBound(NumNodes),

    #[error("initial solution is not valid: {0}")]
    InvalidInitialSolution(String),

    #[error("vertex {0} is out of range")]
    VertexOutOfRange(Node),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] serde_json::Error),
}

/// Violations of the search-state bookkeeping; only checked in debug builds
#[derive(Debug, Error)]
pub enum SearchInvariantError {
    #[error("counter {counter} of vertex {node} is {stored}, expected {expected}")]
    CounterMismatch {
        counter: &'static str,
        node: Node,
        stored: NumNodes,
        expected: NumNodes,
    },

    #[error("vertex {0} is both in the partial solution and a candidate")]
    Overlap(Node),

    #[error("partial solution violates the defect budget")]
    Infeasible,
}
