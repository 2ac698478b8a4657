pub mod biplex;
pub mod config;
pub mod defclique;
pub mod incumbent;
pub mod pruning;
pub mod stats;

pub use biplex::{Biplex, BiplexOutcome, BiplexSolver};
pub use config::*;
pub use defclique::{DefectiveCliqueSolver, SearchContext};
pub use incumbent::*;
pub use stats::*;
