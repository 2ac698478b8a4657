//! Fast construction of initial solutions for the exact search
pub mod greedy;

pub use greedy::greedy_defective_clique;
