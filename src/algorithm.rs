//! The solvers are implemented using the [`IterativeAlgorithm`] trait.
//!
//! An algorithm does a bounded amount of work (the seeded solvers process one seed) and then
//! yields. The caller decides whether to continue, e.g. until a timeout or a termination
//! signal.

use std::time::{Duration, Instant};

use crate::utils::signal_handling;

/// [`IterativeAlgorithm`] provides a consistent interface to execute the solvers. Observe
/// that it does not prescribe any constructor; each solver has its own parameters. The
/// construction phase should be fast and only involve little computation.
///
/// As an adopter of [`IterativeAlgorithm`], you have to implement at least the methods
///   [`IterativeAlgorithm::execute_step`],
///   [`IterativeAlgorithm::is_completed`] and [`IterativeAlgorithm::best_known_solution`].
///
/// If your algorithm is known to eventually terminate please also implement the marker trait
/// [`TerminatingIterativeAlgorithm`]. It offers an easy interface to run the algorithm to completion.
///
/// # Example
/// ```
/// use defclique::algorithm::IterativeAlgorithm;
/// use defclique::graph::{AdjacencyList, Node};
///
/// /// Scans the vertices one by one for the largest degree
/// struct MaxDegree<'a, G> {
///     graph: &'a G,
///     next: Node,
///     best: Option<(Node, u32)>,
/// }
///
/// impl<'a, G> IterativeAlgorithm<(Node, u32)> for MaxDegree<'a, G> where G: 'a + AdjacencyList {
///     fn execute_step(&mut self) {
///         let degree = self.graph.degree_of(self.next);
///         if self.best.is_none_or(|(_, d)| d < degree) {
///             self.best = Some((self.next, degree));
///         }
///         self.next += 1;
///     }
///
///     fn is_completed(&self) -> bool {
///         self.next >= self.graph.number_of_nodes()
///     }
///
///     fn best_known_solution(&mut self) -> Option<(Node, u32)> {
///         self.best
///     }
/// }
/// ```
pub trait IterativeAlgorithm<Result> {
    /// Advances the computation of this algorithm. A step should not significantly exceed a
    /// second for expected inputs.
    fn execute_step(&mut self);

    /// Returns true iff the algorithm is completed and [`IterativeAlgorithm::execute_step`] may not
    /// be called again.
    fn is_completed(&self) -> bool;

    /// Returns the currently best known solution or None if no solution is known yet.
    fn best_known_solution(&mut self) -> Option<Result>;

    /// Execute the algorithm and keeps calling [`IterativeAlgorithm::execute_step`] until the
    /// `predicate` becomes false, a termination signal was received, or [`IterativeAlgorithm::is_completed`]
    /// becomes true. The function `predicate` is evaluated after each iteration, i.e. a step is
    /// carried out even if the predicate always returns false.
    fn run_while<F: FnMut(&mut Self) -> bool>(&mut self, mut predicate: F) {
        while !self.is_completed() && !signal_handling::received_ctrl_c() {
            self.execute_step();

            if !predicate(self) {
                break;
            }
        }
    }

    /// Execute the algorithm and keeps calling [`IterativeAlgorithm::execute_step`] until either a
    /// timeout occurred, a termination signal was received, or [`IterativeAlgorithm::is_completed`]
    /// is true. The timeout is only checked between steps.
    fn run_until_timeout(&mut self, timeout: Duration) {
        let start = Instant::now();
        self.run_while(|_| start.elapsed() < timeout);
    }
}

/// [`TerminatingIterativeAlgorithm`] is a marker trait, i.e. to adopt it, you give an empty `impl`
/// block. Add this trait to algorithms that will eventually terminate.
pub trait TerminatingIterativeAlgorithm<Result>: IterativeAlgorithm<Result> {
    /// Execute the algorithm until it completed (or the termination signal was received) and
    /// return the solution if it was found.
    fn run_to_completion(&mut self) -> Option<Result> {
        while !self.is_completed() && !signal_handling::received_ctrl_c() {
            self.execute_step();
        }
        self.best_known_solution()
    }
}
