use std::{
    ops::{AddAssign, ControlFlow},
    time::{Duration, Instant},
};

use serde::Serialize;

use super::SearchConfig;
use crate::utils::signal_handling;

/// Counters collected during a search
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    /// Number of visited search nodes
    pub branches: u64,
    pub bound_prunes: u64,
    pub bipartite_branches: u64,
    pub pivot_branches: u64,
    /// Number of reported solutions (maximal biplexes or improvements of the incumbent)
    pub solutions: u64,
    pub improvements: u64,
}

impl AddAssign for SearchStats {
    fn add_assign(&mut self, rhs: Self) {
        self.branches += rhs.branches;
        self.bound_prunes += rhs.bound_prunes;
        self.bipartite_branches += rhs.bipartite_branches;
        self.pivot_branches += rhs.pivot_branches;
        self.solutions += rhs.solutions;
        self.improvements += rhs.improvements;
    }
}

/// Reading the clock at every node is too costly; the deadline is checked every this many
/// branches
const DEADLINE_CHECK_INTERVAL: u64 = 1 << 10;

/// Cancellation conditions checked at the entry of every search node
#[derive(Clone, Copy, Debug, Default)]
pub struct SearchControl {
    deadline: Option<Instant>,
    result_cap: Option<u64>,
}

impl SearchControl {
    pub fn new(config: &SearchConfig, start: Instant) -> Self {
        Self {
            deadline: config
                .time_limit
                .map(|secs| start + Duration::from_secs_f64(secs.max(0.0))),
            result_cap: config.result_cap,
        }
    }

    /// Control for a follow-up run whose cap accounts for the solutions in `spent`
    pub fn remaining_after(&self, spent: &SearchStats) -> Self {
        Self {
            deadline: self.deadline,
            result_cap: self.result_cap.map(|cap| cap.saturating_sub(spent.solutions)),
        }
    }

    pub fn cap_reached(&self, stats: &SearchStats) -> bool {
        self.result_cap.is_some_and(|cap| stats.solutions >= cap)
    }

    pub fn timed_out(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Returns `Break` if the search has to unwind
    pub fn check(&self, stats: &SearchStats) -> ControlFlow<()> {
        let stop = self.cap_reached(stats)
            || signal_handling::received_ctrl_c()
            || (stats.branches % DEADLINE_CHECK_INTERVAL == 0 && self.timed_out());

        if stop {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }
}

/// Result of a search run
#[derive(Clone, Debug, Serialize)]
pub struct SearchReport<S> {
    pub solution: S,
    pub stats: SearchStats,
    pub elapsed: Duration,
    /// False if the search was cancelled before it proved its result
    pub completed: bool,
}
