use std::sync::{
    Mutex,
    atomic::{AtomicU32, Ordering},
};

use crate::graph::{Node, NumNodes};

/// Holder of the best solution known so far. Implementations only ever accept strictly
/// larger solutions, so `best_size` is non-decreasing.
pub trait Incumbent {
    fn best_size(&self) -> NumNodes;

    /// Replaces the incumbent if `solution` is strictly larger; returns true in this case
    fn try_improve(&mut self, solution: &[Node]) -> bool;
}

impl<T: Incumbent + ?Sized> Incumbent for &mut T {
    fn best_size(&self) -> NumNodes {
        (**self).best_size()
    }

    fn try_improve(&mut self, solution: &[Node]) -> bool {
        (**self).try_improve(solution)
    }
}

/// Single-threaded incumbent. A lower bound hint `h` raises the reported size to at least
/// `h - 1`, i.e. only solutions with at least `h` vertices are searched for.
#[derive(Clone, Debug, Default)]
pub struct BestSolution {
    nodes: Vec<Node>,
    floor: NumNodes,
}

impl BestSolution {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes, floor: 0 }
    }

    pub fn with_lower_bound(mut self, lower_bound: NumNodes) -> Self {
        self.floor = lower_bound.saturating_sub(1);
        self
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }
}

impl Incumbent for BestSolution {
    fn best_size(&self) -> NumNodes {
        (self.nodes.len() as NumNodes).max(self.floor)
    }

    fn try_improve(&mut self, solution: &[Node]) -> bool {
        if solution.len() as NumNodes <= self.best_size() {
            return false;
        }
        self.nodes.clear();
        self.nodes.extend_from_slice(solution);
        true
    }
}

/// Incumbent shared by several workers. The size is readable without locking; updates
/// re-check the size inside the critical section so no improvement is lost.
#[derive(Debug, Default)]
pub struct SharedBest {
    size: AtomicU32,
    best: Mutex<BestSolution>,
}

impl SharedBest {
    pub fn new(initial: BestSolution) -> Self {
        Self {
            size: AtomicU32::new(initial.best_size()),
            best: Mutex::new(initial),
        }
    }

    pub fn into_inner(self) -> BestSolution {
        self.best.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

impl Incumbent for &SharedBest {
    fn best_size(&self) -> NumNodes {
        self.size.load(Ordering::Acquire)
    }

    fn try_improve(&mut self, solution: &[Node]) -> bool {
        if solution.len() as NumNodes <= self.best_size() {
            return false;
        }

        let mut best = self.best.lock().unwrap_or_else(|e| e.into_inner());
        if !best.try_improve(solution) {
            return false;
        }
        self.size.store(best.best_size(), Ordering::Release);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_strict_improvements() {
        let mut best = BestSolution::new(vec![3, 4]);
        assert_eq!(best.best_size(), 2);
        assert!(!best.try_improve(&[0, 1]));
        assert!(best.try_improve(&[0, 1, 2]));
        assert_eq!(best.nodes(), &[0, 1, 2]);
    }

    #[test]
    fn lower_bound_hint() {
        let mut best = BestSolution::default().with_lower_bound(4);
        assert_eq!(best.best_size(), 3);
        assert!(!best.try_improve(&[0, 1, 2]));
        assert!(best.try_improve(&[0, 1, 2, 3]));
    }

    #[test]
    fn shared_from_threads() {
        let shared = SharedBest::new(BestSolution::new(vec![0]));
        std::thread::scope(|scope| {
            for t in 1..=4u32 {
                let shared = &shared;
                scope.spawn(move || {
                    let mut incumbent = shared;
                    let solution: Vec<Node> = (0..t).collect();
                    incumbent.try_improve(&solution);
                });
            }
        });

        assert_eq!((&shared).best_size(), 4);
        assert_eq!(shared.into_inner().into_nodes(), vec![0, 1, 2, 3]);
    }
}
