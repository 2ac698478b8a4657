use std::{mem::take, ops::ControlFlow};

use log::trace;

use super::context::SearchContext;
use crate::{
    errors::InvariantCheck,
    exact::{Incumbent, PivotRule},
    graph::*,
};

/// Outcome of the collapse rules at a search node
enum Collapse {
    Unchanged,
    /// Vertices were moved into `S` without branching
    Folded,
    /// The subtree was fully explored by the rule
    Explored,
}

impl<I: Incumbent> SearchContext<'_, I> {
    /// Explores all extensions of the current `S` by candidates in `C`. The state is
    /// restored before returning, also if the search is cancelled.
    pub fn branch(&mut self) -> ControlFlow<()> {
        let checkpoint = self.checkpoint();
        let result = self.visit();
        self.undo(checkpoint);
        result
    }

    /// Includes `seed` and explores all extensions
    pub fn branch_from(&mut self, seed: Node) -> ControlFlow<()> {
        let checkpoint = self.checkpoint();
        self.include(seed);
        let result = self.visit();
        self.undo(checkpoint);
        result
    }

    /// Processes the current node; mutations are left for the caller to undo
    fn visit(&mut self) -> ControlFlow<()> {
        self.stats.branches += 1;
        self.control.check(&self.stats)?;
        debug_assert!(self.is_correct().is_ok(), "{:?}", self.is_correct());

        if self.c.is_empty() {
            self.offer(false);
            return ControlFlow::Continue(());
        }

        let best = self.incumbent.best_size();
        if ((self.s.len() + self.c.len()) as NumNodes) <= best {
            return ControlFlow::Continue(());
        }

        if !self.prune_by_degree(best) {
            return ControlFlow::Continue(());
        }

        if self.closure_is_feasible() {
            self.offer(true);
            return ControlFlow::Continue(());
        }

        if self.upper_bound() <= best {
            self.stats.bound_prunes += 1;
            return ControlFlow::Continue(());
        }

        if self.collapse_rules {
            match self.collapse()? {
                Collapse::Folded => return self.visit(),
                Collapse::Explored => return ControlFlow::Continue(()),
                Collapse::Unchanged => {}
            }
        }

        let pivot = self.select_pivot();
        self.stats.pivot_branches += 1;
        trace!("Branch on {pivot} with |S|={} |C|={}", self.s.len(), self.c.len());

        let checkpoint = self.checkpoint();
        self.include(pivot);
        let result = self.branch();
        self.undo(checkpoint);
        result?;

        self.remove_candidate(pivot);
        self.visit()
    }

    /// Removes candidates with too few neighbors in `S ∪ C` to be part of a set larger than
    /// `best`. Returns false if the node cannot lead to such a set any more.
    fn prune_by_degree(&mut self, best: NumNodes) -> bool {
        self.need = self.model.core_threshold(best + 1, self.k);
        if self.need == 0 {
            return true;
        }

        let mut buffer = take(&mut self.buffer);
        self.pruning.peel(self, &mut buffer);
        self.buffer = buffer;

        let need = self.need;
        if self
            .s
            .iter()
            .any(|u| self.deg_s[u as usize] + self.deg_c[u as usize] < need)
        {
            return false;
        }

        ((self.s.len() + self.c.len()) as NumNodes) > best
    }

    /// Applies the first matching rule:
    ///  - candidates adjacent to all other vertices of `S ∪ C` are moved into `S`,
    ///  - a candidate whose only non-neighbor in `S ∪ C` is a candidate is moved into `S`,
    ///  - a candidate `v` whose two non-neighbors `w1, w2` are candidates is either taken,
    ///    or dropped together with taking both `w1` and `w2`.
    ///
    /// The second rule is safe under both defect models. Let `v` be adjacent to all of `S`
    /// with a single non-neighbor `w ∈ C`, and let `D ⊇ S` be a largest feasible set that
    /// avoids `v`. If `w ∉ D`, then `D + v` adds no missing pair and is feasible, so `D` was
    /// not largest. Otherwise `D - w + v` has the same size; `v` misses nobody in it, and
    /// every other member loses the non-neighbor `w` at most, so no defect count grows. The
    /// same exchange justifies the first rule and the second branch of the third.
    fn collapse(&mut self) -> ControlFlow<(), Collapse> {
        let mut buffer = take(&mut self.buffer);
        buffer.clear();
        buffer.extend(self.c.iter().filter(|&u| self.non_neighbors_in_sc(u) == 0));
        let folded = !buffer.is_empty();
        for &u in &buffer {
            if self.c.contains(u) {
                self.include(u);
            }
        }
        self.buffer = buffer;
        if folded {
            return ControlFlow::Continue(Collapse::Folded);
        }

        let Some(v) = self.c.iter().find(|&u| {
            self.non_neighbors_in_s(u) == 0 && matches!(self.non_neighbors_in_sc(u), 1 | 2)
        }) else {
            return ControlFlow::Continue(Collapse::Unchanged);
        };

        if self.non_neighbors_in_sc(v) == 1 {
            self.include(v);
            return ControlFlow::Continue(Collapse::Folded);
        }

        let (w1, w2) = {
            let mut non_neighbors = self
                .c
                .iter()
                .filter(|&w| w != v && !self.graph.has_edge(v, w));
            (non_neighbors.next(), non_neighbors.next())
        };
        let (Some(w1), Some(w2)) = (w1, w2) else {
            return ControlFlow::Continue(Collapse::Unchanged);
        };

        let checkpoint = self.checkpoint();
        self.include(v);
        let result = self.branch();
        self.undo(checkpoint);
        result?;

        self.remove_candidate(v);
        if self.c.contains(w1) {
            self.include(w1);
            if self.c.contains(w2) {
                self.include(w2);
                self.visit()?;
            }
        }

        ControlFlow::Continue(Collapse::Explored)
    }

    fn select_pivot(&self) -> Node {
        let candidates = self.c.as_slice().iter().rev().copied();
        let pivot = match self.pivot {
            PivotRule::FirstCandidate => self.c.first(),
            PivotRule::MaxCandidateDegree => candidates.max_by_key(|&u| self.deg_c[u as usize]),
            PivotRule::MostNonNeighbors => {
                candidates.max_by_key(|&u| self.non_neighbors_in_sc(u))
            }
        };
        pivot.unwrap_or_else(|| self.c.at(self.c.front_pos()))
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg64Mcg;

    use super::*;
    use crate::{
        exact::{
            BestSolution, BoundKind, DefectModel, PruningStrategy, SearchConfig, SearchControl,
        },
        ordering::GreedyColoring,
        testing::{brute_force_maximum, max_feasible_extension},
    };

    fn search(graph: &Graph, config: &SearchConfig) -> Vec<Node> {
        let k = config.validate().unwrap();
        let coloring = Some(GreedyColoring::new(graph, 0));
        let mut best = BestSolution::default();
        let mut context =
            SearchContext::new(graph, config, k, SearchControl::default(), coloring, &mut best);
        assert!(context.branch().is_continue());
        assert!(context.is_correct().is_ok());
        assert!(context.s.is_empty());
        assert_eq!(context.c.len(), graph.len());
        best.into_nodes()
    }

    #[test]
    fn all_settings_agree_with_brute_force() {
        let mut rng = Pcg64Mcg::seed_from_u64(0xdefec7);

        for _ in 0..150 {
            let n = rng.gen_range(1..13);
            let p = rng.gen_range(0.1..0.95);
            let graph = Graph::random_gnp(&mut rng, n, p);
            let k = rng.gen_range(0..4);

            for model in [DefectModel::PerVertex, DefectModel::MissingEdges] {
                let expected = brute_force_maximum(&graph, model, k).len();

                for (pruning, pivot, bound) in [
                    (
                        PruningStrategy::QueueBased,
                        PivotRule::MaxCandidateDegree,
                        BoundKind::Coloring,
                    ),
                    (
                        PruningStrategy::FixedPointSweep,
                        PivotRule::MostNonNeighbors,
                        BoundKind::Bins,
                    ),
                    (
                        PruningStrategy::SinglePass,
                        PivotRule::FirstCandidate,
                        BoundKind::None,
                    ),
                ] {
                    for collapse_rules in [false, true] {
                        let config = SearchConfig {
                            model,
                            pruning,
                            pivot,
                            bound: Some(bound),
                            collapse_rules,
                            ..SearchConfig::with_budget(k as i64)
                        };
                        let found = search(&graph, &config);
                        assert_eq!(found.len(), expected, "{config:?}");
                        assert!(model.is_feasible(&graph, &found, k));
                    }
                }
            }
        }
    }

    #[test]
    fn folding_keeps_an_optimal_extension() {
        let mut rng = Pcg64Mcg::seed_from_u64(0xf01d);

        for _ in 0..300 {
            let n = rng.gen_range(1..12);
            let p = rng.gen_range(0.3..0.95);
            let graph = Graph::random_gnp(&mut rng, n, p);
            let k = rng.gen_range(0..3);
            let model = if rng.gen_bool(0.5) {
                DefectModel::PerVertex
            } else {
                DefectModel::MissingEdges
            };
            let optimum = brute_force_maximum(&graph, model, k).len() as NumNodes;

            let config = SearchConfig {
                model,
                ..SearchConfig::with_budget(k as i64)
            };
            let mut best = BestSolution::default();
            let mut context =
                SearchContext::new(&graph, &config, k, SearchControl::default(), None, &mut best);

            while matches!(context.collapse(), ControlFlow::Continue(Collapse::Folded)) {
                let s: Vec<Node> = context.s.iter().collect();
                let c: Vec<Node> = context.c.iter().collect();
                let reachable = s.len() as NumNodes + max_feasible_extension(&graph, model, k, &s, &c);
                assert_eq!(reachable, optimum);
            }
        }
    }

    #[test]
    fn cap_unwinds_cleanly() {
        let mut rng = Pcg64Mcg::seed_from_u64(3);
        let graph = Graph::random_gnp(&mut rng, 30, 0.5);
        let config = SearchConfig {
            result_cap: Some(1),
            ..SearchConfig::with_budget(2)
        };

        let mut best = BestSolution::default();
        let control = SearchControl::new(&config, std::time::Instant::now());
        let mut context = SearchContext::new(&graph, &config, 2, control, None, &mut best);
        assert!(context.branch().is_break());
        assert!(context.is_correct().is_ok());
        assert!(context.s.is_empty());
        assert_eq!(context.c.len(), 30);
        assert_eq!(context.stats().solutions, 1);
        assert!(!best.nodes().is_empty());
        assert!(DefectModel::PerVertex.is_feasible(&graph, best.nodes(), 2));
    }
}
