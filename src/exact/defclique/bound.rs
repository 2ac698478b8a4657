//! Upper bounds on the size of any feasible set `S ∪ D` with `D ⊆ C`.
//!
//! Let `a(v)` be the number of non-neighbors of a candidate `v` in `S`. Members of one
//! color class are pairwise non-adjacent, so taking `j` members of a class costs at least
//! the `j` smallest values of `a` plus the `j(j-1)/2` pairs among them
//! (`MissingEdges`), or requires `a + j - 1 <= k` for each of them (`PerVertex`).

use super::context::SearchContext;
use crate::{
    exact::{BoundKind, DefectModel, Incumbent},
    graph::*,
};

impl<I: Incumbent> SearchContext<'_, I> {
    /// Returns an upper bound on the size of the largest feasible set reachable from this node
    pub(super) fn upper_bound(&mut self) -> NumNodes {
        let trivial = (self.s.len() + self.c.len()) as NumNodes;
        let extension = match (self.bound, self.coloring.is_some()) {
            (BoundKind::None, _) => return trivial,
            (BoundKind::Coloring, true) => self.coloring_bound(),
            (BoundKind::Coloring, false) | (BoundKind::Bins, _) => self.bins_bound(),
        };
        (self.s.len() as NumNodes + extension).min(trivial)
    }

    fn coloring_bound(&mut self) -> NumNodes {
        let Some(coloring) = self.coloring.as_ref() else {
            return self.c.len() as NumNodes;
        };

        for u in self.c.iter() {
            let a = self.non_neighbors_in_s(u);
            self.classes[coloring.color_of(u) as usize].push(a);
        }

        let mut extension = 0;
        match self.model {
            DefectModel::PerVertex => {
                for class in self.classes.iter_mut().filter(|c| !c.is_empty()) {
                    class.sort_unstable();
                    extension += class
                        .iter()
                        .enumerate()
                        .take_while(|&(j, &a)| a + j as NumNodes <= self.k)
                        .count() as NumNodes;
                    class.clear();
                }
            }

            DefectModel::MissingEdges => {
                let budget = self.k - self.missing;
                let top = self.clear_bins(budget);
                for class in self.classes.iter_mut().filter(|c| !c.is_empty()) {
                    class.sort_unstable();
                    // marginal cost of the j-th member of a class is a + j
                    for (j, &a) in class.iter().enumerate() {
                        let cost = a as usize + j;
                        if cost > top {
                            break;
                        }
                        self.bins[cost] += 1;
                    }
                    class.clear();
                }
                extension = take_cheapest(&self.bins[..=top], budget);
            }
        }

        extension
    }

    /// Bound without coloring: every candidate forms a class of its own
    fn bins_bound(&mut self) -> NumNodes {
        let c_len = self.c.len() as NumNodes;

        match self.model {
            DefectModel::MissingEdges => {
                let budget = self.k - self.missing;
                let top = self.clear_bins(budget);
                for u in self.c.iter() {
                    let a = self.non_neighbors_in_s(u) as usize;
                    if a <= top {
                        self.bins[a] += 1;
                    }
                }
                take_cheapest(&self.bins[..=top], budget)
            }

            DefectModel::PerVertex => {
                // a member w of S may still accept k - a(w) non-neighbors from C
                let excess = self
                    .s
                    .iter()
                    .map(|w| {
                        let in_c = c_len - self.deg_c[w as usize];
                        let slack = self.k - self.non_neighbors_in_s(w);
                        in_c.saturating_sub(slack)
                    })
                    .max()
                    .unwrap_or(0);
                c_len - excess
            }
        }
    }
}

impl<I: Incumbent> SearchContext<'_, I> {
    /// Zeroes the bins of all costs up to `budget` and returns the largest such cost.
    /// No cost exceeds the length of `bins`, so larger budgets are clamped.
    fn clear_bins(&mut self, budget: NumNodes) -> usize {
        let top = (budget as usize).min(self.bins.len() - 1);
        self.bins[..=top].fill(0);
        top
    }
}

/// `bins[c]` items cost `c` each; returns how many items fit into `budget`
fn take_cheapest(bins: &[NumNodes], budget: NumNodes) -> NumNodes {
    let mut taken = bins.first().copied().unwrap_or(0);
    let mut remaining = budget;

    for (cost, &count) in bins.iter().enumerate().skip(1) {
        let cost = cost as NumNodes;
        if cost > remaining {
            break;
        }
        let take = count.min(remaining / cost);
        taken += take;
        remaining -= take * cost;
        if take < count {
            break;
        }
    }

    taken
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg64Mcg;

    use super::*;
    use crate::{
        exact::{BestSolution, SearchConfig, SearchControl},
        ordering::GreedyColoring,
        testing::max_feasible_extension,
    };

    #[test]
    fn cheapest_items() {
        assert_eq!(take_cheapest(&[2, 1, 3], 5), 5);
        assert_eq!(take_cheapest(&[0, 4, 4], 3), 3);
        assert_eq!(take_cheapest(&[1, 0, 2, 5], 3), 2);
        assert_eq!(take_cheapest(&[0], 0), 0);
        assert_eq!(take_cheapest(&[1, 2, 1], NumNodes::MAX), 4);
    }

    #[test]
    fn bins_do_not_grow_with_budget() {
        let graph = Graph::from_edges(4, [(0, 1), (2, 3)]);
        let k = 4_000_000_000;
        for model in [DefectModel::PerVertex, DefectModel::MissingEdges] {
            let config = SearchConfig {
                model,
                bound: Some(BoundKind::Bins),
                ..SearchConfig::with_budget(k as i64)
            };
            let mut best = BestSolution::default();
            let mut context =
                SearchContext::new(&graph, &config, k, SearchControl::default(), None, &mut best);
            assert!(context.bins.len() <= 2 * 4 + 1);

            context.include(0);
            context.include(2);
            assert_eq!(context.upper_bound(), 4);
        }
    }

    #[test]
    fn bounds_are_sound() {
        let mut rng = Pcg64Mcg::seed_from_u64(0x5eed);

        for _ in 0..300 {
            let n = rng.gen_range(1..13);
            let p = rng.gen_range(0.2..0.9);
            let graph = Graph::random_gnp(&mut rng, n, p);
            let k = rng.gen_range(0..4);
            let model = if rng.gen_bool(0.5) {
                DefectModel::PerVertex
            } else {
                DefectModel::MissingEdges
            };

            for bound in [BoundKind::Coloring, BoundKind::Bins] {
                let config = SearchConfig {
                    model,
                    bound: Some(bound),
                    ..SearchConfig::with_budget(k as i64)
                };
                let coloring = GreedyColoring::new(&graph, rng.gen_range(-1..4));
                let mut best = BestSolution::default();
                let mut context = SearchContext::new(
                    &graph,
                    &config,
                    k,
                    SearchControl::default(),
                    Some(coloring),
                    &mut best,
                );

                // grow a random partial solution
                let steps = rng.gen_range(0..4);
                for _ in 0..steps {
                    if context.c.is_empty() {
                        break;
                    }
                    let u = context.c.at(context.c.front_pos() + rng.gen_range(0..context.c.len()));
                    context.include(u);
                }

                let s: Vec<Node> = context.s.iter().collect();
                let c: Vec<Node> = context.c.iter().collect();
                let exact = s.len() as NumNodes + max_feasible_extension(&graph, model, k, &s, &c);
                assert!(context.upper_bound() >= exact);
            }
        }
    }
}
