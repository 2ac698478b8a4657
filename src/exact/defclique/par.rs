use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;

use super::*;

impl DefectiveCliqueSolver {
    /// Like [`DefectiveCliqueSolver::solve`], but distributes the seeds over the rayon
    /// thread pool. All workers share the incumbent; the result cap applies per worker.
    pub fn solve_parallel(mut self) -> SearchReport<Solution> {
        if matches!(self.phase, Phase::Preprocess) {
            self.execute_step();
        }

        // only the seeded variant is distributed
        if !matches!(self.phase, Phase::Seeds { .. }) {
            return self.solve();
        }
        let Phase::Seeds {
            graph,
            ordering,
            remaining,
        } = replace(&mut self.phase, Phase::Done)
        else {
            return self.report();
        };

        let shared = SharedBest::new(std::mem::take(&mut self.best));
        let stop = AtomicBool::new(false);
        let (config, k, control) = (&self.config, self.k, self.control);

        let stats = (0..remaining)
            .into_par_iter()
            .rev()
            .map(|index| {
                if stop.load(Ordering::Relaxed) || control.timed_out() {
                    stop.store(true, Ordering::Relaxed);
                    return SearchStats::default();
                }

                let seed = ordering.ordered()[index];
                let (_, stats, flow) =
                    search_seed(&graph, &ordering, seed, config, k, control, &shared);
                if flow.is_break() {
                    stop.store(true, Ordering::Relaxed);
                }
                stats
            })
            .reduce(SearchStats::default, |mut a, b| {
                a += b;
                a
            });

        self.best = shared.into_inner();
        self.stats += stats;
        self.interrupted |= stop.into_inner();
        self.finish();
        self.report()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    use super::*;
    use crate::testing::{brute_force_maximum, generate_random_graph_stream};

    #[test]
    fn parallel_agrees_with_brute_force() {
        let mut rng = Pcg64Mcg::seed_from_u64(0xbeef);
        for (graph, _) in generate_random_graph_stream(&mut rng, 14).take(60) {
            for k in 0..3 {
                let config = SearchConfig {
                    warm_start: false,
                    ..SearchConfig::with_budget(k)
                };
                let report = DefectiveCliqueSolver::new(graph.clone(), config)
                    .unwrap()
                    .solve_parallel();
                assert!(report.completed);
                assert_eq!(
                    report.solution.len(),
                    brute_force_maximum(&graph, DefectModel::PerVertex, k as NumNodes).len()
                );
            }
        }
    }
}
