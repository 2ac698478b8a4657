//! Maximum k-defective clique search.
//!
//! The input is shrunk with core and edge reductions derived from the incumbent. In the
//! seeded variant, vertices are then processed from the end of the degeneracy ordering to
//! its start; the search for seed `u` only considers `u` together with vertices ordered
//! after `u` (within distance two of `u` when this is implied by the target size), so each
//! solution is found from its earliest vertex. The whole-graph variant runs a single search
//! over the reduced graph. The reduction search walks a degree ordering from its start and
//! skips every seed whose later neighbors are too few or span too few colors of a single
//! coloring of the reduced graph.

mod bound;
mod branch;
mod context;
#[cfg(feature = "par")]
mod par;

pub use context::SearchContext;

use std::{mem::replace, ops::ControlFlow, time::Instant};

use itertools::Itertools;
use log::{debug, info, trace};

use super::*;
use crate::{
    algorithm::{IterativeAlgorithm, TerminatingIterativeAlgorithm},
    errors::SolverError,
    graph::*,
    heuristic::greedy_defective_clique,
    ordering::{DegeneracyOrdering, GreedyColoring},
    reduction::{CoreReduction, EdgeReduction, Reducer, core_reduction},
};

pub type Solution = Vec<Node>;

/// Number of seeds the greedy warm start tries
const WARM_START_SEEDS: usize = 64;

enum Phase {
    Preprocess,
    Seeds {
        graph: Graph,
        ordering: DegeneracyOrdering,
        /// seeds at positions `0..remaining` of the ordering are still to be processed
        remaining: usize,
    },
    WholeGraph {
        graph: Graph,
    },
    Reduction {
        graph: Graph,
        ordering: DegeneracyOrdering,
        coloring: GreedyColoring,
        /// position in the ordering of the next seed
        next: usize,
    },
    Done,
}

pub struct DefectiveCliqueSolver {
    input: Graph,
    config: SearchConfig,
    k: NumNodes,
    best: BestSolution,
    stats: SearchStats,
    start: Instant,
    control: SearchControl,
    phase: Phase,
    interrupted: bool,
}

impl DefectiveCliqueSolver {
    /// Validates the configuration; no computation happens before the first step
    pub fn new(graph: Graph, config: SearchConfig) -> Result<Self, SolverError> {
        let k = config.validate()?;
        let start = Instant::now();

        Ok(Self {
            input: graph,
            k,
            best: BestSolution::default().with_lower_bound(config.lower_bound.unwrap_or(0)),
            stats: SearchStats::default(),
            start,
            control: SearchControl::new(&config, start),
            config,
            phase: Phase::Preprocess,
            interrupted: false,
        })
    }

    /// Provides a known solution, given as vertex ids of the input graph.
    ///
    /// # Warning
    /// This method may only be called before the first execution of the algorithm.
    pub fn set_initial_solution(&mut self, nodes: &[Node]) -> Result<(), SolverError> {
        let n = self.input.number_of_nodes();
        if let Some(&u) = nodes.iter().find(|&&u| u >= n) {
            return Err(SolverError::VertexOutOfRange(u));
        }
        if !nodes.iter().all_unique() {
            return Err(SolverError::InvalidInitialSolution(
                "vertices must be distinct".into(),
            ));
        }
        if !self.config.model.is_feasible(&self.input, nodes, self.k) {
            return Err(SolverError::InvalidInitialSolution(format!(
                "the {} vertices exceed the defect budget k={}",
                nodes.len(),
                self.k
            )));
        }

        let labels: Vec<Node> = nodes.iter().map(|&u| self.input.label_of(u)).collect();
        self.best.try_improve(&labels);
        Ok(())
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    pub fn report(&self) -> SearchReport<Solution> {
        SearchReport {
            solution: self.best.nodes().iter().copied().sorted().collect(),
            stats: self.stats,
            elapsed: self.start.elapsed(),
            completed: self.is_completed() && !self.interrupted,
        }
    }

    /// Runs the search to completion (or cancellation) and reports the result
    pub fn solve(mut self) -> SearchReport<Solution> {
        self.run_to_completion();
        self.report()
    }

    fn preprocess(&mut self) -> Phase {
        let model = self.config.model;

        if self.config.warm_start {
            let warm = greedy_defective_clique(&self.input, model, self.k, WARM_START_SEEDS);
            if self.best.try_improve(&warm) {
                info!("Warm start |S| = {}", warm.len());
            }
        }

        let target = self.best.best_size() + 1;
        let graph = reduce_for_target(
            &self.input,
            model,
            self.k,
            target,
            self.config.edge_reduction,
        );

        if graph.is_empty() {
            info!("Reductions removed all vertices; incumbent is optimal");
            return Phase::Done;
        }

        match self.config.variant {
            Variant::WholeGraph => Phase::WholeGraph { graph },
            Variant::ReductionSearch => {
                let ordering = DegeneracyOrdering::by_degree(&graph);
                let coloring = GreedyColoring::new(&graph, target as i64 - self.k as i64);
                info!(
                    "Reduced graph n = {}, m = {}, colors = {}",
                    graph.number_of_nodes(),
                    graph.number_of_edges(),
                    coloring.number_of_colors()
                );
                Phase::Reduction {
                    graph,
                    ordering,
                    coloring,
                    next: 0,
                }
            }
            Variant::Seeded => {
                let ordering = DegeneracyOrdering::new(&graph);
                info!(
                    "Reduced graph n = {}, m = {}, degeneracy = {}",
                    graph.number_of_nodes(),
                    graph.number_of_edges(),
                    ordering.degeneracy()
                );
                Phase::Seeds {
                    remaining: graph.len(),
                    graph,
                    ordering,
                }
            }
        }
    }

    fn search_whole_graph(&mut self, graph: &Graph) {
        let target = self.best.best_size() + 1;
        let coloring = (self.config.bound_kind() == BoundKind::Coloring)
            .then(|| GreedyColoring::new(graph, target as i64 - self.k as i64));

        let mut context = SearchContext::new(
            graph,
            &self.config,
            self.k,
            self.control,
            coloring,
            &mut self.best,
        );
        let flow = context.branch();
        let (_, stats) = context.into_parts();

        self.stats += stats;
        self.interrupted |= flow.is_break();
    }

    /// Searches from the seed at position `next` of a degree ordering unless it fails the
    /// degree or color filter
    fn search_filtered_seed(
        &mut self,
        graph: &Graph,
        ordering: &DegeneracyOrdering,
        coloring: &GreedyColoring,
        next: usize,
    ) -> ControlFlow<()> {
        let seed = ordering.ordered()[next];
        if self.control.timed_out() {
            return ControlFlow::Break(());
        }

        let target = self.best.best_size() + 1;
        let (model, k) = (self.config.model, self.k);
        if !seed_may_start_solution(graph, ordering, coloring, seed, model, k, target) {
            trace!("Seed {seed} filtered");
            return ControlFlow::Continue(());
        }

        let (_, stats, flow) = search_seed(
            graph,
            ordering,
            seed,
            &self.config,
            self.k,
            self.control.remaining_after(&self.stats),
            &mut self.best,
        );
        self.stats += stats;
        flow
    }

    fn finish(&self) {
        info!(
            "Search finished |S| = {}, branches = {}, completed = {}",
            self.best.nodes().len(),
            self.stats.branches,
            !self.interrupted
        );
    }
}

impl IterativeAlgorithm<Solution> for DefectiveCliqueSolver {
    fn execute_step(&mut self) {
        let phase = replace(&mut self.phase, Phase::Done);

        self.phase = match phase {
            Phase::Preprocess => self.preprocess(),

            Phase::Seeds {
                graph,
                ordering,
                remaining,
            } if remaining > 0 => {
                let index = remaining - 1;
                let seed = ordering.ordered()[index];
                // short seed searches never reach the periodic deadline check
                let (stats, flow) = if self.control.timed_out() {
                    (SearchStats::default(), ControlFlow::Break(()))
                } else {
                    let (_, stats, flow) = search_seed(
                        &graph,
                        &ordering,
                        seed,
                        &self.config,
                        self.k,
                        self.control.remaining_after(&self.stats),
                        &mut self.best,
                    );
                    (stats, flow)
                };
                self.stats += stats;

                if flow.is_break() {
                    self.interrupted = true;
                    Phase::Done
                } else {
                    Phase::Seeds {
                        graph,
                        ordering,
                        remaining: index,
                    }
                }
            }

            Phase::WholeGraph { graph } => {
                self.search_whole_graph(&graph);
                Phase::Done
            }

            // the earliest vertex of an improving solution has at least |S| later vertices
            Phase::Reduction {
                graph,
                ordering,
                coloring,
                next,
            } if next + (self.best.best_size() as usize) < graph.len() => {
                let flow = self.search_filtered_seed(&graph, &ordering, &coloring, next);
                if flow.is_break() {
                    self.interrupted = true;
                    Phase::Done
                } else {
                    Phase::Reduction {
                        graph,
                        ordering,
                        coloring,
                        next: next + 1,
                    }
                }
            }

            Phase::Seeds { .. } | Phase::Reduction { .. } | Phase::Done => Phase::Done,
        };

        if self.is_completed() {
            self.finish();
        }
    }

    fn is_completed(&self) -> bool {
        matches!(self.phase, Phase::Done)
    }

    fn best_known_solution(&mut self) -> Option<Solution> {
        (!self.best.nodes().is_empty()).then(|| self.best.nodes().iter().copied().sorted().collect())
    }
}

impl TerminatingIterativeAlgorithm<Solution> for DefectiveCliqueSolver {}

/// Removes vertices and edges that cannot be part of a solution with `target` vertices
pub fn reduce_for_target(
    graph: &Graph,
    model: DefectModel,
    k: NumNodes,
    target: NumNodes,
    edge_reduction: bool,
) -> Graph {
    let mut cores = CoreReduction {
        threshold: model.core_threshold(target, k),
    };
    let mut reducer = Reducer::new();
    let (graph, _) = reducer.apply_rule(&mut cores, graph.clone());

    let threshold = model.edge_threshold(target, k);
    if !edge_reduction || threshold == 0 {
        return graph;
    }

    reducer.apply_rules_exhaustively(&mut EdgeReduction { threshold }, &mut cores, graph)
}

/// `seed` followed by the vertices ordered after it that may share a solution with it
fn seed_neighborhood(
    graph: &Graph,
    ordering: &DegeneracyOrdering,
    seed: Node,
    two_hop: bool,
) -> Vec<Node> {
    let position = ordering.order_of(seed);
    let later = |u: Node| ordering.order_of(u) > position;

    if !two_hop {
        let mut nodes = vec![seed];
        nodes.extend_from_slice(&ordering.ordered()[position as usize + 1..]);
        return nodes;
    }

    let mut rest = Vec::new();
    for &v in graph.neighbors_of(seed) {
        if later(v) {
            rest.push(v);
        }
        rest.extend(
            graph
                .neighbors_of(v)
                .iter()
                .copied()
                .filter(|&w| w != seed && later(w)),
        );
    }
    rest.sort_unstable();
    rest.dedup();

    let mut nodes = Vec::with_capacity(rest.len() + 1);
    nodes.push(seed);
    nodes.extend(rest);
    nodes
}

/// Checks two necessary conditions for `seed` being the earliest vertex of a solution with
/// `target` vertices: it needs `target - 1 - k` later neighbors, and these must span at
/// least [`DefectModel::seed_color_threshold`] colors of `coloring`
fn seed_may_start_solution(
    graph: &Graph,
    ordering: &DegeneracyOrdering,
    coloring: &GreedyColoring,
    seed: Node,
    model: DefectModel,
    k: NumNodes,
    target: NumNodes,
) -> bool {
    let position = ordering.order_of(seed);
    let later = graph
        .neighbors_of(seed)
        .iter()
        .copied()
        .filter(|&v| ordering.order_of(v) > position)
        .collect_vec();

    if (later.len() as NumNodes) < model.core_threshold(target, k) {
        return false;
    }

    let colors = later.iter().map(|&v| coloring.color_of(v)).unique().count() as NumNodes;
    colors >= model.seed_color_threshold(target, k)
}

/// Searches all solutions improving `incumbent` whose earliest vertex is `seed`
fn search_seed<I: Incumbent>(
    graph: &Graph,
    ordering: &DegeneracyOrdering,
    seed: Node,
    config: &SearchConfig,
    k: NumNodes,
    control: SearchControl,
    incumbent: I,
) -> (I, SearchStats, ControlFlow<()>) {
    let model = config.model;
    let target = incumbent.best_size() + 1;
    let skip = |incumbent| (incumbent, SearchStats::default(), ControlFlow::Continue(()));

    if ordering.value_of(seed).saturating_add(k).saturating_add(1) < target {
        return skip(incumbent);
    }

    let nodes = seed_neighborhood(graph, ordering, seed, model.two_hop_bounded(target, k));
    if (nodes.len() as NumNodes) < target {
        return skip(incumbent);
    }

    // the seed keeps id 0 if it survives
    let sub = core_reduction(
        &graph.induced_subgraph(&nodes),
        model.core_threshold(target, k),
    );
    if (sub.number_of_nodes()) < target || sub.label_of(0) != graph.label_of(seed) {
        return skip(incumbent);
    }

    debug!("Seed {seed}: |C| = {}", sub.number_of_nodes() - 1);
    let coloring = (config.bound_kind() == BoundKind::Coloring)
        .then(|| GreedyColoring::new(&sub, target as i64 - k as i64));
    let mut context = SearchContext::new(&sub, config, k, control, coloring, incumbent);
    let flow = context.branch_from(0);
    let (incumbent, stats) = context.into_parts();
    (incumbent, stats, flow)
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg64Mcg;

    use super::*;
    use crate::testing::{brute_force_maximum, generate_random_graph_stream};

    fn solve(graph: &Graph, config: SearchConfig) -> SearchReport<Solution> {
        let report = DefectiveCliqueSolver::new(graph.clone(), config.clone())
            .unwrap()
            .solve();
        assert!(report.completed);
        let k = config.k as NumNodes;
        assert!(config.model.is_feasible(graph, &report.solution, k));
        report
    }

    fn complete_graph(n: NumNodes) -> Graph {
        let mut graph = Graph::new(n);
        for u in 0..n {
            for v in u + 1..n {
                graph.add_edge(u, v);
            }
        }
        graph
    }

    #[test]
    fn four_cycle() {
        let graph = Graph::from_edges(4, [(0, 1), (1, 2), (2, 3), (3, 0)]);
        for variant in [Variant::Seeded, Variant::WholeGraph, Variant::ReductionSearch] {
            let config = SearchConfig {
                variant,
                ..SearchConfig::with_budget(1)
            };
            assert_eq!(solve(&graph, config).solution, vec![0, 1, 2, 3]);
        }

        let config = SearchConfig {
            model: DefectModel::MissingEdges,
            ..SearchConfig::with_budget(1)
        };
        assert_eq!(solve(&graph, config).solution.len(), 3);
    }

    #[test]
    fn two_triangles() {
        let graph = Graph::from_edges(6, [(0, 1), (1, 2), (0, 2), (3, 4), (4, 5), (3, 5)]);
        let solution = solve(&graph, SearchConfig::with_budget(0)).solution;
        assert!(solution == vec![0, 1, 2] || solution == vec![3, 4, 5]);
    }

    #[test]
    fn edgeless_graph() {
        let graph = Graph::new(7);
        for warm_start in [false, true] {
            let config = SearchConfig {
                warm_start,
                ..SearchConfig::with_budget(0)
            };
            assert_eq!(solve(&graph, config).solution.len(), 1);
        }

        // k non-adjacent pairs per vertex allow k + 1 vertices
        assert_eq!(solve(&graph, SearchConfig::with_budget(2)).solution.len(), 3);
        assert!(solve(&Graph::new(0), SearchConfig::with_budget(0)).solution.is_empty());
    }

    #[test]
    fn complete_graphs() {
        let graph = complete_graph(5);
        for k in 0..4 {
            for model in [DefectModel::PerVertex, DefectModel::MissingEdges] {
                let config = SearchConfig {
                    model,
                    ..SearchConfig::with_budget(k)
                };
                assert_eq!(solve(&graph, config).solution, vec![0, 1, 2, 3, 4]);
            }
        }
    }

    #[test]
    fn agrees_with_brute_force() {
        let mut rng = Pcg64Mcg::seed_from_u64(0x1234);

        for (graph, _) in generate_random_graph_stream(&mut Pcg64Mcg::seed_from_u64(7), 14).take(150)
        {
            let k = rng.gen_range(0..4);
            let model = if rng.gen_bool(0.5) {
                DefectModel::PerVertex
            } else {
                DefectModel::MissingEdges
            };
            let expected = brute_force_maximum(&graph, model, k).len();

            for variant in [Variant::Seeded, Variant::WholeGraph, Variant::ReductionSearch] {
                let config = SearchConfig {
                    model,
                    variant,
                    warm_start: rng.gen_bool(0.5),
                    edge_reduction: rng.gen_bool(0.7),
                    ..SearchConfig::with_budget(k as i64)
                };
                assert_eq!(solve(&graph, config).solution.len(), expected);
            }
        }
    }

    #[test]
    fn whole_graph_defaults_to_bins() {
        let graph = complete_graph(4);
        let config = SearchConfig {
            variant: Variant::WholeGraph,
            ..SearchConfig::with_budget(1)
        };
        let mut best = BestSolution::default();
        let context = SearchContext::new(
            &graph,
            &config,
            1,
            SearchControl::default(),
            None,
            &mut best,
        );
        assert_eq!(context.bound, BoundKind::Bins);

        let config = SearchConfig {
            bound: Some(BoundKind::Coloring),
            ..config
        };
        let mut best = BestSolution::default();
        let context = SearchContext::new(
            &graph,
            &config,
            1,
            SearchControl::default(),
            None,
            &mut best,
        );
        assert_eq!(context.bound, BoundKind::Coloring);
    }

    #[test]
    fn huge_budget_on_tiny_graph() {
        let graph = Graph::from_edges(5, [(0, 1), (2, 3)]);
        for variant in [Variant::Seeded, Variant::WholeGraph, Variant::ReductionSearch] {
            for model in [DefectModel::PerVertex, DefectModel::MissingEdges] {
                for warm_start in [false, true] {
                    let config = SearchConfig {
                        model,
                        variant,
                        warm_start,
                        ..SearchConfig::with_budget(4_000_000_000)
                    };
                    assert_eq!(solve(&graph, config).solution, vec![0, 1, 2, 3, 4]);
                }
            }
        }
    }

    #[test]
    fn reduction_search_keeps_seeds_at_degree_threshold() {
        // K4 without the edge {0, 1}; vertex 0 comes first and has exactly
        // target - 1 - k later neighbors
        let graph = Graph::from_edges(4, [(0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
        let config = SearchConfig {
            model: DefectModel::MissingEdges,
            variant: Variant::ReductionSearch,
            warm_start: false,
            ..SearchConfig::with_budget(1)
        };
        let mut solver = DefectiveCliqueSolver::new(graph.clone(), config.clone()).unwrap();
        solver.set_initial_solution(&[1, 2, 3]).unwrap();
        let report = solver.solve();
        assert!(report.completed);
        assert_eq!(report.solution, vec![0, 1, 2, 3]);
    }

    #[test]
    fn seed_filter_is_necessary() {
        let mut rng = Pcg64Mcg::seed_from_u64(0xf117);

        for (graph, _) in generate_random_graph_stream(&mut Pcg64Mcg::seed_from_u64(3), 12).take(200)
        {
            let k = rng.gen_range(0..3);
            let model = if rng.gen_bool(0.5) {
                DefectModel::PerVertex
            } else {
                DefectModel::MissingEdges
            };
            let best = brute_force_maximum(&graph, model, k);
            if best.is_empty() {
                continue;
            }

            let ordering = DegeneracyOrdering::by_degree(&graph);
            let coloring = GreedyColoring::new(&graph, rng.gen_range(-1..4));
            let earliest = best
                .iter()
                .copied()
                .min_by_key(|&u| ordering.order_of(u))
                .unwrap();
            let target = best.len() as NumNodes;
            assert!(seed_may_start_solution(
                &graph, &ordering, &coloring, earliest, model, k, target
            ));
        }
    }

    #[test]
    fn reduction_is_idempotent() {
        let mut rng = Pcg64Mcg::seed_from_u64(0x1de);

        for _ in 0..100 {
            let n = rng.gen_range(1..40);
            let p = rng.gen_range(0.1..0.8);
            let graph = Graph::random_gnp(&mut rng, n, p);
            let k = rng.gen_range(0..3);
            let target = rng.gen_range(2..12);
            let model = if rng.gen_bool(0.5) {
                DefectModel::PerVertex
            } else {
                DefectModel::MissingEdges
            };

            let once = reduce_for_target(&graph, model, k, target, true);
            let twice = reduce_for_target(&once, model, k, target, true);
            assert_eq!(twice.number_of_nodes(), once.number_of_nodes());
            assert_eq!(twice.number_of_edges(), once.number_of_edges());
            assert!(once.vertices().all(|u| twice.label_of(u) == once.label_of(u)));
        }
    }

    #[test]
    fn initial_solution_and_hint() {
        let graph = complete_graph(6);
        let mut solver = DefectiveCliqueSolver::new(graph.clone(), SearchConfig::with_budget(0))
            .unwrap();
        assert!(matches!(
            solver.set_initial_solution(&[0, 9]),
            Err(SolverError::VertexOutOfRange(9))
        ));
        assert!(matches!(
            solver.set_initial_solution(&[1, 1]),
            Err(SolverError::InvalidInitialSolution(_))
        ));
        solver.set_initial_solution(&[0, 1, 2]).unwrap();
        assert_eq!(solver.solve().solution.len(), 6);

        let mut graph = Graph::new(6);
        graph.add_edges([(0, 1), (1, 2)]);
        let mut solver = DefectiveCliqueSolver::new(graph, SearchConfig::with_budget(0)).unwrap();
        assert!(matches!(
            solver.set_initial_solution(&[0, 2]),
            Err(SolverError::InvalidInitialSolution(_))
        ));

        // a hint equal to the optimum still yields an optimal solution
        let config = SearchConfig {
            lower_bound: Some(6),
            warm_start: false,
            ..SearchConfig::with_budget(0)
        };
        assert_eq!(solve(&complete_graph(6), config).solution.len(), 6);
    }

    #[test]
    fn cancelled_search_is_incomplete() {
        let mut rng = Pcg64Mcg::seed_from_u64(99);
        let graph = Graph::random_gnp(&mut rng, 60, 0.5);
        let config = SearchConfig {
            result_cap: Some(1),
            warm_start: false,
            ..SearchConfig::with_budget(1)
        };

        let report = DefectiveCliqueSolver::new(graph.clone(), config)
            .unwrap()
            .solve();
        assert!(!report.completed);
        assert_eq!(report.stats.solutions, 1);
        assert!(DefectModel::PerVertex.is_feasible(&graph, &report.solution, 1));
    }

    #[test]
    fn steps_until_completion() {
        let graph = complete_graph(4);
        let mut solver = DefectiveCliqueSolver::new(graph, SearchConfig::with_budget(0)).unwrap();
        let mut steps = 0;
        while !solver.is_completed() {
            solver.execute_step();
            steps += 1;
        }
        // preprocessing only, as the warm start already finds the clique
        assert_eq!(steps, 1);
        assert_eq!(solver.best_known_solution(), Some(vec![0, 1, 2, 3]));
        assert!(
            DefectiveCliqueSolver::new(Graph::new(2), SearchConfig::with_budget(-2)).is_err()
        );
    }
}
