//! Enumeration of maximal k-biplexes and search for the largest one.
//!
//! A k-biplex is a pair of vertex sets `(L, R)` of a bipartite graph where every vertex
//! misses at most `k` vertices of the other set. Only biplexes with at least `q` vertices
//! per side are of interest. After reducing the graph to its `(q-k, q-k)`-core (and, if
//! `q > 2k + 1`, peeling edges with too little butterfly support), either a single search
//! over all vertices is run, or, if `q > 2k`, one search per vertex `u` of the seed side:
//! any two vertices of that side of a biplex share a neighbor, so only vertices within
//! distance two of `u` have to be considered. Vertices ordered before `u` are kept in `X`
//! to detect non-maximal biplexes.

mod branch;
mod context;

pub use context::BiplexContext;

use std::{mem::replace, ops::ControlFlow, time::Instant};

use log::info;
use serde::Serialize;

use super::*;
use crate::{
    algorithm::{IterativeAlgorithm, TerminatingIterativeAlgorithm},
    errors::SolverError,
    graph::*,
    ordering::DegeneracyOrdering,
    reduction::{BipartiteCoreReduction, ButterflyReduction, Reducer, butterfly_threshold},
};

/// A biplex given by the input labels of its sides, each sorted
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Biplex {
    pub left: Vec<Node>,
    pub right: Vec<Node>,
}

impl Biplex {
    pub fn len(&self) -> usize {
        self.left.len() + self.right.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct BiplexOutcome {
    /// Number of reported maximal biplexes
    pub count: u64,
    /// Largest reported biplex
    pub best: Option<Biplex>,
    /// All reported biplexes, if collection was requested
    pub solutions: Vec<Biplex>,
}

type SidePair = [Vec<Node>; 2];

/// Computes `C` and `X` for the search rooted at a seed vertex
struct SeedBuilder {
    side: Side,
    /// seed-side vertices by their position in the degeneracy ordering
    order: Vec<Node>,
    rank: Vec<NumNodes>,
    mark: Vec<bool>,
    hits: Vec<NumNodes>,
}

impl SeedBuilder {
    fn new(graph: &BiGraph, side: Side) -> Self {
        let ordering = DegeneracyOrdering::new(&graph.as_graph());
        let offset = if side == LEFT {
            0
        } else {
            graph.number_of_nodes(LEFT)
        };

        let mut order: Vec<Node> = graph.vertices(side).collect();
        order.sort_by_key(|&u| ordering.order_of(u + offset));
        let mut rank = vec![0; order.len()];
        for (i, &u) in order.iter().enumerate() {
            rank[u as usize] = i as NumNodes;
        }

        Self {
            side,
            order,
            rank,
            mark: vec![false; graph.number_of_nodes(side) as usize],
            hits: vec![0; graph.number_of_nodes(other(side)) as usize],
        }
    }

    /// Returns `(C, X)` per side for the seed `u`, or `None` if no biplex with `q` vertices
    /// per side has `u` as its earliest seed-side vertex
    fn build(
        &mut self,
        graph: &BiGraph,
        u: Node,
        q: NumNodes,
        k: NumNodes,
    ) -> Option<(SidePair, SidePair)> {
        let (side, o) = (self.side, other(self.side));

        let mut near = Vec::new();
        self.mark[u as usize] = true;
        for &v in graph.neighbors_of(side, u) {
            for &w in graph.neighbors_of(o, v) {
                if !self.mark[w as usize] {
                    self.mark[w as usize] = true;
                    near.push(w);
                }
            }
        }
        self.mark[u as usize] = false;
        for &w in &near {
            self.mark[w as usize] = false;
        }

        near.sort_unstable();
        let (later, earlier): (Vec<Node>, Vec<Node>) = near
            .into_iter()
            .partition(|&w| self.rank[w as usize] > self.rank[u as usize]);
        if (later.len() as NumNodes) + 1 < q {
            return None;
        }

        let mut seed_side = Vec::with_capacity(later.len() + 1);
        seed_side.push(u);
        seed_side.extend(later);

        // vertices of the other side need q - k neighbors among the seed-side candidates
        let mut touched = Vec::new();
        for &w in &seed_side {
            for &v in graph.neighbors_of(side, w) {
                if self.hits[v as usize] == 0 {
                    touched.push(v);
                }
                self.hits[v as usize] += 1;
            }
        }
        touched.sort_unstable();
        let need = q.saturating_sub(k);
        let other_side: Vec<Node> = touched
            .iter()
            .copied()
            .filter(|&v| self.hits[v as usize] >= need)
            .collect();
        for &v in &touched {
            self.hits[v as usize] = 0;
        }

        if (other_side.len() as NumNodes) < q {
            return None;
        }

        let mut candidates = [Vec::new(), Vec::new()];
        let mut excluded = [Vec::new(), Vec::new()];
        candidates[side] = seed_side;
        candidates[o] = other_side;
        excluded[side] = earlier;
        Some((candidates, excluded))
    }
}

enum Phase {
    Preprocess,
    Seeds {
        context: Box<BiplexContext>,
        builder: SeedBuilder,
        /// seeds at positions `0..remaining` are still to be processed
        remaining: usize,
    },
    Root {
        context: Box<BiplexContext>,
    },
    Done,
}

pub struct BiplexSolver {
    input: BiGraph,
    config: SearchConfig,
    k: NumNodes,
    collect: bool,
    start: Instant,
    control: SearchControl,
    phase: Phase,
    outcome: BiplexOutcome,
    stats: SearchStats,
    interrupted: bool,
}

impl BiplexSolver {
    pub fn new(graph: BiGraph, config: SearchConfig) -> Result<Self, SolverError> {
        let k = config.validate_biplex()?;
        let start = Instant::now();

        Ok(Self {
            input: graph,
            k,
            collect: false,
            start,
            control: SearchControl::new(&config, start),
            config,
            phase: Phase::Preprocess,
            outcome: BiplexOutcome::default(),
            stats: SearchStats::default(),
            interrupted: false,
        })
    }

    /// Keep every reported biplex in [`BiplexOutcome::solutions`]
    pub fn collect_solutions(mut self, collect: bool) -> Self {
        self.collect = collect;
        self
    }

    pub fn report(&self) -> SearchReport<BiplexOutcome> {
        let (outcome, stats) = match &self.phase {
            Phase::Seeds { context, .. } | Phase::Root { context } => {
                (context.outcome().clone(), *context.stats())
            }
            _ => (self.outcome.clone(), self.stats),
        };

        SearchReport {
            solution: outcome,
            stats,
            elapsed: self.start.elapsed(),
            completed: self.is_completed() && !self.interrupted,
        }
    }

    pub fn solve(mut self) -> SearchReport<BiplexOutcome> {
        self.run_to_completion();
        self.report()
    }

    fn preprocess(&mut self) -> Phase {
        let (q, k) = (self.config.q, self.k);
        let need = q.saturating_sub(k);

        let mut reducer = Reducer::new();
        let mut cores = BipartiteCoreReduction {
            min_degree: [need, need],
        };
        let (graph, _) = reducer.apply_rule(&mut cores, std::mem::take(&mut self.input));

        let threshold = butterfly_threshold(q, k);
        let graph = if threshold > 0 {
            reducer.apply_rules_exhaustively(&mut ButterflyReduction { threshold }, &mut cores, graph)
        } else {
            graph
        };

        if graph.number_of_nodes(LEFT) < q || graph.number_of_nodes(RIGHT) < q {
            info!("Reductions leave fewer than q={q} vertices on a side");
            return Phase::Done;
        }

        let collect = self.collect;
        if q > k.saturating_mul(2) {
            let side = self.config.side.select(&graph);
            let builder = SeedBuilder::new(&graph, side);
            info!(
                "Seeding from side {side}: {} vertices, {} on the other side",
                builder.order.len(),
                graph.number_of_nodes(other(side))
            );
            let remaining = builder.order.len();
            let context = BiplexContext::new(graph, &self.config, k, self.control, collect);

            Phase::Seeds {
                context: Box::new(context),
                builder,
                remaining,
            }
        } else {
            let all = [LEFT, RIGHT].map(|side| graph.vertices(side).collect::<Vec<_>>());
            let mut context = BiplexContext::new(graph, &self.config, k, self.control, collect);
            context.load_root([&all[LEFT], &all[RIGHT]], [&[], &[]]);
            Phase::Root {
                context: Box::new(context),
            }
        }
    }

    fn process_seed(
        &mut self,
        mut context: Box<BiplexContext>,
        mut builder: SeedBuilder,
        remaining: usize,
    ) -> Phase {
        if remaining == 0 {
            return self.finish(context, ControlFlow::Continue(()));
        }
        // short seed searches never reach the periodic deadline check
        if self.control.timed_out() {
            return self.finish(context, ControlFlow::Break(()));
        }

        let index = remaining - 1;
        let seed = builder.order[index];
        let flow = match builder.build(&context.graph, seed, self.config.q, self.k) {
            Some((candidates, excluded)) => {
                context.load_root(
                    [&candidates[LEFT], &candidates[RIGHT]],
                    [&excluded[LEFT], &excluded[RIGHT]],
                );
                context.branch_from(builder.side, seed)
            }
            None => ControlFlow::Continue(()),
        };

        if flow.is_break() {
            self.finish(context, flow)
        } else {
            Phase::Seeds {
                context,
                builder,
                remaining: index,
            }
        }
    }

    fn finish(&mut self, context: Box<BiplexContext>, flow: ControlFlow<()>) -> Phase {
        let (outcome, stats) = context.into_parts();
        self.outcome = outcome;
        self.stats = stats;
        self.interrupted |= flow.is_break();

        info!(
            "Biplex search finished: {} reported, largest = {}, branches = {}, completed = {}",
            self.outcome.count,
            self.outcome.best.as_ref().map_or(0, |b| b.len()),
            self.stats.branches,
            !self.interrupted
        );
        Phase::Done
    }
}

impl IterativeAlgorithm<BiplexOutcome> for BiplexSolver {
    fn execute_step(&mut self) {
        let phase = replace(&mut self.phase, Phase::Done);

        self.phase = match phase {
            Phase::Preprocess => self.preprocess(),

            Phase::Seeds {
                context,
                builder,
                remaining,
            } => self.process_seed(context, builder, remaining),

            Phase::Root { mut context } => {
                let flow = context.branch();
                self.finish(context, flow)
            }

            Phase::Done => Phase::Done,
        };
    }

    fn is_completed(&self) -> bool {
        matches!(self.phase, Phase::Done)
    }

    fn best_known_solution(&mut self) -> Option<BiplexOutcome> {
        Some(self.report().solution)
    }
}

impl TerminatingIterativeAlgorithm<BiplexOutcome> for BiplexSolver {}
