use super::*;
use crate::graph::NumEdges;

use log::info;
use std::marker::PhantomData;

/// Effect of a single rule application
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReductionStats {
    pub name: &'static str,
    pub removed_nodes: NumNodes,
    pub removed_edges: NumEdges,
}

pub struct Reducer<G> {
    history: Vec<ReductionStats>,
    _graph: PhantomData<G>,
}

impl<G> Default for Reducer<G> {
    fn default() -> Self {
        Self {
            history: Default::default(),
            _graph: Default::default(),
        }
    }
}

impl<G: ReducibleGraph> Reducer<G> {
    pub fn new() -> Self {
        Default::default()
    }

    /// Apply the rule `R` once and print out some statistics.
    /// Returns the reduced graph and whether the rule changed anything.
    pub fn apply_rule<R: ReductionRule<G>>(&mut self, rule: &mut R, graph: G) -> (G, bool) {
        let before_nodes = graph.total_number_of_nodes();
        let before_edges = graph.number_of_edges();

        let graph = rule.apply_rule(graph);

        let delta_nodes = before_nodes - graph.total_number_of_nodes();
        let delta_edges = before_edges - graph.number_of_edges();
        let changed = delta_nodes > 0 || delta_edges > 0;

        info!(
            "{} n -= {delta_nodes}, m -= {delta_edges}, n = {}, m = {}",
            R::NAME,
            graph.total_number_of_nodes(),
            graph.number_of_edges()
        );

        self.history.push(ReductionStats {
            name: R::NAME,
            removed_nodes: delta_nodes,
            removed_edges: delta_edges,
        });

        (graph, changed)
    }

    /// Applies all rules in turn until none of them changes the graph any more.
    pub fn apply_rules_exhaustively<R1, R2>(
        &mut self,
        first: &mut R1,
        second: &mut R2,
        mut graph: G,
    ) -> G
    where
        R1: ReductionRule<G>,
        R2: ReductionRule<G>,
    {
        loop {
            let (g, _) = self.apply_rule(first, graph);
            // each rule runs to its own fixpoint, so the pair is done once `second` is idle
            let (g, changed) = self.apply_rule(second, g);
            graph = g;

            if !changed {
                return graph;
            }
        }
    }

    pub fn history(&self) -> &[ReductionStats] {
        &self.history
    }
}
