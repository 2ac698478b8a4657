use std::mem::take;

use log::trace;

use crate::{
    errors::{InvariantCheck, SearchInvariantError},
    exact::{
        BoundKind, DefectModel, Incumbent, PivotRule, PruningStrategy, SearchConfig,
        SearchControl, SearchStats, pruning::Peelable,
    },
    graph::*,
    ordering::GreedyColoring,
    utils::ReversibleVertexSet,
};

/// Boundaries of the search state; restoring them undoes every mutation made since
#[derive(Clone, Copy, Debug)]
pub(super) struct Checkpoint {
    s_back: usize,
    c_front: usize,
    missing: NumNodes,
}

/// State of one branch-and-bound run over `graph`.
///
/// `S` is the partial solution, `C` holds the candidates, i.e. the vertices that can be
/// added to `S` individually without exceeding the defect budget. For *every* vertex `v`
/// of `graph` the counters `deg_s[v]` and `deg_c[v]` hold the number of neighbors of `v`
/// in `S` and `C`; `missing` is the number of non-adjacent pairs inside `S`.
pub struct SearchContext<'a, I: Incumbent> {
    pub(super) graph: &'a Graph,
    pub(super) k: NumNodes,
    pub(super) model: DefectModel,
    pub(super) bound: BoundKind,
    pub(super) pruning: PruningStrategy,
    pub(super) pivot: PivotRule,
    pub(super) collapse_rules: bool,
    pub(super) control: SearchControl,
    pub(super) coloring: Option<GreedyColoring>,
    pub(super) incumbent: I,
    pub(super) stats: SearchStats,

    pub(super) s: ReversibleVertexSet,
    pub(super) c: ReversibleVertexSet,
    pub(super) deg_s: Vec<NumNodes>,
    pub(super) deg_c: Vec<NumNodes>,
    pub(super) missing: NumNodes,
    /// Degree into `S ∪ C` every member of a solution improving the incumbent needs
    pub(super) need: NumNodes,

    pub(super) buffer: Vec<Node>,
    saturated: Vec<Node>,
    solution: Vec<Node>,
    pub(super) classes: Vec<Vec<NumNodes>>,
    pub(super) bins: Vec<NumNodes>,
}

impl<'a, I: Incumbent> SearchContext<'a, I> {
    /// Creates a context with `S = ∅` and `C = V(graph)`
    pub fn new(
        graph: &'a Graph,
        config: &SearchConfig,
        k: NumNodes,
        control: SearchControl,
        coloring: Option<GreedyColoring>,
        incumbent: I,
    ) -> Self {
        let n = graph.number_of_nodes();
        let number_of_colors = coloring.as_ref().map_or(0, |c| c.number_of_colors());

        Self {
            graph,
            k,
            model: config.model,
            bound: config.bound_kind(),
            pruning: config.pruning,
            pivot: config.pivot,
            collapse_rules: config.collapse_rules,
            control,
            coloring,
            incumbent,
            stats: SearchStats::default(),

            s: ReversibleVertexSet::new(n),
            c: ReversibleVertexSet::from_nodes(n, graph.vertices_range()),
            deg_s: vec![0; n as usize],
            deg_c: graph.degrees().collect(),
            missing: 0,
            need: 0,

            buffer: Vec::new(),
            saturated: Vec::new(),
            solution: Vec::new(),
            classes: vec![Vec::new(); number_of_colors as usize],
            // costs never exceed `2n - 2`
            bins: vec![0; (k as usize).min(2 * n as usize) + 1],
        }
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    pub fn into_parts(self) -> (I, SearchStats) {
        (self.incumbent, self.stats)
    }

    pub(super) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            s_back: self.s.back_pos(),
            c_front: self.c.front_pos(),
            missing: self.missing,
        }
    }

    /// Reverts `S`, `C` and all counters to the state at `checkpoint`
    pub(super) fn undo(&mut self, checkpoint: Checkpoint) {
        while self.s.back_pos() > checkpoint.s_back {
            let Some(u) = self.s.last() else {
                break;
            };
            self.s.pop_back(u);
            for &w in self.graph.neighbors_of(u) {
                self.deg_s[w as usize] -= 1;
            }
        }

        for pos in checkpoint.c_front..self.c.front_pos() {
            let u = self.c.at(pos);
            for &w in self.graph.neighbors_of(u) {
                self.deg_c[w as usize] += 1;
            }
        }
        self.c.restore_front(checkpoint.c_front);
        self.missing = checkpoint.missing;
    }

    /// Number of members of `S` not adjacent to `u` (excluding `u` itself)
    #[inline]
    pub(super) fn non_neighbors_in_s(&self, u: Node) -> NumNodes {
        let others = self.s.len() as NumNodes - self.s.contains(u) as NumNodes;
        others - self.deg_s[u as usize]
    }

    /// Number of vertices of `S ∪ C` not adjacent to `u`, where `u ∈ S ∪ C`
    #[inline]
    pub(super) fn non_neighbors_in_sc(&self, u: Node) -> NumNodes {
        let others = (self.s.len() + self.c.len()) as NumNodes - 1;
        others - self.deg_s[u as usize] - self.deg_c[u as usize]
    }

    pub(super) fn remove_candidate(&mut self, u: Node) {
        debug_assert!(self.c.contains(u));
        self.c.pop_front(u);
        for &w in self.graph.neighbors_of(u) {
            self.deg_c[w as usize] -= 1;
        }
    }

    /// Moves the candidate `u` into `S` and removes all candidates that cannot join the
    /// enlarged `S` any more
    pub(super) fn include(&mut self, u: Node) {
        self.remove_candidate(u);
        self.missing += self.non_neighbors_in_s(u);
        self.s.push_back(u);
        for &w in self.graph.neighbors_of(u) {
            self.deg_s[w as usize] += 1;
        }

        let mut buffer = take(&mut self.buffer);
        buffer.clear();

        match self.model {
            DefectModel::MissingEdges => {
                let budget = self.k - self.missing;
                buffer.extend(self.c.iter().filter(|&v| self.non_neighbors_in_s(v) > budget));
            }

            DefectModel::PerVertex => {
                // members of S that just reached the budget; candidates must be adjacent to them
                self.saturated.clear();
                if self.non_neighbors_in_s(u) == self.k {
                    self.saturated.push(u);
                }
                for w in self.s.iter() {
                    if w != u
                        && !self.graph.has_edge(u, w)
                        && self.non_neighbors_in_s(w) == self.k
                    {
                        self.saturated.push(w);
                    }
                }

                buffer.extend(self.c.iter().filter(|&v| {
                    self.non_neighbors_in_s(v) > self.k
                        || self.saturated.iter().any(|&w| !self.graph.has_edge(v, w))
                }));
            }
        }

        for &v in &buffer {
            self.remove_candidate(v);
        }
        self.buffer = buffer;
    }

    /// Offers `S` (and `C` if `with_candidates` is set) to the incumbent
    pub(super) fn offer(&mut self, with_candidates: bool) {
        let size = self.s.len() + if with_candidates { self.c.len() } else { 0 };
        if size as NumNodes <= self.incumbent.best_size() {
            return;
        }

        let candidates: &[Node] = if with_candidates {
            self.c.as_slice()
        } else {
            &[]
        };
        self.solution.clear();
        self.solution.extend(
            self.s
                .as_slice()
                .iter()
                .chain(candidates)
                .map(|&u| self.graph.label_of(u)),
        );

        if self.incumbent.try_improve(&self.solution) {
            self.stats.solutions += 1;
            self.stats.improvements += 1;
            trace!("New incumbent of size {size}");
        }
    }

    /// Returns true iff `S ∪ C` itself respects the defect budget
    pub(super) fn closure_is_feasible(&self) -> bool {
        match self.model {
            DefectModel::PerVertex => self
                .s
                .iter()
                .chain(self.c.iter())
                .all(|u| self.non_neighbors_in_sc(u) <= self.k),
            DefectModel::MissingEdges => {
                let budget = self.k - self.missing;
                let c_len = self.c.len() as NumNodes;
                let mut to_s: NumNodes = 0;
                let mut twice_inside: NumNodes = 0;
                for u in self.c.iter() {
                    to_s += self.non_neighbors_in_s(u);
                    twice_inside += c_len - 1 - self.deg_c[u as usize];
                    if to_s > budget {
                        return false;
                    }
                }
                to_s + twice_inside / 2 <= budget
            }
        }
    }
}

impl<I: Incumbent> Peelable for SearchContext<'_, I> {
    type Item = Node;

    fn collect_violators(&self, out: &mut Vec<Node>) {
        out.extend(self.c.iter().filter(|&u| self.is_violator(u)));
    }

    fn is_violator(&self, u: Node) -> bool {
        self.c.contains(u) && self.deg_s[u as usize] + self.deg_c[u as usize] < self.need
    }

    fn remove_violator(&mut self, u: Node, affected: &mut Vec<Node>) {
        self.remove_candidate(u);
        affected.extend(
            self.graph
                .neighbors_of(u)
                .iter()
                .copied()
                .filter(|&w| self.c.contains(w)),
        );
    }
}

impl<I: Incumbent> InvariantCheck<SearchInvariantError> for SearchContext<'_, I> {
    fn is_correct(&self) -> Result<(), SearchInvariantError> {
        if let Some(u) = self.s.iter().find(|&u| self.c.contains(u)) {
            return Err(SearchInvariantError::Overlap(u));
        }

        for u in self.s.iter().chain(self.c.iter()) {
            let neighbors = self.graph.neighbors_of(u);
            let in_s = neighbors.iter().filter(|&&w| self.s.contains(w)).count() as NumNodes;
            let in_c = neighbors.iter().filter(|&&w| self.c.contains(w)).count() as NumNodes;

            for (counter, stored, expected) in [
                ("deg_s", self.deg_s[u as usize], in_s),
                ("deg_c", self.deg_c[u as usize], in_c),
            ] {
                if stored != expected {
                    return Err(SearchInvariantError::CounterMismatch {
                        counter,
                        node: u,
                        stored,
                        expected,
                    });
                }
            }
        }

        let twice_missing: NumNodes = self.s.iter().map(|u| self.non_neighbors_in_s(u)).sum();
        if twice_missing / 2 != self.missing {
            return Err(SearchInvariantError::CounterMismatch {
                counter: "missing",
                node: Node::MAX,
                stored: self.missing,
                expected: twice_missing / 2,
            });
        }

        if !self.model.is_feasible(self.graph, self.s.as_slice(), self.k) {
            return Err(SearchInvariantError::Infeasible);
        }

        Ok(())
    }
}
