use std::mem::take;

use log::trace;

use super::{Biplex, BiplexOutcome};
use crate::{
    errors::{InvariantCheck, SearchInvariantError},
    exact::{PruningStrategy, SearchConfig, SearchControl, SearchMode, SearchStats, pruning::Peelable},
    graph::*,
    utils::ReversibleVertexSet,
};

#[derive(Clone, Copy, Debug)]
pub(super) struct Checkpoint {
    s_back: [usize; 2],
    c_front: [usize; 2],
    x_front: [usize; 2],
    trail: usize,
}

/// State of the biplex enumeration over one (reduced) bipartite graph.
///
/// Per side, `S` is the partial biplex, `C` holds the vertices that can join `S` on their
/// own and `X` the vertices that could join `S` but were excluded by an earlier branch; a
/// biplex is only maximal if no vertex of `X` is compatible with it. For every vertex `v`
/// on side `s`, `deg_s[s][v]` and `deg_c[s][v]` count the neighbors of `v` in `S` and `C`
/// of the opposite side.
///
/// The context owns its graph and is reused across seeds, so no per-seed allocation
/// proportional to the graph size is needed.
pub struct BiplexContext {
    pub(super) graph: BiGraph,
    pub(super) k: NumNodes,
    pub(super) q: NumNodes,
    pub(super) mode: SearchMode,
    pub(super) pruning: PruningStrategy,
    pub(super) control: SearchControl,
    pub(super) stats: SearchStats,
    pub(super) outcome: BiplexOutcome,
    collect: bool,
    floor: NumNodes,

    pub(super) s: [ReversibleVertexSet; 2],
    pub(super) c: [ReversibleVertexSet; 2],
    pub(super) x: [ReversibleVertexSet; 2],
    pub(super) deg_s: [Vec<NumNodes>; 2],
    pub(super) deg_c: [Vec<NumNodes>; 2],
    /// Exclusions since the root, undone in reverse order
    trail: Vec<(Side, Node)>,
    pub(super) need: NumNodes,

    pub(super) buffer: Vec<(Side, Node)>,
    saturated: Vec<Node>,
}

impl BiplexContext {
    /// Creates a context with all sets empty; see [`BiplexContext::load_root`]
    pub fn new(
        graph: BiGraph,
        config: &SearchConfig,
        k: NumNodes,
        control: SearchControl,
        collect: bool,
    ) -> Self {
        let n = [LEFT, RIGHT].map(|side| graph.number_of_nodes(side));

        Self {
            k,
            q: config.q,
            mode: config.mode,
            pruning: config.pruning,
            control,
            stats: SearchStats::default(),
            outcome: BiplexOutcome::default(),
            collect,
            floor: config.lower_bound.unwrap_or(0).saturating_sub(1),

            s: n.map(ReversibleVertexSet::new),
            c: n.map(ReversibleVertexSet::new),
            x: n.map(ReversibleVertexSet::new),
            deg_s: n.map(|n| vec![0; n as usize]),
            deg_c: n.map(|n| vec![0; n as usize]),
            trail: Vec::new(),
            need: 0,

            buffer: Vec::new(),
            saturated: Vec::new(),
            graph,
        }
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    pub fn outcome(&self) -> &BiplexOutcome {
        &self.outcome
    }

    pub fn into_parts(self) -> (BiplexOutcome, SearchStats) {
        (self.outcome, self.stats)
    }

    /// Replaces `C` and `X` of both sides; `S` has to be empty. The given vertex lists must
    /// not contain duplicates.
    pub fn load_root(&mut self, candidates: [&[Node]; 2], excluded: [&[Node]; 2]) {
        debug_assert!(self.s.iter().all(|s| s.is_empty()));

        for side in [LEFT, RIGHT] {
            let o = other(side);
            for pos in self.c[side].front_pos()..self.c[side].back_pos() {
                let u = self.c[side].at(pos);
                for &w in self.graph.neighbors_of(side, u) {
                    self.deg_c[o][w as usize] -= 1;
                }
            }
            self.c[side].clear();
            self.x[side].clear();
        }
        self.trail.clear();

        for side in [LEFT, RIGHT] {
            let o = other(side);
            for &u in candidates[side] {
                self.c[side].push_back(u);
                for &w in self.graph.neighbors_of(side, u) {
                    self.deg_c[o][w as usize] += 1;
                }
            }
            for &u in excluded[side] {
                self.x[side].push_back(u);
            }
        }
    }

    pub(super) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            s_back: [LEFT, RIGHT].map(|side| self.s[side].back_pos()),
            c_front: [LEFT, RIGHT].map(|side| self.c[side].front_pos()),
            x_front: [LEFT, RIGHT].map(|side| self.x[side].front_pos()),
            trail: self.trail.len(),
        }
    }

    pub(super) fn undo(&mut self, checkpoint: Checkpoint) {
        for side in [LEFT, RIGHT] {
            let o = other(side);

            while self.s[side].back_pos() > checkpoint.s_back[side] {
                let Some(u) = self.s[side].last() else {
                    break;
                };
                self.s[side].pop_back(u);
                for &w in self.graph.neighbors_of(side, u) {
                    self.deg_s[o][w as usize] -= 1;
                }
            }

            for pos in checkpoint.c_front[side]..self.c[side].front_pos() {
                let u = self.c[side].at(pos);
                for &w in self.graph.neighbors_of(side, u) {
                    self.deg_c[o][w as usize] += 1;
                }
            }
            self.c[side].restore_front(checkpoint.c_front[side]);
            self.x[side].restore_front(checkpoint.x_front[side]);
        }

        // excluded vertices may have been dropped from X in between, so they are taken out
        // by value once all drops are reverted
        while self.trail.len() > checkpoint.trail {
            if let Some((side, u)) = self.trail.pop() {
                self.x[side].pop_back(u);
            }
        }
    }

    /// Number of non-neighbors of `v` (on `side`) in `S` of the opposite side
    #[inline]
    pub(super) fn non_neighbors_in_s(&self, side: Side, v: Node) -> NumNodes {
        self.s[other(side)].len() as NumNodes - self.deg_s[side][v as usize]
    }

    /// Number of non-neighbors of `v` (on `side`) in `S ∪ C` of the opposite side
    #[inline]
    pub(super) fn non_neighbors_in_sc(&self, side: Side, v: Node) -> NumNodes {
        let o = other(side);
        (self.s[o].len() + self.c[o].len()) as NumNodes
            - self.deg_s[side][v as usize]
            - self.deg_c[side][v as usize]
    }

    pub(super) fn remove_candidate(&mut self, side: Side, u: Node) {
        debug_assert!(self.c[side].contains(u));
        self.c[side].pop_front(u);
        let o = other(side);
        for &w in self.graph.neighbors_of(side, u) {
            self.deg_c[o][w as usize] -= 1;
        }
    }

    /// Moves the candidate `u` into `X`
    pub(super) fn exclude(&mut self, side: Side, u: Node) {
        self.remove_candidate(side, u);
        debug_assert!(!self.x[side].contains(u));
        self.x[side].push_back(u);
        self.trail.push((side, u));
    }

    /// Removes `v` from `C` or `X`, whichever holds it
    fn drop_vertex(&mut self, side: Side, v: Node) {
        if self.c[side].contains(v) {
            self.remove_candidate(side, v);
        } else {
            self.x[side].pop_front(v);
        }
    }

    /// Moves the candidate `u` into `S` and drops all vertices of `C` and `X` that are not
    /// compatible with the enlarged `S`
    pub(super) fn include(&mut self, side: Side, u: Node) {
        let o = other(side);
        let k = self.k;

        self.remove_candidate(side, u);
        self.s[side].push_back(u);
        for &w in self.graph.neighbors_of(side, u) {
            self.deg_s[o][w as usize] += 1;
        }

        let mut buffer = take(&mut self.buffer);
        buffer.clear();

        // opposite side: their own budget and the budget of `u`
        let u_saturated = self.non_neighbors_in_s(side, u) == k;
        for set in [&self.c[o], &self.x[o]] {
            buffer.extend(
                set.iter()
                    .filter(|&v| {
                        self.non_neighbors_in_s(o, v) > k
                            || (u_saturated && !self.graph.has_edge(side, u, v))
                    })
                    .map(|v| (o, v)),
            );
        }

        // same side: members of S that just reached their budget
        let mut saturated = take(&mut self.saturated);
        saturated.clear();
        saturated.extend(self.s[o].iter().filter(|&p| {
            !self.graph.has_edge(side, u, p) && self.non_neighbors_in_s(o, p) == k
        }));
        if !saturated.is_empty() {
            for set in [&self.c[side], &self.x[side]] {
                buffer.extend(
                    set.iter()
                        .filter(|&w| saturated.iter().any(|&p| !self.graph.has_edge(side, w, p)))
                        .map(|w| (side, w)),
                );
            }
        }
        self.saturated = saturated;

        for &(s, v) in &buffer {
            self.drop_vertex(s, v);
        }
        self.buffer = buffer;
    }

    /// Returns true iff both sides can still reach `q` vertices
    pub(super) fn sides_reachable(&self) -> bool {
        [LEFT, RIGHT]
            .into_iter()
            .all(|side| (self.s[side].len() + self.c[side].len()) as NumNodes >= self.q)
    }

    /// Returns true iff `S ∪ C` is a biplex itself
    pub(super) fn closure_is_biplex(&self) -> bool {
        [LEFT, RIGHT].into_iter().all(|side| {
            self.s[side]
                .iter()
                .chain(self.c[side].iter())
                .all(|v| self.non_neighbors_in_sc(side, v) <= self.k)
        })
    }

    /// Returns true iff `x ∈ X` can be added to the biplex `S ∪ C`
    fn extends_closure(&self, side: Side, x: Node) -> bool {
        let o = other(side);
        self.non_neighbors_in_sc(side, x) <= self.k
            && self.s[o].iter().chain(self.c[o].iter()).all(|w| {
                self.graph.has_edge(side, x, w) || self.non_neighbors_in_sc(o, w) < self.k
            })
    }

    /// Returns true iff some vertex of `X` extends the biplex `S ∪ C`
    pub(super) fn closure_is_extendable(&self) -> bool {
        [LEFT, RIGHT]
            .into_iter()
            .any(|side| self.x[side].iter().any(|x| self.extends_closure(side, x)))
    }

    /// Returns true iff a vertex of `X` is adjacent to all of `S ∪ C` on the other side; it
    /// then extends every biplex of the subtree, so none of them is maximal
    pub(super) fn is_dominated(&self) -> bool {
        [LEFT, RIGHT].into_iter().any(|side| {
            self.x[side]
                .iter()
                .any(|x| self.non_neighbors_in_sc(side, x) == 0)
        })
    }

    /// Upper bound on the number of vertices on `side` of any biplex in the subtree. A
    /// member `p` of `S` on the other side tolerates at most `k - a(p)` further
    /// non-neighbors, where `a(p)` is its number of non-neighbors in `S`.
    pub(super) fn side_upper_bound(&self, side: Side) -> NumNodes {
        let o = other(side);
        let c_len = self.c[side].len() as NumNodes;
        let excess = self.s[o]
            .iter()
            .map(|p| {
                let in_c = c_len - self.deg_c[o][p as usize];
                let slack = self.k - self.non_neighbors_in_s(o, p);
                in_c.saturating_sub(slack)
            })
            .max()
            .unwrap_or(0);

        self.s[side].len() as NumNodes + c_len - excess
    }

    pub(super) fn total_size(&self, with_candidates: bool) -> NumNodes {
        let candidates = if with_candidates {
            self.c[LEFT].len() + self.c[RIGHT].len()
        } else {
            0
        };
        (self.s[LEFT].len() + self.s[RIGHT].len() + candidates) as NumNodes
    }

    /// Size of the largest biplex reported so far (or of the lower bound hint)
    pub(super) fn best_total(&self) -> NumNodes {
        self.outcome
            .best
            .as_ref()
            .map_or(0, |b| b.len() as NumNodes)
            .max(self.floor)
    }

    /// Reports the maximal biplex `S` (or `S ∪ C` if `with_candidates` is set)
    pub(super) fn offer(&mut self, with_candidates: bool) {
        self.stats.solutions += 1;
        self.outcome.count += 1;

        let total = self.total_size(with_candidates);
        let improves = total > self.best_total();
        if !improves && !self.collect {
            return;
        }

        let labels = |side: Side| {
            let mut nodes: Vec<Node> = self.s[side].iter().collect();
            if with_candidates {
                nodes.extend(self.c[side].iter());
            }
            for u in &mut nodes {
                *u = self.graph.label_of(side, *u);
            }
            nodes.sort_unstable();
            nodes
        };
        let biplex = Biplex {
            left: labels(LEFT),
            right: labels(RIGHT),
        };

        if self.collect {
            self.outcome.solutions.push(biplex.clone());
        }
        if improves {
            trace!("New largest biplex {} + {}", biplex.left.len(), biplex.right.len());
            self.stats.improvements += 1;
            self.outcome.best = Some(biplex);
        }
    }
}

impl Peelable for BiplexContext {
    type Item = (Side, Node);

    fn collect_violators(&self, out: &mut Vec<(Side, Node)>) {
        for side in [LEFT, RIGHT] {
            for set in [&self.c[side], &self.x[side]] {
                out.extend(
                    set.iter()
                        .map(|v| (side, v))
                        .filter(|&item| self.is_violator(item)),
                );
            }
        }
    }

    fn is_violator(&self, (side, v): (Side, Node)) -> bool {
        (self.c[side].contains(v) || self.x[side].contains(v))
            && self.deg_s[side][v as usize] + self.deg_c[side][v as usize] < self.need
    }

    fn remove_violator(&mut self, (side, v): (Side, Node), affected: &mut Vec<(Side, Node)>) {
        if !self.c[side].contains(v) {
            self.x[side].pop_front(v);
            return;
        }

        self.remove_candidate(side, v);
        let o = other(side);
        affected.extend(
            self.graph
                .neighbors_of(side, v)
                .iter()
                .filter(|&&w| self.c[o].contains(w) || self.x[o].contains(w))
                .map(|&w| (o, w)),
        );
    }
}

impl InvariantCheck<SearchInvariantError> for BiplexContext {
    fn is_correct(&self) -> Result<(), SearchInvariantError> {
        for side in [LEFT, RIGHT] {
            let o = other(side);

            for v in self.graph.vertices(side) {
                let memberships = self.s[side].contains(v) as u8
                    + self.c[side].contains(v) as u8
                    + self.x[side].contains(v) as u8;
                if memberships > 1 {
                    return Err(SearchInvariantError::Overlap(v));
                }
                if memberships == 0 {
                    continue;
                }

                let neighbors = self.graph.neighbors_of(side, v);
                let in_s = neighbors.iter().filter(|&&w| self.s[o].contains(w)).count();
                let in_c = neighbors.iter().filter(|&&w| self.c[o].contains(w)).count();

                for (counter, stored, expected) in [
                    ("deg_s", self.deg_s[side][v as usize], in_s as NumNodes),
                    ("deg_c", self.deg_c[side][v as usize], in_c as NumNodes),
                ] {
                    if stored != expected {
                        return Err(SearchInvariantError::CounterMismatch {
                            counter,
                            node: v,
                            stored,
                            expected,
                        });
                    }
                }
            }

            if self.s[side]
                .iter()
                .any(|v| self.non_neighbors_in_s(side, v) > self.k)
            {
                return Err(SearchInvariantError::Infeasible);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg64Mcg;

    use super::*;
    use crate::testing::is_biplex;

    fn members(set: &ReversibleVertexSet) -> Vec<Node> {
        let mut nodes: Vec<Node> = set.iter().collect();
        nodes.sort_unstable();
        nodes
    }

    #[test]
    fn include_keeps_compatible_candidates() {
        let mut rng = Pcg64Mcg::seed_from_u64(0xb1b1);

        for _ in 0..200 {
            let nl = rng.gen_range(1..8);
            let nr = rng.gen_range(1..8);
            let p = rng.gen_range(0.3..0.9);
            let graph = BiGraph::random_gnp(&mut rng, nl, nr, p);
            let k = rng.gen_range(0..3);
            let config = SearchConfig::with_budget(k as i64);

            let mut context =
                BiplexContext::new(graph.clone(), &config, k, SearchControl::default(), false);
            let all: [Vec<Node>; 2] = [LEFT, RIGHT].map(|side| graph.vertices(side).collect());
            context.load_root([&all[LEFT], &all[RIGHT]], [&[], &[]]);
            let root = context.checkpoint();

            for _ in 0..rng.gen_range(1..6) {
                let side = rng.gen_range(0..2);
                if context.c[side].is_empty() {
                    continue;
                }
                let pos = context.c[side].front_pos() + rng.gen_range(0..context.c[side].len());
                let u = context.c[side].at(pos);
                if rng.gen_bool(0.7) {
                    context.include(side, u);
                } else {
                    context.exclude(side, u);
                }
                assert!(context.is_correct().is_ok(), "{:?}", context.is_correct());

                // every remaining candidate fits, every dropped vertex does not
                let s = [members(&context.s[LEFT]), members(&context.s[RIGHT])];
                for side in [LEFT, RIGHT] {
                    for v in graph.vertices(side) {
                        if context.s[side].contains(v) {
                            continue;
                        }
                        let mut extended = s.clone();
                        extended[side].push(v);
                        let fits = is_biplex(&graph, &extended[LEFT], &extended[RIGHT], k);
                        let kept = context.c[side].contains(v) || context.x[side].contains(v);
                        assert!(!kept || fits);
                    }
                }
            }

            context.undo(root);
            assert!(context.is_correct().is_ok());
            assert!(context.s.iter().all(|s| s.is_empty()));
            assert!(context.x.iter().all(|x| x.is_empty()));
            assert_eq!(members(&context.c[LEFT]), all[LEFT]);
            assert_eq!(members(&context.c[RIGHT]), all[RIGHT]);
        }
    }

    #[test]
    fn reload_resets_counters() {
        let graph = BiGraph::from_edges(3, 3, [(0, 0), (0, 1), (1, 1), (2, 2), (1, 2)]);
        let config = SearchConfig::with_budget(1);
        let mut context = BiplexContext::new(graph, &config, 1, SearchControl::default(), false);

        context.load_root([&[0, 1, 2], &[0, 1, 2]], [&[], &[]]);
        assert_eq!(context.deg_c[LEFT], vec![2, 2, 1]);
        context.load_root([&[1], &[1, 2]], [&[0], &[]]);
        assert!(context.is_correct().is_ok());
        assert_eq!(context.deg_c[LEFT], vec![1, 2, 1]);
        assert_eq!(context.deg_c[RIGHT], vec![0, 1, 1]);
        assert_eq!(members(&context.x[LEFT]), vec![0]);
    }
}
