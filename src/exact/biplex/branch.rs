use std::{cmp::Reverse, mem::take, ops::ControlFlow};

use log::trace;

use super::context::BiplexContext;
use crate::{errors::InvariantCheck, exact::SearchMode, graph::*};

impl BiplexContext {
    /// Reports every maximal biplex `H` with `S ⊆ H ⊆ S ∪ C` and at least `q` vertices per
    /// side. The state is restored before returning, also if the search is cancelled.
    pub fn branch(&mut self) -> ControlFlow<()> {
        let checkpoint = self.checkpoint();
        let result = self.visit();
        self.undo(checkpoint);
        result
    }

    /// Includes `seed` (a candidate on `side`) and explores all extensions
    pub fn branch_from(&mut self, side: Side, seed: Node) -> ControlFlow<()> {
        let checkpoint = self.checkpoint();
        self.include(side, seed);
        let result = self.visit();
        self.undo(checkpoint);
        result
    }

    fn visit(&mut self) -> ControlFlow<()> {
        self.stats.branches += 1;
        self.control.check(&self.stats)?;
        debug_assert!(self.is_correct().is_ok(), "{:?}", self.is_correct());

        if !self.sides_reachable() || !self.can_improve() || !self.prune_by_degree() {
            return ControlFlow::Continue(());
        }

        if self.c.iter().all(|c| c.is_empty()) {
            if self.x.iter().all(|x| x.is_empty()) {
                self.offer(false);
            }
            return ControlFlow::Continue(());
        }

        if self.is_dominated() {
            return ControlFlow::Continue(());
        }

        if self.closure_is_biplex() {
            if !self.closure_is_extendable() {
                self.offer(true);
            }
            return ControlFlow::Continue(());
        }

        if self.fold_universal() {
            return self.visit();
        }

        let bounds = [LEFT, RIGHT].map(|side| self.side_upper_bound(side));
        if bounds[LEFT] < self.q
            || bounds[RIGHT] < self.q
            || (self.mode == SearchMode::FindMaximum
                && bounds[LEFT] + bounds[RIGHT] <= self.best_total())
        {
            self.stats.bound_prunes += 1;
            return ControlFlow::Continue(());
        }

        let Some((side, pivot)) = self.select_branch() else {
            return ControlFlow::Continue(());
        };
        trace!("Branch on {pivot} of side {side}");

        let checkpoint = self.checkpoint();
        self.include(side, pivot);
        let result = self.branch();
        self.undo(checkpoint);
        result?;

        self.exclude(side, pivot);
        self.visit()
    }

    /// In [`SearchMode::FindMaximum`], only subtrees that may beat the incumbent are explored
    fn can_improve(&self) -> bool {
        self.mode != SearchMode::FindMaximum || self.total_size(true) > self.best_total()
    }

    /// Drops vertices of `C` and `X` with fewer than `q - k` neighbors in `S ∪ C`. Returns
    /// false if a member of `S` misses the requirement or a side became too small.
    fn prune_by_degree(&mut self) -> bool {
        self.need = self.q.saturating_sub(self.k);
        if self.need == 0 {
            return true;
        }

        let mut buffer = take(&mut self.buffer);
        self.pruning.peel(self, &mut buffer);
        self.buffer = buffer;

        let need = self.need;
        let violated = [LEFT, RIGHT].into_iter().any(|side| {
            self.s[side]
                .iter()
                .any(|p| self.deg_s[side][p as usize] + self.deg_c[side][p as usize] < need)
        });

        !violated && self.sides_reachable()
    }

    /// Moves candidates adjacent to all of `S ∪ C` on the other side into `S`; every maximal
    /// biplex of the subtree contains them. Returns true if anything moved.
    fn fold_universal(&mut self) -> bool {
        let mut buffer = take(&mut self.buffer);
        buffer.clear();
        for side in [LEFT, RIGHT] {
            buffer.extend(
                self.c[side]
                    .iter()
                    .filter(|&v| self.non_neighbors_in_sc(side, v) == 0)
                    .map(|v| (side, v)),
            );
        }

        let folded = !buffer.is_empty();
        for &(side, v) in &buffer {
            if self.c[side].contains(v) {
                self.include(side, v);
            }
        }
        self.buffer = buffer;
        folded
    }

    /// If a member of `S` has more than `k` non-neighbors in `S ∪ C`, one of its candidate
    /// non-neighbors has to go; branch on the first. Otherwise each side proposes its
    /// candidate with the most candidate neighbors, and the proposal missing fewer
    /// candidates of the other side becomes the pivot.
    fn select_branch(&mut self) -> Option<(Side, Node)> {
        for side in [LEFT, RIGHT] {
            let o = other(side);
            let forced = self.s[side]
                .iter()
                .find(|&p| self.non_neighbors_in_sc(side, p) > self.k)
                .and_then(|p| {
                    self.c[o]
                        .iter()
                        .find(|&w| !self.graph.has_edge(side, p, w))
                });

            if let Some(w) = forced {
                self.stats.bipartite_branches += 1;
                return Some((o, w));
            }
        }

        self.stats.pivot_branches += 1;
        [LEFT, RIGHT]
            .into_iter()
            .filter_map(|side| {
                let degrees = &self.deg_c[side];
                let pivot = self.c[side]
                    .iter()
                    .min_by_key(|&v| Reverse(degrees[v as usize]))?;
                let missing = self.c[other(side)].len() as NumNodes - degrees[pivot as usize];
                Some((missing, side, pivot))
            })
            .min_by_key(|&(missing, _, _)| missing)
            .map(|(_, side, pivot)| (side, pivot))
    }
}
