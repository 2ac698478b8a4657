use log::debug;

use crate::{exact::DefectModel, graph::*, ordering::DegeneracyOrdering};

/// # Greedy warm start
///
/// Starting from each of the `seeds` vertices with the largest core numbers, repeatedly adds
/// the vertex with the most neighbors in the current set that keeps the set feasible (ties
/// are broken by the larger degree). Returns the largest set found, as labels of `graph`.
pub fn greedy_defective_clique(
    graph: &Graph,
    model: DefectModel,
    k: NumNodes,
    seeds: usize,
) -> Vec<Node> {
    if graph.is_empty() {
        return Vec::new();
    }

    let ordering = DegeneracyOrdering::new(graph);
    let mut builder = GreedyBuilder::new(graph, model, k);
    let mut best: Vec<Node> = Vec::new();

    for &seed in ordering.ordered().iter().rev().take(seeds.max(1)) {
        // the set contains at most core number + k + 1 vertices
        if ordering.value_of(seed).saturating_add(k).saturating_add(1) as usize <= best.len() {
            continue;
        }

        builder.grow_from(seed);
        if builder.set.len() > best.len() {
            best.clone_from(&builder.set);
        }
        builder.reset();
    }

    debug!("Greedy warm start found a set of size {}", best.len());
    best.iter().map(|&u| graph.label_of(u)).collect()
}

struct GreedyBuilder<'a> {
    graph: &'a Graph,
    model: DefectModel,
    k: NumNodes,
    set: Vec<Node>,
    in_set: Vec<bool>,
    /// neighbors in `set`
    deg_s: Vec<NumNodes>,
    /// vertices with `deg_s > 0`
    touched: Vec<Node>,
    missing: NumNodes,
}

impl<'a> GreedyBuilder<'a> {
    fn new(graph: &'a Graph, model: DefectModel, k: NumNodes) -> Self {
        Self {
            graph,
            model,
            k,
            set: Vec::new(),
            in_set: vec![false; graph.len()],
            deg_s: vec![0; graph.len()],
            touched: Vec::new(),
            missing: 0,
        }
    }

    fn reset(&mut self) {
        for &u in &self.set {
            self.in_set[u as usize] = false;
        }
        for &u in &self.touched {
            self.deg_s[u as usize] = 0;
        }
        self.set.clear();
        self.touched.clear();
        self.missing = 0;
    }

    fn non_neighbors_in_set(&self, u: Node) -> NumNodes {
        self.set.len() as NumNodes - self.in_set[u as usize] as NumNodes - self.deg_s[u as usize]
    }

    fn can_add(&self, u: Node) -> bool {
        if self.in_set[u as usize] {
            return false;
        }
        let a = self.non_neighbors_in_set(u);
        match self.model {
            DefectModel::MissingEdges => self.missing + a <= self.k,
            DefectModel::PerVertex => {
                a <= self.k
                    && self.set.iter().all(|&w| {
                        self.graph.has_edge(u, w) || self.non_neighbors_in_set(w) < self.k
                    })
            }
        }
    }

    fn add(&mut self, u: Node) {
        self.missing += self.non_neighbors_in_set(u);
        self.set.push(u);
        self.in_set[u as usize] = true;
        for &w in self.graph.neighbors_of(u) {
            if self.deg_s[w as usize] == 0 {
                self.touched.push(w);
            }
            self.deg_s[w as usize] += 1;
        }
    }

    fn grow_from(&mut self, seed: Node) {
        self.add(seed);

        loop {
            let next = self
                .touched
                .iter()
                .copied()
                .filter(|&u| self.can_add(u))
                .max_by_key(|&u| (self.deg_s[u as usize], self.graph.degree_of(u)));

            // a non-adjacent vertex only fits while the budget allows it
            let next = next.or_else(|| {
                (self.set.len() as NumNodes <= self.k)
                    .then(|| {
                        self.graph
                            .vertices()
                            .find(|&u| self.deg_s[u as usize] == 0 && self.can_add(u))
                    })
                    .flatten()
            });

            match next {
                Some(u) => self.add(u),
                None => break,
            }
        }
    }
}
