use fxhash::FxHashMap;

use super::*;
use crate::{
    graph::{Edge, LEFT, Node, RIGHT},
    utils::LinearHeap,
};

/// Number of butterflies (4-cycles) every edge of a k-biplex with at least `q` vertices per
/// side is part of; zero if no such bound is known (`q <= 2k + 1`)
pub fn butterfly_threshold(q: NumNodes, k: NumNodes) -> u64 {
    let q = q as u64;
    let k = k as u64;
    if q <= 2 * k + 1 {
        return 0;
    }
    (q - k - 1) * (q - 2 * k - 1)
}

/// Removes every edge contained in fewer than `threshold` butterflies, cascading until the
/// remaining edges all reach the threshold. Vertices without remaining edges are dropped.
pub fn butterfly_reduction(graph: &BiGraph, threshold: u64) -> BiGraph {
    if threshold == 0 {
        return graph.clone();
    }

    let edges: Vec<Edge> = graph.edges().collect();
    let ids: FxHashMap<Edge, u32> = edges
        .iter()
        .enumerate()
        .map(|(i, &e)| (e, i as u32))
        .collect();

    let mut support = count_butterflies(graph, &edges);

    // heap keys are capped at the threshold
    let cap = |s: u64| s.min(threshold) as u32;
    let mut heap = LinearHeap::build(edges.len(), 0..edges.len() as u32, |e| {
        cap(support[e as usize])
    });

    let decrement = |heap: &mut LinearHeap, support: &mut Vec<u64>, e: u32| {
        if support[e as usize] <= threshold {
            heap.dec(e);
        }
        support[e as usize] -= 1;
    };

    while let Some(e) = heap.top() {
        if heap.value(e) as u64 >= threshold {
            break;
        }
        heap.pop();

        let Edge(l, r) = edges[e as usize];
        for &r2 in graph.neighbors_of(LEFT, l) {
            let e_lr2 = ids[&Edge(l, r2)];
            if r2 == r || !heap.contains(e_lr2) {
                continue;
            }

            for &l2 in graph.neighbors_of(RIGHT, r) {
                let e_l2r = ids[&Edge(l2, r)];
                if l2 == l || !heap.contains(e_l2r) || !graph.has_edge(LEFT, l2, r2) {
                    continue;
                }
                let e_l2r2 = ids[&Edge(l2, r2)];
                if !heap.contains(e_l2r2) {
                    continue;
                }

                for f in [e_lr2, e_l2r, e_l2r2] {
                    decrement(&mut heap, &mut support, f);
                }
            }
        }
    }

    graph.retain_edges(|l, r| heap.contains(ids[&Edge(l, r)]))
}

/// Butterfly support of every edge via wedge counting
fn count_butterflies(graph: &BiGraph, edges: &[Edge]) -> Vec<u64> {
    let n_left = graph.number_of_nodes(LEFT) as usize;
    let mut wedges = vec![0u64; n_left];
    let mut touched: Vec<Node> = Vec::new();
    let mut support = vec![0u64; edges.len()];

    // edges are grouped by their left endpoint
    let mut begin = 0;
    while begin < edges.len() {
        let l = edges[begin].0;
        let end = begin + graph.degree_of(LEFT, l) as usize;

        for &r in graph.neighbors_of(LEFT, l) {
            for &l2 in graph.neighbors_of(RIGHT, r) {
                if l2 != l {
                    if wedges[l2 as usize] == 0 {
                        touched.push(l2);
                    }
                    wedges[l2 as usize] += 1;
                }
            }
        }

        for (i, &Edge(_, r)) in edges[begin..end].iter().enumerate() {
            support[begin + i] = graph
                .neighbors_of(RIGHT, r)
                .iter()
                .filter(|&&l2| l2 != l)
                .map(|&l2| wedges[l2 as usize] - 1)
                .sum();
        }

        for l2 in touched.drain(..) {
            wedges[l2 as usize] = 0;
        }
        begin = end;
    }

    support
}

pub struct ButterflyReduction {
    pub threshold: u64,
}

impl ReductionRule<BiGraph> for ButterflyReduction {
    const NAME: &str = "ButterflyReduction";

    fn apply_rule(&mut self, graph: BiGraph) -> BiGraph {
        if self.threshold == 0 {
            return graph;
        }
        butterfly_reduction(&graph, self.threshold)
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg64Mcg;

    use super::*;

    fn naive_support(graph: &BiGraph, Edge(l, r): Edge) -> u64 {
        let mut count = 0;
        for l2 in graph.vertices(LEFT).filter(|&x| x != l) {
            for r2 in graph.vertices(RIGHT).filter(|&x| x != r) {
                if graph.has_edge(LEFT, l, r2)
                    && graph.has_edge(LEFT, l2, r)
                    && graph.has_edge(LEFT, l2, r2)
                {
                    count += 1;
                }
            }
        }
        count
    }

    #[test]
    fn support_matches_naive() {
        let mut rng = Pcg64Mcg::seed_from_u64(5);
        for _ in 0..50 {
            let nl = rng.gen_range(1..15);
            let nr = rng.gen_range(1..15);
            let graph = BiGraph::random_gnp(&mut rng, nl, nr, 0.4);
            let edges = graph.edges().collect_vec();
            let support = count_butterflies(&graph, &edges);
            for (e, s) in edges.iter().zip(support) {
                assert_eq!(naive_support(&graph, *e), s);
            }
        }
    }

    #[test]
    fn complete_bipartite_survives() {
        // K_{3,3} plus a pendant edge
        let mut edges: Vec<(Node, Node)> = (0..3).cartesian_product(0..3).collect();
        edges.push((3, 0));
        let graph = BiGraph::from_edges(4, 3, edges);

        let reduced = butterfly_reduction(&graph, 4);
        assert_eq!(reduced.number_of_edges(), 9);
        assert_eq!(reduced.number_of_nodes(LEFT), 3);

        let reduced = butterfly_reduction(&graph, 5);
        assert_eq!(reduced.number_of_edges(), 0);
    }

    #[test]
    fn fixpoint() {
        let mut rng = Pcg64Mcg::seed_from_u64(6);
        for _ in 0..50 {
            let graph = BiGraph::random_gnp(&mut rng, 12, 12, 0.5);
            let threshold = rng.gen_range(1..8);
            let reduced = butterfly_reduction(&graph, threshold);

            for e in reduced.edges() {
                assert!(naive_support(&reduced, e) >= threshold);
            }
            assert_eq!(
                butterfly_reduction(&reduced, threshold).number_of_edges(),
                reduced.number_of_edges()
            );
        }
    }

    #[test]
    fn threshold() {
        assert_eq!(butterfly_threshold(3, 1), 0);
        assert_eq!(butterfly_threshold(5, 1), 3 * 2);
    }
}
