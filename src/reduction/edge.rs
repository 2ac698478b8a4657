use fxhash::FxHashMap;

use super::*;
use crate::graph::{AdjacencyList, AdjacencyTest, Edge, EdgeOps, Node, NumEdges};

/// Removes every edge that closes fewer than `threshold` triangles, cascading until each
/// remaining edge has at least `threshold` common neighbors among the remaining edges.
/// Edges are removed in place; vertices are kept (possibly isolated).
/// Returns the number of removed edges.
pub fn edge_reduction(graph: &mut Graph, threshold: NumNodes) -> NumEdges {
    if threshold == 0 {
        return 0;
    }

    let edges: Vec<Edge> = graph.edges(true).collect();
    let ids: FxHashMap<Edge, usize> = edges.iter().enumerate().map(|(i, &e)| (e, i)).collect();
    let id_of = |u: Node, v: Node| ids[&Edge(u, v).normalized()];

    let mut support: Vec<NumNodes> = edges
        .iter()
        .map(|&Edge(u, v)| {
            let (a, b) = if graph.degree_of(u) <= graph.degree_of(v) {
                (u, v)
            } else {
                (v, u)
            };
            graph
                .neighbors_of(a)
                .iter()
                .filter(|&&w| graph.has_edge(b, w))
                .count() as NumNodes
        })
        .collect();

    let mut removed = vec![false; edges.len()];
    let mut queue: Vec<usize> = (0..edges.len())
        .filter(|&e| support[e] < threshold)
        .collect();
    for &e in &queue {
        removed[e] = true;
    }

    let mut number_removed = 0;
    while let Some(e) = queue.pop() {
        let Edge(u, v) = edges[e];

        // triangles through {u, v} whose other two edges are still present
        for &w in graph.neighbors_of(u) {
            if !graph.has_edge(u, w) || !graph.has_edge(v, w) {
                continue;
            }

            for f in [id_of(u, w), id_of(v, w)] {
                if removed[f] {
                    continue;
                }
                support[f] -= 1;
                if support[f] < threshold {
                    removed[f] = true;
                    queue.push(f);
                }
            }
        }

        graph.detach_edge(u, v);
        number_removed += 1;
    }

    graph.compact_neighborhoods();
    number_removed
}

/// Drops edges with too few common neighbors. Vertices are kept; pair it with a
/// [`super::CoreReduction`] to remove those that lost too many edges.
pub struct EdgeReduction {
    pub threshold: NumNodes,
}

impl ReductionRule<Graph> for EdgeReduction {
    const NAME: &str = "EdgeReduction";

    fn apply_rule(&mut self, mut graph: Graph) -> Graph {
        edge_reduction(&mut graph, self.threshold);
        graph
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg64Mcg;

    use super::*;
    use crate::graph::GnpGenerator;

    fn common_neighbors(graph: &Graph, u: Node, v: Node) -> NumNodes {
        graph
            .vertices()
            .filter(|&w| graph.has_edge(u, w) && graph.has_edge(v, w))
            .count() as NumNodes
    }

    #[test]
    fn triangle_with_pendant() {
        // triangle {0,1,2} plus the edge 2-3
        let mut graph = Graph::from_edges(4, [(0, 1), (1, 2), (0, 2), (2, 3)]);
        assert_eq!(edge_reduction(&mut graph, 1), 1);
        assert!(!graph.has_edge(2, 3));
        assert_eq!(graph.number_of_edges(), 3);
        assert_eq!(graph.degree_of(3), 0);

        let mut graph = Graph::from_edges(4, [(0, 1), (1, 2), (0, 2), (2, 3)]);
        assert_eq!(edge_reduction(&mut graph, 2), 4);
        assert_eq!(graph.number_of_edges(), 0);
    }

    #[test]
    fn fixpoint() {
        let mut rng = Pcg64Mcg::seed_from_u64(91);

        for _ in 0..100 {
            let n = rng.gen_range(2..50);
            let original = Graph::random_gnp(&mut rng, n, 0.3);
            let threshold = rng.gen_range(1..5);

            let mut graph = original.clone();
            edge_reduction(&mut graph, threshold);

            for Edge(u, v) in graph.edges(true).collect_vec() {
                assert!(common_neighbors(&graph, u, v) >= threshold);
                assert!(original.has_edge(u, v));
            }
            assert_eq!(
                graph.degrees().map(|d| d as NumEdges).sum::<NumEdges>(),
                2 * graph.number_of_edges()
            );

            let before = graph.edges(true).collect_vec();
            assert_eq!(edge_reduction(&mut graph, threshold), 0);
            assert_eq!(graph.edges(true).collect_vec(), before);
        }
    }

    #[test]
    fn combined_with_cores() {
        // two triangles sharing vertex 2 plus a path 4-5-6 hanging off vertex 4
        let graph = Graph::from_edges(
            7,
            [(0, 1), (1, 2), (0, 2), (2, 3), (3, 4), (2, 4), (4, 5), (5, 6)],
        );

        let mut reducer = Reducer::new();
        let reduced = reducer.apply_rules_exhaustively(
            &mut EdgeReduction { threshold: 1 },
            &mut CoreReduction { threshold: 2 },
            graph,
        );

        assert_eq!(reduced.number_of_nodes(), 5);
        assert_eq!(reduced.number_of_edges(), 6);
        assert_eq!(reduced.labels(), &[0, 1, 2, 3, 4]);
        assert!(reducer.history().len() >= 2);
    }
}
