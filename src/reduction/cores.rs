use super::*;
use crate::graph::{AdjacencyList, LEFT, Node, RIGHT, Side, other};

/// Removes every vertex whose degree drops below `threshold`, cascading until the remaining
/// graph has minimum degree at least `threshold`. Returns the induced subgraph over the
/// survivors (labelled by their ids in `graph`).
pub fn core_reduction(graph: &Graph, threshold: NumNodes) -> Graph {
    let mut degree: Vec<NumNodes> = graph.degrees().collect();
    let mut removed = vec![false; graph.len()];
    let mut queue: Vec<Node> = graph
        .vertices()
        .filter(|&u| degree[u as usize] < threshold)
        .collect();

    for &u in &queue {
        removed[u as usize] = true;
    }

    while let Some(u) = queue.pop() {
        for &v in graph.neighbors_of(u) {
            if removed[v as usize] {
                continue;
            }
            degree[v as usize] -= 1;
            if degree[v as usize] < threshold {
                removed[v as usize] = true;
                queue.push(v);
            }
        }
    }

    graph.induced_subgraph_by(|u| !removed[u as usize])
}

/// Bipartite analogue of [`core_reduction`]: a vertex on side `s` survives only if it keeps
/// at least `min_degree[s]` neighbors.
pub fn bipartite_core_reduction(graph: &BiGraph, min_degree: [NumNodes; 2]) -> BiGraph {
    let mut degree: [Vec<NumNodes>; 2] =
        [LEFT, RIGHT].map(|s| graph.vertices(s).map(|u| graph.degree_of(s, u)).collect());
    let mut removed: [Vec<bool>; 2] =
        [LEFT, RIGHT].map(|s| vec![false; graph.number_of_nodes(s) as usize]);
    let mut queue: Vec<(Side, Node)> = Vec::new();

    for side in [LEFT, RIGHT] {
        for u in graph.vertices(side) {
            if degree[side][u as usize] < min_degree[side] {
                removed[side][u as usize] = true;
                queue.push((side, u));
            }
        }
    }

    while let Some((side, u)) = queue.pop() {
        let o = other(side);
        for &v in graph.neighbors_of(side, u) {
            if removed[o][v as usize] {
                continue;
            }
            degree[o][v as usize] -= 1;
            if degree[o][v as usize] < min_degree[o] {
                removed[o][v as usize] = true;
                queue.push((o, v));
            }
        }
    }

    let keep: [Vec<bool>; 2] = removed.map(|r| r.into_iter().map(|x| !x).collect());
    graph.induced_subgraph([&keep[LEFT], &keep[RIGHT]])
}

/// Peels a [`Graph`] down to its `threshold`-core
pub struct CoreReduction {
    pub threshold: NumNodes,
}

impl ReductionRule<Graph> for CoreReduction {
    const NAME: &str = "CoreReduction";

    fn apply_rule(&mut self, graph: Graph) -> Graph {
        if self.threshold == 0 {
            return graph;
        }
        core_reduction(&graph, self.threshold)
    }
}

/// Peels a [`BiGraph`] down to its `(alpha, beta)`-core
pub struct BipartiteCoreReduction {
    pub min_degree: [NumNodes; 2],
}

impl ReductionRule<BiGraph> for BipartiteCoreReduction {
    const NAME: &str = "BipartiteCoreReduction";

    fn apply_rule(&mut self, graph: BiGraph) -> BiGraph {
        if self.min_degree == [0, 0] {
            return graph;
        }
        bipartite_core_reduction(&graph, self.min_degree)
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg64Mcg;

    use super::*;
    use crate::graph::{AdjacencyTest, Edge, GnpGenerator};

    #[test]
    fn clique_with_tail() {
        // K4 on {0,1,2,3} plus the path 3-4-5
        let graph = Graph::from_edges(
            6,
            [(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3), (3, 4), (4, 5)],
        );

        let core = core_reduction(&graph, 3);
        assert_eq!(core.number_of_nodes(), 4);
        assert_eq!(core.number_of_edges(), 6);
        assert_eq!(core.labels(), &[0, 1, 2, 3]);

        assert_eq!(core_reduction(&graph, 2).number_of_nodes(), 4);
        assert_eq!(core_reduction(&graph, 4).number_of_nodes(), 0);
        assert_eq!(core_reduction(&graph, 0).number_of_nodes(), 6);
    }

    #[test]
    fn idempotent() {
        let mut rng = Pcg64Mcg::seed_from_u64(77);

        for _ in 0..100 {
            let n = rng.gen_range(1..80);
            let graph = Graph::random_gnp(&mut rng, n, 0.1);
            let threshold = rng.gen_range(0..6);

            let once = core_reduction(&graph, threshold);
            assert!(once.degrees().all(|d| d >= threshold));

            let twice = core_reduction(&once, threshold);
            assert_eq!(twice.number_of_nodes(), once.number_of_nodes());
            assert_eq!(
                twice.edges(true).collect_vec(),
                once.edges(true).collect_vec()
            );

            // no vertex of the core was dropped needlessly
            for u in once.vertices() {
                for v in once.vertices() {
                    assert_eq!(
                        once.has_edge(u, v),
                        graph.has_edge(once.label_of(u), once.label_of(v))
                    );
                }
            }
        }
    }

    #[test]
    fn bipartite_core() {
        // left 0 connects to everything, left 1 only to right 0, right 2 only to left 0
        let graph = BiGraph::from_edges(3, 3, [(0, 0), (0, 1), (0, 2), (1, 0), (2, 0), (2, 1)]);
        let core = bipartite_core_reduction(&graph, [2, 2]);

        assert_eq!(core.number_of_nodes(LEFT), 2);
        assert_eq!(core.number_of_nodes(RIGHT), 2);
        assert_eq!(core.edges().collect_vec(), vec![Edge(0, 0), Edge(0, 1), Edge(1, 0), Edge(1, 1)]);
        assert_eq!(core.label_of(LEFT, 1), 2);

        let again = bipartite_core_reduction(&core, [2, 2]);
        assert_eq!(again.edges().collect_vec(), core.edges().collect_vec());
    }
}
