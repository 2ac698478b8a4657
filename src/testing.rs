//! Brute-force reference solvers used to cross-check the search engines on small inputs.

use itertools::Itertools;
use rand::Rng;

use super::{exact::DefectModel, graph::*};

/// Endless stream of small random graphs with their edge probability
pub fn generate_random_graph_stream(
    rng: &mut impl Rng,
    max_nodes: NumNodes,
) -> impl Iterator<Item = (Graph, f64)> + '_ {
    std::iter::repeat_with(move || {
        let n = rng.gen_range(1..=max_nodes);
        let p = rng.gen_range(0.1..0.95);
        (Graph::random_gnp(rng, n, p), p)
    })
}

fn adjacency_masks(graph: &Graph) -> Vec<u32> {
    assert!(graph.number_of_nodes() <= 24);
    graph
        .vertices()
        .map(|u| {
            graph
                .neighbors_of(u)
                .iter()
                .fold(0u32, |mask, &v| mask | (1 << v))
        })
        .collect()
}

fn is_feasible_mask(adj: &[u32], model: DefectModel, k: NumNodes, set: u32) -> bool {
    let mut twice_missing = 0;
    let mut rest = set;
    while rest != 0 {
        let u = rest.trailing_zeros();
        rest &= rest - 1;
        let missing = (set & !adj[u as usize] & !(1 << u)).count_ones();
        if model == DefectModel::PerVertex && missing > k {
            return false;
        }
        twice_missing += missing;
    }
    model == DefectModel::PerVertex || twice_missing / 2 <= k
}

/// Largest feasible vertex set by exhaustive enumeration (first one in mask order on ties)
pub fn brute_force_maximum(graph: &Graph, model: DefectModel, k: NumNodes) -> Vec<Node> {
    let adj = adjacency_masks(graph);
    let n = graph.number_of_nodes();

    let best = (0u32..(1 << n))
        .filter(|&set| is_feasible_mask(&adj, model, k, set))
        .max_by_key(|set| (set.count_ones(), std::cmp::Reverse(*set)))
        .unwrap_or(0);

    (0..n).filter(|&u| best & (1 << u) != 0).collect()
}

/// Largest `|D|` with `D ⊆ candidates` such that `partial ∪ D` is feasible
pub fn max_feasible_extension(
    graph: &Graph,
    model: DefectModel,
    k: NumNodes,
    partial: &[Node],
    candidates: &[Node],
) -> NumNodes {
    let adj = adjacency_masks(graph);
    let base = partial.iter().fold(0u32, |m, &u| m | (1 << u));

    (0u32..(1 << candidates.len()))
        .filter_map(|sel| {
            let set = candidates
                .iter()
                .enumerate()
                .filter(|(i, _)| sel & (1 << i) != 0)
                .fold(base, |m, (_, &u)| m | (1 << u));
            is_feasible_mask(&adj, model, k, set).then(|| sel.count_ones())
        })
        .max()
        .unwrap_or(0)
}

/// Returns true iff every vertex on either side misses at most `k` vertices of the other side
pub fn is_biplex(graph: &BiGraph, left: &[Node], right: &[Node], k: NumNodes) -> bool {
    let misses = |side: Side, u: Node, others: &[Node]| {
        others.iter().filter(|&&v| !graph.has_edge(side, u, v)).count() as NumNodes
    };
    left.iter().all(|&l| misses(LEFT, l, right) <= k)
        && right.iter().all(|&r| misses(RIGHT, r, left) <= k)
}

/// All maximal k-biplexes with at least `q` vertices per side, each side sorted, in
/// lexicographic order
pub fn brute_force_maximal_biplexes(
    graph: &BiGraph,
    k: NumNodes,
    q: NumNodes,
) -> Vec<(Vec<Node>, Vec<Node>)> {
    let nl = graph.number_of_nodes(LEFT);
    let nr = graph.number_of_nodes(RIGHT);
    assert!(nl + nr <= 20);

    let members = |mask: u32, n: NumNodes| (0..n).filter(|&u| mask & (1 << u) != 0).collect_vec();
    let biplexes: Vec<(u32, u32)> = (0u32..(1 << nl))
        .cartesian_product(0u32..(1 << nr))
        .filter(|&(lm, rm)| is_biplex(graph, &members(lm, nl), &members(rm, nr), k))
        .collect();
    let is_member: fxhash::FxHashSet<(u32, u32)> = biplexes.iter().copied().collect();

    biplexes
        .iter()
        .filter(|&&(lm, rm)| {
            lm.count_ones() >= q
                && rm.count_ones() >= q
                && (0..nl).all(|u| lm & (1 << u) != 0 || !is_member.contains(&(lm | (1 << u), rm)))
                && (0..nr).all(|u| rm & (1 << u) != 0 || !is_member.contains(&(lm, rm | (1 << u))))
        })
        .map(|&(lm, rm)| (members(lm, nl), members(rm, nr)))
        .sorted()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_scenarios() {
        let cycle = Graph::from_edges(4, [(0, 1), (1, 2), (2, 3), (3, 0)]);
        assert_eq!(brute_force_maximum(&cycle, DefectModel::PerVertex, 1).len(), 4);
        assert_eq!(brute_force_maximum(&cycle, DefectModel::MissingEdges, 1).len(), 3);

        let graph = BiGraph::from_edges(2, 2, [(0, 0), (0, 1), (1, 0)]);
        assert_eq!(
            brute_force_maximal_biplexes(&graph, 1, 1),
            vec![(vec![0, 1], vec![0, 1])]
        );
        assert_eq!(
            brute_force_maximal_biplexes(&graph, 0, 1),
            vec![(vec![0], vec![0, 1]), (vec![0, 1], vec![0])]
        );
    }
}
