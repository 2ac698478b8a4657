use crate::graph::*;
use rand::Rng;
use rand_distr::Geometric;

pub trait GnpGenerator: Sized {
    /// Generates a Gilbert graph: each of the `n(n-1)/2` possible edges exists independently
    /// with probability `p`.
    fn random_gnp<R: Rng>(rng: &mut R, n: Node, p: f64) -> Self;
}

impl<G> GnpGenerator for G
where
    G: GraphNew + GraphEdgeEditing,
{
    fn random_gnp<R: Rng>(rng: &mut R, n: Node, p: f64) -> Self {
        let mut result = Self::new(n);
        let n = n as u64;

        // pairs (u, v) with u < v, enumerated row by row
        let mut row = 0;
        let mut row_start = 0;
        for x in bernoulli_indices(rng, n * n.saturating_sub(1) / 2, p) {
            while x >= row_start + (n - 1 - row) {
                row_start += n - 1 - row;
                row += 1;
            }
            let v = row + 1 + (x - row_start);
            result.add_edge(row as Node, v as Node);
        }

        result
    }
}

impl BiGraph {
    /// Bipartite analogue of [`GnpGenerator::random_gnp`]: each of the `n_left * n_right`
    /// possible edges exists independently with probability `p`
    pub fn random_gnp<R: Rng>(rng: &mut R, n_left: Node, n_right: Node, p: f64) -> Self {
        let width = (n_right as u64).max(1);
        let edges: Vec<_> = bernoulli_indices(rng, n_left as u64 * n_right as u64, p)
            .into_iter()
            .map(|x| Edge((x / width) as Node, (x % width) as Node))
            .collect();

        BiGraph::from_edges(n_left, n_right, edges)
    }
}

/// Increasing indices in `0..total`, each drawn independently with probability `p`.
/// The gaps between drawn indices are geometric, so the cost is linear in the output.
fn bernoulli_indices<R: Rng>(rng: &mut R, total: u64, p: f64) -> Vec<u64> {
    if total == 0 || p <= 0.0 {
        return Vec::new();
    }
    if p >= 1.0 {
        return (0..total).collect();
    }
    let Ok(gaps) = Geometric::new(p) else {
        return Vec::new();
    };

    let mut indices = Vec::new();
    let mut next = 0u64;
    while let Some(x) = next.checked_add(rng.sample(gaps)) {
        if x >= total {
            break;
        }
        indices.push(x);
        next = x + 1;
    }
    indices
}
