use super::DegeneracyOrdering;
use crate::graph::*;

const UNCOLORED: NumNodes = NumNodes::MAX;

/// Proper vertex coloring computed greedily in reverse degeneracy order.
///
/// Whenever a vertex receives a color of at least `tau`, a single recoloring attempt is made:
/// if some color `i < tau` is used by exactly one already colored neighbor `v`, and `v` can
/// switch to another free color `j < tau`, then `v` takes `j` and the vertex takes `i`.
/// The coloring serves as an upper-bound oracle only; its number of colors is not minimal.
#[derive(Clone, Debug, Default)]
pub struct GreedyColoring {
    colors: Vec<NumNodes>,
    number_of_colors: NumNodes,
}

impl GreedyColoring {
    /// Colors `graph`; a negative `tau` is treated as zero (no recoloring)
    pub fn new<G: AdjacencyList>(graph: &G, tau: i64) -> Self {
        let ordering = DegeneracyOrdering::new(graph);
        Self::with_ordering(graph, &ordering, tau)
    }

    pub fn with_ordering<G: AdjacencyList>(
        graph: &G,
        ordering: &DegeneracyOrdering,
        tau: i64,
    ) -> Self {
        let tau = tau.max(0) as usize;
        let n = graph.len();
        let mut colors = vec![UNCOLORED; n];
        let mut used = vec![false; (graph.max_degree() as usize + 2).max(tau + 1)];
        let mut bins: Vec<Vec<Node>> = vec![Vec::new(); tau];

        let mark = |used: &mut Vec<bool>, colors: &[NumNodes], u: Node, value: bool| {
            for &w in graph.neighbors_of(u) {
                let c = colors[w as usize];
                if c != UNCOLORED {
                    used[c as usize] = value;
                }
            }
        };

        for &u in ordering.ordered().iter().rev() {
            mark(&mut used, &colors, u, true);
            let color = (0..).find(|&c| !used[c]).unwrap_or(0);
            mark(&mut used, &colors, u, false);
            colors[u as usize] = color as NumNodes;

            if color < tau {
                continue;
            }

            for &w in graph.neighbors_of(u) {
                let c = colors[w as usize];
                if c != UNCOLORED && (c as usize) < tau {
                    bins[c as usize].push(w);
                }
            }

            for i in 0..tau {
                if bins[i].len() != 1 {
                    continue;
                }

                let v = bins[i][0];
                mark(&mut used, &colors, v, true);
                let free = (0..tau).find(|&j| j != i && !used[j]);
                mark(&mut used, &colors, v, false);

                if let Some(j) = free {
                    colors[v as usize] = j as NumNodes;
                    colors[u as usize] = i as NumNodes;
                    break;
                }
            }

            for bin in bins.iter_mut() {
                bin.clear();
            }
        }

        let number_of_colors = colors.iter().map(|&c| c + 1).max().unwrap_or(0);
        Self {
            colors,
            number_of_colors,
        }
    }

    pub fn color_of(&self, u: Node) -> NumNodes {
        self.colors[u as usize]
    }

    pub fn colors(&self) -> &[NumNodes] {
        &self.colors
    }

    pub fn number_of_colors(&self) -> NumNodes {
        self.number_of_colors
    }

    /// Returns true iff no edge connects two vertices of the same color
    pub fn is_proper<G: AdjacencyList>(&self, graph: &G) -> bool {
        graph
            .edges(true)
            .all(|Edge(u, v)| self.color_of(u) != self.color_of(v))
    }
}
