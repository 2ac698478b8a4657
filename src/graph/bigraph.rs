use super::*;

/// Index of a side of a [`BiGraph`]: `0` is the left side, `1` the right side
pub type Side = usize;

pub const LEFT: Side = 0;
pub const RIGHT: Side = 1;

/// Returns the opposite side
#[inline]
pub fn other(side: Side) -> Side {
    side ^ 1
}

/// Bipartite graph with separate id spaces per side. Vertex `u` of side `s` is adjacent
/// only to vertices of side `other(s)`.
#[derive(Clone, Debug, Default)]
pub struct BiGraph {
    adj: [Vec<Vec<Node>>; 2],
    index: [Vec<AdjacencyIndex>; 2],
    labels: [Vec<Node>; 2],
    number_of_edges: NumEdges,
}

impl GraphEdgeOrder for BiGraph {
    fn number_of_edges(&self) -> NumEdges {
        self.number_of_edges
    }
}

impl BiGraph {
    pub fn new(n_left: NumNodes, n_right: NumNodes) -> Self {
        let make_adj = |n: NumNodes| vec![Vec::new(); n as usize];
        let make_index = |n: NumNodes| vec![AdjacencyIndex::new(); n as usize];
        Self {
            adj: [make_adj(n_left), make_adj(n_right)],
            index: [make_index(n_left), make_index(n_right)],
            labels: [(0..n_left).collect(), (0..n_right).collect()],
            number_of_edges: 0,
        }
    }

    /// Builds a bipartite graph from `Edge(left, right)` pairs; parallel edges are dropped
    pub fn from_edges(
        n_left: NumNodes,
        n_right: NumNodes,
        edges: impl IntoIterator<Item = impl Into<Edge>>,
    ) -> Self {
        let mut graph = Self::new(n_left, n_right);
        for Edge(l, r) in edges.into_iter().map(|e| e.into()) {
            graph.try_add_edge(l, r);
        }
        graph
    }

    /// Adds the edge between left vertex `l` and right vertex `r`; returns true iff it is new
    pub fn try_add_edge(&mut self, l: Node, r: Node) -> bool {
        if !self.index[LEFT][l as usize].insert(r) {
            return false;
        }
        self.index[RIGHT][r as usize].insert(l);
        self.adj[LEFT][l as usize].push(r);
        self.adj[RIGHT][r as usize].push(l);
        self.number_of_edges += 1;
        true
    }

    pub fn number_of_nodes(&self, side: Side) -> NumNodes {
        self.adj[side].len() as NumNodes
    }

    pub fn total_number_of_nodes(&self) -> NumNodes {
        self.number_of_nodes(LEFT) + self.number_of_nodes(RIGHT)
    }

    pub fn vertices(&self, side: Side) -> std::ops::Range<Node> {
        0..self.number_of_nodes(side)
    }

    pub fn neighbors_of(&self, side: Side, u: Node) -> &[Node] {
        &self.adj[side][u as usize]
    }

    pub fn degree_of(&self, side: Side, u: Node) -> NumNodes {
        self.adj[side][u as usize].len() as NumNodes
    }

    pub fn max_degree(&self, side: Side) -> NumNodes {
        self.adj[side]
            .iter()
            .map(|l| l.len() as NumNodes)
            .max()
            .unwrap_or(0)
    }

    /// Returns true iff `u` (on `side`) is adjacent to `v` (on the other side)
    pub fn has_edge(&self, side: Side, u: Node, v: Node) -> bool {
        self.index[side][u as usize].contains(v)
    }

    pub fn label_of(&self, side: Side, u: Node) -> Node {
        self.labels[side][u as usize]
    }

    /// Iterates over all edges as `Edge(left, right)`
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.adj[LEFT]
            .iter()
            .enumerate()
            .flat_map(|(l, nbs)| nbs.iter().map(move |&r| Edge(l as Node, r)))
    }

    /// Returns the subgraph induced by the vertices with `keep[side][u]` set. Ids are
    /// compacted per side (preserving their order) and labels composed.
    pub fn induced_subgraph(&self, keep: [&[bool]; 2]) -> BiGraph {
        self.filtered(keep, |_, _| true)
    }

    /// Returns a copy containing only the edges `Edge(l, r)` accepted by `keep_edge`.
    /// Vertices left without edges are dropped.
    pub fn retain_edges(&self, mut keep_edge: impl FnMut(Node, Node) -> bool) -> BiGraph {
        let mut alive = [
            vec![false; self.number_of_nodes(LEFT) as usize],
            vec![false; self.number_of_nodes(RIGHT) as usize],
        ];
        let mut kept = Vec::new();
        for Edge(l, r) in self.edges() {
            if keep_edge(l, r) {
                alive[LEFT][l as usize] = true;
                alive[RIGHT][r as usize] = true;
                kept.push(Edge(l, r));
            }
        }

        let kept: fxhash::FxHashSet<Edge> = kept.into_iter().collect();
        self.filtered([&alive[LEFT], &alive[RIGHT]], |l, r| {
            kept.contains(&Edge(l, r))
        })
    }

    fn filtered(&self, keep: [&[bool]; 2], keep_edge: impl Fn(Node, Node) -> bool) -> BiGraph {
        let mapping: [Vec<Node>; 2] = [LEFT, RIGHT].map(|side| {
            let mut next = 0;
            keep[side]
                .iter()
                .map(|&k| {
                    if k {
                        next += 1;
                        next - 1
                    } else {
                        Node::MAX
                    }
                })
                .collect()
        });

        let count = |side: Side| keep[side].iter().filter(|&&k| k).count() as NumNodes;
        let mut result = BiGraph::new(count(LEFT), count(RIGHT));
        for side in [LEFT, RIGHT] {
            result.labels[side] = self.labels[side]
                .iter()
                .zip(keep[side])
                .filter(|(_, k)| **k)
                .map(|(&label, _)| label)
                .collect();
        }

        for Edge(l, r) in self.edges() {
            let (ml, mr) = (mapping[LEFT][l as usize], mapping[RIGHT][r as usize]);
            if ml != Node::MAX && mr != Node::MAX && keep_edge(l, r) {
                result.try_add_edge(ml, mr);
            }
        }

        result
    }

    /// Views both sides as one general graph; right vertex `r` becomes `n_left + r`
    pub fn as_graph(&self) -> Graph {
        let offset = self.number_of_nodes(LEFT);
        Graph::from_edges(
            self.total_number_of_nodes(),
            self.edges().map(|Edge(l, r)| Edge(l, offset + r)),
        )
    }
}
