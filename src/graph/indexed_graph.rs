use std::ops::Range;

use super::*;

/// Undirected simple graph with adjacency lists and a hashed adjacency index per vertex.
///
/// Every vertex carries a label; reductions produce compacted graphs whose labels refer
/// to the vertex ids of the graph they were derived from (transitively the input ids).
#[derive(Clone, Debug, Default)]
pub struct Graph {
    adj: Vec<Vec<Node>>,
    index: Vec<AdjacencyIndex>,
    labels: Vec<Node>,
    number_of_edges: NumEdges,
}

impl GraphNodeOrder for Graph {
    type VertexIter<'a> = Range<Node>;

    fn number_of_nodes(&self) -> Node {
        self.adj.len() as Node
    }

    fn vertices(&self) -> Self::VertexIter<'_> {
        self.vertices_range()
    }
}

impl GraphEdgeOrder for Graph {
    fn number_of_edges(&self) -> NumEdges {
        self.number_of_edges
    }
}

impl AdjacencyList for Graph {
    fn neighbors_of(&self, u: Node) -> &[Node] {
        &self.adj[u as usize]
    }
}

impl AdjacencyTest for Graph {
    fn has_edge(&self, u: Node, v: Node) -> bool {
        self.index[u as usize].contains(v)
    }
}

impl GraphNew for Graph {
    fn new(n: NumNodes) -> Self {
        Self {
            adj: vec![Vec::new(); n as usize],
            index: vec![AdjacencyIndex::new(); n as usize],
            labels: (0..n).collect(),
            number_of_edges: 0,
        }
    }
}

impl GraphEdgeEditing for Graph {
    fn try_add_edge(&mut self, u: Node, v: Node) -> bool {
        if u == v || !self.index[u as usize].insert(v) {
            return false;
        }
        self.index[v as usize].insert(u);
        self.adj[u as usize].push(v);
        self.adj[v as usize].push(u);
        self.number_of_edges += 1;
        true
    }

    fn try_remove_edge(&mut self, u: Node, v: Node) -> bool {
        if !self.detach_edge(u, v) {
            return false;
        }
        for (x, y) in [(u, v), (v, u)] {
            let list = &mut self.adj[x as usize];
            if let Some(i) = list.iter().position(|&w| w == y) {
                list.swap_remove(i);
            }
        }
        true
    }
}

impl Graph {
    /// Builds a graph on `n` vertices; loops and parallel edges are dropped
    pub fn from_edges(n: NumNodes, edges: impl IntoIterator<Item = impl Into<Edge>>) -> Self {
        let mut graph = Self::new(n);
        for Edge(u, v) in edges.into_iter().map(|e| e.into()) {
            graph.try_add_edge(u, v);
        }
        graph
    }

    /// Label of vertex `u`, i.e. its id in the graph this one was derived from
    pub fn label_of(&self, u: Node) -> Node {
        self.labels[u as usize]
    }

    pub fn labels(&self) -> &[Node] {
        &self.labels
    }

    /// Replaces all labels.
    /// ** Panics if the number of labels does not match the number of nodes **
    pub fn set_labels(&mut self, labels: Vec<Node>) {
        assert_eq!(labels.len(), self.len());
        self.labels = labels;
    }

    /// Removes the edge from the adjacency index only; `neighbors_of` keeps reporting it
    /// until [`Graph::compact_neighborhoods`] is called. Used by peeling procedures that
    /// delete many edges and must not disturb ongoing iterations over neighborhoods.
    pub fn detach_edge(&mut self, u: Node, v: Node) -> bool {
        if !self.index[u as usize].remove(v) {
            return false;
        }
        self.index[v as usize].remove(u);
        self.number_of_edges -= 1;
        true
    }

    /// Drops all entries of the adjacency lists that are no longer backed by the index
    pub fn compact_neighborhoods(&mut self) {
        for (list, index) in self.adj.iter_mut().zip(&self.index) {
            list.retain(|&v| index.contains(v));
        }
    }

    /// Returns the subgraph induced by `nodes`; vertex `i` of the result corresponds to
    /// `nodes[i]` and is labelled accordingly.
    pub fn induced_subgraph(&self, nodes: &[Node]) -> Graph {
        let mut mapping = vec![Node::MAX; self.len()];
        for (i, &u) in nodes.iter().enumerate() {
            mapping[u as usize] = i as Node;
        }

        let mut result = Graph::new(nodes.len() as NumNodes);
        for (i, &u) in nodes.iter().enumerate() {
            let neighbors: Vec<Node> = self
                .neighbors_of(u)
                .iter()
                .map(|&v| mapping[v as usize])
                .filter(|&v| v != Node::MAX)
                .collect();

            let list = &mut result.adj[i];
            list.extend_from_slice(&neighbors);
            result.index[i].reserve(neighbors.len());
            for v in neighbors {
                result.index[i].insert(v);
            }
            result.number_of_edges += list.len() as NumEdges;
        }
        result.number_of_edges /= 2;
        result.labels = nodes.iter().map(|&u| self.label_of(u)).collect();
        result
    }

    /// Returns the subgraph induced by all vertices satisfying `keep` (in increasing id order)
    pub fn induced_subgraph_by(&self, keep: impl Fn(Node) -> bool) -> Graph {
        let nodes: Vec<Node> = self.vertices().filter(|&u| keep(u)).collect();
        self.induced_subgraph(&nodes)
    }
}
