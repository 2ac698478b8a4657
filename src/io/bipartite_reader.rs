use std::{
    fs::File,
    io::{BufRead, BufReader, ErrorKind, Lines},
    path::Path,
};

use super::{Result, lines::*};
use crate::graph::{BiGraph, Edge, NumEdges, NumNodes};

pub trait BiGraphReader: Sized {
    fn try_read_bipartite<R: BufRead>(reader: R) -> Result<Self>;
    fn try_read_bipartite_file<P: AsRef<Path>>(path: P) -> Result<Self>;
}

impl BiGraphReader for BiGraph {
    /// Repeated edges are dropped
    fn try_read_bipartite<R: BufRead>(reader: R) -> Result<Self> {
        let reader = BipartiteReader::try_new(reader)?;
        let (n_left, n_right) = reader.number_of_nodes();
        let mut graph = BiGraph::new(n_left, n_right);
        for edge in reader {
            let Edge(l, r) = edge?;
            graph.try_add_edge(l, r);
        }
        Ok(graph)
    }

    fn try_read_bipartite_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = File::open(path)?;
        Self::try_read_bipartite(BufReader::new(reader))
    }
}

/// Reads a header `m nL nR` followed by one `l r` line per edge, where `l` is a vertex of
/// the left and `r` a vertex of the right side
pub struct BipartiteReader<R> {
    lines: Lines<R>,
    number_of_edges: NumEdges,
    sides: (NumNodes, NumNodes),
}

impl<R: BufRead> BipartiteReader<R> {
    pub fn try_new(reader: R) -> Result<Self> {
        let mut bipartite_reader = Self {
            lines: reader.lines(),
            number_of_edges: 0,
            sides: (0, 0),
        };

        (bipartite_reader.number_of_edges, bipartite_reader.sides) =
            bipartite_reader.parse_header()?;
        Ok(bipartite_reader)
    }

    /// Sizes of the left and right side
    pub fn number_of_nodes(&self) -> (NumNodes, NumNodes) {
        self.sides
    }

    pub fn number_of_edges(&self) -> NumEdges {
        self.number_of_edges
    }

    fn parse_header(&mut self) -> Result<(NumEdges, (NumNodes, NumNodes))> {
        let line = next_content_line(&mut self.lines)?;
        raise_error_unless!(line.is_some(), ErrorKind::InvalidData, "No header found");
        let line = line.unwrap();

        let mut parts = tokens(&line);
        let number_of_edges = parse_next_value!(parts, "Header>Number of edges");
        let n_left = parse_next_value!(parts, "Header>Number of left nodes");
        let n_right = parse_next_value!(parts, "Header>Number of right nodes");

        raise_error_unless!(
            parts.next().is_none(),
            ErrorKind::InvalidData,
            "Invalid header found; expected end of line"
        );

        Ok((number_of_edges, (n_left, n_right)))
    }

    fn parse_edge_line(&mut self) -> Result<Option<Edge>> {
        let Some(line) = next_content_line(&mut self.lines)? else {
            return Ok(None);
        };

        let mut parts = tokens(&line);
        let left: NumNodes = parse_next_value!(parts, "Left node");
        let right: NumNodes = parse_next_value!(parts, "Right node");

        raise_error_unless!(
            left < self.sides.0 && right < self.sides.1,
            ErrorKind::InvalidData,
            format!("Edge ({left}, {right}) exceeds the side sizes")
        );

        Ok(Some(Edge(left, right)))
    }
}

impl<R: BufRead> Iterator for BipartiteReader<R> {
    type Item = Result<Edge>;

    fn next(&mut self) -> Option<Self::Item> {
        self.parse_edge_line().transpose()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::graph::{GraphEdgeOrder, LEFT, RIGHT};

    #[test]
    fn reads_sides() {
        const DEMO_FILE: &str = "% star\n3 1 3\n0 0\n0 1\n0 2\n0 2\n";
        let graph = BiGraph::try_read_bipartite(DEMO_FILE.as_bytes()).unwrap();
        assert_eq!(graph.number_of_nodes(LEFT), 1);
        assert_eq!(graph.number_of_nodes(RIGHT), 3);
        assert_eq!(graph.degree_of(LEFT, 0), 3);
        assert!(graph.has_edge(RIGHT, 2, 0));
    }

    #[test]
    fn rejects_malformed_input() {
        for input in ["", "1 2\n", "1 2 2\n2 0\n", "1 2 2\n0\n", "1 2 2 2\n"] {
            let error = BiGraph::try_read_bipartite(input.as_bytes()).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::InvalidData, "input: {input:?}");
        }
    }

    #[test]
    fn reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "4 2 2\n0 0\n0 1\n1 0\n1 1").unwrap();

        let graph = BiGraph::try_read_bipartite_file(file.path()).unwrap();
        assert_eq!(graph.number_of_edges(), 4);
    }
}
