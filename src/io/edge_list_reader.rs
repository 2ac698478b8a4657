use std::{
    fs::File,
    io::{BufRead, BufReader, ErrorKind, Lines},
    path::Path,
};

use super::{Result, lines::*};
use crate::graph::{Edge, GraphEdgeEditing, GraphNew, NumEdges, NumNodes};

pub trait GraphEdgeListReader: Sized {
    fn try_read_edge_list<R: BufRead>(reader: R) -> Result<Self>;
    fn try_read_edge_list_file<P: AsRef<Path>>(path: P) -> Result<Self>;
}

impl<G> GraphEdgeListReader for G
where
    G: GraphNew + GraphEdgeEditing,
{
    /// Self-loops and repeated edges are dropped
    fn try_read_edge_list<R: BufRead>(reader: R) -> Result<Self> {
        let reader = EdgeListReader::try_new(reader)?;
        let mut graph = Self::new(reader.number_of_nodes());
        for edge in reader {
            let Edge(u, v) = edge?;
            if u != v {
                graph.try_add_edge(u, v);
            }
        }
        Ok(graph)
    }

    fn try_read_edge_list_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = File::open(path)?;
        Self::try_read_edge_list(BufReader::new(reader))
    }
}

/// Reads a header `n m` followed by one `u v` line per edge
pub struct EdgeListReader<R> {
    lines: Lines<R>,
    number_of_nodes: NumNodes,
    number_of_edges: NumEdges,
    edges_read: NumEdges,
}

impl<R: BufRead> EdgeListReader<R> {
    pub fn try_new(reader: R) -> Result<Self> {
        let mut edge_reader = Self {
            lines: reader.lines(),
            number_of_nodes: 0,
            number_of_edges: 0,
            edges_read: 0,
        };

        (edge_reader.number_of_nodes, edge_reader.number_of_edges) = edge_reader.parse_header()?;
        Ok(edge_reader)
    }

    pub fn number_of_nodes(&self) -> NumNodes {
        self.number_of_nodes
    }

    pub fn number_of_edges(&self) -> NumEdges {
        self.number_of_edges
    }

    fn parse_header(&mut self) -> Result<(NumNodes, NumEdges)> {
        let line = next_content_line(&mut self.lines)?;
        raise_error_unless!(line.is_some(), ErrorKind::InvalidData, "No header found");
        let line = line.unwrap();

        let mut parts = tokens(&line);
        let number_of_nodes = parse_next_value!(parts, "Header>Number of nodes");
        let number_of_edges = parse_next_value!(parts, "Header>Number of edges");

        raise_error_unless!(
            parts.next().is_none(),
            ErrorKind::InvalidData,
            "Invalid header found; expected end of line"
        );

        Ok((number_of_nodes, number_of_edges))
    }

    fn parse_edge_line(&mut self) -> Result<Option<Edge>> {
        let Some(line) = next_content_line(&mut self.lines)? else {
            raise_error_unless!(
                self.edges_read == self.number_of_edges,
                ErrorKind::InvalidData,
                format!(
                    "Header announced {} edges, but found {}",
                    self.number_of_edges, self.edges_read
                )
            );
            return Ok(None);
        };

        let mut parts = tokens(&line);
        let from: NumNodes = parse_next_value!(parts, "Source node");
        let dest: NumNodes = parse_next_value!(parts, "Target node");

        raise_error_unless!(
            from < self.number_of_nodes && dest < self.number_of_nodes,
            ErrorKind::InvalidData,
            format!("Edge ({from}, {dest}) exceeds the number of nodes")
        );
        raise_error_unless!(
            parts.next().is_none(),
            ErrorKind::InvalidData,
            "Invalid edge found; expected end of line"
        );

        self.edges_read += 1;
        Ok(Some(Edge(from, dest)))
    }
}

impl<R: BufRead> Iterator for EdgeListReader<R> {
    type Item = Result<Edge>;

    fn next(&mut self) -> Option<Self::Item> {
        self.parse_edge_line().transpose()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::graph::*;

    #[test]
    fn reads_edges() {
        const DEMO_FILE: &str = "# path\n4  3\n0 1\n% inner comment\n1 2\n\n2 3\n";
        let reader = EdgeListReader::try_new(DEMO_FILE.as_bytes()).unwrap();
        assert_eq!(reader.number_of_nodes(), 4);
        assert_eq!(reader.number_of_edges(), 3);

        let edges: Vec<_> = reader.map(|e| e.unwrap()).collect();
        assert_eq!(edges, vec![Edge(0, 1), Edge(1, 2), Edge(2, 3)]);
    }

    #[test]
    fn drops_loops_and_duplicates() {
        const DEMO_FILE: &str = "3 4\n0 1\n1 0\n2 2\n1 2\n";
        let graph = Graph::try_read_edge_list(DEMO_FILE.as_bytes()).unwrap();
        assert_eq!(graph.number_of_nodes(), 3);
        assert_eq!(graph.number_of_edges(), 2);
        assert!(graph.has_edge(2, 1));
    }

    #[test]
    fn rejects_malformed_input() {
        for input in ["", "3\n", "3 1\n0 3\n", "3 1\n0 x\n", "3 2\n0 1\n", "3 1\n0 1 2\n"] {
            let error = Graph::try_read_edge_list(input.as_bytes()).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::InvalidData, "input: {input:?}");
        }
    }

    #[test]
    fn reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "c triangle\n3 3\n0 1\n1 2\n2 0").unwrap();

        let graph = Graph::try_read_edge_list_file(file.path()).unwrap();
        assert_eq!(graph.number_of_edges(), 3);
        assert!(graph.vertices().all(|u| graph.degree_of(u) == 2));
    }
}
