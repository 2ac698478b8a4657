//! Plain-text readers for general and bipartite edge lists, and writers for solutions.
//!
//! Vertices are 0-based. Lines starting with `#`, `%` or `c` are comments. Malformed input
//! is reported as [`std::io::ErrorKind::InvalidData`].

pub type Result<T> = std::io::Result<T>;

macro_rules! raise_error_unless {
    ($cond : expr, $kind : expr, $info : expr) => {
        if !($cond) {
            return Err(std::io::Error::new($kind, $info));
        }
    };
}

macro_rules! parse_next_value {
    ($iterator : expr, $name : expr) => {{
        let next = $iterator.next();
        raise_error_unless!(
            next.is_some(),
            ErrorKind::InvalidData,
            format!("Premature end of line when parsing {}.", $name)
        );

        let parsed = next.unwrap().parse();
        raise_error_unless!(
            parsed.is_ok(),
            ErrorKind::InvalidData,
            format!("Invalid value found. Cannot parse {}.", $name)
        );

        parsed.unwrap()
    }};
}

mod lines;

pub mod bipartite_reader;
pub mod edge_list_reader;
pub mod solution_writer;

pub use bipartite_reader::{BipartiteReader, BiGraphReader};
pub use edge_list_reader::{EdgeListReader, GraphEdgeListReader};
pub use solution_writer::{BiplexWriter, SolutionWriter};
