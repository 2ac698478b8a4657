use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use crate::{exact::Biplex, graph::Node};

/// Writes a vertex set as its size followed by one sorted label per line
pub trait SolutionWriter {
    fn try_write_solution<W: Write>(&self, writer: W) -> Result<(), std::io::Error>;

    fn try_write_solution_file<P: AsRef<Path>>(&self, path: P) -> Result<(), std::io::Error> {
        let writer = BufWriter::new(File::create(path)?);
        self.try_write_solution(writer)
    }
}

impl SolutionWriter for [Node] {
    fn try_write_solution<W: Write>(&self, mut writer: W) -> Result<(), std::io::Error> {
        let mut sorted = self.to_vec();
        sorted.sort_unstable();

        writeln!(writer, "{}", sorted.len())?;
        for u in sorted {
            writeln!(writer, "{u}")?;
        }
        writer.flush()
    }
}

/// Writes biplexes as a line `|L| |R|` followed by a line per side
pub trait BiplexWriter {
    fn try_write_biplexes<W: Write>(&self, writer: W) -> Result<(), std::io::Error>;
}

impl BiplexWriter for [Biplex] {
    fn try_write_biplexes<W: Write>(&self, mut writer: W) -> Result<(), std::io::Error> {
        for biplex in self {
            writeln!(writer, "{} {}", biplex.left.len(), biplex.right.len())?;
            for side in [&biplex.left, &biplex.right] {
                let mut sorted = side.clone();
                sorted.sort_unstable();
                let line: Vec<_> = sorted.iter().map(|u| u.to_string()).collect();
                writeln!(writer, "{}", line.join(" "))?;
            }
        }
        writer.flush()
    }
}
