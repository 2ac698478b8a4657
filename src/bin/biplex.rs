use std::{io::Write, path::PathBuf};

use ::defclique::{
    exact::*,
    graph::{BiGraph, GraphEdgeOrder, LEFT, RIGHT},
    io::{BiGraphReader, BiplexWriter},
    log::{LevelFilter, build_logger_for_verbosity},
    utils::signal_handling,
};
use log::info;
use structopt::StructOpt;

/// Enumerates the maximal k-biplexes of a bipartite graph with at least q vertices per side,
/// or finds the largest one
#[derive(StructOpt)]
struct Opts {
    /// Bipartite edge list (`m nL nR` header followed by `l r` lines); reads stdin if omitted
    #[structopt(short, long)]
    instance: Option<PathBuf>,

    /// Writes the biplexes here instead of stdout
    #[structopt(short, long)]
    output: Option<PathBuf>,

    /// JSON file with search options; command line options take precedence
    #[structopt(short, long)]
    config: Option<PathBuf>,

    #[structopt(short)]
    k: Option<i64>,

    /// Minimum number of vertices per side
    #[structopt(short)]
    q: Option<u32>,

    /// find-maximum | enumerate-all
    #[structopt(long)]
    mode: Option<SearchMode>,

    /// Side of the seed vertices: auto | left | right
    #[structopt(long)]
    side: Option<SideSelector>,

    /// queue | sweep | single
    #[structopt(long)]
    pruning: Option<PruningStrategy>,

    /// Wall-clock budget in seconds
    #[structopt(short = "T", long)]
    time_limit: Option<f64>,

    /// Stop after this many reported biplexes
    #[structopt(long)]
    cap: Option<u64>,

    /// Only write the number of biplexes
    #[structopt(long)]
    count_only: bool,

    #[structopt(short, long, parse(from_occurrences))]
    verbose: usize,
}

impl Opts {
    fn search_config(&self) -> anyhow::Result<SearchConfig> {
        let mut config = match &self.config {
            Some(path) => SearchConfig::try_read_json_file(path)?,
            None => SearchConfig {
                mode: SearchMode::EnumerateAll,
                ..Default::default()
            },
        };

        if let Some(k) = self.k {
            config.k = k;
        }
        if let Some(q) = self.q {
            config.q = q;
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(side) = self.side {
            config.side = side;
        }
        if let Some(pruning) = self.pruning {
            config.pruning = pruning;
        }
        config.time_limit = self.time_limit.or(config.time_limit);
        config.result_cap = self.cap.or(config.result_cap);

        Ok(config)
    }
}

fn load_graph(path: &Option<PathBuf>) -> anyhow::Result<BiGraph> {
    if let Some(path) = path {
        Ok(BiGraph::try_read_bipartite_file(path)?)
    } else {
        let stdin = std::io::stdin().lock();
        Ok(BiGraph::try_read_bipartite(stdin)?)
    }
}

fn main() -> anyhow::Result<()> {
    let opts = Opts::from_args();
    build_logger_for_verbosity(LevelFilter::Info, opts.verbose);
    signal_handling::initialize();

    let config = opts.search_config()?;
    let find_maximum = config.mode == SearchMode::FindMaximum;
    let graph = load_graph(&opts.instance)?;
    info!(
        "Loaded bipartite graph with |L| = {}, |R| = {}, m = {}",
        graph.number_of_nodes(LEFT),
        graph.number_of_nodes(RIGHT),
        graph.number_of_edges()
    );

    let report = BiplexSolver::new(graph, config)?
        .collect_solutions(!opts.count_only && !find_maximum)
        .solve();

    info!(
        "Reported {} biplexes, largest has {} vertices, in {:.3}s, completed = {}",
        report.solution.count,
        report.solution.best.as_ref().map_or(0, |b| b.len()),
        report.elapsed.as_secs_f64(),
        report.completed
    );
    info!("Statistics: {}", serde_json::to_string(&report.stats)?);

    let mut writer: Box<dyn Write> = match &opts.output {
        Some(path) => Box::new(std::io::BufWriter::new(std::fs::File::create(path)?)),
        None => Box::new(std::io::stdout().lock()),
    };

    let outcome = report.solution;
    if find_maximum {
        let best: Vec<_> = outcome.best.into_iter().collect();
        writeln!(writer, "{}", best.len())?;
        best.try_write_biplexes(&mut writer)?;
    } else {
        writeln!(writer, "{}", outcome.count)?;
        if !opts.count_only {
            outcome.solutions.try_write_biplexes(&mut writer)?;
        }
    }
    writer.flush()?;

    Ok(())
}
