use std::{fs::File, io::BufReader, path::PathBuf};

use ::defclique::{
    exact::*,
    graph::{Graph, GraphEdgeOrder, GraphNodeOrder, Node},
    io::{GraphEdgeListReader, SolutionWriter},
    log::{LevelFilter, build_logger_for_verbosity},
    utils::signal_handling,
};
use log::info;
use structopt::StructOpt;

/// Computes a maximum k-defective clique of an undirected graph
#[derive(StructOpt)]
struct Opts {
    /// Edge list (`n m` header followed by `u v` lines); reads stdin if omitted
    #[structopt(short, long)]
    instance: Option<PathBuf>,

    /// Writes the solution here instead of stdout
    #[structopt(short, long)]
    output: Option<PathBuf>,

    /// JSON file with search options; command line options take precedence
    #[structopt(short, long)]
    config: Option<PathBuf>,

    #[structopt(short)]
    k: Option<i64>,

    /// per-vertex | missing-edges
    #[structopt(long)]
    model: Option<DefectModel>,

    /// seeded | whole-graph | reduction
    #[structopt(long)]
    variant: Option<Variant>,

    /// coloring | bins | none (default: bins for whole-graph, coloring otherwise)
    #[structopt(long)]
    bound: Option<BoundKind>,

    /// queue | sweep | single
    #[structopt(long)]
    pruning: Option<PruningStrategy>,

    /// max-degree | first | most-non-neighbors
    #[structopt(long)]
    pivot: Option<PivotRule>,

    #[structopt(long)]
    no_collapse_rules: bool,

    #[structopt(long)]
    no_edge_reduction: bool,

    #[structopt(long)]
    no_warm_start: bool,

    /// Wall-clock budget in seconds
    #[structopt(short = "T", long)]
    time_limit: Option<f64>,

    /// Stop after this many improvements of the incumbent
    #[structopt(long)]
    cap: Option<u64>,

    /// Only search for solutions with at least this many vertices
    #[structopt(long)]
    lower_bound: Option<u32>,

    /// A known solution, in the output format, used as incumbent
    #[structopt(long)]
    initial: Option<PathBuf>,

    /// Distributes the seeds over all cores
    #[cfg(feature = "par")]
    #[structopt(long)]
    parallel: bool,

    #[structopt(short, long, parse(from_occurrences))]
    verbose: usize,
}

impl Opts {
    fn search_config(&self) -> anyhow::Result<SearchConfig> {
        let mut config = match &self.config {
            Some(path) => SearchConfig::try_read_json_file(path)?,
            None => SearchConfig::default(),
        };

        if let Some(k) = self.k {
            config.k = k;
        }
        if let Some(model) = self.model {
            config.model = model;
        }
        if let Some(variant) = self.variant {
            config.variant = variant;
        }
        if let Some(bound) = self.bound {
            config.bound = Some(bound);
        }
        if let Some(pruning) = self.pruning {
            config.pruning = pruning;
        }
        if let Some(pivot) = self.pivot {
            config.pivot = pivot;
        }
        config.collapse_rules &= !self.no_collapse_rules;
        config.edge_reduction &= !self.no_edge_reduction;
        config.warm_start &= !self.no_warm_start;
        config.time_limit = self.time_limit.or(config.time_limit);
        config.result_cap = self.cap.or(config.result_cap);
        config.lower_bound = self.lower_bound.or(config.lower_bound);

        Ok(config)
    }
}

fn load_graph(path: &Option<PathBuf>) -> anyhow::Result<Graph> {
    if let Some(path) = path {
        Ok(Graph::try_read_edge_list_file(path)?)
    } else {
        let stdin = std::io::stdin().lock();
        Ok(Graph::try_read_edge_list(stdin)?)
    }
}

/// Reads a size line followed by one vertex per line
fn load_solution(path: &PathBuf) -> anyhow::Result<Vec<Node>> {
    use std::io::BufRead;

    let mut values = Vec::new();
    for line in BufReader::new(File::open(path)?).lines() {
        let line = line?;
        let line = line.trim();
        if !line.is_empty() {
            values.push(line.parse::<Node>()?);
        }
    }

    match values.split_first() {
        Some((&size, nodes)) if size as usize == nodes.len() => Ok(nodes.to_vec()),
        _ => anyhow::bail!("{} is not a solution file", path.display()),
    }
}

fn main() -> anyhow::Result<()> {
    let opts = Opts::from_args();
    build_logger_for_verbosity(LevelFilter::Info, opts.verbose);
    signal_handling::initialize();

    let config = opts.search_config()?;
    let graph = load_graph(&opts.instance)?;
    info!(
        "Loaded graph with n = {}, m = {}",
        graph.number_of_nodes(),
        graph.number_of_edges()
    );

    let mut solver = DefectiveCliqueSolver::new(graph, config)?;
    if let Some(path) = &opts.initial {
        solver.set_initial_solution(&load_solution(path)?)?;
    }

    #[cfg(feature = "par")]
    let report = if opts.parallel {
        solver.solve_parallel()
    } else {
        solver.solve()
    };
    #[cfg(not(feature = "par"))]
    let report = solver.solve();

    info!(
        "Found |S| = {} in {:.3}s, completed = {}",
        report.solution.len(),
        report.elapsed.as_secs_f64(),
        report.completed
    );
    info!("Statistics: {}", serde_json::to_string(&report.stats)?);

    if let Some(path) = &opts.output {
        report.solution.try_write_solution_file(path)?;
    } else {
        report.solution.try_write_solution(std::io::stdout().lock())?;
    }

    Ok(())
}
