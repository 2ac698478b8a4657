use std::{fs::File, io::BufReader, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{errors::SolverError, graph::*};

/// Which sets count as "k-defective"
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefectModel {
    /// Every member misses at most `k` other members
    #[default]
    PerVertex,
    /// The induced subgraph misses at most `k` edges in total
    MissingEdges,
}

impl DefectModel {
    /// Minimum degree of a member of a solution with `target` vertices
    pub fn core_threshold(self, target: NumNodes, k: NumNodes) -> NumNodes {
        target.saturating_sub(k.saturating_add(1))
    }

    /// Minimum number of common neighbors of two adjacent members of a solution with
    /// `target` vertices
    pub fn edge_threshold(self, target: NumNodes, k: NumNodes) -> NumNodes {
        match self {
            Self::PerVertex => target.saturating_sub(k.saturating_mul(2).saturating_add(2)),
            Self::MissingEdges => target.saturating_sub(k.saturating_add(2)),
        }
    }

    /// Returns true iff any two members of a solution with `target` vertices are within
    /// distance two
    pub fn two_hop_bounded(self, target: NumNodes, k: NumNodes) -> bool {
        match self {
            Self::PerVertex => target > k.saturating_mul(2),
            Self::MissingEdges => target >= k.saturating_add(2),
        }
    }

    /// Minimum number of distinct colors among the later neighbors of the earliest member
    /// of a solution with `target` vertices. A color class holds pairwise non-adjacent
    /// vertices, so under `PerVertex` at most `k + 1` of them fit into one solution.
    pub fn seed_color_threshold(self, target: NumNodes, k: NumNodes) -> NumNodes {
        let later = self.core_threshold(target, k);
        match self {
            Self::PerVertex => later.div_ceil(k.saturating_add(1)),
            Self::MissingEdges => later,
        }
    }

    /// Checks the set from scratch in quadratic time
    pub fn is_feasible<G: AdjacencyTest>(self, graph: &G, set: &[Node], k: NumNodes) -> bool {
        let non_neighbors = |u: Node| {
            set.iter()
                .filter(|&&v| v != u && !graph.has_edge(u, v))
                .count() as NumNodes
        };

        match self {
            Self::PerVertex => set.iter().all(|&u| non_neighbors(u) <= k),
            Self::MissingEdges => {
                let twice: NumNodes = set.iter().map(|&u| non_neighbors(u)).sum();
                twice / 2 <= k
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchMode {
    #[default]
    FindMaximum,
    EnumerateAll,
}

impl SearchMode {
    pub fn name(self) -> &'static str {
        match self {
            Self::FindMaximum => "find-maximum",
            Self::EnumerateAll => "enumerate-all",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Variant {
    /// One branch-and-bound run per vertex of the degeneracy ordering
    #[default]
    Seeded,
    /// A single branch-and-bound run over the whole reduced graph
    WholeGraph,
    /// Seeds in ascending degree order, filtered by degree and by the colors of a single
    /// global coloring
    ReductionSearch,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundKind {
    /// Color classes of the seed subgraph
    #[default]
    Coloring,
    /// Counting candidates by their number of non-neighbors in the partial solution
    Bins,
    None,
}

/// How candidates violating the degree requirement are removed at a search node
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PruningStrategy {
    /// Worklist of removed vertices; only their neighbors are re-examined
    #[default]
    QueueBased,
    /// Repeated full scans until nothing changes
    FixedPointSweep,
    /// One scan; later violations are caught at deeper nodes
    SinglePass,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PivotRule {
    #[default]
    MaxCandidateDegree,
    FirstCandidate,
    MostNonNeighbors,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SideSelector {
    /// The side with the smaller maximum degree
    #[default]
    Auto,
    Left,
    Right,
}

impl SideSelector {
    pub fn select(self, graph: &BiGraph) -> Side {
        match self {
            Self::Left => LEFT,
            Self::Right => RIGHT,
            Self::Auto => {
                if graph.max_degree(RIGHT) < graph.max_degree(LEFT) {
                    RIGHT
                } else {
                    LEFT
                }
            }
        }
    }
}

macro_rules! impl_from_str {
    ($type : ty, $($name : literal => $value : expr),+) => {
        impl FromStr for $type {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_ascii_lowercase().as_str() {
                    $($name => Ok($value),)+
                    _ => Err(format!("unknown value \"{s}\"")),
                }
            }
        }
    };
}

impl_from_str!(
    DefectModel,
    "per-vertex" => DefectModel::PerVertex,
    "missing-edges" => DefectModel::MissingEdges
);
impl_from_str!(
    SearchMode,
    "find-maximum" => SearchMode::FindMaximum,
    "enumerate-all" => SearchMode::EnumerateAll
);
impl_from_str!(
    Variant,
    "seeded" => Variant::Seeded,
    "whole-graph" => Variant::WholeGraph,
    "reduction" => Variant::ReductionSearch
);
impl_from_str!(
    BoundKind,
    "coloring" => BoundKind::Coloring,
    "bins" => BoundKind::Bins,
    "none" => BoundKind::None
);
impl_from_str!(
    PruningStrategy,
    "queue" => PruningStrategy::QueueBased,
    "sweep" => PruningStrategy::FixedPointSweep,
    "single" => PruningStrategy::SinglePass
);
impl_from_str!(
    PivotRule,
    "max-degree" => PivotRule::MaxCandidateDegree,
    "first" => PivotRule::FirstCandidate,
    "most-non-neighbors" => PivotRule::MostNonNeighbors
);
impl_from_str!(
    SideSelector,
    "auto" => SideSelector::Auto,
    "left" => SideSelector::Left,
    "right" => SideSelector::Right
);

/// Options of a search run. Every field has a default, so a JSON file only needs to list
/// the options that differ.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Defect budget
    pub k: i64,
    pub model: DefectModel,
    pub mode: SearchMode,
    pub variant: Variant,
    /// Upper bound used at search nodes; see [`SearchConfig::bound_kind`]
    pub bound: Option<BoundKind>,
    pub pruning: PruningStrategy,
    pub pivot: PivotRule,
    pub collapse_rules: bool,
    pub edge_reduction: bool,
    /// Compute a greedy initial solution before searching
    pub warm_start: bool,
    /// Stop after this many reported solutions
    pub result_cap: Option<u64>,
    /// Wall-clock budget in seconds
    pub time_limit: Option<f64>,
    /// Size of a solution known to exist
    pub lower_bound: Option<NumNodes>,
    /// Minimum number of vertices per side of a biplex
    pub q: NumNodes,
    pub side: SideSelector,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            k: 1,
            model: DefectModel::default(),
            mode: SearchMode::default(),
            variant: Variant::default(),
            bound: None,
            pruning: PruningStrategy::default(),
            pivot: PivotRule::default(),
            collapse_rules: true,
            edge_reduction: true,
            warm_start: true,
            result_cap: None,
            time_limit: None,
            lower_bound: None,
            q: 1,
            side: SideSelector::default(),
        }
    }
}

impl SearchConfig {
    pub fn with_budget(k: i64) -> Self {
        Self {
            k,
            ..Default::default()
        }
    }

    /// The bound chosen by the user, or the default of the variant: `Bins` for a
    /// whole-graph search and `Coloring` otherwise
    pub fn bound_kind(&self) -> BoundKind {
        self.bound.unwrap_or(match self.variant {
            Variant::WholeGraph => BoundKind::Bins,
            Variant::Seeded | Variant::ReductionSearch => BoundKind::Coloring,
        })
    }

    pub fn try_read_json_file<P: AsRef<Path>>(path: P) -> Result<Self, SolverError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    fn budget(&self) -> Result<NumNodes, SolverError> {
        if self.k < 0 || self.k > NumNodes::MAX as i64 {
            return Err(SolverError::InvalidBudget(self.k));
        }
        Ok(self.k as NumNodes)
    }

    /// Validates the options for a defective clique search and returns the budget
    pub fn validate(&self) -> Result<NumNodes, SolverError> {
        let k = self.budget()?;
        if self.mode == SearchMode::EnumerateAll {
            return Err(SolverError::UnsupportedMode {
                mode: self.mode.name(),
                solver: "defective clique",
            });
        }
        Ok(k)
    }

    /// Validates the options for a biplex search and returns the budget
    pub fn validate_biplex(&self) -> Result<NumNodes, SolverError> {
        let k = self.budget()?;
        if self.q == 0 {
            return Err(SolverError::InvalidSideBound(self.q));
        }
        Ok(k)
    }
}
