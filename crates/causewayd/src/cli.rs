use std::ffi::OsStr;
use std::path::PathBuf;

use causeway_analysis::PathAlgorithm;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Human,
    Json,
}

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Json => "json",
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "invalid log format '{other}', expected one of: human, json"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct PathsArgs {
    #[arg(long, help = "Node id the paths start at")]
    pub from: String,

    #[arg(long, help = "Node id the paths end at")]
    pub to: String,

    #[arg(
        long,
        value_parser = parse_path_algorithm,
        help = "Search algorithm: shortest, strongest_evidence, or all_simple"
    )]
    pub algorithm: Option<PathAlgorithm>,

    #[arg(long, help = "Maximum hops per path (1..8)")]
    pub max_depth: Option<u32>,

    #[arg(long, help = "Maximum number of paths returned (1..50)")]
    pub max_paths: Option<u32>,

    #[arg(
        long = "category",
        value_delimiter = ',',
        value_name = "CATEGORY",
        help = "Only traverse mechanisms tagged with one of these categories"
    )]
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct CrisisArgs {
    #[arg(
        long = "node",
        value_delimiter = ',',
        value_name = "NODE",
        required = true,
        help = "Crisis node ids (scale 7), 1..10"
    )]
    pub nodes: Vec<String>,

    #[arg(long, help = "Layers kept, counting the crisis layer (1..8)")]
    pub max_degrees: Option<u32>,

    #[arg(long, help = "Minimum evidence strength, C=1 B=2 A=3")]
    pub min_strength: Option<u8>,

    #[arg(
        long = "category",
        value_delimiter = ',',
        value_name = "CATEGORY",
        help = "Only traverse mechanisms tagged with one of these categories"
    )]
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct RankArgs {
    #[arg(long, help = "Number of ranked nodes returned (1..1000)")]
    pub top_n: Option<u32>,

    #[arg(
        long = "category",
        value_delimiter = ',',
        value_name = "CATEGORY",
        help = "Only rank nodes tagged with one of these categories"
    )]
    pub categories: Vec<String>,

    #[arg(
        long = "scale",
        value_delimiter = ',',
        value_name = "SCALE",
        help = "Only rank nodes on these scales (1..7)"
    )]
    pub scales: Vec<u8>,

    #[arg(long, help = "Minimum incoming plus outgoing mechanisms")]
    pub min_connections: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Find causal paths between two nodes
    Paths(PathsArgs),
    /// Extract the upstream subgraph feeding crisis nodes
    Crisis(CrisisArgs),
    /// Rank nodes by composite importance
    Rank(RankArgs),
    /// Print graph counts and the snapshot content version
    Summary,
}

#[derive(Debug, Clone, Parser)]
#[command(author, version, about = "Causeway causal graph queries")]
pub struct Cli {
    #[arg(long, help = "JSON graph snapshot with mechanisms and optional nodes")]
    pub snapshot: PathBuf,

    #[arg(
        long,
        default_value = ".",
        help = "Workspace root holding .causeway/config.toml"
    )]
    pub workspace: PathBuf,

    #[arg(
        long,
        default_value = "human",
        value_parser = parse_log_format,
        help = "Log format: human or json"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

pub fn parse_cli() -> Cli {
    let mut args: Vec<_> = std::env::args_os().collect();
    if args.get(1).is_some_and(|arg| arg == OsStr::new("--")) {
        args.remove(1);
    }

    Cli::parse_from(args)
}

/// Empty repeated flags mean "no filter".
pub(crate) fn optional_list<T: Clone>(values: &[T]) -> Option<Vec<T>> {
    (!values.is_empty()).then(|| values.to_vec())
}

fn parse_path_algorithm(value: &str) -> Result<PathAlgorithm, String> {
    value.parse()
}

fn parse_log_format(value: &str) -> Result<LogFormat, String> {
    value.parse()
}
