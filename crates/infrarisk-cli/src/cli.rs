use clap::{Parser, Subcommand};
use infrarisk_core::config::{parse_strategy, MatchStrategy};
use infrarisk_core::normalize::DatasetKind;
use std::path::PathBuf;
use std::str::FromStr;

/// InfraRisk - Buried asset conflict detection
#[derive(Parser, Debug)]
#[command(name = "infrarisk")]
#[command(about = "Detect buried pipes running under bridges and roads", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to ./infrarisk.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch a dataset from the catalog and save normalized entities
    Fetch(FetchArgs),

    /// Detect conflicts between area and linear entity files
    Analyze(AnalyzeArgs),

    /// Write the sample bridge and pipe datasets
    Sample(SampleArgs),

    /// Show the effective configuration and where each value came from
    Config,
}

#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// Dataset to fetch (bridge, xroad, pipe, sewage, water)
    #[arg(long, value_parser = DatasetKind::from_str)]
    pub dataset: DatasetKind,

    /// Region to search, e.g. a prefecture name ("広島県")
    /// Required for bridge and pipe
    #[arg(long)]
    pub term: Option<String>,

    /// Output file (defaults to <dataset>.json)
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,

    /// Serve the built-in sample catalog instead of the remote API
    #[arg(long)]
    pub sample: bool,

    /// Catalog GraphQL endpoint
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Catalog API key
    #[arg(long)]
    pub api_key: Option<String>,

    /// Stop after this many unique records
    #[arg(long)]
    pub max_records: Option<usize>,
}

#[derive(Parser, Debug)]
pub struct AnalyzeArgs {
    /// Entity file with area assets (bridges, roads)
    #[arg(long)]
    pub areas: PathBuf,

    /// Entity file with linear assets (pipes)
    #[arg(long)]
    pub linears: PathBuf,

    /// Tolerance added to every buffer, in meters
    #[arg(long)]
    pub slack_m: Option<f64>,

    /// Width assumed for area assets without a usable width, in meters
    #[arg(long)]
    pub default_width_m: Option<f64>,

    /// Candidate enumeration (pairwise or rtree)
    #[arg(long, value_parser = parse_strategy)]
    pub strategy: Option<MatchStrategy>,

    /// Vertices per buffer circle
    #[arg(long)]
    pub segments: Option<usize>,

    /// Use the same degree offset on both axes instead of widening
    /// longitude by latitude
    #[arg(long)]
    pub flat: bool,

    /// Only list high-risk matches
    #[arg(long)]
    pub high_only: bool,

    /// Also write the full report as JSON
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct SampleArgs {
    /// Directory to write bridges.json and pipes.json into
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
}
