use std::path::PathBuf;

/// Election map build tool
#[derive(clap::Parser, Debug)]
#[command(name = "electmap", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// JSON config file; flags override its values
    #[arg(short, long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Bundle the admin hierarchy and publish the topology
    Build(BuildArgs),

    /// Rank candidates and print standings as JSON
    Aggregate(AggregateArgs),

    /// Check a published topology file
    Validate(ValidateArgs),
}

#[derive(clap::Args, Debug)]
pub struct BuildArgs {
    /// Output topology file, defaults to "public/data/geometry.topo.json"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Serve every upstream endpoint from this base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Simplification tolerance in degrees (0 keeps every vertex)
    #[arg(short, long)]
    pub tolerance: Option<f64>,

    /// Parallel fetches for district/constituency fan-out
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

#[derive(clap::Args, Debug)]
pub struct AggregateArgs {
    /// Candidate vote file: an http(s) URL or a local path
    pub source: Option<String>,

    /// Write the summary here instead of stdout
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Include every candidate, not just leaders and stats
    #[arg(long)]
    pub all: bool,

    /// Prefix for candidate image URLs
    #[arg(long)]
    pub image_base: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Topology file, defaults to the configured output path
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub path: Option<PathBuf>,
}
