use std::path::PathBuf;

use apidelta_check::Level;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "apidelta",
    about = "apidelta -- compare API descriptions and flag breaking changes",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the structural diff of two documents as JSON
    Diff(CompareArgs),
    /// Report breaking changes (WARN and above)
    Breaking(CheckArgs),
    /// Report every classified change
    Changelog(CheckArgs),
    /// List the built-in rules
    Checks,
}

#[derive(Args, Clone, Debug)]
pub struct CompareArgs {
    /// Base (old) document, JSON
    pub base: PathBuf,
    /// Revision (new) document, JSON
    pub revision: PathBuf,
    /// Match paths that differ only in path parameter names
    #[arg(long)]
    pub match_path_params: bool,
    /// Prefix removed from base paths before matching
    #[arg(long)]
    pub strip_prefix_base: Option<String>,
    /// Prefix removed from revision paths before matching
    #[arg(long)]
    pub strip_prefix_revision: Option<String>,
}

#[derive(Args, Clone, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub compare: CompareArgs,
    /// TOML policy file
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Minimum days between deprecation and sunset
    #[arg(long)]
    pub deprecation_days: Option<u32>,
    /// Optional rules that report at their own level
    #[arg(long, value_delimiter = ',')]
    pub include_checks: Vec<String>,
    /// Rules that do not run
    #[arg(long, value_delimiter = ',')]
    pub exclude_checks: Vec<String>,
    /// Exit with status 1 when a finding reaches this level
    #[arg(long)]
    pub fail_on: Option<Level>,
    /// Date sunsets are measured against (YYYY-MM-DD), default today
    #[arg(long)]
    pub evaluation_date: Option<NaiveDate>,
}
