//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use slice_alerts::PathRule;
use slice_logs::AggregationMode;

/// logslice - cut incident windows out of load balancer logs.
#[derive(Parser, Debug, Clone)]
#[command(name = "logslice")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Settings file (JSON).
    #[arg(short, long, env = "LOGSLICE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Table, global = true)]
    pub format: Format,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Fetch, classify and report every alert in the alert file.
    Run(RunArgs),

    /// Resolve alerts to client, remote path and window without fetching.
    Resolve(ResolveArgs),

    /// Classify an already downloaded folder and write its reports.
    Scan(ScanArgs),
}

/// Inputs shared by `run` and `resolve`.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Alert file, overriding the settings.
    #[arg(short, long)]
    pub alerts: Option<PathBuf>,

    /// Client directory file, overriding the settings.
    #[arg(long)]
    pub client_map: Option<PathBuf>,

    /// Window radius in minutes.
    #[arg(short, long)]
    pub window_minutes: Option<i64>,

    /// Category to log family mapping.
    #[arg(long, value_enum)]
    pub path_rule: Option<PathRuleArg>,
}

/// Arguments for the run command.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Alert and directory inputs.
    #[command(flatten)]
    pub source: SourceArgs,

    /// Root for incident folders and reports.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Read logs from a local mirror of the bucket instead of the aws CLI.
    #[arg(long, conflicts_with = "profile")]
    pub mirror: Option<PathBuf>,

    /// aws CLI profile.
    #[arg(long)]
    pub profile: Option<String>,

    /// High-latency threshold in seconds.
    #[arg(long)]
    pub latency_threshold: Option<f64>,
}

/// Arguments for the resolve command.
#[derive(Args, Debug, Clone, Default)]
pub struct ResolveArgs {
    /// Alert and directory inputs.
    #[command(flatten)]
    pub source: SourceArgs,
}

/// Arguments for the scan command.
#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Folder holding the log files.
    pub dir: PathBuf,

    /// Which error class to report.
    #[arg(short, long, value_enum)]
    pub mode: ModeArg,

    /// High-latency threshold in seconds.
    #[arg(long)]
    pub latency_threshold: Option<f64>,
}

/// Aggregation mode as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// 4xx errors.
    #[value(name = "4xx")]
    ClientErrors,
    /// 5xx errors and high latency.
    #[value(name = "5xx")]
    ServerErrors,
}

impl From<ModeArg> for AggregationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::ClientErrors => Self::ClientErrors,
            ModeArg::ServerErrors => Self::ServerErrorsAndLatency,
        }
    }
}

/// Path rule as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PathRuleArg {
    /// 4xx, 5xx and latency alerts use the classic load balancer logs.
    Canonical,
    /// Only 4xx alerts use the classic load balancer logs.
    Legacy,
}

impl From<PathRuleArg> for PathRule {
    fn from(rule: PathRuleArg) -> Self {
        match rule {
            PathRuleArg::Canonical => Self::Canonical,
            PathRuleArg::Legacy => Self::Legacy,
        }
    }
}
