//! CLI argument parsing for sqlite-query-log

use crate::config::{AnalyzeConfig, Config};
use crate::report::ReportOptions;
use crate::stats::SortKey;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;

/// Output format for summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// One block per query: SQL line, then total<TAB>count<TAB>avg (default)
    #[default]
    Text,
    /// Aligned table with share of total time
    Table,
    /// JSON array for machine parsing
    Json,
    /// CSV format for spreadsheet analysis
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "sqlite-query-log")]
#[command(version)]
#[command(about = "Decode and summarize SQLite per-query timing logs", long_about = None)]
pub struct Cli {
    /// TOML file with default options
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug tracing on stderr
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode the SQL strings of a query log, converting to JSON
    Decode(DecodeArgs),
    /// Summarize a decoded JSON file by SQL text
    Analyze(AnalyzeArgs),
    /// Decode a query log and summarize it in one step
    Summarize(SummarizeArgs),
    /// Append one query timing to a log
    Record(RecordArgs),
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Query log to decode
    #[arg(value_name = "LOG")]
    pub log: PathBuf,

    /// Output file name; stdout if not given
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Fail on the first malformed record instead of skipping it
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// JSON file written by `decode`
    #[arg(value_name = "JSON")]
    pub json: PathBuf,

    #[command(flatten)]
    pub report: ReportArgs,
}

#[derive(Args, Debug)]
pub struct SummarizeArgs {
    /// Query log to decode and summarize
    #[arg(value_name = "LOG")]
    pub log: PathBuf,

    /// Fail on the first malformed record instead of skipping it
    #[arg(long)]
    pub strict: bool,

    #[command(flatten)]
    pub report: ReportArgs,
}

#[derive(Args, Debug)]
pub struct RecordArgs {
    /// SQL text of the executed query
    #[arg(value_name = "SQL")]
    pub sql: String,

    /// Elapsed time in milliseconds
    #[arg(long, value_name = "MS")]
    pub elapsed: u64,

    /// Log file to append to (default: [record] log_path, then queries.log)
    #[arg(long, value_name = "FILE")]
    pub log: Option<PathBuf>,
}

/// Options shared by the summary commands
#[derive(Args, Debug, Default)]
pub struct ReportArgs {
    /// Minimum execution time, milliseconds, for a query to be included
    #[arg(long, value_name = "MS")]
    pub threshold: Option<u64>,

    /// Output file name; stdout if not given
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Summary format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Group order
    #[arg(long, value_enum)]
    pub sort: Option<SortKey>,

    /// Only include queries matching this regex (repeatable)
    #[arg(long, value_name = "REGEX")]
    pub include: Vec<String>,

    /// Exclude queries matching this regex (repeatable)
    #[arg(long, value_name = "REGEX")]
    pub exclude: Vec<String>,
}

impl ReportArgs {
    /// Merge flags over config-file defaults
    pub fn resolve(&self, defaults: &AnalyzeConfig) -> ReportOptions {
        ReportOptions {
            threshold_ms: self.threshold.or(defaults.threshold_ms).unwrap_or(0),
            sort: self.sort.or(defaults.sort).unwrap_or_default(),
            format: self.format.or(defaults.format).unwrap_or_default(),
            include: pick(&self.include, &defaults.include),
            exclude: pick(&self.exclude, &defaults.exclude),
        }
    }
}

fn pick(flags: &[String], defaults: &[String]) -> Vec<String> {
    if flags.is_empty() {
        defaults.to_vec()
    } else {
        flags.to_vec()
    }
}

impl RecordArgs {
    /// Log path from the flag, then config, then `queries.log`
    pub fn log_path(&self, config: &Config) -> PathBuf {
        self.log
            .clone()
            .or_else(|| config.record.log_path.clone())
            .unwrap_or_else(|| PathBuf::from("queries.log"))
    }
}
