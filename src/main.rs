use anyhow::{Context, Result};
use clap::Parser;
use sqlite_query_log::cli::{AnalyzeArgs, Cli, Command, DecodeArgs, RecordArgs, SummarizeArgs};
use sqlite_query_log::config::Config;
use sqlite_query_log::decoder::{self, Observation};
use sqlite_query_log::json_output::{observations_from_json, observations_to_json};
use sqlite_query_log::recorder::{FileLogSink, QueryRecorder};
use sqlite_query_log::report::{self, ReportOptions};
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Write to `output` if given, otherwise print to stdout
fn emit(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            println!("{}", content);
            Ok(())
        }
    }
}

/// Decode a log file, printing skipped records to stderr
fn load_log(path: &Path, strict: bool) -> Result<Vec<Observation>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read query log {}", path.display()))?;

    if strict {
        return decoder::decode_strict(&text)
            .with_context(|| format!("Failed to decode {}", path.display()));
    }

    let report = decoder::decode(&text);
    for err in &report.errors {
        eprintln!("{}: {}", path.display(), err);
    }
    Ok(report.observations)
}

fn summarize(observations: &[Observation], options: &ReportOptions) -> Result<String> {
    let table = report::build_summary(observations, options)?;
    report::render(&table, options)
}

fn run_decode(args: DecodeArgs) -> Result<()> {
    let observations = load_log(&args.log, args.strict)?;
    emit(args.output.as_deref(), &observations_to_json(&observations)?)
}

fn run_analyze(args: AnalyzeArgs, config: &Config) -> Result<()> {
    let json = fs::read_to_string(&args.json)
        .with_context(|| format!("Failed to read {}", args.json.display()))?;
    let observations = observations_from_json(&json)
        .with_context(|| format!("Invalid decoded log {}", args.json.display()))?;

    let options = args.report.resolve(&config.analyze);
    emit(args.report.output.as_deref(), &summarize(&observations, &options)?)
}

fn run_summarize(args: SummarizeArgs, config: &Config) -> Result<()> {
    let observations = load_log(&args.log, args.strict)?;
    let options = args.report.resolve(&config.analyze);
    emit(args.report.output.as_deref(), &summarize(&observations, &options)?)
}

fn run_record(args: RecordArgs, config: &Config) -> Result<()> {
    let path = args.log_path(config);
    if config.record.truncate_on_open {
        // One line per invocation; truncating would keep only the last record
        eprintln!("warning: [record] truncate_on_open is ignored by `record`, which appends");
        tracing::warn!("ignoring truncate_on_open for {}", path.display());
    }
    let sink = FileLogSink::open(&path)
        .with_context(|| format!("Failed to open query log {}", path.display()))?;
    QueryRecorder::new(sink)
        .record(&args.sql, args.elapsed)
        .with_context(|| format!("Failed to append to {}", path.display()))
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let config = Config::load(args.config.as_deref())?;

    match args.command {
        Command::Decode(decode_args) => run_decode(decode_args),
        Command::Analyze(analyze_args) => run_analyze(analyze_args, &config),
        Command::Summarize(summarize_args) => run_summarize(summarize_args, &config),
        Command::Record(record_args) => run_record(record_args, &config),
    }
}
