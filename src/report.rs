//! Building and rendering summary reports from observations

use crate::cli::OutputFormat;
use crate::csv_output::CsvSummaryOutput;
use crate::decoder::Observation;
use crate::filter::QueryFilter;
use crate::json_output::summary_to_json;
use crate::stats::{aggregate, SortKey, SummaryTable};
use crate::text_output::{render_blocks, render_table};

/// Fully resolved options for one summary report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportOptions {
    pub threshold_ms: u64,
    pub sort: SortKey,
    pub format: OutputFormat,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

/// Filter and aggregate observations according to `options`
pub fn build_summary(
    observations: &[Observation],
    options: &ReportOptions,
) -> crate::error::Result<SummaryTable> {
    let filter = QueryFilter::new(options.include.as_slice(), options.exclude.as_slice())?;
    Ok(aggregate(filter.apply(observations), options.threshold_ms))
}

/// Render a summary in the requested format
pub fn render(table: &SummaryTable, options: &ReportOptions) -> anyhow::Result<String> {
    Ok(match options.format {
        OutputFormat::Text => render_blocks(table, options.sort),
        OutputFormat::Table => render_table(table, options.sort),
        OutputFormat::Json => summary_to_json(table, options.sort)?,
        OutputFormat::Csv => CsvSummaryOutput::new(table, options.sort).to_csv(),
    })
}
