//! JSON output for decoded logs and summaries
//!
//! Decoded logs are written as a bare array of `{"sql", "time"}` objects so
//! `analyze` can read them back; summaries are an array of
//! `{"sql", "total", "count", "avg"}` objects in report order.

use crate::decoder::Observation;
use crate::stats::{SortKey, SummaryGroup, SummaryTable};
use anyhow::{Context, Result};

/// Serialize decoded observations as a JSON array
pub fn observations_to_json(observations: &[Observation]) -> Result<String> {
    serde_json::to_string(observations).context("Failed to serialize observations")
}

/// Parse a JSON array of observations, as written by [`observations_to_json`]
pub fn observations_from_json(json: &str) -> Result<Vec<Observation>> {
    serde_json::from_str(json).context("Failed to parse observations JSON")
}

/// Serialize a summary table as a JSON array ordered by `sort`
pub fn summary_to_json(table: &SummaryTable, sort: SortKey) -> Result<String> {
    let groups: Vec<&SummaryGroup> = table.sorted(sort);
    serde_json::to_string_pretty(&groups).context("Failed to serialize summary")
}
