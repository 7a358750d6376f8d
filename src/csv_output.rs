//! CSV output format for query summaries
//!
//! One row per SQL text: `sql,total,count,avg`. SQL is quoted whenever it
//! contains a comma, quote or line break.

use crate::stats::{SortKey, SummaryGroup, SummaryTable};

/// CSV statistics output formatter
#[derive(Debug)]
pub struct CsvSummaryOutput<'a> {
    groups: Vec<&'a SummaryGroup>,
}

impl<'a> CsvSummaryOutput<'a> {
    /// Create a formatter over `table` in `sort` order
    pub fn new(table: &'a SummaryTable, sort: SortKey) -> Self {
        Self {
            groups: table.sorted(sort),
        }
    }

    fn header() -> &'static str {
        "sql,total,count,avg"
    }

    /// Escape CSV field (handle commas, quotes, newlines)
    fn escape_field(field: &str) -> String {
        if field.contains([',', '"', '\n', '\r']) {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    fn format_group(group: &SummaryGroup) -> String {
        format!(
            "{},{},{},{}",
            Self::escape_field(&group.sql),
            group.total,
            group.count,
            group.avg
        )
    }

    /// Generate CSV output as string
    pub fn to_csv(&self) -> String {
        let mut output = String::new();

        output.push_str(Self::header());
        output.push('\n');

        for group in &self.groups {
            output.push_str(&Self::format_group(group));
            output.push('\n');
        }

        output
    }
}
