//! Plain-text summary reports
//!
//! `render_blocks` writes the tab-delimited report: one block per SQL text,
//! the SQL on its own line followed by `total\tcount\tavg`.
//! `render_table` writes an aligned table with a totals line, closer to what
//! `strace -c` prints.

use crate::stats::{SortKey, SummaryTable};

/// Delimited block report, one block per group
pub fn render_blocks(table: &SummaryTable, sort: SortKey) -> String {
    table
        .sorted(sort)
        .iter()
        .map(|g| format!("\n\n{}\n{}\t{}\t{}", g.sql, g.total, g.count, g.avg))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapse runs of whitespace so multi-line SQL fits on one table row
fn single_line(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Aligned table report with percentage of total time per group
pub fn render_table(table: &SummaryTable, sort: SortKey) -> String {
    if table.is_empty() {
        return "No queries recorded.\n".to_string();
    }

    let totals = table.totals();
    let mut out = String::new();

    out.push_str("% time    total ms      avg ms     calls query\n");
    out.push_str("------ ----------- ----------- --------- ----------------\n");

    for group in table.sorted(sort) {
        let time_percent = if totals.total > 0 {
            (group.total as f64 / totals.total as f64) * 100.0
        } else {
            0.0
        };
        out.push_str(&format!(
            "{:6.2} {:>11} {:>11.2} {:>9} {}\n",
            time_percent,
            group.total,
            group.avg,
            group.count,
            single_line(&group.sql)
        ));
    }

    out.push_str("------ ----------- ----------- --------- ----------------\n");
    let avg = if totals.count > 0 {
        totals.total as f64 / totals.count as f64
    } else {
        0.0
    };
    out.push_str(&format!(
        "100.00 {:>11} {:>11.2} {:>9} total ({} distinct)\n",
        totals.total, avg, totals.count, totals.groups
    ));
    out
}
