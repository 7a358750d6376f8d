//! Per-query statistics aggregation
//!
//! Groups observations by exact SQL text and keeps count, total and average
//! time for each group. Observations faster than the threshold are dropped
//! before grouping. Groups iterate in first-seen order so reports are stable.

use crate::decoder::Observation;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Statistics for a single SQL text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryGroup {
    /// SQL text (grouping key)
    pub sql: String,
    /// Sum of admitted elapsed times in milliseconds, saturating at `u64::MAX`
    pub total: u64,
    /// Number of admitted executions
    pub count: u64,
    /// `total / count`
    pub avg: f64,
}

impl SummaryGroup {
    fn new(sql: &str, time: u64) -> Self {
        Self {
            sql: sql.to_string(),
            total: time,
            count: 1,
            avg: time as f64,
        }
    }

    fn add(&mut self, time: u64) {
        self.total = self.total.saturating_add(time);
        self.count = self.count.saturating_add(1);
        self.avg = self.total as f64 / self.count as f64;
    }
}

/// Totals across every group of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SummaryTotals {
    pub groups: usize,
    pub count: u64,
    pub total: u64,
}

/// Ordering for summary reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Order in which each SQL text first appeared
    #[default]
    FirstSeen,
    /// Most executions first
    Count,
    /// Most total time first
    Total,
    /// Slowest average first
    Avg,
}

/// Summary of observations keyed by exact SQL text
#[derive(Debug, Clone, Default)]
pub struct SummaryTable {
    threshold_ms: u64,
    /// Groups in first-seen order
    groups: Vec<SummaryGroup>,
    /// SQL text -> index into `groups`
    index: HashMap<String, usize>,
    /// Observations dropped by the threshold
    below_threshold: u64,
}

impl SummaryTable {
    /// Create an empty table admitting observations with `time >= threshold_ms`
    pub fn new(threshold_ms: u64) -> Self {
        Self {
            threshold_ms,
            ..Default::default()
        }
    }

    /// Add one observation, returning whether it passed the threshold
    pub fn push(&mut self, observation: &Observation) -> bool {
        self.record(&observation.sql, observation.time)
    }

    /// Add one execution of `sql` taking `time` milliseconds
    pub fn record(&mut self, sql: &str, time: u64) -> bool {
        if time < self.threshold_ms {
            self.below_threshold += 1;
            return false;
        }

        match self.index.get(sql) {
            Some(&idx) => self.groups[idx].add(time),
            None => {
                self.index.insert(sql.to_string(), self.groups.len());
                self.groups.push(SummaryGroup::new(sql, time));
            }
        }
        true
    }

    /// Threshold this table was built with
    pub fn threshold_ms(&self) -> u64 {
        self.threshold_ms
    }

    /// Number of observations rejected by the threshold
    pub fn below_threshold(&self) -> u64 {
        self.below_threshold
    }

    /// Groups in first-seen order
    pub fn groups(&self) -> &[SummaryGroup] {
        &self.groups
    }

    /// Look up the group for an exact SQL text
    pub fn get(&self, sql: &str) -> Option<&SummaryGroup> {
        self.index.get(sql).map(|&idx| &self.groups[idx])
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Totals over all groups
    pub fn totals(&self) -> SummaryTotals {
        self.groups
            .iter()
            .fold(SummaryTotals::default(), |acc, g| SummaryTotals {
                groups: acc.groups + 1,
                count: acc.count.saturating_add(g.count),
                total: acc.total.saturating_add(g.total),
            })
    }

    /// Groups ordered by `key`; numeric keys sort descending, ties stay first-seen
    pub fn sorted(&self, key: SortKey) -> Vec<&SummaryGroup> {
        let mut sorted: Vec<_> = self.groups.iter().collect();
        match key {
            SortKey::FirstSeen => {}
            SortKey::Count => sorted.sort_by(|a, b| b.count.cmp(&a.count)),
            SortKey::Total => sorted.sort_by(|a, b| b.total.cmp(&a.total)),
            SortKey::Avg => sorted.sort_by(|a, b| {
                b.avg
                    .partial_cmp(&a.avg)
                    .unwrap_or(std::cmp::Ordering::Equal)
            }),
        }
        sorted
    }
}

/// Aggregate a sequence of observations into a summary table
pub fn aggregate<'a, I>(observations: I, threshold_ms: u64) -> SummaryTable
where
    I: IntoIterator<Item = &'a Observation>,
{
    let mut table = SummaryTable::new(threshold_ms);
    for observation in observations {
        table.push(observation);
    }
    tracing::debug!(
        "aggregated {} groups ({} observations below {}ms threshold)",
        table.len(),
        table.below_threshold(),
        threshold_ms
    );
    table
}
