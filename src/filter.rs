//! Query filtering for reports
//!
//! Include/exclude regex patterns over SQL text. Filtering happens before
//! aggregation and never rewrites the grouping key.

use crate::decoder::Observation;
use crate::error::{QueryLogError, Result};
use regex::Regex;

/// Filter deciding which queries make it into a summary
#[derive(Debug, Clone, Default)]
pub struct QueryFilter {
    /// Keep queries matching any of these (empty = keep everything)
    include: Vec<Regex>,
    /// Drop queries matching any of these
    exclude: Vec<Regex>,
}

impl QueryFilter {
    /// Create a filter that keeps every query
    pub fn all() -> Self {
        Self::default()
    }

    /// Build a filter from include and exclude patterns
    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Result<Self> {
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    /// True when no pattern is configured
    pub fn is_pass_through(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    /// Whether `sql` passes the filter
    pub fn should_include(&self, sql: &str) -> bool {
        let included = self.include.is_empty() || self.include.iter().any(|re| re.is_match(sql));
        included && !self.exclude.iter().any(|re| re.is_match(sql))
    }

    /// Observations passing the filter, order preserved
    pub fn apply<'a>(
        &'a self,
        observations: &'a [Observation],
    ) -> impl Iterator<Item = &'a Observation> + 'a {
        observations
            .iter()
            .filter(move |o| self.should_include(&o.sql))
    }
}

fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            let pattern = p.as_ref();
            Regex::new(pattern).map_err(|source| QueryLogError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
        })
        .collect()
}
