//! Optional TOML configuration
//!
//! ```toml
//! [analyze]
//! threshold_ms = 10
//! sort = "total"
//! format = "table"
//! include = ["^SELECT"]
//! exclude = ["sqlite_master"]
//!
//! [record]
//! log_path = "queries.log"
//! truncate_on_open = false
//! ```
//!
//! Every key is optional. Command-line flags override file values.

use crate::cli::OutputFormat;
use crate::recorder::RecorderConfig;
use crate::stats::SortKey;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Defaults for the `analyze` and `summarize` commands
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzeConfig {
    pub threshold_ms: Option<u64>,
    pub sort: Option<SortKey>,
    pub format: Option<OutputFormat>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub analyze: AnalyzeConfig,
    pub record: RecorderConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Load configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML")
    }

    /// Load `path` if given, otherwise use defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}
