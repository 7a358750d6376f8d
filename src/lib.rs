//! sqlite-query-log - per-query SQLite timing logs
//!
//! This library records one line per executed query from a driver's profile
//! callback, decodes those logs back into observations, and summarizes them
//! by exact SQL text (count, total and average time).
//!
//! ```
//! use sqlite_query_log::{decoder, recorder::{MemoryLogSink, QueryRecorder}, stats};
//!
//! let recorder = QueryRecorder::new(MemoryLogSink::new());
//! recorder.record("SELECT 1", 5).unwrap();
//! recorder.record("SELECT 1", 15).unwrap();
//!
//! let report = decoder::decode(&recorder.sink().contents());
//! let table = stats::aggregate(&report.observations, 0);
//! assert_eq!(table.get("SELECT 1").unwrap().avg, 10.0);
//! ```

pub mod cli;
pub mod codec;
pub mod config;
pub mod csv_output;
pub mod decoder;
pub mod error;
pub mod filter;
pub mod hook;
pub mod json_output;
pub mod recorder;
pub mod report;
pub mod stats;
pub mod text_output;

pub use decoder::{decode, decode_strict, DecodeReport, Observation};
pub use error::{QueryLogError, Result};
pub use hook::{DriverKind, ProfileHook, ProfileSource};
pub use recorder::{FileLogSink, LogSink, MemoryLogSink, QueryRecorder};
pub use stats::{aggregate, SortKey, SummaryGroup, SummaryTable};
