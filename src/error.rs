//! Error types for recording, decoding and hooking query logs

use std::fmt;
use thiserror::Error;

/// Failure to turn an encoded SQL field back into text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("invalid base64: {0}")]
    InvalidBase64(String),

    #[error("decoded SQL is not valid UTF-8: {0}")]
    InvalidUtf8(String),
}

/// Why a single log line could not become an observation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordErrorKind {
    /// No tab between the encoded SQL and the elapsed time
    MissingSeparator,
    /// Elapsed time field is empty or not a decimal integer
    NonNumericTime(String),
    /// Elapsed time field carries a minus sign
    NegativeTime(String),
}

impl fmt::Display for RecordErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSeparator => write!(f, "missing tab separator"),
            Self::NonNumericTime(raw) => write!(f, "non-numeric elapsed time {:?}", raw),
            Self::NegativeTime(raw) => write!(f, "negative elapsed time {:?}", raw),
        }
    }
}

/// Errors produced by the query log library
#[derive(Error, Debug)]
pub enum QueryLogError {
    #[error("line {line}: cannot decode SQL: {source}")]
    Encoding {
        line: usize,
        #[source]
        source: CodecError,
    },

    #[error("line {line}: malformed record: {kind}")]
    MalformedRecord { line: usize, kind: RecordErrorKind },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("driver '{driver}' is not supported: it provides no {missing}")]
    UnsupportedDriver {
        driver: &'static str,
        missing: &'static str,
    },

    #[error("unknown driver '{0}' (expected sqlite3-profile, sqlite3-trace or sqlite3-progress)")]
    UnknownDriver(String),

    #[error("invalid query pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Result type for query log operations
pub type Result<T> = std::result::Result<T, QueryLogError>;
