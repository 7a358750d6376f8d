//! Query log decoding
//!
//! Turns the full text of a query log back into ordered observations.
//! Bad records are reported by line number and skipped; they never turn into
//! zero-time observations. [`decode_strict`] stops at the first bad record
//! instead.

use crate::codec::{decode_sql, parse_elapsed, split_record, RECORD_SEPARATOR};
use crate::error::{CodecError, QueryLogError, RecordErrorKind, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One executed query as read back from the log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// SQL text exactly as the driver reported it
    pub sql: String,
    /// Elapsed time in milliseconds
    pub time: u64,
}

impl Observation {
    pub fn new(sql: impl Into<String>, time: u64) -> Self {
        Self {
            sql: sql.into(),
            time,
        }
    }
}

/// Reason a record failed to decode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordFault {
    Encoding(CodecError),
    Malformed(RecordErrorKind),
}

impl fmt::Display for RecordFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encoding(e) => write!(f, "cannot decode SQL: {}", e),
            Self::Malformed(kind) => write!(f, "malformed record: {}", kind),
        }
    }
}

/// A record that could not be decoded, with its 1-based line number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordError {
    pub line: usize,
    pub fault: RecordFault,
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.fault)
    }
}

impl From<RecordError> for QueryLogError {
    fn from(err: RecordError) -> Self {
        match err.fault {
            RecordFault::Encoding(source) => QueryLogError::Encoding {
                line: err.line,
                source,
            },
            RecordFault::Malformed(kind) => QueryLogError::MalformedRecord {
                line: err.line,
                kind,
            },
        }
    }
}

/// Result of decoding a whole log
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeReport {
    /// Decoded observations, in log order
    pub observations: Vec<Observation>,
    /// Records that were skipped, in log order
    pub errors: Vec<RecordError>,
}

impl DecodeReport {
    /// True when every record decoded
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Decode a single log line (terminator already removed)
pub fn decode_line(line: &str) -> std::result::Result<Observation, RecordFault> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let (encoded, elapsed) = split_record(line).map_err(RecordFault::Malformed)?;
    let sql = decode_sql(encoded).map_err(RecordFault::Encoding)?;
    let time = parse_elapsed(elapsed).map_err(RecordFault::Malformed)?;
    Ok(Observation { sql, time })
}

/// Iterate over the non-empty lines of a log with 1-based line numbers
fn records(log_text: &str) -> impl Iterator<Item = (usize, &str)> {
    log_text
        .split(RECORD_SEPARATOR)
        .enumerate()
        .map(|(idx, line)| (idx + 1, line))
        .filter(|(_, line)| !line.is_empty() && *line != "\r")
}

/// Decode a log, skipping and reporting bad records
pub fn decode(log_text: &str) -> DecodeReport {
    let mut report = DecodeReport::default();

    for (line, text) in records(log_text) {
        match decode_line(text) {
            Ok(observation) => report.observations.push(observation),
            Err(fault) => {
                tracing::warn!("skipping line {}: {}", line, fault);
                report.errors.push(RecordError { line, fault });
            }
        }
    }

    tracing::debug!(
        "decoded {} observations, {} bad records",
        report.observations.len(),
        report.errors.len()
    );
    report
}

/// Decode a log, failing on the first bad record
pub fn decode_strict(log_text: &str) -> Result<Vec<Observation>> {
    records(log_text)
        .map(|(line, text)| {
            decode_line(text).map_err(|fault| QueryLogError::from(RecordError { line, fault }))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_SELECTS: &str = "U0VMRUNUIDE=\t5\nU0VMRUNUIDE=\t15\n";

    #[test]
    fn test_decode_two_records() {
        let report = decode(TWO_SELECTS);
        assert!(report.is_clean());
        assert_eq!(
            report.observations,
            vec![Observation::new("SELECT 1", 5), Observation::new("SELECT 1", 15)]
        );
    }

    #[test]
    fn test_decode_empty_log() {
        let report = decode("");
        assert!(report.observations.is_empty());
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_trailing_newline_is_not_a_record() {
        let report = decode("U0VMRUNUIDE=\t5\n");
        assert_eq!(report.observations.len(), 1);
        assert!(report.is_clean());
    }

    #[test]
    fn test_missing_final_newline() {
        let report = decode("U0VMRUNUIDE=\t5\nU0VMRUNUIDE=\t7");
        assert_eq!(report.observations.len(), 2);
        assert_eq!(report.observations[1].time, 7);
    }

    #[test]
    fn test_crlf_lines() {
        let report = decode("U0VMRUNUIDE=\t5\r\nU0VMRUNUIDE=\t7\r\n");
        assert!(report.is_clean());
        assert_eq!(report.observations[0].time, 5);
        assert_eq!(report.observations[1].time, 7);
    }

    #[test]
    fn test_missing_tab_reported_and_skipped() {
        let log = "U0VMRUNUIDE=\t5\nU0VMRUNUIDE=\nU0VMRUNUIDE=\t15\n";
        let report = decode(log);

        assert_eq!(report.observations.len(), 2);
        assert_eq!(report.observations[1].time, 15);
        assert_eq!(
            report.errors,
            vec![RecordError {
                line: 2,
                fault: RecordFault::Malformed(RecordErrorKind::MissingSeparator),
            }]
        );
    }

    #[test]
    fn test_bad_base64_reported() {
        let report = decode("!!!\t5\n");
        assert!(report.observations.is_empty());
        assert_eq!(report.errors[0].line, 1);
        assert!(matches!(report.errors[0].fault, RecordFault::Encoding(_)));
    }

    #[test]
    fn test_negative_and_non_numeric_time() {
        let report = decode("U0VMRUNUIDE=\t-5\nU0VMRUNUIDE=\tfast\n");
        assert!(report.observations.is_empty());
        assert_eq!(
            report.errors[0].fault,
            RecordFault::Malformed(RecordErrorKind::NegativeTime("-5".to_string()))
        );
        assert_eq!(
            report.errors[1].fault,
            RecordFault::Malformed(RecordErrorKind::NonNumericTime("fast".to_string()))
        );
    }

    #[test]
    fn test_blank_lines_keep_line_numbers() {
        let report = decode("U0VMRUNUIDE=\t5\n\nbad\n");
        assert_eq!(report.errors[0].line, 3);
    }

    #[test]
    fn test_record_error_display() {
        let err = RecordError {
            line: 4,
            fault: RecordFault::Malformed(RecordErrorKind::MissingSeparator),
        };
        assert_eq!(err.to_string(), "line 4: malformed record: missing tab separator");
    }

    #[test]
    fn test_decode_strict_ok() {
        let observations = decode_strict(TWO_SELECTS).unwrap();
        assert_eq!(observations.len(), 2);
    }

    #[test]
    fn test_decode_strict_fails_on_first_bad_line() {
        let err = decode_strict("U0VMRUNUIDE=\t5\nnope\nalso bad\n").unwrap_err();
        match err {
            QueryLogError::MalformedRecord { line, kind } => {
                assert_eq!(line, 2);
                assert_eq!(kind, RecordErrorKind::MissingSeparator);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_decode_is_idempotent() {
        assert_eq!(decode(TWO_SELECTS), decode(TWO_SELECTS));
    }

    #[test]
    fn test_observation_json_shape() {
        let json = serde_json::to_string(&Observation::new("SELECT 1", 5)).unwrap();
        assert_eq!(json, r#"{"sql":"SELECT 1","time":5}"#);
    }
}
