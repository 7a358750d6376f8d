//! On-disk record encoding for the query log
//!
//! Each record is one line: `BASE64(sql)`, a tab, the elapsed milliseconds as
//! a decimal integer, then `\n`. The standard base64 alphabet has no tab or
//! newline, so SQL text containing either cannot break the record layout.

use crate::error::{CodecError, RecordErrorKind};
use base64::{engine::general_purpose::STANDARD, Engine};

/// Field separator between encoded SQL and elapsed time
pub const FIELD_SEPARATOR: char = '\t';

/// Record terminator
pub const RECORD_SEPARATOR: char = '\n';

/// Encode SQL text for the log
pub fn encode_sql(sql: &str) -> String {
    STANDARD.encode(sql.as_bytes())
}

/// Decode an encoded SQL field back to text
pub fn decode_sql(encoded: &str) -> Result<String, CodecError> {
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| CodecError::InvalidBase64(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CodecError::InvalidUtf8(e.to_string()))
}

/// Format one complete log line, terminator included
pub fn format_record(sql: &str, elapsed_ms: u64) -> String {
    format!(
        "{}{}{}{}",
        encode_sql(sql),
        FIELD_SEPARATOR,
        elapsed_ms,
        RECORD_SEPARATOR
    )
}

/// Split a line (without terminator) into its encoded SQL and time fields
///
/// Only the first tab separates; anything after it belongs to the time field
/// and is rejected by [`parse_elapsed`] if it is not a number.
pub fn split_record(line: &str) -> Result<(&str, &str), RecordErrorKind> {
    line.split_once(FIELD_SEPARATOR)
        .ok_or(RecordErrorKind::MissingSeparator)
}

/// Parse the elapsed-time field as non-negative milliseconds
pub fn parse_elapsed(field: &str) -> Result<u64, RecordErrorKind> {
    if let Some(rest) = field.strip_prefix('-') {
        if !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RecordErrorKind::NegativeTime(field.to_string()));
        }
    }

    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RecordErrorKind::NonNumericTime(field.to_string()));
    }

    // All digits but too large for u64
    field
        .parse::<u64>()
        .map_err(|_| RecordErrorKind::NonNumericTime(field.to_string()))
}
