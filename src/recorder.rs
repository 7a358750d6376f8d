//! Appending query observations to the log
//!
//! A [`QueryRecorder`] turns one `(sql, elapsed)` pair into one log line and
//! hands it to a [`LogSink`]. Sinks append a whole line per call under a
//! lock, so concurrent completions never interleave partial records.

use crate::codec::format_record;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Append-only destination for encoded log lines
pub trait LogSink: Send + Sync {
    /// Append one complete line; must not interleave with other appends
    fn append(&self, line: &str) -> io::Result<()>;
}

/// Log file opened in append mode
#[derive(Debug)]
pub struct FileLogSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileLogSink {
    /// Open (creating if needed) a log file for appending
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Self::open_with(path, false)
    }

    /// Open a log file, optionally discarding what a previous run left in it
    pub fn open_with<P: AsRef<Path>>(path: P, truncate: bool) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if truncate {
            File::create(&path)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        tracing::debug!("query log opened at {}", path.display());
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSink for FileLogSink {
    fn append(&self, line: &str) -> io::Result<()> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::other("query log lock poisoned"))?;
        file.write_all(line.as_bytes())?;
        file.flush()
    }
}

/// In-memory log, useful for tests and for embedding
#[derive(Debug, Default)]
pub struct MemoryLogSink {
    buffer: Mutex<String>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything appended so far
    pub fn contents(&self) -> String {
        // Appends are whole-line, so a poisoned buffer still holds complete records
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl LogSink for MemoryLogSink {
    fn append(&self, line: &str) -> io::Result<()> {
        self.buffer
            .lock()
            .map_err(|_| io::Error::other("query log lock poisoned"))?
            .push_str(line);
        Ok(())
    }
}

/// Recorder settings, usually read from the `[record]` config table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecorderConfig {
    /// Log file to append to
    pub log_path: Option<PathBuf>,
    /// Start from an empty log instead of appending to an old one
    pub truncate_on_open: bool,
}

/// Writes one log record per executed query
#[derive(Debug)]
pub struct QueryRecorder<S: LogSink = FileLogSink> {
    sink: S,
}

impl QueryRecorder<FileLogSink> {
    /// Recorder appending to the file at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(FileLogSink::open(path)?))
    }

    /// Recorder built from config, falling back to `default_path`
    pub fn from_config(config: &RecorderConfig, default_path: &Path) -> Result<Self> {
        let path = config.log_path.as_deref().unwrap_or(default_path);
        Ok(Self::new(FileLogSink::open_with(
            path,
            config.truncate_on_open,
        )?))
    }
}

impl<S: LogSink> QueryRecorder<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Record one execution of `sql` that took `elapsed_ms` milliseconds
    pub fn record(&self, sql: &str, elapsed_ms: u64) -> Result<()> {
        let line = format_record(sql, elapsed_ms);
        self.sink.append(&line)?;
        tracing::trace!("recorded query ({} ms, {} bytes)", elapsed_ms, line.len());
        Ok(())
    }

    /// Record one execution timed as a [`Duration`], truncated to milliseconds
    pub fn record_duration(&self, sql: &str, elapsed: Duration) -> Result<()> {
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self.record(sql, elapsed_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::{decode, Observation};
    use crate::error::QueryLogError;
    use std::sync::Arc;
    use std::thread;

    struct BrokenSink;

    impl LogSink for BrokenSink {
        fn append(&self, _line: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        }
    }

    #[test]
    fn test_record_writes_one_line() {
        let recorder = QueryRecorder::new(MemoryLogSink::new());
        recorder.record("SELECT 1", 5).unwrap();
        assert_eq!(recorder.sink().contents(), "U0VMRUNUIDE=\t5\n");
    }

    #[test]
    fn test_record_appends_in_order() {
        let recorder = QueryRecorder::new(MemoryLogSink::new());
        recorder.record("SELECT 1", 5).unwrap();
        recorder.record("SELECT\t2\n", 7).unwrap();

        let report = decode(&recorder.sink().contents());
        assert_eq!(
            report.observations,
            vec![Observation::new("SELECT 1", 5), Observation::new("SELECT\t2\n", 7)]
        );
    }

    #[test]
    fn test_record_duration_truncates_to_millis() {
        let recorder = QueryRecorder::new(MemoryLogSink::new());
        recorder
            .record_duration("SELECT 1", Duration::from_micros(15_900))
            .unwrap();
        assert_eq!(recorder.sink().contents(), "U0VMRUNUIDE=\t15\n");
    }

    #[test]
    fn test_unwritable_sink_surfaces_io_error() {
        let recorder = QueryRecorder::new(BrokenSink);
        let err = recorder.record("SELECT 1", 5).unwrap_err();
        assert!(matches!(err, QueryLogError::Io(_)));
    }

    #[test]
    fn test_file_sink_appends_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("queries.log");

        QueryRecorder::open(&path).unwrap().record("SELECT 1", 5).unwrap();
        QueryRecorder::open(&path).unwrap().record("SELECT 1", 15).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "U0VMRUNUIDE=\t5\nU0VMRUNUIDE=\t15\n");
    }

    #[test]
    fn test_truncate_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("queries.log");
        std::fs::write(&path, "stale\n").unwrap();

        let config = RecorderConfig {
            log_path: Some(path.clone()),
            truncate_on_open: true,
        };
        let recorder = QueryRecorder::from_config(&config, Path::new("unused.log")).unwrap();
        recorder.record("SELECT 1", 5).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "U0VMRUNUIDE=\t5\n");
    }

    #[test]
    fn test_contents_survive_poisoned_lock() {
        let sink = Arc::new(MemoryLogSink::new());
        sink.append("U0VMRUNUIDE=\t5\n").unwrap();

        let poisoner = Arc::clone(&sink);
        let result = thread::spawn(move || {
            let _guard = poisoner.buffer.lock().unwrap();
            panic!("writer died holding the lock");
        })
        .join();
        assert!(result.is_err());

        assert_eq!(sink.contents(), "U0VMRUNUIDE=\t5\n");
        assert!(sink.append("U0VMRUNUIDE=\t6\n").is_err());
    }

    #[test]
    fn test_record_config_rejects_unknown_keys() {
        assert!(toml::from_str::<RecorderConfig>("log_pth = \"queries.log\"").is_err());
        let config: RecorderConfig = toml::from_str("log_path = \"queries.log\"").unwrap();
        assert_eq!(config.log_path, Some(PathBuf::from("queries.log")));
    }

    #[test]
    fn test_open_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = QueryRecorder::open(dir.path().join("missing/queries.log")).unwrap_err();
        assert!(matches!(err, QueryLogError::Io(_)));
    }

    #[test]
    fn test_concurrent_records_do_not_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("queries.log");
        let recorder = Arc::new(QueryRecorder::open(&path).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let recorder = Arc::clone(&recorder);
                thread::spawn(move || {
                    let sql = format!("SELECT * FROM table_{t} WHERE note = '{}'", "x".repeat(200));
                    for i in 0..50 {
                        recorder.record(&sql, i).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let report = decode(&std::fs::read_to_string(&path).unwrap());
        assert!(report.is_clean());
        assert_eq!(report.observations.len(), 400);
    }
}
