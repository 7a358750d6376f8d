//! Installing the recorder on a SQLite connection's profiling callback
//!
//! SQLite exposes several statement callbacks, but only the profile callback
//! reports how long a statement ran. Driver kinds are checked for that
//! capability before anything is registered, so an unsupported driver fails
//! at setup instead of silently producing an empty log.

use crate::error::{QueryLogError, Result};
use crate::recorder::{LogSink, QueryRecorder};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Callback invoked once per completed statement with its SQL and run time
pub type ProfileCallback = Box<dyn Fn(&str, Duration) + Send + Sync>;

/// Host connection surface that can carry a profile callback
pub trait ProfileSource {
    /// Register `callback`, or clear the current one with `None`
    fn set_profile_callback(&mut self, callback: Option<ProfileCallback>);
}

/// Event surfaces a driver can offer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverCapabilities {
    /// Reports elapsed time for every completed statement
    pub per_query_timing: bool,
}

/// SQLite callback flavours a connection may be hooked through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverKind {
    /// `sqlite3_profile`: SQL text plus elapsed time
    #[default]
    Sqlite3Profile,
    /// `sqlite3_trace`: SQL text only
    Sqlite3Trace,
    /// `sqlite3_progress_handler`: periodic ticks, no statement data
    Sqlite3Progress,
}

impl DriverKind {
    pub const ALL: [DriverKind; 3] = [
        DriverKind::Sqlite3Profile,
        DriverKind::Sqlite3Trace,
        DriverKind::Sqlite3Progress,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DriverKind::Sqlite3Profile => "sqlite3-profile",
            DriverKind::Sqlite3Trace => "sqlite3-trace",
            DriverKind::Sqlite3Progress => "sqlite3-progress",
        }
    }

    pub fn capabilities(self) -> DriverCapabilities {
        DriverCapabilities {
            per_query_timing: matches!(self, DriverKind::Sqlite3Profile),
        }
    }

    /// Fail unless this driver can time individual queries
    pub fn require_timing(self) -> Result<()> {
        if self.capabilities().per_query_timing {
            Ok(())
        } else {
            Err(QueryLogError::UnsupportedDriver {
                driver: self.name(),
                missing: "per-query timing",
            })
        }
    }
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DriverKind {
    type Err = QueryLogError;

    fn from_str(s: &str) -> Result<Self> {
        DriverKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| QueryLogError::UnknownDriver(s.to_string()))
    }
}

#[derive(Debug, Default)]
struct HookCounters {
    recorded: AtomicU64,
    failed: AtomicU64,
}

/// A recorder registered on a connection's profile callback
///
/// Write failures inside the callback cannot reach the driver, so they are
/// logged and counted instead of propagated.
#[derive(Debug)]
pub struct ProfileHook {
    kind: DriverKind,
    counters: Arc<HookCounters>,
}

impl ProfileHook {
    /// Register `recorder` on `source` through the `kind` callback
    pub fn install<P, S>(
        source: &mut P,
        kind: DriverKind,
        recorder: Arc<QueryRecorder<S>>,
    ) -> Result<Self>
    where
        P: ProfileSource + ?Sized,
        S: LogSink + 'static,
    {
        kind.require_timing()?;

        let counters = Arc::new(HookCounters::default());
        let callback_counters = Arc::clone(&counters);
        let callback: ProfileCallback = Box::new(move |sql: &str, elapsed: Duration| {
            match recorder.record_duration(sql, elapsed) {
                Ok(()) => {
                    callback_counters.recorded.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    callback_counters.failed.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!("failed to record query timing: {}", e);
                }
            }
        });
        source.set_profile_callback(Some(callback));

        tracing::debug!("profile hook installed via {}", kind);
        Ok(Self { kind, counters })
    }

    /// Remove the callback from `source`
    pub fn uninstall<P: ProfileSource + ?Sized>(self, source: &mut P) {
        source.set_profile_callback(None);
        tracing::debug!(
            "profile hook removed after {} records ({} failed)",
            self.recorded(),
            self.failed_writes()
        );
    }

    pub fn kind(&self) -> DriverKind {
        self.kind
    }

    /// Records written since install
    pub fn recorded(&self) -> u64 {
        self.counters.recorded.load(Ordering::Relaxed)
    }

    /// Records lost to write failures since install
    pub fn failed_writes(&self) -> u64 {
        self.counters.failed.load(Ordering::Relaxed)
    }
}
