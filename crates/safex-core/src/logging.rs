//! Injected logging capability for the extraction engine.
//!
//! The engine never logs through global state. Every record goes through a
//! [`LogSink`] supplied by the caller: [`TracingSink`] forwards to `tracing`
//! for production use, [`MemorySink`] keeps records in memory for tests.

use std::fmt;
use std::sync::Mutex;

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Per-member detail.
    Debug,
    /// Run lifecycle events.
    Info,
    /// Recoverable problems, such as cleanup failures.
    Warn,
    /// The error that aborted a run.
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// One structured log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Severity.
    pub level: LogLevel,
    /// Stable event name, e.g. `extraction.start`.
    pub event: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Structured context as key/value pairs.
    pub fields: Vec<(&'static str, String)>,
}

impl LogRecord {
    /// Creates a record with no fields.
    pub fn new(level: LogLevel, event: &'static str, message: impl Into<String>) -> Self {
        Self {
            level,
            event,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Adds a key/value field.
    pub fn field(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        self.fields.push((key, value.to_string()));
        self
    }

    /// Looks up the value of a field by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Destination for engine log records.
///
/// Implementations must be cheap to call; the engine records synchronously
/// at the point of detection.
pub trait LogSink: Send + Sync {
    /// Accepts one record.
    fn record(&self, record: &LogRecord);
}

/// Forwards records to the `tracing` macros under the `safex` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn record(&self, record: &LogRecord) {
        let fields = FieldList(&record.fields);
        match record.level {
            LogLevel::Debug => {
                tracing::debug!(target: "safex", event = record.event, %fields, "{}", record.message);
            }
            LogLevel::Info => {
                tracing::info!(target: "safex", event = record.event, %fields, "{}", record.message);
            }
            LogLevel::Warn => {
                tracing::warn!(target: "safex", event = record.event, %fields, "{}", record.message);
            }
            LogLevel::Error => {
                tracing::error!(target: "safex", event = record.event, %fields, "{}", record.message);
            }
        }
    }
}

struct FieldList<'a>(&'a [(&'static str, String)]);

impl fmt::Display for FieldList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{key}={value:?}")?;
        }
        Ok(())
    }
}

/// Collects records in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<LogRecord>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all records received so far.
    #[must_use]
    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// Returns the event names received so far, in order.
    #[must_use]
    pub fn events(&self) -> Vec<&'static str> {
        self.records().iter().map(|r| r.event).collect()
    }
}

impl LogSink for MemorySink {
    fn record(&self, record: &LogRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record.clone());
        }
    }
}
