//! Structured logger capability shared between lifecycle hooks.
//!
//! The logging module installs a [`Logger`] into the
//! [`SharedContext`](crate::context::SharedContext); every hook that runs
//! afterwards emits its records through it. Records are leveled and carry
//! key/value fields.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Severity of a log record, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Very fine-grained diagnostics.
    Trace,
    /// Debugging detail.
    Debug,
    /// Normal operation.
    Info,
    /// Something unexpected that was handled.
    Warn,
    /// An operation failed.
    Error,
}

impl Level {
    /// Returns the lowercase name of this level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a level name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown log level '{0}'")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

/// A single structured log record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Severity.
    pub level: Level,
    /// Human-readable message.
    pub message: String,
    /// Key/value fields attached to the record.
    pub fields: serde_json::Map<String, serde_json::Value>,
    /// Time the record was created.
    pub timestamp: DateTime<Utc>,
}

impl LogRecord {
    /// Creates a record with no fields.
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            fields: serde_json::Map::new(),
            timestamp: Utc::now(),
        }
    }

    /// Attaches a field.
    pub fn with_field(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }
}

/// Leveled, structured logging sink.
pub trait Logger: Send + Sync + fmt::Debug {
    /// Returns whether records at `level` would be written.
    fn enabled(&self, level: Level) -> bool;

    /// Writes a record. Records below the sink's level are dropped.
    fn log(&self, record: &LogRecord);
}

impl dyn Logger {
    /// Logs `message` at `level` with the given fields.
    pub fn emit(&self, level: Level, message: &str, fields: &[(&str, serde_json::Value)]) {
        if !self.enabled(level) {
            return;
        }
        let record = fields
            .iter()
            .fold(LogRecord::new(level, message), |record, (key, value)| {
                record.with_field(key, value.clone())
            });
        self.log(&record);
    }

    /// Logs at [`Level::Debug`].
    pub fn debug(&self, message: &str, fields: &[(&str, serde_json::Value)]) {
        self.emit(Level::Debug, message, fields);
    }

    /// Logs at [`Level::Info`].
    pub fn info(&self, message: &str, fields: &[(&str, serde_json::Value)]) {
        self.emit(Level::Info, message, fields);
    }

    /// Logs at [`Level::Warn`].
    pub fn warn(&self, message: &str, fields: &[(&str, serde_json::Value)]) {
        self.emit(Level::Warn, message, fields);
    }

    /// Logs at [`Level::Error`].
    pub fn error(&self, message: &str, fields: &[(&str, serde_json::Value)]) {
        self.emit(Level::Error, message, fields);
    }
}

/// Emits `record` as a `tracing` event.
///
/// Used when no logger capability has been installed yet.
pub fn forward_to_tracing(record: &LogRecord) {
    let fields = serde_json::Value::Object(record.fields.clone());
    match record.level {
        Level::Trace => tracing::trace!(fields = %fields, "{}", record.message),
        Level::Debug => tracing::debug!(fields = %fields, "{}", record.message),
        Level::Info => tracing::info!(fields = %fields, "{}", record.message),
        Level::Warn => tracing::warn!(fields = %fields, "{}", record.message),
        Level::Error => tracing::error!(fields = %fields, "{}", record.message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug)]
    struct Capture {
        min: Level,
        records: Mutex<Vec<LogRecord>>,
    }

    impl Logger for Capture {
        fn enabled(&self, level: Level) -> bool {
            level >= self.min
        }

        fn log(&self, record: &LogRecord) {
            self.records.lock().expect("lock").push(record.clone());
        }
    }

    #[test]
    fn test_level_ordering() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Warn < Level::Error);
    }

    #[test]
    fn test_level_parse() {
        assert_eq!("INFO".parse::<Level>(), Ok(Level::Info));
        assert_eq!("warning".parse::<Level>(), Ok(Level::Warn));
        assert!("loud".parse::<Level>().is_err());
    }

    #[test]
    fn test_emit_respects_level_and_fields() {
        let capture = Arc::new(Capture {
            min: Level::Info,
            records: Mutex::new(Vec::new()),
        });
        let logger: Arc<dyn Logger> = capture.clone();

        logger.debug("dropped", &[]);
        logger.info("kept", &[("module", serde_json::json!("sys.db"))]);

        let records = capture.records.lock().expect("lock");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "kept");
        assert_eq!(records[0].fields["module"], "sys.db");
    }
}
