//! Resource Status Log
//!
//! Append-only leveled log attached to each resource instance. Entries are
//! surfaced in the instance status alongside the resource state.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Severity of a status log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// One status log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Append-only status log with interior mutability
///
/// Actions run through `&dyn Resource`, so the log must accept entries
/// through a shared reference.
#[derive(Debug, Default)]
pub struct StatusLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl StatusLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, level: LogLevel, message: impl Into<String>) {
        self.entries.lock().push(LogEntry {
            level,
            message: message.into(),
            at: Utc::now(),
        });
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(LogLevel::Info, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.push(LogLevel::Warn, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(LogLevel::Error, message);
    }

    /// Snapshot of all entries, oldest first
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
