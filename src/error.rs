//! Error types for the service orchestrator
//!
//! Provides structured error types for all orchestrator components including
//! driver identity, resource sets, action execution, and provisioning.

use thiserror::Error;

/// Unified error type for the orchestrator
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unknown driver group: {group}")]
    UnknownDriverGroup { group: String },

    #[error("Driver not found: {id}")]
    DriverNotFound { id: String },

    #[error("Invalid resource id: {rid}")]
    InvalidResourceId { rid: String },

    // =========================================================================
    // Resource Set Errors
    // =========================================================================
    #[error("Resource set section must start with 'subset#': {section}")]
    SectionFormat { section: String },

    #[error("Resource {rid} action failed: {source}")]
    ResourceAction {
        rid: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Resource set {section}: {} action(s) failed: [{}]", .failures.len(), .failures.join("; "))]
    ResourceSetFailed {
        section: String,
        failures: Vec<String>,
    },

    // =========================================================================
    // Driver Action Errors
    // =========================================================================
    #[error("Command failed: {command} (exit code {code:?})")]
    CommandFailed {
        command: String,
        code: Option<i32>,
    },

    // =========================================================================
    // Parse Errors
    // =========================================================================
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if this error is transient
    ///
    /// Transient errors are candidates for the caller's retry policy. The
    /// orchestrator itself never retries.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Io(_) | Error::CommandFailed { .. })
    }

    /// The resource id carried by this error, if any
    pub fn rid(&self) -> Option<&str> {
        match self {
            Error::ResourceAction { rid, .. } => Some(rid),
            _ => None,
        }
    }
}

/// Result type alias for the orchestrator
pub type Result<T> = std::result::Result<T, Error>;
