//! Error types for Bulkhead core.

use std::io;

use thiserror::Error;

/// Error type for the fallible collaborators around the analysis core.
///
/// The entropy, detection and classification primitives never fail; errors
/// only come from reading a snapshot or loading configuration.
#[derive(Debug, Error)]
pub enum BulkheadError {
    /// An underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// A git invocation failed.
    #[error("git {operation} failed: {message}")]
    Git {
        /// The git operation that was attempted (e.g. `ls-tree`).
        operation: String,
        /// Captured stderr or exit status.
        message: String,
    },
    /// A threshold ladder was rejected during validation.
    #[error("invalid thresholds: {0}")]
    InvalidThresholds(String),
    /// JSON (de)serialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// A catch-all error with a message.
    #[error("{0}")]
    Other(String),
}

impl BulkheadError {
    /// Build a [`BulkheadError::Git`] from an operation name and message.
    pub fn git(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Git {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// Convenience result type for Bulkhead core.
pub type Result<T> = std::result::Result<T, BulkheadError>;
