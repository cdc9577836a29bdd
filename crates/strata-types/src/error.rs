use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("invalid segment {segment:?}: {reason}")]
    InvalidSegment { segment: String, reason: String },

    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}
