//! Error types for the diff crate.

use strata_types::PathKey;

/// Errors that can occur during diff operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    /// The comparison root exists in neither generation.
    #[error("comparison root not found in either generation: {0}")]
    StartNotFound(PathKey),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
