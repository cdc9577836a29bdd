//! Error types for the tree crate.

use strata_types::{PathKey, TypeError};

/// Errors that can occur during tree operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// The operation targets a path that does not exist.
    #[error("element not found: {0}")]
    NotFound(PathKey),

    /// An element already exists at the path being created.
    #[error("element already exists: {0}")]
    AlreadyExists(PathKey),

    /// An ancestor of the path being created does not exist.
    #[error("cannot create {path}: ancestor {ancestor} does not exist")]
    MissingAncestor { path: PathKey, ancestor: PathKey },

    /// The request makes no structural sense (e.g. deleting the root).
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// A mutation was attempted on a frozen generation.
    #[error("generation is immutable")]
    Immutable,

    /// A delta was requested from a generation that is not frozen.
    #[error("generation is not immutable")]
    NotImmutable,
}

impl From<TypeError> for TreeError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidOperation(reason) => Self::InvalidOperation(reason),
            other => Self::InvalidOperation(other.to_string()),
        }
    }
}

/// Convenience alias for tree results.
pub type TreeResult<T> = Result<T, TreeError>;
