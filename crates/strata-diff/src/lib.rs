//! Generation comparison for strata.
//!
//! Computes the set of elements that differ between two generations. Because
//! deltas share unchanged subtrees with their parent by reference, the
//! comparison skips any subtree whose node is identical in both generations
//! and only descends along the paths that were actually rewritten.
//!
//! # Key Types
//!
//! - [`TreeDelta`] / [`ElementChange`] -- Per-path differences between two generations

pub mod error;
pub mod tree_delta;

pub use error::{DiffError, DiffResult};
pub use tree_delta::{diff_generations, diff_generations_eq, ElementChange, TreeDelta};
