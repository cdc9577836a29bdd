//! Foundation types for strata.
//!
//! This crate provides the addressing type shared by every other strata
//! crate: the [`PathKey`], an ordered sequence of name segments identifying a
//! location in a versioned hierarchy.
//!
//! # Key Types
//!
//! - [`PathKey`] -- Immutable hierarchical address; the empty key is the root
//! - [`TypeError`] -- Failures from path parsing and path arithmetic

pub mod error;
pub mod path;

pub use error::TypeError;
pub use path::{validate_segment, PathKey, SEPARATOR};
