//! Lock-scope policy for strata.
//!
//! Answers "which part of the element tree must an operation hold" before it
//! runs. A scope is a subtree, named by its top path; two operations may run
//! concurrently only if their scopes do not overlap.
//!
//! # Key Types
//!
//! - [`LockScope`] -- A subtree, identified by its top path
//! - [`RuleFactory`] -- Maps tree operations to the scope they need
//! - [`RuleConfig`] -- Which depth counts as a project boundary

pub mod config;
pub mod factory;
pub mod scope;

pub use config::RuleConfig;
pub use factory::{EditTarget, RuleFactory};
pub use scope::{combine, LockScope};
