//! Versioned, hierarchical, copy-on-write element tree.
//!
//! A [`Generation`] is one state of a hierarchy of named elements, each
//! carrying an opaque payload. Generations are either mutable (owned by a
//! single writer) or frozen (read-only forever). A frozen generation is the
//! parent of cheap deltas created with [`Generation::new_empty_delta`]: the
//! delta shares every node with its parent and copies only the chain from the
//! root down to each element it changes.
//!
//! # Key Types
//!
//! - [`Generation`] -- A rooted view of the hierarchy at one point in time
//! - [`Node`] -- Immutable unit of structural sharing (payload + children)
//! - [`TreeIterator`] / [`Walk`] -- Depth-first traversal with pruning
//! - [`Visitor`] -- Per-element callback deciding whether to descend
//!
//! # Design Rules
//!
//! 1. A node reachable from a published root is never mutated.
//! 2. Every mutation builds its replacement chain off to the side and
//!    publishes it with a single atomic root swap.
//! 3. Readers pin the root they start from, so a traversal racing a writer
//!    never observes a partially built node.
//! 4. Freezing is one-way; deltas may only be derived from frozen generations.
//! 5. At most one writer per mutable generation. Concurrent writers on the
//!    same generation may lose updates; they never corrupt memory.

pub mod error;
pub mod generation;
pub mod iterator;
pub mod node;

pub use error::{TreeError, TreeResult};
pub use generation::{Generation, GenerationId};
pub use iterator::{TreeIterator, Visitor, Walk};
pub use node::Node;
pub use strata_types::PathKey;
