//! Snapshot persistence for strata.
//!
//! A snapshot is a flat file of CRC-framed records, one per element, written
//! in traversal pre-order so that every parent precedes its children.
//! Reading a snapshot back rebuilds a frozen [`Generation`](strata_tree::Generation).
//!
//! # File Layout
//!
//! ```text
//! [8 bytes: magic "STRATA\0\x01"]
//! repeated:
//!   [4 bytes: payload length (little-endian u32)]
//!   [4 bytes: CRC32 of payload (little-endian u32)]
//!   [N bytes: payload (bincode-serialized Record)]
//! ```
//!
//! # Key Types
//!
//! - [`SnapshotWriter`] -- Writes records or a whole generation
//! - [`SnapshotReader`] -- Reads and validates records, rebuilds generations
//! - [`SnapshotConfig`] -- Strictness and record size limit

pub mod config;
pub mod dump;
pub mod error;
pub mod reader;
pub mod record;
pub mod writer;

pub use config::SnapshotConfig;
pub use dump::dump;
pub use error::{SnapshotError, SnapshotResult};
pub use reader::{read_generation, SnapshotReader};
pub use record::{Record, HEADER_SIZE, MAGIC};
pub use writer::SnapshotWriter;
