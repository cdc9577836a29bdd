use std::io;

use strata_tree::TreeError;

/// Errors produced while writing or reading snapshots.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// I/O error on the underlying file or stream.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The stream does not start with the snapshot magic.
    #[error("not a snapshot: bad magic {found:02x?}")]
    BadMagic { found: Vec<u8> },

    /// CRC integrity check failed for a record.
    #[error("CRC integrity check failed at offset {offset}: expected {expected:#010x}, got {actual:#010x}")]
    CrcMismatch {
        offset: u64,
        expected: u32,
        actual: u32,
    },

    /// A record header announces more bytes than the configured limit.
    #[error("record at offset {offset} is {length} bytes, limit is {max}")]
    RecordTooLarge { offset: u64, length: u32, max: u32 },

    /// Rebuilding the generation failed.
    #[error("tree error: {0}")]
    Tree(#[from] TreeError),
}

/// Convenience alias used throughout the snapshot crate.
pub type SnapshotResult<T> = std::result::Result<T, SnapshotError>;
