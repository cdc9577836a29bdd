use serde::{Deserialize, Serialize};

use strata_types::PathKey;

/// Leading bytes of every snapshot file. The final byte is the format version.
pub const MAGIC: [u8; 8] = *b"STRATA\0\x01";

/// Record header size: 4 bytes length + 4 bytes CRC.
pub const HEADER_SIZE: usize = 8;

/// One element as stored in a snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record<D> {
    pub path: PathKey,
    pub data: D,
}

/// Borrowed form of [`Record`] with an identical encoding.
#[derive(Serialize)]
pub(crate) struct RecordRef<'a, D> {
    pub path: &'a PathKey,
    pub data: &'a D,
}
