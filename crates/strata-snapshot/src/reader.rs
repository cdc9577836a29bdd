use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use strata_tree::{Generation, TreeError};
use strata_types::PathKey;

use crate::config::SnapshotConfig;
use crate::error::{SnapshotError, SnapshotResult};
use crate::record::{Record, HEADER_SIZE, MAGIC};

/// Reads snapshot records from any [`Read`] source.
///
/// Records are read front to back. Records that fail the CRC check or cannot
/// be decoded are logged and skipped, unless the reader is strict. A
/// truncated tail (a torn final write) ends the snapshot.
pub struct SnapshotReader<R: Read> {
    source: R,
    config: SnapshotConfig,
    offset: u64,
}

impl SnapshotReader<BufReader<File>> {
    /// Open the snapshot file at `path`.
    pub fn open(path: &Path, config: SnapshotConfig) -> SnapshotResult<Self> {
        Self::new(BufReader::new(File::open(path)?), config)
    }
}

impl<R: Read> SnapshotReader<R> {
    /// Check the magic at the start of `source`.
    pub fn new(mut source: R, config: SnapshotConfig) -> SnapshotResult<Self> {
        let mut magic = [0u8; MAGIC.len()];
        let read = read_full(&mut source, &mut magic)?;
        if read != magic.len() || magic != MAGIC {
            return Err(SnapshotError::BadMagic {
                found: magic[..read].to_vec(),
            });
        }
        Ok(Self {
            source,
            config,
            offset: MAGIC.len() as u64,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &SnapshotConfig {
        &self.config
    }

    /// Read every remaining record.
    pub fn read_records<D: DeserializeOwned>(&mut self) -> SnapshotResult<Vec<Record<D>>> {
        let mut records = Vec::new();
        let mut skipped = 0usize;

        loop {
            let offset = self.offset;
            let mut header = [0u8; HEADER_SIZE];
            match read_full(&mut self.source, &mut header)? {
                0 => break,
                n if n < HEADER_SIZE => {
                    warn!(offset, "truncated record header; stopping");
                    break;
                }
                _ => {}
            }

            let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
            let expected = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

            if length > self.config.max_record_len {
                if self.config.strict {
                    return Err(SnapshotError::RecordTooLarge {
                        offset,
                        length,
                        max: self.config.max_record_len,
                    });
                }
                warn!(
                    offset,
                    length,
                    max = self.config.max_record_len,
                    "record length over limit; stopping"
                );
                break;
            }

            let mut payload = vec![0u8; length as usize];
            if read_full(&mut self.source, &mut payload)? < payload.len() {
                warn!(offset, length, "truncated record; stopping");
                break;
            }
            self.offset += (HEADER_SIZE + payload.len()) as u64;

            let actual = crc32fast::hash(&payload);
            if actual != expected {
                if self.config.strict {
                    return Err(SnapshotError::CrcMismatch {
                        offset,
                        expected,
                        actual,
                    });
                }
                warn!(offset, expected, actual, "CRC mismatch; skipping record");
                skipped += 1;
                continue;
            }

            match bincode::deserialize::<Record<D>>(&payload) {
                Ok(record) => records.push(record),
                Err(e) if self.config.strict => {
                    return Err(SnapshotError::Serialization(e.to_string()));
                }
                Err(e) => {
                    warn!(offset, error = %e, "failed to decode record; skipping");
                    skipped += 1;
                }
            }
        }

        debug!(records = records.len(), skipped, "snapshot read");
        Ok(records)
    }
}

/// Rebuild a frozen generation from the records in `reader`.
///
/// Records whose parent is absent (because an ancestor record was skipped)
/// are dropped. If the root record itself is lost the root keeps
/// `D::default()`.
pub fn read_generation<R, D>(reader: &mut SnapshotReader<R>) -> SnapshotResult<Generation<D>>
where
    R: Read,
    D: Clone + Default + DeserializeOwned,
{
    let generation = Generation::create();
    let mut dropped = 0usize;

    for Record { path, data } in reader.read_records::<D>()? {
        if path.is_root() {
            generation.set_element_data(&PathKey::ROOT, data)?;
            continue;
        }
        match generation.create_element(&path, data) {
            Ok(()) => {}
            Err(TreeError::MissingAncestor { ancestor, .. }) => {
                warn!(path = %path, ancestor = %ancestor, "orphan record dropped");
                dropped += 1;
            }
            Err(TreeError::AlreadyExists(path)) => {
                warn!(path = %path, "duplicate record dropped");
                dropped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    debug!(
        generation = generation.id(),
        elements = generation.element_count(),
        dropped,
        "generation rebuilt"
    );
    Ok(generation.immutable())
}

/// Fill `buf` as far as the source allows; returns the bytes read.
fn read_full<R: Read>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
