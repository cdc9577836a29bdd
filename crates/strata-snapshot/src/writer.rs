use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use strata_tree::Generation;
use strata_types::PathKey;

use crate::error::{SnapshotError, SnapshotResult};
use crate::record::{RecordRef, HEADER_SIZE, MAGIC};

/// Writes snapshot records to any [`Write`] sink.
///
/// The magic is written on construction; call [`finish`](Self::finish) to
/// flush and recover the sink.
pub struct SnapshotWriter<W: Write> {
    sink: W,
    records: usize,
    bytes: u64,
}

impl SnapshotWriter<BufWriter<File>> {
    /// Create (or truncate) a snapshot file at `path`.
    pub fn create(path: &Path) -> SnapshotResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Self::new(BufWriter::new(File::create(path)?))
    }
}

impl<W: Write> SnapshotWriter<W> {
    /// Start a snapshot on `sink`.
    pub fn new(mut sink: W) -> SnapshotResult<Self> {
        sink.write_all(&MAGIC)?;
        Ok(Self {
            sink,
            records: 0,
            bytes: MAGIC.len() as u64,
        })
    }

    /// Append a single record.
    pub fn write_record<D: Serialize>(&mut self, path: &PathKey, data: &D) -> SnapshotResult<()> {
        let payload = bincode::serialize(&RecordRef { path, data })
            .map_err(|e| SnapshotError::Serialization(e.to_string()))?;
        let length = u32::try_from(payload.len()).map_err(|_| {
            SnapshotError::Serialization(format!(
                "record for {path} is {} bytes, exceeds u32",
                payload.len()
            ))
        })?;
        let crc = crc32fast::hash(&payload);

        self.sink.write_all(&length.to_le_bytes())?;
        self.sink.write_all(&crc.to_le_bytes())?;
        self.sink.write_all(&payload)?;

        self.records += 1;
        self.bytes += (HEADER_SIZE + payload.len()) as u64;
        Ok(())
    }

    /// Write every element of `generation`, parents before children.
    ///
    /// Returns the number of records written.
    pub fn write_generation<D>(&mut self, generation: &Generation<D>) -> SnapshotResult<usize>
    where
        D: Clone + Serialize,
    {
        let before = self.records;
        for (path, node) in generation.walk(&PathKey::ROOT) {
            self.write_record(&path, node.data())?;
        }
        let written = self.records - before;
        debug!(
            generation = generation.id(),
            records = written,
            bytes = self.bytes,
            "generation written"
        );
        Ok(written)
    }

    /// Records written so far.
    pub fn record_count(&self) -> usize {
        self.records
    }

    /// Flush and return the underlying sink.
    pub fn finish(mut self) -> SnapshotResult<W> {
        self.sink.flush()?;
        Ok(self.sink)
    }
}
