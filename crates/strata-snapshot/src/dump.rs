use std::fmt::Debug;
use std::io::{Read, Write};

use serde::de::DeserializeOwned;

use crate::error::SnapshotResult;
use crate::reader::SnapshotReader;

/// Write one `path<TAB>data` line per record in `reader` to `out`.
///
/// Returns the number of lines written.
pub fn dump<D, R, W>(reader: &mut SnapshotReader<R>, out: &mut W) -> SnapshotResult<usize>
where
    D: DeserializeOwned + Debug,
    R: Read,
    W: Write,
{
    let records = reader.read_records::<D>()?;
    for record in &records {
        writeln!(out, "{}\t{:?}", record.path, record.data)?;
    }
    out.flush()?;
    Ok(records.len())
}
