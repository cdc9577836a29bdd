use serde::{Deserialize, Serialize};

/// Configuration for [`SnapshotReader`](crate::SnapshotReader).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Fail on the first corrupt record instead of skipping it.
    pub strict: bool,
    /// Largest accepted record payload in bytes (default: 16 MiB).
    pub max_record_len: u32,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            strict: false,
            max_record_len: 16 * 1024 * 1024, // 16 MiB
        }
    }
}

impl SnapshotConfig {
    /// A configuration that rejects any corruption.
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Default::default()
        }
    }
}
