use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use strata_rules::RuleConfig;
use strata_snapshot::SnapshotConfig;

/// Top-level configuration read from `--config`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub snapshot: SnapshotConfig,
    pub rules: RuleConfig,
    pub stress: StressConfig,
}

/// Defaults for `build` and `stress`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StressConfig {
    /// Entries per level of the sample tree.
    pub fanout: usize,
    pub reader_iterations: usize,
    pub writer_iterations: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            fanout: 3,
            reader_iterations: 80_000,
            writer_iterations: 1_000,
        }
    }
}

impl CliConfig {
    /// Read `path`, or fall back to defaults when no file is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}
