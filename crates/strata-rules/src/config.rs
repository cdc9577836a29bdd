use serde::{Deserialize, Serialize};

/// Configuration for [`RuleFactory`](crate::RuleFactory).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Paths with at most this many segments are their own lock scope.
    ///
    /// With the default of 1, the root and every top-level element (a
    /// project) never widen to their parent.
    pub project_depth: usize,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self { project_depth: 1 }
    }
}
