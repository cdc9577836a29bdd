use std::fmt;

use serde::{Deserialize, Serialize};

use strata_types::PathKey;

/// A subtree of the element hierarchy that an operation holds exclusively.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LockScope {
    path: PathKey,
}

impl LockScope {
    /// The scope covering the whole tree.
    pub const ROOT: LockScope = LockScope {
        path: PathKey::ROOT,
    };

    /// The scope rooted at `path`.
    pub fn new(path: PathKey) -> Self {
        Self { path }
    }

    /// Top of the subtree.
    pub fn path(&self) -> &PathKey {
        &self.path
    }

    /// Returns `true` if `other` lies within this scope (or equals it).
    pub fn contains(&self, other: &LockScope) -> bool {
        self.path.is_prefix_of(&other.path)
    }

    /// Two scopes conflict when one contains the other.
    pub fn is_conflicting(&self, other: &LockScope) -> bool {
        self.contains(other) || other.contains(self)
    }
}

impl From<PathKey> for LockScope {
    fn from(path: PathKey) -> Self {
        Self::new(path)
    }
}

impl fmt::Display for LockScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

impl fmt::Debug for LockScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LockScope({})", self.path)
    }
}

/// The smallest scope containing every scope in `scopes`.
///
/// Returns `None` for an empty input. Scopes in unrelated subtrees combine to
/// [`LockScope::ROOT`].
pub fn combine<I>(scopes: I) -> Option<LockScope>
where
    I: IntoIterator<Item = LockScope>,
{
    scopes
        .into_iter()
        .map(|scope| scope.path)
        .reduce(|acc, path| acc.common_prefix(&path))
        .map(LockScope::new)
}
