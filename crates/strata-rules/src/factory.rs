//! Mapping from tree operations to the lock scope each one needs.
//!
//! Structural operations (create, delete, copy, move, refresh) change the
//! child list of the parent, so they lock the parent's subtree. Payload edits
//! touch only the element itself. Top-level elements are locked as themselves
//! rather than widening to the whole tree.

use tracing::trace;

use strata_types::PathKey;

use crate::config::RuleConfig;
use crate::scope::{combine, LockScope};

/// An element that is about to be edited, as seen by
/// [`RuleFactory::validate_edit_rule`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditTarget {
    pub path: PathKey,
    pub read_only: bool,
}

impl EditTarget {
    pub fn new(path: PathKey, read_only: bool) -> Self {
        Self { path, read_only }
    }
}

/// Produces the [`LockScope`] each tree operation must hold.
#[derive(Clone, Debug, Default)]
pub struct RuleFactory {
    config: RuleConfig,
}

impl RuleFactory {
    /// Create a factory with the given configuration.
    pub fn new(config: RuleConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    /// A full build locks the whole tree.
    pub fn build_rule(&self) -> LockScope {
        LockScope::ROOT
    }

    /// Creating `path` adds a child to its parent.
    pub fn create_rule(&self, path: &PathKey) -> LockScope {
        self.parent_scope(path)
    }

    /// Deleting `path` removes a child from its parent.
    pub fn delete_rule(&self, path: &PathKey) -> LockScope {
        self.parent_scope(path)
    }

    /// Refreshing `path` may add or remove siblings.
    pub fn refresh_rule(&self, path: &PathKey) -> LockScope {
        self.parent_scope(path)
    }

    /// Copying only writes at the destination.
    pub fn copy_rule(&self, _source: &PathKey, destination: &PathKey) -> LockScope {
        self.parent_scope(destination)
    }

    /// Editing a payload touches only the element itself.
    pub fn modify_rule(&self, path: &PathKey) -> LockScope {
        LockScope::new(path.clone())
    }

    /// Moving writes at both ends.
    pub fn move_rule(&self, source: &PathKey, destination: &PathKey) -> LockScope {
        let scope = combine([self.parent_scope(source), self.parent_scope(destination)])
            .unwrap_or(LockScope::ROOT);
        trace!(source = %source, destination = %destination, scope = %scope, "move rule");
        scope
    }

    /// Marker updates need no lock.
    pub fn marker_rule(&self, _path: &PathKey) -> Option<LockScope> {
        None
    }

    /// Scope needed before making `targets` writable.
    ///
    /// `None` if none of them is read-only. Otherwise the combination of the
    /// parent scopes of every read-only target.
    pub fn validate_edit_rule(&self, targets: &[EditTarget]) -> Option<LockScope> {
        let scope = combine(
            targets
                .iter()
                .filter(|target| target.read_only)
                .map(|target| self.parent_scope(&target.path)),
        );
        if let Some(scope) = &scope {
            trace!(targets = targets.len(), scope = %scope, "validate-edit rule");
        }
        scope
    }

    /// The scope that guards the child list containing `path`.
    ///
    /// The root and every path at or above the project depth are their own
    /// scope.
    pub fn parent_scope(&self, path: &PathKey) -> LockScope {
        if path.segment_count() <= self.config.project_depth {
            return LockScope::new(path.clone());
        }
        LockScope::new(path.up_to(path.segment_count() - 1))
    }
}
