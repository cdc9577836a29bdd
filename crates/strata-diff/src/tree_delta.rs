//! Element-level diff: compare two generations and list the changed paths.
//!
//! Walks both trees in lockstep from a common start path. Subtrees that are
//! the same `Arc` in both generations are skipped without descending, so the
//! cost of comparing a delta against its parent is proportional to what the
//! delta rewrote, not to the size of the tree.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use strata_tree::{Generation, Node};
use strata_types::PathKey;

use crate::error::{DiffError, DiffResult};

/// The result of comparing two generations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TreeDelta {
    /// Changes sorted by path.
    pub changes: Vec<ElementChange>,
}

impl TreeDelta {
    /// Create an empty delta.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if there are no changes.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of changes.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Paths present only in the new generation.
    pub fn added(&self) -> Vec<&PathKey> {
        self.paths_where(|c| matches!(c, ElementChange::Added { .. }))
    }

    /// Paths present only in the old generation.
    pub fn removed(&self) -> Vec<&PathKey> {
        self.paths_where(|c| matches!(c, ElementChange::Removed { .. }))
    }

    /// Paths present in both generations with differing payloads.
    pub fn changed(&self) -> Vec<&PathKey> {
        self.paths_where(|c| matches!(c, ElementChange::Changed { .. }))
    }

    fn paths_where(&self, keep: impl Fn(&ElementChange) -> bool) -> Vec<&PathKey> {
        self.changes
            .iter()
            .filter(|c| keep(c))
            .map(ElementChange::path)
            .collect()
    }
}

/// A single difference between two generations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElementChange {
    /// The element exists only in the new generation.
    Added { path: PathKey },
    /// The element exists only in the old generation.
    Removed { path: PathKey },
    /// The element exists in both but its payload differs.
    Changed { path: PathKey },
}

impl ElementChange {
    /// The path this change refers to.
    pub fn path(&self) -> &PathKey {
        match self {
            Self::Added { path } | Self::Removed { path } | Self::Changed { path } => path,
        }
    }
}

/// Compare the subtrees under `start` in `old` and `new`.
///
/// `same` decides whether two payloads are equal. An element present on one
/// side only is reported together with its entire subtree. Fails with
/// [`DiffError::StartNotFound`] only if `start` exists in neither generation.
pub fn diff_generations<D, F>(
    old: &Generation<D>,
    new: &Generation<D>,
    start: &PathKey,
    mut same: F,
) -> DiffResult<TreeDelta>
where
    D: Clone,
    F: FnMut(&D, &D) -> bool,
{
    let old_start = old.node(start);
    let new_start = new.node(start);
    if old_start.is_none() && new_start.is_none() {
        return Err(DiffError::StartNotFound(start.clone()));
    }

    let mut changes = Vec::new();
    let mut skipped = 0usize;
    let mut pending = vec![(start.clone(), old_start, new_start)];

    while let Some((path, old_node, new_node)) = pending.pop() {
        match (old_node, new_node) {
            (Some(a), Some(b)) => {
                if Arc::ptr_eq(&a, &b) {
                    skipped += 1;
                    continue;
                }
                if !same(a.data(), b.data()) {
                    changes.push(ElementChange::Changed { path: path.clone() });
                }
                let names: BTreeSet<&str> = a
                    .children()
                    .map(|(name, _)| name)
                    .chain(b.children().map(|(name, _)| name))
                    .collect();
                for name in names {
                    pending.push((
                        path.append(name),
                        a.child(name).cloned(),
                        b.child(name).cloned(),
                    ));
                }
            }
            (Some(a), None) => {
                report_subtree(&path, &a, &mut changes, |path| ElementChange::Removed { path });
            }
            (None, Some(b)) => {
                report_subtree(&path, &b, &mut changes, |path| ElementChange::Added { path });
            }
            (None, None) => {}
        }
    }

    changes.sort_by(|x, y| x.path().cmp(y.path()));
    debug!(
        old = old.id(),
        new = new.id(),
        changes = changes.len(),
        shared_subtrees = skipped,
        "generations compared"
    );
    Ok(TreeDelta { changes })
}

/// [`diff_generations`] using the payload's own equality.
pub fn diff_generations_eq<D>(
    old: &Generation<D>,
    new: &Generation<D>,
    start: &PathKey,
) -> DiffResult<TreeDelta>
where
    D: Clone + PartialEq,
{
    diff_generations(old, new, start, |a, b| a == b)
}

fn report_subtree<D>(
    path: &PathKey,
    node: &Arc<Node<D>>,
    changes: &mut Vec<ElementChange>,
    make: impl Fn(PathKey) -> ElementChange,
) {
    let mut pending = vec![(path.clone(), Arc::clone(node))];
    while let Some((path, node)) = pending.pop() {
        for (name, child) in node.children() {
            pending.push((path.append(name), Arc::clone(child)));
        }
        changes.push(make(path));
    }
}
