//! Generations: rooted, possibly frozen views of the element hierarchy.
//!
//! A [`Generation`] holds its root in an [`ArcSwap`]. Writers never touch a
//! published node: each mutation resolves the chain of nodes from the root to
//! the target, builds replacement copies bottom-up, and publishes the new root
//! with one atomic store. Everything off that chain stays shared with the
//! previous root, and therefore with the frozen parent generation.
//!
//! # Invariants
//!
//! - Nodes reachable from any published root are immutable.
//! - A mutation costs O(depth) node copies, independent of tree size.
//! - `frozen` only ever flips from `false` to `true`.
//!
//! A chain copied by an earlier write is not reused: once published, a reader
//! may hold any node on it, so each write copies the chain again from the
//! current root. Writes to the same path still cost O(depth) each.
//!
//! Dropping a generation releases its ancestry in a loop, and [`Node`] frees
//! its subtree the same way, so neither a long history nor a deep hierarchy
//! grows the stack on drop.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::{debug, trace};

use strata_types::PathKey;

use crate::error::{TreeError, TreeResult};
use crate::iterator::{TreeIterator, Visitor, Walk};
use crate::node::Node;

/// Process-unique identifier of a generation, used for logging and display.
pub type GenerationId = u64;

static NEXT_GENERATION_ID: AtomicU64 = AtomicU64::new(1);

struct Inner<D> {
    id: GenerationId,
    root: ArcSwap<Node<D>>,
    frozen: AtomicBool,
    parent: Option<Generation<D>>,
}

impl<D> Drop for Inner<D> {
    fn drop(&mut self) {
        // Unlink uniquely owned ancestors one at a time instead of letting
        // each `Inner` drop its parent recursively.
        let mut next = self.parent.take();
        while let Some(generation) = next {
            next = match Arc::into_inner(generation.inner) {
                Some(mut inner) => inner.parent.take(),
                None => None,
            };
        }
    }
}

/// One versioned state of the whole hierarchy.
///
/// `Generation` is a cheap handle: cloning it aliases the same generation
/// (see [`ptr_eq`](Generation::ptr_eq)). A mutable generation may be read by
/// any number of threads while a single writer mutates it; a frozen
/// generation never changes again.
pub struct Generation<D> {
    inner: Arc<Inner<D>>,
}

impl<D> Clone for Generation<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D> fmt::Debug for Generation<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generation")
            .field("id", &self.inner.id)
            .field("frozen", &self.is_immutable())
            .field("parent", &self.inner.parent.as_ref().map(Generation::id))
            .finish()
    }
}

impl<D> Generation<D> {
    /// Identifier of this generation.
    pub fn id(&self) -> GenerationId {
        self.inner.id
    }

    /// Returns `true` if both handles refer to the same generation.
    pub fn ptr_eq(&self, other: &Generation<D>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Returns `true` once [`immutable`](Self::immutable) has been called.
    pub fn is_immutable(&self) -> bool {
        self.inner.frozen.load(Ordering::Acquire)
    }

    /// The frozen generation this delta was derived from, if any.
    pub fn parent(&self) -> Option<&Generation<D>> {
        self.inner.parent.as_ref()
    }

    /// The currently published root node.
    pub fn root(&self) -> Arc<Node<D>> {
        self.inner.root.load_full()
    }
}

impl<D: Clone + Default> Generation<D> {
    /// Create a new mutable generation holding only a root with default data.
    pub fn create() -> Self {
        Self::with_root_data(D::default())
    }
}

impl<D: Clone + Default> Default for Generation<D> {
    fn default() -> Self {
        Self::create()
    }
}

impl<D: Clone> Generation<D> {
    /// Create a new mutable generation whose root carries `data`.
    pub fn with_root_data(data: D) -> Self {
        Self::from_parts(Arc::new(Node::new(data)), None)
    }

    fn from_parts(root: Arc<Node<D>>, parent: Option<Generation<D>>) -> Self {
        let id = NEXT_GENERATION_ID.fetch_add(1, Ordering::Relaxed);
        Self {
            inner: Arc::new(Inner {
                id,
                root: ArcSwap::new(root),
                frozen: AtomicBool::new(false),
                parent,
            }),
        }
    }

    /// Freeze this generation and return an alias to it.
    ///
    /// Idempotent. After this call every mutation fails with
    /// [`TreeError::Immutable`].
    pub fn immutable(&self) -> Generation<D> {
        if !self.inner.frozen.swap(true, Ordering::AcqRel) {
            debug!(generation = self.inner.id, "generation frozen");
        }
        self.clone()
    }

    /// Derive a new mutable generation from this frozen one.
    ///
    /// The delta starts out sharing the entire tree with `self`; nodes are
    /// copied lazily on the first write to each path.
    pub fn new_empty_delta(&self) -> TreeResult<Generation<D>> {
        if !self.is_immutable() {
            return Err(TreeError::NotImmutable);
        }
        let delta = Self::from_parts(self.root(), Some(self.clone()));
        debug!(
            generation = delta.inner.id,
            parent = self.inner.id,
            "delta created"
        );
        Ok(delta)
    }

    // ---------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------

    /// The published node at `path`, if present.
    pub fn node(&self, path: &PathKey) -> Option<Arc<Node<D>>> {
        let root = self.root();
        resolve(&root, path)
    }

    /// Returns `true` if an element exists at `path`.
    pub fn includes(&self, path: &PathKey) -> bool {
        self.node(path).is_some()
    }

    /// A copy of the payload at `path`.
    pub fn get_element_data(&self, path: &PathKey) -> TreeResult<D> {
        self.node(path)
            .map(|node| node.data().clone())
            .ok_or_else(|| TreeError::NotFound(path.clone()))
    }

    /// Full paths of the direct children of `path`, in ascending segment order.
    pub fn get_children(&self, path: &PathKey) -> TreeResult<Vec<PathKey>> {
        let node = self
            .node(path)
            .ok_or_else(|| TreeError::NotFound(path.clone()))?;
        Ok(node.children().map(|(name, _)| path.append(name)).collect())
    }

    /// Number of direct children of `path`.
    pub fn child_count(&self, path: &PathKey) -> TreeResult<usize> {
        self.node(path)
            .map(|node| node.child_count())
            .ok_or_else(|| TreeError::NotFound(path.clone()))
    }

    /// Total number of elements, including the root.
    pub fn element_count(&self) -> usize {
        self.root().subtree_size()
    }

    /// A lazy depth-first walk starting at `start`.
    ///
    /// The walk pins the root published at the moment of this call.
    pub fn walk(&self, start: &PathKey) -> Walk<D> {
        Walk::new(self.root(), start)
    }

    /// Visit every element under `start`; see [`TreeIterator::iterate`].
    pub fn iterate<V: Visitor<D>>(&self, start: &PathKey, visitor: V) -> usize {
        TreeIterator::new(self, start.clone()).iterate(visitor)
    }

    // ---------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------

    /// Create an element at `path` holding `data`.
    ///
    /// Every ancestor of `path` must already exist.
    pub fn create_element(&self, path: &PathKey, data: D) -> TreeResult<()> {
        self.check_mutable()?;
        let parent_path = path.parent()?;
        let name = leaf_name(path)?;

        self.rewrite(
            &parent_path,
            |depth| TreeError::MissingAncestor {
                path: path.clone(),
                ancestor: parent_path.up_to(depth + 1),
            },
            |parent| {
                if parent.child(name).is_some() {
                    return Err(TreeError::AlreadyExists(path.clone()));
                }
                Ok((parent.with_child(name, Arc::new(Node::new(data))), ()))
            },
        )?;

        debug!(generation = self.inner.id, path = %path, "element created");
        Ok(())
    }

    /// Delete the element at `path` together with its whole subtree.
    ///
    /// The subtree stays reachable from any frozen generation that holds it.
    pub fn delete_element(&self, path: &PathKey) -> TreeResult<()> {
        self.check_mutable()?;
        if path.is_root() {
            return Err(TreeError::InvalidOperation(
                "the root element cannot be deleted".into(),
            ));
        }
        let parent_path = path.parent()?;
        let name = leaf_name(path)?;

        self.rewrite(
            &parent_path,
            |_| TreeError::NotFound(path.clone()),
            |parent| {
                if parent.child(name).is_none() {
                    return Err(TreeError::NotFound(path.clone()));
                }
                Ok((parent.without_child(name), ()))
            },
        )?;

        debug!(generation = self.inner.id, path = %path, "element deleted");
        Ok(())
    }

    /// Mutate the payload at `path` through `edit`.
    ///
    /// `edit` works on a private copy that is published only after it returns,
    /// so neither the parent generation nor concurrent readers observe a
    /// half-edited payload. The closure's result is passed back.
    pub fn open_element_data<R>(
        &self,
        path: &PathKey,
        edit: impl FnOnce(&mut D) -> R,
    ) -> TreeResult<R> {
        self.check_mutable()?;
        self.rewrite(
            path,
            |_| TreeError::NotFound(path.clone()),
            |node| {
                let mut copy = node.clone();
                let result = edit(copy.data_mut());
                Ok((copy, result))
            },
        )
    }

    /// Replace the payload at `path`.
    pub fn set_element_data(&self, path: &PathKey, data: D) -> TreeResult<()> {
        self.open_element_data(path, |slot| *slot = data)
    }

    fn check_mutable(&self) -> TreeResult<()> {
        if self.is_immutable() {
            return Err(TreeError::Immutable);
        }
        Ok(())
    }

    /// Copy-on-write core shared by every mutation.
    ///
    /// Resolves the chain of nodes from the root to `target`, lets `edit`
    /// build a replacement for the last one, rebuilds each ancestor around
    /// its replaced child, and publishes the new root. `missing` maps the
    /// depth of the first unresolved segment to the caller's error.
    fn rewrite<R>(
        &self,
        target: &PathKey,
        missing: impl FnOnce(usize) -> TreeError,
        edit: impl FnOnce(&Node<D>) -> TreeResult<(Node<D>, R)>,
    ) -> TreeResult<R> {
        let root = self.root();
        let (ancestors, last) = resolve_chain(&root, target).map_err(missing)?;
        let (mut replacement, result) = edit(&last)?;

        for (node, name) in ancestors.iter().rev().zip(target.segments().iter().rev()) {
            replacement = node.with_child(name, Arc::new(replacement));
        }

        trace!(
            generation = self.inner.id,
            path = %target,
            copied = ancestors.len() + 1,
            "copy-on-write chain published"
        );
        self.inner.root.store(Arc::new(replacement));
        Ok(result)
    }
}

fn leaf_name(path: &PathKey) -> TreeResult<&str> {
    path.last_segment()
        .ok_or_else(|| TreeError::InvalidOperation("the root has no name".into()))
}

/// Follow `path` from `root`.
pub(crate) fn resolve<D>(root: &Arc<Node<D>>, path: &PathKey) -> Option<Arc<Node<D>>> {
    let mut current = root;
    for segment in path.segments() {
        current = current.child(segment)?;
    }
    Some(Arc::clone(current))
}

/// The ancestors of `path` (root first) and the node at `path` itself.
///
/// On failure returns the index of the first segment that did not resolve.
fn resolve_chain<D>(
    root: &Arc<Node<D>>,
    path: &PathKey,
) -> Result<(Vec<Arc<Node<D>>>, Arc<Node<D>>), usize> {
    let mut ancestors = Vec::with_capacity(path.segment_count());
    let mut current = Arc::clone(root);
    for (depth, segment) in path.segments().iter().enumerate() {
        let next = current.child(segment).cloned().ok_or(depth)?;
        ancestors.push(std::mem::replace(&mut current, next));
    }
    Ok((ancestors, current))
}
