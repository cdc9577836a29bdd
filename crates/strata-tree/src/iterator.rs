//! Depth-first traversal over a generation.
//!
//! Traversal uses an explicit work-list rather than recursion, so deep
//! hierarchies cannot exhaust the call stack. Children are visited in
//! ascending segment order, each subtree completely before its next sibling.
//!
//! A walk pins the root that was published when it started. Running it
//! against a generation that a writer is changing concurrently is always
//! safe: it terminates, never fails, and sees one consistent version. Whether
//! elements created or deleted during the walk are included depends only on
//! which root was published first.

use std::sync::Arc;

use strata_types::PathKey;

use crate::generation::{resolve, Generation};
use crate::node::Node;

/// Callback invoked for each visited element.
///
/// Returning `false` prunes the element's subtree; its descendants are not
/// visited. Any `FnMut(&PathKey, &D) -> bool` closure is a visitor.
pub trait Visitor<D> {
    /// Visit one element. Return `true` to descend into its children.
    fn visit(&mut self, path: &PathKey, data: &D) -> bool;
}

impl<D, F> Visitor<D> for F
where
    F: FnMut(&PathKey, &D) -> bool,
{
    fn visit(&mut self, path: &PathKey, data: &D) -> bool {
        self(path, data)
    }
}

/// Restartable depth-first traversal of `tree` starting at `start`.
///
/// Each call to [`iterate`](TreeIterator::iterate) re-walks from scratch.
#[derive(Debug)]
pub struct TreeIterator<'a, D> {
    tree: &'a Generation<D>,
    start: PathKey,
}

impl<'a, D: Clone> TreeIterator<'a, D> {
    /// Prepare a traversal of `tree` rooted at `start`.
    pub fn new(tree: &'a Generation<D>, start: PathKey) -> Self {
        Self { tree, start }
    }

    /// Walk the tree, calling `visitor` on `start` and then on every
    /// descendant the visitor does not prune.
    ///
    /// If `start` does not exist, nothing is visited. Returns the number of
    /// visited elements.
    pub fn iterate<V: Visitor<D>>(&self, mut visitor: V) -> usize {
        let mut walk = self.tree.walk(&self.start);
        let mut visited = 0;
        while let Some((path, node)) = walk.next() {
            visited += 1;
            if !visitor.visit(&path, node.data()) {
                walk.skip_subtree();
            }
        }
        visited
    }
}

/// Lazy pre-order sequence of `(path, node)` pairs.
///
/// Children of an entry are expanded only when the next entry is requested,
/// which lets [`skip_subtree`](Walk::skip_subtree) prune them.
pub struct Walk<D> {
    pending: Vec<(PathKey, Arc<Node<D>>)>,
    last: Option<(PathKey, Arc<Node<D>>)>,
}

impl<D> Walk<D> {
    /// Start a walk at `start` within the tree rooted at `root`.
    pub(crate) fn new(root: Arc<Node<D>>, start: &PathKey) -> Self {
        let pending = resolve(&root, start)
            .map(|node| vec![(start.clone(), node)])
            .unwrap_or_default();
        Self {
            pending,
            last: None,
        }
    }

    /// Do not descend into the entry most recently returned by `next`.
    pub fn skip_subtree(&mut self) {
        self.last = None;
    }

    fn expand_last(&mut self) {
        if let Some((path, node)) = self.last.take() {
            // Reverse so the smallest segment is popped first.
            for (name, child) in node.children().rev() {
                self.pending.push((path.append(name), Arc::clone(child)));
            }
        }
    }
}

impl<D> Iterator for Walk<D> {
    type Item = (PathKey, Arc<Node<D>>);

    fn next(&mut self) -> Option<Self::Item> {
        self.expand_last();
        let (path, node) = self.pending.pop()?;
        self.last = Some((path.clone(), Arc::clone(&node)));
        Some((path, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn key(s: &str) -> PathKey {
        s.parse().unwrap()
    }

    /// Build `/sol/projP/folderK/fileC` with `n` entries per level.
    fn setup_element_tree(tree: &Generation<u32>, n: usize) {
        let sol = PathKey::ROOT.append("sol");
        tree.create_element(&sol, 0).unwrap();
        for p in 0..n {
            let proj = sol.append(format!("proj{p}"));
            tree.create_element(&proj, 1).unwrap();
            for k in 0..n {
                let folder = proj.append(format!("folder{k}"));
                tree.create_element(&folder, 2).unwrap();
                for c in 0..n {
                    tree.create_element(&folder.append(format!("file{c}")), 3)
                        .unwrap();
                }
            }
        }
    }

    /// Touch the payload of every element below the root.
    fn modify_tree(tree: &Generation<u32>) {
        let mut to_modify = tree.get_children(&PathKey::ROOT).unwrap();
        while let Some(path) = to_modify.pop() {
            tree.open_element_data(&path, |data| *data += 1).unwrap();
            to_modify.extend(tree.get_children(&path).unwrap());
        }
    }

    /// Delete every element below the root, deepest first.
    fn delete_children(tree: &Generation<u32>, path: &PathKey) {
        for child in tree.get_children(path).unwrap() {
            delete_children(tree, &child);
            tree.delete_element(&child).unwrap();
        }
    }

    fn expected_count(n: usize) -> usize {
        2 + n + n * n + n * n * n
    }

    // -----------------------------------------------------------------------
    // Counting and ordering
    // -----------------------------------------------------------------------

    #[test]
    fn content_iterator_counts() {
        let tree = Generation::with_root_data(0u32);
        let n = 3;
        setup_element_tree(&tree, n);

        let mut paths = Vec::new();
        let visited = TreeIterator::new(&tree, PathKey::ROOT).iterate(|path: &PathKey, _: &u32| {
            paths.push(path.clone());
            true
        });
        assert_eq!(visited, expected_count(n));
        assert_eq!(paths.len(), expected_count(n));

        paths.clear();
        let inner = PathKey::ROOT.append("sol").append("proj1");
        TreeIterator::new(&tree, inner).iterate(|path: &PathKey, _: &u32| {
            paths.push(path.clone());
            true
        });
        assert_eq!(paths.len(), 1 + n + n * n);
    }

    #[test]
    fn visits_start_first_then_children_in_order() {
        let tree = Generation::with_root_data(0u32);
        setup_element_tree(&tree, 2);

        let order: Vec<String> = tree
            .walk(&key("/sol/proj0"))
            .map(|(path, _)| path.to_string())
            .collect();
        assert_eq!(
            order,
            vec![
                "/sol/proj0",
                "/sol/proj0/folder0",
                "/sol/proj0/folder0/file0",
                "/sol/proj0/folder0/file1",
                "/sol/proj0/folder1",
                "/sol/proj0/folder1/file0",
                "/sol/proj0/folder1/file1",
            ]
        );
    }

    #[test]
    fn preorder_matches_sorted_order() {
        let tree = Generation::with_root_data(0u32);
        setup_element_tree(&tree, 3);
        let order: Vec<PathKey> = tree.walk(&PathKey::ROOT).map(|(path, _)| path).collect();
        let mut sorted = order.clone();
        sorted.sort();
        assert_eq!(order, sorted);
    }

    #[test]
    fn missing_start_visits_nothing() {
        let tree = Generation::with_root_data(0u32);
        setup_element_tree(&tree, 1);
        let visited = tree.iterate(&key("/sol/missing"), |_: &PathKey, _: &u32| true);
        assert_eq!(visited, 0);
        assert_eq!(tree.walk(&key("/nowhere/at/all")).count(), 0);
    }

    #[test]
    fn iterate_is_restartable() {
        let tree = Generation::with_root_data(0u32);
        setup_element_tree(&tree, 2);
        let iter = TreeIterator::new(&tree, PathKey::ROOT);
        let first = iter.iterate(|_: &PathKey, _: &u32| true);
        let second = iter.iterate(|_: &PathKey, _: &u32| true);
        assert_eq!(first, second);
        assert_eq!(first, expected_count(2));
    }

    // -----------------------------------------------------------------------
    // Pruning
    // -----------------------------------------------------------------------

    #[test]
    fn false_prunes_subtree() {
        let tree = Generation::with_root_data(0u32);
        let n = 3;
        setup_element_tree(&tree, n);

        // Stop at folders: root, sol, projects and folders are visited.
        let visited = tree.iterate(&PathKey::ROOT, |_: &PathKey, depth: &u32| *depth < 2);
        assert_eq!(visited, 2 + n + n * n);

        // Prune a single project.
        let skip = key("/sol/proj1");
        let visited = tree.iterate(&PathKey::ROOT, |path: &PathKey, _: &u32| *path != skip);
        assert_eq!(visited, expected_count(n) - n - n * n);
    }

    #[test]
    fn pruning_at_start_visits_only_start() {
        let tree = Generation::with_root_data(0u32);
        setup_element_tree(&tree, 2);
        let visited = tree.iterate(&PathKey::ROOT, |_: &PathKey, _: &u32| false);
        assert_eq!(visited, 1);
    }

    #[test]
    fn struct_visitor() {
        struct Collect<'a>(&'a mut Vec<u32>);
        impl Visitor<u32> for Collect<'_> {
            fn visit(&mut self, _path: &PathKey, data: &u32) -> bool {
                self.0.push(*data);
                true
            }
        }

        let tree = Generation::with_root_data(9u32);
        tree.create_element(&key("/a"), 1).unwrap();
        tree.create_element(&key("/b"), 2).unwrap();
        let mut seen = Vec::new();
        let visited = TreeIterator::new(&tree, PathKey::ROOT).iterate(Collect(&mut seen));
        assert_eq!(visited, 3);
        assert_eq!(seen, vec![9, 1, 2]);
    }

    // -----------------------------------------------------------------------
    // Concurrency
    // -----------------------------------------------------------------------

    #[test]
    fn walk_over_frozen_generation_from_many_threads() {
        let tree = Generation::with_root_data(0u32);
        setup_element_tree(&tree, 3);
        let frozen = tree.immutable();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tree = frozen.clone();
                thread::spawn(move || {
                    for _ in 0..200 {
                        assert_eq!(tree.walk(&PathKey::ROOT).count(), expected_count(3));
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().expect("reader should not panic");
        }
    }

    #[test]
    fn concurrent_modification_is_crash_free() {
        let n = 3;
        let base = Generation::with_root_data(0u32);
        setup_element_tree(&base, n);
        base.immutable();
        let tree = base.new_empty_delta().unwrap();
        modify_tree(&tree);

        let reader_tree = tree.clone();
        let reader = thread::spawn(move || {
            let mut total = 0usize;
            for _ in 0..20_000 {
                let mut seen: Vec<PathKey> = Vec::new();
                let visited = reader_tree.iterate(&PathKey::ROOT, |path: &PathKey, _: &u32| {
                    // Pre-order: every parent was visited before its child.
                    if let Ok(parent) = path.parent() {
                        assert!(seen.contains(&parent), "orphan {path}");
                    }
                    seen.push(path.clone());
                    true
                });
                assert!((1..=expected_count(n)).contains(&visited));
                total += visited;
            }
            total
        });

        let writer_tree = tree.clone();
        let writer = thread::spawn(move || {
            for _ in 0..20_000 {
                modify_tree(&writer_tree);
                delete_children(&writer_tree, &PathKey::ROOT);
                setup_element_tree(&writer_tree, n);
            }
        });

        let total = reader.join().expect("reader should not panic");
        writer.join().expect("writer should not panic");
        assert!(total >= 20_000);

        assert_eq!(tree.element_count(), expected_count(n));
        // The frozen base never observed any of it.
        assert_eq!(base.get_element_data(&key("/sol/proj0")).unwrap(), 1);
    }
}
