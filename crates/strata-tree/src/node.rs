//! The immutable node type shared between generations.

use std::collections::BTreeMap;
use std::sync::Arc;

/// One element of the hierarchy: a payload plus named children.
///
/// Nodes are immutable once published. Changing a node means building a new
/// one with [`with_child`](Node::with_child), [`without_child`](Node::without_child)
/// or a cloned payload; the untouched children are shared by reference.
///
/// Children are kept in a `BTreeMap`, so every traversal sees them in
/// ascending segment order.
#[derive(Clone, Debug)]
pub struct Node<D> {
    data: D,
    children: BTreeMap<String, Arc<Node<D>>>,
}

impl<D> Node<D> {
    /// Create a leaf node holding `data`.
    pub fn new(data: D) -> Self {
        Self {
            data,
            children: BTreeMap::new(),
        }
    }

    /// The payload of this node.
    pub fn data(&self) -> &D {
        &self.data
    }

    /// Look up a direct child by segment name.
    pub fn child(&self, name: &str) -> Option<&Arc<Node<D>>> {
        self.children.get(name)
    }

    /// Direct children in ascending segment order.
    pub fn children(&self) -> impl DoubleEndedIterator<Item = (&str, &Arc<Node<D>>)> + '_ {
        self.children.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// Number of direct children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Returns `true` if this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes in the subtree rooted here, including this node.
    pub fn subtree_size(&self) -> usize {
        let mut count = 0;
        let mut pending: Vec<&Node<D>> = vec![self];
        while let Some(node) = pending.pop() {
            count += 1;
            pending.extend(node.children.values().map(Arc::as_ref));
        }
        count
    }

    /// Mutable access to the payload of a node that is not yet published.
    pub(crate) fn data_mut(&mut self) -> &mut D {
        &mut self.data
    }
}

impl<D> Drop for Node<D> {
    fn drop(&mut self) {
        // Move uniquely owned descendants onto a work-list so that freeing a
        // deep subtree does not recurse once per level.
        let mut pending: Vec<Arc<Node<D>>> = std::mem::take(&mut self.children)
            .into_values()
            .collect();
        while let Some(child) = pending.pop() {
            if let Some(mut node) = Arc::into_inner(child) {
                pending.extend(std::mem::take(&mut node.children).into_values());
            }
        }
    }
}

impl<D: Clone> Node<D> {
    /// A copy of this node with `name` bound to `child`.
    ///
    /// Only the child map is copied; sibling subtrees stay shared.
    pub(crate) fn with_child(&self, name: &str, child: Arc<Node<D>>) -> Self {
        let mut copy = self.clone();
        copy.children.insert(name.to_string(), child);
        copy
    }

    /// A copy of this node without the child `name`.
    pub(crate) fn without_child(&self, name: &str) -> Self {
        let mut copy = self.clone();
        copy.children.remove(name);
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node<u32> {
        let leaf_a = Arc::new(Node::new(1));
        let leaf_b = Arc::new(Node::new(2));
        Node::new(0)
            .with_child("b", leaf_b)
            .with_child("a", leaf_a)
    }

    #[test]
    fn new_node_is_leaf() {
        let node = Node::new("payload");
        assert!(node.is_leaf());
        assert_eq!(node.child_count(), 0);
        assert_eq!(*node.data(), "payload");
    }

    #[test]
    fn children_are_sorted() {
        let node = sample();
        let names: Vec<&str> = node.children().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["a", "b"]);
        let reversed: Vec<&str> = node.children().rev().map(|(name, _)| name).collect();
        assert_eq!(reversed, vec!["b", "a"]);
    }

    #[test]
    fn with_child_shares_siblings() {
        let original = sample();
        let updated = original.with_child("c", Arc::new(Node::new(3)));
        assert_eq!(original.child_count(), 2);
        assert_eq!(updated.child_count(), 3);
        assert!(Arc::ptr_eq(
            original.child("a").unwrap(),
            updated.child("a").unwrap()
        ));
    }

    #[test]
    fn without_child_leaves_original_intact() {
        let original = sample();
        let updated = original.without_child("a");
        assert!(original.child("a").is_some());
        assert!(updated.child("a").is_none());
        assert_eq!(updated.child_count(), 1);
    }

    #[test]
    fn dropping_deep_chain_does_not_overflow() {
        let mut node = Node::new(0u32);
        for depth in 1..=200_000u32 {
            node = Node::new(depth).with_child("c", Arc::new(node));
        }
        assert_eq!(node.subtree_size(), 200_001);
        drop(node);
    }

    #[test]
    fn drop_keeps_shared_children_alive() {
        let shared = Arc::new(Node::new(1u32).with_child("x", Arc::new(Node::new(2))));
        let parent = Node::new(0).with_child("s", Arc::clone(&shared));
        drop(parent);
        assert_eq!(Arc::strong_count(&shared), 1);
        assert_eq!(*shared.child("x").unwrap().data(), 2);
    }

    #[test]
    fn subtree_size_counts_all_descendants() {
        let inner = Node::new(5).with_child("x", Arc::new(Node::new(6)));
        let root = sample().with_child("c", Arc::new(inner));
        assert_eq!(root.subtree_size(), 5);
    }
}
