//! Host node tree abstraction.
//!
//! The engine never touches a real UI toolkit. Hosts expose their element
//! hierarchy through [`NodeTree`]: parent links for area resolution and
//! viewport rectangles for proximity measurement.

use kurbo::Rect;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identity of a host element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

/// Read-only view of the host's element tree.
pub trait NodeTree {
    /// Parent of `node`, or `None` at the root or when detached.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Bounding rectangle of `node` in viewport coordinates.
    /// `None` when the node is not mounted.
    fn rect(&self, node: NodeId) -> Option<Rect>;

    /// Rectangle of the scrolling root's viewport.
    /// `None` when the environment cannot observe the viewport.
    fn viewport(&self) -> Option<Rect>;
}

/// Iterate the ancestors of `node`, nearest first, excluding `node` itself.
pub fn ancestors<'a>(tree: &'a dyn NodeTree, node: NodeId) -> impl Iterator<Item = NodeId> + 'a {
    std::iter::successors(tree.parent(node), move |&n| tree.parent(n))
}

#[derive(Debug, Clone)]
struct MemoryNode {
    parent: Option<NodeId>,
    rect: Rect,
}

/// In-memory node tree for tests and immediate-mode hosts.
#[derive(Debug, Clone, Default)]
pub struct MemoryTree {
    nodes: HashMap<NodeId, MemoryNode>,
    viewport: Option<Rect>,
    next_id: u64,
}

impl MemoryTree {
    /// Create a tree with the given viewport.
    pub fn new(viewport: Rect) -> Self {
        Self {
            nodes: HashMap::new(),
            viewport: Some(viewport),
            next_id: 1,
        }
    }

    /// Create a tree without viewport observation.
    pub fn headless() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    /// Insert a new node and return its id.
    pub fn insert(&mut self, parent: Option<NodeId>, rect: Rect) -> NodeId {
        let mut id = NodeId(self.next_id.max(1));
        while self.nodes.contains_key(&id) {
            id = NodeId(id.0 + 1);
        }
        self.next_id = id.0 + 1;
        self.nodes.insert(id, MemoryNode { parent, rect });
        id
    }

    /// Insert or update a node with a caller-chosen id.
    pub fn upsert(&mut self, id: NodeId, parent: Option<NodeId>, rect: Rect) {
        self.nodes.insert(id, MemoryNode { parent, rect });
    }

    /// Remove a node and every node beneath it.
    pub fn remove(&mut self, node: NodeId) {
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            if self.nodes.remove(&n).is_some() {
                stack.extend(
                    self.nodes
                        .iter()
                        .filter(|(_, child)| child.parent == Some(n))
                        .map(|(&id, _)| id),
                );
            }
        }
    }

    /// Check whether a node is mounted.
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    /// Move a node under a new parent.
    pub fn set_parent(&mut self, node: NodeId, parent: Option<NodeId>) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.parent = parent;
        }
    }

    /// Update a node's rectangle.
    pub fn set_rect(&mut self, node: NodeId, rect: Rect) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.rect = rect;
        }
    }

    /// Replace the viewport rectangle.
    pub fn set_viewport(&mut self, viewport: Option<Rect>) {
        self.viewport = viewport;
    }

    /// All mounted node ids.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }
}

impl NodeTree for MemoryTree {
    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|n| n.parent)
    }

    fn rect(&self, node: NodeId) -> Option<Rect> {
        self.nodes.get(&node).map(|n| n.rect)
    }

    fn viewport(&self) -> Option<Rect> {
        self.viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ancestors_nearest_first() {
        let mut tree = MemoryTree::new(Rect::new(0.0, 0.0, 800.0, 600.0));
        let root = tree.insert(None, Rect::ZERO);
        let mid = tree.insert(Some(root), Rect::ZERO);
        let leaf = tree.insert(Some(mid), Rect::ZERO);

        let chain: Vec<_> = ancestors(&tree, leaf).collect();
        assert_eq!(chain, vec![mid, root]);
        assert_eq!(ancestors(&tree, root).count(), 0);
    }

    #[test]
    fn test_remove_subtree() {
        let mut tree = MemoryTree::headless();
        let root = tree.insert(None, Rect::ZERO);
        let child = tree.insert(Some(root), Rect::ZERO);
        let grandchild = tree.insert(Some(child), Rect::ZERO);
        let other = tree.insert(None, Rect::ZERO);

        tree.remove(child);
        assert!(tree.contains(root));
        assert!(!tree.contains(child));
        assert!(!tree.contains(grandchild));
        assert!(tree.contains(other));
        assert_eq!(tree.rect(grandchild), None);
    }

    #[test]
    fn test_insert_skips_upserted_ids() {
        let mut tree = MemoryTree::headless();
        tree.upsert(NodeId(1), None, Rect::ZERO);
        let fresh = tree.insert(None, Rect::ZERO);
        assert_ne!(fresh, NodeId(1));
    }

    #[test]
    fn test_headless_has_no_viewport() {
        assert!(MemoryTree::headless().viewport().is_none());
    }
}
