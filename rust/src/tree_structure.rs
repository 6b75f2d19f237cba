//! Tree structure management operations for BPlusTree.
//!
//! This module contains all tree-level operations that manage the overall structure,
//! including size queries, clearing, node counting, and tree statistics.

use crate::compact_arena::CompactArenaStats;
use crate::page;
use crate::types::{BPlusTree, NodeId, NodeRef, NULL_NODE};

// ============================================================================
// TREE STRUCTURE OPERATIONS
// ============================================================================

impl BPlusTree {
    /// Returns the number of elements in the tree.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns true if the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Key count at which nodes split.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Largest value `set` accepts at this order.
    pub fn max_value_len(&self) -> usize {
        page::max_value_len(self.order).unwrap_or(0)
    }

    /// Returns true if the root is a leaf node.
    pub fn is_leaf_root(&self) -> bool {
        matches!(self.root, Some(NodeRef::Leaf(_)))
    }

    /// Number of levels, 0 for an empty tree.
    pub fn height(&self) -> usize {
        let mut current = self.root;
        let mut height = 0;
        while let Some(node) = current {
            height += 1;
            current = match node {
                NodeRef::Leaf(_) => None,
                NodeRef::Internal(id) => self
                    .get_internal(id)
                    .and_then(|internal| internal.children.first().copied()),
            };
        }
        height
    }

    /// Returns the number of leaf nodes in the tree.
    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        let mut current = self.first_leaf_id();
        while let Some(id) = current {
            count += 1;
            current = self
                .get_leaf(id)
                .map(|leaf| leaf.next)
                .filter(|&next| next != NULL_NODE);
        }
        count
    }

    /// Clear all items from the tree.
    pub fn clear(&mut self) {
        self.leaf_arena.clear();
        self.internal_arena.clear();
        self.root = None;
        self.size = 0;
    }

    /// Count the number of leaf and internal nodes actually in the tree structure.
    pub fn count_nodes_in_tree(&self) -> (usize, usize) {
        match self.root {
            Some(root) => self.count_nodes_recursive(root),
            None => (0, 0),
        }
    }

    fn count_nodes_recursive(&self, node: NodeRef) -> (usize, usize) {
        match node {
            NodeRef::Leaf(_) => (1, 0),
            NodeRef::Internal(id) => {
                let Some(internal) = self.get_internal(id) else {
                    return (0, 0);
                };
                internal
                    .children
                    .iter()
                    .map(|&child| self.count_nodes_recursive(child))
                    .fold((0, 1), |(leaves, internals), (l, i)| (leaves + l, internals + i))
            }
        }
    }

    /// Slot usage of the leaf arena.
    pub fn leaf_arena_stats(&self) -> CompactArenaStats {
        self.leaf_arena.stats()
    }

    /// Slot usage of the internal node arena.
    pub fn internal_arena_stats(&self) -> CompactArenaStats {
        self.internal_arena.stats()
    }

    // ============================================================================
    // TREE NAVIGATION HELPERS
    // ============================================================================

    /// Get the ID of the first (leftmost) leaf in the tree
    pub fn first_leaf_id(&self) -> Option<NodeId> {
        self.edge_leaf_id(|children| children.first().copied())
    }

    /// Get the ID of the last (rightmost) leaf in the tree
    pub fn last_leaf_id(&self) -> Option<NodeId> {
        self.edge_leaf_id(|children| children.last().copied())
    }

    fn edge_leaf_id(&self, pick: impl Fn(&[NodeRef]) -> Option<NodeRef>) -> Option<NodeId> {
        let mut current = self.root?;
        loop {
            match current {
                NodeRef::Leaf(id) => return Some(id),
                NodeRef::Internal(id) => current = pick(self.get_internal(id)?.children.as_slice())?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::BPlusTree;

    #[test]
    fn test_structure_of_empty_tree() {
        let tree = BPlusTree::new(4).unwrap();
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.leaf_count(), 0);
        assert_eq!(tree.first_leaf_id(), None);
        assert!(!tree.is_leaf_root());
    }

    #[test]
    fn test_counts_agree_with_arenas() {
        let mut tree = BPlusTree::new(4).unwrap();
        for key in 0..100 {
            tree.set(key, vec![1]).unwrap();
        }
        let (leaves, internals) = tree.count_nodes_in_tree();
        assert_eq!(leaves, tree.leaf_count());
        assert_eq!(leaves, tree.leaf_arena_stats().allocated_count);
        assert_eq!(internals, tree.internal_arena_stats().allocated_count);
        assert!(tree.height() >= 3);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut tree = BPlusTree::new(3).unwrap();
        for key in 0..20 {
            tree.set(key, vec![0]).unwrap();
        }
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.count_nodes_in_tree(), (0, 0));
        assert_eq!(tree.get(5), None);

        tree.set(5, vec![5]).unwrap();
        assert_eq!(tree.get(5), Some(&[5u8][..]));
        assert!(tree.is_leaf_root());
    }

    #[test]
    fn test_max_value_len_tracks_order() {
        let tree = BPlusTree::new(4).unwrap();
        assert_eq!(tree.max_value_len(), 1014);
        assert!(BPlusTree::new(16).unwrap().max_value_len() < 1014);
    }
}
