//! GET operations for BPlusTree.
//!
//! Point lookups, root-to-leaf routing and the arena accessors every other
//! module goes through.

use crate::error::{BPlusTreeError, TreeResult};
use crate::types::{BPlusTree, InternalNode, Key, LeafNode, NodeId, NodeRef};

impl BPlusTree {
    // ============================================================================
    // PUBLIC GET OPERATIONS
    // ============================================================================

    /// Get the value associated with a key.
    ///
    /// Returns `None` when the tree is empty or the key is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplustree_index::BPlusTree;
    ///
    /// let mut tree = BPlusTree::new(4).unwrap();
    /// tree.set(1, b"one".to_vec()).unwrap();
    /// assert_eq!(tree.get(1), Some(&b"one"[..]));
    /// assert_eq!(tree.get(2), None);
    /// ```
    pub fn get(&self, key: Key) -> Option<&[u8]> {
        let leaf_id = self.find_leaf(key)?;
        self.get_leaf(leaf_id)?.get(key)
    }

    /// Check if key exists in the tree.
    pub fn contains_key(&self, key: Key) -> bool {
        self.get(key).is_some()
    }

    // ============================================================================
    // ROUTING
    // ============================================================================

    /// Walk from the root to the leaf whose key range covers `key`.
    pub(crate) fn find_leaf(&self, key: Key) -> Option<NodeId> {
        let mut current = self.root?;
        loop {
            match current {
                NodeRef::Leaf(id) => return Some(id),
                NodeRef::Internal(id) => current = self.get_internal(id)?.child_for(key)?,
            }
        }
    }

    /// Mutation-path variant of [`Self::find_leaf`] that reports dangling ids.
    pub(crate) fn route_to_leaf(&self, root: NodeRef, key: Key) -> TreeResult<NodeId> {
        let mut current = root;
        loop {
            match current {
                NodeRef::Leaf(id) => return Ok(id),
                NodeRef::Internal(id) => {
                    let node = self.internal(id)?;
                    current = node.child_for(key).ok_or_else(|| {
                        BPlusTreeError::corrupted_tree("Routing", "internal node has no children")
                    })?;
                }
            }
        }
    }

    // ============================================================================
    // ARENA ACCESS
    // ============================================================================

    /// Get a reference to a leaf node in the arena.
    pub fn get_leaf(&self, id: NodeId) -> Option<&LeafNode> {
        self.leaf_arena.get(id)
    }

    /// Get a reference to an internal node in the arena.
    pub fn get_internal(&self, id: NodeId) -> Option<&InternalNode> {
        self.internal_arena.get(id)
    }

    pub(crate) fn leaf(&self, id: NodeId) -> TreeResult<&LeafNode> {
        self.leaf_arena
            .get(id)
            .ok_or_else(|| BPlusTreeError::missing_leaf(id))
    }

    pub(crate) fn leaf_mut(&mut self, id: NodeId) -> TreeResult<&mut LeafNode> {
        self.leaf_arena
            .get_mut(id)
            .ok_or_else(|| BPlusTreeError::missing_leaf(id))
    }

    pub(crate) fn internal(&self, id: NodeId) -> TreeResult<&InternalNode> {
        self.internal_arena
            .get(id)
            .ok_or_else(|| BPlusTreeError::missing_internal(id))
    }

    pub(crate) fn internal_mut(&mut self, id: NodeId) -> TreeResult<&mut InternalNode> {
        self.internal_arena
            .get_mut(id)
            .ok_or_else(|| BPlusTreeError::missing_internal(id))
    }

    /// Parent id of any node, `NULL_NODE` for the root.
    pub(crate) fn parent_of(&self, node: NodeRef) -> TreeResult<NodeId> {
        match node {
            NodeRef::Leaf(id) => Ok(self.leaf(id)?.parent),
            NodeRef::Internal(id) => Ok(self.internal(id)?.parent),
        }
    }

    pub(crate) fn set_parent(&mut self, node: NodeRef, parent: NodeId) -> TreeResult<()> {
        match node {
            NodeRef::Leaf(id) => self.leaf_mut(id)?.parent = parent,
            NodeRef::Internal(id) => self.internal_mut(id)?.parent = parent,
        }
        Ok(())
    }
}
