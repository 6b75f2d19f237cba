//! INSERT operations for BPlusTree.
//!
//! Insertion goes straight to the target leaf. A leaf that reaches `order` keys
//! splits, the new separator goes into the parent, and the parent may split in
//! turn. A split at the root creates a new parent, which the facade adopts as
//! the new root once the call returns.

use tracing::{debug, trace};

use crate::error::{BPlusTreeError, ModifyResult, TreeResult};
use crate::page;
use crate::types::{BPlusTree, InternalNode, Key, LeafNode, NodeId, NodeRef, NULL_NODE};

impl BPlusTree {
    /// Insert or overwrite the value stored under `key`.
    ///
    /// Fails with [`BPlusTreeError::ValueTooLarge`] when `order` copies of the
    /// value could not share one leaf page. A rejected value leaves the tree
    /// untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplustree_index::{BPlusTree, BPlusTreeError};
    ///
    /// let mut tree = BPlusTree::new(4).unwrap();
    /// tree.set(7, b"seven".to_vec()).unwrap();
    /// tree.set(7, b"SEVEN".to_vec()).unwrap();
    /// assert_eq!(tree.len(), 1);
    ///
    /// let err = tree.set(8, vec![0; 2048]).unwrap_err();
    /// assert!(matches!(err, BPlusTreeError::ValueTooLarge { .. }));
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn set(&mut self, key: Key, value: Vec<u8>) -> ModifyResult<()> {
        if let Err(err) = page::check_value_fits(self.order, value.len()) {
            debug!(key, len = value.len(), order = self.order, "rejecting oversized value");
            return Err(err);
        }

        let root = match self.root {
            Some(root) => root,
            None => {
                let id = self.leaf_arena.allocate(LeafNode::new(self.order))?;
                let root = NodeRef::Leaf(id);
                self.root = Some(root);
                root
            }
        };

        let leaf_id = self.route_to_leaf(root, key)?;
        let inserted = self.leaf_set(leaf_id, key, value);
        self.adopt_new_root()?;
        if inserted? {
            self.size += 1;
        }
        Ok(())
    }

    /// Climb from the current root while it has gained a parent.
    fn adopt_new_root(&mut self) -> TreeResult<()> {
        let Some(mut root) = self.root else {
            return Ok(());
        };
        loop {
            let parent = self.parent_of(root)?;
            if parent == NULL_NODE {
                break;
            }
            root = NodeRef::Internal(parent);
            trace!(root = parent, "tree grew a level");
        }
        self.root = Some(root);
        Ok(())
    }

    // ============================================================================
    // LEAF INSERTION
    // ============================================================================

    /// Overwrite in place or insert and split. Returns whether `key` was new.
    fn leaf_set(&mut self, leaf_id: NodeId, key: Key, value: Vec<u8>) -> TreeResult<bool> {
        let leaf = self.leaf_mut(leaf_id)?;
        match leaf.find(key) {
            (index, true) => {
                leaf.values[index] = value;
                Ok(false)
            }
            (index, false) => {
                leaf.insert_at(index, key, value)?;
                self.split_leaf(leaf_id)?;
                Ok(true)
            }
        }
    }

    /// Split a full leaf. The right half, midpoint included, moves to a new
    /// sibling spliced into the chain right after `leaf_id`.
    pub(crate) fn split_leaf(&mut self, leaf_id: NodeId) -> TreeResult<()> {
        let leaf = self.leaf_mut(leaf_id)?;
        if !leaf.is_full() {
            return Ok(());
        }

        let order = leaf.order;
        let mid = leaf.len() / 2;
        let old_next = leaf.next;
        let (keys, values) = leaf.split_off(mid);
        let separator = keys.first().copied().ok_or_else(|| {
            BPlusTreeError::corrupted_tree("Leaf split", "right half is empty")
        })?;

        let parent_id = self.ensure_parent(NodeRef::Leaf(leaf_id))?;
        let sibling_id = self.leaf_arena.allocate(LeafNode {
            order,
            parent: parent_id,
            prev: leaf_id,
            next: old_next,
            keys,
            values,
        })?;

        self.leaf_mut(leaf_id)?.next = sibling_id;
        if old_next != NULL_NODE {
            self.leaf_mut(old_next)?.prev = sibling_id;
        }
        trace!(leaf = leaf_id, sibling = sibling_id, separator, "split leaf");

        self.insert_into_parent(
            parent_id,
            NodeRef::Leaf(leaf_id),
            separator,
            NodeRef::Leaf(sibling_id),
        )?;
        self.split_internal(parent_id)
    }

    // ============================================================================
    // INTERNAL SPLITS
    // ============================================================================

    /// Split a full internal node. The middle separator is promoted to the
    /// parent and kept in neither half.
    pub(crate) fn split_internal(&mut self, node_id: NodeId) -> TreeResult<()> {
        let node = self.internal_mut(node_id)?;
        if !node.is_full() {
            return Ok(());
        }

        let order = node.order;
        let mid = node.len() / 2;
        let (promoted, keys, children) = node.split_off(mid)?;

        let parent_id = self.ensure_parent(NodeRef::Internal(node_id))?;
        let moved = children.clone();
        let sibling_id = self.internal_arena.allocate(InternalNode {
            order,
            parent: parent_id,
            keys,
            children,
        })?;
        for child in moved {
            self.set_parent(child, sibling_id)?;
        }
        trace!(node = node_id, sibling = sibling_id, promoted, "split internal node");

        self.insert_into_parent(
            parent_id,
            NodeRef::Internal(node_id),
            promoted,
            NodeRef::Internal(sibling_id),
        )?;
        self.split_internal(parent_id)
    }

    /// Return the parent of `node`, creating one with `node` as its only child
    /// when `node` is the root.
    fn ensure_parent(&mut self, node: NodeRef) -> TreeResult<NodeId> {
        let parent = self.parent_of(node)?;
        if parent != NULL_NODE {
            return Ok(parent);
        }

        let mut new_parent = InternalNode::new(self.order);
        new_parent.children.push(node);
        let parent_id = self.internal_arena.allocate(new_parent)?;
        self.set_parent(node, parent_id)?;
        Ok(parent_id)
    }

    /// Insert `separator` and `right` into `parent_id` immediately after `left`.
    fn insert_into_parent(
        &mut self,
        parent_id: NodeId,
        left: NodeRef,
        separator: Key,
        right: NodeRef,
    ) -> TreeResult<()> {
        let parent = self.internal_mut(parent_id)?;
        let index = parent.child_index(left).ok_or_else(|| {
            BPlusTreeError::corrupted_tree("Split", "node missing from its parent's children")
        })?;
        parent.insert_child_after(index, separator, right)
    }
}
