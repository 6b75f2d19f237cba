//! DELETE operations for BPlusTree.
//!
//! Removal happens in a leaf. An underfull leaf first tries to borrow from a
//! sibling under the same parent and otherwise merges with one; a merge costs
//! the parent a child, so the parent is rebalanced next, up to the root. The
//! facade then lets the root shrink: an internal root with no separators hands
//! over to its only child, and an empty root leaf leaves the tree empty.

use tracing::trace;

use crate::error::{BPlusTreeError, ModifyResult, TreeResult};
use crate::types::{BPlusTree, Key, NodeId, NodeRef, NULL_NODE};

impl BPlusTree {
    /// Remove `key` from the tree. Removing an absent key is a no-op.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplustree_index::BPlusTree;
    ///
    /// let mut tree = BPlusTree::new(4).unwrap();
    /// tree.set(1, b"one".to_vec()).unwrap();
    /// tree.delete(1).unwrap();
    /// tree.delete(1).unwrap();
    /// assert!(tree.is_empty());
    /// ```
    pub fn delete(&mut self, key: Key) -> ModifyResult<()> {
        let Some(root) = self.root else {
            return Ok(());
        };

        let leaf_id = self.route_to_leaf(root, key)?;
        let deleted = self.leaf_delete(leaf_id, key)?;
        if deleted {
            self.size -= 1;
        }

        self.root = self.new_root(root)?;
        if let Some(new_root) = self.root {
            self.set_parent(new_root, NULL_NODE)?;
        }
        Ok(())
    }

    /// Replacement for the root after a deletion.
    fn new_root(&mut self, root: NodeRef) -> TreeResult<Option<NodeRef>> {
        match root {
            NodeRef::Leaf(id) => {
                if !self.leaf(id)?.is_empty() {
                    return Ok(Some(root));
                }
                self.leaf_arena.deallocate(id);
                trace!(leaf = id, "tree is empty");
                Ok(None)
            }
            NodeRef::Internal(id) => {
                let node = self.internal(id)?;
                if !node.is_empty() {
                    return Ok(Some(root));
                }
                let child = node.children.first().copied().ok_or_else(|| {
                    BPlusTreeError::corrupted_tree("Root collapse", "root has no children")
                })?;
                self.internal_arena.deallocate(id);
                trace!(old_root = id, new_root = child.id(), "tree lost a level");
                Ok(Some(child))
            }
        }
    }

    // ============================================================================
    // LEAF DELETION
    // ============================================================================

    /// Remove `key` from a leaf and rebalance. Returns whether it was present.
    fn leaf_delete(&mut self, leaf_id: NodeId, key: Key) -> TreeResult<bool> {
        let leaf = self.leaf_mut(leaf_id)?;
        let (index, found) = leaf.find(key);
        if !found {
            return Ok(false);
        }
        let old_first = leaf.first_key();
        leaf.remove_at(index)?;

        // Separators are fixed after rebalancing so that a leaf emptied here
        // is re-keyed once a steal or merge has refilled it.
        let survived = self.merge_leaf(leaf_id)?;
        if !survived {
            return Ok(true);
        }
        let leaf = self.leaf(leaf_id)?;
        if let (Some(old), Some(new)) = (old_first, leaf.first_key()) {
            let parent = leaf.parent;
            self.replace_key(parent, old, new)?;
        }
        Ok(true)
    }

    /// Rebalance an underfull leaf. Returns `false` when the leaf was merged
    /// into its left sibling and no longer exists.
    pub(crate) fn merge_leaf(&mut self, leaf_id: NodeId) -> TreeResult<bool> {
        let leaf = self.leaf(leaf_id)?;
        let parent_id = leaf.parent;
        if parent_id == NULL_NODE || !leaf.is_underfull() {
            return Ok(true);
        }
        let (prev_id, next_id) = (leaf.prev, leaf.next);

        let next_shares_parent =
            next_id != NULL_NODE && self.leaf(next_id)?.parent == parent_id;
        let prev_shares_parent =
            prev_id != NULL_NODE && self.leaf(prev_id)?.parent == parent_id;

        if next_shares_parent && self.leaf(next_id)?.can_donate() {
            self.steal_from_next_leaf(leaf_id, next_id, parent_id)?;
            return Ok(true);
        }
        if prev_shares_parent && self.leaf(prev_id)?.can_donate() {
            self.steal_from_prev_leaf(leaf_id, prev_id, parent_id)?;
            return Ok(true);
        }
        if prev_shares_parent {
            self.merge_leaves(prev_id, leaf_id, parent_id)?;
            self.merge_internal(parent_id)?;
            return Ok(false);
        }
        if next_shares_parent {
            self.merge_leaves(leaf_id, next_id, parent_id)?;
            self.merge_internal(parent_id)?;
            return Ok(true);
        }
        Err(BPlusTreeError::corrupted_tree(
            "Leaf merge",
            "underfull leaf has no sibling under its parent",
        ))
    }

    /// Move the next leaf's first entry to the end of `leaf_id`.
    fn steal_from_next_leaf(
        &mut self,
        leaf_id: NodeId,
        next_id: NodeId,
        parent_id: NodeId,
    ) -> TreeResult<()> {
        let next = self.leaf_mut(next_id)?;
        let (key, value) = next.borrow_first()?;
        let new_separator = next.first_key().ok_or_else(|| {
            BPlusTreeError::corrupted_tree("Leaf steal", "donor leaf emptied")
        })?;
        self.leaf_mut(leaf_id)?.accept_from_right(key, value)?;

        let parent = self.internal_mut(parent_id)?;
        let index = parent
            .child_index(NodeRef::Leaf(next_id))
            .filter(|&index| index > 0)
            .ok_or_else(|| {
                BPlusTreeError::corrupted_tree("Leaf steal", "sibling missing from parent")
            })?;
        // The separator in front of `next` sits just left of it in the parent.
        parent.keys[index - 1] = new_separator;
        trace!(leaf = leaf_id, donor = next_id, key, "leaf borrowed from next");
        Ok(())
    }

    /// Move the previous leaf's last entry to the front of `leaf_id`.
    fn steal_from_prev_leaf(
        &mut self,
        leaf_id: NodeId,
        prev_id: NodeId,
        parent_id: NodeId,
    ) -> TreeResult<()> {
        let (key, value) = self.leaf_mut(prev_id)?.borrow_last()?;
        self.leaf_mut(leaf_id)?.accept_from_left(key, value)?;

        let parent = self.internal_mut(parent_id)?;
        let index = parent
            .child_index(NodeRef::Leaf(leaf_id))
            .filter(|&index| index > 0)
            .ok_or_else(|| {
                BPlusTreeError::corrupted_tree("Leaf steal", "leaf missing from parent")
            })?;
        parent.keys[index - 1] = key;
        trace!(leaf = leaf_id, donor = prev_id, key, "leaf borrowed from prev");
        Ok(())
    }

    /// Fold `right_id` into `left_id`, unlink it from the chain and drop its
    /// slot from the shared parent.
    fn merge_leaves(&mut self, left_id: NodeId, right_id: NodeId, parent_id: NodeId) -> TreeResult<()> {
        let mut right = self
            .leaf_arena
            .deallocate(right_id)
            .ok_or_else(|| BPlusTreeError::missing_leaf(right_id))?;
        let after = right.next;

        let left = self.leaf_mut(left_id)?;
        left.absorb(&mut right)?;
        left.next = after;
        if after != NULL_NODE {
            self.leaf_mut(after)?.prev = left_id;
        }

        let parent = self.internal_mut(parent_id)?;
        let index = parent
            .child_index(NodeRef::Leaf(right_id))
            .filter(|&index| index > 0)
            .ok_or_else(|| {
                BPlusTreeError::corrupted_tree("Leaf merge", "merged leaf missing from parent")
            })?;
        parent.remove_slot(index - 1, index)?;
        trace!(survivor = left_id, absorbed = right_id, "merged leaves");
        Ok(())
    }

    // ============================================================================
    // SEPARATOR MAINTENANCE
    // ============================================================================

    /// Rewrite the ancestor separator equal to `old_key` as `new_key`.
    ///
    /// A key smaller than a node's first separator belongs to that node's
    /// leftmost subtree, whose boundary is recorded further up.
    pub(crate) fn replace_key(&mut self, start: NodeId, old_key: Key, new_key: Key) -> TreeResult<()> {
        let mut current = start;
        while current != NULL_NODE && old_key != new_key {
            let node = self.internal_mut(current)?;
            match node.keys.first() {
                Some(&first) if old_key >= first => {
                    if let Ok(index) = node.keys.binary_search(&old_key) {
                        node.keys[index] = new_key;
                    }
                    return Ok(());
                }
                _ => current = node.parent,
            }
        }
        Ok(())
    }

    // ============================================================================
    // INTERNAL REBALANCING
    // ============================================================================

    /// Rebalance an internal node that may have lost a child.
    pub(crate) fn merge_internal(&mut self, node_id: NodeId) -> TreeResult<()> {
        let node = self.internal(node_id)?;
        let parent_id = node.parent;
        if parent_id == NULL_NODE || !node.is_underfull() {
            return Ok(());
        }

        let parent = self.internal(parent_id)?;
        let index = parent
            .child_index(NodeRef::Internal(node_id))
            .ok_or_else(|| {
                BPlusTreeError::corrupted_tree("Internal merge", "node missing from parent")
            })?;
        let left_id = match index.checked_sub(1).map(|i| parent.children[i]) {
            Some(NodeRef::Internal(id)) => Some(id),
            _ => None,
        };
        let right_id = match parent.children.get(index + 1) {
            Some(NodeRef::Internal(id)) => Some(*id),
            _ => None,
        };

        if let Some(left_id) = left_id {
            if self.internal(left_id)?.can_donate() {
                return self.steal_from_left_internal(node_id, left_id, parent_id, index);
            }
        }
        if let Some(right_id) = right_id {
            if self.internal(right_id)?.can_donate() {
                return self.steal_from_right_internal(node_id, right_id, parent_id, index);
            }
        }
        if let Some(left_id) = left_id {
            self.merge_internal_nodes(left_id, node_id, parent_id, index - 1)?;
        } else if let Some(right_id) = right_id {
            self.merge_internal_nodes(node_id, right_id, parent_id, index)?;
        } else {
            return Err(BPlusTreeError::corrupted_tree(
                "Internal merge",
                "underfull node has no sibling under its parent",
            ));
        }
        self.merge_internal(parent_id)
    }

    /// Rotate the left sibling's last child through the parent separator.
    fn steal_from_left_internal(
        &mut self,
        node_id: NodeId,
        left_id: NodeId,
        parent_id: NodeId,
        index: usize,
    ) -> TreeResult<()> {
        let (moved_key, child) = self.internal_mut(left_id)?.borrow_last()?;
        let parent = self.internal_mut(parent_id)?;
        let separator = std::mem::replace(&mut parent.keys[index - 1], moved_key);
        self.internal_mut(node_id)?.accept_from_left(separator, child)?;
        self.set_parent(child, node_id)?;
        trace!(node = node_id, donor = left_id, "internal node borrowed from left");
        Ok(())
    }

    /// Rotate the right sibling's first child through the parent separator.
    fn steal_from_right_internal(
        &mut self,
        node_id: NodeId,
        right_id: NodeId,
        parent_id: NodeId,
        index: usize,
    ) -> TreeResult<()> {
        let (moved_key, child) = self.internal_mut(right_id)?.borrow_first()?;
        let parent = self.internal_mut(parent_id)?;
        let separator = std::mem::replace(&mut parent.keys[index], moved_key);
        self.internal_mut(node_id)?.accept_from_right(separator, child)?;
        self.set_parent(child, node_id)?;
        trace!(node = node_id, donor = right_id, "internal node borrowed from right");
        Ok(())
    }

    /// Fold `right_id` into `left_id`, pulling down the parent separator at
    /// `key_index` that divided them.
    fn merge_internal_nodes(
        &mut self,
        left_id: NodeId,
        right_id: NodeId,
        parent_id: NodeId,
        key_index: usize,
    ) -> TreeResult<()> {
        let separator = self.internal(parent_id)?.keys[key_index];
        let mut right = self
            .internal_arena
            .deallocate(right_id)
            .ok_or_else(|| BPlusTreeError::missing_internal(right_id))?;
        let moved = right.children.clone();
        self.internal_mut(left_id)?.merge_from(separator, &mut right)?;
        for child in moved {
            self.set_parent(child, left_id)?;
        }
        self.internal_mut(parent_id)?
            .remove_slot(key_index, key_index + 1)?;
        trace!(survivor = left_id, absorbed = right_id, separator, "merged internal nodes");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::types::NodeRef;
    use crate::BPlusTree;

    fn value(key: i32) -> Vec<u8> {
        format!("v{key}").into_bytes()
    }

    fn tree_with(order: usize, keys: impl IntoIterator<Item = i32>) -> BPlusTree {
        let mut tree = BPlusTree::new(order).unwrap();
        for key in keys {
            tree.set(key, value(key)).unwrap();
        }
        tree
    }

    #[test]
    fn test_delete_on_empty_tree_is_noop() {
        let mut tree = BPlusTree::new(4).unwrap();
        tree.delete(42).unwrap();
        assert!(tree.is_empty());
        assert!(tree.root.is_none());
    }

    #[test]
    fn test_delete_absent_key_keeps_size() {
        let mut tree = tree_with(4, [1, 2, 3]);
        tree.delete(7).unwrap();
        assert_eq!(tree.len(), 3);
        tree.delete(2).unwrap();
        tree.delete(2).unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.get(2), None);
    }

    #[test]
    fn test_deleting_last_key_empties_tree() {
        let mut tree = tree_with(4, [1]);
        tree.delete(1).unwrap();
        assert!(tree.root.is_none());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.count_nodes_in_tree(), (0, 0));
        assert!(tree.leaf_arena.is_empty());
    }

    #[test]
    fn test_deleting_first_key_updates_separator() {
        // Leaves [5, 10] [15, 20, 25], root separator 15
        let mut tree = tree_with(4, [5, 10, 15, 20, 25]);
        tree.delete(15).unwrap();
        let Some(NodeRef::Internal(root_id)) = tree.root else {
            panic!("expected internal root");
        };
        assert_eq!(tree.get_internal(root_id).unwrap().keys(), &[20]);
        tree.verify();
    }

    #[test]
    fn test_underfull_leaf_steals_from_next() {
        // order 5: leaves hold at least 2 keys
        let mut tree = tree_with(5, [10, 20, 30, 40, 50, 60]);
        assert_eq!(tree.leaf_sizes(), vec![2, 4]);
        tree.delete(10).unwrap();
        assert_eq!(tree.leaf_sizes(), vec![2, 3]);
        assert_eq!(tree.traverse(), vec![&b"v20"[..], b"v30", b"v40", b"v50", b"v60"]);
        tree.verify();
    }

    #[test]
    fn test_underfull_leaf_steals_from_prev() {
        let mut tree = tree_with(5, [10, 20, 30, 40, 50]);
        tree.set(25, value(25)).unwrap();
        // leaves [10, 20, 25] [30, 40, 50]
        tree.delete(40).unwrap();
        tree.delete(50).unwrap();
        assert_eq!(tree.leaf_sizes(), vec![2, 2]);
        assert_eq!(tree.get(25), Some(&b"v25"[..]));
        tree.verify();
    }

    #[test]
    fn test_merge_collapses_root() {
        let mut tree = tree_with(4, [5, 10, 15, 20, 25]);
        assert_eq!(tree.height(), 2);
        // The third delete still borrows from the left leaf; the fourth merges.
        for key in [25, 20, 15, 10] {
            tree.delete(key).unwrap();
            tree.verify();
        }
        assert_eq!(tree.height(), 1);
        assert!(matches!(tree.root, Some(NodeRef::Leaf(_))));
        assert_eq!(tree.count_nodes_in_tree(), (1, 0));
        assert_eq!(tree.internal_arena.len(), 0);
    }

    #[test]
    fn test_cascading_merges_release_every_node() {
        let mut tree = tree_with(3, 0..200);
        for key in 0..200 {
            tree.delete(key).unwrap();
            tree.verify();
        }
        assert!(tree.is_empty());
        assert!(tree.leaf_arena.is_empty());
        assert!(tree.internal_arena.is_empty());
    }

    #[test]
    fn test_replace_key_climbs_past_leftmost_subtrees() {
        let mut tree = tree_with(3, 0..40);
        let leaf_id = tree.find_leaf(20).unwrap();
        let first = tree.get_leaf(leaf_id).unwrap().first_key().unwrap();
        // Deleting a leaf's first key must leave every separator a real key.
        tree.delete(first).unwrap();
        tree.verify();
        assert_eq!(tree.get(first), None);
    }
}
