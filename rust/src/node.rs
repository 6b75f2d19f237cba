//! Node implementations for BPlusTree.
//!
//! Node-local logic only: searching, occupancy rules and moving entries in and
//! out of a single node. Anything that has to follow parent, sibling or chain
//! ids lives on the tree, which owns the arenas.

use crate::error::{BPlusTreeError, TreeResult};
use crate::node_storage::{insert_at, pop_last, remove_at};
use crate::types::{InternalNode, Key, LeafNode, NodeRef};

// ============================================================================
// LEAF NODE IMPLEMENTATION
// ============================================================================

impl LeafNode {
    // ============================================================================
    // GET OPERATIONS
    // ============================================================================

    /// Position of the first key `>= key`, and whether that key is `key` itself.
    #[inline]
    pub fn find(&self, key: Key) -> (usize, bool) {
        match self.keys.binary_search(&key) {
            Ok(index) => (index, true),
            Err(index) => (index, false),
        }
    }

    /// Get a value by key from this leaf node.
    pub fn get(&self, key: Key) -> Option<&[u8]> {
        match self.find(key) {
            (index, true) => Some(self.values[index].as_slice()),
            _ => None,
        }
    }

    /// Returns the number of key-value pairs in this leaf.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if this leaf node is empty.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Get a reference to the keys in this leaf node.
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// Get a reference to the values in this leaf node.
    pub fn values(&self) -> &[Vec<u8>] {
        &self.values
    }

    pub fn first_key(&self) -> Option<Key> {
        self.keys.first().copied()
    }

    pub fn last_key(&self) -> Option<Key> {
        self.keys.last().copied()
    }

    // ============================================================================
    // STATUS CHECKS
    // ============================================================================

    /// Returns true once the key count reaches the order and the leaf must split.
    pub fn is_full(&self) -> bool {
        self.keys.len() >= self.order
    }

    /// Minimum number of keys a non-root leaf must keep.
    pub fn min_keys(&self) -> usize {
        (self.order - 1) / 2
    }

    /// Returns true if this leaf node is underfull (below minimum occupancy).
    pub fn is_underfull(&self) -> bool {
        self.keys.len() < self.min_keys()
    }

    /// Returns true if this leaf can donate a key to a sibling.
    pub fn can_donate(&self) -> bool {
        self.keys.len() > self.min_keys()
    }

    // ============================================================================
    // MUTATION
    // ============================================================================

    /// Insert a key-value pair at the specified index.
    pub(crate) fn insert_at(&mut self, index: usize, key: Key, value: Vec<u8>) -> TreeResult<()> {
        insert_at(&mut self.keys, index, key, self.order)?;
        insert_at(&mut self.values, index, value, self.order)
    }

    /// Remove the key-value pair at the specified index.
    pub(crate) fn remove_at(&mut self, index: usize) -> TreeResult<(Key, Vec<u8>)> {
        let key = remove_at(&mut self.keys, index)?;
        let value = remove_at(&mut self.values, index)?;
        Ok((key, value))
    }

    /// Split off the entries from `mid` onward; the midpoint key goes right.
    pub(crate) fn split_off(&mut self, mid: usize) -> (Vec<Key>, Vec<Vec<u8>>) {
        (self.keys.split_off(mid), self.values.split_off(mid))
    }

    // ============================================================================
    // BORROWING AND MERGING HELPERS
    // ============================================================================

    /// Borrow the first key-value pair (used when this is the right sibling)
    pub(crate) fn borrow_first(&mut self) -> TreeResult<(Key, Vec<u8>)> {
        self.remove_at(0)
    }

    /// Borrow the last key-value pair (used when this is the left sibling)
    pub(crate) fn borrow_last(&mut self) -> TreeResult<(Key, Vec<u8>)> {
        let key = pop_last(&mut self.keys)?;
        let value = pop_last(&mut self.values)?;
        Ok((key, value))
    }

    /// Accept a borrowed pair at the beginning (from left sibling)
    pub(crate) fn accept_from_left(&mut self, key: Key, value: Vec<u8>) -> TreeResult<()> {
        self.insert_at(0, key, value)
    }

    /// Accept a borrowed pair at the end (from right sibling)
    pub(crate) fn accept_from_right(&mut self, key: Key, value: Vec<u8>) -> TreeResult<()> {
        let end = self.keys.len();
        self.insert_at(end, key, value)
    }

    /// Append every entry of `other`, which must hold strictly larger keys.
    pub(crate) fn absorb(&mut self, other: &mut LeafNode) -> TreeResult<()> {
        let total = self.keys.len() + other.keys.len();
        if total >= self.order {
            return Err(BPlusTreeError::CapacityExceeded {
                capacity: self.order,
            });
        }
        self.keys.append(&mut other.keys);
        self.values.append(&mut other.values);
        Ok(())
    }
}

// ============================================================================
// INTERNAL NODE IMPLEMENTATION
// ============================================================================

impl InternalNode {
    /// Index of the child that should contain `key`: the first separator
    /// greater than `key`, or the last child.
    #[inline]
    pub fn find(&self, key: Key) -> usize {
        self.keys.partition_point(|&separator| separator <= key)
    }

    /// Get the child reference that routes `key`.
    pub fn child_for(&self, key: Key) -> Option<NodeRef> {
        self.children.get(self.find(key)).copied()
    }

    /// Position of `child` among this node's children.
    pub fn child_index(&self, child: NodeRef) -> Option<usize> {
        self.children.iter().position(|&c| c == child)
    }

    /// Returns the number of separator keys in this node.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn children(&self) -> &[NodeRef] {
        &self.children
    }

    // ============================================================================
    // STATUS CHECKS
    // ============================================================================

    /// Returns true once the key count reaches the order and the node must split.
    pub fn is_full(&self) -> bool {
        self.keys.len() >= self.order
    }

    /// Minimum number of children a non-root internal node must keep.
    pub fn min_children(&self) -> usize {
        (self.order + 1) / 2
    }

    /// Underflow is measured on children, not keys.
    pub fn is_underfull(&self) -> bool {
        self.children.len() < self.min_children()
    }

    pub fn can_donate(&self) -> bool {
        self.children.len() > self.min_children()
    }

    // ============================================================================
    // MUTATION
    // ============================================================================

    /// Insert `separator` at `index` and `child` right after the child at `index`.
    pub(crate) fn insert_child_after(
        &mut self,
        index: usize,
        separator: Key,
        child: NodeRef,
    ) -> TreeResult<()> {
        insert_at(&mut self.keys, index, separator, self.order)?;
        insert_at(&mut self.children, index + 1, child, self.order + 1)
    }

    /// Drop the separator at `key_index` and the child at `child_index`.
    pub(crate) fn remove_slot(
        &mut self,
        key_index: usize,
        child_index: usize,
    ) -> TreeResult<NodeRef> {
        remove_at(&mut self.keys, key_index)?;
        remove_at(&mut self.children, child_index)
    }

    /// Split around `mid`: returns the promoted separator plus the right half's
    /// keys and children. The promoted key stays in neither half.
    pub(crate) fn split_off(&mut self, mid: usize) -> TreeResult<(Key, Vec<Key>, Vec<NodeRef>)> {
        let mut right_keys = self.keys.split_off(mid);
        let promoted = remove_at(&mut right_keys, 0)?;
        let right_children = self.children.split_off(mid + 1);
        Ok((promoted, right_keys, right_children))
    }

    // ============================================================================
    // BORROWING AND MERGING HELPERS
    // ============================================================================

    /// Borrow the first separator and child (used when this is the right sibling)
    pub(crate) fn borrow_first(&mut self) -> TreeResult<(Key, NodeRef)> {
        let key = remove_at(&mut self.keys, 0)?;
        let child = remove_at(&mut self.children, 0)?;
        Ok((key, child))
    }

    /// Borrow the last separator and child (used when this is the left sibling)
    pub(crate) fn borrow_last(&mut self) -> TreeResult<(Key, NodeRef)> {
        let key = pop_last(&mut self.keys)?;
        let child = pop_last(&mut self.children)?;
        Ok((key, child))
    }

    /// Accept a child at the front; `separator` came down from the parent and
    /// now divides `child` from the old first child.
    pub(crate) fn accept_from_left(&mut self, separator: Key, child: NodeRef) -> TreeResult<()> {
        insert_at(&mut self.keys, 0, separator, self.order)?;
        insert_at(&mut self.children, 0, child, self.order + 1)
    }

    /// Accept a child at the back, behind the parent's `separator`.
    pub(crate) fn accept_from_right(&mut self, separator: Key, child: NodeRef) -> TreeResult<()> {
        let (key_end, child_end) = (self.keys.len(), self.children.len());
        insert_at(&mut self.keys, key_end, separator, self.order)?;
        insert_at(&mut self.children, child_end, child, self.order + 1)
    }

    /// Merge all content from another internal node, with separator from parent
    pub(crate) fn merge_from(&mut self, separator: Key, other: &mut InternalNode) -> TreeResult<()> {
        if self.keys.len() + other.keys.len() + 1 >= self.order {
            return Err(BPlusTreeError::CapacityExceeded {
                capacity: self.order,
            });
        }
        self.keys.push(separator);
        self.keys.append(&mut other.keys);
        self.children.append(&mut other.children);
        Ok(())
    }
}
