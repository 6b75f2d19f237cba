//! Range query operations for BPlusTree.
//!
//! A range scan routes `start` to its leaf once and then walks the leaf chain,
//! taking the half-open slice `[find(start), find(end))` of each leaf.

use crate::types::{BPlusTree, Key, NULL_NODE};

// ============================================================================
// RANGE QUERY OPERATIONS
// ============================================================================

impl BPlusTree {
    /// Values for every key in `[start, end)`, in ascending key order.
    ///
    /// Returns an empty vector for an empty tree or when `start >= end`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplustree_index::BPlusTree;
    ///
    /// let mut tree = BPlusTree::new(4).unwrap();
    /// for key in 0..10 {
    ///     tree.set(key, format!("value{key}").into_bytes()).unwrap();
    /// }
    ///
    /// let values = tree.get_range(3, 6);
    /// assert_eq!(values, vec![&b"value3"[..], &b"value4"[..], &b"value5"[..]]);
    /// assert!(tree.get_range(6, 3).is_empty());
    /// assert!(tree.get_range(5, 5).is_empty());
    /// ```
    pub fn get_range(&self, start: Key, end: Key) -> Vec<&[u8]> {
        let mut values = Vec::new();
        if start >= end {
            return values;
        }
        let Some(mut leaf_id) = self.find_leaf(start) else {
            return values;
        };

        while let Some(leaf) = self.get_leaf(leaf_id) {
            let (lo, _) = leaf.find(start);
            let (hi, _) = leaf.find(end);
            values.extend(leaf.values()[lo..hi].iter().map(Vec::as_slice));

            // A slice stopping short of the leaf's end has met `end`.
            if hi < leaf.len() || leaf.next == NULL_NODE {
                break;
            }
            leaf_id = leaf.next;
        }
        values
    }

    /// Returns the first key-value pair in the tree.
    pub fn first(&self) -> Option<(Key, &[u8])> {
        self.items().next()
    }

    /// Returns the last key-value pair in the tree.
    pub fn last(&self) -> Option<(Key, &[u8])> {
        let leaf = self.get_leaf(self.last_leaf_id()?)?;
        let (&key, value) = (leaf.keys.last()?, leaf.values.last()?);
        Some((key, value.as_slice()))
    }
}
