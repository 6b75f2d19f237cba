//! Iterator implementations for BPlusTree.
//!
//! Every scan follows the leaf chain from the leftmost leaf; internal nodes
//! are only consulted to find where the chain starts.

use crate::types::{BPlusTree, Key, LeafNode, NodeId, NULL_NODE};

// ============================================================================
// ITERATOR STRUCTS
// ============================================================================

/// Iterator over key-value pairs in the B+ tree using the leaf linked list.
pub struct ItemIterator<'a> {
    tree: &'a BPlusTree,
    current_leaf: Option<&'a LeafNode>,
    current_index: usize,
}

/// Iterator over keys in the B+ tree.
pub struct KeyIterator<'a> {
    items: ItemIterator<'a>,
}

/// Iterator over values in the B+ tree.
pub struct ValueIterator<'a> {
    items: ItemIterator<'a>,
}

// ============================================================================
// BPLUSTREE ITERATOR METHODS
// ============================================================================

impl BPlusTree {
    /// Returns an iterator over all key-value pairs in sorted order.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplustree_index::BPlusTree;
    ///
    /// let mut tree = BPlusTree::new(4).unwrap();
    /// for key in [3, 1, 2] {
    ///     tree.set(key, vec![key as u8]).unwrap();
    /// }
    /// let items: Vec<_> = tree.items().collect();
    /// assert_eq!(items, vec![(1, &[1u8][..]), (2, &[2u8][..]), (3, &[3u8][..])]);
    /// ```
    pub fn items(&self) -> ItemIterator<'_> {
        ItemIterator::new(self)
    }

    /// Returns an iterator over all keys in sorted order.
    pub fn keys(&self) -> KeyIterator<'_> {
        KeyIterator {
            items: self.items(),
        }
    }

    /// Returns an iterator over all values in key order.
    pub fn values(&self) -> ValueIterator<'_> {
        ValueIterator {
            items: self.items(),
        }
    }

    /// Every value in ascending key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplustree_index::BPlusTree;
    ///
    /// let mut tree = BPlusTree::new(4).unwrap();
    /// tree.set(2, b"b".to_vec()).unwrap();
    /// tree.set(1, b"a".to_vec()).unwrap();
    /// assert_eq!(tree.traverse(), vec![&b"a"[..], &b"b"[..]]);
    /// ```
    pub fn traverse(&self) -> Vec<&[u8]> {
        self.values().collect()
    }
}

// ============================================================================
// ITEMITERATOR IMPLEMENTATION
// ============================================================================

impl<'a> ItemIterator<'a> {
    pub fn new(tree: &'a BPlusTree) -> Self {
        let current_leaf = tree.first_leaf_id().and_then(|id| tree.get_leaf(id));
        Self {
            tree,
            current_leaf,
            current_index: 0,
        }
    }

    fn advance_leaf(&mut self, next: NodeId) {
        self.current_leaf = if next == NULL_NODE {
            None
        } else {
            self.tree.get_leaf(next)
        };
        self.current_index = 0;
    }
}

impl<'a> Iterator for ItemIterator<'a> {
    type Item = (Key, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let leaf = self.current_leaf?;
            if let (Some(&key), Some(value)) = (
                leaf.keys.get(self.current_index),
                leaf.values.get(self.current_index),
            ) {
                self.current_index += 1;
                return Some((key, value.as_slice()));
            }
            // An empty leaf is skipped like an exhausted one.
            self.advance_leaf(leaf.next);
        }
    }
}

impl<'a> Iterator for KeyIterator<'a> {
    type Item = Key;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next().map(|(key, _)| key)
    }
}

impl<'a> Iterator for ValueIterator<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next().map(|(_, value)| value)
    }
}

#[cfg(test)]
mod tests {
    use crate::BPlusTree;

    #[test]
    fn test_empty_tree_iterators() {
        let tree = BPlusTree::new(4).unwrap();
        assert_eq!(tree.items().count(), 0);
        assert_eq!(tree.keys().count(), 0);
        assert!(tree.traverse().is_empty());
    }

    #[test]
    fn test_iteration_crosses_leaves_in_order() {
        let mut tree = BPlusTree::new(3).unwrap();
        for key in (0..50).rev() {
            tree.set(key, key.to_le_bytes().to_vec()).unwrap();
        }
        assert!(tree.leaf_count() > 1);
        assert_eq!(tree.keys().collect::<Vec<_>>(), (0..50).collect::<Vec<_>>());
        let values: Vec<_> = tree.values().collect();
        assert_eq!(values.len(), 50);
        assert_eq!(values[17], &17i32.to_le_bytes()[..]);
        assert_eq!(tree.traverse(), values);
    }

    #[test]
    fn test_iteration_after_deletes() {
        let mut tree = BPlusTree::new(4).unwrap();
        for key in 0..40 {
            tree.set(key, vec![key as u8]).unwrap();
        }
        for key in (0..40).filter(|k| k % 3 != 0) {
            tree.delete(key).unwrap();
        }
        let keys: Vec<_> = tree.keys().collect();
        assert_eq!(keys, (0..40).filter(|k| k % 3 == 0).collect::<Vec<_>>());
    }
}
