//! Construction and initialization logic for BPlusTree and nodes.
//!
//! The only tunable is the tree order. It is validated here against both the
//! structural minimum and the page layout in [`crate::page`].

use crate::compact_arena::CompactArena;
use crate::error::{BPlusTreeError, InitResult};
use crate::page::MAX_ORDER;
use crate::types::{BPlusTree, InternalNode, LeafNode, MIN_ORDER, NULL_NODE};

/// Default order for B+ tree nodes
pub const DEFAULT_ORDER: usize = 16;

impl BPlusTree {
    /// Create an empty B+ tree with the given order.
    ///
    /// # Arguments
    ///
    /// * `order` - Key count at which a node splits (between `MIN_ORDER` and `page::MAX_ORDER`)
    ///
    /// # Examples
    ///
    /// ```
    /// use bplustree_index::BPlusTree;
    ///
    /// let tree = BPlusTree::new(16).unwrap();
    /// assert!(tree.is_empty());
    /// assert!(BPlusTree::new(2).is_err());
    /// ```
    pub fn new(order: usize) -> InitResult<Self> {
        if !(MIN_ORDER..=MAX_ORDER).contains(&order) {
            return Err(BPlusTreeError::invalid_order(order, MIN_ORDER, MAX_ORDER));
        }

        Ok(Self {
            order,
            root: None,
            size: 0,
            leaf_arena: CompactArena::new(),
            internal_arena: CompactArena::new(),
        })
    }

    /// Create a B+ tree with default order.
    ///
    /// This is equivalent to calling `new(DEFAULT_ORDER)`.
    pub fn with_default_order() -> InitResult<Self> {
        Self::new(DEFAULT_ORDER)
    }
}

impl Default for BPlusTree {
    fn default() -> Self {
        Self {
            order: DEFAULT_ORDER,
            root: None,
            size: 0,
            leaf_arena: CompactArena::new(),
            internal_arena: CompactArena::new(),
        }
    }
}

impl LeafNode {
    /// Creates a detached leaf node with the specified order.
    pub fn new(order: usize) -> Self {
        Self {
            order,
            parent: NULL_NODE,
            prev: NULL_NODE,
            next: NULL_NODE,
            keys: Vec::with_capacity(order),
            values: Vec::with_capacity(order),
        }
    }
}

/// Placeholder left in a freed arena slot; holds no buffers.
impl Default for LeafNode {
    fn default() -> Self {
        Self {
            order: DEFAULT_ORDER,
            parent: NULL_NODE,
            prev: NULL_NODE,
            next: NULL_NODE,
            keys: Vec::new(),
            values: Vec::new(),
        }
    }
}

impl InternalNode {
    /// Creates a detached internal node with the specified order.
    pub fn new(order: usize) -> Self {
        Self {
            order,
            parent: NULL_NODE,
            keys: Vec::with_capacity(order),
            children: Vec::with_capacity(order + 1),
        }
    }
}

impl Default for InternalNode {
    fn default() -> Self {
        Self {
            order: DEFAULT_ORDER,
            parent: NULL_NODE,
            keys: Vec::new(),
            children: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_bounds() {
        assert!(BPlusTree::new(MIN_ORDER).is_ok());
        assert!(BPlusTree::new(MAX_ORDER).is_ok());
        assert_eq!(
            BPlusTree::new(2).unwrap_err(),
            BPlusTreeError::InvalidOrder {
                order: 2,
                min: MIN_ORDER,
                max: MAX_ORDER
            }
        );
        assert!(BPlusTree::new(MAX_ORDER + 1).is_err());
    }

    #[test]
    fn test_default_tree_matches_default_order() {
        let tree = BPlusTree::default();
        assert_eq!(tree.order(), DEFAULT_ORDER);
        assert!(tree.is_empty());
        assert_eq!(BPlusTree::with_default_order().unwrap().order(), DEFAULT_ORDER);
    }

    #[test]
    fn test_new_nodes_are_detached() {
        let leaf = LeafNode::new(4);
        assert_eq!((leaf.parent, leaf.prev, leaf.next), (NULL_NODE, NULL_NODE, NULL_NODE));
        let internal = InternalNode::new(4);
        assert_eq!(internal.parent, NULL_NODE);
        assert!(internal.children.is_empty());
    }

    #[test]
    fn test_freed_slot_placeholders_hold_no_buffers() {
        let leaf = LeafNode::default();
        assert_eq!((leaf.keys.capacity(), leaf.values.capacity()), (0, 0));
        let internal = InternalNode::default();
        assert_eq!((internal.keys.capacity(), internal.children.capacity()), (0, 0));

        let mut arena = CompactArena::new();
        let id = arena.allocate(LeafNode::new(8)).unwrap();
        let freed = arena.deallocate(id).unwrap();
        assert!(freed.keys.capacity() >= 8);
        assert!(arena.get(id).is_none());
    }
}
