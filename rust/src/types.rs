//! Core types and data structures for BPlusTree.
//!
//! This module contains the fundamental data structures, type definitions,
//! and constants used throughout the B+ tree implementation.

use crate::compact_arena::CompactArena;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Smallest order for which split and merge keep every node non-empty.
pub const MIN_ORDER: usize = 3;

// ============================================================================
// TYPE DEFINITIONS
// ============================================================================

/// Node ID type for arena-based allocation
pub type NodeId = u32;

/// Sentinel for an absent parent, sibling or chain link.
pub const NULL_NODE: NodeId = u32::MAX;

/// Key type stored by the index.
pub type Key = i32;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// B+ tree index mapping `i32` keys to byte-string values.
///
/// All values live in leaves. Leaves are chained in key order so full scans and
/// range scans never re-descend the tree. Every node records its parent id, and
/// structural changes ripple upward through those ids.
///
/// # Examples
///
/// ```
/// use bplustree_index::BPlusTree;
///
/// let mut tree = BPlusTree::new(4).unwrap();
/// tree.set(10, b"ten".to_vec()).unwrap();
/// tree.set(20, b"twenty".to_vec()).unwrap();
/// tree.set(30, b"thirty".to_vec()).unwrap();
///
/// assert_eq!(tree.get(20), Some(&b"twenty"[..]));
/// assert_eq!(tree.len(), 3);
///
/// // Half-open range scan
/// let range = tree.get_range(10, 30);
/// assert_eq!(range, [&b"ten"[..], &b"twenty"[..]]);
/// ```
///
/// # Value size
///
/// A leaf page holds up to `order` entries, so `set` rejects any value for which
/// `order` copies would not fit in one 4 KiB page (see [`crate::page`]).
#[derive(Debug)]
pub struct BPlusTree {
    /// Maximum number of keys per node.
    pub(crate) order: usize,
    /// The root node of the tree; `None` exactly when the tree is empty.
    pub(crate) root: Option<NodeRef>,
    /// Number of distinct keys stored.
    pub(crate) size: usize,
    /// Arena storage for leaf nodes.
    pub(crate) leaf_arena: CompactArena<LeafNode>,
    /// Arena storage for internal nodes.
    pub(crate) internal_arena: CompactArena<InternalNode>,
}

/// Leaf node containing key-value pairs.
#[derive(Debug, Clone)]
pub struct LeafNode {
    /// Key count at which this node splits.
    pub(crate) order: usize,
    /// Owning internal node, or `NULL_NODE` for the root.
    pub(crate) parent: NodeId,
    /// Previous leaf in the chain.
    pub(crate) prev: NodeId,
    /// Next leaf in the chain.
    pub(crate) next: NodeId,
    /// Sorted list of keys.
    pub(crate) keys: Vec<Key>,
    /// Values corresponding to keys.
    pub(crate) values: Vec<Vec<u8>>,
}

/// Internal node containing separator keys and child references.
#[derive(Debug, Clone)]
pub struct InternalNode {
    /// Key count at which this node splits.
    pub(crate) order: usize,
    /// Owning internal node, or `NULL_NODE` for the root.
    pub(crate) parent: NodeId,
    /// Sorted separators; `keys[i]` is the smallest key under `children[i + 1]`.
    pub(crate) keys: Vec<Key>,
    /// Child nodes, always one more than `keys`.
    pub(crate) children: Vec<NodeRef>,
}

// ============================================================================
// ENUMS
// ============================================================================

/// Node reference that can be either a leaf or internal node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRef {
    Leaf(NodeId),
    Internal(NodeId),
}

impl NodeRef {
    /// Return the raw node ID.
    pub fn id(&self) -> NodeId {
        match *self {
            NodeRef::Leaf(id) => id,
            NodeRef::Internal(id) => id,
        }
    }

    /// Returns true if this reference points to a leaf node.
    pub fn is_leaf(&self) -> bool {
        matches!(self, NodeRef::Leaf(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_ref_reports_kind_and_id() {
        let leaf = NodeRef::Leaf(3);
        let internal = NodeRef::Internal(3);

        assert!(leaf.is_leaf());
        assert!(!internal.is_leaf());
        assert_eq!(leaf.id(), internal.id());
        assert_ne!(leaf, internal);
    }
}
