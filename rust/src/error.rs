//! Error handling and result types for BPlusTree operations.
//!
//! Only `ValueTooLarge` and `InvalidOrder` are reachable from well-formed input.
//! The remaining variants report a dangling arena id or an impossible node shape
//! on a mutation path, which means the tree itself is broken.

use crate::types::NodeId;
use thiserror::Error;

/// Error type for B+ tree operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BPlusTreeError {
    /// The value cannot fit `order` times into one leaf page.
    #[error("value of {len} bytes is too large (max {max} bytes at this order)")]
    ValueTooLarge { len: usize, max: usize },

    /// The requested order is outside the supported range.
    #[error("order {order} is invalid (must be between {min} and {max})")]
    InvalidOrder { order: usize, min: usize, max: usize },

    /// A node storage helper was asked to touch a slot past the end.
    #[error("index {index} out of bounds for sequence of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// A node storage helper was asked to grow a sequence past its bound.
    #[error("sequence already holds {capacity} elements")]
    CapacityExceeded { capacity: usize },

    /// The arena ran out of node ids.
    #[error("node arena exhausted")]
    ArenaExhausted,

    /// A node id did not resolve to a live node of the expected kind.
    #[error("{kind} node {id} not found in arena")]
    MissingNode { kind: &'static str, id: NodeId },

    /// Tree corruption detected on a mutation path.
    #[error("corrupted tree: {0}")]
    CorruptedTree(String),
}

impl BPlusTreeError {
    /// Create an InvalidOrder error with context
    pub fn invalid_order(order: usize, min: usize, max: usize) -> Self {
        Self::InvalidOrder { order, min, max }
    }

    /// Create a MissingNode error for a leaf id
    pub fn missing_leaf(id: NodeId) -> Self {
        Self::MissingNode { kind: "leaf", id }
    }

    /// Create a MissingNode error for an internal id
    pub fn missing_internal(id: NodeId) -> Self {
        Self::MissingNode {
            kind: "internal",
            id,
        }
    }

    /// Create a CorruptedTree error with context
    pub fn corrupted_tree(component: &str, details: &str) -> Self {
        Self::CorruptedTree(format!("{}: {}", component, details))
    }

    /// Check if this error rejected caller input rather than reporting corruption
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::ValueTooLarge { .. } | Self::InvalidOrder { .. })
    }
}

/// Internal result type for tree operations
pub(crate) type TreeResult<T> = Result<T, BPlusTreeError>;

/// Public result type for tree operations that may fail
pub type BTreeResult<T> = Result<T, BPlusTreeError>;

/// Result type for tree modification operations
pub type ModifyResult<T> = Result<T, BPlusTreeError>;

/// Result type for tree construction
pub type InitResult<T> = Result<T, BPlusTreeError>;
