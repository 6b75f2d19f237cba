//! B+ tree index from `i32` keys to byte-string values.
//!
//! Nodes live in two arenas, one per node kind, and refer to each other by
//! [`NodeId`]. Leaves are chained in both directions so scans walk the chain
//! instead of re-descending the tree, and every node records its parent so
//! splits and merges can propagate upward.
//!
//! ```
//! use bplustree_index::BPlusTree;
//!
//! let mut tree = BPlusTree::new(4).unwrap();
//! for key in [5, 10, 15, 20, 25] {
//!     tree.set(key, key.to_string().into_bytes()).unwrap();
//! }
//! tree.delete(10).unwrap();
//!
//! assert_eq!(tree.get(15), Some(&b"15"[..]));
//! assert_eq!(tree.get_range(0, 20), vec![&b"5"[..], &b"15"[..]]);
//! assert_eq!(tree.traverse().len(), 4);
//! tree.verify();
//! ```
//!
//! The library emits `tracing` events for structural changes (splits, steals,
//! merges, root changes) and installs no subscriber of its own.

mod compact_arena;
mod construction;
mod delete_operations;
mod error;
mod get_operations;
mod insert_operations;
mod iteration;
mod node;
mod node_storage;
pub mod page;
mod range_queries;
mod tree_structure;
mod types;
mod validation;

pub use compact_arena::{CompactArena, CompactArenaStats};
pub use construction::DEFAULT_ORDER;
pub use error::{BPlusTreeError, BTreeResult, InitResult, ModifyResult};
pub use iteration::{ItemIterator, KeyIterator, ValueIterator};
pub use types::{BPlusTree, InternalNode, Key, LeafNode, NodeId, NodeRef, MIN_ORDER, NULL_NODE};
