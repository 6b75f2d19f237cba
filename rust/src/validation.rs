//! Validation and debugging utilities for BPlusTree.
//!
//! This module contains all validation methods, invariant checking, debugging utilities,
//! and test helpers for the B+ tree implementation.

use std::fmt::Write as _;

use crate::error::{BPlusTreeError, BTreeResult, TreeResult};
use crate::types::{BPlusTree, Key, NodeId, NodeRef, NULL_NODE};

/// Facts gathered about a subtree while checking it.
struct SubtreeSummary {
    min_key: Option<Key>,
    max_key: Option<Key>,
    depth: usize,
}

// ============================================================================
// VALIDATION METHODS
// ============================================================================

impl BPlusTree {
    /// Check if the tree maintains B+ tree invariants.
    /// Returns true if all invariants are satisfied.
    pub fn check_invariants(&self) -> bool {
        self.check_invariants_detailed().is_ok()
    }

    /// Check invariants with detailed error reporting.
    pub fn check_invariants_detailed(&self) -> Result<(), String> {
        let Some(root) = self.root else {
            return self.check_empty_tree().map_err(|e| e.to_string());
        };

        if self.parent_of(root).map_err(|e| e.to_string())? != NULL_NODE {
            return Err("Root node has a parent".to_string());
        }

        let mut leaves = Vec::new();
        self.check_node_invariants(root, NULL_NODE, true, &mut leaves)
            .map_err(|e| e.to_string())?;

        self.check_linked_list_invariants(&leaves)?;

        self.check_arena_tree_consistency(leaves.len())
            .map_err(|e| e.to_string())
    }

    /// Panics with the first violated invariant.
    ///
    /// # Panics
    ///
    /// On any structural violation, including a separator that is not the
    /// smallest key of its right subtree.
    pub fn verify(&self) {
        if let Err(e) = self.check_invariants_detailed() {
            panic!("B+ tree invariant violated: {e}");
        }
    }

    /// Check if tree is in a valid state for operations
    pub fn validate_for_operation(&self, operation: &str) -> BTreeResult<()> {
        self.check_invariants_detailed()
            .map_err(|e| BPlusTreeError::corrupted_tree(operation, &e))
    }

    fn check_empty_tree(&self) -> TreeResult<()> {
        if self.size != 0 || !self.leaf_arena.is_empty() || !self.internal_arena.is_empty() {
            return Err(BPlusTreeError::corrupted_tree(
                "Empty tree",
                &format!(
                    "size {} with {} leaves and {} internal nodes allocated",
                    self.size,
                    self.leaf_arena.len(),
                    self.internal_arena.len()
                ),
            ));
        }
        Ok(())
    }

    /// Check that arena allocation matches tree structure
    fn check_arena_tree_consistency(&self, chained_leaves: usize) -> TreeResult<()> {
        let (tree_leaf_count, tree_internal_count) = self.count_nodes_in_tree();

        if tree_leaf_count != self.leaf_arena.len() || tree_leaf_count != chained_leaves {
            return Err(BPlusTreeError::corrupted_tree(
                "Leaf consistency check",
                &format!(
                    "{} in tree vs {} in arena",
                    tree_leaf_count,
                    self.leaf_arena.len()
                ),
            ));
        }

        if tree_internal_count != self.internal_arena.len() {
            return Err(BPlusTreeError::corrupted_tree(
                "Internal consistency check",
                &format!(
                    "{} in tree vs {} in arena",
                    tree_internal_count,
                    self.internal_arena.len()
                ),
            ));
        }

        Ok(())
    }

    /// Check that the leaf chain visits `leaves` in order with matching back links,
    /// and that it holds exactly `size` strictly ascending keys.
    fn check_linked_list_invariants(&self, leaves: &[NodeId]) -> Result<(), String> {
        let mut expected_prev = NULL_NODE;
        let mut current = self.first_leaf_id().unwrap_or(NULL_NODE);
        for (position, &expected) in leaves.iter().enumerate() {
            if current != expected {
                return Err(format!(
                    "Leaf chain visits {} at position {} but the tree has {}",
                    current, position, expected
                ));
            }
            let leaf = self.get_leaf(current).ok_or_else(|| {
                format!("Leaf chain points at missing leaf {}", current)
            })?;
            if leaf.prev != expected_prev {
                return Err(format!(
                    "Leaf {} has prev {} but follows {}",
                    current, leaf.prev, expected_prev
                ));
            }
            expected_prev = current;
            current = leaf.next;
        }
        if current != NULL_NODE {
            return Err(format!("Leaf chain continues past the last leaf to {}", current));
        }

        let keys: Vec<Key> = self.keys().collect();
        for i in 1..keys.len() {
            if keys[i - 1] >= keys[i] {
                return Err(format!("Iterator returned unsorted keys at index {}", i));
            }
        }

        if keys.len() != self.len() {
            return Err(format!(
                "Iterator returned {} keys but tree has {} items",
                keys.len(),
                self.len()
            ));
        }

        Ok(())
    }

    /// Recursively check a node and its subtree, appending leaf ids in key order.
    fn check_node_invariants(
        &self,
        node: NodeRef,
        expected_parent: NodeId,
        is_root: bool,
        leaves: &mut Vec<NodeId>,
    ) -> TreeResult<SubtreeSummary> {
        match node {
            NodeRef::Leaf(id) => {
                let leaf = self.leaf(id)?;
                let fail = |details: String| {
                    Err(BPlusTreeError::corrupted_tree(&format!("Leaf {}", id), &details))
                };

                if leaf.parent != expected_parent {
                    return fail(format!(
                        "parent is {} but owner is {}",
                        leaf.parent, expected_parent
                    ));
                }
                if leaf.keys.len() != leaf.values.len() {
                    return fail(format!(
                        "{} keys but {} values",
                        leaf.keys.len(),
                        leaf.values.len()
                    ));
                }
                if leaf.keys.windows(2).any(|pair| pair[0] >= pair[1]) {
                    return fail("keys out of order".to_string());
                }
                if leaf.is_full() {
                    return fail(format!("{} keys at order {}", leaf.len(), self.order));
                }
                if !is_root && (leaf.is_underfull() || leaf.is_empty()) {
                    return fail(format!("underfull with {} keys", leaf.len()));
                }

                leaves.push(id);
                Ok(SubtreeSummary {
                    min_key: leaf.first_key(),
                    max_key: leaf.last_key(),
                    depth: 1,
                })
            }
            NodeRef::Internal(id) => {
                let internal = self.internal(id)?;
                let fail = |details: String| {
                    Err(BPlusTreeError::corrupted_tree(&format!("Internal {}", id), &details))
                };

                if internal.parent != expected_parent {
                    return fail(format!(
                        "parent is {} but owner is {}",
                        internal.parent, expected_parent
                    ));
                }
                if internal.keys.len() + 1 != internal.children.len() {
                    return fail(format!(
                        "{} keys but {} children",
                        internal.keys.len(),
                        internal.children.len()
                    ));
                }
                if internal.keys.windows(2).any(|pair| pair[0] >= pair[1]) {
                    return fail("keys out of order".to_string());
                }
                if internal.is_full() {
                    return fail(format!("{} keys at order {}", internal.len(), self.order));
                }
                if is_root && internal.keys.is_empty() {
                    return fail("root has a single child".to_string());
                }
                if !is_root && internal.is_underfull() {
                    return fail(format!("underfull with {} children", internal.children.len()));
                }

                let mut summaries = Vec::with_capacity(internal.children.len());
                for &child in &internal.children {
                    summaries.push(self.check_node_invariants(child, id, false, leaves)?);
                }

                if summaries.windows(2).any(|pair| pair[0].depth != pair[1].depth) {
                    return fail("children at different depths".to_string());
                }

                for (i, &separator) in internal.keys.iter().enumerate() {
                    let left = &summaries[i];
                    let right = &summaries[i + 1];
                    if right.min_key != Some(separator) {
                        return fail(format!(
                            "separator {} but right subtree starts at {:?}",
                            separator, right.min_key
                        ));
                    }
                    if left.max_key.map_or(true, |max| max >= separator) {
                        return fail(format!(
                            "separator {} but left subtree ends at {:?}",
                            separator, left.max_key
                        ));
                    }
                    if self.get(separator).is_none() {
                        return fail(format!("separator {} is not a stored key", separator));
                    }
                }

                Ok(SubtreeSummary {
                    min_key: summaries.first().and_then(|s| s.min_key),
                    max_key: summaries.last().and_then(|s| s.max_key),
                    depth: summaries.first().map_or(0, |s| s.depth) + 1,
                })
            }
        }
    }

    // ============================================================================
    // DEBUGGING AND TESTING UTILITIES
    // ============================================================================

    /// Returns the sizes of all leaf nodes (for testing/debugging).
    pub fn leaf_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::new();
        let mut current = self.first_leaf_id().unwrap_or(NULL_NODE);
        while let Some(leaf) = self.get_leaf(current) {
            sizes.push(leaf.len());
            current = leaf.next;
        }
        sizes
    }

    /// Render the tree level by level, one node per line.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplustree_index::BPlusTree;
    ///
    /// let mut tree = BPlusTree::new(4).unwrap();
    /// for key in [5, 10, 15, 20] {
    ///     tree.set(key, vec![0]).unwrap();
    /// }
    /// let dump = tree.dump();
    /// assert!(dump.contains("Internal"));
    /// assert!(dump.contains("[15, 20]"));
    /// ```
    pub fn dump(&self) -> String {
        let mut out = String::new();
        if let Some(root) = self.root {
            self.dump_node(root, 0, &mut out);
        } else {
            out.push_str("<empty>\n");
        }
        out
    }

    fn dump_node(&self, node: NodeRef, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        match node {
            NodeRef::Leaf(id) => match self.get_leaf(id) {
                Some(leaf) => {
                    let _ = writeln!(
                        out,
                        "{}Leaf[id={}, parent={}, prev={}, next={}]: {:?}",
                        indent,
                        id,
                        display_id(leaf.parent),
                        display_id(leaf.prev),
                        display_id(leaf.next),
                        leaf.keys
                    );
                }
                None => {
                    let _ = writeln!(out, "{}Leaf[id={}]: <missing>", indent, id);
                }
            },
            NodeRef::Internal(id) => match self.get_internal(id) {
                Some(internal) => {
                    let _ = writeln!(
                        out,
                        "{}Internal[id={}, parent={}]: {:?}",
                        indent,
                        id,
                        display_id(internal.parent),
                        internal.keys
                    );
                    for &child in &internal.children {
                        self.dump_node(child, depth + 1, out);
                    }
                }
                None => {
                    let _ = writeln!(out, "{}Internal[id={}]: <missing>", indent, id);
                }
            },
        }
    }

    /// Prints the node chain for debugging.
    pub fn print_node_chain(&self) {
        println!("Tree structure:");
        print!("{}", self.dump());
        println!("Leaf chain: {:?}", self.leaf_sizes());
    }
}

fn display_id(id: NodeId) -> String {
    if id == NULL_NODE {
        "-".to_string()
    } else {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use crate::types::{NodeRef, NULL_NODE};
    use crate::{BPlusTree, BPlusTreeError};

    fn tree_with(order: usize, keys: impl IntoIterator<Item = i32>) -> BPlusTree {
        let mut tree = BPlusTree::new(order).unwrap();
        for key in keys {
            tree.set(key, vec![0]).unwrap();
        }
        tree
    }

    #[test]
    fn test_valid_trees_pass() {
        assert!(BPlusTree::new(4).unwrap().check_invariants());
        assert!(tree_with(4, 0..1).check_invariants());
        assert!(tree_with(5, 0..500).check_invariants());
    }

    #[test]
    fn test_detects_stale_separator() {
        let mut tree = tree_with(4, [5, 10, 15, 20]);
        let Some(NodeRef::Internal(root_id)) = tree.root else {
            panic!("expected internal root");
        };
        tree.internal_arena.get_mut(root_id).unwrap().keys[0] = 12;
        let err = tree.check_invariants_detailed().unwrap_err();
        assert!(err.contains("separator 12"), "{err}");
    }

    #[test]
    fn test_detects_broken_chain() {
        let mut tree = tree_with(4, 0..10);
        let first = tree.first_leaf_id().unwrap();
        tree.leaf_arena.get_mut(first).unwrap().next = NULL_NODE;
        assert!(!tree.check_invariants());
    }

    #[test]
    fn test_detects_size_mismatch() {
        let mut tree = tree_with(4, 0..10);
        tree.size = 11;
        let err = tree.check_invariants_detailed().unwrap_err();
        assert!(err.contains("11 items"), "{err}");
    }

    #[test]
    #[should_panic(expected = "B+ tree invariant violated")]
    fn test_verify_panics_on_violation() {
        let mut tree = tree_with(4, 0..10);
        let first = tree.first_leaf_id().unwrap();
        tree.leaf_arena.get_mut(first).unwrap().parent = NULL_NODE;
        tree.verify();
    }

    #[test]
    fn test_validate_for_operation_reports_context() {
        let mut tree = tree_with(4, 0..10);
        assert_eq!(tree.validate_for_operation("bulk load"), Ok(()));

        tree.size = 3;
        let err = tree.validate_for_operation("bulk load").unwrap_err();
        assert!(matches!(err, BPlusTreeError::CorruptedTree(_)));
        assert!(!err.is_input_error());
        let message = err.to_string();
        assert!(message.starts_with("corrupted tree: bulk load: "), "{message}");
        assert!(message.contains("3 items"), "{message}");
    }

    #[test]
    fn test_leaf_sizes_and_dump() {
        let tree = tree_with(4, [5, 10, 15, 20, 25]);
        assert_eq!(tree.leaf_sizes(), vec![2, 3]);
        let dump = tree.dump();
        assert_eq!(dump.lines().count(), 3);
        assert!(dump.starts_with("Internal"));
        assert_eq!(BPlusTree::new(4).unwrap().dump(), "<empty>\n");
    }
}
