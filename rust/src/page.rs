//! Declared on-disk page layout.
//!
//! No page is encoded or decoded here. The constants describe the format a
//! future page serializer must honour, and [`check_value_fits`] enforces the
//! one constraint the in-memory tree already depends on: a full leaf of
//! `order` entries must fit in a single page.
//!
//! Internal page header: order, parent id, key count, child count.
//! Leaf page header: order, parent id, prev id, next id, key count, value count.
//! Every header field, key and child id is 4 bytes.

use crate::error::{BPlusTreeError, TreeResult};

/// Size of one page in bytes.
pub const PAGE_SIZE: usize = 4096;

/// Width of every fixed header field (order, ids, counts).
pub const FIELD_SIZE: usize = 4;

/// Width of an encoded key.
pub const KEY_SIZE: usize = std::mem::size_of::<i32>();

/// Width of an encoded child page id.
pub const CHILD_ID_SIZE: usize = FIELD_SIZE;

/// Header of an internal page.
pub const INTERNAL_HEADER_SIZE: usize = 4 * FIELD_SIZE;

/// Header of a leaf page.
pub const LEAF_HEADER_SIZE: usize = 6 * FIELD_SIZE;

/// Largest order for which a leaf of empty values still fits a page.
pub const MAX_ORDER: usize = (PAGE_SIZE - LEAF_HEADER_SIZE) / KEY_SIZE;

/// Bytes a full leaf of `order` entries needs when every value is `value_len` long.
pub fn leaf_page_bytes(order: usize, value_len: usize) -> usize {
    order
        .saturating_mul(KEY_SIZE.saturating_add(value_len))
        .saturating_add(LEAF_HEADER_SIZE)
}

/// Bytes a full internal node of `order` separators needs.
pub fn internal_page_bytes(order: usize) -> usize {
    INTERNAL_HEADER_SIZE + order * KEY_SIZE + (order + 1) * CHILD_ID_SIZE
}

/// Largest value length accepted at `order`, or `None` when even keys alone overflow.
pub fn max_value_len(order: usize) -> Option<usize> {
    if order == 0 {
        return None;
    }
    let per_entry = PAGE_SIZE.checked_sub(LEAF_HEADER_SIZE)? / order;
    per_entry.checked_sub(KEY_SIZE)
}

/// Reject a value that could not be stored `order` times in one leaf page.
pub fn check_value_fits(order: usize, value_len: usize) -> TreeResult<()> {
    if leaf_page_bytes(order, value_len) > PAGE_SIZE {
        return Err(BPlusTreeError::ValueTooLarge {
            len: value_len,
            max: max_value_len(order).unwrap_or(0),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_sizes() {
        assert_eq!(INTERNAL_HEADER_SIZE, 16);
        assert_eq!(LEAF_HEADER_SIZE, 24);
        assert_eq!(KEY_SIZE, 4);
        assert_eq!(MAX_ORDER, 1018);
    }

    #[test]
    fn test_value_bound_is_exact() {
        // 4 * (4 + 1014) + 24 == 4096
        assert_eq!(max_value_len(4), Some(1014));
        assert!(check_value_fits(4, 1014).is_ok());
        assert_eq!(
            check_value_fits(4, 1015),
            Err(BPlusTreeError::ValueTooLarge { len: 1015, max: 1014 })
        );
    }

    #[test]
    fn test_max_order_accepts_only_empty_values() {
        assert_eq!(max_value_len(MAX_ORDER), Some(0));
        assert!(check_value_fits(MAX_ORDER, 0).is_ok());
        assert!(check_value_fits(MAX_ORDER, 1).is_err());
        assert_eq!(max_value_len(MAX_ORDER + 1), None);
    }

    #[test]
    fn test_internal_pages_fit_at_common_orders() {
        assert!(internal_page_bytes(16) <= PAGE_SIZE);
        assert!(internal_page_bytes(500) <= PAGE_SIZE);
    }

    #[test]
    fn test_huge_value_does_not_overflow_arithmetic() {
        assert!(check_value_fits(16, usize::MAX).is_err());
    }
}
