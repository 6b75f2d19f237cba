//! Bounded insert/remove helpers over the ordered sequences inside nodes.
//!
//! `Vec::insert` and `Vec::remove` panic on a bad index. Node mutation paths go
//! through these helpers instead so a broken index surfaces as an error.

use crate::error::{BPlusTreeError, TreeResult};

/// Insert `value` at `index`, refusing to grow `seq` beyond `bound` elements.
#[inline]
pub(crate) fn insert_at<T>(seq: &mut Vec<T>, index: usize, value: T, bound: usize) -> TreeResult<()> {
    if index > seq.len() {
        return Err(BPlusTreeError::IndexOutOfBounds {
            index,
            len: seq.len(),
        });
    }
    if seq.len() >= bound {
        return Err(BPlusTreeError::CapacityExceeded { capacity: bound });
    }
    seq.insert(index, value);
    Ok(())
}

/// Remove and return the element at `index`.
#[inline]
pub(crate) fn remove_at<T>(seq: &mut Vec<T>, index: usize) -> TreeResult<T> {
    if index >= seq.len() {
        return Err(BPlusTreeError::IndexOutOfBounds {
            index,
            len: seq.len(),
        });
    }
    Ok(seq.remove(index))
}

/// Remove and return the last element.
#[inline]
pub(crate) fn pop_last<T>(seq: &mut Vec<T>) -> TreeResult<T> {
    seq.pop()
        .ok_or(BPlusTreeError::IndexOutOfBounds { index: 0, len: 0 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_order_of_neighbours() {
        let mut seq = vec![1, 3, 4];
        insert_at(&mut seq, 1, 2, 8).unwrap();
        insert_at(&mut seq, 4, 5, 8).unwrap();
        insert_at(&mut seq, 0, 0, 8).unwrap();
        assert_eq!(seq, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_insert_rejects_bad_index_and_overflow() {
        let mut seq = vec![1, 2];
        assert_eq!(
            insert_at(&mut seq, 3, 9, 8),
            Err(BPlusTreeError::IndexOutOfBounds { index: 3, len: 2 })
        );
        assert_eq!(
            insert_at(&mut seq, 0, 9, 2),
            Err(BPlusTreeError::CapacityExceeded { capacity: 2 })
        );
        assert_eq!(seq, vec![1, 2]);
    }

    #[test]
    fn test_remove_and_pop() {
        let mut seq = vec![10, 20, 30];
        assert_eq!(remove_at(&mut seq, 1), Ok(20));
        assert_eq!(
            remove_at(&mut seq, 2),
            Err(BPlusTreeError::IndexOutOfBounds { index: 2, len: 2 })
        );
        assert_eq!(pop_last(&mut seq), Ok(30));
        assert_eq!(pop_last(&mut seq), Ok(10));
        assert!(pop_last(&mut seq).is_err());
    }
}
