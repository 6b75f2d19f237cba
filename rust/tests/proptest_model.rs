use std::collections::BTreeMap;

use bplustree_index::BPlusTree;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Set(i32, Vec<u8>),
    Delete(i32),
    Range(i32, i32),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let key = -40i32..40;
    prop_oneof![
        3 => (key.clone(), prop::collection::vec(any::<u8>(), 0..12))
            .prop_map(|(k, v)| Op::Set(k, v)),
        2 => key.clone().prop_map(Op::Delete),
        1 => (key.clone(), key).prop_map(|(a, b)| Op::Range(a, b)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn tree_matches_btreemap(
        order in 3usize..9,
        ops in prop::collection::vec(op_strategy(), 1..200),
    ) {
        let mut tree = BPlusTree::new(order).unwrap();
        let mut reference: BTreeMap<i32, Vec<u8>> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Set(key, value) => {
                    tree.set(key, value.clone()).unwrap();
                    reference.insert(key, value);
                }
                Op::Delete(key) => {
                    tree.delete(key).unwrap();
                    reference.remove(&key);
                    prop_assert_eq!(tree.get(key), None);
                }
                Op::Range(a, b) => {
                    let expected: Vec<&[u8]> = if a < b {
                        reference.range(a..b).map(|(_, v)| v.as_slice()).collect()
                    } else {
                        Vec::new()
                    };
                    prop_assert_eq!(tree.get_range(a, b), expected);
                }
            }
            prop_assert_eq!(tree.check_invariants_detailed(), Ok(()));
            prop_assert_eq!(tree.len(), reference.len());
        }

        let items: Vec<(i32, &[u8])> = tree.items().collect();
        let expected: Vec<(i32, &[u8])> =
            reference.iter().map(|(k, v)| (*k, v.as_slice())).collect();
        prop_assert_eq!(items, expected);
    }

    #[test]
    fn delete_is_idempotent(keys in prop::collection::btree_set(-100i32..100, 0..60), target in -100i32..100) {
        let mut tree = BPlusTree::new(4).unwrap();
        for &key in &keys {
            tree.set(key, vec![0]).unwrap();
        }
        tree.delete(target).unwrap();
        let after_first = tree.dump();
        let len = tree.len();
        tree.delete(target).unwrap();
        prop_assert_eq!(tree.dump(), after_first);
        prop_assert_eq!(tree.len(), len);
        prop_assert_eq!(len, keys.len() - usize::from(keys.contains(&target)));
    }
}
