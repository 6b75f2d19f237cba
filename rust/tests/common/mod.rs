#![allow(dead_code)]

use std::sync::Once;

use bplustree_index::BPlusTree;
use tracing_subscriber::EnvFilter;

/// Install a test subscriber once. Set `RUST_LOG=bplustree_index=trace` to
/// see splits and merges as they happen.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("bplustree_index=warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_ansi(false)
            .try_init();
    });
}

/// Value stored under `key` by the helpers below.
pub fn value_for(key: i32) -> Vec<u8> {
    format!("v{}", key).into_bytes()
}

/// Build a tree of `order` holding `keys`, inserted in the given order.
pub fn tree_with_keys(order: usize, keys: impl IntoIterator<Item = i32>) -> BPlusTree {
    let mut tree = BPlusTree::new(order).unwrap();
    for key in keys {
        tree.set(key, value_for(key)).unwrap();
    }
    tree
}

/// Collect the values returned by a scan as owned strings.
pub fn as_strings(values: Vec<&[u8]>) -> Vec<String> {
    values
        .into_iter()
        .map(|value| String::from_utf8_lossy(value).into_owned())
        .collect()
}
