//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the store's byte accounting and eviction order.

use proptest::prelude::*;
use std::collections::HashMap;

use crate::cache::{ByteView, CacheStore};

// == Strategies ==
/// Generates valid cache keys
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,16}"
}

/// Generates cache values
fn value_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..64)
}

#[derive(Debug, Clone)]
enum StoreOp {
    Add { key: String, value: Vec<u8> },
    Get { key: String },
    Delete { key: String },
}

fn store_op_strategy() -> impl Strategy<Value = StoreOp> {
    prop_oneof![
        (key_strategy(), value_strategy()).prop_map(|(key, value)| StoreOp::Add { key, value }),
        key_strategy().prop_map(|key| StoreOp::Get { key }),
        key_strategy().prop_map(|key| StoreOp::Delete { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Byte usage never exceeds capacity and always equals the sum of resident charges.
    #[test]
    fn prop_capacity_enforcement(
        max_bytes in 1u64..256,
        ops in prop::collection::vec(store_op_strategy(), 1..100)
    ) {
        let mut store = CacheStore::new(max_bytes);
        let mut resident: HashMap<String, usize> = HashMap::new();

        for op in ops {
            match op {
                StoreOp::Add { key, value } => {
                    resident.insert(key.clone(), key.len() + value.len());
                    store.add(&key, ByteView::from(value));
                }
                StoreOp::Get { key } => {
                    let _ = store.get(&key);
                }
                StoreOp::Delete { key } => {
                    store.delete(&key);
                }
            }
            prop_assert!(
                store.used_bytes() <= max_bytes,
                "used {} exceeds max {}",
                store.used_bytes(),
                max_bytes
            );
        }

        // Recompute the charge of whatever survived.
        let expected: usize = resident
            .iter()
            .filter(|(key, _)| store.get(key).is_some())
            .map(|(_, charge)| *charge)
            .sum();
        prop_assert_eq!(store.used_bytes(), expected as u64);
    }

    // Filling the store and adding one more entry evicts the oldest entry only.
    #[test]
    fn prop_lru_eviction_order(
        keys in prop::collection::hash_set("[a-z]{4}", 2..10),
        new_key in "[A-Z]{4}",
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        // Every entry charges 4 + 4 bytes.
        let mut store = CacheStore::new(8 * keys.len() as u64);
        for key in &keys {
            store.add(key, ByteView::from("vvvv"));
        }

        store.add(&new_key, ByteView::from("vvvv"));

        prop_assert_eq!(store.len(), keys.len());
        prop_assert!(store.get(&keys[0]).is_none());
        for key in keys.iter().skip(1) {
            prop_assert!(store.get(key).is_some(), "key {} should survive", key);
        }
        prop_assert!(store.get(&new_key).is_some());
    }

    // Reading an entry moves it out of the next eviction's path.
    #[test]
    fn prop_lru_access_tracking(
        keys in prop::collection::hash_set("[a-z]{4}", 3..8),
        access_index in 0usize..100,
        new_key in "[A-Z]{4}",
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        let mut store = CacheStore::new(8 * keys.len() as u64);
        for key in &keys {
            store.add(key, ByteView::from("vvvv"));
        }

        let accessed = keys[access_index % keys.len()].clone();
        prop_assert!(store.get(&accessed).is_some());
        store.add(&new_key, ByteView::from("vvvv"));

        prop_assert!(store.get(&accessed).is_some(), "accessed key was evicted");

        let expected_victim = keys.iter().find(|k| **k != accessed).cloned().unwrap();
        prop_assert!(store.get(&expected_victim).is_none());
    }
}
