//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the store's behavior over arbitrary keys, values and
//! operation sequences.

use proptest::prelude::*;
use std::collections::HashSet;

use crate::cache::CacheStore;

// == Strategies ==
fn text_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,16}"
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,64}"
}

/// A key drawn from one of several concrete key types
#[derive(Debug, Clone)]
enum AnyKey {
    Int(i64),
    Text(String),
    Flag(bool),
}

fn any_key_strategy() -> impl Strategy<Value = AnyKey> {
    prop_oneof![
        (0..50_i64).prop_map(AnyKey::Int),
        text_key_strategy().prop_map(AnyKey::Text),
        any::<bool>().prop_map(AnyKey::Flag),
    ]
}

impl AnyKey {
    fn set(&self, store: &mut CacheStore, value: String) {
        match self {
            AnyKey::Int(key) => store.set(*key, value),
            AnyKey::Text(key) => store.set(key.clone(), value),
            AnyKey::Flag(key) => store.set(*key, value),
        }
    }

    fn remove(&self, store: &mut CacheStore) {
        match self {
            AnyKey::Int(key) => store.remove(key),
            AnyKey::Text(key) => store.remove(key),
            AnyKey::Flag(key) => store.remove(key),
        }
    }

    fn contained(&self, store: &CacheStore) -> bool {
        match self {
            AnyKey::Int(key) => store.contains_key(key),
            AnyKey::Text(key) => store.contains_key(key),
            AnyKey::Flag(key) => store.contains_key(key),
        }
    }
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: AnyKey, value: String },
    Remove { key: AnyKey },
    SetCountLimit { limit: usize },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        4 => (any_key_strategy(), value_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        2 => any_key_strategy().prop_map(|key| CacheOp::Remove { key }),
        1 => (0..20_usize).prop_map(|limit| CacheOp::SetCountLimit { limit }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Storing a value and reading it back with its own type returns it; any
    // other type reads as absent.
    #[test]
    fn prop_typed_roundtrip(key in text_key_strategy(), value in value_strategy()) {
        let mut store = CacheStore::new();

        store.set(key.clone(), value.clone());

        prop_assert_eq!(store.get::<String, _>(&key), Some(&value));
        prop_assert_eq!(store.get::<i64, _>(&key), None);
        prop_assert_eq!(store.get::<&str, _>(&key), None);
    }

    // Removing a present key drops the count by exactly one and makes it
    // unreadable.
    #[test]
    fn prop_remove_decrements_count(
        keys in prop::collection::hash_set(0..1000_i64, 1..30),
        pick in any::<prop::sample::Index>()
    ) {
        let keys: Vec<i64> = keys.into_iter().collect();
        let mut store = CacheStore::new();
        for key in &keys {
            store.set(*key, *key);
        }

        let victim = keys[pick.index(keys.len())];
        let before = store.len();
        store.remove(&victim);

        prop_assert_eq!(store.len(), before - 1);
        prop_assert_eq!(store.get::<i64, _>(&victim), None);
    }

    // The same number as an integer key and as a text key are two entries.
    #[test]
    fn prop_cross_type_keys_distinct(number in any::<i64>()) {
        let mut store = CacheStore::new();

        store.set(number, "int");
        store.set(number.to_string(), "text");

        prop_assert_eq!(store.len(), 2);
        prop_assert_eq!(store.get::<&str, _>(&number), Some(&"int"));
        prop_assert_eq!(store.get::<&str, _>(&number.to_string()), Some(&"text"));
    }

    // Overwriting never changes the count and the last value wins.
    #[test]
    fn prop_overwrite_semantics(
        key in text_key_strategy(),
        value1 in value_strategy(),
        value2 in any::<u64>()
    ) {
        let mut store = CacheStore::new();

        store.set(key.clone(), value1);
        store.set(key.clone(), value2);

        prop_assert_eq!(store.len(), 1);
        prop_assert_eq!(store.get::<u64, _>(&key), Some(&value2));
        prop_assert_eq!(store.get::<String, _>(&key), None);
    }

    // For any operation sequence the count never exceeds a non-zero limit,
    // and the count always equals the number of distinct live keys.
    #[test]
    fn prop_capacity_enforcement(ops in prop::collection::vec(cache_op_strategy(), 1..100)) {
        let mut store = CacheStore::new();

        for op in ops {
            match op {
                CacheOp::Set { key, value } => key.set(&mut store, value),
                CacheOp::Remove { key } => key.remove(&mut store),
                CacheOp::SetCountLimit { limit } => store.set_count_limit(limit),
            }

            let limit = store.count_limit();
            prop_assert!(
                limit == 0 || store.len() <= limit,
                "Cache size {} exceeds limit {}",
                store.len(),
                limit
            );
            prop_assert_eq!(store.stats().total_entries, store.len());
        }
    }

    // Lowering the limit leaves exactly min(count, limit) entries, all of
    // which were present before.
    #[test]
    fn prop_set_count_limit_exact(
        keys in prop::collection::hash_set(text_key_strategy(), 1..40),
        limit in 1..40_usize
    ) {
        let mut store = CacheStore::new();
        for key in &keys {
            store.set(key.clone(), ());
        }

        store.set_count_limit(limit);

        prop_assert_eq!(store.len(), keys.len().min(limit));
        let survivors = keys.iter().filter(|key| store.contains_key(*key)).count();
        prop_assert_eq!(survivors, store.len());
    }

    // remove_matching on text keys never touches keys of other types.
    #[test]
    fn prop_remove_matching_is_type_scoped(
        text_keys in prop::collection::hash_set(text_key_strategy(), 0..20),
        int_keys in prop::collection::hash_set(any::<i64>(), 0..20),
        prefix in "[a-z]"
    ) {
        let mut store = CacheStore::new();
        for key in &text_keys {
            store.set(key.clone(), 0_u8);
        }
        for key in &int_keys {
            store.set(*key, 0_u8);
        }

        store.remove_matching(|key: &String| key.starts_with(prefix.as_str()));

        let kept: HashSet<&String> = text_keys
            .iter()
            .filter(|key| !key.starts_with(prefix.as_str()))
            .collect();
        prop_assert_eq!(store.len(), kept.len() + int_keys.len());
        for key in &int_keys {
            prop_assert!(AnyKey::Int(*key).contained(&store));
        }
        for key in kept {
            prop_assert!(store.contains_key(key));
        }
    }

    // A flush always empties the store, whatever its size.
    #[test]
    fn prop_flush_empties(keys in prop::collection::vec(any_key_strategy(), 0..50)) {
        let mut store = CacheStore::new();
        for key in &keys {
            key.set(&mut store, String::new());
        }

        store.flush(crate::signals::LifecycleSignal::MemoryPressure);

        prop_assert!(store.is_empty());
        for key in &keys {
            prop_assert!(!key.contained(&store));
        }
    }
}
