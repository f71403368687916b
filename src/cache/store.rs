//! Cache Store Module
//!
//! Heterogeneous key/value storage with a count limit and random eviction.

use std::any::Any;
use std::collections::HashMap;
use std::hash::Hash;

use rand::Rng;
use tracing::{debug, info};

use crate::cache::{CacheEntry, CacheStats, CommonKey, ErasedKey, KeyBox};
use crate::signals::LifecycleSignal;

// == Cache Store ==
/// Unsynchronized cache storage.
///
/// Keys may be any `Hash + Eq + Send + Sync + 'static` type and values any
/// `Any + Send` type; both can vary from entry to entry. Typed reads return
/// `None` both for a missing key and for a value of another type.
#[derive(Debug, Default)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<KeyBox, CacheEntry>,
    /// Maximum number of entries allowed, 0 = unlimited
    count_limit: usize,
    /// Activity counters
    stats: CacheStats,
}

fn as_erased<K>(key: &K) -> &(dyn ErasedKey + 'static)
where
    K: Hash + Eq + Send + Sync + 'static,
{
    key
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty store with no count limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store holding at most `count_limit` entries.
    pub fn with_count_limit(count_limit: usize) -> Self {
        Self {
            count_limit,
            ..Self::default()
        }
    }

    // == Set ==
    /// Stores `item` under `key`, replacing any value held by an equal key.
    ///
    /// If this pushes the store over its count limit, random entries are
    /// evicted until it fits.
    ///
    /// # Arguments
    /// * `key` - Any hashable key; keys of different types never collide
    /// * `item` - The value to store
    pub fn set<K, V>(&mut self, key: K, item: V)
    where
        K: Hash + Eq + Send + Sync + 'static,
        V: Any + Send,
    {
        self.insert_entry(KeyBox::new(key), CacheEntry::new(item));
    }

    fn insert_entry(&mut self, key: KeyBox, entry: CacheEntry) {
        self.entries.insert(key, entry);
        self.evict_items_if_needed();
        self.stats.set_total_entries(self.entries.len());
    }

    // == Get ==
    /// Returns the value for `key` if it exists and is a `T`.
    ///
    /// # Returns
    /// `None` for a missing key and for a value of another type. Each call
    /// counts as a hit, a miss or a type mismatch.
    pub fn get<T, K>(&mut self, key: &K) -> Option<&T>
    where
        T: Any,
        K: Hash + Eq + Send + Sync + 'static,
    {
        let entry = self.entries.get(as_erased(key));
        Self::record_read::<T>(&mut self.stats, entry);
        entry.and_then(CacheEntry::downcast_ref::<T>)
    }

    /// Mutable counterpart of [`CacheStore::get`].
    pub fn get_mut<T, K>(&mut self, key: &K) -> Option<&mut T>
    where
        T: Any,
        K: Hash + Eq + Send + Sync + 'static,
    {
        let entry = self.entries.get_mut(as_erased(key));
        Self::record_read::<T>(&mut self.stats, entry.as_deref());
        entry.and_then(CacheEntry::downcast_mut::<T>)
    }

    fn record_read<T: Any>(stats: &mut CacheStats, entry: Option<&CacheEntry>) {
        match entry {
            Some(entry) if entry.is::<T>() => stats.record_hit(),
            Some(_) => stats.record_type_mismatch(),
            None => stats.record_miss(),
        }
    }

    /// Returns true if an entry exists for `key`, whatever its value type.
    pub fn contains_key<K>(&self, key: &K) -> bool
    where
        K: Hash + Eq + Send + Sync + 'static,
    {
        self.entries.contains_key(as_erased(key))
    }

    // == Remove ==
    /// Discards the entry for `key`. Missing keys are ignored.
    pub fn remove<K>(&mut self, key: &K)
    where
        K: Hash + Eq + Send + Sync + 'static,
    {
        self.entries.remove(as_erased(key));
        self.stats.set_total_entries(self.entries.len());
    }

    /// Removes and returns the value for `key` if it is a `T`.
    ///
    /// An entry of another type is left in place.
    pub fn take<T, K>(&mut self, key: &K) -> Option<T>
    where
        T: Any,
        K: Hash + Eq + Send + Sync + 'static,
    {
        if !self.entries.get(as_erased(key))?.is::<T>() {
            return None;
        }
        let taken = self
            .entries
            .remove(as_erased(key))
            .and_then(|entry| entry.into_inner::<T>().ok());
        self.stats.set_total_entries(self.entries.len());
        taken
    }

    /// Clears the entire store.
    pub fn remove_all(&mut self) {
        self.entries.clear();
        self.stats.set_total_entries(0);
    }

    /// Removes every entry whose key is a `K` and satisfies `predicate`.
    ///
    /// Keys of any other type are never passed to the predicate and never
    /// removed.
    ///
    /// # Arguments
    /// * `predicate` - Returns true for keys to remove
    pub fn remove_matching<K, F>(&mut self, mut predicate: F)
    where
        K: Any,
        F: FnMut(&K) -> bool,
    {
        self.entries
            .retain(|key, _| !key.downcast_ref::<K>().map_or(false, &mut predicate));
        self.stats.set_total_entries(self.entries.len());
    }

    // == Common Key Accessors ==
    /// Reads the value for an integer, float or text key without a type.
    pub fn item(&self, key: impl CommonKey) -> Option<&(dyn Any + Send + 'static)> {
        self.entries
            .get(&key.into_key_box())
            .map(CacheEntry::as_any)
    }

    /// Stores `item` under an integer, float or text key, or removes the
    /// entry when `item` is `None`.
    ///
    /// # Arguments
    /// * `key` - Keyed as its own type, or as [`FloatKey`](crate::cache::FloatKey) for `f32`
    /// * `item` - `Some` behaves like [`CacheStore::set`], `None` like
    ///   [`CacheStore::remove`]
    pub fn set_item<V>(&mut self, key: impl CommonKey, item: Option<V>)
    where
        V: Any + Send,
    {
        let key = key.into_key_box();
        match item {
            Some(item) => self.insert_entry(key, CacheEntry::new(item)),
            None => {
                self.entries.remove(&key);
                self.stats.set_total_entries(self.entries.len());
            }
        }
    }

    // == Count Limit ==
    /// Maximum number of entries, 0 means unlimited.
    pub fn count_limit(&self) -> usize {
        self.count_limit
    }

    /// Changes the count limit and evicts immediately if the store is over it.
    pub fn set_count_limit(&mut self, count_limit: usize) {
        self.count_limit = count_limit;
        self.evict_items_if_needed();
        self.stats.set_total_entries(self.entries.len());
    }

    // == Eviction ==
    /// Evicts uniformly random entries until the count limit is satisfied.
    ///
    /// No-op when the limit is 0 or already met.
    pub fn evict_items_if_needed(&mut self) {
        if self.count_limit == 0 || self.entries.len() <= self.count_limit {
            return;
        }

        let mut keys: Vec<KeyBox> = self.entries.keys().cloned().collect();
        let mut rng = rand::thread_rng();
        let mut evicted = 0;

        while self.entries.len() > self.count_limit && !keys.is_empty() {
            let key = keys.swap_remove(rng.gen_range(0..keys.len()));
            self.entries.remove(&key);
            evicted += 1;
        }

        self.stats.record_evictions(evicted);
        debug!(
            evicted,
            count = self.entries.len(),
            count_limit = self.count_limit,
            "Evicted random entries"
        );
    }

    // == Flush ==
    /// Clears the store in response to a lifecycle signal.
    pub fn flush(&mut self, signal: LifecycleSignal) {
        let dropped = self.entries.len();
        self.remove_all();
        self.stats.record_flush();
        info!(%signal, dropped, "Cache flushed");
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Length ==
    /// Returns the current number of entries in the store.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
