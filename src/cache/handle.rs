//! Cache Handle Module
//!
//! `KingCache` owns a [`CacheStore`] behind a mutex and keeps it subscribed to
//! lifecycle signals for as long as the handle lives.

use std::any::Any;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::cache::{CacheStats, CacheStore, CommonKey};
use crate::config::Config;
use crate::signals::{
    LifecycleSignal, LifecycleSignalSource, SignalBus, SignalHandler, Subscription,
};

// == King Cache ==
/// A cache for heterogeneous keys and values that empties itself on
/// memory pressure or when the host moves to the background.
///
/// Every operation takes the internal lock for its duration. The lock is not
/// reentrant: calling any method of the same cache from inside
/// [`KingCache::with_item`] or [`KingCache::with_item_mut`], or while a guard
/// from [`KingCache::lock`] is alive, deadlocks. Signal handlers take the same
/// lock, so posting a signal to the cache's source in those places deadlocks
/// too.
///
/// Dropping the cache unsubscribes it from its signal source.
#[derive(Debug)]
pub struct KingCache {
    store: Arc<Mutex<CacheStore>>,
    _subscriptions: Vec<Subscription>,
}

impl KingCache {
    // == Constructors ==
    /// Creates an empty, unlimited cache subscribed to [`SignalBus::global`].
    pub fn new() -> Self {
        Self::with_source(SignalBus::global())
    }

    /// Creates an empty, unlimited cache subscribed to `source`.
    pub fn with_source(source: Arc<dyn LifecycleSignalSource>) -> Self {
        Self::from_store(CacheStore::new(), source)
    }

    /// Creates a cache configured from `config`, subscribed to `source`.
    pub fn from_config(config: &Config, source: Arc<dyn LifecycleSignalSource>) -> Self {
        Self::from_store(CacheStore::with_count_limit(config.count_limit), source)
    }

    fn from_store(store: CacheStore, source: Arc<dyn LifecycleSignalSource>) -> Self {
        let store = Arc::new(Mutex::new(store));

        let weak = Arc::downgrade(&store);
        let handler: SignalHandler = Arc::new(move |signal: LifecycleSignal| {
            if let Some(store) = weak.upgrade() {
                store.lock().flush(signal);
            }
        });

        let subscriptions = LifecycleSignal::ALL
            .iter()
            .map(|&signal| {
                Subscription::register(Arc::clone(&source), signal, Arc::clone(&handler))
            })
            .collect();

        Self {
            store,
            _subscriptions: subscriptions,
        }
    }

    // == Typed Access ==
    /// Stores `item` under `key`, then evicts if over the count limit.
    ///
    /// # Arguments
    /// * `key` - Any hashable key; keys of different types never collide
    /// * `item` - The value to store, replacing any value for an equal key
    pub fn set<K, V>(&self, key: K, item: V)
    where
        K: Hash + Eq + Send + Sync + 'static,
        V: Any + Send,
    {
        self.store.lock().set(key, item);
    }

    /// Returns a clone of the value for `key` if it exists and is a `T`.
    ///
    /// # Returns
    /// `None` for a missing key and for a value of another type.
    pub fn get<T, K>(&self, key: &K) -> Option<T>
    where
        T: Any + Clone,
        K: Hash + Eq + Send + Sync + 'static,
    {
        self.store.lock().get::<T, K>(key).cloned()
    }

    /// Runs `f` on a borrowed value for `key` if it exists and is a `T`.
    ///
    /// Use this for values that are not `Clone`. The cache stays locked
    /// while `f` runs, so `f` must not call back into this cache.
    ///
    /// # Arguments
    /// * `key` - The key to look up
    /// * `f` - Receives `&T`; its result is returned
    pub fn with_item<T, K, R, F>(&self, key: &K, f: F) -> Option<R>
    where
        T: Any,
        K: Hash + Eq + Send + Sync + 'static,
        F: FnOnce(&T) -> R,
    {
        self.store.lock().get::<T, K>(key).map(f)
    }

    /// Runs `f` on the value for `key` in place if it exists and is a `T`.
    ///
    /// The cache stays locked while `f` runs, so `f` must not call back into
    /// this cache.
    ///
    /// # Arguments
    /// * `key` - The key to look up
    /// * `f` - Receives `&mut T`; its result is returned
    pub fn with_item_mut<T, K, R, F>(&self, key: &K, f: F) -> Option<R>
    where
        T: Any,
        K: Hash + Eq + Send + Sync + 'static,
        F: FnOnce(&mut T) -> R,
    {
        self.store.lock().get_mut::<T, K>(key).map(f)
    }

    /// Returns true if an entry exists for `key`, whatever its value type.
    ///
    /// # Arguments
    /// * `key` - The key to look for
    pub fn contains_key<K>(&self, key: &K) -> bool
    where
        K: Hash + Eq + Send + Sync + 'static,
    {
        self.store.lock().contains_key(key)
    }

    /// Discards the entry for `key`. Missing keys are ignored.
    pub fn remove<K>(&self, key: &K)
    where
        K: Hash + Eq + Send + Sync + 'static,
    {
        self.store.lock().remove(key);
    }

    /// Removes and returns the value for `key` if it is a `T`.
    ///
    /// An entry of another type is left in place.
    pub fn take<T, K>(&self, key: &K) -> Option<T>
    where
        T: Any,
        K: Hash + Eq + Send + Sync + 'static,
    {
        self.store.lock().take::<T, K>(key)
    }

    /// Clears the entire cache.
    pub fn remove_all(&self) {
        self.store.lock().remove_all();
    }

    /// Removes every entry whose key is a `K` and satisfies `predicate`.
    ///
    /// # Arguments
    /// * `predicate` - Called once per key of type `K`; keys of other types
    ///   are kept and never passed to it
    pub fn remove_matching<K, F>(&self, predicate: F)
    where
        K: Any,
        F: FnMut(&K) -> bool,
    {
        self.store.lock().remove_matching(predicate);
    }

    // == Common Key Accessors ==
    /// Returns a clone of the value for an integer, float or text key if it
    /// is a `T`.
    ///
    /// Same entry as [`KingCache::get`] with the same key, except that `f32`
    /// keys are looked up as [`FloatKey`](crate::cache::FloatKey).
    pub fn item<T>(&self, key: impl CommonKey) -> Option<T>
    where
        T: Any + Clone,
    {
        self.store
            .lock()
            .item(key)
            .and_then(|item| item.downcast_ref::<T>())
            .cloned()
    }

    /// Stores `item` under an integer, float or text key, or removes the
    /// entry when `item` is `None`.
    ///
    /// # Arguments
    /// * `key` - An `i32`, `i64`, `f32`, `&'static str` or `String`
    /// * `item` - `Some` behaves like [`KingCache::set`], `None` like
    ///   [`KingCache::remove`]
    pub fn set_item<V>(&self, key: impl CommonKey, item: Option<V>)
    where
        V: Any + Send,
    {
        self.store.lock().set_item(key, item);
    }

    // == Count Limit ==
    /// Maximum number of entries, 0 means unlimited.
    pub fn count_limit(&self) -> usize {
        self.store.lock().count_limit()
    }

    /// Changes the count limit, evicting immediately if over it.
    ///
    /// # Arguments
    /// * `count_limit` - New maximum number of entries, 0 for unlimited
    pub fn set_count_limit(&self, count_limit: usize) {
        self.store.lock().set_count_limit(count_limit);
    }

    /// Evicts uniformly random entries until the count limit is met.
    pub fn evict_items_if_needed(&self) {
        self.store.lock().evict_items_if_needed();
    }

    // == Inspection ==
    /// Number of entries in the cache.
    pub fn count(&self) -> usize {
        self.store.lock().len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }

    /// Returns a snapshot of the cache's activity counters.
    pub fn stats(&self) -> CacheStats {
        self.store.lock().stats()
    }

    /// Locks the store for borrowed access or several operations in a row.
    ///
    /// Any other call on this cache blocks until the guard is dropped,
    /// including a signal handler flushing it.
    pub fn lock(&self) -> MutexGuard<'_, CacheStore> {
        self.store.lock()
    }
}

impl Default for KingCache {
    fn default() -> Self {
        Self::new()
    }
}
