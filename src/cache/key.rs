//! Cache Key Module
//!
//! Type-erased hashable keys so that keys of different concrete types can
//! live in the same map.

use std::any::Any;
use std::borrow::Borrow;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

// == Erased Key ==
/// Hash and equality capabilities of a key whose concrete type is erased.
///
/// Implemented for every `Hash + Eq + Send + Sync + 'static` type. Two erased
/// keys are equal only when they share a concrete type and that type's `==`
/// says so.
pub trait ErasedKey: Any + Send + Sync {
    /// Returns the key as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Hash of the underlying value, computed with a fixed hasher.
    fn key_hash(&self) -> u64;

    /// Compares against another erased key; false if the concrete types differ.
    fn key_eq(&self, other: &dyn ErasedKey) -> bool;

    /// Name of the concrete key type.
    fn key_type_name(&self) -> &'static str;
}

impl<K> ErasedKey for K
where
    K: Hash + Eq + Send + Sync + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn key_hash(&self) -> u64 {
        // DefaultHasher::new() is keyed identically every time, so boxed and
        // borrowed forms of the same key agree.
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    fn key_eq(&self, other: &dyn ErasedKey) -> bool {
        other
            .as_any()
            .downcast_ref::<K>()
            .map_or(false, |other| self == other)
    }

    fn key_type_name(&self) -> &'static str {
        std::any::type_name::<K>()
    }
}

impl Hash for dyn ErasedKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.key_hash());
    }
}

impl PartialEq for dyn ErasedKey {
    fn eq(&self, other: &Self) -> bool {
        self.key_eq(other)
    }
}

impl Eq for dyn ErasedKey {}

// == Key Box ==
/// An owned, type-erased cache key.
///
/// Captures the hash of the wrapped value at construction. Cloning is cheap
/// (the value is reference counted), which lets eviction snapshot the key set.
#[derive(Clone)]
pub struct KeyBox {
    inner: Arc<dyn ErasedKey>,
    hash: u64,
}

impl KeyBox {
    // == Constructor ==
    /// Wraps `key`, capturing its concrete type, hash and equality.
    pub fn new<K>(key: K) -> Self
    where
        K: Hash + Eq + Send + Sync + 'static,
    {
        let hash = key.key_hash();
        Self {
            inner: Arc::new(key),
            hash,
        }
    }

    /// Hash of the wrapped value. Equal boxes always return equal hashes.
    pub fn hash_value(&self) -> u64 {
        self.hash
    }

    /// Returns the wrapped value if it is a `K`.
    pub fn downcast_ref<K: Any>(&self) -> Option<&K> {
        self.erased().as_any().downcast_ref::<K>()
    }

    /// Returns true if the wrapped value is a `K`.
    pub fn is<K: Any>(&self) -> bool {
        self.erased().as_any().is::<K>()
    }

    /// Name of the wrapped value's concrete type.
    pub fn type_name(&self) -> &'static str {
        self.erased().key_type_name()
    }

    // `Arc<dyn ErasedKey>` is itself `Hash + Eq`, so method calls must go
    // through the trait object and not the Arc.
    fn erased(&self) -> &(dyn ErasedKey + 'static) {
        &*self.inner
    }
}

impl Hash for KeyBox {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl PartialEq for KeyBox {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.erased().key_eq(other.erased())
    }
}

impl Eq for KeyBox {}

impl Borrow<dyn ErasedKey> for KeyBox {
    fn borrow(&self) -> &(dyn ErasedKey + 'static) {
        self.erased()
    }
}

impl fmt::Debug for KeyBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyBox")
            .field("type", &self.type_name())
            .field("hash", &self.hash)
            .finish()
    }
}
