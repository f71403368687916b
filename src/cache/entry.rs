//! Cache Entry Module
//!
//! Defines the type-erased slot that holds a cached value.

use std::any::Any;
use std::fmt;

// == Cache Entry ==
/// A single cached value with its concrete type preserved for downcasting.
pub struct CacheEntry {
    /// The stored value
    value: Box<dyn Any + Send>,
    /// Name of the stored value's concrete type
    type_name: &'static str,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry holding `value`.
    pub fn new<V>(value: V) -> Self
    where
        V: Any + Send,
    {
        Self {
            value: Box::new(value),
            type_name: std::any::type_name::<V>(),
        }
    }

    // == Downcast ==
    /// Returns the value if it is a `T`, or `None` on a type mismatch.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Mutable counterpart of [`CacheEntry::downcast_ref`].
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.value.downcast_mut::<T>()
    }

    /// Returns true if the stored value is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Consumes the entry, returning the value if it is a `T`.
    ///
    /// On a type mismatch the entry is handed back unchanged.
    pub fn into_inner<T: Any>(self) -> Result<T, Self> {
        let type_name = self.type_name;
        match self.value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(value) => Err(Self { value, type_name }),
        }
    }

    /// Borrows the value without a concrete type.
    pub fn as_any(&self) -> &(dyn Any + Send + 'static) {
        &*self.value
    }

    /// Name of the stored value's concrete type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
            .field("type", &self.type_name)
            .finish_non_exhaustive()
    }
}
