//! Common Key Module
//!
//! Shorthand key types for the `item`/`set_item` accessors: integers, floats
//! and text.

use std::hash::{Hash, Hasher};

use crate::cache::KeyBox;

mod sealed {
    pub trait Sealed {}

    impl Sealed for i32 {}
    impl Sealed for i64 {}
    impl Sealed for f32 {}
    impl Sealed for &'static str {}
    impl Sealed for String {}
}

// == Common Key ==
/// Key types accepted by the shorthand accessors.
///
/// Integer and text keys keep their own type, so `item(k)` addresses the
/// same entry as `get(&k)` and `set_item(k, Some(v))` the same as `set(k, v)`.
/// Floats are wrapped in [`FloatKey`], since `f32` is not `Hash`.
pub trait CommonKey: sealed::Sealed {
    fn into_key_box(self) -> KeyBox;
}

impl CommonKey for i32 {
    fn into_key_box(self) -> KeyBox {
        KeyBox::new(self)
    }
}

impl CommonKey for i64 {
    fn into_key_box(self) -> KeyBox {
        KeyBox::new(self)
    }
}

impl CommonKey for f32 {
    fn into_key_box(self) -> KeyBox {
        KeyBox::new(FloatKey(self))
    }
}

impl CommonKey for &'static str {
    fn into_key_box(self) -> KeyBox {
        KeyBox::new(self)
    }
}

impl CommonKey for String {
    fn into_key_box(self) -> KeyBox {
        KeyBox::new(self)
    }
}

// == Float Key ==
/// A hashable `f32` key.
///
/// `0.0` and `-0.0` are the same key, and every NaN is the same key.
#[derive(Debug, Clone, Copy)]
pub struct FloatKey(pub f32);

impl FloatKey {
    fn canonical_bits(self) -> u32 {
        if self.0.is_nan() {
            f32::NAN.to_bits()
        } else if self.0 == 0.0 {
            0
        } else {
            self.0.to_bits()
        }
    }
}

impl From<f32> for FloatKey {
    fn from(value: f32) -> Self {
        Self(value)
    }
}

impl PartialEq for FloatKey {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_bits() == other.canonical_bits()
    }
}

impl Eq for FloatKey {}

impl Hash for FloatKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_bits().hash(state);
    }
}
