//! # Raw comparison contract
//!
//! A [`RawComparable`] can be ordered in two ways that must always agree in
//! sign:
//!
//! - structurally, on deserialized values ([`RawComparable::compare_to`])
//! - directly on serialized bytes ([`RawComparable::compare_in_bytes`])
//!
//! [`RawComparable::size_in_bytes`] reports how many bytes [`Writable::write`]
//! produced for the value stored at an offset, without decoding it. Composite
//! keys use it to find where their next component starts.
//!
//! Composite keys hold components as `dyn RawComparable`, so comparing two
//! values first downcasts the peer with [`downcast_peer`]. Comparing values
//! of different concrete types is a usage error.

use crate::{
    err::{Error, Result},
    serde::{DataInput, DataOutput},
    util,
};
use std::{
    any::{self, Any},
    cmp::Ordering,
    fmt::Debug,
};

/// A value with a binary form
pub trait Writable {
    fn write(&self, out: &mut dyn DataOutput) -> Result<()>;

    /// Replaces the contents of `self` with the next value read from `input`
    fn read_fields(&mut self, input: &mut dyn DataInput) -> Result<()>;
}

/// A [`Writable`] that can be compared without deserialization
pub trait RawComparable: Writable + Any + Debug {
    /// Structural comparison against a value of the same concrete type
    fn compare_to(&self, other: &dyn RawComparable) -> Result<Ordering>;

    /// Length of the serialized value starting at `bytes[offset]`
    fn size_in_bytes(&self, bytes: &[u8], offset: usize) -> Result<usize>;

    /// Compares the serialized values starting at `b1[o1]` and `b2[o2]`
    fn compare_in_bytes(&self, b1: &[u8], o1: usize, b2: &[u8], o2: usize) -> Result<Ordering>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn type_name(&self) -> &'static str {
        any::type_name::<Self>()
    }
}

/// Views `other` as the concrete type `T`, failing with [`Error::IncompatibleTypes`] otherwise
pub fn downcast_peer<T: RawComparable>(other: &dyn RawComparable) -> Result<&T> {
    other
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| Error::IncompatibleTypes {
            expected: any::type_name::<T>(),
            actual: other.type_name(),
        })
}

/// Serializes `value` into a fresh byte vector
pub fn to_bytes<W: Writable + ?Sized>(value: &W) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    value.write(&mut out)?;
    Ok(out)
}

/// Replaces the contents of `value` with the record serialized in `bytes`
pub fn read_from_bytes<W: Writable + ?Sized>(value: &mut W, mut bytes: &[u8]) -> Result<()> {
    value.read_fields(&mut bytes)
}

/// Comparator over serialized records.
///
/// `b1[s1..s1 + l1]` and `b2[s2..s2 + l2]` each hold exactly one record.
pub trait RawComparator {
    #[allow(clippy::too_many_arguments)]
    fn compare(&self, b1: &[u8], s1: usize, l1: usize, b2: &[u8], s2: usize, l2: usize) -> Result<Ordering>;
}

/// [`RawComparator`] that delegates to a prototype key's [`RawComparable::compare_in_bytes`]
#[derive(Debug, Default)]
pub struct KeyComparator<K> {
    prototype: K,
}

impl<K: RawComparable> KeyComparator<K> {
    pub fn new(prototype: K) -> Self {
        Self { prototype }
    }

    pub fn prototype(&self) -> &K {
        &self.prototype
    }
}

impl<K: RawComparable> RawComparator for KeyComparator<K> {
    fn compare(&self, b1: &[u8], s1: usize, l1: usize, b2: &[u8], s2: usize, l2: usize) -> Result<Ordering> {
        let b1 = util::slice_at(b1, 0, s1 + l1)?;
        let b2 = util::slice_at(b2, 0, s2 + l2)?;
        self.prototype.compare_in_bytes(b1, s1, b2, s2)
    }
}

/// Orders records as unsigned byte strings
#[derive(Clone, Copy, Debug, Default)]
pub struct LexicographicComparator;

impl RawComparator for LexicographicComparator {
    fn compare(&self, b1: &[u8], s1: usize, l1: usize, b2: &[u8], s2: usize, l2: usize) -> Result<Ordering> {
        Ok(util::slice_at(b1, s1, l1)?.cmp(util::slice_at(b2, s2, l2)?))
    }
}

impl<C: RawComparator + ?Sized> RawComparator for &C {
    fn compare(&self, b1: &[u8], s1: usize, l1: usize, b2: &[u8], s2: usize, l2: usize) -> Result<Ordering> {
        (**self).compare(b1, s1, l1, b2, s2, l2)
    }
}

impl<C: RawComparator + ?Sized> RawComparator for Box<C> {
    fn compare(&self, b1: &[u8], s1: usize, l1: usize, b2: &[u8], s2: usize, l2: usize) -> Result<Ordering> {
        (**self).compare(b1, s1, l1, b2, s2, l2)
    }
}
