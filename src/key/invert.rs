use crate::{
    any_accessors,
    comparable::{downcast_peer, RawComparable, Writable},
    err::Result,
    serde::{DataInput, DataOutput},
};
use std::cmp::Ordering;

/// Reverses the ordering of the wrapped value.
///
/// Both comparisons negate the result of the wrapped value instead of
/// swapping operands, so ties stay ties. Serialization is unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct InvertOrder<T> {
    entity: T,
}

impl<T: RawComparable> InvertOrder<T> {
    pub fn new(entity: T) -> Self {
        Self { entity }
    }

    pub fn get(&self) -> &T {
        &self.entity
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.entity
    }

    pub fn into_inner(self) -> T {
        self.entity
    }
}

impl<T: RawComparable> Writable for InvertOrder<T> {
    fn write(&self, out: &mut dyn DataOutput) -> Result<()> {
        self.entity.write(out)
    }

    fn read_fields(&mut self, input: &mut dyn DataInput) -> Result<()> {
        self.entity.read_fields(input)
    }
}

impl<T: RawComparable> RawComparable for InvertOrder<T> {
    fn compare_to(&self, other: &dyn RawComparable) -> Result<Ordering> {
        let other = downcast_peer::<Self>(other)?;
        Ok(self.entity.compare_to(&other.entity)?.reverse())
    }

    fn size_in_bytes(&self, bytes: &[u8], offset: usize) -> Result<usize> {
        self.entity.size_in_bytes(bytes, offset)
    }

    fn compare_in_bytes(&self, b1: &[u8], o1: usize, b2: &[u8], o2: usize) -> Result<Ordering> {
        Ok(self.entity.compare_in_bytes(b1, o1, b2, o2)?.reverse())
    }

    any_accessors!();
}
