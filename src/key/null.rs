use crate::{
    any_accessors,
    comparable::{downcast_peer, RawComparable, Writable},
    err::Result,
    serde::{DataInput, DataOutput},
};
use std::cmp::Ordering;

/// The zero-size value.
///
/// Writes nothing, reads nothing and is equal to every other `NullValue`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NullValue;

impl Writable for NullValue {
    fn write(&self, _out: &mut dyn DataOutput) -> Result<()> {
        Ok(())
    }

    fn read_fields(&mut self, _input: &mut dyn DataInput) -> Result<()> {
        Ok(())
    }
}

impl RawComparable for NullValue {
    fn compare_to(&self, other: &dyn RawComparable) -> Result<Ordering> {
        downcast_peer::<Self>(other)?;
        Ok(Ordering::Equal)
    }

    fn size_in_bytes(&self, _bytes: &[u8], _offset: usize) -> Result<usize> {
        Ok(0)
    }

    fn compare_in_bytes(&self, _b1: &[u8], _o1: usize, _b2: &[u8], _o2: usize) -> Result<Ordering> {
        Ok(Ordering::Equal)
    }

    any_accessors!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{comparable::to_bytes, value::IntValue};
    use test_log::test;

    #[test]
    fn serializes_to_nothing() -> crate::Result<()> {
        assert!(to_bytes(&NullValue)?.is_empty());
        assert_eq!(NullValue.size_in_bytes(&[1, 2, 3], 1)?, 0);
        assert_eq!(NullValue.compare_in_bytes(&[], 0, &[9], 1)?, Ordering::Equal);
        assert_eq!(NullValue.compare_to(&NullValue)?, Ordering::Equal);
        Ok(())
    }

    #[test]
    fn only_comparable_to_itself() {
        let err = NullValue.compare_to(&IntValue::new(0)).unwrap_err();
        assert!(err.is_usage_error());
    }
}
