//! Leaf values that composite keys are built from.

use crate::{
    any_accessors,
    comparable::{downcast_peer, RawComparable, Writable},
    consts::{SIZE_OF_U32, SIZE_OF_U64, SIZE_OF_U8},
    err::Result,
    serde::{DataInput, DataOutput},
    utf::{self, ModifiedUtf8Decoder},
    util,
};
use std::{cmp::Ordering, fmt};

/// One byte, `0` for false; false orders first
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BooleanValue(bool);

impl BooleanValue {
    pub fn new(value: bool) -> Self {
        Self(value)
    }

    pub fn get(&self) -> bool {
        self.0
    }

    pub fn set(&mut self, value: bool) {
        self.0 = value;
    }
}

impl Writable for BooleanValue {
    fn write(&self, out: &mut dyn DataOutput) -> Result<()> {
        out.write_boolean(self.0)
    }

    fn read_fields(&mut self, input: &mut dyn DataInput) -> Result<()> {
        self.0 = input.read_boolean()?;
        Ok(())
    }
}

impl RawComparable for BooleanValue {
    fn compare_to(&self, other: &dyn RawComparable) -> Result<Ordering> {
        Ok(self.0.cmp(&downcast_peer::<Self>(other)?.0))
    }

    fn size_in_bytes(&self, _bytes: &[u8], _offset: usize) -> Result<usize> {
        Ok(SIZE_OF_U8)
    }

    fn compare_in_bytes(&self, b1: &[u8], o1: usize, b2: &[u8], o2: usize) -> Result<Ordering> {
        let v1 = util::read_u8_at(b1, o1)? != 0;
        let v2 = util::read_u8_at(b2, o2)? != 0;
        Ok(v1.cmp(&v2))
    }

    any_accessors!();
}

/// Signed 32-bit integer, 4 bytes big-endian
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IntValue(i32);

impl IntValue {
    pub fn new(value: i32) -> Self {
        Self(value)
    }

    pub fn get(&self) -> i32 {
        self.0
    }

    pub fn set(&mut self, value: i32) {
        self.0 = value;
    }
}

impl Writable for IntValue {
    fn write(&self, out: &mut dyn DataOutput) -> Result<()> {
        out.write_int(self.0)
    }

    fn read_fields(&mut self, input: &mut dyn DataInput) -> Result<()> {
        self.0 = input.read_int()?;
        Ok(())
    }
}

impl RawComparable for IntValue {
    fn compare_to(&self, other: &dyn RawComparable) -> Result<Ordering> {
        Ok(self.0.cmp(&downcast_peer::<Self>(other)?.0))
    }

    fn size_in_bytes(&self, _bytes: &[u8], _offset: usize) -> Result<usize> {
        Ok(SIZE_OF_U32)
    }

    fn compare_in_bytes(&self, b1: &[u8], o1: usize, b2: &[u8], o2: usize) -> Result<Ordering> {
        Ok(util::read_i32_at(b1, o1)?.cmp(&util::read_i32_at(b2, o2)?))
    }

    any_accessors!();
}

/// Signed 64-bit integer, 8 bytes big-endian
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LongValue(i64);

impl LongValue {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get(&self) -> i64 {
        self.0
    }

    pub fn set(&mut self, value: i64) {
        self.0 = value;
    }
}

impl Writable for LongValue {
    fn write(&self, out: &mut dyn DataOutput) -> Result<()> {
        out.write_long(self.0)
    }

    fn read_fields(&mut self, input: &mut dyn DataInput) -> Result<()> {
        self.0 = input.read_long()?;
        Ok(())
    }
}

impl RawComparable for LongValue {
    fn compare_to(&self, other: &dyn RawComparable) -> Result<Ordering> {
        Ok(self.0.cmp(&downcast_peer::<Self>(other)?.0))
    }

    fn size_in_bytes(&self, _bytes: &[u8], _offset: usize) -> Result<usize> {
        Ok(SIZE_OF_U64)
    }

    fn compare_in_bytes(&self, b1: &[u8], o1: usize, b2: &[u8], o2: usize) -> Result<Ordering> {
        Ok(util::read_i64_at(b1, o1)?.cmp(&util::read_i64_at(b2, o2)?))
    }

    any_accessors!();
}

/// Text in the modified UTF-8 form, ordered by UTF-16 code units.
///
/// Reading reuses both the string allocation and the decoder's scratch
/// buffers, so one instance can be refilled record after record.
#[derive(Default)]
pub struct StringValue {
    value: String,
    decoder: ModifiedUtf8Decoder,
}

impl StringValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            decoder: ModifiedUtf8Decoder::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn set(&mut self, value: &str) {
        self.value.clear();
        self.value.push_str(value);
    }
}

impl Clone for StringValue {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl PartialEq for StringValue {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for StringValue {}

impl fmt::Debug for StringValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StringValue").field(&self.value).finish()
    }
}

impl Writable for StringValue {
    fn write(&self, out: &mut dyn DataOutput) -> Result<()> {
        out.write_utf(&self.value)
    }

    fn read_fields(&mut self, input: &mut dyn DataInput) -> Result<()> {
        self.decoder.decode_into(input, &mut self.value)
    }
}

impl RawComparable for StringValue {
    fn compare_to(&self, other: &dyn RawComparable) -> Result<Ordering> {
        Ok(utf::compare_utf16(&self.value, &downcast_peer::<Self>(other)?.value))
    }

    fn size_in_bytes(&self, bytes: &[u8], offset: usize) -> Result<usize> {
        utf::utf_size_in_bytes(bytes, offset)
    }

    fn compare_in_bytes(&self, b1: &[u8], o1: usize, b2: &[u8], o2: usize) -> Result<Ordering> {
        utf::compare_utf_in_bytes(b1, o1, b2, o2)
    }

    any_accessors!();
}
