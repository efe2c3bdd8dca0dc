//! Variable-length integers.
//!
//! Values in `-112..=127` take a single byte holding the value itself.
//! Anything else is a lead byte followed by 1 to 8 big-endian magnitude
//! bytes. The lead byte alone tells how wide the whole encoding is and
//! whether the magnitude was one's-complemented (negative values), which
//! lets raw comparators step over a VInt without decoding it.
//!
//! ```text
//! lead byte     meaning
//! -112 ..= 127  the value itself
//! -113 ..= -120 positive, (-112 - lead) magnitude bytes follow
//! -121 ..= -128 negative, (-120 - lead) magnitude bytes follow
//! ```

use crate::{
    consts::{VINT_NEGATIVE_LEAD, VINT_SINGLE_BYTE_MIN},
    err::{Error, Result},
    serde::{DataInput, DataOutput},
    util,
};

/// Total encoded width (lead byte included) announced by `first`
pub fn decode_vint_size(first: u8) -> usize {
    let value = first as i8;
    if value >= VINT_SINGLE_BYTE_MIN {
        1
    } else if value < VINT_NEGATIVE_LEAD {
        (-119 - i32::from(value)) as usize
    } else {
        (-111 - i32::from(value)) as usize
    }
}

/// Whether the lead byte `first` belongs to a negative value
pub fn is_negative_vint(first: u8) -> bool {
    let value = first as i8;
    value < VINT_NEGATIVE_LEAD || (value >= VINT_SINGLE_BYTE_MIN && value < 0)
}

/// Number of bytes [`write_vlong`] produces for `value`
pub fn vint_size(value: i64) -> usize {
    if (i64::from(VINT_SINGLE_BYTE_MIN)..=127).contains(&value) {
        return 1;
    }
    let magnitude = if value < 0 { !value } else { value };
    let data_bits = 64 - magnitude.leading_zeros() as usize;
    (data_bits + 7) / 8 + 1
}

pub fn write_vlong<O: DataOutput + ?Sized>(out: &mut O, value: i64) -> Result<()> {
    if (i64::from(VINT_SINGLE_BYTE_MIN)..=127).contains(&value) {
        return out.write_byte(value as u8);
    }

    let (magnitude, base) = if value < 0 {
        (!value, i32::from(VINT_NEGATIVE_LEAD))
    } else {
        (value, i32::from(VINT_SINGLE_BYTE_MIN))
    };
    let width = vint_size(value) - 1;

    let mut encoded = [0u8; 9];
    encoded[0] = (base - width as i32) as u8;
    for idx in 0..width {
        let shift = (width - 1 - idx) * 8;
        encoded[idx + 1] = (magnitude >> shift) as u8;
    }
    out.write_slice(&encoded[..=width])
}

pub fn write_vint<O: DataOutput + ?Sized>(out: &mut O, value: i32) -> Result<()> {
    write_vlong(out, i64::from(value))
}

pub fn read_vlong<I: DataInput + ?Sized>(input: &mut I) -> Result<i64> {
    let first = input.read_unsigned_byte()?;
    let width = decode_vint_size(first);
    if width == 1 {
        return Ok(i64::from(first as i8));
    }
    let mut magnitude = 0i64;
    for _ in 1..width {
        magnitude = (magnitude << 8) | i64::from(input.read_unsigned_byte()?);
    }
    Ok(if is_negative_vint(first) { !magnitude } else { magnitude })
}

pub fn read_vint<I: DataInput + ?Sized>(input: &mut I) -> Result<i32> {
    let value = read_vlong(input)?;
    i32::try_from(value).map_err(|_| Error::MalformedData(format!("VInt {value} does not fit in 32 bits")))
}

/// Decodes the VInt at `bytes[offset..]`, returning the value and its encoded width
pub fn read_vlong_in_bytes(bytes: &[u8], offset: usize) -> Result<(i64, usize)> {
    let first = util::read_u8_at(bytes, offset)?;
    let width = decode_vint_size(first);
    if width == 1 {
        return Ok((i64::from(first as i8), 1));
    }
    let body = util::slice_at(bytes, offset + 1, width - 1)?;
    let magnitude = body.iter().fold(0i64, |acc, &b| (acc << 8) | i64::from(b));
    let value = if is_negative_vint(first) { !magnitude } else { magnitude };
    Ok((value, width))
}
