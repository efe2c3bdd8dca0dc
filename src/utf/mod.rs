//! # Modified UTF-8
//!
//! Strings travel as a 16-bit unsigned *byte* count followed by the body.
//! The body encodes each UTF-16 code unit on its own:
//!
//! ```text
//! code unit          bytes  layout
//! 0x0001 ..= 0x007F  1      0xxxxxxx
//! 0x0000, ..= 0x07FF 2      110xxxxx 10xxxxxx
//! everything else    3      1110xxxx 10xxxxxx 10xxxxxx
//! ```
//!
//! Characters outside the Basic Multilingual Plane are therefore written as
//! two independent 3-byte surrogate sequences (6 bytes), never as 4-byte
//! UTF-8. Other framework components read this layout byte for byte, so it
//! must not be "corrected".

use crate::{
    consts::{MAX_UTF_LENGTH, SIZE_OF_U16},
    err::{Error, Result},
    serde::{DataInput, DataOutput},
    util,
};
use std::cmp::Ordering;

fn encoded_len(unit: u16) -> usize {
    match unit {
        0x0001..=0x007F => 1,
        0x0000 | 0x0080..=0x07FF => 2,
        _ => 3,
    }
}

fn encode_unit(unit: u16, dst: &mut Vec<u8>) {
    match encoded_len(unit) {
        1 => dst.push(unit as u8),
        2 => {
            dst.push(0xC0 | ((unit >> 6) & 0x1F) as u8);
            dst.push(0x80 | (unit & 0x3F) as u8);
        }
        _ => {
            dst.push(0xE0 | ((unit >> 12) & 0x0F) as u8);
            dst.push(0x80 | ((unit >> 6) & 0x3F) as u8);
            dst.push(0x80 | (unit & 0x3F) as u8);
        }
    }
}

/// Decodes the code unit starting at `body[*pos]` and advances `pos` past it
fn decode_unit(body: &[u8], pos: &mut usize) -> Result<u16> {
    let start = *pos;
    let b0 = body[start];
    let (unit, width) = match b0 >> 4 {
        0x0..=0x7 => (u16::from(b0), 1),
        0xC | 0xD => {
            let b1 = continuation(body, start, 1)?;
            ((u16::from(b0 & 0x1F) << 6) | u16::from(b1 & 0x3F), 2)
        }
        0xE => {
            let b1 = continuation(body, start, 1)?;
            let b2 = continuation(body, start, 2)?;
            (
                (u16::from(b0 & 0x0F) << 12) | (u16::from(b1 & 0x3F) << 6) | u16::from(b2 & 0x3F),
                3,
            )
        }
        _ => return Err(Error::MalformedUtf { offset: start }),
    };
    *pos = start + width;
    Ok(unit)
}

fn continuation(body: &[u8], start: usize, index: usize) -> Result<u8> {
    // a sequence cut short by the declared length is as malformed as a bad byte
    match body.get(start + index) {
        Some(&b) if b & 0xC0 == 0x80 => Ok(b),
        _ => Err(Error::MalformedUtf {
            offset: start + index,
        }),
    }
}

/// Returns the body length of `value` in bytes, excluding the 2-byte prefix.
///
/// Fails with [`Error::UtfTooLong`] if the body does not fit the prefix.
pub fn utf_length(value: &str) -> Result<usize> {
    let length: usize = value.encode_utf16().map(encoded_len).sum();
    if length > MAX_UTF_LENGTH {
        return Err(Error::UtfTooLong { length });
    }
    Ok(length)
}

/// Writes `value` to `out` in the modified UTF-8 form
pub fn write_utf<O: DataOutput + ?Sized>(out: &mut O, value: &str) -> Result<()> {
    let length = utf_length(value)?;
    let mut body = Vec::with_capacity(SIZE_OF_U16 + length);
    body.extend_from_slice(&(length as u16).to_be_bytes());
    for unit in value.encode_utf16() {
        encode_unit(unit, &mut body);
    }
    out.write_slice(&body)
}

/// Writes raw UTF-16 code units, unpaired surrogates included
pub fn write_utf_units<O: DataOutput + ?Sized>(out: &mut O, units: &[u16]) -> Result<()> {
    let length: usize = units.iter().copied().map(encoded_len).sum();
    if length > MAX_UTF_LENGTH {
        return Err(Error::UtfTooLong { length });
    }
    let mut body = Vec::with_capacity(SIZE_OF_U16 + length);
    body.extend_from_slice(&(length as u16).to_be_bytes());
    for &unit in units {
        encode_unit(unit, &mut body);
    }
    out.write_slice(&body)
}

/// Reads a modified UTF-8 string into a freshly allocated `String`
pub fn read_utf<I: DataInput + ?Sized>(input: &mut I) -> Result<String> {
    let mut decoder = ModifiedUtf8Decoder::new();
    let mut value = String::new();
    decoder.decode_into(input, &mut value)?;
    Ok(value)
}

/// Reusable decoding session.
///
/// Keeps its scratch buffers between calls so decoding many records
/// does not allocate once the buffers have grown to the largest string seen.
#[derive(Debug, Default)]
pub struct ModifiedUtf8Decoder {
    bytes: Vec<u8>,
    units: Vec<u16>,
}

impl ModifiedUtf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes the next string of `input` into UTF-16 code units.
    ///
    /// Stops exactly at the declared byte count; a multi-byte sequence that
    /// crosses it is reported as malformed.
    pub fn decode_units<I: DataInput + ?Sized>(&mut self, input: &mut I) -> Result<&[u16]> {
        let length = usize::from(input.read_unsigned_short()?);
        self.bytes.clear();
        self.bytes.resize(length, 0);
        input.read_fully(&mut self.bytes)?;

        self.units.clear();
        let mut pos = 0;
        while pos < length {
            let unit = decode_unit(&self.bytes, &mut pos)?;
            self.units.push(unit);
        }
        Ok(&self.units)
    }

    /// Decodes the next string of `input`, replacing the contents of `dst`
    pub fn decode_into<I: DataInput + ?Sized>(&mut self, input: &mut I, dst: &mut String) -> Result<()> {
        let units = self.decode_units(input)?;
        dst.clear();
        for c in char::decode_utf16(units.iter().copied()) {
            dst.push(c.map_err(|_| Error::InvalidSurrogate)?);
        }
        Ok(())
    }
}

/// Size of the serialized string at `bytes[offset..]`, prefix included
pub fn utf_size_in_bytes(bytes: &[u8], offset: usize) -> Result<usize> {
    Ok(SIZE_OF_U16 + usize::from(util::read_u16_at(bytes, offset)?))
}

/// Compares two serialized strings by UTF-16 code units without decoding them into memory
pub fn compare_utf_in_bytes(b1: &[u8], o1: usize, b2: &[u8], o2: usize) -> Result<Ordering> {
    let l1 = usize::from(util::read_u16_at(b1, o1)?);
    let l2 = usize::from(util::read_u16_at(b2, o2)?);
    let body1 = util::slice_at(b1, o1 + SIZE_OF_U16, l1)?;
    let body2 = util::slice_at(b2, o2 + SIZE_OF_U16, l2)?;

    let (mut p1, mut p2) = (0, 0);
    loop {
        match (p1 < l1, p2 < l2) {
            (true, true) => {
                let u1 = decode_unit(body1, &mut p1)?;
                let u2 = decode_unit(body2, &mut p2)?;
                match u1.cmp(&u2) {
                    Ordering::Equal => continue,
                    diff => return Ok(diff),
                }
            }
            (false, true) => return Ok(Ordering::Less),
            (true, false) => return Ok(Ordering::Greater),
            (false, false) => return Ok(Ordering::Equal),
        }
    }
}

/// Orders two strings the way [`compare_utf_in_bytes`] orders their encodings
pub fn compare_utf16(a: &str, b: &str) -> Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}
