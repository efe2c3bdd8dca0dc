//! Structured sink and source contracts.
//!
//! [`DataOutput`] and [`DataInput`] are the two halves of the binary record
//! format every codec in this crate speaks: fixed-width primitives in
//! big-endian order plus the length-prefixed modified UTF-8 string form.
//! [`DataBuffer`](crate::buffer::DataBuffer),
//! [`BufferedFileInput`](crate::fs::BufferedFileInput) and
//! [`BufferedFileOutput`](crate::fs::BufferedFileOutput) implement them, so
//! records can be written to memory or to a file interchangeably.
//!
//! Both traits are object safe: composite keys hold their components as
//! `dyn` values and pass `&mut dyn DataOutput` / `&mut dyn DataInput` down.

use crate::{
    err::{Error, Result},
    utf,
};
use byteorder::{BigEndian, ByteOrder};

/// Sink for structured binary data
pub trait DataOutput {
    /// Appends a single byte
    fn write_byte(&mut self, value: u8) -> Result<()>;

    /// Appends all of `bytes`
    fn write_slice(&mut self, bytes: &[u8]) -> Result<()>;

    fn write_boolean(&mut self, value: bool) -> Result<()> {
        self.write_byte(u8::from(value))
    }

    fn write_short(&mut self, value: i16) -> Result<()> {
        let mut b = [0u8; 2];
        BigEndian::write_i16(&mut b, value);
        self.write_slice(&b)
    }

    /// Writes one UTF-16 code unit
    fn write_char(&mut self, value: u16) -> Result<()> {
        let mut b = [0u8; 2];
        BigEndian::write_u16(&mut b, value);
        self.write_slice(&b)
    }

    fn write_int(&mut self, value: i32) -> Result<()> {
        let mut b = [0u8; 4];
        BigEndian::write_i32(&mut b, value);
        self.write_slice(&b)
    }

    fn write_long(&mut self, value: i64) -> Result<()> {
        let mut b = [0u8; 8];
        BigEndian::write_i64(&mut b, value);
        self.write_slice(&b)
    }

    fn write_float(&mut self, value: f32) -> Result<()> {
        self.write_int(value.to_bits() as i32)
    }

    fn write_double(&mut self, value: f64) -> Result<()> {
        self.write_long(value.to_bits() as i64)
    }

    /// Writes `value` as a 16-bit length prefix followed by its modified UTF-8 body
    fn write_utf(&mut self, value: &str) -> Result<()> {
        utf::write_utf(self, value)
    }
}

/// Source of structured binary data
pub trait DataInput {
    /// Reads the next byte, or `None` once the input is exhausted.
    ///
    /// Running out of data is not an error here; it is for every other read.
    fn next_byte(&mut self) -> Result<Option<u8>>;

    /// Fills `buf` completely or fails with [`Error::EndOfData`]
    fn read_fully(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Skips up to `n` bytes that are already available and returns how many were skipped
    fn skip_bytes(&mut self, n: usize) -> Result<usize>;

    fn read_unsigned_byte(&mut self) -> Result<u8> {
        self.next_byte()?.ok_or(Error::EndOfData { required: 1 })
    }

    fn read_byte(&mut self) -> Result<i8> {
        Ok(self.read_unsigned_byte()? as i8)
    }

    fn read_boolean(&mut self) -> Result<bool> {
        Ok(self.read_unsigned_byte()? != 0)
    }

    fn read_short(&mut self) -> Result<i16> {
        let mut b = [0u8; 2];
        self.read_fully(&mut b)?;
        Ok(BigEndian::read_i16(&b))
    }

    fn read_unsigned_short(&mut self) -> Result<u16> {
        let mut b = [0u8; 2];
        self.read_fully(&mut b)?;
        Ok(BigEndian::read_u16(&b))
    }

    /// Reads one UTF-16 code unit
    fn read_char(&mut self) -> Result<u16> {
        self.read_unsigned_short()
    }

    fn read_int(&mut self) -> Result<i32> {
        let mut b = [0u8; 4];
        self.read_fully(&mut b)?;
        Ok(BigEndian::read_i32(&b))
    }

    fn read_long(&mut self) -> Result<i64> {
        let mut b = [0u8; 8];
        self.read_fully(&mut b)?;
        Ok(BigEndian::read_i64(&b))
    }

    fn read_float(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.read_int()? as u32))
    }

    fn read_double(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.read_long()? as u64))
    }

    /// Reads a string written by [`DataOutput::write_utf`] into a fresh `String`
    fn read_utf(&mut self) -> Result<String> {
        utf::read_utf(self)
    }

    /// Line-oriented reads make no sense on binary records.
    fn read_line(&mut self) -> Result<String> {
        Err(Error::Unsupported("read_line"))
    }
}

impl DataOutput for Vec<u8> {
    fn write_byte(&mut self, value: u8) -> Result<()> {
        self.push(value);
        Ok(())
    }

    fn write_slice(&mut self, bytes: &[u8]) -> Result<()> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

impl DataInput for &[u8] {
    fn next_byte(&mut self) -> Result<Option<u8>> {
        let slice: &[u8] = *self;
        match slice.split_first() {
            Some((&first, rest)) => {
                *self = rest;
                Ok(Some(first))
            }
            None => Ok(None),
        }
    }

    fn read_fully(&mut self, buf: &mut [u8]) -> Result<()> {
        let slice: &[u8] = *self;
        if slice.len() < buf.len() {
            return Err(Error::EndOfData {
                required: buf.len() - slice.len(),
            });
        }
        let (head, rest) = slice.split_at(buf.len());
        buf.copy_from_slice(head);
        *self = rest;
        Ok(())
    }

    fn skip_bytes(&mut self, n: usize) -> Result<usize> {
        let slice: &[u8] = *self;
        let n = n.min(slice.len());
        *self = &slice[n..];
        Ok(n)
    }
}
