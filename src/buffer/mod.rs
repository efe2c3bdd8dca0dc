//! # Data Buffer
//!
//! A growable in-memory byte store that is a [`DataOutput`] and a
//! [`DataInput`] at the same time.
//!
//! ```text
//! 0             read_cursor         write_cursor            capacity
//! +-----------------+-------------------+-----------------------+
//! |    consumed     |  readable bytes   |      free space       |
//! +-----------------+-------------------+-----------------------+
//! ```
//!
//! Reads never pass the write cursor. Writes past the capacity move the
//! written prefix `[0, write_cursor)` into a larger array of
//! `max(required, floor(capacity * factor) + 1, 256)` bytes. Reads never grow
//! the buffer.
//!
//! Multi-byte values are assembled and disassembled by hand in big-endian
//! order, so the layout matches what raw comparators read from byte slices.

use crate::{
    consts::{DEFAULT_EXPANSION_FACTOR, MIN_BUFFER_CAPACITY},
    err::{Error, Result},
    serde::{DataInput, DataOutput},
};
use std::io;

#[derive(Clone, Debug)]
pub struct DataBuffer {
    buffer: Vec<u8>,
    read_cursor: usize,
    write_cursor: usize,
    expansion_factor: f64,
}

impl Default for DataBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl DataBuffer {
    /// Creates an empty buffer; the first write allocates
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(initial_capacity: usize) -> Self {
        Self::with_expansion(initial_capacity, DEFAULT_EXPANSION_FACTOR)
    }

    /// Creates a buffer that grows by `expansion_factor` (at least 1.0)
    pub fn with_expansion(initial_capacity: usize, expansion_factor: f64) -> Self {
        Self {
            buffer: vec![0; initial_capacity],
            read_cursor: 0,
            write_cursor: 0,
            expansion_factor: expansion_factor.max(1.0),
        }
    }

    /// The whole backing array, including bytes outside the readable window.
    ///
    /// The reference is invalidated by the next write that grows the buffer
    /// and by [`DataBuffer::reset_with`].
    pub fn data(&self) -> &[u8] {
        &self.buffer
    }

    /// Mutable view of the backing array, for filling in place before [`DataBuffer::reset`]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    /// The bytes between the read and the write cursor
    pub fn readable(&self) -> &[u8] {
        &self.buffer[self.read_cursor..self.write_cursor]
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    pub fn read_position(&self) -> usize {
        self.read_cursor
    }

    pub fn write_position(&self) -> usize {
        self.write_cursor
    }

    pub fn read_remaining(&self) -> usize {
        self.write_cursor - self.read_cursor
    }

    /// Re-anchors both cursors over the current backing array.
    ///
    /// The readable window becomes `[offset, offset + length)`. Fails with
    /// [`Error::InvalidWindow`] and leaves the buffer untouched if the window
    /// does not fit into the current capacity.
    pub fn reset(&mut self, offset: usize, length: usize) -> Result<()> {
        let end = check_window(offset, length, self.buffer.len())?;
        self.read_cursor = offset;
        self.write_cursor = end;
        Ok(())
    }

    /// Replaces the backing array and exposes `[offset, offset + length)` of it.
    ///
    /// The current array is kept if the window does not fit into `bytes`.
    pub fn reset_with(&mut self, bytes: Vec<u8>, offset: usize, length: usize) -> Result<()> {
        let end = check_window(offset, length, bytes.len())?;
        self.buffer = bytes;
        self.read_cursor = offset;
        self.write_cursor = end;
        Ok(())
    }

    /// Empties the buffer, keeping its capacity
    pub fn clear(&mut self) {
        self.read_cursor = 0;
        self.write_cursor = 0;
    }

    /// Grows the backing array so that it holds at least `required` bytes
    pub fn ensure_capacity(&mut self, required: usize) {
        if required > self.buffer.len() {
            self.expand(required);
        }
    }

    fn expand(&mut self, required: usize) {
        let grown = (self.buffer.len() as f64 * self.expansion_factor) as usize + 1;
        let capacity = required.max(grown).max(MIN_BUFFER_CAPACITY);
        log::trace!("expanding data buffer: {}->{} bytes", self.buffer.len(), capacity);

        let mut expanded = vec![0; capacity];
        expanded[..self.write_cursor].copy_from_slice(&self.buffer[..self.write_cursor]);
        self.buffer = expanded;
    }

    /// Makes room for `n` more bytes and returns the offset they start at
    fn prepare_write(&mut self, n: usize) -> usize {
        let start = self.write_cursor;
        self.ensure_capacity(start + n);
        self.write_cursor = start + n;
        start
    }

    /// Consumes `n` readable bytes and returns the offset they start at
    fn prepare_read(&mut self, n: usize) -> Result<usize> {
        let remaining = self.read_remaining();
        if remaining < n {
            return Err(Error::EndOfData {
                required: n - remaining,
            });
        }
        let start = self.read_cursor;
        self.read_cursor = start + n;
        Ok(start)
    }
}

impl DataOutput for DataBuffer {
    fn write_byte(&mut self, value: u8) -> Result<()> {
        let at = self.prepare_write(1);
        self.buffer[at] = value;
        Ok(())
    }

    fn write_slice(&mut self, bytes: &[u8]) -> Result<()> {
        let at = self.prepare_write(bytes.len());
        self.buffer[at..at + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    fn write_short(&mut self, value: i16) -> Result<()> {
        self.write_char(value as u16)
    }

    fn write_char(&mut self, value: u16) -> Result<()> {
        let at = self.prepare_write(2);
        let b = &mut self.buffer[at..at + 2];
        b[0] = (value >> 8) as u8;
        b[1] = value as u8;
        Ok(())
    }

    fn write_int(&mut self, value: i32) -> Result<()> {
        let at = self.prepare_write(4);
        let b = &mut self.buffer[at..at + 4];
        b[0] = (value >> 24) as u8;
        b[1] = (value >> 16) as u8;
        b[2] = (value >> 8) as u8;
        b[3] = value as u8;
        Ok(())
    }

    fn write_long(&mut self, value: i64) -> Result<()> {
        let at = self.prepare_write(8);
        for (i, b) in self.buffer[at..at + 8].iter_mut().enumerate() {
            *b = (value >> (56 - i * 8)) as u8;
        }
        Ok(())
    }
}

impl DataInput for DataBuffer {
    fn next_byte(&mut self) -> Result<Option<u8>> {
        if self.read_cursor >= self.write_cursor {
            return Ok(None);
        }
        let value = self.buffer[self.read_cursor];
        self.read_cursor += 1;
        Ok(Some(value))
    }

    fn read_fully(&mut self, buf: &mut [u8]) -> Result<()> {
        let at = self.prepare_read(buf.len())?;
        buf.copy_from_slice(&self.buffer[at..at + buf.len()]);
        Ok(())
    }

    fn skip_bytes(&mut self, n: usize) -> Result<usize> {
        let n = n.min(self.read_remaining());
        self.read_cursor += n;
        Ok(n)
    }

    fn read_short(&mut self) -> Result<i16> {
        Ok(self.read_char()? as i16)
    }

    fn read_unsigned_short(&mut self) -> Result<u16> {
        self.read_char()
    }

    fn read_char(&mut self) -> Result<u16> {
        let at = self.prepare_read(2)?;
        let b = &self.buffer[at..at + 2];
        Ok((u16::from(b[0]) << 8) | u16::from(b[1]))
    }

    fn read_int(&mut self) -> Result<i32> {
        let at = self.prepare_read(4)?;
        let b = &self.buffer[at..at + 4];
        Ok((i32::from(b[0]) << 24) | (i32::from(b[1]) << 16) | (i32::from(b[2]) << 8) | i32::from(b[3]))
    }

    fn read_long(&mut self) -> Result<i64> {
        let at = self.prepare_read(8)?;
        Ok(self.buffer[at..at + 8]
            .iter()
            .fold(0i64, |acc, &b| (acc << 8) | i64::from(b)))
    }
}

impl io::Read for DataBuffer {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.read_remaining());
        let start = self.read_cursor;
        buf[..n].copy_from_slice(&self.buffer[start..start + n]);
        self.read_cursor += n;
        Ok(n)
    }
}

impl io::Write for DataBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_slice(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn check_window(offset: usize, length: usize, capacity: usize) -> Result<usize> {
    match offset.checked_add(length) {
        Some(end) if end <= capacity => Ok(end),
        _ => Err(Error::InvalidWindow {
            offset,
            length,
            capacity,
        }),
    }
}
