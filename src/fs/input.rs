use super::{resolve_seek, FileRead};
use crate::{
    consts::DEFAULT_FILE_BUFFER_SIZE,
    err::{Error, Result},
    serde::DataInput,
};
use std::io::{self, SeekFrom};

/// Buffered reader over a random-access file.
///
/// Holds a window of the file in memory. `physical_pointer` caches where the
/// underlying handle stands, which is always the end of the window:
///
/// ```text
///   window start = physical - limit
///   |<------------ limit ----------->|
///   +--------------+-----------------+
///   |   consumed   |   unread bytes  |
///   +--------------+-----------------+
///                  ^offset           ^physical pointer
/// ```
#[derive(Debug)]
pub struct BufferedFileInput<F> {
    file: F,
    buffer: Box<[u8]>,
    offset: usize,
    limit: usize,
    physical_pointer: Option<u64>,
    size: Option<u64>,
}

impl<F: FileRead> BufferedFileInput<F> {
    pub fn new(file: F) -> Self {
        Self::with_capacity(file, DEFAULT_FILE_BUFFER_SIZE)
    }

    /// # Panics
    ///
    /// Panics if `buffer_size` is zero.
    pub fn with_capacity(file: F, buffer_size: usize) -> Self {
        assert!(buffer_size > 0, "buffer size must be positive");
        Self {
            file,
            buffer: vec![0; buffer_size].into_boxed_slice(),
            offset: 0,
            limit: 0,
            physical_pointer: None,
            size: None,
        }
    }

    fn physical_pointer(&mut self) -> Result<u64> {
        match self.physical_pointer {
            Some(pointer) => Ok(pointer),
            None => {
                let pointer = self.file.file_pointer()?;
                self.physical_pointer = Some(pointer);
                Ok(pointer)
            }
        }
    }

    /// Refills the window when it is exhausted.
    ///
    /// Returns the number of unread bytes now buffered, `0` at end of file.
    pub fn prepare(&mut self) -> Result<usize> {
        if self.offset < self.limit {
            return Ok(self.limit - self.offset);
        }
        let pointer = self.physical_pointer()?;
        let read = self.file.read_some(&mut self.buffer)?;
        self.offset = 0;
        self.limit = read;
        self.physical_pointer = Some(pointer + read as u64);
        Ok(read)
    }

    /// Logical position of the next byte to be read
    pub fn position(&mut self) -> Result<u64> {
        let pointer = self.physical_pointer()?;
        Ok(pointer - (self.limit - self.offset) as u64)
    }

    /// Size of the file, queried once and cached until the next physical seek or sync
    pub fn size(&mut self) -> Result<u64> {
        match self.size {
            Some(size) => Ok(size),
            None => {
                let size = self.file.length()?;
                self.size = Some(size);
                Ok(size)
            }
        }
    }

    /// Moves the logical position.
    ///
    /// Targets inside the buffered window only move the window offset; any
    /// other target seeks the file and discards the window.
    pub fn seek(&mut self, position: u64) -> Result<()> {
        let pointer = self.physical_pointer()?;
        let window_start = pointer - self.limit as u64;
        if (window_start..pointer).contains(&position) {
            self.offset = (position - window_start) as usize;
            return Ok(());
        }

        log::trace!("physical seek: {pointer}->{position}");
        self.file.seek_to(position)?;
        self.size = None;
        let size = self.size()?;
        self.physical_pointer = Some(position.min(size));
        self.offset = 0;
        self.limit = 0;
        Ok(())
    }

    /// Discards the window and moves the file handle to the logical position,
    /// so the handle can be used directly afterwards.
    pub fn sync(&mut self) -> Result<()> {
        let position = self.position()?;
        self.file.seek_to(position)?;
        self.offset = 0;
        self.limit = 0;
        self.physical_pointer = None;
        self.size = None;
        Ok(())
    }

    /// Only meaningful after [`BufferedFileInput::sync`]
    pub fn get_ref(&self) -> &F {
        &self.file
    }

    /// Only meaningful after [`BufferedFileInput::sync`]
    pub fn get_mut(&mut self) -> &mut F {
        &mut self.file
    }

    /// Returns the file handle positioned at the logical position
    pub fn into_inner(mut self) -> Result<F> {
        self.sync()?;
        Ok(self.file)
    }

    /// Releases the buffer and the file
    pub fn close(self) -> Result<()> {
        drop(self);
        Ok(())
    }

    fn read_u8(&mut self) -> Result<u8> {
        self.next_byte()?.ok_or(Error::EndOfData { required: 1 })
    }
}

impl<F: FileRead> DataInput for BufferedFileInput<F> {
    fn next_byte(&mut self) -> Result<Option<u8>> {
        if self.prepare()? == 0 {
            return Ok(None);
        }
        let value = self.buffer[self.offset];
        self.offset += 1;
        Ok(Some(value))
    }

    fn read_fully(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            let available = self.prepare()?;
            if available == 0 {
                return Err(Error::EndOfData {
                    required: buf.len() - filled,
                });
            }
            let n = available.min(buf.len() - filled);
            buf[filled..filled + n].copy_from_slice(&self.buffer[self.offset..self.offset + n]);
            self.offset += n;
            filled += n;
        }
        Ok(())
    }

    fn skip_bytes(&mut self, n: usize) -> Result<usize> {
        let position = self.position()?;
        let size = self.size()?;
        let skipped = (n as u64).min(size.saturating_sub(position));
        self.seek(position + skipped)?;
        Ok(skipped as usize)
    }

    fn read_short(&mut self) -> Result<i16> {
        Ok(self.read_unsigned_short()? as i16)
    }

    fn read_unsigned_short(&mut self) -> Result<u16> {
        let b0 = u16::from(self.read_u8()?);
        let b1 = u16::from(self.read_u8()?);
        Ok((b0 << 8) | b1)
    }

    fn read_int(&mut self) -> Result<i32> {
        let mut value = 0i32;
        for _ in 0..4 {
            value = (value << 8) | i32::from(self.read_u8()?);
        }
        Ok(value)
    }

    fn read_long(&mut self) -> Result<i64> {
        let mut value = 0i64;
        for _ in 0..8 {
            value = (value << 8) | i64::from(self.read_u8()?);
        }
        Ok(value)
    }
}

impl<F: FileRead> io::Read for BufferedFileInput<F> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let available = self.prepare()?;
        let n = available.min(buf.len());
        buf[..n].copy_from_slice(&self.buffer[self.offset..self.offset + n]);
        self.offset += n;
        Ok(n)
    }
}

impl<F: FileRead> io::Seek for BufferedFileInput<F> {
    fn seek(&mut self, target: SeekFrom) -> io::Result<u64> {
        let position = self.position()?;
        let size = self.size()?;
        let target = resolve_seek(target, position, size)?;
        BufferedFileInput::seek(self, target)?;
        Ok(self.position()?)
    }
}
