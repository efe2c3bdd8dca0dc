use super::{resolve_seek, FileWrite};
use crate::{consts::DEFAULT_FILE_BUFFER_SIZE, err::Result, serde::DataOutput};
use std::io::{self, SeekFrom};

/// Buffered writer over a random-access file.
///
/// Bytes are collected in memory and written to the file on [`flush`], when
/// the buffer fills up, and before any seek that changes the position.
/// Dropping the writer without [`flush`] or [`close`] discards buffered bytes.
///
/// [`flush`]: BufferedFileOutput::flush
/// [`close`]: BufferedFileOutput::close
#[derive(Debug)]
pub struct BufferedFileOutput<F> {
    file: F,
    buffer: Box<[u8]>,
    cursor: usize,
    physical_pointer: Option<u64>,
}

impl<F: FileWrite> BufferedFileOutput<F> {
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
            cursor: 0,
            physical_pointer: None,
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

    /// Logical position of the next byte to be written
    pub fn position(&mut self) -> Result<u64> {
        Ok(self.physical_pointer()? + self.cursor as u64)
    }

    /// Effective file size, counting bytes that are still buffered
    pub fn size(&mut self) -> Result<u64> {
        let length = self.file.length()?;
        Ok(length.max(self.position()?))
    }

    /// Writes buffered bytes to the file; a no-op when nothing is buffered
    pub fn flush(&mut self) -> Result<()> {
        if self.cursor == 0 {
            return Ok(());
        }
        self.file.write_bytes(&self.buffer[..self.cursor])?;
        if let Some(pointer) = self.physical_pointer {
            self.physical_pointer = Some(pointer + self.cursor as u64);
        }
        log::trace!("flushed {} buffered bytes", self.cursor);
        self.cursor = 0;
        Ok(())
    }

    /// Moves the logical position, flushing first unless it is unchanged
    pub fn seek(&mut self, position: u64) -> Result<()> {
        if self.position()? == position {
            return Ok(());
        }
        self.flush()?;
        self.file.seek_to(position)?;
        self.physical_pointer = Some(position);
        Ok(())
    }

    /// Flushes and forgets the cached file pointer, so the handle can be used directly
    pub fn sync(&mut self) -> Result<()> {
        self.flush()?;
        self.file.flush_file()?;
        self.physical_pointer = None;
        Ok(())
    }

    /// Only meaningful after [`BufferedFileOutput::sync`]
    pub fn get_ref(&self) -> &F {
        &self.file
    }

    /// Only meaningful after [`BufferedFileOutput::sync`]
    pub fn get_mut(&mut self) -> &mut F {
        &mut self.file
    }

    /// Flushes and returns the file handle
    pub fn into_inner(mut self) -> Result<F> {
        self.sync()?;
        Ok(self.file)
    }

    /// Flushes and releases the file
    pub fn close(mut self) -> Result<()> {
        self.sync()
    }
}

impl<F: FileWrite> DataOutput for BufferedFileOutput<F> {
    fn write_byte(&mut self, value: u8) -> Result<()> {
        if self.cursor >= self.buffer.len() {
            self.flush()?;
        }
        self.buffer[self.cursor] = value;
        self.cursor += 1;
        Ok(())
    }

    fn write_slice(&mut self, bytes: &[u8]) -> Result<()> {
        let mut written = 0;
        while written < bytes.len() {
            if self.cursor >= self.buffer.len() {
                self.flush()?;
            }
            let n = (self.buffer.len() - self.cursor).min(bytes.len() - written);
            self.buffer[self.cursor..self.cursor + n].copy_from_slice(&bytes[written..written + n]);
            self.cursor += n;
            written += n;
        }
        Ok(())
    }
}

impl<F: FileWrite> io::Write for BufferedFileOutput<F> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_slice(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(self.sync()?)
    }
}

impl<F: FileWrite> io::Seek for BufferedFileOutput<F> {
    fn seek(&mut self, target: SeekFrom) -> io::Result<u64> {
        let position = self.position()?;
        let size = self.size()?;
        let target = resolve_seek(target, position, size)?;
        BufferedFileOutput::seek(self, target)?;
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Seek, Write};
    use test_log::test;

    #[test]
    fn writes_through_small_buffer() -> crate::Result<()> {
        let mut output = BufferedFileOutput::with_capacity(Cursor::new(Vec::<u8>::new()), 8);
        for i in 0..1_000 {
            output.write_byte((i % 256) as u8)?;
        }
        output.write_int(-1)?;
        output.write_slice(&[7; 20])?;
        assert_eq!(output.position()?, 1_024);

        let bytes = output.into_inner()?.into_inner();
        assert_eq!(bytes.len(), 1_024);
        assert!(bytes[..1_000].iter().enumerate().all(|(i, &b)| b == (i % 256) as u8));
        assert_eq!(&bytes[1_000..1_004], &[0xFF; 4]);
        assert_eq!(&bytes[1_004..], &[7; 20]);
        Ok(())
    }

    #[test]
    fn size_counts_buffered_bytes() -> crate::Result<()> {
        let mut output = BufferedFileOutput::with_capacity(Cursor::new(Vec::<u8>::new()), 8);
        output.write_slice(&[1, 2, 3, 4, 5])?;
        assert_eq!(output.get_ref().get_ref().len(), 0);
        assert_eq!(output.size()?, 5);

        output.flush()?;
        assert_eq!(output.get_ref().get_ref().len(), 5);
        output.flush()?;
        assert_eq!(output.size()?, 5);
        Ok(())
    }

    #[test]
    fn seek_flushes_before_moving() -> crate::Result<()> {
        let mut output = BufferedFileOutput::with_capacity(Cursor::new(Vec::<u8>::new()), 16);
        output.write_slice(&[0; 10])?;

        // same position: nothing is written yet
        output.seek(10)?;
        assert_eq!(output.get_ref().get_ref().len(), 0);

        output.seek(2)?;
        assert_eq!(output.get_ref().get_ref().len(), 10);
        output.write_short(0x6364)?;
        assert_eq!(output.position()?, 4);
        assert_eq!(output.size()?, 10);

        let bytes = output.into_inner()?.into_inner();
        assert_eq!(bytes, [0, 0, 0x63, 0x64, 0, 0, 0, 0, 0, 0]);
        Ok(())
    }

    #[test]
    fn std_io_adapters() -> crate::Result<()> {
        let mut output = BufferedFileOutput::with_capacity(Cursor::new(Vec::<u8>::new()), 4);
        output.write_all(b"hello world")?;
        assert_eq!(Seek::seek(&mut output, SeekFrom::End(-5))?, 6);
        output.write_all(b"WORLD")?;
        Write::flush(&mut output)?;
        assert_eq!(output.get_ref().get_ref(), b"hello WORLD");
        Ok(())
    }
}
