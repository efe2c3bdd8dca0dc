//! Buffered random-access file adapters.
//!
//! The adapters do not open files themselves; callers hand them any handle
//! that can seek and read or write. [`std::fs::File`] and
//! [`std::io::Cursor`] qualify through the blanket impls below.
mod input;
mod output;

pub use input::BufferedFileInput;
pub use output::BufferedFileOutput;

use crate::err::Result;
use std::io::{self, Read, Seek, SeekFrom, Write};

/// Positioning operations of the underlying file handle
pub trait RandomAccessFile {
    /// Moves the physical file pointer to `position` bytes from the start
    fn seek_to(&mut self, position: u64) -> Result<u64>;

    fn file_pointer(&mut self) -> Result<u64>;

    /// Current length of the file in bytes, leaving the file pointer in place
    fn length(&mut self) -> Result<u64>;
}

pub trait FileRead: RandomAccessFile {
    /// Reads at most `buf.len()` bytes at the file pointer; `0` means end of file
    fn read_some(&mut self, buf: &mut [u8]) -> Result<usize>;
}

pub trait FileWrite: RandomAccessFile {
    /// Writes all of `buf` at the file pointer
    fn write_bytes(&mut self, buf: &[u8]) -> Result<()>;

    /// Pushes written bytes down to the operating system
    fn flush_file(&mut self) -> Result<()>;
}

impl<T: Seek> RandomAccessFile for T {
    fn seek_to(&mut self, position: u64) -> Result<u64> {
        Ok(self.seek(SeekFrom::Start(position))?)
    }

    fn file_pointer(&mut self) -> Result<u64> {
        Ok(self.stream_position()?)
    }

    fn length(&mut self) -> Result<u64> {
        let current = self.stream_position()?;
        let end = self.seek(SeekFrom::End(0))?;
        if current != end {
            self.seek(SeekFrom::Start(current))?;
        }
        Ok(end)
    }
}

impl<T: Read + Seek> FileRead for T {
    fn read_some(&mut self, buf: &mut [u8]) -> Result<usize> {
        loop {
            match self.read(buf) {
                Ok(n) => return Ok(n),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }
    }
}

impl<T: Write + Seek> FileWrite for T {
    fn write_bytes(&mut self, buf: &[u8]) -> Result<()> {
        Ok(self.write_all(buf)?)
    }

    fn flush_file(&mut self) -> Result<()> {
        Ok(self.flush()?)
    }
}

/// Resolves a [`SeekFrom`] against the logical position and size of an adapter
fn resolve_seek(target: SeekFrom, position: u64, size: u64) -> io::Result<u64> {
    let (base, delta) = match target {
        SeekFrom::Start(offset) => return Ok(offset),
        SeekFrom::Current(delta) => (position, delta),
        SeekFrom::End(delta) => (size, delta),
    };
    base.checked_add_signed(delta).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "invalid seek to a negative or overflowing position",
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use test_log::test;

    #[test]
    fn length_keeps_file_pointer() -> crate::Result<()> {
        let mut file = Cursor::new(vec![0u8; 32]);
        file.seek_to(5)?;
        assert_eq!(file.length()?, 32);
        assert_eq!(file.file_pointer()?, 5);
        Ok(())
    }

    #[test]
    fn read_and_write_through_handle() -> crate::Result<()> {
        let mut file = Cursor::new(Vec::<u8>::new());
        file.write_bytes(b"abcdef")?;
        file.flush_file()?;
        file.seek_to(2)?;

        let mut buf = [0u8; 8];
        assert_eq!(file.read_some(&mut buf)?, 4);
        assert_eq!(&buf[..4], b"cdef");
        assert_eq!(file.read_some(&mut buf)?, 0);
        Ok(())
    }

    #[test]
    fn seek_targets() -> io::Result<()> {
        assert_eq!(resolve_seek(SeekFrom::Start(7), 3, 10)?, 7);
        assert_eq!(resolve_seek(SeekFrom::Current(-2), 3, 10)?, 1);
        assert_eq!(resolve_seek(SeekFrom::End(-1), 3, 10)?, 9);
        assert!(resolve_seek(SeekFrom::Current(-4), 3, 10).is_err());
        Ok(())
    }
}
