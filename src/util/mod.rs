use crate::err::{Error, Result};
use byteorder::{BigEndian, ByteOrder};

#[cfg(test)]
use rand::{distributions::Alphanumeric, Rng};

/// Generate random alphanumeric string of `length`
/// used during test
#[cfg(test)]
pub fn generate_random_id(length: usize) -> String {
    let rng = rand::thread_rng();
    rng.sample_iter(&Alphanumeric).take(length).map(char::from).collect()
}

/// Borrows `len` bytes of `bytes` starting at `offset`
///
/// Fails with [`Error::EndOfData`] instead of panicking when the range runs past the end.
pub fn slice_at(bytes: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    let end = offset.saturating_add(len);
    if end > bytes.len() {
        return Err(Error::EndOfData {
            required: end - bytes.len(),
        });
    }
    Ok(&bytes[offset..end])
}

pub fn read_u8_at(bytes: &[u8], offset: usize) -> Result<u8> {
    Ok(slice_at(bytes, offset, 1)?[0])
}

pub fn read_u16_at(bytes: &[u8], offset: usize) -> Result<u16> {
    Ok(BigEndian::read_u16(slice_at(bytes, offset, 2)?))
}

pub fn read_i32_at(bytes: &[u8], offset: usize) -> Result<i32> {
    Ok(BigEndian::read_i32(slice_at(bytes, offset, 4)?))
}

pub fn read_i64_at(bytes: &[u8], offset: usize) -> Result<i64> {
    Ok(BigEndian::read_i64(slice_at(bytes, offset, 8)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn slice_at_checks_bounds() -> crate::Result<()> {
        let bytes = [1, 2, 3, 4];
        assert_eq!(slice_at(&bytes, 1, 2)?, &[2, 3]);
        assert_eq!(slice_at(&bytes, 4, 0)?, &[] as &[u8]);
        assert!(matches!(
            slice_at(&bytes, 2, 4),
            Err(Error::EndOfData { required: 2 })
        ));
        assert!(slice_at(&bytes, usize::MAX, 2).unwrap_err().is_end_of_data());
        Ok(())
    }

    #[test]
    fn reads_big_endian_values() -> crate::Result<()> {
        let bytes = [0xFF, 0x00, 0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06];
        assert_eq!(read_u8_at(&bytes, 0)?, 0xFF);
        assert_eq!(read_u16_at(&bytes, 2)?, 0x0001);
        assert_eq!(read_i32_at(&bytes, 0)?, 0xFF00_0001_u32 as i32);
        assert_eq!(read_i64_at(&bytes, 1)?, 0x0000_0102_0304_0506);
        assert!(read_i64_at(&bytes, 2).is_err());
        Ok(())
    }

    #[test]
    fn random_ids_have_requested_length() {
        assert_eq!(generate_random_id(12).len(), 12);
    }
}
