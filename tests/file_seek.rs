use asakusa_rawio::{BufferedFileInput, BufferedFileOutput, DataInput, DataOutput};
use std::fs::File;
use tempfile::tempfile;
use test_log::test;

fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 256) as u8).collect()
}

fn write_pattern(len: usize) -> asakusa_rawio::Result<File> {
    let mut output = BufferedFileOutput::with_capacity(tempfile()?, 8);
    for byte in pattern(len) {
        output.write_byte(byte)?;
    }
    assert_eq!(output.position()?, len as u64);
    output.into_inner()
}

fn read_at(input: &mut BufferedFileInput<File>, position: u64, len: usize) -> asakusa_rawio::Result<Vec<u8>> {
    input.seek(position)?;
    let mut buf = vec![0; len];
    input.read_fully(&mut buf)?;
    Ok(buf)
}

#[test]
fn seek_forward_then_backward() -> asakusa_rawio::Result<()> {
    let mut input = BufferedFileInput::with_capacity(write_pattern(1000)?, 8);
    assert_eq!(input.size()?, 1000);

    let expected: Vec<u8> = (500..510).map(|i| (i % 256) as u8).collect();
    assert_eq!(read_at(&mut input, 500, 10)?, expected);
    assert_eq!(input.position()?, 510);

    // outside the buffered window
    assert_eq!(read_at(&mut input, 3, 4)?, [3, 4, 5, 6]);
    assert_eq!(input.position()?, 7);
    Ok(())
}

#[test]
fn interleaved_seeks_return_expected_bytes() -> asakusa_rawio::Result<()> {
    let bytes = pattern(1000);
    let mut input = BufferedFileInput::with_capacity(write_pattern(1000)?, 8);
    for (position, len) in [(0, 3), (4, 3), (2, 1), (990, 10), (250, 20), (251, 2), (0, 1000)] {
        let got = read_at(&mut input, position, len)?;
        assert_eq!(got, &bytes[position as usize..position as usize + len], "at {position}");
    }
    Ok(())
}

#[test]
fn writer_seek_overwrites_in_place() -> asakusa_rawio::Result<()> {
    let mut output = BufferedFileOutput::with_capacity(tempfile()?, 8);
    output.write_slice(&pattern(100))?;
    output.seek(10)?;
    output.write_int(-1)?;
    output.seek(100)?;
    output.write_byte(0xAB)?;
    assert_eq!(output.size()?, 101);
    let file = output.into_inner()?;

    let mut input = BufferedFileInput::with_capacity(file, 8);
    assert_eq!(read_at(&mut input, 8, 8)?, [8, 9, 0xFF, 0xFF, 0xFF, 0xFF, 14, 15]);
    input.seek(100)?;
    assert_eq!(input.read_unsigned_byte()?, 0xAB);
    assert!(input.read_unsigned_byte().unwrap_err().is_end_of_data());
    Ok(())
}
