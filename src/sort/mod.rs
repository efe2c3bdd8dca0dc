//! # Key-value sorter
//!
//! Sorts serialized key-value records with a [`RawComparator`] in bounded
//! memory.
//!
//! ```text
//!  put ──► page buffer ──(sort)──► block buffer ──(merge)──► block files
//!                                                            (spilled)
//!  sort ◄── merge of: sorted page + block buffer pages + block files
//! ```
//!
//! Records are serialized into a page [`DataBuffer`]. A full page is sorted
//! and appended to the block buffer as `i32 key length, i32 value length,
//! key bytes, value bytes`; each appended page stays sorted on its own. A
//! full block buffer is merged and spilled to a temporary block file that
//! ends with a `-1` key length, optionally lz4 compressed.

use crate::{
    buffer::DataBuffer,
    cfg::SorterConfig,
    comparable::{RawComparator, Writable},
    consts::{
        BLOCK_EOF_MARKER, BLOCK_FILE_PREFIX, BLOCK_FILE_SUFFIX, BLOCK_INPUT_BUFFER_SIZE, BLOCK_OUTPUT_BUFFER_SIZE,
        MAX_RECORD_PER_PAGE, PAGE_RECORD_OVERHEAD, SIZE_OF_U32, SORT_BUFFER_EXPANSION_FACTOR,
    },
    err::{Error, Result},
    fs::{BufferedFileInput, BufferedFileOutput},
    serde::DataOutput,
    util,
};
use byteorder::{BigEndian, ReadBytesExt};
use bytes::Bytes;
use lz4_flex::frame::{FrameDecoder, FrameEncoder};
use std::{
    cmp::Ordering,
    io::{Read, Write},
    path::PathBuf,
    time::Instant,
};
use tempfile::NamedTempFile;

/// A sorted record
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyValue {
    pub key: Bytes,
    pub value: Bytes,
}

/// Location of one record inside the page buffer
#[derive(Clone, Copy, Debug)]
struct Range {
    offset: usize,
    key_length: usize,
    value_length: usize,
}

/// Current record of a [`RecordSource`]
struct Slice<'a> {
    bytes: &'a [u8],
    key_offset: usize,
    key_length: usize,
    value_length: usize,
}

impl Slice<'_> {
    fn key(&self) -> &[u8] {
        &self.bytes[self.key_offset..self.key_offset + self.key_length]
    }

    fn value(&self) -> &[u8] {
        let start = self.key_offset + self.key_length;
        &self.bytes[start..start + self.value_length]
    }

    fn to_key_value(&self) -> KeyValue {
        KeyValue {
            key: Bytes::copy_from_slice(self.key()),
            value: Bytes::copy_from_slice(self.value()),
        }
    }
}

/// Sorted run of records
trait RecordSource {
    /// Moves to the next record, returning `false` once the run is exhausted
    fn advance(&mut self) -> Result<bool>;

    /// The record the last successful [`RecordSource::advance`] moved to
    fn current(&self) -> Slice<'_>;
}

fn record_length(value: i32) -> Result<usize> {
    usize::try_from(value).map_err(|_| Error::MalformedData(format!("negative record length {value}")))
}

fn length_field(length: usize) -> Result<i32> {
    i32::try_from(length).map_err(|_| Error::MalformedData(format!("record length {length} exceeds 32 bits")))
}

/// Sorts `items` with a fallible comparison; stable
fn try_sort<T, F>(items: &mut [T], mut compare: F) -> Result<()>
where
    T: Copy,
    F: FnMut(&T, &T) -> Result<Ordering>,
{
    let mut scratch = items.to_vec();
    merge_sort(items, &mut scratch, &mut compare)
}

fn merge_sort<T, F>(items: &mut [T], scratch: &mut [T], compare: &mut F) -> Result<()>
where
    T: Copy,
    F: FnMut(&T, &T) -> Result<Ordering>,
{
    let len = items.len();
    if len <= 1 {
        return Ok(());
    }
    let mid = len / 2;
    {
        let (left, right) = items.split_at_mut(mid);
        let (left_scratch, right_scratch) = scratch.split_at_mut(mid);
        merge_sort(left, left_scratch, compare)?;
        merge_sort(right, right_scratch, compare)?;
    }

    scratch[..len].copy_from_slice(items);
    let (left, right) = scratch[..len].split_at(mid);
    let (mut i, mut j) = (0, 0);
    for slot in items.iter_mut() {
        let take_left = j >= right.len() || (i < left.len() && compare(&left[i], &right[j])? != Ordering::Greater);
        if take_left {
            *slot = left[i];
            i += 1;
        } else {
            *slot = right[j];
            j += 1;
        }
    }
    Ok(())
}

struct PageBuffer {
    buffer: DataBuffer,
    limit: usize,
    ranges: Vec<Range>,
}

impl PageBuffer {
    fn new(page_size: usize) -> Self {
        Self {
            buffer: DataBuffer::with_expansion(page_size / 4, SORT_BUFFER_EXPANSION_FACTOR),
            limit: page_size,
            ranges: Vec::new(),
        }
    }

    fn count(&self) -> usize {
        self.ranges.len()
    }

    fn size_in_bytes(&self) -> usize {
        self.buffer.write_position() + self.count() * PAGE_RECORD_OVERHEAD
    }

    fn put<K, V>(&mut self, key: &K, value: &V) -> Result<()>
    where
        K: Writable + ?Sized,
        V: Writable + ?Sized,
    {
        let offset = self.buffer.write_position();
        match self.write_record(key, value) {
            Ok(key_end) => {
                self.ranges.push(Range {
                    offset,
                    key_length: key_end - offset,
                    value_length: self.buffer.write_position() - key_end,
                });
                Ok(())
            }
            Err(err) => {
                // drop the partial record
                self.buffer.reset(0, offset)?;
                Err(err)
            }
        }
    }

    /// Writes key and value, returning where the key ends
    fn write_record<K, V>(&mut self, key: &K, value: &V) -> Result<usize>
    where
        K: Writable + ?Sized,
        V: Writable + ?Sized,
    {
        key.write(&mut self.buffer)?;
        let key_end = self.buffer.write_position();
        value.write(&mut self.buffer)?;
        Ok(key_end)
    }

    fn is_flush_required(&self) -> bool {
        self.size_in_bytes() >= self.limit || self.count() >= MAX_RECORD_PER_PAGE
    }

    fn sort<C: RawComparator>(&mut self, comparator: &C) -> Result<()> {
        let bytes = self.buffer.data();
        try_sort(&mut self.ranges, |a, b| {
            comparator.compare(bytes, a.offset, a.key_length, bytes, b.offset, b.key_length)
        })
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.ranges.clear();
    }

    fn sources(&self) -> Option<Box<dyn RecordSource + '_>> {
        if self.ranges.is_empty() {
            return None;
        }
        Some(Box::new(PageSource {
            bytes: self.buffer.data(),
            ranges: &self.ranges,
            next: 0,
        }))
    }
}

/// Records of a sorted page, in range order
struct PageSource<'a> {
    bytes: &'a [u8],
    ranges: &'a [Range],
    next: usize,
}

impl RecordSource for PageSource<'_> {
    fn advance(&mut self) -> Result<bool> {
        if self.next >= self.ranges.len() {
            return Ok(false);
        }
        self.next += 1;
        Ok(true)
    }

    fn current(&self) -> Slice<'_> {
        let range = self.ranges[self.next - 1];
        Slice {
            bytes: self.bytes,
            key_offset: range.offset,
            key_length: range.key_length,
            value_length: range.value_length,
        }
    }
}

struct BlockBuffer {
    buffer: DataBuffer,
    limit: usize,
    page_limits: Vec<usize>,
}

impl BlockBuffer {
    fn new(block_size: usize) -> Self {
        Self {
            buffer: DataBuffer::with_expansion(0, SORT_BUFFER_EXPANSION_FACTOR),
            limit: block_size,
            page_limits: Vec::new(),
        }
    }

    fn size_in_bytes(&self) -> usize {
        self.buffer.write_position()
    }

    /// Grows ahead of a page flush, never beyond the block limit
    fn ensure_write(&mut self, page_size: usize) {
        let old_capacity = self.buffer.capacity();
        let block_size = self.size_in_bytes();
        if block_size + page_size <= old_capacity {
            return;
        }
        let wanted = ((block_size as f64 + page_size as f64 * 2.5) as usize)
            .max((block_size as f64 * SORT_BUFFER_EXPANSION_FACTOR) as usize + 1);
        let new_capacity = wanted.min(self.limit);
        if new_capacity <= old_capacity {
            return;
        }
        log::debug!("expanding block buffer: {old_capacity}->{new_capacity}bytes");
        self.buffer.ensure_capacity(new_capacity);
    }

    /// Appends one record; `false` if it does not fit under the block limit
    fn put(&mut self, bytes: &[u8], range: Range) -> Result<bool> {
        let slice_length = range.key_length + range.value_length;
        if self.size_in_bytes() + slice_length + 2 * SIZE_OF_U32 > self.limit {
            return Ok(false);
        }
        let key_length = length_field(range.key_length)?;
        let value_length = length_field(range.value_length)?;
        let slice = util::slice_at(bytes, range.offset, slice_length)?;
        self.buffer.write_int(key_length)?;
        self.buffer.write_int(value_length)?;
        self.buffer.write_slice(slice)?;
        Ok(true)
    }

    /// Ends the current sorted page
    fn page_break(&mut self) {
        let position = self.buffer.write_position();
        if position != 0 && self.page_limits.last() != Some(&position) {
            self.page_limits.push(position);
        }
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.page_limits.clear();
    }

    fn sources(&self) -> Vec<Box<dyn RecordSource + '_>> {
        let bytes = &self.buffer.data()[..self.size_in_bytes()];
        let mut sources: Vec<Box<dyn RecordSource + '_>> = Vec::new();
        let end = bytes.len();
        let mut last = 0;
        for &limit in self.page_limits.iter().chain(std::iter::once(&end)) {
            if limit > last {
                sources.push(Box::new(PartialPageSource::new(&bytes[..limit], last)));
            }
            last = limit;
        }
        sources
    }
}

/// Records of one page inside the block buffer
struct PartialPageSource<'a> {
    bytes: &'a [u8],
    offset: usize,
    current: Range,
}

impl<'a> PartialPageSource<'a> {
    fn new(bytes: &'a [u8], offset: usize) -> Self {
        Self {
            bytes,
            offset,
            current: Range {
                offset: 0,
                key_length: 0,
                value_length: 0,
            },
        }
    }
}

impl RecordSource for PartialPageSource<'_> {
    fn advance(&mut self) -> Result<bool> {
        if self.offset >= self.bytes.len() {
            return Ok(false);
        }
        let key_length = record_length(util::read_i32_at(self.bytes, self.offset)?)?;
        let value_length = record_length(util::read_i32_at(self.bytes, self.offset + SIZE_OF_U32)?)?;
        let start = self.offset + 2 * SIZE_OF_U32;
        util::slice_at(self.bytes, start, key_length + value_length)?;
        self.current = Range {
            offset: start,
            key_length,
            value_length,
        };
        self.offset = start + key_length + value_length;
        Ok(true)
    }

    fn current(&self) -> Slice<'_> {
        Slice {
            bytes: self.bytes,
            key_offset: self.current.offset,
            key_length: self.current.key_length,
            value_length: self.current.value_length,
        }
    }
}

/// Records read back from a block file
struct StreamSource<R> {
    input: R,
    slice: Vec<u8>,
    key_length: usize,
    value_length: usize,
    saw_eof: bool,
}

impl<R: Read> StreamSource<R> {
    fn new(input: R) -> Self {
        Self {
            input,
            slice: Vec::new(),
            key_length: 0,
            value_length: 0,
            saw_eof: false,
        }
    }
}

impl<R: Read> RecordSource for StreamSource<R> {
    fn advance(&mut self) -> Result<bool> {
        if self.saw_eof {
            return Ok(false);
        }
        let key_length = self.input.read_i32::<BigEndian>()?;
        if key_length < 0 {
            self.saw_eof = true;
            return Ok(false);
        }
        let key_length = record_length(key_length)?;
        let value_length = record_length(self.input.read_i32::<BigEndian>()?)?;
        self.slice.resize(key_length + value_length, 0);
        self.input.read_exact(&mut self.slice)?;
        self.key_length = key_length;
        self.value_length = value_length;
        Ok(true)
    }

    fn current(&self) -> Slice<'_> {
        Slice {
            bytes: &self.slice,
            key_offset: 0,
            key_length: self.key_length,
            value_length: self.value_length,
        }
    }
}

struct BlockStore {
    directory: Option<PathBuf>,
    compress: bool,
    files: Vec<NamedTempFile>,
    total_size: u64,
}

impl BlockStore {
    fn new(directory: Option<PathBuf>, compress: bool) -> Self {
        Self {
            directory,
            compress,
            files: Vec::new(),
            total_size: 0,
        }
    }

    fn size_in_bytes(&self) -> u64 {
        self.total_size
    }

    fn create_temporary_file(&self) -> Result<NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(BLOCK_FILE_PREFIX).suffix(BLOCK_FILE_SUFFIX);
        Ok(match &self.directory {
            Some(directory) => builder.tempfile_in(directory)?,
            None => builder.tempfile()?,
        })
    }

    /// Writes `records` to a new block file.
    ///
    /// The file is removed again if writing fails.
    fn put<I>(&mut self, records: I, size: usize) -> Result<()>
    where
        I: Iterator<Item = Result<KeyValue>>,
    {
        let started = Instant::now();
        let mut file = self.create_temporary_file()?;
        {
            let output = BufferedFileOutput::with_capacity(file.as_file_mut(), BLOCK_OUTPUT_BUFFER_SIZE);
            if self.compress {
                let mut encoder = FrameEncoder::new(output);
                write_block(&mut encoder, records)?;
                encoder.finish()?.close()?;
            } else {
                let mut output = output;
                write_block(&mut output, records)?;
                output.close()?;
            }
        }
        log::debug!(
            "saved block file: {} (data={}->{}bytes, compress={}, elapsed={}ms)",
            file.path().display(),
            size,
            file.as_file().metadata()?.len(),
            self.compress,
            started.elapsed().as_millis()
        );
        self.files.push(file);
        self.total_size += size as u64;
        Ok(())
    }

    fn sources(&self) -> Result<Vec<Box<dyn RecordSource>>> {
        let mut sources: Vec<Box<dyn RecordSource>> = Vec::with_capacity(self.files.len());
        for file in &self.files {
            let input = BufferedFileInput::with_capacity(file.reopen()?, BLOCK_INPUT_BUFFER_SIZE);
            if self.compress {
                sources.push(Box::new(StreamSource::new(FrameDecoder::new(input))));
            } else {
                sources.push(Box::new(StreamSource::new(input)));
            }
        }
        Ok(sources)
    }

    fn reset(&mut self) {
        for file in self.files.drain(..) {
            let path = file.path().to_path_buf();
            log::debug!("deleting temporary file: {}", path.display());
            if let Err(err) = file.close() {
                log::warn!("failed to delete sorter block file: {} ({err})", path.display());
            }
        }
        self.total_size = 0;
    }
}

impl Drop for BlockStore {
    fn drop(&mut self) {
        self.reset();
    }
}

fn write_block<W, I>(out: &mut W, records: I) -> Result<()>
where
    W: Write,
    I: Iterator<Item = Result<KeyValue>>,
{
    use byteorder::WriteBytesExt;

    for record in records {
        let record = record?;
        out.write_i32::<BigEndian>(length_field(record.key.len())?)?;
        out.write_i32::<BigEndian>(length_field(record.value.len())?)?;
        out.write_all(&record.key)?;
        out.write_all(&record.value)?;
    }
    out.write_i32::<BigEndian>(BLOCK_EOF_MARKER)?;
    Ok(())
}

/// Merged, sorted view over every run of a [`KeyValueSorter`].
///
/// Records with equal keys come out in no particular order.
pub struct SortedRecords<'a, C> {
    sources: Vec<Box<dyn RecordSource + 'a>>,
    comparator: &'a C,
    failed: bool,
}

impl<'a, C: RawComparator> SortedRecords<'a, C> {
    fn new(sources: Vec<Box<dyn RecordSource + 'a>>, comparator: &'a C) -> Result<Self> {
        let mut live = Vec::with_capacity(sources.len());
        for mut source in sources {
            if source.advance()? {
                live.push(source);
            }
        }
        Ok(Self {
            sources: live,
            comparator,
            failed: false,
        })
    }

    fn next_record(&mut self) -> Result<Option<KeyValue>> {
        if self.sources.is_empty() {
            return Ok(None);
        }
        let mut min = 0;
        for i in 1..self.sources.len() {
            let (a, b) = (self.sources[i].current(), self.sources[min].current());
            let ordering = self.comparator.compare(
                a.bytes,
                a.key_offset,
                a.key_length,
                b.bytes,
                b.key_offset,
                b.key_length,
            )?;
            if ordering == Ordering::Less {
                min = i;
            }
        }

        let record = self.sources[min].current().to_key_value();
        if !self.sources[min].advance()? {
            self.sources.swap_remove(min);
        }
        Ok(Some(record))
    }
}

impl<C: RawComparator> Iterator for SortedRecords<'_, C> {
    type Item = Result<KeyValue>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let next = self.next_record().transpose();
        if matches!(next, Some(Err(_))) {
            self.failed = true;
        }
        next
    }
}

/// Sorts key-value records by their serialized keys.
pub struct KeyValueSorter<C> {
    page: PageBuffer,
    block: BlockBuffer,
    store: BlockStore,
    comparator: C,
    record_count: u64,
}

impl<C: RawComparator> KeyValueSorter<C> {
    pub fn new(config: SorterConfig, comparator: C) -> Self {
        Self {
            page: PageBuffer::new(config.page_size),
            block: BlockBuffer::new(config.block_size),
            store: BlockStore::new(config.temporary_directory, config.compress_block),
            comparator,
            record_count: 0,
        }
    }

    /// Serializes and adds one record.
    ///
    /// A record is kept once it is serialized, even if the page flush that
    /// follows fails; the flush is retried by the next `put`.
    pub fn put<K, V>(&mut self, key: &K, value: &V) -> Result<()>
    where
        K: Writable + ?Sized,
        V: Writable + ?Sized,
    {
        self.page.put(key, value)?;
        self.record_count += 1;
        if self.page.is_flush_required() {
            self.flush_page()?;
        }
        Ok(())
    }

    /// Number of records added since creation or the last [`KeyValueSorter::reset`]
    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    /// Bytes held in memory and in block files
    pub fn size_in_bytes(&self) -> u64 {
        (self.page.size_in_bytes() + self.block.size_in_bytes()) as u64 + self.store.size_in_bytes()
    }

    /// Merges every record added so far into one sorted sequence
    pub fn sort(&mut self) -> Result<SortedRecords<'_, C>> {
        log::debug!(
            "merging records: page-buffer={}bytes, block-buffer={}bytes, block-files={}bytes",
            self.page.size_in_bytes(),
            self.block.size_in_bytes(),
            self.store.size_in_bytes()
        );
        self.page.sort(&self.comparator)?;

        let mut sources: Vec<Box<dyn RecordSource + '_>> = Vec::new();
        sources.extend(self.page.sources());
        sources.extend(self.block.sources());
        for source in self.store.sources()? {
            sources.push(source);
        }
        SortedRecords::new(sources, &self.comparator)
    }

    /// Discards every record and removes the block files
    pub fn reset(&mut self) {
        self.page.reset();
        self.block.reset();
        self.store.reset();
        self.record_count = 0;
    }

    fn flush_page(&mut self) -> Result<()> {
        let count = self.page.count();
        if count == 0 {
            return Ok(());
        }
        log::debug!(
            "flushing page buffer: {}records, {}bytes",
            count,
            self.page.size_in_bytes()
        );
        self.page.sort(&self.comparator)?;

        let mut moved = 0;
        if let Err(err) = self.move_page(&mut moved) {
            // records already in the block buffer leave the page
            self.page.ranges.drain(..moved);
            self.block.page_break();
            return Err(err);
        }
        self.page.reset();
        self.block.page_break();
        Ok(())
    }

    /// Appends the sorted page to the block buffer, spilling as needed.
    ///
    /// `moved` counts the leading page records that no longer belong to the page.
    fn move_page(&mut self, moved: &mut usize) -> Result<()> {
        let bytes = self.page.buffer.data();
        self.block.ensure_write(self.page.size_in_bytes());
        for &range in &self.page.ranges {
            if self.block.put(bytes, range)? {
                *moved += 1;
                continue;
            }
            if self.block.size_in_bytes() > 0 {
                spill_out(&mut self.block, &mut self.store, &self.comparator)?;
            }
            if !self.block.put(bytes, range)? {
                // larger than the whole block buffer: store it on its own
                let slice = Slice {
                    bytes,
                    key_offset: range.offset,
                    key_length: range.key_length,
                    value_length: range.value_length,
                };
                let size = range.key_length + range.value_length;
                self.store.put(std::iter::once(Ok(slice.to_key_value())), size)?;
            }
            *moved += 1;
        }
        Ok(())
    }
}

/// Merges the block buffer into a new block file and empties it
fn spill_out<C: RawComparator>(block: &mut BlockBuffer, store: &mut BlockStore, comparator: &C) -> Result<()> {
    let size = block.size_in_bytes();
    let merged = SortedRecords::new(block.sources(), comparator)?;
    store.put(merged, size)?;
    block.reset();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        comparable::{KeyComparator, LexicographicComparator},
        value::{IntValue, StringValue},
    };
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use tempfile::tempdir;
    use test_log::test;

    fn small_config(dir: &std::path::Path) -> SorterConfig {
        // smallest page and block sizes force flushes and spills
        SorterConfig::default()
            .with_buffer_sizes(0, 0)
            .with_temporary_directory(Some(dir.to_path_buf()))
    }

    fn decode_int(bytes: &[u8]) -> i32 {
        i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    #[test]
    fn try_sort_is_stable_and_propagates_errors() -> crate::Result<()> {
        let mut items = [(3, 'a'), (1, 'b'), (3, 'c'), (0, 'd'), (1, 'e')];
        try_sort(&mut items, |a, b| Ok(a.0.cmp(&b.0)))?;
        assert_eq!(items, [(0, 'd'), (1, 'b'), (1, 'e'), (3, 'a'), (3, 'c')]);

        let err = try_sort(&mut items, |_, _| Err(Error::Unsupported("compare"))).unwrap_err();
        assert!(err.is_usage_error());
        Ok(())
    }

    #[test]
    fn sorts_in_memory() -> crate::Result<()> {
        let dir = tempdir()?;
        let mut sorter = KeyValueSorter::new(
            SorterConfig::default().with_temporary_directory(Some(dir.path().to_path_buf())),
            KeyComparator::new(StringValue::default()),
        );
        for (key, value) in [("pear", 1), ("apple", 2), ("fig", 3), ("apple", 4)] {
            sorter.put(&StringValue::new(key), &IntValue::new(value))?;
        }
        assert_eq!(sorter.record_count(), 4);
        assert!(sorter.size_in_bytes() > 0);

        let records = sorter.sort()?.collect::<crate::Result<Vec<_>>>()?;
        let keys: Vec<_> = records.iter().map(|r| r.key[2..].to_vec()).collect();
        assert_eq!(keys, [b"apple".to_vec(), b"apple".to_vec(), b"fig".to_vec(), b"pear".to_vec()]);
        assert_eq!(decode_int(&records[3].value), 1);
        assert_eq!(std::fs::read_dir(dir.path())?.count(), 0);
        Ok(())
    }

    fn spill_and_sort(compress: bool) -> crate::Result<()> {
        let dir = tempdir()?;
        let config = small_config(dir.path()).with_compress_block(compress);
        let mut sorter = KeyValueSorter::new(config, KeyComparator::new(IntValue::default()));

        let mut rng = StdRng::seed_from_u64(42);
        let mut expected = Vec::new();
        let payload = StringValue::new("x".repeat(100));
        for _ in 0..20_000 {
            let key = rng.gen_range(-1_000_000..1_000_000);
            sorter.put(&IntValue::new(key), &payload)?;
            expected.push(key);
        }
        expected.sort_unstable();
        assert!(std::fs::read_dir(dir.path())?.count() > 0, "expected spilled block files");

        let records = sorter.sort()?.collect::<crate::Result<Vec<_>>>()?;
        let keys: Vec<i32> = records.iter().map(|r| decode_int(&r.key)).collect();
        assert_eq!(keys, expected);
        assert!(records.iter().all(|r| r.value.len() == 102));

        sorter.reset();
        assert_eq!(sorter.record_count(), 0);
        assert_eq!(sorter.size_in_bytes(), 0);
        assert_eq!(std::fs::read_dir(dir.path())?.count(), 0);
        Ok(())
    }

    #[test]
    fn spills_blocks_to_disk() -> crate::Result<()> {
        spill_and_sort(false)
    }

    #[test]
    fn spills_compressed_blocks_to_disk() -> crate::Result<()> {
        spill_and_sort(true)
    }

    /// Opaque bytes written without a length prefix
    struct Blob(Vec<u8>);

    impl Writable for Blob {
        fn write(&self, out: &mut dyn DataOutput) -> crate::Result<()> {
            out.write_slice(&self.0)
        }

        fn read_fields(&mut self, _input: &mut dyn crate::serde::DataInput) -> crate::Result<()> {
            Err(Error::Unsupported("blob is write-only"))
        }
    }

    #[test]
    fn oversized_record_gets_own_block() -> crate::Result<()> {
        let dir = tempdir()?;
        let mut sorter = KeyValueSorter::new(small_config(dir.path()), LexicographicComparator);
        // larger than the whole block buffer
        let huge = Blob(vec![7; 300_000]);
        for i in 0..8 {
            sorter.put(&IntValue::new(8 - i), &huge)?;
        }
        let records = sorter.sort()?.collect::<crate::Result<Vec<_>>>()?;
        let keys: Vec<i32> = records.iter().map(|r| decode_int(&r.key)).collect();
        assert_eq!(keys, (1..=8).collect::<Vec<_>>());
        assert!(records.iter().all(|r| r.value.len() == 300_000));
        Ok(())
    }

    #[test]
    fn failed_spill_keeps_every_record_once() -> crate::Result<()> {
        let dir = tempdir()?;
        let config = small_config(&dir.path().join("missing"));
        let mut sorter = KeyValueSorter::new(config, KeyComparator::new(IntValue::default()));

        let mut rng = StdRng::seed_from_u64(9);
        let payload = StringValue::new("z".repeat(100));
        let mut expected = Vec::new();
        let mut failures = 0;
        for _ in 0..5_000 {
            let key = rng.gen_range(-1_000..1_000);
            expected.push(key);
            if let Err(err) = sorter.put(&IntValue::new(key), &payload) {
                assert!(matches!(err, Error::Io(_)));
                failures += 1;
            }
        }
        assert!(failures > 0, "expected the block spill to fail");
        assert_eq!(sorter.record_count(), 5_000);

        let keys = sorter
            .sort()?
            .map(|record| record.map(|r| decode_int(&r.key)))
            .collect::<crate::Result<Vec<_>>>()?;
        expected.sort_unstable();
        assert_eq!(keys, expected);
        Ok(())
    }

    #[test]
    fn comparator_failure_surfaces() -> crate::Result<()> {
        let dir = tempdir()?;
        let mut sorter = KeyValueSorter::new(
            SorterConfig::default().with_temporary_directory(Some(dir.path().to_path_buf())),
            KeyComparator::new(IntValue::default()),
        );
        // one-byte keys are too short for an int comparator
        sorter.put(&crate::value::BooleanValue::new(true), &IntValue::new(0))?;
        sorter.put(&crate::value::BooleanValue::new(false), &IntValue::new(0))?;
        assert!(sorter.sort().is_err());
        Ok(())
    }

    #[test]
    fn empty_sorter_yields_nothing() -> crate::Result<()> {
        let mut sorter = KeyValueSorter::new(SorterConfig::default(), LexicographicComparator);
        assert_eq!(sorter.sort()?.count(), 0);
        Ok(())
    }
}
