use crate::consts::{
    DEFAULT_BLOCK_SIZE, DEFAULT_PAGE_PER_BLOCK, DEFAULT_PAGE_SIZE, MAX_BLOCK_SIZE, MAX_PAGE_SIZE, MIN_BLOCK_SIZE,
    MIN_PAGE_SIZE, PAGE_OVERFLOW_MARGIN,
};
use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq)]
/// Configuration options for the key-value sorter.
pub struct SorterConfig {
    /// Size of the page buffer in bytes. Records are sorted in memory one page at a time.
    pub page_size: usize,

    /// Size of the block buffer in bytes. Sorted pages are collected here before
    /// they are merged and spilled to a block file.
    pub block_size: usize,

    /// Where block files are created; the system temporary directory if `None`
    pub temporary_directory: Option<PathBuf>,

    /// Should block files be compressed?
    pub compress_block: bool,
}

impl SorterConfig {
    pub fn new(page_size: usize, block_size: usize, temporary_directory: Option<PathBuf>, compress_block: bool) -> Self {
        Self::default()
            .with_buffer_sizes(page_size, block_size)
            .with_temporary_directory(temporary_directory)
            .with_compress_block(compress_block)
    }

    /// Splits a total memory budget between the page and the block buffer.
    ///
    /// The budget covers the page, its overflow margin and the block buffer:
    /// `buffer = page * (1 + PAGE_OVERFLOW_MARGIN + DEFAULT_PAGE_PER_BLOCK)`.
    pub fn with_buffer_size(self, buffer_size: usize) -> Self {
        let factor = 1.0 + PAGE_OVERFLOW_MARGIN + DEFAULT_PAGE_PER_BLOCK as f64;
        let page = clamp((buffer_size as f64 / factor) as usize, MIN_PAGE_SIZE, MAX_PAGE_SIZE);
        let reserved = (page as f64 * (1.0 + PAGE_OVERFLOW_MARGIN)) as usize;
        let block = buffer_size.saturating_sub(reserved);
        self.with_buffer_sizes(page, block)
    }

    /// Sets both buffer sizes, each clamped into its supported range
    pub fn with_buffer_sizes(mut self, page_size: usize, block_size: usize) -> Self {
        self.page_size = clamp(page_size, MIN_PAGE_SIZE, MAX_PAGE_SIZE);
        self.block_size = clamp(block_size, MIN_BLOCK_SIZE, MAX_BLOCK_SIZE);
        self
    }

    pub fn with_temporary_directory(mut self, path: Option<PathBuf>) -> Self {
        self.temporary_directory = path;
        self
    }

    pub fn with_compress_block(mut self, enable: bool) -> Self {
        self.compress_block = enable;
        self
    }
}

fn clamp(value: usize, min: usize, max: usize) -> usize {
    debug_assert!(min <= max);
    value.clamp(min, max)
}

impl Default for SorterConfig {
    fn default() -> Self {
        SorterConfig {
            page_size: DEFAULT_PAGE_SIZE,
            block_size: DEFAULT_BLOCK_SIZE,
            temporary_directory: None,
            compress_block: false,
        }
    }
}
