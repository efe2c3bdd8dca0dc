pub const SIZE_OF_U8: usize = std::mem::size_of::<u8>();

pub const SIZE_OF_U16: usize = std::mem::size_of::<u16>();

pub const SIZE_OF_U32: usize = std::mem::size_of::<u32>();

pub const SIZE_OF_U64: usize = std::mem::size_of::<u64>();

/// Smallest capacity a `DataBuffer` grows to
pub const MIN_BUFFER_CAPACITY: usize = 256;

/// Default growth factor of a `DataBuffer`
pub const DEFAULT_EXPANSION_FACTOR: f64 = 1.5;

/// Default internal buffer size of the buffered file adapters
pub const DEFAULT_FILE_BUFFER_SIZE: usize = 8 * 1024;

/// Largest body a modified UTF-8 string may have (16-bit length prefix)
pub const MAX_UTF_LENGTH: usize = u16::MAX as usize;

/// VInt lead bytes at or above this value encode themselves
pub const VINT_SINGLE_BYTE_MIN: i8 = -112;

/// VInt lead bytes below this value introduce a negative number
pub const VINT_NEGATIVE_LEAD: i8 = -120;

// Sorter growth factor for page and block buffers
pub const SORT_BUFFER_EXPANSION_FACTOR: f64 = 1.2;

pub const MAX_RECORD_PER_PAGE: usize = 1_000_000;

pub const DEFAULT_PAGE_SIZE: usize = 1024 * 1024;

pub const DEFAULT_BLOCK_SIZE: usize = 4 * 1024 * 1024;

pub const MIN_PAGE_SIZE: usize = 64 * 1024;

pub const MAX_PAGE_SIZE: usize = 128 * 1024 * 1024;

pub const MIN_BLOCK_SIZE: usize = 256 * 1024;

pub const MAX_BLOCK_SIZE: usize = 1024 * 1024 * 1024;

// buffer = page + page * PAGE_OVERFLOW_MARGIN + page * DEFAULT_PAGE_PER_BLOCK
pub const PAGE_OVERFLOW_MARGIN: f64 = 0.25;

pub const DEFAULT_PAGE_PER_BLOCK: usize = 5;

/// Per-record bookkeeping bytes (offset/key length/value length) charged to a page
pub const PAGE_RECORD_OVERHEAD: usize = 8;

pub const BLOCK_FILE_PREFIX: &str = "asakusa-sort";

pub const BLOCK_FILE_SUFFIX: &str = ".tmp";

pub const BLOCK_INPUT_BUFFER_SIZE: usize = 32 * 1024;

pub const BLOCK_OUTPUT_BUFFER_SIZE: usize = 256 * 1024;

/// Marks the end of a spilled block file
pub const BLOCK_EOF_MARKER: i32 = -1;
