//! Asakusa raw I/O: binary record serialization, buffered file access and
//! raw-comparable keys for sort/shuffle pipelines.
//!
//! ## Introduction
//!
//! A shuffle spends most of its time comparing keys. Deserializing every key
//! before each comparison is wasteful when the serialized form already
//! carries everything needed to order it. Every key type in this crate can
//! therefore be compared two ways: as a structured value, and directly over
//! its serialized bytes. Both ways always agree.
//!
//! ### Features
//! - [x] Growable in-memory [`DataBuffer`] with independent read and write cursors
//! - [x] Big-endian primitive codec and Modified UTF-8 strings (`serde`, `utf`)
//! - [x] Buffered random-access file input and output ([`fs`])
//! - [x] Variable-length integers compatible with Hadoop's VInt ([`vint`])
//! - [x] Composite keys: [`key::Tuple`], [`key::Union`], [`key::InvertOrder`], [`key::NullValue`]
//! - [x] Shuffle keys with grouping/ordering comparators and a partitioner ([`key::ShuffleKey`])
//! - [x] External key-value sorter with optional lz4 block compression ([`sort::KeyValueSorter`])
//!
//! ### Constraint
//! - Strings are limited to 65,535 bytes of Modified UTF-8.
//! - All multi-byte integers are big-endian.
//!
//! # Basic usage
//!
//! ```rust
//! use asakusa_rawio::{
//!     comparable::{to_bytes, RawComparable},
//!     key::{InvertOrder, ShuffleKey},
//!     value::{IntValue, StringValue},
//! };
//! use std::cmp::Ordering;
//!
//! # fn main() -> asakusa_rawio::Result<()> {
//! let a = ShuffleKey::new(StringValue::new("apple"), InvertOrder::new(IntValue::new(1)));
//! let b = ShuffleKey::new(StringValue::new("apple"), InvertOrder::new(IntValue::new(2)));
//!
//! let (ba, bb) = (to_bytes(&a)?, to_bytes(&b)?);
//! assert_eq!(a.compare_to(&b)?, Ordering::Greater);
//! assert_eq!(a.compare_in_bytes(&ba, 0, &bb, 0)?, Ordering::Greater);
//! assert_eq!(a.size_in_bytes(&ba, 0)?, ba.len());
//! # Ok(())
//! # }
//! ```
//!
//! ### Sorting records
//!
//! ```rust
//! use asakusa_rawio::{
//!     comparable::KeyComparator,
//!     sort::KeyValueSorter,
//!     value::{IntValue, StringValue},
//!     SorterConfig,
//! };
//!
//! # fn main() -> asakusa_rawio::Result<()> {
//! let mut sorter = KeyValueSorter::new(SorterConfig::default(), KeyComparator::new(IntValue::default()));
//! for (key, value) in [(3, "c"), (1, "a"), (2, "b")] {
//!     sorter.put(&IntValue::new(key), &StringValue::new(value))?;
//! }
//!
//! let values = sorter
//!     .sort()?
//!     .map(|record| record.map(|r| r.value[2..].to_vec()))
//!     .collect::<asakusa_rawio::Result<Vec<_>>>()?;
//! assert_eq!(values, [b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
//! # Ok(())
//! # }
//! ```

mod macros;

pub mod buffer;
mod cfg;
pub mod comparable;
pub mod consts;
pub mod err;
pub mod fs;
pub mod key;
pub mod serde;
pub mod sort;
pub mod utf;
mod util;
pub mod value;
pub mod vint;

pub use buffer::DataBuffer;
pub use cfg::SorterConfig;
pub use comparable::{RawComparable, RawComparator, Writable};
pub use err::{Error, Result};
pub use fs::{BufferedFileInput, BufferedFileOutput};
pub use serde::{DataInput, DataOutput};
