//! Composite keys for sort and shuffle.
//!
//! Every key here composes other [`RawComparable`](crate::comparable::RawComparable)
//! values and keeps the raw and structural orderings in agreement by
//! delegating to its components in the same sequence in both cases.
mod invert;
mod null;
mod shuffle;
mod tuple;
mod union;

pub use invert::InvertOrder;
pub use null::NullValue;
pub use shuffle::{GroupComparator, OrderComparator, Partitioner, ShuffleKey};
pub use tuple::{Factory, Tuple};
pub use union::{Union, WritableFactory, WritableUnion};
