use crate::{
    any_accessors,
    comparable::{downcast_peer, to_bytes, RawComparable, RawComparator, Writable},
    err::{Error, Result},
    serde::{DataInput, DataOutput},
    util,
};
use std::cmp::Ordering;

/// Sort key of a shuffle: records are grouped by `group` and ordered by
/// `group` then `order` within a partition.
///
/// Serialized as the group followed by the order component.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ShuffleKey<G, O> {
    group: G,
    order: O,
}

impl<G: RawComparable, O: RawComparable> ShuffleKey<G, O> {
    pub fn new(group: G, order: O) -> Self {
        Self { group, order }
    }

    pub fn group(&self) -> &G {
        &self.group
    }

    pub fn group_mut(&mut self) -> &mut G {
        &mut self.group
    }

    pub fn order(&self) -> &O {
        &self.order
    }

    pub fn order_mut(&mut self) -> &mut O {
        &mut self.order
    }

    pub fn into_parts(self) -> (G, O) {
        (self.group, self.order)
    }

    /// Orders by the group component only
    pub fn compare_groups(&self, other: &Self) -> Result<Ordering> {
        self.group.compare_to(&other.group)
    }

    /// Orders the serialized keys at `b1[o1]` and `b2[o2]` by their group component only
    pub fn compare_groups_in_bytes(&self, b1: &[u8], o1: usize, b2: &[u8], o2: usize) -> Result<Ordering> {
        self.group.compare_in_bytes(b1, o1, b2, o2)
    }
}

impl<G: RawComparable, O: RawComparable> Writable for ShuffleKey<G, O> {
    fn write(&self, out: &mut dyn DataOutput) -> Result<()> {
        self.group.write(out)?;
        self.order.write(out)
    }

    fn read_fields(&mut self, input: &mut dyn DataInput) -> Result<()> {
        self.group.read_fields(input)?;
        self.order.read_fields(input)
    }
}

impl<G: RawComparable, O: RawComparable> RawComparable for ShuffleKey<G, O> {
    fn compare_to(&self, other: &dyn RawComparable) -> Result<Ordering> {
        let other = downcast_peer::<Self>(other)?;
        match self.group.compare_to(&other.group)? {
            Ordering::Equal => self.order.compare_to(&other.order),
            diff => Ok(diff),
        }
    }

    fn size_in_bytes(&self, bytes: &[u8], offset: usize) -> Result<usize> {
        let group = self.group.size_in_bytes(bytes, offset)?;
        let order = self.order.size_in_bytes(bytes, offset + group)?;
        Ok(group + order)
    }

    fn compare_in_bytes(&self, b1: &[u8], o1: usize, b2: &[u8], o2: usize) -> Result<Ordering> {
        match self.group.compare_in_bytes(b1, o1, b2, o2)? {
            Ordering::Equal => {}
            diff => return Ok(diff),
        }
        let g1 = self.group.size_in_bytes(b1, o1)?;
        let g2 = self.group.size_in_bytes(b2, o2)?;
        if g1 != g2 {
            return Err(Error::MalformedData(format!(
                "equal shuffle groups have different sizes ({g1} and {g2} bytes)"
            )));
        }
        self.order.compare_in_bytes(b1, o1 + g1, b2, o2 + g2)
    }

    any_accessors!();
}

/// Compares serialized shuffle keys by group only, to decide which records
/// reach the same reduce call
#[derive(Debug, Default)]
pub struct GroupComparator<G, O> {
    prototype: ShuffleKey<G, O>,
}

impl<G: RawComparable, O: RawComparable> GroupComparator<G, O> {
    pub fn new(prototype: ShuffleKey<G, O>) -> Self {
        Self { prototype }
    }

    pub fn compare_keys(&self, a: &ShuffleKey<G, O>, b: &ShuffleKey<G, O>) -> Result<Ordering> {
        a.compare_groups(b)
    }
}

impl<G: RawComparable, O: RawComparable> RawComparator for GroupComparator<G, O> {
    fn compare(&self, b1: &[u8], s1: usize, l1: usize, b2: &[u8], s2: usize, l2: usize) -> Result<Ordering> {
        let b1 = util::slice_at(b1, 0, s1 + l1)?;
        let b2 = util::slice_at(b2, 0, s2 + l2)?;
        self.prototype.compare_groups_in_bytes(b1, s1, b2, s2)
    }
}

/// Compares serialized shuffle keys by group then order, to sort records
/// before they are grouped
#[derive(Debug, Default)]
pub struct OrderComparator<G, O> {
    prototype: ShuffleKey<G, O>,
}

impl<G: RawComparable, O: RawComparable> OrderComparator<G, O> {
    pub fn new(prototype: ShuffleKey<G, O>) -> Self {
        Self { prototype }
    }

    pub fn compare_keys(&self, a: &ShuffleKey<G, O>, b: &ShuffleKey<G, O>) -> Result<Ordering> {
        a.compare_to(b)
    }
}

impl<G: RawComparable, O: RawComparable> RawComparator for OrderComparator<G, O> {
    fn compare(&self, b1: &[u8], s1: usize, l1: usize, b2: &[u8], s2: usize, l2: usize) -> Result<Ordering> {
        let b1 = util::slice_at(b1, 0, s1 + l1)?;
        let b2 = util::slice_at(b2, 0, s2 + l2)?;
        self.prototype.compare_in_bytes(b1, s1, b2, s2)
    }
}

/// Assigns shuffle keys to partitions by a hash of the serialized group.
///
/// The hash is taken over the group bytes, so a deserialized key and its
/// serialized form always land in the same partition.
#[derive(Debug, Default)]
pub struct Partitioner<G, O> {
    prototype: ShuffleKey<G, O>,
}

impl<G: RawComparable, O: RawComparable> Partitioner<G, O> {
    pub fn new(prototype: ShuffleKey<G, O>) -> Self {
        Self { prototype }
    }

    /// # Panics
    ///
    /// Panics if `partitions` is zero.
    pub fn partition(&self, key: &ShuffleKey<G, O>, partitions: usize) -> Result<usize> {
        let group = to_bytes(&key.group)?;
        Ok(hash_partition(&group, partitions))
    }

    /// Partition of the serialized key at `bytes[offset]`
    ///
    /// # Panics
    ///
    /// Panics if `partitions` is zero.
    pub fn partition_in_bytes(&self, bytes: &[u8], offset: usize, partitions: usize) -> Result<usize> {
        let size = self.prototype.group.size_in_bytes(bytes, offset)?;
        let group = util::slice_at(bytes, offset, size)?;
        Ok(hash_partition(group, partitions))
    }
}

fn hash_partition(group: &[u8], partitions: usize) -> usize {
    assert!(partitions > 0, "partition count must be positive");
    let hash = seahash::hash(group) as u32 & i32::MAX as u32;
    hash as usize % partitions
}
