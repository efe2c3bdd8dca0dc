use super::Factory;
use crate::{
    any_accessors,
    comparable::{downcast_peer, RawComparable, Writable},
    err::{Error, Result},
    serde::{DataInput, DataOutput},
    vint,
};
use std::{cmp::Ordering, fmt};

/// Creates the zero value of one [`WritableUnion`] slot type
pub type WritableFactory = fn() -> Box<dyn Writable>;

/// Reads a discriminator and checks it against the slot count
fn read_position(input: &mut dyn DataInput, slots: usize) -> Result<usize> {
    let position = vint::read_vlong(input)?;
    check_position(position, slots)
}

fn check_position(position: i64, slots: usize) -> Result<usize> {
    match usize::try_from(position) {
        Ok(index) if index < slots => Ok(index),
        _ => Err(Error::InvalidDiscriminator { position, slots }),
    }
}

/// Tagged union over a fixed set of [`RawComparable`] slots.
///
/// Every slot is allocated once up front and switching between them reuses
/// that storage, so one instance can read a stream of records whose active
/// slot changes from record to record without allocating.
///
/// Serialized as the slot position in VInt form followed by the active slot.
/// Values order by position first, then by the active slot.
#[derive(Debug)]
pub struct Union {
    slots: Vec<Box<dyn RawComparable>>,
    position: usize,
}

impl Union {
    /// # Panics
    ///
    /// Panics if `slots` is empty.
    pub fn new(slots: Vec<Box<dyn RawComparable>>) -> Self {
        assert!(!slots.is_empty(), "union needs at least one slot");
        Self { slots, position: 0 }
    }

    /// # Panics
    ///
    /// Panics if `factories` is empty.
    pub fn from_factories(factories: &[Factory]) -> Self {
        Self::new(factories.iter().map(|factory| factory()).collect())
    }

    /// Position of the active slot
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// The active slot
    pub fn get_object(&self) -> &dyn RawComparable {
        self.slots[self.position].as_ref()
    }

    pub fn get_object_mut(&mut self) -> &mut (dyn RawComparable + 'static) {
        self.slots[self.position].as_mut()
    }

    /// Activates the slot at `position` and returns it for filling in
    pub fn switch_object(&mut self, position: usize) -> Result<&mut (dyn RawComparable + 'static)> {
        if position >= self.slots.len() {
            return Err(Error::InvalidPosition {
                position,
                slots: self.slots.len(),
            });
        }
        self.position = position;
        Ok(self.slots[position].as_mut())
    }

    /// The active slot as its concrete type
    pub fn get_as<T: RawComparable>(&self) -> Result<&T> {
        downcast_peer::<T>(self.get_object())
    }

    fn slot_at(&self, position: i64) -> Result<&dyn RawComparable> {
        let index = check_position(position, self.slots.len())?;
        Ok(self.slots[index].as_ref())
    }
}

impl Writable for Union {
    fn write(&self, out: &mut dyn DataOutput) -> Result<()> {
        vint::write_vlong(out, self.position as i64)?;
        self.get_object().write(out)
    }

    fn read_fields(&mut self, input: &mut dyn DataInput) -> Result<()> {
        self.position = read_position(input, self.slots.len())?;
        self.slots[self.position].read_fields(input)
    }
}

impl RawComparable for Union {
    fn compare_to(&self, other: &dyn RawComparable) -> Result<Ordering> {
        let other = downcast_peer::<Union>(other)?;
        if other.slot_count() != self.slot_count() {
            return Err(Error::ArityMismatch {
                expected: self.slot_count(),
                actual: other.slot_count(),
            });
        }
        match self.position.cmp(&other.position) {
            Ordering::Equal => self.get_object().compare_to(other.get_object()),
            diff => Ok(diff),
        }
    }

    fn size_in_bytes(&self, bytes: &[u8], offset: usize) -> Result<usize> {
        let (position, width) = vint::read_vlong_in_bytes(bytes, offset)?;
        let slot = self.slot_at(position)?;
        Ok(width + slot.size_in_bytes(bytes, offset + width)?)
    }

    fn compare_in_bytes(&self, b1: &[u8], o1: usize, b2: &[u8], o2: usize) -> Result<Ordering> {
        let (p1, w1) = vint::read_vlong_in_bytes(b1, o1)?;
        let (p2, w2) = vint::read_vlong_in_bytes(b2, o2)?;
        let slot = self.slot_at(p1)?;
        match p1.cmp(&p2) {
            Ordering::Equal => slot.compare_in_bytes(b1, o1 + w1, b2, o2 + w2),
            diff => {
                self.slot_at(p2)?;
                Ok(diff)
            }
        }
    }

    any_accessors!();
}

/// Tagged union over [`Writable`] slots that are never compared
pub struct WritableUnion {
    slots: Vec<Box<dyn Writable>>,
    position: usize,
}

impl WritableUnion {
    /// # Panics
    ///
    /// Panics if `slots` is empty.
    pub fn new(slots: Vec<Box<dyn Writable>>) -> Self {
        assert!(!slots.is_empty(), "union needs at least one slot");
        Self { slots, position: 0 }
    }

    /// # Panics
    ///
    /// Panics if `factories` is empty.
    pub fn from_factories(factories: &[WritableFactory]) -> Self {
        Self::new(factories.iter().map(|factory| factory()).collect())
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn get_object(&self) -> &dyn Writable {
        self.slots[self.position].as_ref()
    }

    pub fn get_object_mut(&mut self) -> &mut (dyn Writable + 'static) {
        self.slots[self.position].as_mut()
    }

    pub fn switch_object(&mut self, position: usize) -> Result<&mut (dyn Writable + 'static)> {
        if position >= self.slots.len() {
            return Err(Error::InvalidPosition {
                position,
                slots: self.slots.len(),
            });
        }
        self.position = position;
        Ok(self.slots[position].as_mut())
    }
}

impl fmt::Debug for WritableUnion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WritableUnion")
            .field("position", &self.position)
            .field("slots", &self.slots.len())
            .finish()
    }
}

impl Writable for WritableUnion {
    fn write(&self, out: &mut dyn DataOutput) -> Result<()> {
        vint::write_vlong(out, self.position as i64)?;
        self.get_object().write(out)
    }

    fn read_fields(&mut self, input: &mut dyn DataInput) -> Result<()> {
        self.position = read_position(input, self.slots.len())?;
        self.slots[self.position].read_fields(input)
    }
}
