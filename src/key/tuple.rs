use crate::{
    any_accessors,
    comparable::{downcast_peer, RawComparable, Writable},
    err::{Error, Result},
    serde::{DataInput, DataOutput},
};
use std::cmp::Ordering;

/// Creates the zero value of one component type
pub type Factory = fn() -> Box<dyn RawComparable>;

/// A fixed sequence of components ordered lexicographically.
///
/// The serialized form is the concatenation of the components, with no
/// header; the shape of the tuple is known from the prototype in use.
#[derive(Debug)]
pub struct Tuple {
    elements: Vec<Box<dyn RawComparable>>,
}

impl Tuple {
    pub fn new(elements: Vec<Box<dyn RawComparable>>) -> Self {
        Self { elements }
    }

    /// Builds a tuple holding the zero value of each component type
    pub fn from_factories(factories: &[Factory]) -> Self {
        Self::new(factories.iter().map(|factory| factory()).collect())
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&dyn RawComparable> {
        self.elements.get(index).map(|e| e.as_ref())
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut (dyn RawComparable + 'static)> {
        self.elements.get_mut(index).map(|e| e.as_mut())
    }

    /// The component at `index` as its concrete type
    pub fn get_as<T: RawComparable>(&self, index: usize) -> Result<&T> {
        let element = self.get(index).ok_or(Error::InvalidPosition {
            position: index,
            slots: self.len(),
        })?;
        downcast_peer::<T>(element)
    }

    pub fn get_as_mut<T: RawComparable>(&mut self, index: usize) -> Result<&mut T> {
        let slots = self.len();
        let element = self.get_mut(index).ok_or(Error::InvalidPosition { position: index, slots })?;
        let actual = element.type_name();
        element
            .as_any_mut()
            .downcast_mut::<T>()
            .ok_or(Error::IncompatibleTypes {
                expected: std::any::type_name::<T>(),
                actual,
            })
    }

    fn peer<'a>(&self, other: &'a dyn RawComparable) -> Result<&'a Tuple> {
        let other = downcast_peer::<Tuple>(other)?;
        if other.len() != self.len() {
            return Err(Error::ArityMismatch {
                expected: self.len(),
                actual: other.len(),
            });
        }
        Ok(other)
    }
}

impl Writable for Tuple {
    fn write(&self, out: &mut dyn DataOutput) -> Result<()> {
        self.elements.iter().try_for_each(|e| e.write(out))
    }

    fn read_fields(&mut self, input: &mut dyn DataInput) -> Result<()> {
        self.elements.iter_mut().try_for_each(|e| e.read_fields(input))
    }
}

impl RawComparable for Tuple {
    fn compare_to(&self, other: &dyn RawComparable) -> Result<Ordering> {
        let other = self.peer(other)?;
        for (a, b) in self.elements.iter().zip(&other.elements) {
            match a.compare_to(b.as_ref())? {
                Ordering::Equal => continue,
                diff => return Ok(diff),
            }
        }
        Ok(Ordering::Equal)
    }

    fn size_in_bytes(&self, bytes: &[u8], offset: usize) -> Result<usize> {
        let mut cursor = offset;
        for e in &self.elements {
            cursor += e.size_in_bytes(bytes, cursor)?;
        }
        Ok(cursor - offset)
    }

    fn compare_in_bytes(&self, b1: &[u8], o1: usize, b2: &[u8], o2: usize) -> Result<Ordering> {
        let (mut c1, mut c2) = (o1, o2);
        for e in &self.elements {
            match e.compare_in_bytes(b1, c1, b2, c2)? {
                Ordering::Equal => {
                    c1 += e.size_in_bytes(b1, c1)?;
                    c2 += e.size_in_bytes(b2, c2)?;
                }
                diff => return Ok(diff),
            }
        }
        Ok(Ordering::Equal)
    }

    any_accessors!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        comparable::{read_from_bytes, to_bytes},
        key::InvertOrder,
        value::{IntValue, LongValue, StringValue},
    };
    use test_log::test;

    fn pair(name: &str, count: i32) -> Tuple {
        Tuple::new(vec![Box::new(StringValue::new(name)), Box::new(IntValue::new(count))])
    }

    #[test]
    fn orders_component_by_component() -> crate::Result<()> {
        let keys = [pair("a", 2), pair("a", 10), pair("b", -1), pair("", 0)];
        for a in &keys {
            for b in &keys {
                let (ba, bb) = (to_bytes(a)?, to_bytes(b)?);
                assert_eq!(a.compare_to(b)?, a.compare_in_bytes(&ba, 0, &bb, 0)?);
            }
        }
        assert_eq!(keys[0].compare_to(&keys[1])?, Ordering::Less);
        assert_eq!(keys[1].compare_to(&keys[2])?, Ordering::Less);
        assert_eq!(keys[3].compare_to(&keys[0])?, Ordering::Less);
        Ok(())
    }

    #[test]
    fn sizes_sum_components_at_any_offset() -> crate::Result<()> {
        let key = pair("h\u{00E9}llo", 5);
        let mut bytes = vec![0xEE; 5];
        bytes.extend(to_bytes(&key)?);
        bytes.push(0xEE);
        assert_eq!(key.size_in_bytes(&bytes, 5)?, bytes.len() - 6);
        Ok(())
    }

    #[test]
    fn factories_build_zero_values_for_reading() -> crate::Result<()> {
        let factories: [Factory; 3] = [
            || Box::new(LongValue::default()),
            || Box::new(InvertOrder::new(IntValue::default())),
            || Box::new(StringValue::default()),
        ];
        let source = Tuple::new(vec![
            Box::new(LongValue::new(-9)),
            Box::new(InvertOrder::new(IntValue::new(4))),
            Box::new(StringValue::new("x")),
        ]);

        let mut target = Tuple::from_factories(&factories);
        read_from_bytes(&mut target, &to_bytes(&source)?)?;
        assert_eq!(target.compare_to(&source)?, Ordering::Equal);
        assert_eq!(target.get_as::<LongValue>(0)?.get(), -9);
        assert_eq!(target.get_as::<StringValue>(2)?.as_str(), "x");

        target.get_as_mut::<LongValue>(0)?.set(3);
        assert_eq!(target.compare_to(&source)?, Ordering::Greater);
        Ok(())
    }

    #[test]
    fn accessors_report_misuse() {
        let key = pair("a", 1);
        assert!(key.get(2).is_none());
        assert!(matches!(key.get_as::<IntValue>(2), Err(Error::InvalidPosition { position: 2, slots: 2 })));
        assert!(key.get_as::<LongValue>(1).unwrap_err().is_usage_error());
    }

    #[test]
    fn different_arity_is_a_usage_error() {
        let short = Tuple::new(vec![Box::new(IntValue::new(1))]);
        let err = short.compare_to(&pair("a", 1)).unwrap_err();
        assert!(matches!(err, Error::ArityMismatch { expected: 1, actual: 2 }));
    }

    #[test]
    fn empty_tuple_is_zero_sized() -> crate::Result<()> {
        let empty = Tuple::new(Vec::new());
        assert!(empty.is_empty());
        assert!(to_bytes(&empty)?.is_empty());
        assert_eq!(empty.size_in_bytes(&[], 0)?, 0);
        assert_eq!(empty.compare_in_bytes(&[], 0, &[], 0)?, Ordering::Equal);
        Ok(())
    }
}
