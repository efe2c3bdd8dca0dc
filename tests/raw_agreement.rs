use asakusa_rawio::{
    comparable::{read_from_bytes, to_bytes},
    key::{Factory, InvertOrder, NullValue, ShuffleKey, Tuple, Union},
    utf,
    value::{BooleanValue, IntValue, LongValue, StringValue},
    RawComparable,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::cmp::Ordering;
use test_log::test;

const ROUNDS: usize = 200;

fn random_string(rng: &mut StdRng) -> String {
    let len = rng.gen_range(0..8);
    (0..len)
        .map(|_| match rng.gen_range(0..4) {
            0 => rng.gen::<char>(),
            1 => '\u{0}',
            _ => rng.gen_range('a'..='d'),
        })
        .collect()
}

fn random_int(rng: &mut StdRng) -> i32 {
    match rng.gen_range(0..5) {
        0 => i32::MIN,
        1 => i32::MAX,
        2 => rng.gen_range(-2..=2),
        _ => rng.gen(),
    }
}

/// Checks that both comparisons agree and sizes match for every pair of `values`
fn assert_agreement<T: RawComparable>(values: &[T]) -> asakusa_rawio::Result<()> {
    let encoded = values.iter().map(|v| to_bytes(v)).collect::<asakusa_rawio::Result<Vec<_>>>()?;
    for (a, ba) in values.iter().zip(&encoded) {
        assert_eq!(a.size_in_bytes(ba, 0)?, ba.len(), "size of {a:?}");
        for (b, bb) in values.iter().zip(&encoded) {
            let structured = a.compare_to(b)?;
            assert_eq!(structured, a.compare_in_bytes(ba, 0, bb, 0)?, "{a:?} vs {b:?}");
            assert_eq!(structured.reverse(), b.compare_to(a)?);
        }
    }
    Ok(())
}

const LEAF_FACTORIES: [Factory; 4] = [
    || Box::new(IntValue::default()),
    || Box::new(StringValue::default()),
    || Box::new(NullValue),
    || Box::new(LongValue::default()),
];

fn random_union(rng: &mut StdRng) -> asakusa_rawio::Result<Union> {
    let mut union = Union::from_factories(&LEAF_FACTORIES);
    let position = rng.gen_range(0..LEAF_FACTORIES.len());
    let bytes = match position {
        0 => to_bytes(&IntValue::new(random_int(rng)))?,
        1 => to_bytes(&StringValue::new(random_string(rng)))?,
        2 => Vec::new(),
        _ => to_bytes(&LongValue::new(rng.gen()))?,
    };
    read_from_bytes(union.switch_object(position)?, &bytes)?;
    Ok(union)
}

fn random_tuple(rng: &mut StdRng) -> asakusa_rawio::Result<Tuple> {
    let nested = Tuple::new(vec![
        Box::new(BooleanValue::new(rng.gen())),
        Box::new(random_union(rng)?),
    ]);
    Ok(Tuple::new(vec![
        Box::new(IntValue::new(rng.gen_range(-3..3))),
        Box::new(StringValue::new(random_string(rng))),
        Box::new(nested),
        Box::new(InvertOrder::new(LongValue::new(rng.gen_range(-3..3)))),
    ]))
}

#[test]
fn tuples_agree() -> asakusa_rawio::Result<()> {
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..ROUNDS / 20 {
        let values = (0..20).map(|_| random_tuple(&mut rng)).collect::<asakusa_rawio::Result<Vec<_>>>()?;
        assert_agreement(&values)?;
    }
    Ok(())
}

#[test]
fn unions_agree() -> asakusa_rawio::Result<()> {
    let mut rng = StdRng::seed_from_u64(2);
    let values = (0..ROUNDS / 4).map(|_| random_union(&mut rng)).collect::<asakusa_rawio::Result<Vec<_>>>()?;
    assert_agreement(&values)?;

    // every slot is reached
    for position in 0..LEAF_FACTORIES.len() {
        assert!(values.iter().any(|u| u.position() == position));
    }
    Ok(())
}

#[test]
fn shuffle_keys_agree() -> asakusa_rawio::Result<()> {
    let mut rng = StdRng::seed_from_u64(3);
    let values: Vec<_> = (0..ROUNDS / 4)
        .map(|_| {
            let group = StringValue::new(random_string(&mut rng));
            let order = InvertOrder::new(IntValue::new(random_int(&mut rng)));
            ShuffleKey::new(group, order)
        })
        .collect();
    assert_agreement(&values)
}

#[test]
fn inverted_values_agree() -> asakusa_rawio::Result<()> {
    let mut rng = StdRng::seed_from_u64(4);
    let values: Vec<_> = (0..ROUNDS / 4)
        .map(|_| InvertOrder::new(StringValue::new(random_string(&mut rng))))
        .collect();
    assert_agreement(&values)
}

#[test]
fn double_inversion_cancels() -> asakusa_rawio::Result<()> {
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..ROUNDS {
        let (x, y) = (IntValue::new(random_int(&mut rng)), IntValue::new(random_int(&mut rng)));
        let (ix, iy) = (InvertOrder::new(InvertOrder::new(x)), InvertOrder::new(InvertOrder::new(y)));
        assert_eq!(ix.compare_to(&iy)?, x.compare_to(&y)?);

        let (bx, by) = (to_bytes(&ix)?, to_bytes(&iy)?);
        assert_eq!(ix.compare_in_bytes(&bx, 0, &by, 0)?, x.compare_to(&y)?);
    }
    Ok(())
}

#[test]
fn deserialized_values_compare_equal() -> asakusa_rawio::Result<()> {
    let mut rng = StdRng::seed_from_u64(6);
    for _ in 0..ROUNDS / 10 {
        let source = random_tuple(&mut rng)?;
        let mut target = Tuple::new(vec![
            Box::new(IntValue::default()),
            Box::new(StringValue::default()),
            Box::new(Tuple::new(vec![
                Box::new(BooleanValue::default()),
                Box::new(Union::from_factories(&LEAF_FACTORIES)),
            ])),
            Box::new(InvertOrder::new(LongValue::default())),
        ]);
        read_from_bytes(&mut target, &to_bytes(&source)?)?;
        assert_eq!(target.compare_to(&source)?, Ordering::Equal);
        assert_eq!(to_bytes(&target)?, to_bytes(&source)?);
    }
    Ok(())
}

#[test]
fn modified_utf8_reference_string() -> asakusa_rawio::Result<()> {
    let value = "A\u{0000}B\u{0080}C\u{FFFF}";
    assert_eq!(utf::utf_length(value)?, 1 + 2 + 1 + 2 + 1 + 3);

    let mut bytes = Vec::<u8>::new();
    utf::write_utf(&mut bytes, value)?;
    #[rustfmt::skip]
    let expected = [
        0, 10,
        b'A',
        0xC0, 0x80,
        b'B',
        0xC2, 0x80,
        b'C',
        0xEF, 0xBF, 0xBF,
    ];
    assert_eq!(bytes, expected);
    assert_eq!(utf::read_utf(&mut &bytes[..])?, value);
    assert_eq!(utf::utf_size_in_bytes(&bytes, 0)?, bytes.len());
    Ok(())
}
