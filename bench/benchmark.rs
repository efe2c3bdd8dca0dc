use asakusa_rawio::{
    comparable::{to_bytes, KeyComparator},
    key::{InvertOrder, OrderComparator, ShuffleKey},
    sort::KeyValueSorter,
    value::{IntValue, LongValue, StringValue},
    RawComparable, RawComparator, SorterConfig,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tempfile::tempdir;

type Key = ShuffleKey<StringValue, InvertOrder<IntValue>>;

fn keys() -> Vec<Key> {
    (0..1000)
        .map(|i| {
            let group = StringValue::new(format!("customer-{:04}", i % 97));
            ShuffleKey::new(group, InvertOrder::new(IntValue::new(i * 7919 % 1000)))
        })
        .collect()
}

fn compare_structured(c: &mut Criterion) {
    let keys = keys();
    c.bench_function("compare_structured", |b| {
        b.iter(|| {
            for pair in keys.windows(2) {
                black_box(pair[0].compare_to(&pair[1]).unwrap());
            }
        });
    });
}

fn compare_raw(c: &mut Criterion) {
    let encoded: Vec<Vec<u8>> = keys().iter().map(|k| to_bytes(k).unwrap()).collect();
    let comparator = OrderComparator::new(Key::default());
    c.bench_function("compare_raw", |b| {
        b.iter(|| {
            for pair in encoded.windows(2) {
                let (a, b) = (&pair[0], &pair[1]);
                black_box(comparator.compare(a, 0, a.len(), b, 0, b.len()).unwrap());
            }
        });
    });
}

fn sort_records(c: &mut Criterion) {
    let root = tempdir().unwrap();
    let config = SorterConfig::default()
        .with_buffer_size(1024 * 1024)
        .with_temporary_directory(Some(root.path().to_path_buf()));
    let mut sorter = KeyValueSorter::new(config, KeyComparator::new(LongValue::default()));
    c.bench_function("sort_100k", |b| {
        b.iter(|| {
            sorter.reset();
            for i in 0..100_000i64 {
                sorter.put(&LongValue::new(i.wrapping_mul(0x9E37_79B9) % 1_000_003), &LongValue::new(i)).unwrap();
            }
            black_box(sorter.sort().unwrap().count());
        });
    });
}

criterion_group!(benches, compare_structured, compare_raw, sort_records);
criterion_main!(benches);
