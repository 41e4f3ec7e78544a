//! Store insertion benchmarks
//!
//! - `insert_batch/N`: one batch of N rows into an empty store
//! - `insert_indexed/N`: same, with membership and knn factories attached
//! - `delete_reinsert`: bulk delete then re-insert of the payload
//!
//! Vector contents use a fixed seed (BENCH_SEED) for reproducibility.
//!
//! ## Running
//!
//! ```bash
//! cargo bench --bench store_insert
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use relstore::index::{KnnIndexFactory, MembershipIndexFactory};
use relstore::{Batch, Store, TypeDescriptor, Value};

const BENCH_SEED: u64 = 0xDEADBEEF_CAFEBABE;
const DIM: usize = 8;

fn make_batch(rows: usize) -> Batch {
    let mut rng = StdRng::seed_from_u64(BENCH_SEED ^ rows as u64);
    let vectors = (0..rows)
        .map(|_| Value::Vector((0..DIM).map(|_| rng.gen::<f64>()).collect()))
        .collect();
    let labels = (0..rows)
        .map(|i| Value::ClassLabel(format!("c{}", i % 10)))
        .collect();
    Batch::new()
        .with_column(TypeDescriptor::vector(DIM), vectors)
        .and_then(|b| b.with_column(TypeDescriptor::ClassLabel, labels))
        .expect("bench batch")
}

fn insert_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("store");
    for rows in [100usize, 1_000, 10_000] {
        let batch = make_batch(rows);
        group.throughput(Throughput::Elements(rows as u64));

        group.bench_with_input(BenchmarkId::new("insert_batch", rows), &batch, |b, batch| {
            b.iter(|| {
                let mut store = Store::new();
                black_box(store.insert(batch.clone()).unwrap())
            });
        });

        group.bench_with_input(
            BenchmarkId::new("insert_indexed", rows),
            &batch,
            |b, batch| {
                b.iter(|| {
                    let mut store = Store::builder()
                        .index_factory(MembershipIndexFactory)
                        .index_factory(KnnIndexFactory::default())
                        .build()
                        .unwrap();
                    black_box(store.insert(batch.clone()).unwrap())
                });
            },
        );
    }
    group.finish();
}

fn delete_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("store");
    let mut store = Store::new();
    let ids = store.insert(make_batch(1_000)).unwrap();

    group.bench_function("delete_reinsert", |b| {
        b.iter(|| {
            let payload = store.delete_all(&ids).unwrap();
            black_box(store.insert(payload).unwrap())
        });
    });
    group.finish();
}

criterion_group!(benches, insert_benchmarks, delete_benchmarks);
criterion_main!(benches);
