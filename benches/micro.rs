//! Criterion microbenchmarks for individual format round trips.
//!
//! Run with: `cargo bench --bench micro`

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use tabbench::adapters::Format;
use tabbench::dataset::DataGen;
use tabbench::harness::run_trial;
use tempfile::TempDir;

fn bench_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("round_trip");
    group.sample_size(10);

    let rows = 10_000;
    let batch = DataGen::new(42).float_batch(rows, 5);

    for format in [Format::Csv, Format::Feather, Format::Parquet] {
        let adapter = format.adapter();
        group.bench_with_input(BenchmarkId::new(format.name(), rows), &rows, |b, _| {
            let tmp = TempDir::new().unwrap();
            b.iter(|| run_trial(adapter.as_ref(), &batch, tmp.path()).unwrap());
        });
    }
    group.finish();
}

fn bench_footprint(c: &mut Criterion) {
    let batch = DataGen::new(42).float_batch(100_000, 5);
    c.bench_function("memory_footprint", |b| {
        b.iter(|| tabbench::dataset::memory_footprint(&batch));
    });
}

criterion_group!(benches, bench_round_trip, bench_footprint);
criterion_main!(benches);
