//! Benchmarks for append and scan throughput
//!
//! Run with: cargo bench --bench write_query_throughput

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use logvault::prelude::*;
use std::thread;

fn bench_single_writer(c: &mut Criterion) {
    let temp_dir = tempfile::tempdir().unwrap();
    let store = LogStore::open(LogVaultConfig::new(temp_dir.path())).unwrap();

    c.bench_function("write_single_level", |b| {
        b.iter(|| {
            store
                .write(Level::Info, black_box("bench.rs:1"), black_box("hello world"))
                .unwrap()
        })
    });
}

fn bench_parallel_writers(c: &mut Criterion) {
    let mut group = c.benchmark_group("parallel_writers");

    // One thread per level: no two writers share a partition.
    for num_threads in [1usize, 2, 5].iter() {
        group.throughput(Throughput::Elements(*num_threads as u64 * 100));
        group.bench_with_input(
            BenchmarkId::from_parameter(num_threads),
            num_threads,
            |b, &num_threads| {
                let temp_dir = tempfile::tempdir().unwrap();
                let store = Arc::new(LogStore::open(LogVaultConfig::new(temp_dir.path())).unwrap());
                b.iter(|| {
                    let handles: Vec<_> = Level::ALL
                        .iter()
                        .take(num_threads)
                        .map(|&level| {
                            let store = Arc::clone(&store);
                            thread::spawn(move || {
                                for _ in 0..100 {
                                    store.write(level, "bench.rs:2", "parallel").unwrap();
                                }
                            })
                        })
                        .collect();
                    for handle in handles {
                        handle.join().unwrap();
                    }
                });
            },
        );
    }
    group.finish();
}

fn bench_query_scan(c: &mut Criterion) {
    let temp_dir = tempfile::tempdir().unwrap();
    let store = LogStore::open(LogVaultConfig::new(temp_dir.path())).unwrap();
    for i in 0..10_000 {
        let level = Level::ALL[i % Level::ALL.len()];
        store
            .write(level, format!("bench.rs:{}", i % 50), format!("message {}", i))
            .unwrap();
    }

    let mut group = c.benchmark_group("query_scan");
    group.throughput(Throughput::Elements(10_000));
    group.bench_function("all_levels_by_location", |b| {
        let filter = Filter::level(LevelSelector::All).location("bench.rs:7");
        b.iter(|| black_box(store.query(&filter).unwrap().records))
    });
    group.bench_function("single_level_everything", |b| {
        let filter = Filter::level(Level::Error);
        b.iter(|| black_box(store.query(&filter).unwrap().records))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_single_writer,
    bench_parallel_writers,
    bench_query_scan
);
criterion_main!(benches);
