//! Benchmark for lazy sequences against eager iterator chains.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use immutables::{List, Seq, range, repeat};
use std::hint::black_box;

// =============================================================================
// Pipeline Benchmarks
// =============================================================================

fn benchmark_map_filter(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("seq_map_filter");

    for size in [1000, 10000, 100_000] {
        group.bench_with_input(BenchmarkId::new("Seq", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let total = range(0, black_box(size))
                    .map(|x| x * 3)
                    .filter(|x| x % 2 == 0)
                    .reduce(0_i64, |acc, x| acc + x);
                black_box(total)
            });
        });

        group.bench_with_input(BenchmarkId::new("Iterator", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let total: i64 = (0..black_box(size))
                    .map(|x| x * 3)
                    .filter(|x| x % 2 == 0)
                    .sum();
                black_box(total)
            });
        });
    }

    group.finish();
}

fn benchmark_take_from_infinite(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("seq_take_infinite");

    for count in [10, 1000] {
        group.bench_with_input(BenchmarkId::new("repeat", count), &count, |bencher, &count| {
            bencher.iter(|| black_box(repeat(7_i64).map(|x| x * x).take(count).to_vec()));
        });
    }

    group.finish();
}

// =============================================================================
// Collection Source Benchmarks
// =============================================================================

fn benchmark_list_source(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("seq_list_source");

    for size in [1000, 10000] {
        let list: List<i64> = (0..size).collect();

        group.bench_with_input(BenchmarkId::new("to_list", size), &size, |bencher, _| {
            bencher.iter(|| black_box(Seq::from(list.clone()).map(|x| x + 1).to_list()));
        });

        group.bench_with_input(BenchmarkId::new("sort", size), &size, |bencher, _| {
            bencher.iter(|| black_box(Seq::from(list.clone()).reverse().sort().first()));
        });

        group.bench_with_input(BenchmarkId::new("cache_result", size), &size, |bencher, _| {
            let cached = Seq::from(list.clone()).map(|x| x * 2).cache_result();
            bencher.iter(|| black_box(cached.reduce(0_i64, |acc, x| acc + x)));
        });
    }

    group.finish();
}

// =============================================================================
// Criterion Group and Main
// =============================================================================

criterion_group!(
    benches,
    benchmark_map_filter,
    benchmark_take_from_infinite,
    benchmark_list_source
);

criterion_main!(benches);
