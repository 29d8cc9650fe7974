//! Benchmark for List against the standard Vec.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use immutables::List;
use std::hint::black_box;

// =============================================================================
// push Benchmark
// =============================================================================

fn benchmark_push(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("list_push");

    for size in [100, 1000, 10000] {
        group.bench_with_input(BenchmarkId::new("List", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut list = List::new();
                for index in 0..size {
                    list = list.push(black_box(index));
                }
                black_box(list)
            });
        });

        group.bench_with_input(BenchmarkId::new("Vec", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut vector = Vec::new();
                for index in 0..size {
                    vector.push(black_box(index));
                }
                black_box(vector)
            });
        });
    }

    group.finish();
}

// =============================================================================
// get Benchmark
// =============================================================================

fn benchmark_get(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("list_get");

    for size in [100, 1000, 10000] {
        let list: List<i32> = (0..size).collect();
        let vector: Vec<i32> = (0..size).collect();

        group.bench_with_input(BenchmarkId::new("List", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut sum = 0_i64;
                for index in 0..size as usize {
                    if let Some(&value) = list.get(black_box(index)) {
                        sum += i64::from(value);
                    }
                }
                black_box(sum)
            });
        });

        group.bench_with_input(BenchmarkId::new("Vec", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut sum = 0_i64;
                for index in 0..size as usize {
                    if let Some(&value) = vector.get(black_box(index)) {
                        sum += i64::from(value);
                    }
                }
                black_box(sum)
            });
        });
    }

    group.finish();
}

// =============================================================================
// set Benchmark
// =============================================================================

fn benchmark_set(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("list_set");

    for size in [100, 1000, 10000] {
        let list: List<i32> = (0..size).collect();

        group.bench_with_input(BenchmarkId::new("List", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut current = list.clone();
                for index in (0..size as usize).step_by(7) {
                    current = current.set(black_box(index), -1).unwrap_or(current);
                }
                black_box(current)
            });
        });

        group.bench_with_input(
            BenchmarkId::new("List with_mutations", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    black_box(list.with_mutations(|transient| {
                        for index in (0..size as usize).step_by(7) {
                            let _ = transient.set(black_box(index), -1);
                        }
                    }))
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// unshift and slice Benchmarks
// =============================================================================

fn benchmark_unshift(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("list_unshift");

    for size in [100, 1000] {
        group.bench_with_input(BenchmarkId::new("List", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut list = List::new();
                for index in 0..size {
                    list = list.unshift(black_box(index));
                }
                black_box(list)
            });
        });
    }

    group.finish();
}

fn benchmark_slice(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("list_slice");

    for size in [1000, 10000, 100_000] {
        let list: List<i32> = (0..size).collect();
        group.bench_with_input(BenchmarkId::new("List", size), &size, |bencher, &size| {
            let quarter = (size / 4) as isize;
            bencher.iter(|| black_box(list.slice(black_box(quarter), Some(-quarter))));
        });
    }

    group.finish();
}

// =============================================================================
// Criterion Group and Main
// =============================================================================

criterion_group!(
    benches,
    benchmark_push,
    benchmark_get,
    benchmark_set,
    benchmark_unshift,
    benchmark_slice
);

criterion_main!(benches);
