//! Benchmark for Map and OrderedMap against the standard HashMap.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use immutables::{Map, OrderedMap};
use std::collections::HashMap;
use std::hint::black_box;

// =============================================================================
// insert Benchmark
// =============================================================================

fn benchmark_insert(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("map_insert");

    for size in [100, 1000, 10000] {
        group.bench_with_input(BenchmarkId::new("Map", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut map = Map::new();
                for key in 0..size {
                    map = map.insert(black_box(key), key);
                }
                black_box(map)
            });
        });

        group.bench_with_input(
            BenchmarkId::new("OrderedMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut map = OrderedMap::new();
                    for key in 0..size {
                        map = map.insert(black_box(key), key);
                    }
                    black_box(map)
                });
            },
        );

        group.bench_with_input(BenchmarkId::new("HashMap", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut map = HashMap::new();
                for key in 0..size {
                    map.insert(black_box(key), key);
                }
                black_box(map)
            });
        });
    }

    group.finish();
}

// =============================================================================
// get Benchmark
// =============================================================================

fn benchmark_get(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("map_get");

    for size in [100, 1000, 10000] {
        let map: Map<i32, i32> = (0..size).map(|key| (key, key)).collect();
        let standard: HashMap<i32, i32> = (0..size).map(|key| (key, key)).collect();

        group.bench_with_input(BenchmarkId::new("Map", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut sum = 0_i64;
                for key in 0..size {
                    if let Some(&value) = map.get(&black_box(key)) {
                        sum += i64::from(value);
                    }
                }
                black_box(sum)
            });
        });

        group.bench_with_input(BenchmarkId::new("HashMap", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut sum = 0_i64;
                for key in 0..size {
                    if let Some(&value) = standard.get(&black_box(key)) {
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
// remove and equality Benchmarks
// =============================================================================

fn benchmark_remove(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("map_remove");

    for size in [100, 1000, 10000] {
        let map: Map<i32, i32> = (0..size).map(|key| (key, key)).collect();
        let ordered: OrderedMap<i32, i32> = (0..size).map(|key| (key, key)).collect();

        group.bench_with_input(BenchmarkId::new("Map", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut current = map.clone();
                for key in (0..size).step_by(3) {
                    current = current.remove(&black_box(key));
                }
                black_box(current)
            });
        });

        group.bench_with_input(
            BenchmarkId::new("OrderedMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut current = ordered.clone();
                    for key in (0..size).step_by(3) {
                        current = current.remove(&black_box(key));
                    }
                    black_box(current)
                });
            },
        );
    }

    group.finish();
}

fn benchmark_equality(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("map_equality");

    for size in [1000, 10000] {
        let left: Map<i32, i32> = (0..size).map(|key| (key, key)).collect();
        let right: Map<i32, i32> = (0..size).rev().map(|key| (key, key)).collect();
        let shared = left.insert(-1, -1);

        group.bench_with_input(BenchmarkId::new("independent", size), &size, |bencher, _| {
            bencher.iter(|| black_box(left == right));
        });

        group.bench_with_input(BenchmarkId::new("shared", size), &size, |bencher, _| {
            let other = shared.remove(&-1);
            bencher.iter(|| black_box(left == other));
        });
    }

    group.finish();
}

// =============================================================================
// Criterion Group and Main
// =============================================================================

criterion_group!(
    benches,
    benchmark_insert,
    benchmark_get,
    benchmark_remove,
    benchmark_equality
);

criterion_main!(benches);
