//! IntSet benchmarks
//!
//! Run with: `cargo bench --bench intset_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use memdump_util::{FxHashSet, IntSet};

/// Addresses the way an allocator hands them out: ascending, 16-byte aligned,
/// with the occasional jump to a new arena.
fn heap_addresses(count: usize) -> Vec<u64> {
    let mut addr = 0x7f3a_0000_0000u64;
    (0..count)
        .map(|i| {
            addr += if i % 4096 == 0 { 1 << 20 } else { 16 * (1 + (i as u64 % 5)) };
            addr
        })
        .collect()
}

/// Same addresses in a scrambled but deterministic order
fn scrambled(mut values: Vec<u64>) -> Vec<u64> {
    let len = values.len();
    for i in 0..len {
        let j = (i.wrapping_mul(2_654_435_761)) % len;
        values.swap(i, j);
    }
    values
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("intset_insert");

    for size in [10_000usize, 1_000_000] {
        let sorted = heap_addresses(size);
        let random = scrambled(sorted.clone());
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("ascending", size), &sorted, |b, values| {
            b.iter(|| values.iter().copied().collect::<IntSet>())
        });

        group.bench_with_input(BenchmarkId::new("scrambled", size), &random, |b, values| {
            b.iter(|| values.iter().copied().collect::<IntSet>())
        });

        // Baseline
        group.bench_with_input(BenchmarkId::new("fxhashset", size), &sorted, |b, values| {
            b.iter(|| values.iter().copied().collect::<FxHashSet<u64>>())
        });
    }

    group.finish();
}

fn bench_contains(c: &mut Criterion) {
    let mut group = c.benchmark_group("intset_contains");
    let values = heap_addresses(1_000_000);
    let set: IntSet = values.iter().copied().collect();
    let probes = scrambled(values.iter().step_by(97).map(|v| v + (v & 16)).collect());
    group.throughput(Throughput::Elements(probes.len() as u64));

    group.bench_function("mixed_hits", |b| {
        b.iter(|| probes.iter().filter(|p| set.contains(black_box(**p))).count())
    });

    group.finish();
}

fn bench_iterate(c: &mut Criterion) {
    let set: IntSet = heap_addresses(1_000_000).into_iter().collect();
    c.bench_function("intset_iterate_1m", |b| b.iter(|| set.iter().fold(0u64, |acc, v| acc ^ v)));
}

criterion_group!(benches, bench_insert, bench_contains, bench_iterate);
criterion_main!(benches);
