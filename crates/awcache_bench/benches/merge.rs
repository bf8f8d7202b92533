//! Merge and emit benchmarks.

use awcache_bench::{counter_rows, section, visitor_rows};
use awcache_core::{render_month, Config, FormatVersion, MergeEngine};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// Benchmark merging two half-overlapping sections.
fn bench_merge_sections(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_sections");
    let engine = MergeEngine::default();

    for rows in [100, 1_000, 10_000] {
        let left = section("visitor", &visitor_rows(rows, 0));
        let right = section("visitor", &visitor_rows(rows, rows / 2));

        group.throughput(Throughput::Elements(rows as u64 * 2));
        group.bench_with_input(
            BenchmarkId::new("visitor_sorted", rows),
            &(left, right),
            |b, (left, right)| {
                b.iter(|| {
                    let merged = engine.merge_sections(black_box(left), black_box(right)).unwrap();
                    black_box(merged);
                });
            },
        );

        let left = section("os", &counter_rows(rows, 0));
        let right = section("os", &counter_rows(rows, rows / 2));
        group.bench_with_input(
            BenchmarkId::new("os_unsorted", rows),
            &(left, right),
            |b, (left, right)| {
                b.iter(|| {
                    let merged = engine.merge_sections(black_box(left), black_box(right)).unwrap();
                    black_box(merged);
                });
            },
        );
    }

    group.finish();
}

/// Benchmark rendering a month with its offset map.
fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_month");
    let version = FormatVersion::new("6.9", "1.925");
    let config = Config::default();

    for rows in [1_000, 10_000] {
        let sections = vec![
            section("visitor", &visitor_rows(rows, 0)),
            section("os", &counter_rows(rows / 10, 0)),
        ];
        group.bench_with_input(BenchmarkId::new("visitor_os", rows), &sections, |b, sections| {
            b.iter(|| {
                let text = render_month(black_box(&version), black_box(sections), &config);
                black_box(text);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_merge_sections, bench_render);
criterion_main!(benches);
