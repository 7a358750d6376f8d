/// Decode and aggregation throughput
///
/// Measures how fast a recorded log turns into a summary table, for logs
/// with few and many distinct statements.
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sqlite_query_log::codec::format_record;
use sqlite_query_log::decoder::decode;
use sqlite_query_log::stats::aggregate;
use std::time::Duration;

/// Build a log of `records` lines cycling through `distinct` statements
fn build_log(records: usize, distinct: usize) -> String {
    (0..records)
        .map(|i| {
            let sql = format!(
                "SELECT id, name, created_at FROM users WHERE id = {} AND active = 1",
                i % distinct
            );
            format_record(&sql, (i % 97) as u64)
        })
        .collect()
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    group.measurement_time(Duration::from_secs(5));

    for records in [1_000, 10_000, 100_000] {
        let log = build_log(records, 50);
        group.throughput(Throughput::Elements(records as u64));
        group.bench_with_input(BenchmarkId::from_parameter(records), &log, |b, log| {
            b.iter(|| black_box(decode(log)));
        });
    }

    group.finish();
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");
    group.measurement_time(Duration::from_secs(5));

    for distinct in [10, 1_000, 50_000] {
        let observations = decode(&build_log(100_000, distinct)).observations;
        group.throughput(Throughput::Elements(observations.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("distinct", distinct),
            &observations,
            |b, observations| {
                b.iter(|| black_box(aggregate(observations, 10)));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_decode, bench_aggregate);
criterion_main!(benches);
