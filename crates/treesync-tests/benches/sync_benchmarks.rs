//! Performance benchmarks for treesync
//!
//! Measures a cold sync into an empty destination and a warm re-run where
//! every file is skipped by change detection.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tokio::runtime::Runtime;
use treesync_sync::{sync_directory, SyncOptions};
use treesync_tests::test_utils::TreeFixture;
use treesync_types::Concurrency;

const FILE_COUNT: usize = 200;
const FILE_SIZE: usize = 4 * 1024;

fn benchmark_cold_sync(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("cold_sync");
    group.throughput(Throughput::Bytes((FILE_COUNT * FILE_SIZE) as u64));
    group.sample_size(20);

    for concurrency in [1, 8, 50] {
        group.bench_with_input(
            BenchmarkId::from_parameter(concurrency),
            &concurrency,
            |b, &concurrency| {
                b.iter_batched(
                    || {
                        let fixture = TreeFixture::new().unwrap();
                        fixture.populate_wide(10, FILE_COUNT, FILE_SIZE).unwrap();
                        fixture
                    },
                    |fixture| {
                        let options = SyncOptions::default()
                            .with_concurrency(Concurrency::new(concurrency).unwrap());
                        rt.block_on(sync_directory(
                            fixture.source(),
                            fixture.destination(),
                            options,
                        ))
                        .unwrap();
                    },
                    criterion::BatchSize::PerIteration,
                );
            },
        );
    }

    group.finish();
}

fn benchmark_noop_rerun(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let fixture = TreeFixture::new().unwrap();
    fixture.populate_wide(10, FILE_COUNT, FILE_SIZE).unwrap();
    rt.block_on(sync_directory(
        fixture.source(),
        fixture.destination(),
        SyncOptions::default(),
    ))
    .unwrap();

    c.bench_function("noop_rerun", |b| {
        b.iter(|| {
            let report = rt
                .block_on(sync_directory(
                    fixture.source(),
                    fixture.destination(),
                    SyncOptions::default(),
                ))
                .unwrap();
            assert_eq!(report.stats.files_copied, 0);
        });
    });
}

criterion_group!(benches, benchmark_cold_sync, benchmark_noop_rerun);
criterion_main!(benches);
