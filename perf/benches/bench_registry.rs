use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use klaxon_perf::{cancel, create, seeded_registry};

const SIZES: [u32; 3] = [16, 256, 4096];

fn bench_submit_create(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry_create");
    group.throughput(Throughput::Elements(1));

    for &live in &SIZES {
        group.bench_with_input(BenchmarkId::from_parameter(live), &live, |b, &live| {
            b.iter_batched(
                || seeded_registry(live),
                |mut registry| {
                    black_box(registry.submit(create(live + 1, 5, "fresh")));
                    registry
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_submit_replace(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry_replace");
    group.throughput(Throughput::Elements(1));

    for &live in &SIZES {
        let mut registry = seeded_registry(live);
        let target = live;
        group.bench_with_input(BenchmarkId::from_parameter(live), &live, |b, _| {
            b.iter(|| black_box(registry.submit(create(black_box(target), 7, "replacement"))));
        });
    }
    group.finish();
}

fn bench_cancel_and_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry_cancel_sweep");
    group.throughput(Throughput::Elements(1));

    for &live in &SIZES {
        group.bench_with_input(BenchmarkId::from_parameter(live), &live, |b, &live| {
            b.iter_batched(
                || seeded_registry(live),
                |mut registry| {
                    registry.submit(cancel(live));
                    black_box(registry.sweep());
                    registry
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_cancel_unmatched(c: &mut Criterion) {
    let mut registry = seeded_registry(256);
    c.bench_function("registry_cancel_unmatched", |b| {
        b.iter(|| black_box(registry.submit(cancel(black_box(257)))));
    });
}

criterion_group!(
    benches,
    bench_submit_create,
    bench_submit_replace,
    bench_cancel_and_sweep,
    bench_cancel_unmatched
);
criterion_main!(benches);
