use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use klaxon_perf::seeded_registry;
use klaxon_sync::Turnstile;

fn bench_uncontended(c: &mut Criterion) {
    let gate = Turnstile::new(seeded_registry(64));

    let mut group = c.benchmark_group("turnstile");
    group.throughput(Throughput::Elements(1));

    group.bench_function("read (uncontended)", |b| {
        b.iter(|| black_box(gate.read().len()));
    });

    group.bench_function("write (uncontended)", |b| {
        b.iter(|| black_box(gate.write().len()));
    });

    group.finish();
}

/// Reads while background readers keep the gate busy, the way display
/// workers do.
fn bench_read_with_readers(c: &mut Criterion) {
    let gate = Arc::new(Turnstile::new(seeded_registry(64)));
    let stop = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..3)
        .map(|_| {
            let gate = Arc::clone(&gate);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    black_box(gate.read().len());
                }
            })
        })
        .collect();

    c.bench_function("turnstile/read (3 background readers)", |b| {
        b.iter(|| black_box(gate.read().len()));
    });

    stop.store(true, Ordering::Relaxed);
    for reader in readers {
        reader.join().unwrap();
    }
}

criterion_group!(benches, bench_uncontended, bench_read_with_readers);
criterion_main!(benches);
