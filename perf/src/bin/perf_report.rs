use std::hint::black_box;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use klaxon_decoder::{DEFAULT_MAX_MESSAGE_LEN, decode};
use klaxon_perf::*;
use klaxon_sync::Turnstile;

const LIVE_ALARMS: u32 = 1024;

fn main() {
    let json_path = std::env::args().nth(1).map(PathBuf::from);
    let mut results: Vec<BenchResult> = Vec::new();

    section_registry(&mut results);
    section_decode(&mut results);
    section_turnstile(&mut results);

    if let Some(path) = json_path {
        match serde_json::to_string_pretty(&results) {
            Ok(json) => match std::fs::write(&path, json) {
                Ok(()) => println!("\n  results written to {}", path.display()),
                Err(e) => eprintln!("failed to write {}: {e}", path.display()),
            },
            Err(e) => eprintln!("failed to serialize results: {e}"),
        }
    }
}

fn section_registry(results: &mut Vec<BenchResult>) {
    section_header(&format!("Registry ({LIVE_ALARMS} live alarms)"));
    print_table_header();

    let mut registry = seeded_registry(LIVE_ALARMS);
    let replace = measure_batched("submit replace", 200, 500, 10, || {
        black_box(registry.submit(create(LIVE_ALARMS, 3, "replacement")));
    });

    // Each iteration inserts then pairs off the same alarm, so the registry
    // returns to its seeded shape.
    let mut next = LIVE_ALARMS * 2 + 1;
    let churn = measure_batched("create + cancel + sweep", 200, 100, 5, || {
        registry.submit(create(next, 2, "churn"));
        registry.submit(cancel(next));
        black_box(registry.sweep());
        next += 2;
    });

    let unmatched = measure_batched("cancel unmatched", 200, 500, 10, || {
        black_box(registry.submit(cancel(1)));
    });

    for r in [replace, churn, unmatched] {
        print_result_row(&r);
        results.push(r);
    }
}

fn section_decode(results: &mut Vec<BenchResult>) {
    section_header("Decoder");
    print_table_header();

    let corpus = command_corpus(4096);
    let mut i = 0;
    let r = measure_batched("decode corpus line", 200, 1000, 5, || {
        black_box(decode(&corpus[i % corpus.len()], DEFAULT_MAX_MESSAGE_LEN).ok());
        i += 1;
    });
    print_result_row(&r);
    results.push(r);
}

/// How long the command thread waits for write access while display workers
/// keep reading.
fn section_turnstile(results: &mut Vec<BenchResult>) {
    section_header("Turnstile writer wait");
    print_table_header();

    for readers in [0usize, 1, 4, 16] {
        let gate = Arc::new(Turnstile::new(seeded_registry(64)));
        let stop = Arc::new(AtomicBool::new(false));

        let workers: Vec<_> = (0..readers)
            .map(|_| {
                let gate = Arc::clone(&gate);
                let stop = Arc::clone(&stop);
                thread::spawn(move || {
                    while !stop.load(Ordering::Relaxed) {
                        black_box(gate.read().len());
                        thread::sleep(Duration::from_micros(50));
                    }
                })
            })
            .collect();

        let r = measure_each(&format!("write() with {readers} readers"), 2000, || {
            let start = Instant::now();
            let guard = gate.write();
            let waited = start.elapsed().as_nanos() as u64;
            drop(guard);
            waited
        });

        stop.store(true, Ordering::Relaxed);
        for worker in workers {
            let _ = worker.join();
        }

        print_result_row(&r);
        results.push(r);
    }
}
