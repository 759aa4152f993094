use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use klaxon_decoder::{DEFAULT_MAX_MESSAGE_LEN, decode};
use klaxon_perf::command_corpus;

fn bench_single_lines(c: &mut Criterion) {
    let lines = [
        ("create", "10 Message(42) stand up and stretch"),
        ("cancel", "Cancel: Message(42)"),
        ("bad_command", "what is this"),
        ("incorrect_format", "10 Massage(42) typo"),
    ];

    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Elements(1));
    for (name, line) in lines {
        group.bench_function(name, |b| {
            b.iter(|| black_box(decode(black_box(line), DEFAULT_MAX_MESSAGE_LEN)));
        });
    }
    group.finish();
}

fn bench_corpus(c: &mut Criterion) {
    let corpus = command_corpus(1024);

    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Elements(corpus.len() as u64));
    group.bench_function("corpus_1024", |b| {
        b.iter(|| {
            for line in &corpus {
                black_box(decode(line, DEFAULT_MAX_MESSAGE_LEN).ok());
            }
        });
    });
    group.finish();
}

criterion_group!(benches, bench_single_lines, bench_corpus);
criterion_main!(benches);
