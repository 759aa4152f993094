use klaxon_events::{AlarmId, Command};
use klaxon_registry::AlarmRegistry;
use std::time::Instant;

// ─── Statistics ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Stats {
    pub min: u64,
    pub max: u64,
    pub mean: f64,
    pub stddev: f64,
    pub p50: u64,
    pub p90: u64,
    pub p99: u64,
    pub p999: u64,
    pub count: usize,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct BenchResult {
    pub name: String,
    pub unit: String,
    pub stats: Stats,
}

pub fn compute_stats(samples: &mut [u64]) -> Stats {
    assert!(!samples.is_empty(), "cannot compute stats on empty samples");
    samples.sort_unstable();

    let count = samples.len();
    let mean = samples.iter().sum::<u64>() as f64 / count as f64;
    let variance = samples
        .iter()
        .map(|&x| (x as f64 - mean).powi(2))
        .sum::<f64>()
        / count as f64;

    Stats {
        min: samples[0],
        max: samples[count - 1],
        mean,
        stddev: variance.sqrt(),
        p50: percentile_sorted(samples, 50.0),
        p90: percentile_sorted(samples, 90.0),
        p99: percentile_sorted(samples, 99.0),
        p999: percentile_sorted(samples, 99.9),
        count,
    }
}

fn percentile_sorted(sorted: &[u64], pct: f64) -> u64 {
    let len = sorted.len();
    let rank = (pct / 100.0 * len as f64).ceil() as usize;
    sorted[rank.saturating_sub(1).min(len - 1)]
}

// ─── Measurement Harness ────────────────────────────────────────────────────

/// Times `f` in batches and reports nanoseconds per call.
pub fn measure_batched<F: FnMut()>(
    name: &str,
    batches: usize,
    batch_size: usize,
    warmup: usize,
    mut f: F,
) -> BenchResult {
    for _ in 0..warmup * batch_size {
        f();
    }

    let mut samples = Vec::with_capacity(batches);
    for _ in 0..batches {
        let start = Instant::now();
        for _ in 0..batch_size {
            f();
        }
        let per_op = start.elapsed().as_nanos() / batch_size as u128;
        samples.push((per_op as u64).max(1));
    }

    BenchResult {
        name: name.to_string(),
        unit: "ns/op".to_string(),
        stats: compute_stats(&mut samples),
    }
}

/// Collects one nanosecond sample per call, for operations that are already
/// slow enough to time individually (lock handoffs under contention).
pub fn measure_each<F: FnMut() -> u64>(name: &str, samples: usize, mut f: F) -> BenchResult {
    let mut collected: Vec<u64> = (0..samples).map(|_| f()).collect();
    BenchResult {
        name: name.to_string(),
        unit: "ns".to_string(),
        stats: compute_stats(&mut collected),
    }
}

// ─── Fixtures ───────────────────────────────────────────────────────────────

pub fn create(id: u32, interval_seconds: u32, message: &str) -> Command {
    Command::Create {
        id: AlarmId(id),
        interval_seconds,
        message: message.to_owned(),
    }
}

pub fn cancel(id: u32) -> Command {
    Command::Cancel { id: AlarmId(id) }
}

/// Registry holding alarms for every even id in `0..2 * live`, so odd ids
/// always land between existing entries.
pub fn seeded_registry(live: u32) -> AlarmRegistry {
    let mut registry = AlarmRegistry::new();
    for i in 0..live {
        registry.submit(create(i * 2, 1 + i % 60, "seeded alarm"));
    }
    registry
}

/// Operator lines in the command grammar, mixing creates and cancels.
pub fn command_corpus(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            if i % 4 == 3 {
                format!("Cancel: Message({})", i % 500)
            } else {
                format!("{} Message({}) wake up number {i}", 1 + i % 30, i % 500)
            }
        })
        .collect()
}

// ─── Output ─────────────────────────────────────────────────────────────────

pub fn print_table_header() {
    println!(
        "  {:<34} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}  unit",
        "Benchmark", "min", "p50", "p90", "p99", "p99.9", "max",
    );
    println!("  {}", "─".repeat(98));
}

pub fn print_result_row(r: &BenchResult) {
    println!(
        "  {:<34} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}  {}",
        r.name, r.stats.min, r.stats.p50, r.stats.p90, r.stats.p99, r.stats.p999, r.stats.max, r.unit,
    );
}

pub fn section_header(title: &str) {
    println!("\n{}", "─".repeat(90));
    println!("  {title}");
    println!("{}\n", "─".repeat(90));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentiles_of_a_known_series() {
        let mut samples: Vec<u64> = (1..=100).rev().collect();
        let stats = compute_stats(&mut samples);
        assert_eq!(stats.min, 1);
        assert_eq!(stats.max, 100);
        assert_eq!(stats.p50, 50);
        assert_eq!(stats.p90, 90);
        assert_eq!(stats.p99, 99);
        assert_eq!(stats.p999, 100);
        assert!((stats.mean - 50.5).abs() < 1e-9);
    }

    #[test]
    fn single_sample() {
        let stats = compute_stats(&mut [7]);
        assert_eq!((stats.min, stats.p50, stats.p999, stats.max), (7, 7, 7, 7));
        assert_eq!(stats.stddev, 0.0);
    }

    #[test]
    fn seeded_registry_is_sorted_and_sparse() {
        let registry = seeded_registry(50);
        registry.check_invariants().unwrap();
        assert_eq!(registry.len(), 50);
        assert!(registry.live_ids().iter().all(|id| id.0 % 2 == 0));
    }

    #[test]
    fn corpus_decodes() {
        for line in command_corpus(64) {
            let command = klaxon_decoder::decode(&line, 128).unwrap();
            assert!(command.is_some(), "{line}");
        }
    }
}
