//! Percentile latency profile for the Robin-Hood table.
//!
//! Not a criterion harness: criterion reports means, while the table's
//! contract is about the tail. This runs a mixed workload, records one
//! sample per operation and prints the interpolated percentile table.
//!
//! Run with: cargo bench --bench latency_profile

use containers::RobinHoodTable;
use metrics::hardware;
use metrics::{LatencyRecorder, WallTimer};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const CAPACITY: usize = 8192;
const SAMPLES: usize = 1_000_000;

fn main() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut table: RobinHoodTable<u64, u64, CAPACITY> = RobinHoodTable::new();

    // Pre-fill to 70% load.
    let mut live = Vec::new();
    while table.len() < CAPACITY * 7 / 10 {
        let key = rng.gen::<u64>();
        if table.put(key, key) {
            live.push(key);
        }
    }

    let mut get_recorder = LatencyRecorder::with_capacity(SAMPLES);
    let mut put_recorder = LatencyRecorder::with_capacity(SAMPLES);

    for i in 0..SAMPLES {
        if i % 10 == 0 {
            // Update a live key; occupancy stays fixed.
            let key = live[rng.gen_range(0..live.len())];
            let value = rng.gen::<u64>();
            let (_, ns) = WallTimer::time(|| table.put(key, value));
            put_recorder.record(ns);
        } else {
            let key = if i % 3 == 0 { rng.gen::<u64>() } else { live[rng.gen_range(0..live.len())] };
            let (found, ns) = WallTimer::time(|| table.get(&key).is_some());
            get_recorder.record(ns);
            std::hint::black_box(found);
        }
    }

    println!("platform: {}", hardware::platform_name());
    println!("cache line: {} B, capacity: {CAPACITY}, load: {:.0}%", hardware::CACHE_LINE_SIZE, 70.0);
    print_stats("get", &get_recorder);
    print_stats("put", &put_recorder);
}

fn print_stats(label: &str, recorder: &LatencyRecorder) {
    let s = recorder.stats();
    println!(
        "{label:>4}: n={:<8} p50={:>7.1}ns p90={:>7.1}ns p99={:>7.1}ns p99.9={:>8.1}ns p99.99={:>8.1}ns max={:>8.1}ns mean={:>7.1}ns",
        s.sample_count, s.p50_ns, s.p90_ns, s.p99_ns, s.p999_ns, s.p9999_ns, s.max_ns, s.mean_ns
    );
}
