//! Fixed-capacity latency sample buffer with tail-percentile reporting.
//!
//! The recorder pre-allocates its sample buffer so that `record()` never
//! touches the heap; percentiles are computed with linear interpolation,
//! which keeps p99.9 / p99.99 meaningful on realistic sample counts.

use serde::Serialize;

/// Percentile and distribution summary over one benchmark run.
///
/// All values are nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatencyStats {
    pub p50_ns: f64,
    pub p90_ns: f64,
    pub p95_ns: f64,
    pub p99_ns: f64,
    pub p999_ns: f64,
    pub p9999_ns: f64,
    pub min_ns: f64,
    pub max_ns: f64,
    pub mean_ns: f64,
    pub stddev_ns: f64,
    pub sample_count: usize,
}

impl LatencyStats {
    fn empty() -> Self {
        Self {
            p50_ns: 0.0,
            p90_ns: 0.0,
            p95_ns: 0.0,
            p99_ns: 0.0,
            p999_ns: 0.0,
            p9999_ns: 0.0,
            min_ns: 0.0,
            max_ns: 0.0,
            mean_ns: 0.0,
            stddev_ns: 0.0,
            sample_count: 0,
        }
    }
}

/// Percentile of a sorted sample slice by linear interpolation.
///
/// Interpolation gives materially better tail estimates than nearest-rank
/// at p99.9 and beyond.
pub fn percentile_interpolated(sorted_ns: &[u64], fraction: f64) -> f64 {
    match sorted_ns.len() {
        0 => 0.0,
        1 => sorted_ns[0] as f64,
        n => {
            let index = fraction * (n - 1) as f64;
            let lower = index as usize;
            let upper = (lower + 1).min(n - 1);
            let frac = index - lower as f64;
            sorted_ns[lower] as f64 * (1.0 - frac) + sorted_ns[upper] as f64 * frac
        }
    }
}

/// Pre-allocated latency sample buffer.
///
/// `record()` is allocation-free once constructed; samples past the
/// configured capacity are dropped (and counted) rather than reallocating
/// mid-measurement.
#[derive(Debug)]
pub struct LatencyRecorder {
    samples_ns: Vec<u64>,
    dropped: usize,
}

impl LatencyRecorder {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { samples_ns: Vec::with_capacity(capacity), dropped: 0 }
    }

    #[inline]
    pub fn record(&mut self, latency_ns: u64) {
        if self.samples_ns.len() < self.samples_ns.capacity() {
            self.samples_ns.push(latency_ns);
        } else {
            self.dropped += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.samples_ns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples_ns.is_empty()
    }

    /// Samples dropped because the buffer filled up.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn clear(&mut self) {
        self.samples_ns.clear();
        self.dropped = 0;
    }

    /// Compute the full distribution summary. Sorts a copy of the samples.
    pub fn stats(&self) -> LatencyStats {
        if self.samples_ns.is_empty() {
            return LatencyStats::empty();
        }

        let mut sorted = self.samples_ns.clone();
        sorted.sort_unstable();

        let n = sorted.len();
        let sum: u128 = sorted.iter().map(|&s| u128::from(s)).sum();
        let mean = sum as f64 / n as f64;
        let var = sorted
            .iter()
            .map(|&s| {
                let d = s as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n as f64;

        LatencyStats {
            p50_ns: percentile_interpolated(&sorted, 0.50),
            p90_ns: percentile_interpolated(&sorted, 0.90),
            p95_ns: percentile_interpolated(&sorted, 0.95),
            p99_ns: percentile_interpolated(&sorted, 0.99),
            p999_ns: percentile_interpolated(&sorted, 0.999),
            p9999_ns: percentile_interpolated(&sorted, 0.9999),
            min_ns: sorted[0] as f64,
            max_ns: sorted[n - 1] as f64,
            mean_ns: mean,
            stddev_ns: var.sqrt(),
            sample_count: n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_recorder_reports_zeros() {
        let rec = LatencyRecorder::with_capacity(8);
        let stats = rec.stats();
        assert_eq!(stats.sample_count, 0);
        assert_eq!(stats.p99_ns, 0.0);
    }

    #[test]
    fn percentiles_interpolate_between_samples() {
        // 1..=100: p50 lands between 50 and 51.
        let sorted: Vec<u64> = (1..=100).collect();
        let p50 = percentile_interpolated(&sorted, 0.50);
        assert!((p50 - 50.5).abs() < 1e-9);
        assert_eq!(percentile_interpolated(&sorted, 0.0), 1.0);
        assert_eq!(percentile_interpolated(&sorted, 1.0), 100.0);
    }

    #[test]
    fn recorder_drops_past_capacity() {
        let mut rec = LatencyRecorder::with_capacity(4);
        for i in 0..10 {
            rec.record(i);
        }
        assert_eq!(rec.len(), 4);
        assert_eq!(rec.dropped(), 6);
    }

    #[test]
    fn stats_match_hand_computed_values() {
        let mut rec = LatencyRecorder::with_capacity(4);
        for v in [10, 20, 30, 40] {
            rec.record(v);
        }
        let stats = rec.stats();
        assert_eq!(stats.min_ns, 10.0);
        assert_eq!(stats.max_ns, 40.0);
        assert!((stats.mean_ns - 25.0).abs() < 1e-9);
        assert!((stats.p50_ns - 25.0).abs() < 1e-9);
    }
}
