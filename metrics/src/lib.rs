//! Timing and latency-statistics utilities shared by the benchmark
//! harnesses of the latency-sensitive containers.

pub mod hardware;
pub mod recorder;
pub mod timer;

pub use recorder::{LatencyRecorder, LatencyStats};
pub use timer::WallTimer;
