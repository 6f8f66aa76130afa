//! # Cache Crate
//!
//! Bounded key-value caches with least-recently-used eviction.
//!
//! Two designs with the same contract:
//!
//! - [`LruCache`] – contiguous slot slab, index-linked recency list and a
//!   Robin-Hood bucket index with backward-shift deletion. One allocation
//!   at construction, zero heap traffic in steady state.
//! - [`baseline::BaselineLru`] – std `HashMap` plus a linked node list;
//!   the straightforward design the optimized layout is measured against.

pub mod baseline;
pub mod optimized;

pub use optimized::LruCache;

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CacheError {
    #[error("key not found")]
    KeyNotFound,
    #[error("cache has zero capacity")]
    CapacityZero,
}
