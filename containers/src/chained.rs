//! Separately-chained hash table with runtime reconfiguration and live
//! performance instrumentation.
//!
//! Variables:
//!   buckets : Vec<Option<Box<Node>>>  — chain heads, length b
//!   size    : usize                   — live nodes across all chains
//!   id      : u8                      — active mix function ∈ {1,2,3}
//!
//! Equations:
//!   index(k)    = mix(id, std_hash(k)) mod b   (mask when b is a power of two)
//!   load_factor = size / b
//!   grow when load_factor > 0.75: b' = 2b, rehash all nodes
//!
//! Every observable operation (put / get_checked / contains / remove)
//! records one (start_time, latency) sample into a fixed 1000-slot ring.
//! The ring is written from logically-const lookups as well, so it lives
//! behind a `RefCell`; this is part of the table's public contract and is
//! why the table is single-threaded.

use std::cell::RefCell;
use std::collections::hash_map::DefaultHasher;
use std::hash::{BuildHasher, BuildHasherDefault, Hash};
use std::time::Instant;

use serde::Serialize;
use thiserror::Error;

use crate::hash::{mult_mix, xorshift_mix, Fnv1aBuildHasher};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TableError {
    #[error("key not found")]
    KeyNotFound,
    #[error("invalid parameter")]
    InvalidParameter,
}

/// Chain-length distribution over non-empty buckets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CollisionStats {
    pub max_chain_length: usize,
    pub average_chain_length: f64,
    pub variance: f64,
}

/// Latency and throughput over the most recent tracked operations.
///
/// Throughput is computed from the span between the oldest and newest
/// operation *start* times in the window; a zero span reports 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    pub average_latency_ms: f64,
    pub throughput_ops_per_sec: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Configuration {
    pub current_size: usize,
    pub bucket_count: usize,
    pub active_hash_function_id: u8,
}

const MAX_TRACKED_OPS: usize = 1000;
const GROW_LOAD_FACTOR: f64 = 0.75;
pub const DEFAULT_BUCKET_COUNT: usize = 16;

/// Circular buffer of the last `MAX_TRACKED_OPS` operation samples.
#[derive(Debug, Clone)]
struct OpRing {
    samples: Vec<(Instant, f64)>,
    next: usize,
}

impl OpRing {
    fn new() -> Self {
        Self { samples: Vec::with_capacity(MAX_TRACKED_OPS), next: 0 }
    }

    fn record(&mut self, start: Instant) {
        let latency_ms = start.elapsed().as_secs_f64() * 1e3;
        if self.samples.len() < MAX_TRACKED_OPS {
            self.samples.push((start, latency_ms));
        } else {
            self.samples[self.next] = (start, latency_ms);
            self.next = (self.next + 1) % MAX_TRACKED_OPS;
        }
    }

    fn tracked(&self) -> usize {
        self.samples.len()
    }

    /// Last `n` samples in chronological order.
    fn recent(&self, n: usize) -> Vec<(Instant, f64)> {
        let len = self.samples.len();
        let count = n.min(len);
        (len - count..len)
            .map(|logical| {
                let idx = if len < MAX_TRACKED_OPS {
                    logical
                } else {
                    (self.next + logical) % MAX_TRACKED_OPS
                };
                self.samples[idx]
            })
            .collect()
    }
}

struct Node<K, V> {
    key: K,
    value: V,
    next: Option<Box<Node<K, V>>>,
}

pub struct ChainedTable<K, V, S = BuildHasherDefault<DefaultHasher>> {
    buckets: Vec<Option<Box<Node<K, V>>>>,
    size: usize,
    hash_fn_id: u8,
    hasher: S,
    ops: RefCell<OpRing>,
}

/// Chained table specialized for byte-like keys: seeded FNV-1a replaces
/// the platform hash, and the mixers then work over that.
pub type FnvChainedTable<K, V> = ChainedTable<K, V, Fnv1aBuildHasher>;

impl<K: Hash + Eq, V, S: BuildHasher + Default> ChainedTable<K, V, S> {
    pub fn new() -> Self {
        Self::with_bucket_count(DEFAULT_BUCKET_COUNT)
    }

    pub fn with_bucket_count(initial_bucket_count: usize) -> Self {
        let count = initial_bucket_count.max(1);
        Self {
            buckets: empty_buckets(count),
            size: 0,
            hash_fn_id: 1,
            hasher: S::default(),
            ops: RefCell::new(OpRing::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Insert or overwrite. Doubles the bucket array first when the load
    /// factor exceeds 0.75.
    pub fn put(&mut self, key: K, value: V) {
        let start = Instant::now();

        if self.load_factor() > GROW_LOAD_FACTOR {
            self.rehash_into(self.buckets.len() * 2);
        }

        let idx = self.bucket_index(&key);
        match self.find_value_mut(idx, &key) {
            Some(slot) => *slot = value,
            None => {
                let head = self.buckets[idx].take();
                self.buckets[idx] = Some(Box::new(Node { key, value, next: head }));
                self.size += 1;
            }
        }

        self.ops.borrow_mut().record(start);
    }

    pub fn get_checked(&self, key: &K) -> Result<V, TableError>
    where
        V: Clone,
    {
        let start = Instant::now();
        let result = self.find(key).cloned().ok_or(TableError::KeyNotFound);
        self.ops.borrow_mut().record(start);
        result
    }

    pub fn contains(&self, key: &K) -> bool {
        let start = Instant::now();
        let present = self.find(key).is_some();
        self.ops.borrow_mut().record(start);
        present
    }

    /// Remove a key; true when something was removed.
    pub fn remove(&mut self, key: &K) -> bool {
        let start = Instant::now();

        let idx = self.bucket_index(key);
        let mut removed = false;
        let mut link = &mut self.buckets[idx];
        while let Some(mut node) = link.take() {
            if node.key == *key {
                *link = node.next.take();
                self.size -= 1;
                removed = true;
                break;
            }
            *link = Some(node);
            link = match link {
                Some(boxed) => &mut boxed.next,
                None => break,
            };
        }

        self.ops.borrow_mut().record(start);
        removed
    }

    pub fn load_factor(&self) -> f64 {
        if self.buckets.is_empty() {
            return 0.0;
        }
        self.size as f64 / self.buckets.len() as f64
    }

    /// Chain-length statistics over non-empty buckets.
    pub fn collision_stats(&self) -> CollisionStats {
        let mut lengths = Vec::new();
        for head in &self.buckets {
            let mut len = 0usize;
            let mut cursor = head.as_deref();
            while let Some(node) = cursor {
                len += 1;
                cursor = node.next.as_deref();
            }
            if len > 0 {
                lengths.push(len);
            }
        }

        if lengths.is_empty() {
            return CollisionStats { max_chain_length: 0, average_chain_length: 0.0, variance: 0.0 };
        }

        let max = lengths.iter().copied().max().unwrap_or(0);
        let mean = lengths.iter().sum::<usize>() as f64 / lengths.len() as f64;
        let variance = lengths
            .iter()
            .map(|&l| {
                let d = l as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / lengths.len() as f64;

        CollisionStats { max_chain_length: max, average_chain_length: mean, variance }
    }

    /// Metrics over the most recent `min(last_n, tracked, 1000)` operations.
    pub fn performance_metrics(&self, last_n: usize) -> PerformanceMetrics {
        let ops = self.ops.borrow();
        let window = ops.recent(last_n);
        if window.is_empty() {
            return PerformanceMetrics { average_latency_ms: 0.0, throughput_ops_per_sec: 0.0 };
        }

        let average_latency_ms =
            window.iter().map(|&(_, ms)| ms).sum::<f64>() / window.len() as f64;

        let first_start = window[0].0;
        let last_start = window[window.len() - 1].0;
        let span_ms = last_start.duration_since(first_start).as_secs_f64() * 1e3;
        let throughput_ops_per_sec =
            if span_ms > 0.0 { window.len() as f64 * 1000.0 / span_ms } else { 0.0 };

        PerformanceMetrics { average_latency_ms, throughput_ops_per_sec }
    }

    /// Number of operations currently tracked by the metrics ring.
    pub fn tracked_operations(&self) -> usize {
        self.ops.borrow().tracked()
    }

    pub fn configuration(&self) -> Configuration {
        Configuration {
            current_size: self.size,
            bucket_count: self.buckets.len(),
            active_hash_function_id: self.hash_fn_id,
        }
    }

    /// Set the bucket count and rehash every node.
    pub fn execute_resize(&mut self, new_bucket_count: usize) -> Result<(), TableError> {
        if new_bucket_count == 0 {
            return Err(TableError::InvalidParameter);
        }
        self.rehash_into(new_bucket_count);
        Ok(())
    }

    /// Switch the active mix function (1, 2 or 3) and rehash every node.
    pub fn execute_change_hash_function(&mut self, id: u8) -> Result<(), TableError> {
        if !(1..=3).contains(&id) {
            return Err(TableError::InvalidParameter);
        }
        self.hash_fn_id = id;
        let count = self.buckets.len();
        self.rehash_into(count);
        Ok(())
    }

    /// Reconfiguration no-op, kept so callers can treat "leave the table
    /// alone" as one of the runtime actions.
    pub fn execute_do_nothing(&self) {}

    fn find_value_mut(&mut self, idx: usize, key: &K) -> Option<&mut V> {
        let mut cursor = self.buckets[idx].as_deref_mut();
        while let Some(node) = cursor {
            if node.key == *key {
                return Some(&mut node.value);
            }
            cursor = node.next.as_deref_mut();
        }
        None
    }

    fn find(&self, key: &K) -> Option<&V> {
        let idx = self.bucket_index(key);
        let mut cursor = self.buckets[idx].as_deref();
        while let Some(node) = cursor {
            if node.key == *key {
                return Some(&node.value);
            }
            cursor = node.next.as_deref();
        }
        None
    }

    fn bucket_index(&self, key: &K) -> usize {
        let mixed = self.mix(self.hasher.hash_one(key));
        let b = self.buckets.len();
        if b.is_power_of_two() {
            (mixed as usize) & (b - 1)
        } else {
            (mixed as usize) % b
        }
    }

    fn mix(&self, h: u64) -> u64 {
        match self.hash_fn_id {
            2 => xorshift_mix(h),
            3 => mult_mix(h),
            _ => h,
        }
    }

    fn rehash_into(&mut self, new_bucket_count: usize) {
        let old = std::mem::replace(&mut self.buckets, empty_buckets(new_bucket_count));
        for mut head in old {
            while let Some(mut node) = head {
                head = node.next.take();
                let idx = self.bucket_index(&node.key);
                node.next = self.buckets[idx].take();
                self.buckets[idx] = Some(node);
            }
        }
    }
}

impl<K: Hash + Eq, V, S: BuildHasher + Default> Default for ChainedTable<K, V, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> Drop for ChainedTable<K, V, S> {
    fn drop(&mut self) {
        // Unlink chains iteratively so a long chain cannot recurse the
        // default Box drop glue off the stack.
        for head in &mut self.buckets {
            let mut cursor = head.take();
            while let Some(mut node) = cursor {
                cursor = node.next.take();
            }
        }
    }
}

impl<K, V, S> Clone for ChainedTable<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher + Default + Clone,
{
    /// Deep-clones every chain (preserving in-chain order) and the metrics
    /// ring.
    fn clone(&self) -> Self {
        let mut buckets = empty_buckets(self.buckets.len());
        for (i, head) in self.buckets.iter().enumerate() {
            let mut items = Vec::new();
            let mut cursor = head.as_deref();
            while let Some(node) = cursor {
                items.push((node.key.clone(), node.value.clone()));
                cursor = node.next.as_deref();
            }
            // Rebuild from the back so in-chain order is preserved.
            let mut chain = None;
            for (key, value) in items.into_iter().rev() {
                chain = Some(Box::new(Node { key, value, next: chain }));
            }
            buckets[i] = chain;
        }
        Self {
            buckets,
            size: self.size,
            hash_fn_id: self.hash_fn_id,
            hasher: self.hasher.clone(),
            ops: RefCell::new(self.ops.borrow().clone()),
        }
    }
}

fn empty_buckets<K, V>(count: usize) -> Vec<Option<Box<Node<K, V>>>> {
    std::iter::repeat_with(|| None).take(count).collect()
}
