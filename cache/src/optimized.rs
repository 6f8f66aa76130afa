//! Slab-backed LRU cache.
//!
//! Variables:
//!   slots   : Vec<Slot>   — capacity entries; occupied ⇔ data is Some
//!   buckets : Vec<Bucket> — Robin-Hood index of slot numbers, 2^k entries
//!   free    : u32         — head of the free list threaded through `next`
//!   head    : u32         — MRU slot;  tail : u32 — LRU slot
//!
//! Equations:
//!   occupied slots       = len, free-list slots = capacity − len
//!   bucket_count         = next_power_of_two(max(16, capacity/0.7))
//!   set at capacity      : evict tail, then insert at head
//!   get / get_ref / set  : splice the touched slot to head
//!   remove from index    : backward-shift (no tombstones)
//!
//! Links are u32 slot numbers with a reserved NIL; no pointers, no
//! ownership cycles. Single allocation per array at construction.

use std::collections::hash_map::DefaultHasher;
use std::hash::{BuildHasher, BuildHasherDefault, Hash};

use crate::CacheError;

const NIL: u32 = u32::MAX;

#[derive(Debug)]
struct Slot<K, V> {
    data: Option<(K, V)>,
    hash: u64,
    prev: u32,
    next: u32,
}

impl<K, V> Slot<K, V> {
    fn vacant(next_free: u32) -> Self {
        Self { data: None, hash: 0, prev: NIL, next: next_free }
    }
}

#[derive(Debug, Clone, Copy)]
struct Bucket {
    slot: u32,
    psl: u32,
}

impl Bucket {
    const EMPTY: Bucket = Bucket { slot: NIL, psl: 0 };

    fn is_empty(self) -> bool {
        self.slot == NIL
    }
}

#[derive(Debug)]
pub struct LruCache<K, V> {
    slots: Vec<Slot<K, V>>,
    buckets: Vec<Bucket>,
    free_head: u32,
    head: u32,
    tail: u32,
    len: usize,
    capacity: usize,
    hasher: BuildHasherDefault<DefaultHasher>,
}

impl<K: Hash + Eq, V> LruCache<K, V> {
    /// Cache holding at most `capacity` entries. Zero capacity builds an
    /// inert cache where every `set` fails.
    pub fn new(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        for i in 0..capacity {
            let next_free = if i + 1 < capacity { (i + 1) as u32 } else { NIL };
            slots.push(Slot::vacant(next_free));
        }

        let bucket_count =
            if capacity == 0 { 0 } else { (capacity * 10 / 7 + 1).max(16).next_power_of_two() };

        Self {
            slots,
            buckets: vec![Bucket::EMPTY; bucket_count],
            free_head: if capacity == 0 { NIL } else { 0 },
            head: NIL,
            tail: NIL,
            len: 0,
            capacity,
            hasher: BuildHasherDefault::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Insert or update, promoting the entry to most-recently-used.
    /// Evicts the least-recently-used entry when inserting at capacity.
    pub fn set(&mut self, key: K, value: V) -> Result<(), CacheError> {
        if self.capacity == 0 {
            return Err(CacheError::CapacityZero);
        }

        let hash = self.hasher.hash_one(&key);
        if let Some(pos) = self.find_bucket(&key, hash) {
            let slot = self.buckets[pos].slot;
            if let Some(data) = self.slots[slot as usize].data.as_mut() {
                data.1 = value;
            }
            self.move_to_mru(slot);
            return Ok(());
        }

        if self.len == self.capacity {
            self.evict_lru();
        }

        let slot = self.alloc_slot();
        self.slots[slot as usize] =
            Slot { data: Some((key, value)), hash, prev: NIL, next: NIL };
        self.insert_bucket(slot, hash);
        self.link_as_mru(slot);
        self.len += 1;
        Ok(())
    }

    /// Value copy; promotes the entry to most-recently-used.
    pub fn get(&mut self, key: &K) -> Result<V, CacheError>
    where
        V: Clone,
    {
        self.get_ref(key).cloned()
    }

    /// Borrowed value; promotes the entry to most-recently-used. The
    /// reference is valid until the next mutating call.
    pub fn get_ref(&mut self, key: &K) -> Result<&V, CacheError> {
        let hash = self.hasher.hash_one(key);
        let pos = self.find_bucket(key, hash).ok_or(CacheError::KeyNotFound)?;
        let slot = self.buckets[pos].slot;
        self.move_to_mru(slot);
        match &self.slots[slot as usize].data {
            Some((_, value)) => Ok(value),
            None => Err(CacheError::KeyNotFound),
        }
    }

    /// Value-or-none convenience over `get`.
    pub fn get_optional(&mut self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.get(key).ok()
    }

    /// Membership check. Does not update recency.
    pub fn has(&self, key: &K) -> bool {
        let hash = self.hasher.hash_one(key);
        self.find_bucket(key, hash).is_some()
    }

    /// Drop every entry, zero the index and re-thread the free list in
    /// slot order. Capacity is preserved.
    pub fn clear(&mut self) {
        let capacity = self.capacity;
        for (i, slot) in self.slots.iter_mut().enumerate() {
            let next_free = if i + 1 < capacity { (i + 1) as u32 } else { NIL };
            *slot = Slot::vacant(next_free);
        }
        for bucket in &mut self.buckets {
            *bucket = Bucket::EMPTY;
        }
        self.free_head = if capacity == 0 { NIL } else { 0 };
        self.head = NIL;
        self.tail = NIL;
        self.len = 0;
    }

    /// Entries from most- to least-recently-used. Iteration does not
    /// update recency.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter { slots: &self.slots, current: self.head }
    }

    // Robin-Hood bucket index -------------------------------------------

    fn bucket_mask(&self) -> usize {
        self.buckets.len() - 1
    }

    fn find_bucket(&self, key: &K, hash: u64) -> Option<usize> {
        if self.buckets.is_empty() {
            return None;
        }
        let mask = self.bucket_mask();
        let mut pos = hash as usize & mask;
        let mut psl = 0u32;
        loop {
            let bucket = self.buckets[pos];
            if bucket.is_empty() || bucket.psl < psl {
                return None;
            }
            let slot = &self.slots[bucket.slot as usize];
            if slot.hash == hash {
                if let Some((k, _)) = &slot.data {
                    if k == key {
                        return Some(pos);
                    }
                }
            }
            pos = (pos + 1) & mask;
            psl += 1;
        }
    }

    fn insert_bucket(&mut self, slot: u32, hash: u64) {
        let mask = self.bucket_mask();
        let mut pos = hash as usize & mask;
        let mut entry = Bucket { slot, psl: 0 };
        loop {
            if self.buckets[pos].is_empty() {
                self.buckets[pos] = entry;
                return;
            }
            if self.buckets[pos].psl < entry.psl {
                std::mem::swap(&mut self.buckets[pos], &mut entry);
            }
            pos = (pos + 1) & mask;
            entry.psl += 1;
        }
    }

    /// Remove the bucket that references `slot`, closing the probe run by
    /// backward-shifting instead of leaving a tombstone.
    fn remove_bucket(&mut self, slot: u32) {
        let mask = self.bucket_mask();
        let hash = self.slots[slot as usize].hash;
        let mut pos = hash as usize & mask;
        while self.buckets[pos].slot != slot {
            pos = (pos + 1) & mask;
        }
        self.buckets[pos] = Bucket::EMPTY;

        let mut prev = pos;
        let mut cur = (pos + 1) & mask;
        while !self.buckets[cur].is_empty() && self.buckets[cur].psl > 0 {
            self.buckets[prev] = Bucket { slot: self.buckets[cur].slot, psl: self.buckets[cur].psl - 1 };
            self.buckets[cur] = Bucket::EMPTY;
            prev = cur;
            cur = (cur + 1) & mask;
        }
    }

    // Slab free list -----------------------------------------------------

    fn alloc_slot(&mut self) -> u32 {
        let slot = self.free_head;
        debug_assert_ne!(slot, NIL, "allocation requested from a full slab");
        self.free_head = self.slots[slot as usize].next;
        slot
    }

    fn free_slot(&mut self, slot: u32) {
        self.slots[slot as usize] = Slot::vacant(self.free_head);
        self.free_head = slot;
    }

    // Recency list -------------------------------------------------------

    fn link_as_mru(&mut self, slot: u32) {
        let s = &mut self.slots[slot as usize];
        s.prev = NIL;
        s.next = self.head;
        if self.head != NIL {
            self.slots[self.head as usize].prev = slot;
        }
        self.head = slot;
        if self.tail == NIL {
            self.tail = slot;
        }
    }

    fn unlink(&mut self, slot: u32) {
        let (prev, next) = {
            let s = &self.slots[slot as usize];
            (s.prev, s.next)
        };
        if prev != NIL {
            self.slots[prev as usize].next = next;
        } else {
            self.head = next;
        }
        if next != NIL {
            self.slots[next as usize].prev = prev;
        } else {
            self.tail = prev;
        }
    }

    fn move_to_mru(&mut self, slot: u32) {
        if self.head == slot {
            return;
        }
        self.unlink(slot);
        self.link_as_mru(slot);
    }

    fn evict_lru(&mut self) {
        let victim = self.tail;
        if victim == NIL {
            return;
        }
        self.remove_bucket(victim);
        self.unlink(victim);
        self.slots[victim as usize].data = None;
        self.free_slot(victim);
        self.len -= 1;
    }
}

impl<K: Hash + Eq, V> Default for LruCache<K, V> {
    /// Inert zero-capacity cache, the post-move state of a taken cache.
    fn default() -> Self {
        Self::new(0)
    }
}

pub struct Iter<'a, K, V> {
    slots: &'a [Slot<K, V>],
    current: u32,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current == NIL {
            return None;
        }
        let slot = &self.slots[self.current as usize];
        self.current = slot.next;
        slot.data.as_ref().map(|(k, v)| (k, v))
    }
}
