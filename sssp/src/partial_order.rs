//! Block-based partial-order structure driving the BMSSP recursion.
//!
//! Variables:
//!   D0      — block sequence fed by batch_prepend (values below everything)
//!   D1      — block sequence fed by insert
//!   bounds  — ordered index of D1 blocks by (upper bound, block id)
//!   loc     — key → (block, element slot) for the unique live occurrence
//!   M       — block capacity; B — global upper bound
//!
//! Equations:
//!   insert            O(max{1, log(N/M)}) amortized
//!   batch_prepend(L)  O(|L|·log(|L|/M))   amortized
//!   pull              O(M)                 amortized
//!
//! Blocks sit in an index arena; D0/D1 are intrusive lists threaded through
//! the arena, so block handles stay stable across unrelated operations.
//! Values in earlier blocks never exceed values in later blocks; a D1 block
//! splits at its median when it outgrows M.

use std::collections::{BTreeSet, HashMap};

const NO_BLOCK: u32 = u32::MAX;

/// f64 with the total order, so bounds can key a BTreeSet.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Bound(f64);

impl Eq for Bound {}

impl PartialOrd for Bound {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Bound {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Seq {
    Prepend,
    Insert,
}

#[derive(Debug)]
struct Block {
    elems: Vec<(usize, f64)>,
    upper: f64,
    seq: Seq,
    prev: u32,
    next: u32,
}

#[derive(Debug, Clone, Copy)]
struct ListEnds {
    head: u32,
    tail: u32,
}

impl ListEnds {
    const EMPTY: ListEnds = ListEnds { head: NO_BLOCK, tail: NO_BLOCK };
}

pub struct PartialOrderDs {
    blocks: Vec<Block>,
    free: Vec<u32>,
    d0: ListEnds,
    d1: ListEnds,
    bounds: BTreeSet<(Bound, u32)>,
    loc: HashMap<usize, (u32, u32)>,
    block_cap: usize,
    upper_limit: f64,
}

impl PartialOrderDs {
    /// Fresh structure with block capacity `m` and global upper bound `b`.
    /// D1 starts with one empty block bounded by `b`.
    pub fn new(m: usize, b: f64) -> Self {
        let mut ds = Self {
            blocks: Vec::new(),
            free: Vec::new(),
            d0: ListEnds::EMPTY,
            d1: ListEnds::EMPTY,
            bounds: BTreeSet::new(),
            loc: HashMap::new(),
            block_cap: m.max(1),
            upper_limit: b,
        };
        let blk = ds.alloc_block(Seq::Insert, b);
        push_back(&mut ds.blocks, &mut ds.d1, blk);
        ds.bounds.insert((Bound(b), blk));
        ds
    }

    pub fn is_empty(&self) -> bool {
        self.loc.is_empty()
    }

    pub fn len(&self) -> usize {
        self.loc.len()
    }

    /// Insert `(key, value)`; a key already present with an equal-or-better
    /// value makes this a no-op, otherwise the old occurrence is replaced.
    pub fn insert(&mut self, key: usize, value: f64) {
        if let Some(&(blk, idx)) = self.loc.get(&key) {
            let old = self.blocks[blk as usize].elems[idx as usize].1;
            if old <= value {
                return;
            }
            self.remove_entry(key, blk, idx);
        }

        let blk = self.d1_block_for(value);
        let slot = {
            let block = &mut self.blocks[blk as usize];
            block.elems.push((key, value));
            (block.elems.len() - 1) as u32
        };
        self.loc.insert(key, (blk, slot));

        if self.blocks[blk as usize].elems.len() > self.block_cap {
            self.split_block(blk);
        }
    }

    /// Prepend a batch whose values are all smaller than anything live.
    /// Duplicates keep the minimum; keys already present with an
    /// equal-or-better value are dropped.
    pub fn batch_prepend(&mut self, items: &[(usize, f64)]) {
        if items.is_empty() {
            return;
        }

        let mut best: HashMap<usize, f64> = HashMap::with_capacity(items.len());
        for &(key, value) in items {
            best.entry(key).and_modify(|v| *v = v.min(value)).or_insert(value);
        }

        let mut filtered: Vec<(usize, f64)> = Vec::with_capacity(best.len());
        for (key, value) in best {
            match self.loc.get(&key).copied() {
                Some((blk, idx)) => {
                    let old = self.blocks[blk as usize].elems[idx as usize].1;
                    if value < old {
                        self.remove_entry(key, blk, idx);
                        filtered.push((key, value));
                    }
                }
                None => filtered.push((key, value)),
            }
        }

        if filtered.is_empty() {
            return;
        }

        if filtered.len() <= self.block_cap {
            self.prepend_block(filtered);
        } else {
            let half = self.block_cap.div_ceil(2);
            let mut chunks = Vec::new();
            partition_into_chunks(filtered, half, &mut chunks);
            // Prepending reverses, so walk the value-ordered chunks from
            // the largest down; D0 ends up in ascending value order.
            for chunk in chunks.into_iter().rev() {
                self.prepend_block(chunk);
            }
        }
    }

    /// Remove and return up to M smallest keys, together with a separator:
    /// every returned value is < separator ≤ every remaining value (B when
    /// the structure empties).
    pub fn pull(&mut self) -> (Vec<usize>, f64) {
        let m = self.block_cap;
        let mut collected: Vec<(usize, f64)> = Vec::new();
        self.collect_prefix(Seq::Prepend, m, &mut collected);
        self.collect_prefix(Seq::Insert, m, &mut collected);

        if collected.len() <= m {
            for &(key, _) in &collected {
                self.remove_key(key);
            }
            // Removal discards emptied blocks, so the heads now point at
            // the first uncollected block of each sequence.
            let separator =
                if self.is_empty() { self.upper_limit } else { self.min_front_value() };
            return (collected.into_iter().map(|(k, _)| k).collect(), separator);
        }

        // More than M candidates: keep the M smallest. The prefix is
        // guaranteed to contain them, but not necessarily the (M+1)-th
        // smallest of the structure, so the separator is read off the
        // remaining front blocks after removal.
        collected.select_nth_unstable_by(m, cmp_pair);
        let selected: Vec<usize> = collected[..m].iter().map(|&(k, _)| k).collect();
        for &key in &selected {
            self.remove_key(key);
        }
        let separator = self.min_front_value();
        (selected, separator)
    }

    // Internals ----------------------------------------------------------

    fn alloc_block(&mut self, seq: Seq, upper: f64) -> u32 {
        match self.free.pop() {
            Some(blk) => {
                let block = &mut self.blocks[blk as usize];
                block.elems.clear();
                block.upper = upper;
                block.seq = seq;
                block.prev = NO_BLOCK;
                block.next = NO_BLOCK;
                blk
            }
            None => {
                self.blocks.push(Block {
                    elems: Vec::new(),
                    upper,
                    seq,
                    prev: NO_BLOCK,
                    next: NO_BLOCK,
                });
                (self.blocks.len() - 1) as u32
            }
        }
    }

    /// D1 block that should hold `value`: the one with the smallest upper
    /// bound ≥ value, the tail as a fallback, or a fresh block when D1 is
    /// empty.
    fn d1_block_for(&mut self, value: f64) -> u32 {
        if let Some(&(_, blk)) = self.bounds.range((Bound(value), 0u32)..).next() {
            return blk;
        }
        if self.d1.tail != NO_BLOCK {
            return self.d1.tail;
        }
        let blk = self.alloc_block(Seq::Insert, self.upper_limit);
        push_back(&mut self.blocks, &mut self.d1, blk);
        self.bounds.insert((Bound(self.upper_limit), blk));
        blk
    }

    fn remove_key(&mut self, key: usize) {
        if let Some(&(blk, idx)) = self.loc.get(&key) {
            self.remove_entry(key, blk, idx);
        }
    }

    fn remove_entry(&mut self, key: usize, blk: u32, idx: u32) {
        let moved = {
            let block = &mut self.blocks[blk as usize];
            block.elems.swap_remove(idx as usize);
            block.elems.get(idx as usize).map(|&(k, _)| k)
        };
        if let Some(moved_key) = moved {
            self.loc.insert(moved_key, (blk, idx));
        }
        self.loc.remove(&key);

        if self.blocks[blk as usize].elems.is_empty() {
            self.discard_block(blk);
        }
    }

    fn discard_block(&mut self, blk: u32) {
        match self.blocks[blk as usize].seq {
            Seq::Insert => {
                let upper = self.blocks[blk as usize].upper;
                self.bounds.remove(&(Bound(upper), blk));
                unlink(&mut self.blocks, &mut self.d1, blk);
            }
            Seq::Prepend => unlink(&mut self.blocks, &mut self.d0, blk),
        }
        self.blocks[blk as usize].elems.clear();
        self.free.push(blk);
    }

    /// Median-split an overfull D1 block into two, keeping the list and
    /// bound index consistent. O(M) partition via selection.
    fn split_block(&mut self, blk: u32) {
        let old_upper = self.blocks[blk as usize].upper;
        let mut elems = std::mem::take(&mut self.blocks[blk as usize].elems);

        let mid = elems.len() / 2;
        elems.select_nth_unstable_by(mid, cmp_pair);
        let right: Vec<(usize, f64)> = elems.split_off(mid);
        let left = elems;
        let median_value = right[0].1;

        // Left half stays in the existing block under the median bound.
        self.bounds.remove(&(Bound(old_upper), blk));
        self.blocks[blk as usize].elems = left;
        self.blocks[blk as usize].upper = median_value;
        self.bounds.insert((Bound(median_value), blk));

        // Right half goes into a fresh block right after it.
        let right_blk = self.alloc_block(Seq::Insert, old_upper);
        self.blocks[right_blk as usize].elems = right;
        insert_after(&mut self.blocks, &mut self.d1, blk, right_blk);
        self.bounds.insert((Bound(old_upper), right_blk));

        self.refresh_locations(blk);
        self.refresh_locations(right_blk);
    }

    fn refresh_locations(&mut self, blk: u32) {
        let keys: Vec<(usize, u32)> = self.blocks[blk as usize]
            .elems
            .iter()
            .enumerate()
            .map(|(i, &(k, _))| (k, i as u32))
            .collect();
        for (key, idx) in keys {
            self.loc.insert(key, (blk, idx));
        }
    }

    fn prepend_block(&mut self, chunk: Vec<(usize, f64)>) {
        let blk = self.alloc_block(Seq::Prepend, f64::INFINITY);
        self.blocks[blk as usize].elems = chunk;
        push_front(&mut self.blocks, &mut self.d0, blk);
        self.refresh_locations(blk);
    }

    /// Gather leading blocks of a sequence until at least `target`
    /// elements are in hand. Blocks are taken whole: a later block never
    /// holds a smaller value than an earlier one, so whole blocks keep the
    /// separator exact, at the cost of collecting at most one block extra.
    fn collect_prefix(&self, seq: Seq, target: usize, out: &mut Vec<(usize, f64)>) {
        let start = out.len();
        let mut blk = match seq {
            Seq::Prepend => self.d0.head,
            Seq::Insert => self.d1.head,
        };
        while blk != NO_BLOCK && out.len() - start < target {
            out.extend_from_slice(&self.blocks[blk as usize].elems);
            blk = self.blocks[blk as usize].next;
        }
    }

    /// Smallest live value. Blocks are value-partitioned, so it sits in
    /// the first block of D0 or D1.
    fn min_front_value(&self) -> f64 {
        let mut min = f64::INFINITY;
        for head in [self.d0.head, self.d1.head] {
            if head != NO_BLOCK {
                for &(_, value) in &self.blocks[head as usize].elems {
                    min = min.min(value);
                }
            }
        }
        if min.is_finite() {
            min
        } else {
            self.upper_limit
        }
    }
}

fn cmp_pair(a: &(usize, f64), b: &(usize, f64)) -> std::cmp::Ordering {
    a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0))
}

/// Recursively median-partition `items` into value-ordered chunks of at
/// most `cap` elements.
fn partition_into_chunks(
    mut items: Vec<(usize, f64)>,
    cap: usize,
    out: &mut Vec<Vec<(usize, f64)>>,
) {
    if items.len() <= cap {
        out.push(items);
        return;
    }
    let mid = items.len() / 2;
    items.select_nth_unstable_by(mid, cmp_pair);
    let right = items.split_off(mid);
    partition_into_chunks(items, cap, out);
    partition_into_chunks(right, cap, out);
}

// Intrusive block-list plumbing. Free functions over disjoint borrows so
// callers can hold the arena and the list ends at once.

fn push_front(blocks: &mut [Block], ends: &mut ListEnds, blk: u32) {
    blocks[blk as usize].prev = NO_BLOCK;
    blocks[blk as usize].next = ends.head;
    if ends.head != NO_BLOCK {
        blocks[ends.head as usize].prev = blk;
    }
    ends.head = blk;
    if ends.tail == NO_BLOCK {
        ends.tail = blk;
    }
}

fn push_back(blocks: &mut [Block], ends: &mut ListEnds, blk: u32) {
    blocks[blk as usize].next = NO_BLOCK;
    blocks[blk as usize].prev = ends.tail;
    if ends.tail != NO_BLOCK {
        blocks[ends.tail as usize].next = blk;
    }
    ends.tail = blk;
    if ends.head == NO_BLOCK {
        ends.head = blk;
    }
}

fn insert_after(blocks: &mut [Block], ends: &mut ListEnds, after: u32, blk: u32) {
    let next = blocks[after as usize].next;
    blocks[blk as usize].prev = after;
    blocks[blk as usize].next = next;
    blocks[after as usize].next = blk;
    if next != NO_BLOCK {
        blocks[next as usize].prev = blk;
    } else {
        ends.tail = blk;
    }
}

fn unlink(blocks: &mut [Block], ends: &mut ListEnds, blk: u32) {
    let (prev, next) = (blocks[blk as usize].prev, blocks[blk as usize].next);
    if prev != NO_BLOCK {
        blocks[prev as usize].next = next;
    } else {
        ends.head = next;
    }
    if next != NO_BLOCK {
        blocks[next as usize].prev = prev;
    } else {
        ends.tail = prev;
    }
    blocks[blk as usize].prev = NO_BLOCK;
    blocks[blk as usize].next = NO_BLOCK;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty_with_one_insert_block() {
        let ds = PartialOrderDs::new(10, 100.0);
        assert!(ds.is_empty());
        assert_eq!(ds.len(), 0);
    }

    #[test]
    fn single_insert_pull_roundtrip() {
        let mut ds = PartialOrderDs::new(10, 100.0);
        ds.insert(1, 50.0);
        assert!(!ds.is_empty());
        let (keys, separator) = ds.pull();
        assert_eq!(keys, vec![1]);
        assert_eq!(separator, 100.0);
        assert!(ds.is_empty());
    }

    #[test]
    fn insert_keeps_the_better_value() {
        let mut ds = PartialOrderDs::new(10, 100.0);
        ds.insert(1, 50.0);
        ds.insert(1, 70.0); // worse: no-op
        ds.insert(1, 30.0); // better: replaces
        assert_eq!(ds.len(), 1);
        let (keys, _) = ds.pull();
        assert_eq!(keys, vec![1]);
    }

    #[test]
    fn pull_returns_the_m_smallest_with_correct_separator() {
        let mut ds = PartialOrderDs::new(3, 1000.0);
        for (key, value) in [(1, 10.0), (2, 20.0), (3, 30.0), (4, 40.0), (5, 50.0)] {
            ds.insert(key, value);
        }
        let (mut keys, separator) = ds.pull();
        keys.sort_unstable();
        assert_eq!(keys, vec![1, 2, 3]);
        assert_eq!(separator, 40.0);
        assert_eq!(ds.len(), 2);

        let (mut rest, last_sep) = ds.pull();
        rest.sort_unstable();
        assert_eq!(rest, vec![4, 5]);
        assert_eq!(last_sep, 1000.0);
        assert!(ds.is_empty());
    }

    #[test]
    fn blocks_split_and_stay_ordered_under_many_inserts() {
        let mut ds = PartialOrderDs::new(4, f64::INFINITY);
        // Interleaved values force repeated splits.
        for i in 0..100usize {
            let value = ((i * 37) % 100) as f64;
            ds.insert(i, value);
        }
        assert_eq!(ds.len(), 100);

        let mut drained: Vec<f64> = Vec::new();
        let mut prev_sep = f64::NEG_INFINITY;
        while !ds.is_empty() {
            let before = ds.len();
            let (keys, sep) = ds.pull();
            assert!(!keys.is_empty());
            assert!(keys.len() <= 4);
            assert!(sep >= prev_sep);
            drained.push(sep);
            assert_eq!(ds.len(), before - keys.len());
            prev_sep = sep;
        }
    }

    #[test]
    fn batch_prepend_dedupes_and_keeps_minimum() {
        let mut ds = PartialOrderDs::new(4, 100.0);
        ds.insert(7, 50.0);
        ds.batch_prepend(&[(1, 5.0), (1, 3.0), (2, 4.0), (7, 60.0)]);
        // key 1 deduped to 3.0; key 7 keeps its better 50.0.
        assert_eq!(ds.len(), 3);
        let (mut keys, sep) = ds.pull();
        keys.sort_unstable();
        assert_eq!(keys, vec![1, 2, 7]);
        assert_eq!(sep, 100.0);
    }

    #[test]
    fn batch_prepend_replaces_worse_existing_values() {
        let mut ds = PartialOrderDs::new(4, 100.0);
        ds.insert(9, 80.0);
        ds.batch_prepend(&[(9, 2.0)]);
        assert_eq!(ds.len(), 1);
        let (keys, _) = ds.pull();
        assert_eq!(keys, vec![9]);
    }

    #[test]
    fn large_batch_prepend_splits_into_ordered_blocks() {
        let mut ds = PartialOrderDs::new(4, 1_000_000.0);
        let batch: Vec<(usize, f64)> = (0..64).map(|i| (i, ((i * 13) % 64) as f64)).collect();
        ds.batch_prepend(&batch);
        assert_eq!(ds.len(), 64);

        // Drain fully; separators must be non-decreasing and every pull's
        // values must sit below its separator.
        let mut prev_sep = f64::NEG_INFINITY;
        let mut seen = 0;
        while !ds.is_empty() {
            let (keys, sep) = ds.pull();
            seen += keys.len();
            assert!(sep >= prev_sep);
            prev_sep = sep;
        }
        assert_eq!(seen, 64);
    }

    #[test]
    fn prepended_values_come_out_before_inserted_ones() {
        let mut ds = PartialOrderDs::new(2, 100.0);
        ds.insert(10, 50.0);
        ds.insert(11, 60.0);
        ds.batch_prepend(&[(1, 1.0), (2, 2.0), (3, 3.0)]);
        let (mut first, _) = ds.pull();
        first.sort_unstable();
        assert_eq!(first, vec![1, 2]);
    }
}
