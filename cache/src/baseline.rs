//! Reference LRU design: std `HashMap` into a linked node list.
//!
//! Same contract as the optimized cache; this is the design it is
//! benchmarked against. Nodes are index-linked rather than pointer-linked
//! so the recency splice needs no unsafe and no ownership cycles.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{BuildHasherDefault, Hash};

use crate::CacheError;

const NIL: u32 = u32::MAX;

#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    prev: u32,
    next: u32,
}

#[derive(Debug)]
pub struct BaselineLru<K, V> {
    map: HashMap<K, u32, BuildHasherDefault<DefaultHasher>>,
    nodes: Vec<Option<Node<K, V>>>,
    free: Vec<u32>,
    head: u32,
    tail: u32,
    capacity: usize,
}

impl<K: Hash + Eq + Clone, V> BaselineLru<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity_and_hasher(capacity, BuildHasherDefault::default()),
            nodes: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn set(&mut self, key: K, value: V) -> Result<(), CacheError> {
        if self.capacity == 0 {
            return Err(CacheError::CapacityZero);
        }

        if let Some(&idx) = self.map.get(&key) {
            if let Some(node) = self.nodes[idx as usize].as_mut() {
                node.value = value;
            }
            self.move_to_front(idx);
            return Ok(());
        }

        if self.map.len() == self.capacity {
            self.evict_lru();
        }

        let idx = match self.free.pop() {
            Some(idx) => idx,
            None => {
                self.nodes.push(None);
                (self.nodes.len() - 1) as u32
            }
        };
        self.nodes[idx as usize] =
            Some(Node { key: key.clone(), value, prev: NIL, next: NIL });
        self.map.insert(key, idx);
        self.link_front(idx);
        Ok(())
    }

    pub fn get(&mut self, key: &K) -> Result<V, CacheError>
    where
        V: Clone,
    {
        self.get_ref(key).cloned()
    }

    pub fn get_ref(&mut self, key: &K) -> Result<&V, CacheError> {
        let idx = *self.map.get(key).ok_or(CacheError::KeyNotFound)?;
        self.move_to_front(idx);
        match &self.nodes[idx as usize] {
            Some(node) => Ok(&node.value),
            None => Err(CacheError::KeyNotFound),
        }
    }

    pub fn get_optional(&mut self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.get(key).ok()
    }

    /// Membership check. Does not update recency.
    pub fn has(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.nodes.clear();
        self.free.clear();
        self.head = NIL;
        self.tail = NIL;
    }

    /// Entries from most- to least-recently-used.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter { nodes: &self.nodes, current: self.head }
    }

    fn link_front(&mut self, idx: u32) {
        if let Some(node) = self.nodes[idx as usize].as_mut() {
            node.prev = NIL;
            node.next = self.head;
        }
        if self.head != NIL {
            if let Some(old) = self.nodes[self.head as usize].as_mut() {
                old.prev = idx;
            }
        }
        self.head = idx;
        if self.tail == NIL {
            self.tail = idx;
        }
    }

    fn unlink(&mut self, idx: u32) {
        let (prev, next) = match &self.nodes[idx as usize] {
            Some(node) => (node.prev, node.next),
            None => return,
        };
        if prev != NIL {
            if let Some(node) = self.nodes[prev as usize].as_mut() {
                node.next = next;
            }
        } else {
            self.head = next;
        }
        if next != NIL {
            if let Some(node) = self.nodes[next as usize].as_mut() {
                node.prev = prev;
            }
        } else {
            self.tail = prev;
        }
    }

    fn move_to_front(&mut self, idx: u32) {
        if self.head == idx {
            return;
        }
        self.unlink(idx);
        self.link_front(idx);
    }

    fn evict_lru(&mut self) {
        let victim = self.tail;
        if victim == NIL {
            return;
        }
        self.unlink(victim);
        if let Some(node) = self.nodes[victim as usize].take() {
            self.map.remove(&node.key);
        }
        self.free.push(victim);
    }
}

pub struct Iter<'a, K, V> {
    nodes: &'a [Option<Node<K, V>>],
    current: u32,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current == NIL {
            return None;
        }
        let node = self.nodes[self.current as usize].as_ref()?;
        self.current = node.next;
        Some((&node.key, &node.value))
    }
}
