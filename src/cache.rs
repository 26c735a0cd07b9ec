//! Fixed-capacity LRU cache (spec §4.B).
//!
//! Hand-rolled: a `HashMap<K, usize>` index into a slab of nodes linked into
//! a doubly-linked recency list, so `get`/`put` are O(1) amortized. Guarded
//! by a `parking_lot::Mutex` for thread safety — the same primitive
//! `AdaWorldAPI-neo4j-rs` reaches for around its shared mutable model state,
//! since cache operations here are always short and never held across an
//! `.await`.

use std::collections::HashMap;
use std::hash::Hash;

use parking_lot::Mutex;

/// Capacity values `<= 0` fall back to this.
pub const DEFAULT_CAPACITY: usize = 128;

struct Node<K, V> {
    key: K,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

struct Inner<K, V> {
    capacity: usize,
    nodes: Vec<Option<Node<K, V>>>,
    index: HashMap<K, usize>,
    head: Option<usize>, // most recently used
    tail: Option<usize>, // least recently used
    free: Vec<usize>,
}

/// A bounded, thread-safe, most-recently-used-ordered cache.
pub struct LruCache<K, V> {
    inner: Mutex<Inner<K, V>>,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Construct a cache of the given capacity. `capacity == 0` is coerced to
    /// [`DEFAULT_CAPACITY`] — callers can't accidentally construct a cache
    /// that evicts everything it holds.
    pub fn new(capacity: usize) -> Self {
        let capacity = if capacity == 0 { DEFAULT_CAPACITY } else { capacity };
        Self {
            inner: Mutex::new(Inner {
                capacity,
                nodes: Vec::with_capacity(capacity),
                index: HashMap::with_capacity(capacity),
                head: None,
                tail: None,
                free: Vec::new(),
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity
    }

    pub fn len(&self) -> usize {
        self.inner.lock().index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up `key`, promoting it to most-recently-used on a hit.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut inner = self.inner.lock();
        let idx = *inner.index.get(key)?;
        inner.move_to_front(idx);
        inner.nodes[idx].as_ref().map(|n| n.value.clone())
    }

    /// Insert or update `key`. Updating an existing key preserves capacity
    /// and promotes it to most-recently-used; inserting past capacity evicts
    /// the least-recently-used entry first.
    pub fn put(&self, key: K, value: V) {
        let mut inner = self.inner.lock();
        if let Some(&idx) = inner.index.get(&key) {
            inner.nodes[idx].as_mut().unwrap().value = value;
            inner.move_to_front(idx);
            return;
        }
        if inner.index.len() >= inner.capacity {
            inner.evict_lru();
        }
        let idx = inner.alloc_node(key.clone(), value);
        inner.index.insert(key, idx);
        inner.push_front(idx);
    }

    /// Remove `key` if present, returning its value.
    pub fn remove(&self, key: &K) -> Option<V> {
        let mut inner = self.inner.lock();
        let idx = inner.index.remove(key)?;
        inner.unlink(idx);
        let node = inner.nodes[idx].take().unwrap();
        inner.free.push(idx);
        Some(node.value)
    }

    /// The least-recently-used key, if any — used by tests to assert the
    /// eviction property without relying on internal node indices.
    pub fn peek_lru_key(&self) -> Option<K> {
        let inner = self.inner.lock();
        let idx = inner.tail?;
        inner.nodes[idx].as_ref().map(|n| n.key.clone())
    }
}

impl<K, V> Inner<K, V>
where
    K: Eq + Hash + Clone,
{
    fn alloc_node(&mut self, key: K, value: V) -> usize {
        let node = Some(Node {
            key,
            value,
            prev: None,
            next: None,
        });
        if let Some(idx) = self.free.pop() {
            self.nodes[idx] = node;
            idx
        } else {
            self.nodes.push(node);
            self.nodes.len() - 1
        }
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let n = self.nodes[idx].as_ref().unwrap();
            (n.prev, n.next)
        };
        match prev {
            Some(p) => self.nodes[p].as_mut().unwrap().next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.nodes[n].as_mut().unwrap().prev = prev,
            None => self.tail = prev,
        }
        let node = self.nodes[idx].as_mut().unwrap();
        node.prev = None;
        node.next = None;
    }

    fn push_front(&mut self, idx: usize) {
        let old_head = self.head;
        {
            let node = self.nodes[idx].as_mut().unwrap();
            node.prev = None;
            node.next = old_head;
        }
        if let Some(h) = old_head {
            self.nodes[h].as_mut().unwrap().prev = Some(idx);
        }
        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.unlink(idx);
        self.push_front(idx);
    }

    fn evict_lru(&mut self) {
        if let Some(idx) = self.tail {
            self.unlink(idx);
            if let Some(node) = self.nodes[idx].take() {
                self.index.remove(&node.key);
            }
            self.free.push(idx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn zero_capacity_falls_back_to_default() {
        let c: LruCache<i32, i32> = LruCache::new(0);
        assert_eq!(c.capacity(), DEFAULT_CAPACITY);
    }

    #[test]
    fn put_and_get_roundtrip() {
        let c = LruCache::new(4);
        c.put("a", 1);
        c.put("b", 2);
        assert_eq!(c.get(&"a"), Some(1));
        assert_eq!(c.get(&"b"), Some(2));
        assert_eq!(c.get(&"missing"), None);
    }

    #[test]
    fn eviction_drops_least_recently_used() {
        let c = LruCache::new(2);
        c.put("a", 1);
        c.put("b", 2);
        assert_eq!(c.peek_lru_key(), Some("a"));
        c.put("c", 3); // evicts "a"
        assert_eq!(c.get(&"a"), None);
        assert_eq!(c.get(&"b"), Some(2));
        assert_eq!(c.get(&"c"), Some(3));
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn get_refreshes_recency() {
        let c = LruCache::new(2);
        c.put("a", 1);
        c.put("b", 2);
        c.get(&"a"); // "a" is now MRU, "b" is LRU
        c.put("c", 3); // evicts "b", not "a"
        assert_eq!(c.get(&"a"), Some(1));
        assert_eq!(c.get(&"b"), None);
        assert_eq!(c.get(&"c"), Some(3));
    }

    #[test]
    fn update_existing_key_preserves_capacity_and_recency() {
        let c = LruCache::new(2);
        c.put("a", 1);
        c.put("b", 2);
        c.put("a", 10); // update, "a" becomes MRU
        assert_eq!(c.len(), 2);
        assert_eq!(c.peek_lru_key(), Some("b"));
        assert_eq!(c.get(&"a"), Some(10));
    }

    #[test]
    fn capacity_plus_one_unique_keys_evicts_first_key() {
        let c = LruCache::new(8);
        for i in 0..9 {
            c.put(i, i * 10);
        }
        assert_eq!(c.get(&0), None);
        for i in 1..9 {
            assert_eq!(c.get(&i), Some(i * 10));
        }
    }

    #[test]
    fn concurrent_access_is_consistent() {
        let c = Arc::new(LruCache::new(64));
        let mut handles = Vec::new();
        for t in 0..8 {
            let c = Arc::clone(&c);
            handles.push(thread::spawn(move || {
                for i in 0..100 {
                    let key = t * 100 + i;
                    c.put(key, key);
                    let _ = c.get(&key);
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert!(c.len() <= 64);
    }
}
