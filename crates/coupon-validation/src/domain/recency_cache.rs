//! Bounded least-recently-used cache
//!
//! [`LruArena`] keeps entries in a `Vec` of slots. Each slot carries the
//! indices of its older and newer neighbours, forming an intrusive recency
//! list, and a hash map resolves keys to slot indices. All operations are
//! O(1) amortized and no per-entry allocation happens once the arena is full:
//! the least recently used slot is recycled in place.
//!
//! [`RecencyCache`] wraps the arena in a single mutex. A read lock would not
//! help: every hit reorders the list.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::num::NonZeroUsize;

use parking_lot::Mutex;

#[derive(Debug)]
struct Slot<K, V> {
    key: K,
    value: V,
    older: Option<usize>,
    newer: Option<usize>,
}

/// Single-threaded LRU map backed by an index-linked arena
#[derive(Debug)]
pub struct LruArena<K, V> {
    slots: Vec<Slot<K, V>>,
    index: HashMap<K, usize>,
    newest: Option<usize>,
    oldest: Option<usize>,
    capacity: usize,
}

impl<K, V> LruArena<K, V>
where
    K: Hash + Eq + Clone,
{
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            slots: Vec::new(),
            index: HashMap::new(),
            newest: None,
            oldest: None,
            capacity: capacity.get(),
        }
    }

    /// Look up a key and mark it most recently used
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.index.get(key)?;
        self.touch(idx);
        Some(&self.slots[idx].value)
    }

    /// Look up a key without changing its recency
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(key).map(|&idx| &self.slots[idx].value)
    }

    /// Insert or update a key, making it most recently used
    ///
    /// Returns the evicted entry when a new key pushed the arena past capacity.
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&idx) = self.index.get(&key) {
            self.slots[idx].value = value;
            self.touch(idx);
            return None;
        }

        if self.slots.len() < self.capacity {
            let idx = self.slots.len();
            self.slots.push(Slot {
                key: key.clone(),
                value,
                older: None,
                newer: None,
            });
            self.index.insert(key, idx);
            self.push_newest(idx);
            return None;
        }

        // Full: recycle the least recently used slot
        let idx = self.oldest?;
        self.detach(idx);
        let evicted_key = std::mem::replace(&mut self.slots[idx].key, key.clone());
        let evicted_value = std::mem::replace(&mut self.slots[idx].value, value);
        self.index.remove(&evicted_key);
        self.index.insert(key, idx);
        self.push_newest(idx);
        Some((evicted_key, evicted_value))
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.index.clear();
        self.newest = None;
        self.oldest = None;
    }

    /// The key that the next insertion of a new key would evict
    pub fn oldest_key(&self) -> Option<&K> {
        self.oldest.map(|idx| &self.slots[idx].key)
    }

    /// Keys ordered from most to least recently used
    pub fn keys_by_recency(&self) -> Vec<&K> {
        let mut keys = Vec::with_capacity(self.len());
        let mut cursor = self.newest;
        while let Some(idx) = cursor {
            keys.push(&self.slots[idx].key);
            cursor = self.slots[idx].older;
        }
        keys
    }

    fn touch(&mut self, idx: usize) {
        if self.newest == Some(idx) {
            return;
        }
        self.detach(idx);
        self.push_newest(idx);
    }

    fn detach(&mut self, idx: usize) {
        let (older, newer) = (self.slots[idx].older, self.slots[idx].newer);
        match older {
            Some(o) => self.slots[o].newer = newer,
            None => self.oldest = newer,
        }
        match newer {
            Some(n) => self.slots[n].older = older,
            None => self.newest = older,
        }
        self.slots[idx].older = None;
        self.slots[idx].newer = None;
    }

    fn push_newest(&mut self, idx: usize) {
        self.slots[idx].older = self.newest;
        self.slots[idx].newer = None;
        match self.newest {
            Some(n) => self.slots[n].newer = Some(idx),
            None => self.oldest = Some(idx),
        }
        self.newest = Some(idx);
    }
}

/// Thread-safe recency cache shared by all validation requests
#[derive(Debug)]
pub struct RecencyCache<K, V> {
    inner: Mutex<LruArena<K, V>>,
}

impl<K, V> RecencyCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            inner: Mutex::new(LruArena::new(capacity)),
        }
    }

    /// Returns the cached value on a hit and refreshes its recency
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().get(key).cloned()
    }

    pub fn set(&self, key: K, value: V) {
        self.inner.lock().insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}
