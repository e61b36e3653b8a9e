//! In-memory bounded cache for upstream-derived responses.
//!
//! Process-lifetime only. Entries leave the cache solely through capacity
//! eviction (least recently used first).

use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::UserType;

/// Key for cached analysis reports.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnalysisKey {
    /// See [`crate::domain::Location::cache_fingerprint`].
    pub zone: String,
    pub days: u32,
    pub user_type: UserType,
}

/// Key for cached climate series.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClimateKey {
    pub zone: String,
    pub days: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
    pub capacity: usize,
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

pub struct ResponseCache<K, V> {
    entries: Mutex<LruCache<K, V>>,
    counters: Counters,
}

impl<K: Hash + Eq, V: Clone> ResponseCache<K, V> {
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            counters: Counters::default(),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let hit = self.entries.lock().get(key).cloned();
        let counter = if hit.is_some() {
            &self.counters.hits
        } else {
            &self.counters.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        hit
    }

    /// Insert or replace; evicts the least recently used entry when full.
    pub fn insert(&self, key: K, value: V) {
        let mut entries = self.entries.lock();
        let full = entries.len() == entries.cap().get();
        if full && !entries.contains(&key) && entries.pop_lru().is_some() {
            self.counters.evictions.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(capacity = entries.cap().get(), "cache evicted oldest entry");
        }
        entries.put(key, value);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock();
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
            entries: entries.len(),
            capacity: entries.cap().get(),
        }
    }
}
