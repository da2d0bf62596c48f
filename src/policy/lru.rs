//! # Least Recently Used (LRU) Snapshot
//!
//! Immutable LRU policy with a capacity `threshold`. Once the snapshot holds
//! `threshold` entries, inserting a new key first evicts the least recently
//! used one.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                        LruSnapshot<K, V>                             │
//!   │                                                                      │
//!   │   entries: Arc<FxHashMap<K, Entry<V>>>      order: Arc<BTreeMap>     │
//!   │                                                                      │
//!   │   ┌─────────┬─────────────────┐             ┌──────┬─────────┐       │
//!   │   │   Key   │ value  │ tick   │             │ tick │   Key   │       │
//!   │   ├─────────┼────────┼────────┤             ├──────┼─────────┤       │
//!   │   │  page_1 │  v1    │   7    │ ◄─────────► │   3  │  page_3 │ LRU   │
//!   │   │  page_2 │  v2    │   5    │             │   5  │  page_2 │       │
//!   │   │  page_3 │  v3    │   3    │             │   7  │  page_1 │ MRU   │
//!   │   └─────────┴────────┴────────┘             └──────┴─────────┘       │
//!   │                                                                      │
//!   │   tick: u64 (last issued)        threshold: usize                    │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations Flow
//!
//! ```text
//!   miss(D) with threshold = 3
//!   ═══════════════════════════════════════════════════════════════════
//!
//!   Before:   order = { 3: C, 5: B, 7: A }      (C is LRU)
//!
//!   1. D not present and len == threshold → drop first order entry (C)
//!   2. tick = 8, insert D
//!
//!   After:    order = { 5: B, 7: A, 8: D }
//!
//!   hit(B)
//!   ═══════════════════════════════════════════════════════════════════
//!
//!   1. tick = 9, move B from 5 to 9
//!
//!   After:    order = { 7: A, 8: D, 9: B }
//! ```
//!
//! `lookup` and `has` never change recency; only `hit` and `miss` do.
//!
//! ## Operations
//!
//! | Operation | Time     | Notes                                     |
//! |-----------|----------|-------------------------------------------|
//! | `lookup`  | O(1)     | map lookup                                |
//! | `has`     | O(1)     | map lookup                                |
//! | `hit`     | O(n)     | copies map and order, refreshes tick      |
//! | `miss`    | O(n)     | copies, may evict LRU, inserts            |
//! | `evict`   | O(n)     | copies only if key present                |
//! | `seed`    | O(m log m) | sequential misses on an empty snapshot  |

use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::ConfigError;
use crate::traits::CacheSnapshot;

/// Default maximum number of entries before eviction starts.
pub const DEFAULT_LRU_THRESHOLD: usize = 32;

/// Validated LRU configuration.
///
/// # Example
///
/// ```
/// use swapcache::policy::lru::{DEFAULT_LRU_THRESHOLD, LruConfig};
///
/// assert_eq!(LruConfig::default().threshold(), DEFAULT_LRU_THRESHOLD);
/// assert!(LruConfig::try_new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LruConfig {
    threshold: usize,
}

impl LruConfig {
    /// Validates `threshold` (must be > 0).
    pub fn try_new(threshold: usize) -> Result<Self, ConfigError> {
        if threshold == 0 {
            return Err(ConfigError::new("LRU threshold must be > 0"));
        }
        Ok(Self { threshold })
    }

    /// Maximum number of entries.
    #[inline]
    pub fn threshold(&self) -> usize {
        self.threshold
    }
}

impl Default for LruConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_LRU_THRESHOLD,
        }
    }
}

struct Entry<V> {
    value: Arc<V>,
    tick: u64,
}

impl<V> Clone for Entry<V> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            tick: self.tick,
        }
    }
}

/// Immutable LRU snapshot.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use swapcache::policy::lru::LruSnapshot;
/// use swapcache::traits::CacheSnapshot;
///
/// let s = LruSnapshot::new(2)
///     .miss(1, Arc::new("one"))
///     .miss(2, Arc::new("two"))
///     .hit(&1)
///     .miss(3, Arc::new("three"));
///
/// // 2 was least recently used
/// assert!(!s.has(&2));
/// assert!(s.has(&1));
/// assert!(s.has(&3));
/// ```
pub struct LruSnapshot<K, V> {
    entries: Arc<FxHashMap<K, Entry<V>>>,
    order: Arc<BTreeMap<u64, K>>,
    tick: u64,
    threshold: usize,
}

impl<K, V> LruSnapshot<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Creates an empty snapshot holding at most `threshold` entries.
    ///
    /// A threshold of 0 creates a snapshot that accepts no entries.
    pub fn new(threshold: usize) -> Self {
        Self {
            entries: Arc::new(FxHashMap::default()),
            order: Arc::new(BTreeMap::new()),
            tick: 0,
            threshold,
        }
    }

    /// Creates an empty snapshot from a validated configuration.
    pub fn with_config(config: LruConfig) -> Self {
        Self::new(config.threshold())
    }

    /// Maximum number of entries.
    #[inline]
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Returns the least recently used entry without changing recency.
    pub fn peek_lru(&self) -> Option<(&K, &Arc<V>)> {
        let (_, key) = self.order.first_key_value()?;
        self.entries.get(key).map(|entry| (key, &entry.value))
    }

    /// Returns the recency rank of `key` (0 = most recently used).
    pub fn recency_rank(&self, key: &K) -> Option<usize> {
        let tick = self.entries.get(key)?.tick;
        Some(self.order.range(tick + 1..).count())
    }

    fn cloned_parts(&self) -> (FxHashMap<K, Entry<V>>, BTreeMap<u64, K>) {
        ((*self.entries).clone(), (*self.order).clone())
    }

    fn from_parts(
        &self,
        entries: FxHashMap<K, Entry<V>>,
        order: BTreeMap<u64, K>,
        tick: u64,
    ) -> Self {
        debug_assert_eq!(entries.len(), order.len());
        debug_assert!(entries.len() <= self.threshold);
        Self {
            entries: Arc::new(entries),
            order: Arc::new(order),
            tick,
            threshold: self.threshold,
        }
    }
}

impl<K, V> Clone for LruSnapshot<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            order: Arc::clone(&self.order),
            tick: self.tick,
            threshold: self.threshold,
        }
    }
}

impl<K, V> Default for LruSnapshot<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Creates an empty snapshot with [`DEFAULT_LRU_THRESHOLD`].
    fn default() -> Self {
        Self::new(DEFAULT_LRU_THRESHOLD)
    }
}

impl<K, V> fmt::Debug for LruSnapshot<K, V>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruSnapshot")
            .field("len", &self.entries.len())
            .field("threshold", &self.threshold)
            .field("lru_order", &self.order.values().collect::<Vec<_>>())
            .finish()
    }
}

impl<K, V> CacheSnapshot for LruSnapshot<K, V>
where
    K: Clone + Eq + Hash,
{
    type Key = K;
    type Value = V;

    #[inline]
    fn lookup(&self, key: &K) -> Option<Arc<V>> {
        self.entries.get(key).map(|entry| Arc::clone(&entry.value))
    }

    #[inline]
    fn has(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    fn hit(&self, key: &K) -> Self {
        let Some(old_tick) = self.entries.get(key).map(|entry| entry.tick) else {
            return self.clone();
        };
        let tick = self.tick + 1;
        let (mut entries, mut order) = self.cloned_parts();
        order.remove(&old_tick);
        order.insert(tick, key.clone());
        if let Some(entry) = entries.get_mut(key) {
            entry.tick = tick;
        }
        self.from_parts(entries, order, tick)
    }

    fn miss(&self, key: K, value: Arc<V>) -> Self {
        if self.threshold == 0 {
            return self.clone();
        }
        let tick = self.tick + 1;
        let (mut entries, mut order) = self.cloned_parts();

        if let Some(old) = entries.get(&key) {
            order.remove(&old.tick);
        } else if entries.len() >= self.threshold {
            if let Some((_, lru_key)) = order.pop_first() {
                entries.remove(&lru_key);
            }
        }

        order.insert(tick, key.clone());
        entries.insert(key, Entry { value, tick });
        self.from_parts(entries, order, tick)
    }

    fn evict(&self, key: &K) -> Self {
        let Some(old_tick) = self.entries.get(key).map(|entry| entry.tick) else {
            return self.clone();
        };
        let (mut entries, mut order) = self.cloned_parts();
        entries.remove(key);
        order.remove(&old_tick);
        self.from_parts(entries, order, self.tick)
    }

    fn seed<I>(&self, base: I) -> Self
    where
        I: IntoIterator<Item = (K, Arc<V>)>,
    {
        base.into_iter()
            .fold(Self::new(self.threshold), |snap, (key, value)| {
                snap.miss(key, value)
            })
    }

    #[inline]
    fn len(&self) -> usize {
        self.entries.len()
    }
}
