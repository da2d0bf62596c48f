//! Basic (no eviction) snapshot policy.
//!
//! Entries stay until explicitly evicted. Every mutation copies the entry map
//! and returns a new snapshot; `hit` shares the existing map.
//!
//! ## Architecture
//!
//! ```text
//!   ┌────────────────────────────────────────────────────────────┐
//!   │                  BasicSnapshot<K, V>                       │
//!   │                                                            │
//!   │   entries: Arc<FxHashMap<K, Arc<V>>>                       │
//!   │                                                            │
//!   │   snapshot v1 ──► { a: 1 }                                 │
//!   │   miss(b, 2)                                               │
//!   │   snapshot v2 ──► { a: 1, b: 2 }    (v1 still { a: 1 })    │
//!   └────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations
//!
//! | Operation | Time | Notes                               |
//! |-----------|------|-------------------------------------|
//! | `lookup`  | O(1) | map lookup                          |
//! | `has`     | O(1) | map lookup                          |
//! | `hit`     | O(1) | shares the map                      |
//! | `miss`    | O(n) | copies the map, then inserts        |
//! | `evict`   | O(n) | copies the map only if key present  |
//! | `seed`    | O(m) | builds a new map from `base`        |

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::traits::CacheSnapshot;

/// Snapshot that never evicts on its own.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use swapcache::policy::basic::BasicSnapshot;
/// use swapcache::traits::CacheSnapshot;
///
/// let s0: BasicSnapshot<&str, u32> = BasicSnapshot::new();
/// let s1 = s0.miss("a", Arc::new(1));
/// let s2 = s1.evict(&"a");
///
/// assert!(s1.has(&"a"));
/// assert!(!s2.has(&"a"));
/// ```
pub struct BasicSnapshot<K, V> {
    entries: Arc<FxHashMap<K, Arc<V>>>,
}

impl<K, V> BasicSnapshot<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(FxHashMap::default()),
        }
    }

    /// Iterates over stored entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &Arc<V>)> {
        self.entries.iter()
    }

    fn with_entries(entries: FxHashMap<K, Arc<V>>) -> Self {
        Self {
            entries: Arc::new(entries),
        }
    }
}

impl<K, V> Clone for BasicSnapshot<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<K, V> Default for BasicSnapshot<K, V>
where
    K: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> FromIterator<(K, Arc<V>)> for BasicSnapshot<K, V>
where
    K: Clone + Eq + Hash,
{
    fn from_iter<I: IntoIterator<Item = (K, Arc<V>)>>(iter: I) -> Self {
        Self::with_entries(iter.into_iter().collect())
    }
}

impl<K, V> fmt::Debug for BasicSnapshot<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl<K, V> CacheSnapshot for BasicSnapshot<K, V>
where
    K: Clone + Eq + Hash,
{
    type Key = K;
    type Value = V;

    #[inline]
    fn lookup(&self, key: &K) -> Option<Arc<V>> {
        self.entries.get(key).cloned()
    }

    #[inline]
    fn has(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    #[inline]
    fn hit(&self, _key: &K) -> Self {
        self.clone()
    }

    fn miss(&self, key: K, value: Arc<V>) -> Self {
        let mut entries = (*self.entries).clone();
        entries.insert(key, value);
        Self::with_entries(entries)
    }

    fn evict(&self, key: &K) -> Self {
        if !self.entries.contains_key(key) {
            return self.clone();
        }
        let mut entries = (*self.entries).clone();
        entries.remove(key);
        Self::with_entries(entries)
    }

    fn seed<I>(&self, base: I) -> Self
    where
        I: IntoIterator<Item = (K, Arc<V>)>,
    {
        base.into_iter().collect()
    }

    #[inline]
    fn len(&self) -> usize {
        self.entries.len()
    }
}
