//! # Snapshot Capability Contract
//!
//! This module defines [`CacheSnapshot`], the interface every eviction policy
//! exposes so it can be shared through an [`AtomicCell`](crate::ds::AtomicCell).
//!
//! ## Architecture
//!
//! ```text
//!                   ┌─────────────────────────────────────────────┐
//!                   │              CacheSnapshot                  │
//!                   │                                             │
//!                   │  lookup(&, &K) → Option<Arc<V>>             │
//!                   │  lookup_or(&, &K, Arc<V>) → Arc<V>          │
//!                   │  has(&, &K) → bool                          │
//!                   │  hit(&, &K) → Self                          │
//!                   │  miss(&, K, Arc<V>) → Self                  │
//!                   │  evict(&, &K) → Self                        │
//!                   │  seed(&, base) → Self                       │
//!                   └───────────────────────┬─────────────────────┘
//!                                           │
//!          ┌────────────────────┬───────────┴──────────┬────────────────────┐
//!          ▼                    ▼                      ▼                    ▼
//!   ┌──────────────┐     ┌──────────────┐      ┌──────────────┐     ┌────────────────┐
//!   │BasicSnapshot │     │ LruSnapshot  │      │ TtlSnapshot  │     │ PolicySnapshot │
//!   │ (no evict)   │     │ (threshold)  │      │ (expiry)     │     │ (runtime enum) │
//!   └──────────────┘     └──────────────┘      └──────────────┘     └────────────────┘
//! ```
//!
//! ## Purity
//!
//! Every operation takes `&self`. Mutating operations return a **new**
//! snapshot; the receiver is never modified, so a caller holding an older
//! snapshot keeps observing the older state. Values are stored as `Arc<V>`
//! and shared between successive snapshots.
//!
//! `has` may still change over time for a single snapshot when the policy is
//! time-driven (TTL), and `miss` may drop unrelated entries when the policy is
//! capacity-driven (LRU).

use std::hash::Hash;
use std::sync::Arc;

/// An immutable, versioned cache state.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use swapcache::policy::basic::BasicSnapshot;
/// use swapcache::traits::CacheSnapshot;
///
/// let empty: BasicSnapshot<&str, i32> = BasicSnapshot::new();
/// let filled = empty.miss("a", Arc::new(1));
///
/// assert!(filled.has(&"a"));
/// assert!(!empty.has(&"a"));
/// ```
pub trait CacheSnapshot: Sized {
    /// Key type.
    type Key: Clone + Eq + Hash;

    /// Value type. Stored behind `Arc` so snapshots share values.
    type Value;

    /// Returns the value stored for `key`, or `None` if absent or expired.
    fn lookup(&self, key: &Self::Key) -> Option<Arc<Self::Value>>;

    /// Returns the value stored for `key`, or `default`.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use swapcache::policy::basic::BasicSnapshot;
    /// use swapcache::traits::CacheSnapshot;
    ///
    /// let snap: BasicSnapshot<u32, &str> = BasicSnapshot::new();
    /// assert_eq!(*snap.lookup_or(&1, Arc::new("none")), "none");
    /// ```
    fn lookup_or(&self, key: &Self::Key, default: Arc<Self::Value>) -> Arc<Self::Value> {
        self.lookup(key).unwrap_or(default)
    }

    /// Returns `true` if `key` is currently present and live.
    fn has(&self, key: &Self::Key) -> bool;

    /// Records a hit on `key`. Only policy bookkeeping changes.
    fn hit(&self, key: &Self::Key) -> Self;

    /// Inserts `value` for `key`.
    fn miss(&self, key: Self::Key, value: Arc<Self::Value>) -> Self;

    /// Removes `key` if present.
    fn evict(&self, key: &Self::Key) -> Self;

    /// Reinitializes from `base`, keeping the policy and its configuration.
    fn seed<I>(&self, base: I) -> Self
    where
        I: IntoIterator<Item = (Self::Key, Arc<Self::Value>)>;

    /// Number of stored entries, including entries a time-driven policy
    /// would already report as absent.
    fn len(&self) -> usize;

    /// Returns `true` if no entries are stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
