//! Time-to-live (TTL) snapshot policy.
//!
//! Every entry is stamped with the instant it was inserted. An entry is live
//! while `now - inserted < ttl`; afterwards `has` reports `false` and `lookup`
//! returns `None`, even though no new snapshot was produced. Expired entries
//! are physically dropped the next time `miss` builds a snapshot.
//!
//! ## Architecture
//!
//! ```text
//!   ┌─────────────────────────────────────────────────────────────────┐
//!   │                     TtlSnapshot<K, V>                           │
//!   │                                                                 │
//!   │   entries: Arc<FxHashMap<K, Entry<V>>>                          │
//!   │                                                                 │
//!   │   ┌─────────┬────────┬──────────────┐                           │
//!   │   │   Key   │ value  │ inserted_at  │      ttl: Duration        │
//!   │   ├─────────┼────────┼──────────────┤      clock: Arc<dyn Clock>│
//!   │   │   a     │  v1    │   t0         │                           │
//!   │   │   b     │  v2    │   t0 + 1.5s  │                           │
//!   │   └─────────┴────────┴──────────────┘                           │
//!   │                                                                 │
//!   │   now = t0 + 2.1s, ttl = 2s  →  has(a) = false, has(b) = true   │
//!   └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Clocks
//!
//! [`SystemClock`] reads [`Instant::now`]. [`ManualClock`] only moves when
//! advanced, which makes expiry deterministic in tests.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use crate::error::ConfigError;
use crate::traits::CacheSnapshot;

/// Default entry lifetime in milliseconds.
pub const DEFAULT_TTL_MILLIS: u64 = 2000;

/// Source of the current instant for expiry decisions.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when [`advance`](ManualClock::advance) is called.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use swapcache::policy::ttl::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// let t0 = clock.now();
/// clock.advance(Duration::from_millis(250));
/// assert_eq!(clock.now() - t0, Duration::from_millis(250));
/// ```
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset_nanos: AtomicU64,
}

impl ManualClock {
    /// Creates a clock frozen at the current instant.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset_nanos: AtomicU64::new(0),
        }
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let nanos = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.offset_nanos.fetch_add(nanos, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + Duration::from_nanos(self.offset_nanos.load(Ordering::SeqCst))
    }
}

/// Validated TTL configuration.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use swapcache::policy::ttl::TtlConfig;
///
/// assert_eq!(TtlConfig::default().ttl(), Duration::from_millis(2000));
/// assert!(TtlConfig::try_from_millis(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlConfig {
    ttl: Duration,
}

impl TtlConfig {
    /// Validates `ttl` (must be non-zero).
    pub fn try_new(ttl: Duration) -> Result<Self, ConfigError> {
        if ttl.is_zero() {
            return Err(ConfigError::new("ttl must be > 0"));
        }
        Ok(Self { ttl })
    }

    /// Validates a lifetime given in milliseconds.
    pub fn try_from_millis(ttl_millis: u64) -> Result<Self, ConfigError> {
        Self::try_new(Duration::from_millis(ttl_millis))
    }

    /// Entry lifetime.
    #[inline]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl Default for TtlConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_millis(DEFAULT_TTL_MILLIS),
        }
    }
}

struct Entry<V> {
    value: Arc<V>,
    inserted_at: Instant,
}

impl<V> Clone for Entry<V> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            inserted_at: self.inserted_at,
        }
    }
}

/// Immutable snapshot with per-entry expiry.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use swapcache::policy::ttl::{ManualClock, TtlSnapshot};
/// use swapcache::traits::CacheSnapshot;
///
/// let clock = Arc::new(ManualClock::new());
/// let s = TtlSnapshot::with_clock(Duration::from_millis(100), clock.clone())
///     .miss("k", Arc::new(1));
///
/// assert!(s.has(&"k"));
/// clock.advance(Duration::from_millis(100));
/// assert!(!s.has(&"k"));
/// assert_eq!(s.lookup(&"k"), None);
/// ```
pub struct TtlSnapshot<K, V> {
    entries: Arc<FxHashMap<K, Entry<V>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<K, V> TtlSnapshot<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Creates an empty snapshot using the system clock.
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Creates an empty snapshot using `clock`.
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(FxHashMap::default()),
            ttl,
            clock,
        }
    }

    /// Creates an empty snapshot from a validated configuration.
    pub fn with_config(config: TtlConfig) -> Self {
        Self::new(config.ttl())
    }

    /// Entry lifetime.
    #[inline]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Time left before `key` expires, or `None` if absent or expired.
    pub fn time_remaining(&self, key: &K) -> Option<Duration> {
        let entry = self.entries.get(key)?;
        let age = self.clock.now().saturating_duration_since(entry.inserted_at);
        self.ttl.checked_sub(age).filter(|left| !left.is_zero())
    }

    #[inline]
    fn is_live(&self, entry: &Entry<V>, now: Instant) -> bool {
        now.saturating_duration_since(entry.inserted_at) < self.ttl
    }

    fn with_entries(&self, entries: FxHashMap<K, Entry<V>>) -> Self {
        Self {
            entries: Arc::new(entries),
            ttl: self.ttl,
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<K, V> Clone for TtlSnapshot<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            ttl: self.ttl,
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<K, V> Default for TtlSnapshot<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Creates an empty snapshot with [`DEFAULT_TTL_MILLIS`].
    fn default() -> Self {
        Self::with_config(TtlConfig::default())
    }
}

impl<K, V> fmt::Debug for TtlSnapshot<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlSnapshot")
            .field("len", &self.entries.len())
            .field("ttl", &self.ttl)
            .field("clock", &self.clock)
            .finish()
    }
}

impl<K, V> CacheSnapshot for TtlSnapshot<K, V>
where
    K: Clone + Eq + Hash,
{
    type Key = K;
    type Value = V;

    fn lookup(&self, key: &K) -> Option<Arc<V>> {
        let now = self.clock.now();
        self.entries
            .get(key)
            .filter(|entry| self.is_live(entry, now))
            .map(|entry| Arc::clone(&entry.value))
    }

    fn has(&self, key: &K) -> bool {
        let now = self.clock.now();
        self.entries
            .get(key)
            .is_some_and(|entry| self.is_live(entry, now))
    }

    #[inline]
    fn hit(&self, _key: &K) -> Self {
        self.clone()
    }

    fn miss(&self, key: K, value: Arc<V>) -> Self {
        let now = self.clock.now();
        let mut entries: FxHashMap<K, Entry<V>> = self
            .entries
            .iter()
            .filter(|(_, entry)| self.is_live(entry, now))
            .map(|(k, entry)| (k.clone(), entry.clone()))
            .collect();
        entries.insert(
            key,
            Entry {
                value,
                inserted_at: now,
            },
        );
        self.with_entries(entries)
    }

    fn evict(&self, key: &K) -> Self {
        if !self.entries.contains_key(key) {
            return self.clone();
        }
        let mut entries = (*self.entries).clone();
        entries.remove(key);
        self.with_entries(entries)
    }

    fn seed<I>(&self, base: I) -> Self
    where
        I: IntoIterator<Item = (K, Arc<V>)>,
    {
        let now = self.clock.now();
        let entries = base
            .into_iter()
            .map(|(key, value)| {
                (
                    key,
                    Entry {
                        value,
                        inserted_at: now,
                    },
                )
            })
            .collect();
        self.with_entries(entries)
    }

    #[inline]
    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manual(ttl_ms: u64) -> (Arc<ManualClock>, TtlSnapshot<&'static str, u32>) {
        let clock = Arc::new(ManualClock::new());
        let snap = TtlSnapshot::with_clock(Duration::from_millis(ttl_ms), clock.clone());
        (clock, snap)
    }

    mod expiry {
        use super::*;

        #[test]
        fn live_before_ttl_elapses() {
            let (clock, s) = manual(100);
            let s = s.miss("a", Arc::new(1));
            clock.advance(Duration::from_millis(99));
            assert!(s.has(&"a"));
            assert_eq!(s.lookup(&"a").as_deref(), Some(&1));
            assert_eq!(s.time_remaining(&"a"), Some(Duration::from_millis(1)));
        }

        #[test]
        fn expired_at_ttl() {
            let (clock, s) = manual(100);
            let s = s.miss("a", Arc::new(1));
            clock.advance(Duration::from_millis(100));
            assert!(!s.has(&"a"));
            assert_eq!(s.lookup(&"a"), None);
            assert_eq!(s.time_remaining(&"a"), None);
            // Still physically stored until the next miss.
            assert_eq!(s.len(), 1);
        }

        #[test]
        fn miss_purges_expired_entries() {
            let (clock, s) = manual(100);
            let s = s.miss("a", Arc::new(1));
            clock.advance(Duration::from_millis(150));
            let s = s.miss("b", Arc::new(2));
            assert_eq!(s.len(), 1);
            assert!(s.has(&"b"));
        }

        #[test]
        fn remiss_restarts_lifetime() {
            let (clock, s) = manual(100);
            let s = s.miss("a", Arc::new(1));
            clock.advance(Duration::from_millis(80));
            let s = s.miss("a", Arc::new(2));
            clock.advance(Duration::from_millis(80));
            assert_eq!(s.lookup(&"a").as_deref(), Some(&2));
        }
    }

    mod operations {
        use super::*;

        #[test]
        fn hit_is_noop() {
            let (_clock, s) = manual(100);
            let s = s.miss("a", Arc::new(1));
            let out = s.hit(&"a");
            assert!(Arc::ptr_eq(&s.entries, &out.entries));
        }

        #[test]
        fn evict_removes_entry() {
            let (_clock, s) = manual(100);
            let s0 = s.miss("a", Arc::new(1));
            let s1 = s0.evict(&"a");
            assert!(!s1.has(&"a"));
            assert!(s0.has(&"a"));
        }

        #[test]
        fn seed_stamps_with_current_time() {
            let (clock, s) = manual(100);
            let s = s.miss("old", Arc::new(0));
            clock.advance(Duration::from_millis(60));
            let seeded = s.seed([("new", Arc::new(5))]);
            clock.advance(Duration::from_millis(60));
            assert!(!seeded.has(&"old"));
            assert!(seeded.has(&"new"));
            assert_eq!(seeded.ttl(), Duration::from_millis(100));
        }
    }

    #[test]
    fn config_rejects_zero_ttl() {
        let err = TtlConfig::try_from_millis(0).unwrap_err();
        assert!(err.message().contains("ttl"));
        assert_eq!(
            TtlConfig::try_from_millis(5).map(|c| c.ttl()),
            Ok(Duration::from_millis(5))
        );
    }
}
