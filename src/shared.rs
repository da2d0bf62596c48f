//! # Shared Cache Handle
//!
//! [`SharedCache`] lets one immutable [`CacheSnapshot`] be read and updated
//! from many threads. It owns an [`AtomicCell`] holding the current snapshot
//! plus an [`InFlight`] table of keys whose values are being computed by
//! [`lookup_or_miss`](SharedCache::lookup_or_miss).
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                         SharedCache<S>                               │
//!   │                                                                      │
//!   │   ┌───────────────────────────────┐   ┌───────────────────────────┐  │
//!   │   │ AtomicCell<S>                 │   │ InFlight<K, Arc<V>>       │  │
//!   │   │   read()   → Arc<S>           │   │   claim(&key) → Lead/Join │  │
//!   │   │   update(f) → CAS retry loop  │   │   (miss branch only)      │  │
//!   │   └───────────────────────────────┘   └───────────────────────────┘  │
//!   │                                                                      │
//!   │   lookup / lookup_or / has          read current snapshot, no CAS    │
//!   │   hit / miss / evict / seed         one-shot update                  │
//!   │   through / through_with / _key     update(through)                  │
//!   │   lookup_or_miss[_with]             stampede-safe fill               │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stampede-safe fill
//!
//! ```text
//!   lookup_or_miss(key, value_fn)
//!   ═══════════════════════════════════════════════════════════════════════
//!
//!   D = PendingComputation(|| wrap_fn(value_fn, key))     (not run yet)
//!
//!   for attempt in 1..=10:
//!       s' = cell.update(|s| through(s, key, apply, |k| resolve(k)))
//!       s'.lookup(key) = Some(v) ──► return Ok(v)
//!       None ──► entry expired between write and read, retry
//!
//!   Err(LookupError::Exhausted { attempts: 10 })
//!
//!   resolve(k)   (miss branch only, result kept for later attempts)
//!       claim(k) ── Lead      ──► v = current value or D.force(), publish(v)
//!                ── Join      ──► wait for the lead's v (retry claim if it gave up)
//!                ── Reentrant ──► v = D.force()
//! ```
//!
//! `D` memoizes, so CAS retries and expiry retries never rerun `value_fn`.
//! The lead keeps its claim until the call returns, after its value is
//! installed, so a concurrent caller for the same key either joins the
//! running fill or finds the value already present. Nothing is locked
//! across a value function: callers for other keys never wait, and a value
//! function may fill other keys of the same cache. A value function must not
//! wait, through another thread, on the key it is filling.
//!
//! ## Example
//!
//! ```
//! use swapcache::factory::basic_cache_factory;
//!
//! let cache = basic_cache_factory(Vec::<(&str, i32)>::new());
//!
//! assert_eq!(*cache.lookup_or_miss(&"a", |_| 42).unwrap(), 42);
//! // Cached: the second value function is never called.
//! assert_eq!(*cache.lookup_or_miss(&"a", |_| 99).unwrap(), 42);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::ds::{AtomicCell, Claim, InFlight, Lead, PendingComputation};
use crate::error::LookupError;
use crate::traits::CacheSnapshot;
use crate::transition::{self, apply};

/// Maximum number of write-then-read attempts in
/// [`SharedCache::lookup_or_miss`].
pub const MAX_LOOKUP_ATTEMPTS: usize = 10;

/// Thread-safe handle over an atomically swapped cache snapshot.
pub struct SharedCache<S: CacheSnapshot> {
    cell: AtomicCell<S>,
    fills: InFlight<S::Key, Arc<S::Value>>,
}

impl<S> SharedCache<S>
where
    S: CacheSnapshot,
{
    /// Wraps `initial`.
    pub fn new(initial: S) -> Self {
        Self::from_cell(AtomicCell::new(initial))
    }

    /// Builds a handle from an existing cell.
    pub fn from_cell(cell: AtomicCell<S>) -> Self {
        Self {
            cell,
            fills: InFlight::new(),
        }
    }

    /// The underlying cell.
    #[inline]
    pub fn cell(&self) -> &AtomicCell<S> {
        &self.cell
    }

    /// Returns the current snapshot.
    #[inline]
    pub fn snapshot(&self) -> Arc<S> {
        self.cell.read()
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Returns the value for `key` in the current snapshot.
    #[inline]
    pub fn lookup(&self, key: &S::Key) -> Option<Arc<S::Value>> {
        self.cell.read().lookup(key)
    }

    /// Returns the value for `key` in the current snapshot, or `default`.
    #[inline]
    pub fn lookup_or(&self, key: &S::Key, default: Arc<S::Value>) -> Arc<S::Value> {
        self.cell.read().lookup_or(key, default)
    }

    /// Returns `true` if the current snapshot holds a live entry for `key`.
    #[inline]
    pub fn has(&self, key: &S::Key) -> bool {
        self.cell.read().has(key)
    }

    // -----------------------------------------------------------------------
    // One-shot updates
    // -----------------------------------------------------------------------

    /// Records a hit on `key`; returns the installed snapshot.
    pub fn hit(&self, key: &S::Key) -> Arc<S> {
        self.cell.update(|s| s.hit(key))
    }

    /// Inserts `value` for `key`; returns the installed snapshot.
    pub fn miss(&self, key: S::Key, value: S::Value) -> Arc<S> {
        self.miss_arc(key, Arc::new(value))
    }

    /// Inserts an already shared value; returns the installed snapshot.
    pub fn miss_arc(&self, key: S::Key, value: Arc<S::Value>) -> Arc<S> {
        self.cell.update(|s| s.miss(key.clone(), Arc::clone(&value)))
    }

    /// Removes `key`; returns the installed snapshot.
    pub fn evict(&self, key: &S::Key) -> Arc<S> {
        self.cell.update(|s| s.evict(key))
    }

    /// Replaces the content with `base`; returns the installed snapshot.
    ///
    /// # Example
    ///
    /// ```
    /// use swapcache::factory::basic_cache_factory;
    ///
    /// let cache = basic_cache_factory([("a", 1), ("b", 2)]);
    /// cache.seed([("c", 3)]);
    ///
    /// assert!(!cache.has(&"a"));
    /// assert_eq!(cache.lookup(&"c").as_deref(), Some(&3));
    /// ```
    pub fn seed<I>(&self, base: I) -> Arc<S>
    where
        I: IntoIterator<Item = (S::Key, S::Value)>,
    {
        let base: Vec<(S::Key, Arc<S::Value>)> = base
            .into_iter()
            .map(|(key, value)| (key, Arc::new(value)))
            .collect();
        self.cell.update(|s| s.seed(base.iter().cloned()))
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Applies the hit/miss transition for `key`; returns the installed
    /// snapshot.
    ///
    /// `value_fn` is called on every attempt that sees `key` absent, so it
    /// should be cheap. Use [`lookup_or_miss`](Self::lookup_or_miss) for
    /// expensive values.
    pub fn through<F, T>(&self, key: &S::Key, value_fn: F) -> Arc<S>
    where
        F: Fn(&S::Key) -> T,
        T: Into<Arc<S::Value>>,
    {
        self.cell
            .update(|s| transition::through(s, key, apply, &value_fn))
    }

    /// [`through`](Self::through) storing the key itself as the value.
    ///
    /// ```
    /// use swapcache::factory::basic_cache_factory;
    ///
    /// let cache = basic_cache_factory(Vec::<(u32, u32)>::new());
    /// cache.through_key(&7);
    /// assert_eq!(cache.lookup(&7).as_deref(), Some(&7));
    /// ```
    pub fn through_key(&self, key: &S::Key) -> Arc<S>
    where
        S::Key: Into<Arc<S::Value>>,
    {
        self.through(key, <S::Key as Clone>::clone)
    }

    /// Like [`through`](Self::through) with a custom `wrap_fn` around
    /// `value_fn`.
    pub fn through_with<W, F, T, R>(&self, key: &S::Key, wrap_fn: W, value_fn: F) -> Arc<S>
    where
        F: Fn(&S::Key) -> T,
        W: Fn(&F, &S::Key) -> R,
        R: Into<Arc<S::Value>>,
    {
        self.cell
            .update(|s| transition::through(s, key, &wrap_fn, &value_fn))
    }

    // -----------------------------------------------------------------------
    // Stampede-safe lookup
    // -----------------------------------------------------------------------

    /// Returns the value for `key`, computing it with `value_fn` if absent.
    ///
    /// `value_fn` runs at most once per call and is never called when the
    /// key is already present. Concurrent calls for the same absent key
    /// compute it once between them.
    ///
    /// # Errors
    ///
    /// [`LookupError::Exhausted`] if the entry was gone right after each of
    /// [`MAX_LOOKUP_ATTEMPTS`] writes.
    pub fn lookup_or_miss<F, T>(
        &self,
        key: &S::Key,
        value_fn: F,
    ) -> Result<Arc<S::Value>, LookupError>
    where
        F: FnOnce(&S::Key) -> T,
        T: Into<Arc<S::Value>>,
    {
        self.lookup_or_miss_with(key, apply, value_fn)
    }

    /// Like [`lookup_or_miss`](Self::lookup_or_miss) with a custom `wrap_fn`
    /// that receives `value_fn` and `key` and produces the value to store.
    ///
    /// # Example
    ///
    /// ```
    /// use swapcache::factory::basic_cache_factory;
    ///
    /// let cache = basic_cache_factory(Vec::<(u32, String)>::new());
    /// let value_fn = |k: &u32| k * 2;
    /// let v = cache
    ///     .lookup_or_miss_with(&21, |f, k| format!("={}", f(k)), value_fn)
    ///     .unwrap();
    /// assert_eq!(v.as_str(), "=42");
    /// ```
    pub fn lookup_or_miss_with<W, F, T, R>(
        &self,
        key: &S::Key,
        wrap_fn: W,
        value_fn: F,
    ) -> Result<Arc<S::Value>, LookupError>
    where
        F: FnOnce(&S::Key) -> T,
        W: FnOnce(F, &S::Key) -> R,
        R: Into<Arc<S::Value>>,
    {
        let pending = PendingComputation::new(move || -> Arc<S::Value> {
            wrap_fn(value_fn, key).into()
        });
        let mut lead = None;
        let mut resolved = None;

        for attempt in 1..=MAX_LOOKUP_ATTEMPTS {
            let snapshot = self.cell.update(|s| {
                transition::through(s, key, apply, |k| {
                    self.resolve(k, &pending, &mut lead, &mut resolved)
                })
            });
            if let Some(value) = snapshot.lookup(key) {
                return Ok(value);
            }
            tracing::debug!(attempt, "shared_cache.lookup_or_miss.expired_after_write");
        }

        tracing::warn!(
            attempts = MAX_LOOKUP_ATTEMPTS,
            computed = pending.is_forced(),
            "shared_cache.lookup_or_miss.exhausted"
        );
        Err(LookupError::Exhausted {
            attempts: MAX_LOOKUP_ATTEMPTS,
        })
    }

    /// Value to insert on the miss branch: our own computation if we lead
    /// the fill of `key`, otherwise the running lead's. The first result is
    /// kept in `resolved` for later attempts of the same call.
    fn resolve<'a, F>(
        &'a self,
        key: &S::Key,
        pending: &PendingComputation<Arc<S::Value>, F>,
        lead: &mut Option<Lead<'a, S::Key, Arc<S::Value>>>,
        resolved: &mut Option<Arc<S::Value>>,
    ) -> Arc<S::Value>
    where
        F: FnOnce() -> Arc<S::Value>,
    {
        if let Some(value) = resolved {
            return Arc::clone(value);
        }
        let value = loop {
            match self.fills.claim(key) {
                Claim::Lead(claimed) => {
                    // A previous lead may have installed the key after our
                    // snapshot was loaded.
                    let value = match self.cell.read().lookup(key) {
                        Some(installed) => installed,
                        None => pending.force(),
                    };
                    claimed.publish(Arc::clone(&value));
                    *lead = Some(claimed);
                    break value;
                },
                Claim::Join(join) => {
                    tracing::trace!("shared_cache.lookup_or_miss.join");
                    if let Some(value) = join.wait() {
                        break value;
                    }
                },
                Claim::Reentrant => break pending.force(),
            }
        };
        *resolved = Some(Arc::clone(&value));
        value
    }
}

impl<S> Default for SharedCache<S>
where
    S: CacheSnapshot + Default,
{
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S> fmt::Debug for SharedCache<S>
where
    S: CacheSnapshot + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedCache")
            .field("snapshot", &self.cell.read())
            .field("fills", &self.fills)
            .finish()
    }
}
