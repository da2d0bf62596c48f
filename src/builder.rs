//! Unified cache builder for all snapshot policies.
//!
//! Provides a single entry point that picks the policy at runtime and hides
//! the concrete snapshot type behind [`PolicySnapshot`].
//!
//! ## Example
//!
//! ```rust
//! use swapcache::builder::{CacheBuilder, CachePolicy};
//!
//! let cache = CacheBuilder::new(CachePolicy::Lru { threshold: 2 })
//!     .build([(1u64, "one".to_string())])
//!     .unwrap();
//! cache.miss(2, "two".to_string());
//! cache.miss(3, "three".to_string());
//!
//! assert!(!cache.has(&1));
//! assert_eq!(cache.lookup(&3).as_deref().map(String::as_str), Some("three"));
//! ```

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use crate::error::ConfigError;
use crate::policy::basic::BasicSnapshot;
#[cfg(feature = "policy-lru")]
use crate::policy::lru::{DEFAULT_LRU_THRESHOLD, LruConfig, LruSnapshot};
#[cfg(feature = "policy-ttl")]
use crate::policy::ttl::{Clock, DEFAULT_TTL_MILLIS, SystemClock, TtlConfig, TtlSnapshot};
use crate::shared::SharedCache;
use crate::traits::CacheSnapshot;

/// Available snapshot policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// No eviction.
    Basic,
    /// Least Recently Used eviction with a capacity threshold.
    #[cfg(feature = "policy-lru")]
    Lru { threshold: usize },
    /// Time-to-live expiry in milliseconds.
    #[cfg(feature = "policy-ttl")]
    Ttl { ttl_millis: u64 },
}

impl CachePolicy {
    /// LRU with the default threshold.
    #[cfg(feature = "policy-lru")]
    pub const fn lru() -> Self {
        Self::Lru {
            threshold: DEFAULT_LRU_THRESHOLD,
        }
    }

    /// TTL with the default lifetime.
    #[cfg(feature = "policy-ttl")]
    pub const fn ttl() -> Self {
        Self::Ttl {
            ttl_millis: DEFAULT_TTL_MILLIS,
        }
    }
}

/// Snapshot whose policy is chosen at runtime.
pub enum PolicySnapshot<K, V> {
    Basic(BasicSnapshot<K, V>),
    #[cfg(feature = "policy-lru")]
    Lru(LruSnapshot<K, V>),
    #[cfg(feature = "policy-ttl")]
    Ttl(TtlSnapshot<K, V>),
}

impl<K, V> PolicySnapshot<K, V>
where
    K: Clone + Eq + Hash,
{
    /// The policy this snapshot follows.
    pub fn policy(&self) -> CachePolicy {
        match self {
            PolicySnapshot::Basic(_) => CachePolicy::Basic,
            #[cfg(feature = "policy-lru")]
            PolicySnapshot::Lru(lru) => CachePolicy::Lru {
                threshold: lru.threshold(),
            },
            #[cfg(feature = "policy-ttl")]
            PolicySnapshot::Ttl(ttl) => CachePolicy::Ttl {
                ttl_millis: u64::try_from(ttl.ttl().as_millis()).unwrap_or(u64::MAX),
            },
        }
    }
}

impl<K, V> Clone for PolicySnapshot<K, V> {
    fn clone(&self) -> Self {
        match self {
            PolicySnapshot::Basic(basic) => PolicySnapshot::Basic(basic.clone()),
            #[cfg(feature = "policy-lru")]
            PolicySnapshot::Lru(lru) => PolicySnapshot::Lru(lru.clone()),
            #[cfg(feature = "policy-ttl")]
            PolicySnapshot::Ttl(ttl) => PolicySnapshot::Ttl(ttl.clone()),
        }
    }
}

impl<K, V> fmt::Debug for PolicySnapshot<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicySnapshot::Basic(basic) => fmt::Debug::fmt(basic, f),
            #[cfg(feature = "policy-lru")]
            PolicySnapshot::Lru(lru) => fmt::Debug::fmt(lru, f),
            #[cfg(feature = "policy-ttl")]
            PolicySnapshot::Ttl(ttl) => fmt::Debug::fmt(ttl, f),
        }
    }
}

impl<K, V> CacheSnapshot for PolicySnapshot<K, V>
where
    K: Clone + Eq + Hash,
{
    type Key = K;
    type Value = V;

    fn lookup(&self, key: &K) -> Option<Arc<V>> {
        match self {
            PolicySnapshot::Basic(basic) => basic.lookup(key),
            #[cfg(feature = "policy-lru")]
            PolicySnapshot::Lru(lru) => lru.lookup(key),
            #[cfg(feature = "policy-ttl")]
            PolicySnapshot::Ttl(ttl) => ttl.lookup(key),
        }
    }

    fn has(&self, key: &K) -> bool {
        match self {
            PolicySnapshot::Basic(basic) => basic.has(key),
            #[cfg(feature = "policy-lru")]
            PolicySnapshot::Lru(lru) => lru.has(key),
            #[cfg(feature = "policy-ttl")]
            PolicySnapshot::Ttl(ttl) => ttl.has(key),
        }
    }

    fn hit(&self, key: &K) -> Self {
        match self {
            PolicySnapshot::Basic(basic) => PolicySnapshot::Basic(basic.hit(key)),
            #[cfg(feature = "policy-lru")]
            PolicySnapshot::Lru(lru) => PolicySnapshot::Lru(lru.hit(key)),
            #[cfg(feature = "policy-ttl")]
            PolicySnapshot::Ttl(ttl) => PolicySnapshot::Ttl(ttl.hit(key)),
        }
    }

    fn miss(&self, key: K, value: Arc<V>) -> Self {
        match self {
            PolicySnapshot::Basic(basic) => PolicySnapshot::Basic(basic.miss(key, value)),
            #[cfg(feature = "policy-lru")]
            PolicySnapshot::Lru(lru) => PolicySnapshot::Lru(lru.miss(key, value)),
            #[cfg(feature = "policy-ttl")]
            PolicySnapshot::Ttl(ttl) => PolicySnapshot::Ttl(ttl.miss(key, value)),
        }
    }

    fn evict(&self, key: &K) -> Self {
        match self {
            PolicySnapshot::Basic(basic) => PolicySnapshot::Basic(basic.evict(key)),
            #[cfg(feature = "policy-lru")]
            PolicySnapshot::Lru(lru) => PolicySnapshot::Lru(lru.evict(key)),
            #[cfg(feature = "policy-ttl")]
            PolicySnapshot::Ttl(ttl) => PolicySnapshot::Ttl(ttl.evict(key)),
        }
    }

    fn seed<I>(&self, base: I) -> Self
    where
        I: IntoIterator<Item = (K, Arc<V>)>,
    {
        match self {
            PolicySnapshot::Basic(basic) => PolicySnapshot::Basic(basic.seed(base)),
            #[cfg(feature = "policy-lru")]
            PolicySnapshot::Lru(lru) => PolicySnapshot::Lru(lru.seed(base)),
            #[cfg(feature = "policy-ttl")]
            PolicySnapshot::Ttl(ttl) => PolicySnapshot::Ttl(ttl.seed(base)),
        }
    }

    fn len(&self) -> usize {
        match self {
            PolicySnapshot::Basic(basic) => basic.len(),
            #[cfg(feature = "policy-lru")]
            PolicySnapshot::Lru(lru) => lru.len(),
            #[cfg(feature = "policy-ttl")]
            PolicySnapshot::Ttl(ttl) => ttl.len(),
        }
    }
}

/// Builder for shared caches.
#[derive(Debug, Clone)]
pub struct CacheBuilder {
    policy: CachePolicy,
    #[cfg(feature = "policy-ttl")]
    clock: Arc<dyn Clock>,
}

impl CacheBuilder {
    /// Create a new builder for `policy`.
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            #[cfg(feature = "policy-ttl")]
            clock: Arc::new(SystemClock),
        }
    }

    /// Clock used by the TTL policy. Ignored by other policies.
    #[cfg(feature = "policy-ttl")]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Build a shared cache pre-loaded with `base`.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] if the policy option is 0.
    pub fn build<K, V, I>(self, base: I) -> Result<SharedCache<PolicySnapshot<K, V>>, ConfigError>
    where
        K: Clone + Eq + Hash,
        I: IntoIterator<Item = (K, V)>,
    {
        let empty = match self.policy {
            CachePolicy::Basic => PolicySnapshot::Basic(BasicSnapshot::new()),
            #[cfg(feature = "policy-lru")]
            CachePolicy::Lru { threshold } => {
                PolicySnapshot::Lru(LruSnapshot::with_config(LruConfig::try_new(threshold)?))
            },
            #[cfg(feature = "policy-ttl")]
            CachePolicy::Ttl { ttl_millis } => {
                let config = TtlConfig::try_from_millis(ttl_millis)?;
                PolicySnapshot::Ttl(TtlSnapshot::with_clock(config.ttl(), self.clock))
            },
        };

        let snapshot = empty.seed(base.into_iter().map(|(k, v)| (k, Arc::new(v))));
        tracing::debug!(policy = ?self.policy, entries = snapshot.len(), "builder.build");

        Ok(SharedCache::new(snapshot))
    }
}
