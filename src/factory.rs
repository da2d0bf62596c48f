//! Factories for shared caches pre-loaded with a named policy.
//!
//! Each factory builds the policy's initial snapshot from `base` and wraps it
//! in a fresh [`SharedCache`].
//!
//! | Factory                  | Snapshot        | Option                    |
//! |--------------------------|-----------------|---------------------------|
//! | [`basic_cache_factory`]  | `BasicSnapshot` | none                      |
//! | [`lru_cache_factory`]    | `LruSnapshot`   | `threshold` (default 32)  |
//! | [`ttl_cache_factory`]    | `TtlSnapshot`   | `ttl_millis` (default 2000) |
//!
//! ## Example
//!
//! ```
//! use swapcache::factory::{lru_cache_factory, ttl_cache_factory_default};
//!
//! let lru = lru_cache_factory([(1u32, "one")], 2).unwrap();
//! assert_eq!(lru.lookup(&1).as_deref(), Some(&"one"));
//!
//! let ttl = ttl_cache_factory_default(Vec::<(u32, u32)>::new());
//! assert!(!ttl.has(&1));
//! ```

use std::hash::Hash;
use std::sync::Arc;

#[cfg(any(feature = "policy-lru", feature = "policy-ttl"))]
use crate::error::ConfigError;
use crate::policy::basic::BasicSnapshot;
#[cfg(feature = "policy-lru")]
use crate::policy::lru::{LruConfig, LruSnapshot};
#[cfg(feature = "policy-ttl")]
use crate::policy::ttl::{TtlConfig, TtlSnapshot};
use crate::shared::SharedCache;
use crate::traits::CacheSnapshot;

fn seeded<S, I>(empty: S, base: I) -> SharedCache<S>
where
    S: CacheSnapshot,
    I: IntoIterator<Item = (S::Key, S::Value)>,
{
    let snapshot = empty.seed(base.into_iter().map(|(k, v)| (k, Arc::new(v))));
    tracing::debug!(entries = snapshot.len(), "factory.seeded");
    SharedCache::new(snapshot)
}

/// Shared cache with no eviction policy.
pub fn basic_cache_factory<K, V, I>(base: I) -> SharedCache<BasicSnapshot<K, V>>
where
    K: Clone + Eq + Hash,
    I: IntoIterator<Item = (K, V)>,
{
    seeded(BasicSnapshot::new(), base)
}

/// Shared LRU cache holding at most `threshold` entries.
///
/// # Errors
///
/// [`ConfigError`] if `threshold` is 0.
#[cfg(feature = "policy-lru")]
pub fn lru_cache_factory<K, V, I>(
    base: I,
    threshold: usize,
) -> Result<SharedCache<LruSnapshot<K, V>>, ConfigError>
where
    K: Clone + Eq + Hash,
    I: IntoIterator<Item = (K, V)>,
{
    let config = LruConfig::try_new(threshold)?;
    Ok(seeded(LruSnapshot::with_config(config), base))
}

/// Shared LRU cache with the default threshold.
#[cfg(feature = "policy-lru")]
pub fn lru_cache_factory_default<K, V, I>(base: I) -> SharedCache<LruSnapshot<K, V>>
where
    K: Clone + Eq + Hash,
    I: IntoIterator<Item = (K, V)>,
{
    seeded(LruSnapshot::with_config(LruConfig::default()), base)
}

/// Shared TTL cache whose entries live for `ttl_millis` milliseconds.
///
/// # Errors
///
/// [`ConfigError`] if `ttl_millis` is 0.
#[cfg(feature = "policy-ttl")]
pub fn ttl_cache_factory<K, V, I>(
    base: I,
    ttl_millis: u64,
) -> Result<SharedCache<TtlSnapshot<K, V>>, ConfigError>
where
    K: Clone + Eq + Hash,
    I: IntoIterator<Item = (K, V)>,
{
    let config = TtlConfig::try_from_millis(ttl_millis)?;
    Ok(seeded(TtlSnapshot::with_config(config), base))
}

/// Shared TTL cache with the default lifetime.
#[cfg(feature = "policy-ttl")]
pub fn ttl_cache_factory_default<K, V, I>(base: I) -> SharedCache<TtlSnapshot<K, V>>
where
    K: Clone + Eq + Hash,
    I: IntoIterator<Item = (K, V)>,
{
    seeded(TtlSnapshot::with_config(TtlConfig::default()), base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_factory_loads_base() {
        let cache = basic_cache_factory([("a", 1), ("b", 2)]);
        assert_eq!(cache.lookup(&"a").as_deref(), Some(&1));
        assert_eq!(cache.snapshot().len(), 2);
    }

    #[cfg(feature = "policy-lru")]
    #[test]
    fn lru_factory_applies_threshold() {
        let cache = lru_cache_factory((0..10u32).map(|k| (k, k)), 4).unwrap();
        assert_eq!(cache.snapshot().len(), 4);
        assert_eq!(cache.snapshot().threshold(), 4);
        assert!(cache.has(&9));
        assert!(!cache.has(&0));
    }

    #[cfg(feature = "policy-lru")]
    #[test]
    fn lru_factory_rejects_zero_threshold() {
        assert!(lru_cache_factory(Vec::<(u8, u8)>::new(), 0).is_err());
        let cache = lru_cache_factory_default(Vec::<(u8, u8)>::new());
        assert_eq!(
            cache.snapshot().threshold(),
            crate::policy::lru::DEFAULT_LRU_THRESHOLD
        );
    }

    #[cfg(feature = "policy-ttl")]
    #[test]
    fn ttl_factory_applies_ttl() {
        let cache = ttl_cache_factory([("a", 1)], 500).unwrap();
        assert!(cache.has(&"a"));
        assert_eq!(cache.snapshot().ttl(), std::time::Duration::from_millis(500));
        assert!(ttl_cache_factory(Vec::<(u8, u8)>::new(), 0).is_err());
    }

    #[cfg(feature = "policy-ttl")]
    #[test]
    fn ttl_factory_default_lifetime() {
        let cache = ttl_cache_factory_default(Vec::<(u8, u8)>::new());
        assert_eq!(
            cache.snapshot().ttl(),
            std::time::Duration::from_millis(crate::policy::ttl::DEFAULT_TTL_MILLIS)
        );
    }
}
