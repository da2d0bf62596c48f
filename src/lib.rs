//! swapcache: stampede-safe shared caches over immutable snapshots.
//!
//! A cache policy is an immutable [`CacheSnapshot`](traits::CacheSnapshot):
//! every write returns a new snapshot. [`SharedCache`](shared::SharedCache)
//! holds the current snapshot in an atomically swapped cell and offers
//! [`lookup_or_miss`](shared::SharedCache::lookup_or_miss), which computes a
//! missing value exactly once even under contention and retries when a policy
//! drops the entry right after it was written.
//!
//! ```
//! use swapcache::prelude::*;
//!
//! let cache = lru_cache_factory(Vec::<(u32, String)>::new(), 128).unwrap();
//! let v = cache.lookup_or_miss(&7, |k| format!("value-{k}")).unwrap();
//! assert_eq!(v.as_str(), "value-7");
//! ```

pub mod builder;
pub mod ds;
pub mod error;
pub mod factory;
pub mod policy;
pub mod prelude;
pub mod shared;
pub mod traits;
pub mod transition;

pub use crate::ds::{AtomicCell, PendingComputation};
pub use crate::error::{ConfigError, LookupError};
pub use crate::shared::SharedCache;
pub use crate::traits::CacheSnapshot;
