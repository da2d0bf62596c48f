pub use crate::builder::{CacheBuilder, CachePolicy, PolicySnapshot};
pub use crate::ds::{AtomicCell, PendingComputation};
pub use crate::error::{ConfigError, LookupError};
pub use crate::factory::basic_cache_factory;
#[cfg(feature = "policy-lru")]
pub use crate::factory::{lru_cache_factory, lru_cache_factory_default};
#[cfg(feature = "policy-ttl")]
pub use crate::factory::{ttl_cache_factory, ttl_cache_factory_default};
pub use crate::policy::basic::BasicSnapshot;
#[cfg(feature = "policy-lru")]
pub use crate::policy::lru::{LruConfig, LruSnapshot};
#[cfg(feature = "policy-ttl")]
pub use crate::policy::ttl::{Clock, ManualClock, SystemClock, TtlConfig, TtlSnapshot};
pub use crate::shared::{MAX_LOOKUP_ATTEMPTS, SharedCache};
pub use crate::traits::CacheSnapshot;
pub use crate::transition::{apply, through};
