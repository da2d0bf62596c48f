//! Concrete snapshot policies.
//!
//! | Policy  | Type                         | Feature      |
//! |---------|------------------------------|--------------|
//! | Basic   | [`basic::BasicSnapshot`]     | always       |
//! | LRU     | [`lru::LruSnapshot`]         | `policy-lru` |
//! | TTL     | [`ttl::TtlSnapshot`]         | `policy-ttl` |

pub mod basic;

#[cfg(feature = "policy-lru")]
pub mod lru;

#[cfg(feature = "policy-ttl")]
pub mod ttl;
