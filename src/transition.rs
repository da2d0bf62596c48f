//! Hit/miss transition applied to a single snapshot.
//!
//! [`through`] is the pure step every shared-cache write goes through:
//!
//! ```text
//!   has(key)?
//!     ├── yes ──► hit(key)
//!     └── no  ──► miss(key, wrap_fn(value_fn, key))
//! ```
//!
//! `wrap_fn` lets callers intercept value production (for example to unwrap a
//! memoized computation) without touching the hit/miss decision. [`apply`] is
//! the plain "call `value_fn` with `key`" wrapper.
//!
//! `through` does not memoize. Inside
//! [`AtomicCell::update`](crate::ds::AtomicCell::update) it can run several
//! times, so the value it produces must be cheap or already memoized.

use std::sync::Arc;

use crate::traits::CacheSnapshot;

/// Default wrapper: calls `value_fn` with `key`.
///
/// # Example
///
/// ```
/// use swapcache::transition::apply;
///
/// assert_eq!(apply(|k: &u32| k * 2, &21), 42);
/// ```
#[inline]
pub fn apply<K, R, F>(value_fn: F, key: &K) -> R
where
    F: FnOnce(&K) -> R,
{
    value_fn(key)
}

/// Returns `snapshot` after recording a hit on `key`, or after inserting the
/// value produced by `wrap_fn(value_fn, key)` on a miss.
///
/// `wrap_fn` is only called on the miss path.
///
/// # Example
///
/// ```
/// use swapcache::policy::basic::BasicSnapshot;
/// use swapcache::traits::CacheSnapshot;
/// use swapcache::transition::{apply, through};
///
/// let snap: BasicSnapshot<&str, i32> = BasicSnapshot::new();
/// let snap = through(&snap, &"a", apply, |_| 42);
/// assert_eq!(snap.lookup(&"a").as_deref(), Some(&42));
///
/// // Present key: value function is not consulted.
/// let snap = through(&snap, &"a", apply, |_| 99);
/// assert_eq!(snap.lookup(&"a").as_deref(), Some(&42));
/// ```
pub fn through<S, W, F, T, R>(snapshot: &S, key: &S::Key, wrap_fn: W, value_fn: F) -> S
where
    S: CacheSnapshot,
    F: FnOnce(&S::Key) -> T,
    W: FnOnce(F, &S::Key) -> R,
    R: Into<Arc<S::Value>>,
{
    if snapshot.has(key) {
        tracing::trace!("transition.hit");
        snapshot.hit(key)
    } else {
        tracing::trace!("transition.miss");
        snapshot.miss(key.clone(), wrap_fn(value_fn, key).into())
    }
}
