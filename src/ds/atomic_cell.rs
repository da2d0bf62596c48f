//! Atomically swapped snapshot cell.
//!
//! [`AtomicCell`] holds exactly one `Arc<S>` and replaces it with
//! compare-and-swap. Readers never block; writers retry on contention.
//!
//! ## Architecture
//!
//! ```text
//!   update(f)
//!   ═══════════════════════════════════════════════════════════════════
//!
//!     ┌────────────┐   load    ┌───────────┐   f(&cur)   ┌───────────┐
//!     │ ArcSwap<S> │ ────────► │ cur: Arc  │ ──────────► │ next: Arc │
//!     └────────────┘           └───────────┘             └─────┬─────┘
//!           ▲                                                  │
//!           │          compare_and_swap(&cur, next)            │
//!           └──────────────────────────────────────────────────┘
//!                 prev == cur  → installed, return next
//!                 prev != cur  → lost race, drop next, retry
//! ```
//!
//! ## ABA
//!
//! The expected value is held as an `Arc` for the whole attempt, so its
//! allocation cannot be freed and reused while it is being compared. Because
//! snapshots are immutable, an equal pointer always means an equal state.
//!
//! ## Example Usage
//!
//! ```
//! use swapcache::ds::AtomicCell;
//!
//! let cell = AtomicCell::new(1u64);
//! let next = cell.update(|n| n + 1);
//! assert_eq!(*next, 2);
//! assert_eq!(*cell.read(), 2);
//! ```

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;

/// Shared, atomically replaceable reference to an immutable snapshot.
pub struct AtomicCell<S> {
    current: ArcSwap<S>,
}

impl<S> AtomicCell<S> {
    /// Creates a cell holding `initial`.
    #[inline]
    pub fn new(initial: S) -> Self {
        Self::from_arc(Arc::new(initial))
    }

    /// Creates a cell holding an already shared snapshot.
    #[inline]
    pub fn from_arc(initial: Arc<S>) -> Self {
        Self {
            current: ArcSwap::new(initial),
        }
    }

    /// Returns the currently installed snapshot.
    ///
    /// The returned `Arc` stays valid after later updates; it keeps pointing
    /// at the snapshot that was current when `read` ran.
    #[inline]
    pub fn read(&self) -> Arc<S> {
        self.current.load_full()
    }

    /// Atomically installs `f(current)` and returns the installed snapshot.
    ///
    /// `f` runs once per attempt and may run again after a lost race, so it
    /// must be free of side effects that are not memoized elsewhere.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use std::thread;
    /// use swapcache::ds::AtomicCell;
    ///
    /// let cell = Arc::new(AtomicCell::new(0u32));
    /// let handles: Vec<_> = (0..4)
    ///     .map(|_| {
    ///         let cell = Arc::clone(&cell);
    ///         thread::spawn(move || {
    ///             for _ in 0..100 {
    ///                 cell.update(|n| n + 1);
    ///             }
    ///         })
    ///     })
    ///     .collect();
    /// for h in handles {
    ///     h.join().unwrap();
    /// }
    /// assert_eq!(*cell.read(), 400);
    /// ```
    pub fn update<F>(&self, mut f: F) -> Arc<S>
    where
        F: FnMut(&S) -> S,
    {
        loop {
            let cur = self.current.load_full();
            let next = Arc::new(f(&cur));
            let prev = self.current.compare_and_swap(&cur, Arc::clone(&next));
            if Arc::ptr_eq(&prev, &cur) {
                return next;
            }
            tracing::trace!("atomic_cell.update.retry");
        }
    }

    /// Unconditionally installs `next`, returning the previous snapshot.
    pub fn reset(&self, next: S) -> Arc<S> {
        self.current.swap(Arc::new(next))
    }
}

impl<S: Default> Default for AtomicCell<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S: fmt::Debug> fmt::Debug for AtomicCell<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtomicCell")
            .field("current", &self.read())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn read_returns_initial_value() {
        let cell = AtomicCell::new(String::from("init"));
        assert_eq!(cell.read().as_str(), "init");
    }

    #[test]
    fn update_returns_installed_snapshot() {
        let cell = AtomicCell::new(vec![1]);
        let installed = cell.update(|v| {
            let mut v = v.clone();
            v.push(2);
            v
        });
        assert!(Arc::ptr_eq(&installed, &cell.read()));
        assert_eq!(*installed, vec![1, 2]);
    }

    #[test]
    fn old_reads_are_unaffected_by_updates() {
        let cell = AtomicCell::new(10);
        let before = cell.read();
        cell.update(|n| n * 2);
        assert_eq!(*before, 10);
        assert_eq!(*cell.read(), 20);
    }

    #[test]
    fn reset_returns_previous() {
        let cell = AtomicCell::new(1);
        let prev = cell.reset(5);
        assert_eq!(*prev, 1);
        assert_eq!(*cell.read(), 5);
    }

    #[test]
    fn lost_race_reruns_transform() {
        let cell = AtomicCell::new(0u32);
        let calls = AtomicUsize::new(0);

        let out = cell.update(|n| {
            // First attempt sneaks in a concurrent write so the CAS fails.
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                cell.reset(100);
            }
            n + 1
        });

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(*out, 101);
        assert_eq!(*cell.read(), 101);
    }

    #[cfg_attr(miri, ignore)]
    #[test]
    fn concurrent_updates_are_linearizable() {
        let cell = Arc::new(AtomicCell::new(0usize));
        let num_threads = 8;
        let per_thread = 500;

        let handles: Vec<_> = (0..num_threads)
            .map(|_| {
                let cell = Arc::clone(&cell);
                thread::spawn(move || {
                    for _ in 0..per_thread {
                        cell.update(|n| n + 1);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("updater thread panicked");
        }

        assert_eq!(*cell.read(), num_threads * per_thread);
    }

    #[test]
    fn debug_shows_current() {
        let cell = AtomicCell::new(7);
        assert!(format!("{:?}", cell).contains('7'));
    }
}
