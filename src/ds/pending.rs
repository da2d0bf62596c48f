//! Compute-once lazy cell.
//!
//! [`PendingComputation`] wraps a function that produces a value and runs it
//! at most once, no matter how many times or from how many threads the value
//! is requested. Concurrent forcers block until the first one finishes.
//!
//! ## State machine
//!
//! ```text
//!   ┌───────────┐  force()   ┌─────────┐  f() returns  ┌──────────┐
//!   │ Unstarted │ ─────────► │ Running │ ────────────► │ Done(T)  │
//!   │   (f)     │            │         │               │          │
//!   └───────────┘            └─────────┘               └──────────┘
//!                                 │ f() panics
//!                                 ▼
//!                         stays Running: later forces panic
//! ```
//!
//! The mutex is held while `f` runs, so only one thread can observe
//! `Unstarted`; everyone else waits and then reads `Done`.
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use swapcache::ds::PendingComputation;
//!
//! let calls = AtomicUsize::new(0);
//! let pending = PendingComputation::new(|| {
//!     calls.fetch_add(1, Ordering::SeqCst);
//!     42
//! });
//!
//! assert!(!pending.is_forced());
//! assert_eq!(pending.force(), 42);
//! assert_eq!(pending.force(), 42);
//! assert_eq!(calls.load(Ordering::SeqCst), 1);
//! ```

use std::fmt;
use std::mem;

use parking_lot::Mutex;

enum State<T, F> {
    Unstarted(F),
    Running,
    Done(T),
}

/// A lazily evaluated, memoized, thread-safe computation.
pub struct PendingComputation<T, F = fn() -> T> {
    state: Mutex<State<T, F>>,
}

impl<T, F> PendingComputation<T, F>
where
    F: FnOnce() -> T,
{
    /// Wraps `f` without running it.
    #[inline]
    pub fn new(f: F) -> Self {
        Self {
            state: Mutex::new(State::Unstarted(f)),
        }
    }

    /// Returns the computed value, running the function on first call.
    ///
    /// # Panics
    ///
    /// Panics if a previous force panicked inside the wrapped function.
    pub fn force(&self) -> T
    where
        T: Clone,
    {
        let mut state = self.state.lock();
        match mem::replace(&mut *state, State::Running) {
            State::Done(value) => {
                *state = State::Done(value.clone());
                value
            },
            State::Unstarted(f) => {
                let value = f();
                *state = State::Done(value.clone());
                value
            },
            State::Running => panic!("pending computation forced after its function panicked"),
        }
    }

    /// Returns `true` once the function has completed.
    pub fn is_forced(&self) -> bool {
        matches!(*self.state.lock(), State::Done(_))
    }

    /// Returns the value if already computed, without running anything.
    pub fn peek(&self) -> Option<T>
    where
        T: Clone,
    {
        match &*self.state.lock() {
            State::Done(value) => Some(value.clone()),
            _ => None,
        }
    }
}

impl<T, F> fmt::Debug for PendingComputation<T, F>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_struct("PendingComputation");
        match &*self.state.lock() {
            State::Unstarted(_) => dbg.field("state", &"unstarted"),
            State::Running => dbg.field("state", &"running"),
            State::Done(value) => dbg.field("value", value),
        };
        dbg.finish()
    }
}
