//! Per-key in-flight fills.
//!
//! [`InFlight`] records which keys are being computed right now and by which
//! thread. The first caller to claim an absent key becomes its [`Lead`]; later
//! callers for the same key get a [`Join`] and block until the lead publishes
//! its value or gives up. Callers for other keys never wait.
//!
//! ## Architecture
//!
//! ```text
//!   InFlight<K, T>
//!   ┌──────────────────────────────────────────────────────────┐
//!   │ Mutex<FxHashMap<K, Arc<Waiter<T>>>>   (held only to claim)│
//!   └──────────────────────────────────────────────────────────┘
//!          │ claim(&key)
//!          ├── absent              ──► Lead   (inserts a Waiter)
//!          ├── led by this thread  ──► Reentrant
//!          └── led by another      ──► Join   (clones the Waiter)
//!
//!   Waiter<T>: Mutex<Slot<T>> + Condvar
//!     Pending ──publish(v)──► Ready(v)
//!     Pending ──lead drop───► Abandoned        (joiners retry the claim)
//! ```
//!
//! A lead keeps its table entry until it is dropped, so the caller should
//! hold it until the value is visible to readers. A value function that waits,
//! through another thread, on the key it is itself filling deadlocks; a
//! same-thread re-entry is reported as [`Claim::Reentrant`] instead.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::{Condvar, Mutex};
use rustc_hash::FxHashMap;

enum Slot<T> {
    Pending,
    Ready(T),
    Abandoned,
}

struct Waiter<T> {
    owner: ThreadId,
    slot: Mutex<Slot<T>>,
    ready: Condvar,
}

impl<T> Waiter<T> {
    fn new() -> Self {
        Self {
            owner: thread::current().id(),
            slot: Mutex::new(Slot::Pending),
            ready: Condvar::new(),
        }
    }

    /// Moves a pending slot to `next`; later calls are ignored.
    fn finish(&self, next: Slot<T>) {
        let mut slot = self.slot.lock();
        if matches!(*slot, Slot::Pending) {
            *slot = next;
        }
        drop(slot);
        self.ready.notify_all();
    }
}

/// Table of keys currently being filled.
pub struct InFlight<K, T> {
    waiters: Mutex<FxHashMap<K, Arc<Waiter<T>>>>,
}

/// Outcome of [`InFlight::claim`].
pub enum Claim<'a, K, T>
where
    K: Eq + Hash,
{
    /// No fill was running; the caller computes and publishes.
    Lead(Lead<'a, K, T>),
    /// Another thread is filling the key.
    Join(Join<T>),
    /// This thread is already filling the key further up its stack.
    Reentrant,
}

/// Ownership of one key's fill. Dropping it removes the key from the table
/// and wakes joiners; if nothing was published they see an abandoned fill.
pub struct Lead<'a, K, T>
where
    K: Eq + Hash,
{
    table: &'a InFlight<K, T>,
    key: K,
    waiter: Arc<Waiter<T>>,
}

/// Handle on a fill led by another thread.
pub struct Join<T> {
    waiter: Arc<Waiter<T>>,
}

impl<K, T> InFlight<K, T>
where
    K: Clone + Eq + Hash,
{
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            waiters: Mutex::new(FxHashMap::default()),
        }
    }

    /// Leads, joins or re-enters the fill of `key`.
    pub fn claim(&self, key: &K) -> Claim<'_, K, T> {
        let mut waiters = self.waiters.lock();
        if let Some(waiter) = waiters.get(key) {
            if waiter.owner == thread::current().id() {
                return Claim::Reentrant;
            }
            return Claim::Join(Join {
                waiter: Arc::clone(waiter),
            });
        }
        let waiter = Arc::new(Waiter::new());
        waiters.insert(key.clone(), Arc::clone(&waiter));
        Claim::Lead(Lead {
            table: self,
            key: key.clone(),
            waiter,
        })
    }

    /// Number of keys being filled.
    pub fn len(&self) -> usize {
        self.waiters.lock().len()
    }

    /// Returns `true` if no fill is running.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, T> Default for InFlight<K, T>
where
    K: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, T> fmt::Debug for InFlight<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InFlight")
            .field("keys", &self.waiters.lock().len())
            .finish()
    }
}

impl<K, T> Lead<'_, K, T>
where
    K: Eq + Hash,
{
    /// Hands `value` to every current and future joiner of this fill.
    pub fn publish(&self, value: T) {
        self.waiter.finish(Slot::Ready(value));
    }
}

impl<K, T> Drop for Lead<'_, K, T>
where
    K: Eq + Hash,
{
    fn drop(&mut self) {
        let mut waiters = self.table.waiters.lock();
        if waiters
            .get(&self.key)
            .is_some_and(|waiter| Arc::ptr_eq(waiter, &self.waiter))
        {
            waiters.remove(&self.key);
        }
        drop(waiters);
        self.waiter.finish(Slot::Abandoned);
    }
}

impl<T: Clone> Join<T> {
    /// Blocks until the lead publishes. `None` if it gave up first.
    pub fn wait(self) -> Option<T> {
        let mut slot = self.waiter.slot.lock();
        loop {
            if let Slot::Ready(value) = &*slot {
                return Some(value.clone());
            }
            if matches!(*slot, Slot::Abandoned) {
                return None;
            }
            self.waiter.ready.wait(&mut slot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn first_claim_leads_and_drop_clears() {
        let table: InFlight<&str, u32> = InFlight::new();
        let lead = match table.claim(&"k") {
            Claim::Lead(lead) => lead,
            _ => panic!("expected lead"),
        };
        assert_eq!(table.len(), 1);
        drop(lead);
        assert!(table.is_empty());
    }

    #[test]
    fn same_thread_claim_is_reentrant() {
        let table: InFlight<&str, u32> = InFlight::new();
        let _lead = table.claim(&"k");
        assert!(matches!(table.claim(&"k"), Claim::Reentrant));
        assert!(matches!(table.claim(&"other"), Claim::Lead(_)));
    }

    #[cfg_attr(miri, ignore)]
    #[test]
    fn joiner_receives_published_value() {
        let table: Arc<InFlight<&str, u32>> = Arc::new(InFlight::new());
        let lead = match table.claim(&"k") {
            Claim::Lead(lead) => lead,
            _ => panic!("expected lead"),
        };

        let (tx, rx) = mpsc::channel();
        let joiner = {
            let table = Arc::clone(&table);
            std::thread::spawn(move || {
                let join = match table.claim(&"k") {
                    Claim::Join(join) => join,
                    _ => panic!("expected join"),
                };
                tx.send(()).expect("main alive");
                join.wait()
            })
        };

        rx.recv_timeout(Duration::from_secs(5)).expect("joiner claimed");
        lead.publish(7);
        drop(lead);
        assert_eq!(joiner.join().expect("joiner panicked"), Some(7));
    }

    #[cfg_attr(miri, ignore)]
    #[test]
    fn abandoned_lead_wakes_joiner_with_none() {
        let table: Arc<InFlight<u8, u8>> = Arc::new(InFlight::new());
        let lead = match table.claim(&1) {
            Claim::Lead(lead) => lead,
            _ => panic!("expected lead"),
        };

        let (tx, rx) = mpsc::channel();
        let joiner = {
            let table = Arc::clone(&table);
            std::thread::spawn(move || {
                let Claim::Join(join) = table.claim(&1) else {
                    panic!("expected join");
                };
                tx.send(()).expect("main alive");
                join.wait()
            })
        };

        rx.recv_timeout(Duration::from_secs(5)).expect("joiner claimed");
        drop(lead);
        assert_eq!(joiner.join().expect("joiner panicked"), None);
        assert!(table.is_empty());
    }

    #[test]
    fn publish_then_abandon_keeps_value() {
        let table: InFlight<u8, u8> = InFlight::new();
        let Claim::Lead(lead) = table.claim(&1) else {
            panic!("expected lead");
        };
        let waiter = Arc::clone(&lead.waiter);
        lead.publish(3);
        drop(lead);
        assert_eq!(Join { waiter }.wait(), Some(3));
    }
}
