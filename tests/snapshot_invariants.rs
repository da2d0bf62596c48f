// ==============================================
// CROSS-POLICY SNAPSHOT INVARIANTS (integration)
// ==============================================
//
// Behavior every snapshot policy shares: writes never modify the receiver,
// miss-then-lookup returns the value, evict removes, seed replaces content.

use std::sync::Arc;

use proptest::prelude::*;
use swapcache::prelude::*;

fn empty_snapshots() -> Vec<PolicySnapshot<u32, u32>> {
    [
        CachePolicy::Basic,
        CachePolicy::Lru { threshold: 64 },
        CachePolicy::Ttl { ttl_millis: 60_000 },
    ]
    .into_iter()
    .map(|policy| {
        let cache = CacheBuilder::new(policy)
            .build(Vec::<(u32, u32)>::new())
            .unwrap();
        (*cache.snapshot()).clone()
    })
    .collect()
}

// ==============================================
// Immutability
// ==============================================

mod immutability {
    use super::*;

    #[test]
    fn writes_leave_receiver_untouched() {
        for empty in empty_snapshots() {
            let one = empty.miss(1, Arc::new(10));
            let two = one.miss(2, Arc::new(20));
            let evicted = two.evict(&1);
            let hit = two.hit(&2);

            assert_eq!(empty.len(), 0, "{:?}", empty.policy());
            assert_eq!(one.len(), 1);
            assert!(!one.has(&2));
            assert!(two.has(&1));
            assert!(!evicted.has(&1));
            assert_eq!(hit.lookup(&2).as_deref(), Some(&20));
        }
    }

    #[test]
    fn old_snapshot_survives_shared_cache_writes() {
        let cache = CacheBuilder::new(CachePolicy::Lru { threshold: 2 })
            .build([(1u32, 1u32)])
            .unwrap();
        let before = cache.snapshot();

        cache.miss(2, 2);
        cache.miss(3, 3);
        cache.seed([(9, 9)]);

        assert!(before.has(&1));
        assert!(!before.has(&9));
        assert_eq!(before.len(), 1);
    }
}

// ==============================================
// Miss / lookup / evict / seed
// ==============================================

mod operations {
    use super::*;

    #[test]
    fn miss_then_lookup_returns_value() {
        for empty in empty_snapshots() {
            let s = empty.miss(7, Arc::new(70));
            assert_eq!(s.lookup(&7).as_deref(), Some(&70));
            assert_eq!(*s.lookup_or(&8, Arc::new(0)), 0);
        }
    }

    #[test]
    fn miss_overwrites_existing_value() {
        for empty in empty_snapshots() {
            let s = empty.miss(1, Arc::new(1)).miss(1, Arc::new(2));
            assert_eq!(s.len(), 1);
            assert_eq!(s.lookup(&1).as_deref(), Some(&2));
        }
    }

    #[test]
    fn evict_absent_is_noop() {
        for empty in empty_snapshots() {
            let s = empty.miss(1, Arc::new(1));
            let e = s.evict(&42);
            assert_eq!(e.len(), 1);
            assert!(e.has(&1));
        }
    }

    #[test]
    fn seed_replaces_content_and_keeps_policy() {
        for empty in empty_snapshots() {
            let s = empty.miss(1, Arc::new(1));
            let seeded = s.seed([(5, Arc::new(50)), (6, Arc::new(60))]);
            assert!(!seeded.has(&1));
            assert_eq!(seeded.len(), 2);
            assert_eq!(seeded.policy(), empty.policy());
        }
    }

    #[test]
    fn hit_on_absent_key_adds_nothing() {
        for empty in empty_snapshots() {
            let s = empty.hit(&3);
            assert!(s.is_empty());
        }
    }
}

// ==============================================
// Property tests
// ==============================================

#[derive(Debug, Clone)]
enum Op {
    Hit(u32),
    Miss(u32, u32),
    Evict(u32),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u32..32).prop_map(Op::Hit),
        (0u32..32, any::<u32>()).prop_map(|(k, v)| Op::Miss(k, v)),
        (0u32..32).prop_map(Op::Evict),
    ]
}

proptest! {
    /// Basic snapshot agrees with a plain map model.
    #[cfg_attr(miri, ignore)]
    #[test]
    fn prop_basic_matches_model(ops in prop::collection::vec(op_strategy(), 0..200)) {
        let mut s: BasicSnapshot<u32, u32> = BasicSnapshot::new();
        let mut model = std::collections::HashMap::new();
        for op in ops {
            s = match op {
                Op::Hit(k) => s.hit(&k),
                Op::Miss(k, v) => {
                    model.insert(k, v);
                    s.miss(k, Arc::new(v))
                },
                Op::Evict(k) => {
                    model.remove(&k);
                    s.evict(&k)
                },
            };
        }
        prop_assert_eq!(s.len(), model.len());
        for (k, v) in &model {
            let got = s.lookup(k);
            prop_assert_eq!(got.as_deref(), Some(v));
        }
    }

    /// Every policy: the key just written is present with its value.
    #[cfg_attr(miri, ignore)]
    #[test]
    fn prop_last_write_visible(ops in prop::collection::vec(op_strategy(), 1..100)) {
        for mut s in empty_snapshots() {
            for op in &ops {
                s = match *op {
                    Op::Hit(k) => s.hit(&k),
                    Op::Miss(k, v) => {
                        let next = s.miss(k, Arc::new(v));
                        let got = next.lookup(&k);
                        prop_assert_eq!(got.as_deref(), Some(&v));
                        next
                    },
                    Op::Evict(k) => {
                        let next = s.evict(&k);
                        prop_assert!(!next.has(&k));
                        next
                    },
                };
            }
        }
    }

    /// LRU never grows past its threshold.
    #[cfg_attr(miri, ignore)]
    #[test]
    fn prop_lru_bounded(
        threshold in 1usize..10,
        ops in prop::collection::vec(op_strategy(), 0..200)
    ) {
        let mut s: LruSnapshot<u32, u32> = LruSnapshot::new(threshold);
        for op in ops {
            s = match op {
                Op::Hit(k) => s.hit(&k),
                Op::Miss(k, v) => s.miss(k, Arc::new(v)),
                Op::Evict(k) => s.evict(&k),
            };
            prop_assert!(s.len() <= threshold);
        }
    }
}
