//! Property-Based Tests for Cache Module
//!
//! Runs random operation sequences against the cache and a plain reference
//! model, checking that they agree and that the structures stay consistent.

use proptest::prelude::*;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::thread;

use crate::cache::{Cache, CacheStore, EntryRef, SystemClock};

// == Test Configuration ==
const TEST_BUCKETS: usize = 4;

// == Strategies ==
/// Small key space so sequences revisit keys often.
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-f]{1,2}"
}

fn content_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..64)
}

fn content_type_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("text/html".to_string()),
        Just("text/css".to_string()),
        Just("image/png".to_string()),
    ]
}

#[derive(Debug, Clone)]
enum CacheOp {
    Put {
        key: String,
        content_type: String,
        content: Vec<u8>,
    },
    Get {
        key: String,
    },
    Delete {
        key: String,
    },
    /// Delete through a handle captured by an earlier get, if any
    DeleteRemembered {
        pick: usize,
    },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        4 => (key_strategy(), content_type_strategy(), content_strategy()).prop_map(
            |(key, content_type, content)| CacheOp::Put {
                key,
                content_type,
                content,
            }
        ),
        4 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        1 => key_strategy().prop_map(|key| CacheOp::Delete { key }),
        1 => any::<usize>().prop_map(|pick| CacheOp::DeleteRemembered { pick }),
    ]
}

// == Reference Model ==
/// Recency-ordered list with linear scans, front = most recently used.
#[derive(Debug, Default)]
struct Model {
    order: VecDeque<String>,
    data: HashMap<String, (String, Vec<u8>, u64)>,
    max_entries: usize,
    next_incarnation: u64,
}

impl Model {
    fn new(max_entries: usize) -> Self {
        Self {
            max_entries,
            ..Self::default()
        }
    }

    fn promote(&mut self, key: &str) {
        self.order.retain(|k| k != key);
        self.order.push_front(key.to_string());
    }

    fn put(&mut self, key: &str, content_type: &str, content: &[u8]) {
        if let Some(slot) = self.data.get_mut(key) {
            slot.0 = content_type.to_string();
            slot.1 = content.to_vec();
        } else {
            self.next_incarnation += 1;
            self.data.insert(
                key.to_string(),
                (content_type.to_string(), content.to_vec(), self.next_incarnation),
            );
            if self.max_entries > 0 && self.data.len() > self.max_entries {
                if let Some(oldest) = self.order.pop_back() {
                    self.data.remove(&oldest);
                }
            }
        }
        self.promote(key);
    }

    fn get(&mut self, key: &str) -> Option<(String, Vec<u8>, u64)> {
        let found = self.data.get(key).cloned();
        if found.is_some() {
            self.promote(key);
        }
        found
    }

    fn remove(&mut self, key: &str) {
        self.data.remove(key);
        self.order.retain(|k| k != key);
    }

    fn incarnation(&self, key: &str) -> Option<u64> {
        self.data.get(key).map(|(_, _, inc)| *inc)
    }
}

fn handle_for(store: &CacheStore, key: &str) -> Option<EntryRef> {
    store
        .snapshot()
        .into_iter()
        .find(|e| e.key() == key)
        .map(|e| e.handle())
}

fn run_against_model(max_entries: usize, ops: Vec<CacheOp>) -> Result<(), TestCaseError> {
    let mut store = CacheStore::new(max_entries, TEST_BUCKETS, Arc::new(SystemClock));
    let mut model = Model::new(max_entries);
    // (handle, key, incarnation when captured)
    let mut remembered: Vec<(EntryRef, String, u64)> = Vec::new();

    for op in ops {
        match op {
            CacheOp::Put {
                key,
                content_type,
                content,
            } => {
                store.put(&key, &content_type, &content).unwrap();
                model.put(&key, &content_type, &content);
            }
            CacheOp::Get { key } => {
                let got = store.get(&key);
                let expected = model.get(&key);
                match (got, expected) {
                    (Some(entry), Some((content_type, content, inc))) => {
                        prop_assert_eq!(entry.content_type(), content_type.as_str());
                        prop_assert_eq!(entry.content().as_ref(), content.as_slice());
                        prop_assert_eq!(entry.content_length(), content.len());
                        remembered.push((entry.handle(), key, inc));
                    }
                    (None, None) => {}
                    (got, expected) => {
                        return Err(TestCaseError::fail(format!(
                            "get({}) disagreed: cache hit={} model hit={}",
                            key,
                            got.is_some(),
                            expected.is_some()
                        )));
                    }
                }
            }
            CacheOp::Delete { key } => {
                let before = store.len();
                match handle_for(&store, &key) {
                    Some(handle) => {
                        store.delete(&handle).unwrap();
                        model.remove(&key);
                        prop_assert_eq!(store.len(), before - 1);
                    }
                    None => prop_assert!(model.incarnation(&key).is_none()),
                }
            }
            CacheOp::DeleteRemembered { pick } => {
                if remembered.is_empty() {
                    continue;
                }
                let (handle, key, inc) = remembered.swap_remove(pick % remembered.len());
                let live = model.incarnation(&key) == Some(inc);
                let result = store.delete(&handle);
                prop_assert_eq!(result.is_ok(), live, "stale handle for {} misjudged", key);
                if live {
                    model.remove(&key);
                }
            }
        }

        if let Err(msg) = store.check_invariants() {
            return Err(TestCaseError::fail(msg));
        }
        let order: Vec<String> = store.snapshot().iter().map(|e| e.key().to_string()).collect();
        let expected: Vec<String> = model.order.iter().cloned().collect();
        prop_assert_eq!(order, expected, "recency order diverged");
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // Cache and model agree on hits, content and recency order after every step
    #[test]
    fn prop_matches_reference_model(
        max_entries in 0usize..6,
        ops in prop::collection::vec(cache_op_strategy(), 1..120)
    ) {
        run_against_model(max_entries, ops)?;
    }

    // Round-trip: put followed by get returns exactly what was stored
    #[test]
    fn prop_roundtrip_storage(
        key in key_strategy(),
        content_type in content_type_strategy(),
        content in content_strategy()
    ) {
        let mut store = CacheStore::new(4, 0, Arc::new(SystemClock));

        store.put(&key, &content_type, &content).unwrap();
        let entry = store.get(&key).unwrap();

        prop_assert_eq!(entry.content().as_ref(), content.as_slice());
        prop_assert_eq!(entry.content_type(), content_type.as_str());
        prop_assert_eq!(entry.content_length(), content.len());
    }

    // Uniqueness: repeated puts of one key leave one entry with the last content
    #[test]
    fn prop_overwrite_semantics(
        key in key_strategy(),
        contents in prop::collection::vec(content_strategy(), 1..10)
    ) {
        let mut store = CacheStore::new(4, 0, Arc::new(SystemClock));

        for content in &contents {
            store.put(&key, "text/plain", content).unwrap();
        }

        prop_assert_eq!(store.len(), 1);
        let last = contents.last().unwrap();
        let got = store.get(&key).unwrap();
        prop_assert_eq!(got.content().as_ref(), last.as_slice());
    }

    // Capacity: a bounded cache never holds more than max_entries
    #[test]
    fn prop_capacity_enforcement(
        max_entries in 1usize..8,
        keys in prop::collection::vec("[a-z]{1,4}", 1..200)
    ) {
        let mut store = CacheStore::new(max_entries, TEST_BUCKETS, Arc::new(SystemClock));

        for key in keys {
            store.put(&key, "text/plain", key.as_bytes()).unwrap();
            prop_assert!(
                store.len() <= max_entries,
                "Cache size {} exceeds max {}",
                store.len(),
                max_entries
            );
        }
    }
}

// Separate block with fewer cases, each case spawns threads
proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    // Overlapping keys under contention: invariants hold once all threads finish
    #[test]
    fn prop_concurrent_overlapping_keys(
        max_entries in 1usize..6,
        per_thread in prop::collection::vec(
            prop::collection::vec(cache_op_strategy(), 1..80),
            2..6
        )
    ) {
        let cache = Cache::new(max_entries, TEST_BUCKETS);

        let workers: Vec<_> = per_thread
            .into_iter()
            .map(|ops| {
                let cache = cache.clone();
                thread::spawn(move || run_shared(&cache, ops))
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        prop_assert!(cache.len() <= max_entries);
        if let Err(msg) = cache.check_invariants() {
            return Err(TestCaseError::fail(msg));
        }
    }

    // Disjoint keys: each thread's final view matches a single-threaded model
    #[test]
    fn prop_concurrent_disjoint_keys_match_model(
        per_thread in prop::collection::vec(
            prop::collection::vec(cache_op_strategy(), 1..80),
            2..6
        )
    ) {
        let cache = Cache::new(0, TEST_BUCKETS);
        let mut models = Vec::new();

        let workers: Vec<_> = per_thread
            .into_iter()
            .enumerate()
            .map(|(t, ops)| {
                let ops: Vec<CacheOp> = ops.into_iter().map(|op| prefix_op(t, op)).collect();
                let mut model = Model::new(0);
                for op in &ops {
                    match op {
                        CacheOp::Put { key, content_type, content } => {
                            model.put(key, content_type, content)
                        }
                        CacheOp::Delete { key } => model.remove(key),
                        CacheOp::Get { .. } | CacheOp::DeleteRemembered { .. } => {}
                    }
                }
                models.push(model);

                let cache = cache.clone();
                thread::spawn(move || run_shared(&cache, ops))
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        if let Err(msg) = cache.check_invariants() {
            return Err(TestCaseError::fail(msg));
        }
        let expected_len: usize = models.iter().map(|m| m.data.len()).sum();
        prop_assert_eq!(cache.len(), expected_len);
        for model in &models {
            for (key, (content_type, content, _)) in &model.data {
                let entry = cache.get(key).unwrap();
                prop_assert_eq!(entry.content_type(), content_type.as_str());
                prop_assert_eq!(entry.content().as_ref(), content.as_slice());
            }
        }
    }
}

fn prefix_op(thread: usize, op: CacheOp) -> CacheOp {
    let prefixed = |key: String| format!("{}/{}", thread, key);
    match op {
        CacheOp::Put {
            key,
            content_type,
            content,
        } => CacheOp::Put {
            key: prefixed(key),
            content_type,
            content,
        },
        CacheOp::Get { key } => CacheOp::Get { key: prefixed(key) },
        CacheOp::Delete { key } => CacheOp::Delete { key: prefixed(key) },
        // Remembered handles could cross keys, keep the model exact
        CacheOp::DeleteRemembered { .. } => CacheOp::Get {
            key: prefixed("a".to_string()),
        },
    }
}

/// Applies operations through the shared handle. Deletes go through a
/// fresh get, the same way a request handler refreshes an entry.
fn run_shared(cache: &Cache, ops: Vec<CacheOp>) {
    let mut remembered = Vec::new();
    for op in ops {
        match op {
            CacheOp::Put {
                key,
                content_type,
                content,
            } => cache.put(&key, &content_type, &content).unwrap(),
            CacheOp::Get { key } => {
                if let Some(entry) = cache.get(&key) {
                    remembered.push(entry.handle());
                }
            }
            CacheOp::Delete { key } => {
                if let Some(entry) = cache.get(&key) {
                    // Another thread may have evicted or deleted it meanwhile
                    let _ = cache.delete(&entry.handle());
                }
            }
            CacheOp::DeleteRemembered { pick } => {
                if !remembered.is_empty() {
                    let handle = remembered.swap_remove(pick % remembered.len());
                    let _ = cache.delete(&handle);
                }
            }
        }
    }
}
