//! Hash Index Module
//!
//! Fixed-size bucketed hash table mapping resource keys to arena slots.

use std::sync::Arc;

use ahash::RandomState;

use crate::error::CacheResult;

/// Bucket count used when the caller asks for the default (0).
pub const DEFAULT_BUCKETS: usize = 128;

// == Hash Index ==
/// Maps keys to the arena slot of their entry.
///
/// Collisions are resolved by chaining. The bucket count is fixed for the
/// lifetime of the index; chains grow instead. The index never owns entry
/// storage, only a shared copy of the key and the slot number.
#[derive(Debug)]
pub struct HashIndex {
    buckets: Vec<Vec<(Arc<str>, usize)>>,
    hasher: RandomState,
    len: usize,
}

impl HashIndex {
    // == Constructor ==
    /// Creates an index with `buckets` chains, or [`DEFAULT_BUCKETS`] if 0.
    pub fn new(buckets: usize) -> Self {
        let buckets = if buckets == 0 { DEFAULT_BUCKETS } else { buckets };

        Self {
            buckets: (0..buckets).map(|_| Vec::new()).collect(),
            hasher: RandomState::new(),
            len: 0,
        }
    }

    fn bucket_of(&self, key: &str) -> usize {
        (self.hasher.hash_one(key) % self.buckets.len() as u64) as usize
    }

    // == Reserve ==
    /// Makes sure inserting `key` cannot fail on allocation.
    pub fn reserve_for(&mut self, key: &str) -> CacheResult<()> {
        let bucket = self.bucket_of(key);
        self.buckets[bucket].try_reserve(1)?;
        Ok(())
    }

    // == Insert ==
    /// Associates `key` with `slot`, replacing any previous association.
    pub fn insert(&mut self, key: Arc<str>, slot: usize) -> CacheResult<()> {
        let bucket = self.bucket_of(&key);
        let chain = &mut self.buckets[bucket];

        if let Some(existing) = chain.iter_mut().find(|(k, _)| **k == *key) {
            existing.1 = slot;
            return Ok(());
        }

        chain.try_reserve(1)?;
        chain.push((key, slot));
        self.len += 1;
        Ok(())
    }

    // == Lookup ==
    /// Returns the slot stored for `key`.
    pub fn lookup(&self, key: &str) -> Option<usize> {
        self.buckets[self.bucket_of(key)]
            .iter()
            .find(|(k, _)| &**k == key)
            .map(|(_, slot)| *slot)
    }

    // == Remove ==
    /// Drops the association for `key`, returning the slot it pointed at.
    pub fn remove(&mut self, key: &str) -> Option<usize> {
        let bucket = self.bucket_of(key);
        let chain = &mut self.buckets[bucket];
        let pos = chain.iter().position(|(k, _)| &**k == key)?;
        let (_, slot) = chain.swap_remove(pos);
        self.len -= 1;
        Some(slot)
    }

    /// Number of keys in the index.
    pub fn len(&self) -> usize {
        self.len
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of buckets, fixed at construction.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Iterates over every `(key, slot)` pair in bucket order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.buckets
            .iter()
            .flat_map(|chain| chain.iter().map(|(k, slot)| (&**k, *slot)))
    }
}
