//! Cache Store Module
//!
//! Single-threaded cache engine: an entry arena indexed by a [`HashIndex`]
//! and ordered by a [`RecencyList`], with LRU eviction past a fixed capacity.

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use crate::cache::entry::StoredEntry;
use crate::cache::stats::Event;
use crate::cache::{CacheStats, Clock, Entry, EntryRef, HashIndex, RecencyList, MAX_KEY_LENGTH};
use crate::error::{CacheError, CacheResult};

static NEXT_CACHE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
struct Slot {
    generation: u64,
    entry: Option<StoredEntry>,
}

// == Cache Store ==
/// Bounded recency-ordered cache without internal locking.
///
/// The store owns every entry. The index and the recency list only refer to
/// arena slots, and the store keeps the two in step on every operation.
/// Staleness is not checked here; callers read `created_at` and decide.
#[derive(Debug)]
pub struct CacheStore {
    id: u64,
    slots: Vec<Slot>,
    free: Vec<usize>,
    index: HashIndex,
    lru: RecencyList,
    stats: CacheStats,
    /// Maximum number of entries allowed, 0 = unbounded
    max_entries: usize,
    clock: Arc<dyn Clock>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore.
    ///
    /// # Arguments
    /// * `max_entries` - Maximum number of entries, 0 for no eviction
    /// * `index_buckets` - Hash index bucket count, 0 for the default
    /// * `clock` - Time source for creation stamps
    pub fn new(max_entries: usize, index_buckets: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            id: NEXT_CACHE_ID.fetch_add(1, Ordering::Relaxed),
            slots: Vec::new(),
            free: Vec::new(),
            index: HashIndex::new(index_buckets),
            lru: RecencyList::new(),
            stats: CacheStats::new(),
            max_entries,
            clock,
        }
    }

    fn handle(&self, slot: usize) -> EntryRef {
        EntryRef {
            cache_id: self.id,
            slot,
            generation: self.slots[slot].generation,
        }
    }

    fn stored(&self, slot: usize) -> Option<&StoredEntry> {
        self.slots.get(slot).and_then(|s| s.entry.as_ref())
    }

    fn view(&self, slot: usize) -> Option<Entry> {
        self.stored(slot)
            .map(|stored| Entry::from_stored(self.handle(slot), stored))
    }

    // == Get ==
    /// Looks up an entry by key and marks it most recently used.
    ///
    /// `created_at` is left untouched.
    pub fn get(&mut self, key: &str) -> Option<Entry> {
        match self.index.lookup(key) {
            Some(slot) => {
                self.lru.move_to_head(slot);
                self.stats.record(Event::Hit);
                self.view(slot)
            }
            None => {
                self.stats.record(Event::Miss);
                None
            }
        }
    }

    // == Put ==
    /// Stores a resource under `key`, replacing any entry already there.
    ///
    /// A new key is inserted at the head of the recency order and, when the
    /// cache is bounded and now holds more than `max_entries`, the least
    /// recently used entry is evicted. Replacing an existing key swaps its
    /// content, type and creation time and moves it to the head; it never
    /// evicts.
    ///
    /// All storage is reserved before either structure changes, so a failed
    /// call leaves the cache exactly as it was.
    pub fn put(&mut self, key: &str, content_type: &str, content: &[u8]) -> CacheResult<()> {
        validate_key(key)?;

        let mut buf = Vec::new();
        buf.try_reserve_exact(content.len())?;
        buf.extend_from_slice(content);
        let content = Bytes::from(buf);
        let created_at = self.clock.now();

        if let Some(slot) = self.index.lookup(key) {
            if let Some(stored) = self.slots[slot].entry.as_mut() {
                stored.content_type = Arc::from(content_type);
                stored.content = content;
                stored.created_at = created_at;
            }
            self.lru.move_to_head(slot);
            self.stats.record(Event::Replace);
            return Ok(());
        }

        let slot = self.free.last().copied().unwrap_or(self.slots.len());
        if slot == self.slots.len() {
            self.slots.try_reserve(1)?;
            // The free list must be able to take back every slot without allocating
            self.free.try_reserve(self.slots.len() + 1 - self.free.len())?;
        }
        self.lru.reserve_for(slot)?;
        self.index.reserve_for(key)?;

        let key: Arc<str> = Arc::from(key);
        self.index.insert(Arc::clone(&key), slot)?;

        let stored = StoredEntry {
            key,
            content_type: Arc::from(content_type),
            content,
            created_at,
        };
        if slot == self.slots.len() {
            self.slots.push(Slot {
                generation: 0,
                entry: Some(stored),
            });
        } else {
            self.free.pop();
            self.slots[slot].entry = Some(stored);
        }
        self.lru.insert_at_head(slot);
        self.stats.record(Event::Insert);

        if self.max_entries > 0 && self.lru.len() > self.max_entries {
            self.evict_oldest();
        }

        Ok(())
    }

    fn evict_oldest(&mut self) {
        if let Some(slot) = self.lru.remove_tail() {
            if let Some(stored) = self.release(slot) {
                debug!(key = %stored.key, "evicted least recently used entry");
            }
            self.stats.record(Event::Evict);
        }
    }

    /// Frees a slot that has already been unlinked from the recency list.
    fn release(&mut self, slot: usize) -> Option<StoredEntry> {
        let stored = self.slots[slot].entry.take()?;
        self.index.remove(&stored.key);
        self.slots[slot].generation += 1;
        self.free.push(slot);
        Some(stored)
    }

    // == Delete ==
    /// Removes the entry named by `entry` from the cache.
    ///
    /// Fails with `InvalidArgument` when the handle comes from another cache
    /// and with `NotFound` when its entry is already gone. Neither case
    /// changes anything.
    pub fn delete(&mut self, entry: &EntryRef) -> CacheResult<()> {
        if entry.cache_id != self.id {
            return Err(CacheError::InvalidArgument(
                "entry handle belongs to a different cache".to_string(),
            ));
        }

        let live = self
            .slots
            .get(entry.slot)
            .is_some_and(|s| s.generation == entry.generation && s.entry.is_some());
        if !live {
            return Err(CacheError::NotFound(format!(
                "no live entry in slot {}",
                entry.slot
            )));
        }

        self.lru.remove(entry.slot);
        self.release(entry.slot);
        self.stats.record(Event::Delete);
        Ok(())
    }

    // == Print ==
    /// Writes one line per entry, most recently used first:
    /// key, content type, length and creation time, tab separated.
    pub fn print<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        for slot in self.lru.iter() {
            if let Some(stored) = self.stored(slot) {
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}",
                    stored.key,
                    stored.content_type,
                    stored.content.len(),
                    stored.created_at.to_rfc3339()
                )?;
            }
        }
        Ok(())
    }

    // == Snapshot ==
    /// Returns views of all entries, most recently used first.
    ///
    /// Does not change the recency order.
    pub fn snapshot(&self) -> Vec<Entry> {
        self.lru.iter().filter_map(|slot| self.view(slot)).collect()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            total_entries: self.lru.len(),
            ..self.stats.clone()
        }
    }

    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.lru.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lru.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn bucket_count(&self) -> usize {
        self.index.bucket_count()
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    // == Consistency Check ==
    /// Verifies that the index, the recency list and the arena agree.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) -> Result<(), String> {
        use std::collections::HashSet;

        let count = self.lru.len();
        if self.max_entries > 0 && count > self.max_entries {
            return Err(format!("{} entries exceed capacity {}", count, self.max_entries));
        }
        if self.index.len() != count {
            return Err(format!("index holds {} keys, list holds {}", self.index.len(), count));
        }

        let mut listed = HashSet::new();
        for slot in self.lru.iter() {
            let stored = self
                .stored(slot)
                .ok_or_else(|| format!("list links empty slot {}", slot))?;
            if !listed.insert(Arc::clone(&stored.key)) {
                return Err(format!("key {} listed twice", stored.key));
            }
        }
        if listed.len() != count {
            return Err("list length disagrees with traversal".to_string());
        }

        for (key, slot) in self.index.iter() {
            if !listed.contains(key) {
                return Err(format!("indexed key {} missing from list", key));
            }
            match self.stored(slot) {
                Some(stored) if &*stored.key == key => {}
                _ => return Err(format!("index maps {} to wrong slot {}", key, slot)),
            }
        }

        let live = self.slots.iter().filter(|s| s.entry.is_some()).count();
        if live != count || live + self.free.len() != self.slots.len() {
            return Err("arena bookkeeping out of step".to_string());
        }
        Ok(())
    }
}

/// Rejects keys no request path can produce.
fn validate_key(key: &str) -> CacheResult<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidArgument("key must not be empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidArgument(format!(
            "key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}
