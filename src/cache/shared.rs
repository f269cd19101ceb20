//! Shared Cache Module
//!
//! Thread-safe handle over a [`CacheStore`]. One mutex covers the index and
//! the recency list together, so every operation is observed as a whole.

use std::io;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::cache::{CacheStats, CacheStore, Clock, Entry, EntryRef, SystemClock};
use crate::error::CacheResult;

// == Cache ==
/// Cloneable, thread-safe content cache.
///
/// No operation performs I/O or waits on anything but the lock, so the lock
/// is held only for in-memory work.
#[derive(Debug, Clone)]
pub struct Cache {
    inner: Arc<Mutex<CacheStore>>,
}

impl Cache {
    // == Constructor ==
    /// Creates a cache stamping entries with the system clock.
    ///
    /// # Arguments
    /// * `max_entries` - Maximum number of entries, 0 for no eviction
    /// * `index_buckets` - Hash index bucket count, 0 for the default
    pub fn new(max_entries: usize, index_buckets: usize) -> Self {
        Self::with_clock(max_entries, index_buckets, Arc::new(SystemClock))
    }

    /// Creates a cache stamping entries with `clock`.
    pub fn with_clock(max_entries: usize, index_buckets: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CacheStore::new(max_entries, index_buckets, clock))),
        }
    }

    /// See [`CacheStore::get`].
    pub fn get(&self, key: &str) -> Option<Entry> {
        self.inner.lock().get(key)
    }

    /// See [`CacheStore::put`].
    pub fn put(&self, key: &str, content_type: &str, content: &[u8]) -> CacheResult<()> {
        self.inner.lock().put(key, content_type, content)
    }

    /// See [`CacheStore::delete`].
    pub fn delete(&self, entry: &EntryRef) -> CacheResult<()> {
        self.inner.lock().delete(entry)
    }

    // == Print ==
    /// Writes the diagnostic listing to `out`.
    ///
    /// The listing is rendered under the lock and written after releasing it.
    pub fn print<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        let mut listing = Vec::new();
        self.inner.lock().print(&mut listing)?;
        out.write_all(&listing)
    }

    /// Renders the diagnostic listing as a string.
    pub fn listing(&self) -> String {
        let mut listing = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.inner.lock().print(&mut listing);
        String::from_utf8_lossy(&listing).into_owned()
    }

    pub fn snapshot(&self) -> Vec<Entry> {
        self.inner.lock().snapshot()
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.inner.lock().max_entries()
    }

    /// The clock entries are stamped with.
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(self.inner.lock().clock())
    }

    #[cfg(test)]
    pub(crate) fn check_invariants(&self) -> Result<(), String> {
        self.inner.lock().check_invariants()
    }
}
