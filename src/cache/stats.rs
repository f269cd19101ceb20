//! Cache Statistics Module
//!
//! Counters describing how lookups and writes have gone.

use serde::Serialize;

// == Cache Stats ==
/// Point-in-time counters for one cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Lookups that found an entry, whether or not the caller then judged it
    /// stale
    pub hits: u64,
    /// Lookups that found nothing
    pub misses: u64,
    /// Puts that created a new entry
    pub insertions: u64,
    /// Puts that replaced the content of an existing entry
    pub replacements: u64,
    /// Entries removed through an explicit delete
    pub deletions: u64,
    /// Entries removed to stay within capacity
    pub evictions: u64,
    /// Entries resident right now
    pub total_entries: usize,
}

/// Something the cache did that the counters track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Event {
    Hit,
    Miss,
    Insert,
    Replace,
    Delete,
    Evict,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 before the first lookup.
    pub fn hit_rate(&self) -> f64 {
        match self.hits + self.misses {
            0 => 0.0,
            lookups => self.hits as f64 / lookups as f64,
        }
    }

    pub(crate) fn record(&mut self, event: Event) {
        let counter = match event {
            Event::Hit => &mut self.hits,
            Event::Miss => &mut self.misses,
            Event::Insert => &mut self.insertions,
            Event::Replace => &mut self.replacements,
            Event::Delete => &mut self.deletions,
            Event::Evict => &mut self.evictions,
        };
        *counter += 1;
    }
}
