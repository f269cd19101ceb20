//! Response DTOs for the diagnostic endpoints
//!
//! Defines the structure of outgoing JSON bodies.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::{CacheStats, Entry};

/// Response body for the stats endpoint (GET /_cache/stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of lookups that found an entry, stale ones included
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of entries created
    pub insertions: u64,
    /// Number of entries whose content was replaced
    pub replacements: u64,
    /// Number of explicit deletions, stale refreshes included
    pub deletions: u64,
    /// Number of evictions
    pub evictions: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Capacity of the cache, 0 = unbounded
    pub max_entries: usize,
    /// Number of hits whose entry was stale and reloaded from disk
    pub refreshes: u64,
    /// Share of lookups served from a fresh entry ((hits - refreshes) / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache statistics
    pub fn new(stats: &CacheStats, max_entries: usize) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            insertions: stats.insertions,
            replacements: stats.replacements,
            deletions: stats.deletions,
            evictions: stats.evictions,
            total_entries: stats.total_entries,
            max_entries,
            refreshes: 0,
            hit_rate: stats.hit_rate(),
        }
    }

    /// Counts `refreshes` of the hits as misses in the hit rate.
    pub fn with_refreshes(mut self, refreshes: u64) -> Self {
        let lookups = self.hits + self.misses;
        let refreshes = refreshes.min(self.hits);

        self.refreshes = refreshes;
        if lookups > 0 {
            self.hit_rate = (self.hits - refreshes) as f64 / lookups as f64;
        }
        self
    }
}

/// One line of the cache listing
#[derive(Debug, Clone, Serialize)]
pub struct EntrySummary {
    pub key: String,
    pub content_type: String,
    pub content_length: usize,
    pub created_at: DateTime<Utc>,
}

impl From<&Entry> for EntrySummary {
    fn from(entry: &Entry) -> Self {
        Self {
            key: entry.key().to_string(),
            content_type: entry.content_type().to_string(),
            content_length: entry.content_length(),
            created_at: entry.created_at(),
        }
    }
}

/// Response body for the listing endpoint (GET /_cache/entries)
///
/// Entries are ordered from most to least recently used.
#[derive(Debug, Clone, Serialize)]
pub struct EntriesResponse {
    pub count: usize,
    pub entries: Vec<EntrySummary>,
}

impl EntriesResponse {
    pub fn new(entries: &[Entry]) -> Self {
        Self {
            count: entries.len(),
            entries: entries.iter().map(EntrySummary::from).collect(),
        }
    }
}

/// Response body for the health endpoint (GET /_health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}
