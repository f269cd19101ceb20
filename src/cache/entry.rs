//! Cache Entry Module
//!
//! Defines the read view handed out by the cache and the handle used to
//! delete a specific entry.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};

// == Entry Handle ==
/// Identifies one live entry of one cache.
///
/// The generation changes every time the slot is reused, so a handle kept
/// past its entry's removal can never name a newer entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryRef {
    pub(crate) cache_id: u64,
    pub(crate) slot: usize,
    pub(crate) generation: u64,
}

// == Stored Entry ==
/// Arena-resident storage for one cached resource.
#[derive(Debug)]
pub(crate) struct StoredEntry {
    pub key: Arc<str>,
    pub content_type: Arc<str>,
    pub content: Bytes,
    pub created_at: DateTime<Utc>,
}

// == Entry View ==
/// Snapshot of a cached resource as returned by the cache.
///
/// Content is reference counted, cloning a view never copies the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    handle: EntryRef,
    key: Arc<str>,
    content_type: Arc<str>,
    content: Bytes,
    created_at: DateTime<Utc>,
}

impl Entry {
    pub(crate) fn from_stored(handle: EntryRef, stored: &StoredEntry) -> Self {
        Self {
            handle,
            key: Arc::clone(&stored.key),
            content_type: Arc::clone(&stored.content_type),
            content: stored.content.clone(),
            created_at: stored.created_at,
        }
    }

    /// Handle to pass back to [`Cache::delete`](super::Cache::delete).
    pub fn handle(&self) -> EntryRef {
        self.handle
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn content_length(&self) -> usize {
        self.content.len()
    }

    /// Time of the last insertion or replacement. Reads do not touch it.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    // == Age ==
    /// Returns how long ago the entry was created, measured against `now`.
    ///
    /// Never negative: a clock that moved backwards yields zero.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.created_at).max(Duration::zero())
    }

    /// Checks whether the entry is older than `max_age` at `now`.
    ///
    /// An entry exactly `max_age` old is still fresh.
    pub fn is_older_than(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        self.age(now) > max_age
    }
}
