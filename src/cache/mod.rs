//! Cache Module
//!
//! Bounded, recency-ordered content cache with LRU eviction. Staleness is
//! left to callers, who read each entry's creation time.

mod clock;
mod entry;
mod index;
mod lru;
mod shared;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{Entry, EntryRef};
pub use index::{HashIndex, DEFAULT_BUCKETS};
pub use lru::RecencyList;
pub use shared::Cache;
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;
