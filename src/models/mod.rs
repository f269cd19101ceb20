//! Response models for the diagnostic endpoints
//!
//! Defines the serde DTOs returned by the health and cache inspection routes.

pub mod responses;

// Re-export commonly used types
pub use responses::{EntriesResponse, EntrySummary, HealthResponse, StatsResponse};
