//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Stale Sweep: Drops cached resources past the staleness threshold

mod sweep;

pub use sweep::spawn_sweep_task;
