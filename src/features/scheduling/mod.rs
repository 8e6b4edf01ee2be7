//! # Scheduling Feature
//!
//! Adaptive send-time selection backed by per-user hour-of-day statistics.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod hour_stats;
pub mod selector;

pub use hour_stats::{HourStatTracker, HOUR_SLOTS};
pub use selector::{best_hour, reconcile_send_time, SendTimeSelector};
