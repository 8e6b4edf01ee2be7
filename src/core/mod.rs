//! # Core Module
//!
//! Core domain types, configuration, time formats and error handling for the reminder
//! scheduler.
//!
//! - **Version**: 1.2.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Add TaskPatch and boundary time helpers
//! - 1.1.0: Add SchedulerConfig with YAML overrides
//! - 1.0.0: Initial creation with config and error modules

pub mod config;
pub mod error;
pub mod time;
pub mod types;

// Re-export commonly used items
pub use config::{
    CategoryKeywords, Config, EstimatorConfig, InterpreterConfig, KeywordConfig, PriorConfig,
    SchedulerConfig, SelectionConfig, UrgencyKeywords, MAX_ADJUST_MINUTES,
};
pub use error::{Result, SchedulerError};
pub use time::{
    format_deadline, format_send_time, now_local, parse_deadline, parse_send_time,
    DEADLINE_FORMAT, SEND_TIME_FORMAT,
};
pub use types::{
    Category, HourStat, InteractionEntry, InteractionEvent, Prediction, Priority, TaskPatch,
    TaskSnapshot,
};
