//! # Scheduler Errors
//!
//! Error type shared by the scheduling core and the store adapters.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchedulerError {
    /// Deadline text did not match `DD-MM-YYYY HH:MM`
    #[error("Invalid deadline format: '{0}' (expected DD-MM-YYYY HH:MM)")]
    InvalidDeadlineFormat(String),

    /// Scheduled reminder text was not an ISO date-time
    #[error("Invalid scheduled send time: '{0}'")]
    InvalidSendTime(String),

    #[error("Hour slot out of range: {0} (expected 0-23)")]
    InvalidHourSlot(u32),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] sqlite::Error),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
