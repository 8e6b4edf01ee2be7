//! # Boundary Time Formats
//!
//! Deadlines cross the core boundary as `DD-MM-YYYY HH:MM` text, scheduled reminders as
//! sortable ISO date-times. Everything inside the core works on `NaiveDateTime`.

use chrono::NaiveDateTime;

use super::error::{Result, SchedulerError};

/// Deadline text format (24-hour clock)
pub const DEADLINE_FORMAT: &str = "%d-%m-%Y %H:%M";

/// Scheduled reminder text format
pub const SEND_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Current local wall-clock time
pub fn now_local() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Strictly parse a deadline string in the boundary format
pub fn parse_deadline(text: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text.trim(), DEADLINE_FORMAT)
        .map_err(|_| SchedulerError::InvalidDeadlineFormat(text.to_string()))
}

pub fn format_deadline(deadline: &NaiveDateTime) -> String {
    deadline.format(DEADLINE_FORMAT).to_string()
}

/// Parse a scheduled reminder timestamp. Fractional seconds are accepted.
pub fn parse_send_time(text: &str) -> Result<NaiveDateTime> {
    text.trim()
        .parse::<NaiveDateTime>()
        .map_err(|_| SchedulerError::InvalidSendTime(text.to_string()))
}

pub fn format_send_time(send_time: &NaiveDateTime) -> String {
    send_time.format(SEND_TIME_FORMAT).to_string()
}

/// Serde adapter for optional deadlines in the boundary format
pub mod deadline_opt {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_some(&super::format_deadline(dt)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| super::parse_deadline(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
