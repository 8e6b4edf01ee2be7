//! # Deadline Detection
//!
//! Two stages. `parse_natural` recognises explicit dates, weekdays and times of day and is
//! biased toward the future. When it fails, `relative_fallback` applies the ordered keyword
//! rules: "tomorrow", "in N minutes/hours/days", "today".
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Explicit ParseFailure result instead of a bare Option
//! - 1.0.0: Initial regex-based detection

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use log::debug;
use regex::{Captures, Regex};
use thiserror::Error;

use crate::core::InterpreterConfig;

const MONTHS: &str = "january|february|march|april|may|june|july|august|september|october|\
november|december|sept|jan|feb|mar|apr|jun|jul|aug|sep|oct|nov|dec";

const MONTH_PREFIXES: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// How many years ahead a year-less date may roll (covers 29 February)
const YEARLESS_LOOKAHEAD: i32 = 4;

/// Why the natural-language stage produced nothing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("empty text")]
    Empty,

    #[error("no date or time found")]
    NoDateFound,

    #[error("impossible calendar date: '{0}'")]
    InvalidDate(String),
}

pub struct DeadlineParser {
    iso_date: Regex,
    numeric_date: Regex,
    day_month: Regex,
    month_day: Regex,
    weekday: Regex,
    quantity_unit: Regex,
    clock_time: Regex,
    meridiem_time: Regex,
    named_time: Regex,
    relative_offset: Regex,
    hours: InterpreterConfig,
}

impl DeadlineParser {
    pub fn new(hours: InterpreterConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            iso_date: Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})(?:[t ](\d{1,2}):(\d{2}))?\b")?,
            numeric_date: Regex::new(r"\b(\d{1,2})[-/.](\d{1,2})[-/.](\d{4})\b")?,
            day_month: Regex::new(&format!(
                r"\b(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?({MONTHS})\.?(?:,?\s+(\d{{4}}))?\b"
            ))?,
            month_day: Regex::new(&format!(
                r"\b({MONTHS})\.?\s+(\d{{1,2}})(st|nd|rd|th)?(?:,?\s+(\d{{4}}))?\b"
            ))?,
            weekday: Regex::new(
                r"\b(?:(next|this)\s+)?(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b",
            )?,
            quantity_unit: Regex::new(r"^\s+(?:minute|min|hour|hr|day|week|month|year|time)s?\b")?,
            clock_time: Regex::new(r"\b(\d{1,2}):(\d{2})(?:\s*(am|pm))?\b")?,
            meridiem_time: Regex::new(r"\b(\d{1,2})\s*(am|pm)\b")?,
            named_time: Regex::new(r"\b(noon|midnight)\b")?,
            relative_offset: Regex::new(r"in (\d+)\s*(minutes|minute|hours|hour|days|day)")?,
            hours,
        })
    }

    /// Natural parse first, then the relative keyword rules
    pub fn detect(&self, text: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
        match self.parse_natural(text, now) {
            Ok(deadline) => Some(deadline),
            Err(failure) => {
                debug!("Natural date parse failed ({failure}), trying relative rules");
                self.relative_fallback(text, now)
            }
        }
    }

    /// Explicit dates, weekdays and times of day, biased toward the future
    pub fn parse_natural(
        &self,
        text: &str,
        now: NaiveDateTime,
    ) -> Result<NaiveDateTime, ParseFailure> {
        let lowered = text.to_lowercase();
        if lowered.trim().is_empty() {
            return Err(ParseFailure::Empty);
        }

        let time = self.find_time(&lowered);
        if let Some(deadline) = self.find_date(&lowered, time, now)? {
            return Ok(deadline);
        }

        let Some(time) = time else {
            return Err(ParseFailure::NoDateFound);
        };

        // "in 2 days at 10am" belongs to the relative rules
        if self.relative_offset.is_match(&lowered) {
            return Err(ParseFailure::NoDateFound);
        }

        let today = now.date();
        let date = if lowered.contains("tomorrow") {
            today.succ_opt()
        } else if lowered.contains("today") || today.and_time(time) >= now {
            Some(today)
        } else {
            today.succ_opt()
        };

        date.map(|d| d.and_time(time))
            .ok_or_else(|| ParseFailure::InvalidDate(lowered.trim().to_string()))
    }

    /// Ordered keyword rules applied when no explicit date was found
    pub fn relative_fallback(&self, text: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
        let lowered = text.to_lowercase();

        if lowered.contains("tomorrow") {
            return now
                .date()
                .succ_opt()
                .and_then(|d| d.and_hms_opt(self.hours.tomorrow_hour, 0, 0));
        }

        // An offset too large to represent falls through to the "today" rule
        if let Some(deadline) = self.offset_from_now(&lowered, now) {
            return Some(deadline);
        }

        if lowered.contains("today") {
            return now.date().and_hms_opt(self.hours.today_hour, 0, 0);
        }

        None
    }

    fn offset_from_now(&self, text: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
        let caps = self.relative_offset.captures(text)?;
        let qty: i64 = caps[1].parse().ok()?;
        let unit = &caps[2];
        let offset = if unit.starts_with("minute") {
            Duration::try_minutes(qty)
        } else if unit.starts_with("hour") {
            Duration::try_hours(qty)
        } else {
            Duration::try_days(qty)
        }?;
        now.checked_add_signed(offset)
    }

    fn find_time(&self, text: &str) -> Option<NaiveTime> {
        if let Some(caps) = self.clock_time.captures(text) {
            let hour: u32 = caps[1].parse().ok()?;
            let minute: u32 = caps[2].parse().ok()?;
            let hour = match caps.get(3) {
                Some(meridiem) => to_24_hour(hour, meridiem.as_str())?,
                None => hour,
            };
            return NaiveTime::from_hms_opt(hour, minute, 0);
        }

        if let Some(caps) = self.meridiem_time.captures(text) {
            let hour: u32 = caps[1].parse().ok()?;
            return NaiveTime::from_hms_opt(to_24_hour(hour, &caps[2])?, 0, 0);
        }

        self.named_time.captures(text).and_then(|caps| match &caps[1] {
            "noon" => NaiveTime::from_hms_opt(12, 0, 0),
            _ => NaiveTime::from_hms_opt(0, 0, 0),
        })
    }

    fn find_date(
        &self,
        text: &str,
        time: Option<NaiveTime>,
        now: NaiveDateTime,
    ) -> Result<Option<NaiveDateTime>, ParseFailure> {
        let default_time = NaiveTime::from_hms_opt(self.hours.default_hour, 0, 0)
            .ok_or_else(|| ParseFailure::InvalidDate(format!("{}:00", self.hours.default_hour)))?;
        let time_of_day = time.unwrap_or(default_time);

        if let Some(caps) = self.iso_date.captures(text) {
            let date = ymd(&caps, 1, 2, 3)?;
            let time = if caps.get(4).is_some() {
                NaiveTime::from_hms_opt(number(&caps, 4)?, number(&caps, 5)?, 0)
                    .ok_or_else(|| invalid(&caps))?
            } else {
                time_of_day
            };
            return Ok(Some(date.and_time(time)));
        }

        if let Some(caps) = self.numeric_date.captures(text) {
            let date = ymd(&caps, 3, 2, 1)?;
            return Ok(Some(date.and_time(time_of_day)));
        }

        if let Some(caps) = self.day_month.captures(text) {
            let day = number(&caps, 1)?;
            let month = month_number(&caps[2]).ok_or_else(|| invalid(&caps))?;
            let year = optional_year(&caps, 3)?;
            return resolve_month_day(&caps, year, month, day, time_of_day, now).map(Some);
        }

        let month_day = self
            .month_day
            .captures(text)
            .filter(|caps| !self.is_modal_may(caps, text));
        if let Some(caps) = month_day {
            let month = month_number(&caps[1]).ok_or_else(|| invalid(&caps))?;
            let day = number(&caps, 2)?;
            let year = optional_year(&caps, 4)?;
            return resolve_month_day(&caps, year, month, day, time_of_day, now).map(Some);
        }

        if let Some(caps) = self.weekday.captures(text) {
            let target: Weekday = caps[2].parse().map_err(|_| invalid(&caps))?;
            let current = now.weekday().num_days_from_monday();
            let mut ahead = (target.num_days_from_monday() + 7 - current) % 7;
            // "this <today>" is today; a bare or "next" weekday is a week out
            let this_week = caps.get(1).is_some_and(|m| m.as_str() == "this");
            if ahead == 0 && !this_week {
                ahead = 7;
            }
            let date = now.date() + Duration::days(i64::from(ahead));
            return Ok(Some(date.and_time(time_of_day)));
        }

        Ok(None)
    }

    /// "may 2 hours" reads "may" as a verb: no ordinal, no year, and a unit word follows
    fn is_modal_may(&self, caps: &Captures<'_>, text: &str) -> bool {
        if &caps[1] != "may" || caps.get(3).is_some() || caps.get(4).is_some() {
            return false;
        }
        caps.get(0)
            .is_some_and(|whole| self.quantity_unit.is_match(&text[whole.end()..]))
    }
}

/// Month/day with an optional explicit year. Without a year, the first occurrence not in
/// the past is used.
fn resolve_month_day(
    caps: &Captures<'_>,
    year: Option<i32>,
    month: u32,
    day: u32,
    time: NaiveTime,
    now: NaiveDateTime,
) -> Result<NaiveDateTime, ParseFailure> {
    if let Some(year) = year {
        return NaiveDate::from_ymd_opt(year, month, day)
            .map(|d| d.and_time(time))
            .ok_or_else(|| invalid(caps));
    }

    (0..=YEARLESS_LOOKAHEAD)
        .filter_map(|ahead| NaiveDate::from_ymd_opt(now.year() + ahead, month, day))
        .map(|d| d.and_time(time))
        .find(|candidate| *candidate >= now)
        .ok_or_else(|| invalid(caps))
}

fn optional_year(caps: &Captures<'_>, group: usize) -> Result<Option<i32>, ParseFailure> {
    match caps.get(group) {
        Some(_) => Ok(Some(number(caps, group)? as i32)),
        None => Ok(None),
    }
}

fn to_24_hour(hour: u32, meridiem: &str) -> Option<u32> {
    if !(1..=12).contains(&hour) {
        return None;
    }
    match meridiem {
        "am" => Some(hour % 12),
        _ => Some(hour % 12 + 12),
    }
}

fn month_number(name: &str) -> Option<u32> {
    MONTH_PREFIXES
        .iter()
        .position(|prefix| name.starts_with(prefix))
        .map(|idx| idx as u32 + 1)
}

fn invalid(caps: &Captures<'_>) -> ParseFailure {
    ParseFailure::InvalidDate(caps[0].to_string())
}

fn number(caps: &Captures<'_>, group: usize) -> Result<u32, ParseFailure> {
    caps.get(group)
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| invalid(caps))
}

fn ymd(caps: &Captures<'_>, y: usize, m: usize, d: usize) -> Result<NaiveDate, ParseFailure> {
    let year = number(caps, y)? as i32;
    NaiveDate::from_ymd_opt(year, number(caps, m)?, number(caps, d)?).ok_or_else(|| invalid(caps))
}
