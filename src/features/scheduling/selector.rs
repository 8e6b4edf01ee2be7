//! # Send-Time Selector
//!
//! Picks the hour with the best smoothed on-time ratio and reconciles it with the task
//! deadline and the current time.
//!
//! Selection is a deterministic argmax over the smoothed means. It never samples, so the
//! same statistics always give the same hour.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use chrono::{Duration, NaiveDateTime};
use log::{debug, info};
use std::sync::Arc;

use super::hour_stats::HourStatTracker;
use crate::core::{HourStat, Result, SchedulerError, SelectionConfig, MAX_ADJUST_MINUTES};
use crate::database::HourStatStore;

pub struct SendTimeSelector<S> {
    tracker: Arc<HourStatTracker<S>>,
    config: SelectionConfig,
}

impl<S: HourStatStore> SendTimeSelector<S> {
    pub fn new(tracker: Arc<HourStatTracker<S>>, config: SelectionConfig) -> Self {
        Self { tracker, config }
    }

    pub fn tracker(&self) -> &Arc<HourStatTracker<S>> {
        &self.tracker
    }

    /// Best hour for `user`, initializing their slots on first use
    pub fn choose_hour(&self, user: &str) -> Result<u32> {
        self.tracker.ensure_initialized(user)?;
        let slots = self.tracker.slots(user)?;
        let hour = best_hour(&slots, &self.config);
        debug!("Best hour for {user}: {hour:02}:00 ({} slots scored)", slots.len());
        Ok(hour)
    }

    /// Hour recommendation query; same selection as scheduling
    pub fn recommend_hour(&self, user: &str) -> Result<u32> {
        self.choose_hour(user)
    }

    /// Concrete send timestamp for a task due at `deadline`
    pub fn choose_send_time(
        &self,
        user: &str,
        deadline: NaiveDateTime,
        now: NaiveDateTime,
    ) -> Result<NaiveDateTime> {
        let hour = self.choose_hour(user)?;
        let candidate = deadline
            .date()
            .and_hms_opt(hour, 0, 0)
            .ok_or(SchedulerError::InvalidHourSlot(hour))?;
        let send_time = reconcile_send_time(candidate, deadline, now, &self.config);

        info!(
            "Scheduled reminder for {user} at {} (best hour {hour:02}:00, deadline {})",
            send_time, deadline
        );
        Ok(send_time)
    }
}

/// Argmax of the smoothed ratio; the lowest hour wins ties. Falls back when `slots` is empty.
pub fn best_hour(slots: &[(u32, HourStat)], config: &SelectionConfig) -> u32 {
    let mut best_score = f64::NEG_INFINITY;
    let mut best = config.fallback_hour;

    for (hour, stat) in slots {
        let score = stat.smoothed_ratio(config.smoothing_successes, config.smoothing_trials);
        if score > best_score {
            best_score = score;
            best = *hour;
        }
    }
    best
}

/// Minutes clamped to `0..=MAX_ADJUST_MINUTES` so the arithmetic below cannot overflow
fn adjustment(minutes: i64) -> Duration {
    Duration::minutes(minutes.clamp(0, MAX_ADJUST_MINUTES))
}

/// Move a candidate that lands after the deadline to `deadline - margin`, then push
/// anything that ends up in the past to `now + nudge`.
pub fn reconcile_send_time(
    candidate: NaiveDateTime,
    deadline: NaiveDateTime,
    now: NaiveDateTime,
    config: &SelectionConfig,
) -> NaiveDateTime {
    let mut send_time = candidate;
    if send_time > deadline {
        send_time = deadline
            .checked_sub_signed(adjustment(config.deadline_margin_minutes))
            .unwrap_or(deadline);
    }
    if send_time < now {
        send_time = now
            .checked_add_signed(adjustment(config.past_nudge_minutes))
            .unwrap_or(now);
    }
    send_time
}
