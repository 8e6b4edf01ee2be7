//! Turns task completions into hour-slot outcomes and writes lifecycle events to the
//! interaction log.

use chrono::{NaiveDateTime, Timelike};
use log::{debug, info};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use crate::core::{
    format_deadline, format_send_time, HourStat, InteractionEntry, InteractionEvent, Result,
    TaskSnapshot,
};
use crate::database::{HourStatStore, InteractionLog};
use crate::features::scheduling::HourStatTracker;

/// Result of crediting one completion
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompletionOutcome {
    /// Slot that received the trial
    pub hour: u32,
    /// Completed at or before the deadline
    pub success: bool,
    /// Slot counters after the update
    pub stat: HourStat,
}

pub struct FeedbackRecorder<S, L> {
    tracker: Arc<HourStatTracker<S>>,
    log: L,
}

impl<S: HourStatStore, L: InteractionLog> FeedbackRecorder<S, L> {
    pub fn new(tracker: Arc<HourStatTracker<S>>, log: L) -> Self {
        Self { tracker, log }
    }

    fn append(
        &self,
        task: &TaskSnapshot,
        event_type: InteractionEvent,
        at: NaiveDateTime,
        metadata: serde_json::Value,
    ) -> Result<()> {
        let entry = InteractionEntry {
            user: task.user.clone(),
            task_title: task.title.clone(),
            event_type,
            event_time: at,
            metadata,
        };
        self.log.append_interaction(&entry)?;
        debug!("Logged {} for '{}' ({})", event_type.as_str(), task.title, task.user);
        Ok(())
    }

    /// Credit the hour the reminder went out at (or the deadline hour when none was
    /// scheduled) with one trial, successful iff `completed_at <= deadline`.
    pub fn record_completion(
        &self,
        task: &TaskSnapshot,
        completed_at: NaiveDateTime,
    ) -> Result<CompletionOutcome> {
        let deadline = task.deadline_at()?;
        let reference = match task.scheduled_at() {
            Some(scheduled) => scheduled?,
            None => deadline,
        };

        let success = completed_at <= deadline;
        let hour = reference.hour();

        // Logged first: a failed append leaves the hour counters untouched
        self.append(
            task,
            InteractionEvent::Completed,
            completed_at,
            json!({ "success": success }),
        )?;
        let stat = self.tracker.record_outcome(&task.user, hour, success)?;

        info!(
            "Completion for '{}' ({}): {} at {hour:02}:00",
            task.title,
            task.user,
            if success { "on time" } else { "late" }
        );
        Ok(CompletionOutcome { hour, success, stat })
    }

    pub fn log_created(
        &self,
        task: &TaskSnapshot,
        scheduled: NaiveDateTime,
        at: NaiveDateTime,
    ) -> Result<()> {
        let deadline = task.deadline_at()?;
        self.append(
            task,
            InteractionEvent::Created,
            at,
            json!({
                "deadline": format_deadline(&deadline),
                "scheduled": format_send_time(&scheduled),
            }),
        )
    }

    pub fn log_deleted(&self, task: &TaskSnapshot, at: NaiveDateTime) -> Result<()> {
        self.append(task, InteractionEvent::Deleted, at, json!({}))
    }
}
