//! # Task Lifecycle
//!
//! Wires scheduling and feedback into the create, update, delete and complete events of a
//! task. Callers own task persistence; this layer only returns updated snapshots.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

use chrono::NaiveDateTime;
use log::info;
use std::sync::Arc;

use crate::core::{format_send_time, Result, SchedulerConfig, TaskPatch, TaskSnapshot};
use crate::database::{HourStatStore, InteractionLog};
use crate::features::feedback::{CompletionOutcome, FeedbackRecorder};
use crate::features::scheduling::{HourStatTracker, SendTimeSelector};

pub struct TaskLifecycle<S, L> {
    selector: SendTimeSelector<S>,
    recorder: FeedbackRecorder<S, L>,
}

impl<S: HourStatStore, L: InteractionLog> TaskLifecycle<S, L> {
    pub fn new(store: S, log: L, config: &SchedulerConfig) -> Self {
        let tracker = Arc::new(HourStatTracker::new(store, config.prior));
        Self {
            selector: SendTimeSelector::new(Arc::clone(&tracker), config.selection),
            recorder: FeedbackRecorder::new(tracker, log),
        }
    }

    pub fn selector(&self) -> &SendTimeSelector<S> {
        &self.selector
    }

    fn schedule(&self, task: &TaskSnapshot, now: NaiveDateTime) -> Result<NaiveDateTime> {
        let deadline = task.deadline_at()?;
        self.selector.choose_send_time(&task.user, deadline, now)
    }

    /// New task: pick a send time and log the creation
    pub fn create(&self, task: &TaskSnapshot, now: NaiveDateTime) -> Result<TaskSnapshot> {
        let send_time = self.schedule(task, now)?;
        let created = task.clone().with_scheduled_reminder(&format_send_time(&send_time));
        self.recorder.log_created(&created, send_time, now)?;
        Ok(created)
    }

    /// Merge `patch`; the reminder is only rescheduled when the deadline changes
    pub fn update(
        &self,
        task: &TaskSnapshot,
        patch: &TaskPatch,
        now: NaiveDateTime,
    ) -> Result<TaskSnapshot> {
        let updated = patch.apply(task);
        if !patch.touches_deadline() {
            return Ok(updated);
        }

        let send_time = self.schedule(&updated, now)?;
        info!("Rescheduled '{}' for {} after deadline change", updated.title, updated.user);
        Ok(updated.with_scheduled_reminder(&format_send_time(&send_time)))
    }

    pub fn delete(&self, task: &TaskSnapshot, now: NaiveDateTime) -> Result<()> {
        self.recorder.log_deleted(task, now)
    }

    /// Mark done at `now` and feed the outcome back into the hour statistics
    pub fn complete(&self, task: &TaskSnapshot, now: NaiveDateTime) -> Result<CompletionOutcome> {
        self.recorder.record_completion(task, now)
    }

    pub fn recommend_hour(&self, user: &str) -> Result<u32> {
        self.selector.recommend_hour(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{HourStat, InteractionEvent, SchedulerError};
    use crate::database::{MemoryStore, SqliteStore};
    use chrono::NaiveDate;

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn lifecycle() -> (Arc<MemoryStore>, TaskLifecycle<Arc<MemoryStore>, Arc<MemoryStore>>) {
        let store = Arc::new(MemoryStore::new());
        let lifecycle =
            TaskLifecycle::new(store.clone(), store.clone(), &SchedulerConfig::default());
        (store, lifecycle)
    }

    #[test]
    fn test_create_sets_scheduled_reminder_and_logs() {
        let (store, lifecycle) = lifecycle();
        let task = TaskSnapshot::new("u1", "report", "20-10-2026 17:00");

        let created = lifecycle.create(&task, at(14, 10, 0)).unwrap();
        // Fresh user: every slot ties, so hour 0 on the deadline date
        assert_eq!(created.scheduled_reminder.as_deref(), Some("2026-10-20T00:00:00"));
        assert_eq!(store.slot_count("u1"), 24);

        let log = store.interactions("u1");
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].event_type, InteractionEvent::Created);
        assert_eq!(log[0].metadata["scheduled"], "2026-10-20T00:00:00");
    }

    #[test]
    fn test_create_rejects_malformed_deadline() {
        let (store, lifecycle) = lifecycle();
        let task = TaskSnapshot::new("u1", "report", "2026-10-20 17:00");
        assert!(matches!(
            lifecycle.create(&task, at(14, 10, 0)),
            Err(SchedulerError::InvalidDeadlineFormat(_))
        ));
        assert!(store.interactions("u1").is_empty());
    }

    #[test]
    fn test_update_without_deadline_keeps_reminder() {
        let (_, lifecycle) = lifecycle();
        let task = TaskSnapshot::new("u1", "report", "20-10-2026 17:00")
            .with_scheduled_reminder("2026-10-20T09:00:00");
        let patch = TaskPatch {
            title: Some("final report".to_string()),
            ..Default::default()
        };

        let updated = lifecycle.update(&task, &patch, at(14, 10, 0)).unwrap();
        assert_eq!(updated.title, "final report");
        assert_eq!(updated.scheduled_reminder.as_deref(), Some("2026-10-20T09:00:00"));
    }

    #[test]
    fn test_update_with_deadline_reschedules() {
        let (_, lifecycle) = lifecycle();
        lifecycle.selector().tracker().record_outcome("u1", 11, true).unwrap();
        let task = TaskSnapshot::new("u1", "report", "20-10-2026 17:00")
            .with_scheduled_reminder("2026-10-20T09:00:00");
        let patch = TaskPatch {
            deadline: Some("22-10-2026 17:00".to_string()),
            ..Default::default()
        };

        let updated = lifecycle.update(&task, &patch, at(14, 10, 0)).unwrap();
        assert_eq!(updated.deadline, "22-10-2026 17:00");
        assert_eq!(updated.scheduled_reminder.as_deref(), Some("2026-10-22T11:00:00"));
    }

    #[test]
    fn test_complete_feeds_back_into_recommendation() {
        let (store, lifecycle) = lifecycle();
        let task = TaskSnapshot::new("u1", "report", "20-10-2026 17:00")
            .with_scheduled_reminder("2026-10-20T15:00:00");

        let outcome = lifecycle.complete(&task, at(20, 16, 0)).unwrap();
        assert_eq!(outcome.hour, 15);
        assert!(outcome.success);
        assert_eq!(lifecycle.recommend_hour("u1").unwrap(), 15);
        assert_eq!(store.slot_count("u1"), 24);
    }

    #[test]
    fn test_delete_logs_event() {
        let (store, lifecycle) = lifecycle();
        let task = TaskSnapshot::new("u1", "report", "20-10-2026 17:00");
        lifecycle.delete(&task, at(14, 12, 0)).unwrap();

        let log = store.interactions("u1");
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].event_type, InteractionEvent::Deleted);
    }

    #[test]
    fn test_full_cycle_on_sqlite() {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let lifecycle =
            TaskLifecycle::new(store.clone(), store.clone(), &SchedulerConfig::default());
        let task = TaskSnapshot::new("u1", "report", "20-10-2026 17:00");

        let created = lifecycle.create(&task, at(14, 10, 0)).unwrap();
        let outcome = lifecycle.complete(&created, at(20, 18, 0)).unwrap();
        assert_eq!(outcome.hour, 0);
        assert!(!outcome.success);
        assert_eq!(outcome.stat, HourStat::new(1, 3));

        let log = store.interactions("u1").unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[1].event_type, InteractionEvent::Completed);
        // The miss moves the recommendation off midnight
        assert_eq!(lifecycle.recommend_hour("u1").unwrap(), 1);
    }
}
