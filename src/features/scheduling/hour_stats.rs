//! # Hour Statistics Tracker
//!
//! Owns the per-(user, hour) success/trial counters the send-time loop learns from.
//! Read-modify-write cycles are serialized per user with a lock held in a `DashMap`, so
//! concurrent completions for one user cannot lose an increment while different users
//! proceed independently.
//!
//! - **Version**: 1.2.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.2.0: Idle per-user locks are evicted after each operation
//! - 1.1.0: Per-user locking around initialization and outcome recording
//! - 1.0.0: Initial lazy 24-slot initialization with Laplace prior

use dashmap::DashMap;
use log::{debug, info};
use std::sync::{Arc, Mutex};

use crate::core::{HourStat, PriorConfig, Result, SchedulerError};
use crate::database::HourStatStore;

/// Number of hour-of-day slots per user
pub const HOUR_SLOTS: u32 = 24;

pub struct HourStatTracker<S> {
    store: S,
    prior: HourStat,
    user_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl<S: HourStatStore> HourStatTracker<S> {
    pub fn new(store: S, prior: PriorConfig) -> Self {
        Self {
            store,
            prior: HourStat::new(prior.successes, prior.trials),
            user_locks: DashMap::new(),
        }
    }

    fn user_lock(&self, user: &str) -> Arc<Mutex<()>> {
        self.user_locks.entry(user.to_string()).or_default().clone()
    }

    fn with_user_lock<T>(&self, user: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let lock = self.user_lock(user);
        let result = match lock.lock() {
            Ok(_guard) => f(),
            Err(_) => Err(SchedulerError::Storage(format!(
                "hour stat lock poisoned for {user}"
            ))),
        };
        drop(lock);
        // Only the map holds the lock once nobody else is waiting on it
        self.user_locks.remove_if(user, |_, lock| Arc::strong_count(lock) == 1);
        result
    }

    /// Create any missing slots with the prior in a single batch write.
    ///
    /// Returns `true` when slots were created; calling again is a no-op.
    pub fn ensure_initialized(&self, user: &str) -> Result<bool> {
        self.with_user_lock(user, || {
            let mut missing = Vec::new();
            for hour in 0..HOUR_SLOTS {
                if self.store.get_hour_stat(user, hour)?.is_none() {
                    missing.push((hour, self.prior));
                }
            }

            if missing.is_empty() {
                return Ok(false);
            }

            self.store.put_hour_stats(user, &missing)?;
            info!("Initialized {} hour slots for {user}", missing.len());
            Ok(true)
        })
    }

    /// Count one trial for `hour`, and one success iff `success`
    pub fn record_outcome(&self, user: &str, hour: u32, success: bool) -> Result<HourStat> {
        if hour >= HOUR_SLOTS {
            return Err(SchedulerError::InvalidHourSlot(hour));
        }

        self.with_user_lock(user, || {
            let current = self.store.get_hour_stat(user, hour)?.unwrap_or(self.prior);
            let updated = current.record(success);
            self.store.put_hour_stat(user, hour, updated)?;
            debug!(
                "Recorded {} for {user} at {hour:02}:00 -> {}/{}",
                if success { "success" } else { "miss" },
                updated.successes,
                updated.trials
            );
            Ok(updated)
        })
    }

    /// Present slots in ascending hour order
    pub fn slots(&self, user: &str) -> Result<Vec<(u32, HourStat)>> {
        let mut slots = Vec::new();
        for hour in 0..HOUR_SLOTS {
            if let Some(stat) = self.store.get_hour_stat(user, hour)? {
                slots.push((hour, stat));
            }
        }
        Ok(slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{MemoryStore, SqliteStore};
    use std::thread;

    fn tracker() -> HourStatTracker<Arc<MemoryStore>> {
        HourStatTracker::new(Arc::new(MemoryStore::new()), PriorConfig::default())
    }

    #[test]
    fn test_ensure_initialized_creates_24_prior_slots() {
        let tracker = tracker();
        assert!(tracker.ensure_initialized("u1").unwrap());

        let slots = tracker.slots("u1").unwrap();
        assert_eq!(slots.len(), 24);
        for (expected_hour, (hour, stat)) in slots.iter().enumerate() {
            assert_eq!(*hour, expected_hour as u32);
            assert_eq!(*stat, HourStat::new(1, 2));
        }
    }

    #[test]
    fn test_ensure_initialized_is_idempotent() {
        let tracker = tracker();
        assert!(tracker.ensure_initialized("u1").unwrap());
        tracker.record_outcome("u1", 9, true).unwrap();

        assert!(!tracker.ensure_initialized("u1").unwrap());
        assert_eq!(tracker.slots("u1").unwrap().len(), 24);
        // Learned counts survive a second initialization
        assert_eq!(tracker.store.get_hour_stat("u1", 9).unwrap(), Some(HourStat::new(2, 3)));
    }

    #[test]
    fn test_users_are_independent() {
        let tracker = tracker();
        tracker.ensure_initialized("u1").unwrap();
        assert!(tracker.slots("u2").unwrap().is_empty());
    }

    #[test]
    fn test_record_outcome_creates_missing_slot_with_prior() {
        let tracker = tracker();
        let stat = tracker.record_outcome("u1", 7, false).unwrap();
        assert_eq!(stat, HourStat::new(1, 3));
        assert_eq!(tracker.slots("u1").unwrap(), vec![(7, HourStat::new(1, 3))]);
    }

    #[test]
    fn test_record_outcome_keeps_successes_below_trials() {
        let tracker = tracker();
        tracker.ensure_initialized("u1").unwrap();
        for i in 0..50 {
            let stat = tracker.record_outcome("u1", 14, i % 3 != 0).unwrap();
            assert!(stat.successes <= stat.trials);
        }
        let stat = tracker.store.get_hour_stat("u1", 14).unwrap().unwrap();
        assert_eq!(stat.trials, 52);
        assert_eq!(stat.successes, 1 + 33);
    }

    #[test]
    fn test_record_outcome_rejects_bad_hour() {
        let tracker = tracker();
        assert!(matches!(
            tracker.record_outcome("u1", 24, true),
            Err(SchedulerError::InvalidHourSlot(24))
        ));
    }

    #[test]
    fn test_custom_prior() {
        let tracker = HourStatTracker::new(
            MemoryStore::new(),
            PriorConfig {
                successes: 2,
                trials: 4,
            },
        );
        tracker.ensure_initialized("u1").unwrap();
        assert_eq!(tracker.slots("u1").unwrap()[0].1, HourStat::new(2, 4));
    }

    #[test]
    fn test_concurrent_outcomes_for_one_user() {
        let tracker = Arc::new(tracker());
        tracker.ensure_initialized("u1").unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tracker = Arc::clone(&tracker);
                thread::spawn(move || {
                    for _ in 0..25 {
                        tracker.record_outcome("u1", 10, true).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let stat = tracker.store.get_hour_stat("u1", 10).unwrap().unwrap();
        assert_eq!(stat, HourStat::new(1 + 200, 2 + 200));
    }

    #[test]
    fn test_idle_user_locks_are_released() {
        let tracker = tracker();
        tracker.ensure_initialized("u1").unwrap();
        tracker.record_outcome("u2", 3, true).unwrap();
        assert!(tracker.user_locks.is_empty());
    }

    #[test]
    fn test_sqlite_backed_tracker() {
        let tracker =
            HourStatTracker::new(SqliteStore::in_memory().unwrap(), PriorConfig::default());
        assert!(tracker.ensure_initialized("u1").unwrap());
        assert!(!tracker.ensure_initialized("u1").unwrap());
        tracker.record_outcome("u1", 18, true).unwrap();

        let slots = tracker.slots("u1").unwrap();
        assert_eq!(slots.len(), 24);
        assert_eq!(slots[18].1, HourStat::new(2, 3));
    }
}
