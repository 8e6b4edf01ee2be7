//! In-memory store backed by `DashMap`, used by tests and one-shot CLI runs.

use dashmap::DashMap;

use super::{HourStatStore, InteractionLog};
use crate::core::{HourStat, InteractionEntry, Result};

/// Composite key for hour statistics: (user, hour_slot)
type SlotKey = (String, u32);

#[derive(Default)]
pub struct MemoryStore {
    stats: DashMap<SlotKey, HourStat>,
    interactions: DashMap<String, Vec<InteractionEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn make_key(user: &str, hour: u32) -> SlotKey {
        (user.to_string(), hour)
    }

    /// Number of slots stored for a user
    pub fn slot_count(&self, user: &str) -> usize {
        self.stats.iter().filter(|entry| entry.key().0 == user).count()
    }

    /// Logged interactions for a user, oldest first
    pub fn interactions(&self, user: &str) -> Vec<InteractionEntry> {
        self.interactions
            .get(user)
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

impl HourStatStore for MemoryStore {
    fn get_hour_stat(&self, user: &str, hour: u32) -> Result<Option<HourStat>> {
        Ok(self.stats.get(&Self::make_key(user, hour)).map(|s| *s))
    }

    fn put_hour_stat(&self, user: &str, hour: u32, stat: HourStat) -> Result<()> {
        self.stats.insert(Self::make_key(user, hour), stat);
        Ok(())
    }
}

impl InteractionLog for MemoryStore {
    fn append_interaction(&self, entry: &InteractionEntry) -> Result<()> {
        self.interactions
            .entry(entry.user.clone())
            .or_default()
            .push(entry.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::InteractionEvent;
    use chrono::NaiveDate;

    #[test]
    fn test_put_then_get() {
        let store = MemoryStore::new();
        assert_eq!(store.get_hour_stat("u1", 9).unwrap(), None);

        store.put_hour_stat("u1", 9, HourStat::new(3, 5)).unwrap();
        assert_eq!(store.get_hour_stat("u1", 9).unwrap(), Some(HourStat::new(3, 5)));
        assert_eq!(store.get_hour_stat("u2", 9).unwrap(), None);
    }

    #[test]
    fn test_batch_put_counts_slots_per_user() {
        let store = MemoryStore::new();
        let batch: Vec<(u32, HourStat)> = (0..24).map(|h| (h, HourStat::new(1, 2))).collect();
        store.put_hour_stats("u1", &batch).unwrap();
        store.put_hour_stat("u2", 0, HourStat::new(1, 2)).unwrap();

        assert_eq!(store.slot_count("u1"), 24);
        assert_eq!(store.slot_count("u2"), 1);
    }

    #[test]
    fn test_interactions_are_per_user_and_ordered() {
        let store = MemoryStore::new();
        let at = NaiveDate::from_ymd_opt(2026, 10, 14)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        for (title, event) in [("a", InteractionEvent::Created), ("a", InteractionEvent::Deleted)] {
            store
                .append_interaction(&InteractionEntry {
                    user: "u1".to_string(),
                    task_title: title.to_string(),
                    event_type: event,
                    event_time: at,
                    metadata: serde_json::json!({}),
                })
                .unwrap();
        }

        let entries = store.interactions("u1");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].event_type, InteractionEvent::Created);
        assert_eq!(entries[1].event_type, InteractionEvent::Deleted);
        assert!(store.interactions("u2").is_empty());
    }
}
