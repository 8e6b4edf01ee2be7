//! SQLite-backed store for hour statistics and the interaction log.

use log::{debug, info};
use sqlite::{Connection, State};
use std::sync::{Mutex, MutexGuard};

use super::{HourStatStore, InteractionLog};
use crate::core::{
    format_send_time, parse_send_time, HourStat, InteractionEntry, InteractionEvent, Result,
    SchedulerError,
};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS bandit_stats (
    user_id TEXT NOT NULL,
    hour_slot INTEGER NOT NULL,
    successes INTEGER NOT NULL DEFAULT 1,
    trials INTEGER NOT NULL DEFAULT 2,
    PRIMARY KEY (user_id, hour_slot)
);
CREATE TABLE IF NOT EXISTS interactions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    task_title TEXT NOT NULL,
    event_type TEXT NOT NULL,
    event_time TEXT NOT NULL,
    meta TEXT NOT NULL DEFAULT '{}'
);
CREATE INDEX IF NOT EXISTS idx_interactions_user ON interactions (user_id);
";

pub struct SqliteStore {
    connection: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database file and ensure the schema exists
    pub fn open(path: &str) -> Result<Self> {
        let connection = sqlite::open(path)?;
        connection.execute(SCHEMA)?;
        info!("Opened reminder database at {path}");
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| SchedulerError::Storage("database connection lock poisoned".to_string()))
    }

    fn write_stat(connection: &Connection, user: &str, hour: u32, stat: HourStat) -> Result<()> {
        let mut statement = connection.prepare(
            "INSERT OR REPLACE INTO bandit_stats (user_id, hour_slot, successes, trials)
             VALUES (?, ?, ?, ?)",
        )?;
        statement.bind((1, user))?;
        statement.bind((2, hour as i64))?;
        statement.bind((3, stat.successes as i64))?;
        statement.bind((4, stat.trials as i64))?;
        statement.next()?;
        Ok(())
    }

    /// Logged interactions for a user, oldest first
    pub fn interactions(&self, user: &str) -> Result<Vec<InteractionEntry>> {
        let connection = self.conn()?;
        let mut statement = connection.prepare(
            "SELECT task_title, event_type, event_time, meta
             FROM interactions WHERE user_id = ? ORDER BY id",
        )?;
        statement.bind((1, user))?;

        let mut entries = Vec::new();
        while let State::Row = statement.next()? {
            let task_title = statement.read::<String, _>(0)?;
            let event_type = statement.read::<String, _>(1)?;
            let event_time = statement.read::<String, _>(2)?;
            let meta = statement.read::<String, _>(3)?;

            let event_type = match event_type.as_str() {
                "created" => InteractionEvent::Created,
                "deleted" => InteractionEvent::Deleted,
                "completed" => InteractionEvent::Completed,
                other => {
                    return Err(SchedulerError::Storage(format!(
                        "Unknown interaction event type: {other}"
                    )))
                }
            };
            let metadata = serde_json::from_str(&meta).map_err(|e| {
                SchedulerError::Storage(format!("Corrupt interaction metadata: {e}"))
            })?;

            entries.push(InteractionEntry {
                user: user.to_string(),
                task_title,
                event_type,
                event_time: parse_send_time(&event_time)?,
                metadata,
            });
        }
        Ok(entries)
    }
}

impl HourStatStore for SqliteStore {
    fn get_hour_stat(&self, user: &str, hour: u32) -> Result<Option<HourStat>> {
        let connection = self.conn()?;
        let mut statement = connection.prepare(
            "SELECT successes, trials FROM bandit_stats WHERE user_id = ? AND hour_slot = ?",
        )?;
        statement.bind((1, user))?;
        statement.bind((2, hour as i64))?;

        if let State::Row = statement.next()? {
            let successes = statement.read::<i64, _>(0)?;
            let trials = statement.read::<i64, _>(1)?;
            return Ok(Some(HourStat::new(successes as u32, trials as u32)));
        }
        Ok(None)
    }

    fn put_hour_stat(&self, user: &str, hour: u32, stat: HourStat) -> Result<()> {
        let connection = self.conn()?;
        Self::write_stat(&connection, user, hour, stat)
    }

    fn put_hour_stats(&self, user: &str, stats: &[(u32, HourStat)]) -> Result<()> {
        let connection = self.conn()?;
        connection.execute("BEGIN TRANSACTION")?;
        for (hour, stat) in stats {
            if let Err(e) = Self::write_stat(&connection, user, *hour, *stat) {
                connection.execute("ROLLBACK")?;
                return Err(e);
            }
        }
        connection.execute("COMMIT")?;
        debug!("Wrote {} hour slots for {user}", stats.len());
        Ok(())
    }
}

impl InteractionLog for SqliteStore {
    fn append_interaction(&self, entry: &InteractionEntry) -> Result<()> {
        let connection = self.conn()?;
        let mut statement = connection.prepare(
            "INSERT INTO interactions (user_id, task_title, event_type, event_time, meta)
             VALUES (?, ?, ?, ?, ?)",
        )?;
        let event_time = format_send_time(&entry.event_time);
        let meta = entry.metadata.to_string();
        statement.bind((1, entry.user.as_str()))?;
        statement.bind((2, entry.task_title.as_str()))?;
        statement.bind((3, entry.event_type.as_str()))?;
        statement.bind((4, event_time.as_str()))?;
        statement.bind((5, meta.as_str()))?;
        statement.next()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_stat_roundtrip_and_overwrite() {
        let store = SqliteStore::in_memory().unwrap();
        assert_eq!(store.get_hour_stat("u1", 14).unwrap(), None);

        store.put_hour_stat("u1", 14, HourStat::new(1, 2)).unwrap();
        store.put_hour_stat("u1", 14, HourStat::new(2, 3)).unwrap();

        assert_eq!(store.get_hour_stat("u1", 14).unwrap(), Some(HourStat::new(2, 3)));
        assert_eq!(store.get_hour_stat("u1", 15).unwrap(), None);
    }

    #[test]
    fn test_batch_write_creates_all_slots() {
        let store = SqliteStore::in_memory().unwrap();
        let batch: Vec<(u32, HourStat)> = (0..24).map(|h| (h, HourStat::new(1, 2))).collect();
        store.put_hour_stats("u1", &batch).unwrap();

        for hour in 0..24 {
            assert_eq!(store.get_hour_stat("u1", hour).unwrap(), Some(HourStat::new(1, 2)));
        }
        assert_eq!(store.get_hour_stat("u2", 0).unwrap(), None);
    }

    #[test]
    fn test_interaction_log_roundtrip() {
        let store = SqliteStore::in_memory().unwrap();
        let at = NaiveDate::from_ymd_opt(2026, 10, 14)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        store
            .append_interaction(&InteractionEntry {
                user: "u1".to_string(),
                task_title: "Call mom".to_string(),
                event_type: InteractionEvent::Completed,
                event_time: at,
                metadata: serde_json::json!({ "success": true }),
            })
            .unwrap();

        let entries = store.interactions("u1").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].task_title, "Call mom");
        assert_eq!(entries[0].event_type, InteractionEvent::Completed);
        assert_eq!(entries[0].event_time, at);
        assert_eq!(entries[0].metadata["success"], serde_json::json!(true));
        assert!(store.interactions("u2").unwrap().is_empty());
    }
}
