//! # Database Layer
//!
//! Narrow storage interfaces consumed by the scheduling core, plus two adapters:
//! an in-process `MemoryStore` and a file-backed `SqliteStore`.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Batched hour-stat writes so slot initialization is a single transaction
//! - 1.0.0: HourStatStore and InteractionLog traits

pub mod memory;
pub mod sqlite_store;

pub use memory::MemoryStore;
pub use sqlite_store::SqliteStore;

use crate::core::{HourStat, InteractionEntry, Result};

/// Read/write access to per-(user, hour) statistics
pub trait HourStatStore {
    fn get_hour_stat(&self, user: &str, hour: u32) -> Result<Option<HourStat>>;

    /// Create or overwrite one slot
    fn put_hour_stat(&self, user: &str, hour: u32, stat: HourStat) -> Result<()>;

    /// Create or overwrite several slots as one write
    fn put_hour_stats(&self, user: &str, stats: &[(u32, HourStat)]) -> Result<()> {
        for (hour, stat) in stats {
            self.put_hour_stat(user, *hour, *stat)?;
        }
        Ok(())
    }
}

/// Append-only audit trail of task lifecycle events
pub trait InteractionLog {
    fn append_interaction(&self, entry: &InteractionEntry) -> Result<()>;
}

impl<T: HourStatStore + ?Sized> HourStatStore for std::sync::Arc<T> {
    fn get_hour_stat(&self, user: &str, hour: u32) -> Result<Option<HourStat>> {
        (**self).get_hour_stat(user, hour)
    }

    fn put_hour_stat(&self, user: &str, hour: u32, stat: HourStat) -> Result<()> {
        (**self).put_hour_stat(user, hour, stat)
    }

    fn put_hour_stats(&self, user: &str, stats: &[(u32, HourStat)]) -> Result<()> {
        (**self).put_hour_stats(user, stats)
    }
}

impl<T: InteractionLog + ?Sized> InteractionLog for std::sync::Arc<T> {
    fn append_interaction(&self, entry: &InteractionEntry) -> Result<()> {
        (**self).append_interaction(entry)
    }
}
