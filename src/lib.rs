// Core layer - shared types, configuration and boundary formats
pub mod core;

// Features layer - interpretation, estimation, scheduling and feedback
pub mod features;

// Storage traits and adapters
pub mod database;

pub use core::{Config, Result, SchedulerConfig, SchedulerError};

pub use features::{
    // Feedback
    CompletionOutcome, FeedbackRecorder,
    // Interpreter
    ParsedIntent, TextInterpreter,
    // Lifecycle
    TaskLifecycle,
    // Priority
    PriorityEstimator,
    // Scheduling
    HourStatTracker, SendTimeSelector,
};

pub use database::{HourStatStore, InteractionLog, MemoryStore, SqliteStore};
