//! # Features Layer
//!
//! Each feature owns one stage of the reminder pipeline. Interpretation and estimation are
//! stateless; scheduling, feedback and lifecycle share the hour-stat tracker.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

pub mod feedback;
pub mod interpreter;
pub mod lifecycle;
pub mod priority;
pub mod scheduling;

pub use feedback::{CompletionOutcome, FeedbackRecorder};
pub use interpreter::{DeadlineParser, ParseFailure, ParsedIntent, TextInterpreter};
pub use lifecycle::TaskLifecycle;
pub use priority::PriorityEstimator;
pub use scheduling::{HourStatTracker, SendTimeSelector, HOUR_SLOTS};
