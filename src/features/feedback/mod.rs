//! # Feedback Feature
//!
//! Closes the learning loop: completions update hour-slot statistics and every task
//! lifecycle event lands in the interaction log.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod recorder;

pub use recorder::{CompletionOutcome, FeedbackRecorder};
