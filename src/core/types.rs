//! # Domain Types
//!
//! Task snapshots, patches and the labels shared by the interpreter, estimator and scheduler.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Added TaskPatch with pure merge in place of field-by-name updates
//! - 1.0.0: Initial priority/category labels and TaskSnapshot

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::error::Result;
use super::time;

/// Priority label used both as a declared task field and as an inferred hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    /// Parse a stored label, case-insensitive
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }
}

/// Closed set of task categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Work,
    Health,
    Finance,
    Personal,
    #[default]
    #[serde(other)]
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Work => "work",
            Category::Health => "health",
            Category::Finance => "finance",
            Category::Personal => "personal",
            Category::Other => "other",
        }
    }

    /// Unknown labels map to `Other`
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "work" => Category::Work,
            "health" => Category::Health,
            "finance" => Category::Finance,
            "personal" => Category::Personal,
            _ => Category::Other,
        }
    }
}

/// Copy of the task fields the scheduler and estimator read.
///
/// Owned by the external task store; the core only ever returns modified copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    /// Owning user identifier
    pub user: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub recurring: bool,
    /// Deadline text, `DD-MM-YYYY HH:MM`
    pub deadline: String,
    /// Previously scheduled reminder, ISO text
    #[serde(default)]
    pub scheduled_reminder: Option<String>,
}

impl TaskSnapshot {
    pub fn new(user: &str, title: &str, deadline: &str) -> Self {
        Self {
            user: user.to_string(),
            title: title.to_string(),
            description: String::new(),
            category: Category::Other,
            priority: Priority::Medium,
            recurring: false,
            deadline: deadline.to_string(),
            scheduled_reminder: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_scheduled_reminder(mut self, scheduled: &str) -> Self {
        self.scheduled_reminder = Some(scheduled.to_string());
        self
    }

    /// Strictly parsed deadline
    pub fn deadline_at(&self) -> Result<NaiveDateTime> {
        time::parse_deadline(&self.deadline)
    }

    /// Strictly parsed scheduled reminder, if one was set
    pub fn scheduled_at(&self) -> Option<Result<NaiveDateTime>> {
        self.scheduled_reminder
            .as_deref()
            .map(time::parse_send_time)
    }
}

/// Explicit set of updatable task fields. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub recurring: Option<bool>,
    pub deadline: Option<String>,
}

impl TaskPatch {
    /// Whether applying this patch should trigger a reschedule
    pub fn touches_deadline(&self) -> bool {
        self.deadline.is_some()
    }

    /// Merge into a copy of `task`
    pub fn apply(&self, task: &TaskSnapshot) -> TaskSnapshot {
        TaskSnapshot {
            user: task.user.clone(),
            title: self.title.clone().unwrap_or_else(|| task.title.clone()),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| task.description.clone()),
            category: self.category.unwrap_or(task.category),
            priority: self.priority.unwrap_or(task.priority),
            recurring: self.recurring.unwrap_or(task.recurring),
            deadline: self.deadline.clone().unwrap_or_else(|| task.deadline.clone()),
            scheduled_reminder: task.scheduled_reminder.clone(),
        }
    }
}

/// Estimator output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub pred_priority: Priority,
    pub prob_complete_on_time: f64,
}

/// Per-(user, hour) success/trial counters. `successes <= trials` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourStat {
    pub successes: u32,
    pub trials: u32,
}

impl HourStat {
    pub fn new(successes: u32, trials: u32) -> Self {
        Self { successes, trials }
    }

    /// One more trial, and one more success iff `success`
    pub fn record(self, success: bool) -> Self {
        Self {
            successes: self.successes + u32::from(success),
            trials: self.trials + 1,
        }
    }

    /// `(successes + a) / (trials + b)`
    pub fn smoothed_ratio(&self, add_successes: f64, add_trials: f64) -> f64 {
        (self.successes as f64 + add_successes) / (self.trials as f64 + add_trials)
    }
}

/// Task lifecycle events written to the interaction log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionEvent {
    Created,
    Deleted,
    Completed,
}

impl InteractionEvent {
    /// Get the string representation for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionEvent::Created => "created",
            InteractionEvent::Deleted => "deleted",
            InteractionEvent::Completed => "completed",
        }
    }
}

/// Immutable audit-trail entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionEntry {
    pub user: String,
    pub task_title: String,
    pub event_type: InteractionEvent,
    pub event_time: NaiveDateTime,
    /// Free-form JSON object
    pub metadata: serde_json::Value,
}
