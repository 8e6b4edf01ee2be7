//! Priority label and on-time completion estimate for a task snapshot.

use chrono::NaiveDateTime;
use log::warn;

use crate::core::{
    EstimatorConfig, Prediction, Priority, SchedulerConfig, TaskSnapshot, UrgencyKeywords,
};
use crate::features::interpreter::keywords;

pub struct PriorityEstimator {
    urgency: UrgencyKeywords,
    config: EstimatorConfig,
}

impl PriorityEstimator {
    pub fn new(config: &SchedulerConfig) -> Self {
        Self {
            urgency: keywords::normalize(config.keywords.clone()).urgency,
            config: config.estimator,
        }
    }

    /// Hours from `now` until the task deadline, `None` when the deadline text is malformed
    fn hours_to_deadline(task: &TaskSnapshot, now: NaiveDateTime) -> Option<f64> {
        match task.deadline_at() {
            Ok(deadline) => Some((deadline - now).num_seconds() as f64 / 3600.0),
            Err(e) => {
                warn!("Estimating '{}' without a deadline: {e}", task.title);
                None
            }
        }
    }

    /// Keyword hint, overridden by deadline proximity
    pub fn estimate_priority(&self, task: &TaskSnapshot, now: NaiveDateTime) -> Priority {
        let text = format!("{} {}", task.description, task.title);
        let hint = keywords::infer_priority(text.trim(), &self.urgency);

        match Self::hours_to_deadline(task, now) {
            Some(hours) if hours < self.config.urgent_hours => Priority::High,
            Some(hours) if hours < self.config.soon_hours && hint == Priority::Low => {
                Priority::Medium
            }
            _ => hint,
        }
    }

    /// Probability of finishing on time, always within the configured bounds
    pub fn completion_probability(&self, task: &TaskSnapshot, now: NaiveDateTime) -> f64 {
        let hours =
            Self::hours_to_deadline(task, now).unwrap_or(self.config.unknown_deadline_hours);
        let word_count = task.description.split_whitespace().count();
        self.score(task.priority, hours, word_count)
    }

    fn score(&self, declared: Priority, hours: f64, word_count: usize) -> f64 {
        let cfg = &self.config;
        let base = if declared == Priority::High {
            cfg.high_priority_base_probability
        } else {
            cfg.base_probability
        };
        let lead_time =
            (hours / cfg.lead_time_scale_hours).clamp(-cfg.lead_time_cap, cfg.lead_time_cap);
        let verbosity = word_count as f64 / cfg.verbosity_words;

        (base + lead_time - verbosity).clamp(cfg.min_probability, cfg.max_probability)
    }

    pub fn predict(&self, task: &TaskSnapshot, now: NaiveDateTime) -> Prediction {
        Prediction {
            pred_priority: self.estimate_priority(task, now),
            prob_complete_on_time: self.completion_probability(task, now),
        }
    }
}
