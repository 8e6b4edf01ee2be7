//! # Configuration
//!
//! Process configuration from the environment plus the immutable tuning/keyword configuration
//! handed to the interpreter, estimator and scheduler at construction time.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: YAML overrides for keyword sets and scheduler constants
//! - 1.0.0: Environment-based Config

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

use super::types::Category;

/// Upper bound for the send-time margin and nudge (one week)
pub const MAX_ADJUST_MINUTES: i64 = 7 * 24 * 60;

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Process-level configuration (call `dotenvy::dotenv()` first)
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the SQLite file holding hour statistics and the interaction log
    pub database_path: String,
    pub log_level: String,
    /// Optional YAML file with a `SchedulerConfig`
    pub scheduler_config_path: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            database_path: env_or("REMINDER_DATABASE_PATH", "reminders.db"),
            log_level: env_or("LOG_LEVEL", "info"),
            scheduler_config_path: env_opt("REMINDER_CONFIG"),
        })
    }

    /// Load the scheduler configuration, falling back to built-in defaults
    pub fn scheduler_config(&self) -> Result<SchedulerConfig> {
        match &self.scheduler_config_path {
            Some(path) => SchedulerConfig::load(path),
            None => Ok(SchedulerConfig::default()),
        }
    }
}

/// Keyword tiers for the priority hint. Checked High first, then Medium.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrgencyKeywords {
    pub high: Vec<String>,
    pub medium: Vec<String>,
    /// Informational only: anything without a High/Medium hit is Low
    pub low: Vec<String>,
}

impl Default for UrgencyKeywords {
    fn default() -> Self {
        Self {
            high: words(&["urgent", "asap", "immediately", "critical", "important", "today", "now"]),
            medium: words(&["soon", "tomorrow", "before", "by", "priority"]),
            low: words(&["whenever", "later", "someday", "nice to have"]),
        }
    }
}

/// Keyword list for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryKeywords {
    pub category: Category,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordConfig {
    pub urgency: UrgencyKeywords,
    /// Scored in order; order only matters for logging since ties resolve to `other`
    pub categories: Vec<CategoryKeywords>,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        let category = |category, kws: &[&str]| CategoryKeywords {
            category,
            keywords: words(kws),
        };
        Self {
            urgency: UrgencyKeywords::default(),
            categories: vec![
                category(
                    Category::Work,
                    &["project", "client", "meeting", "report", "office", "deadline"],
                ),
                category(Category::Health, &["doctor", "medicine", "exercise", "gym", "yoga"]),
                category(Category::Finance, &["bill", "invoice", "payment", "bank", "tax"]),
                category(Category::Personal, &["birthday", "call", "family", "shopping"]),
            ],
        }
    }
}

/// Prior given to a fresh hour slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorConfig {
    pub successes: u32,
    pub trials: u32,
}

impl Default for PriorConfig {
    fn default() -> Self {
        Self {
            successes: 1,
            trials: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Added to successes when scoring a slot
    pub smoothing_successes: f64,
    /// Added to trials when scoring a slot
    pub smoothing_trials: f64,
    /// Hour used when a user has no slots at all
    pub fallback_hour: u32,
    /// How far before the deadline a too-late candidate is moved
    pub deadline_margin_minutes: i64,
    /// How far past `now` a stale candidate is pushed
    pub past_nudge_minutes: i64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            smoothing_successes: 1.0,
            smoothing_trials: 2.0,
            fallback_hour: 9,
            deadline_margin_minutes: 120,
            past_nudge_minutes: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterConfig {
    /// Hour assigned to a bare "tomorrow"
    pub tomorrow_hour: u32,
    /// Hour assigned to a bare "today"
    pub today_hour: u32,
    /// Hour assigned to a parsed date without a time of day
    pub default_hour: u32,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            tomorrow_hour: 9,
            today_hour: 18,
            default_hour: 9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Under this many hours the label is forced to High
    pub urgent_hours: f64,
    /// Under this many hours a Low hint becomes Medium
    pub soon_hours: f64,
    pub base_probability: f64,
    /// Base used when the declared priority is High
    pub high_priority_base_probability: f64,
    pub lead_time_scale_hours: f64,
    pub lead_time_cap: f64,
    /// Description words per unit of verbosity penalty
    pub verbosity_words: f64,
    pub min_probability: f64,
    pub max_probability: f64,
    /// Assumed lead time when the deadline cannot be parsed
    pub unknown_deadline_hours: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            urgent_hours: 6.0,
            soon_hours: 24.0,
            base_probability: 0.6,
            high_priority_base_probability: 0.4,
            lead_time_scale_hours: 48.0,
            lead_time_cap: 0.3,
            verbosity_words: 200.0,
            min_probability: 0.05,
            max_probability: 0.95,
            unknown_deadline_hours: 12.0,
        }
    }
}

/// Immutable configuration for the scheduling core
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub keywords: KeywordConfig,
    pub prior: PriorConfig,
    pub selection: SelectionConfig,
    pub interpreter: InterpreterConfig,
    pub estimator: EstimatorConfig,
}

impl SchedulerConfig {
    /// Load scheduler configuration from a YAML file
    pub fn load(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scheduler config {path}"))?;
        Self::from_yaml_str(&contents).with_context(|| format!("Invalid scheduler config {path}"))
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let config: SchedulerConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.prior.successes < 1 || self.prior.successes > self.prior.trials {
            return Err(anyhow::anyhow!(
                "Prior must satisfy 1 <= successes <= trials (got {}/{})",
                self.prior.successes,
                self.prior.trials
            ));
        }

        let hours = [
            ("selection.fallback_hour", self.selection.fallback_hour),
            ("interpreter.tomorrow_hour", self.interpreter.tomorrow_hour),
            ("interpreter.today_hour", self.interpreter.today_hour),
            ("interpreter.default_hour", self.interpreter.default_hour),
        ];
        for (name, hour) in hours {
            if hour > 23 {
                return Err(anyhow::anyhow!("{name} must be 0-23 (got {hour})"));
            }
        }

        let sel = &self.selection;
        if !sel.smoothing_successes.is_finite()
            || !sel.smoothing_trials.is_finite()
            || sel.smoothing_successes < 0.0
            || sel.smoothing_trials <= 0.0
        {
            return Err(anyhow::anyhow!(
                "Smoothing must satisfy successes >= 0 and trials > 0 (got {}/{})",
                sel.smoothing_successes,
                sel.smoothing_trials
            ));
        }
        let adjustments = [
            ("selection.deadline_margin_minutes", sel.deadline_margin_minutes),
            ("selection.past_nudge_minutes", sel.past_nudge_minutes),
        ];
        for (name, minutes) in adjustments {
            if !(0..=MAX_ADJUST_MINUTES).contains(&minutes) {
                return Err(anyhow::anyhow!(
                    "{name} must be 0-{MAX_ADJUST_MINUTES} (got {minutes})"
                ));
            }
        }

        let est = &self.estimator;
        let constants = [
            ("urgent_hours", est.urgent_hours),
            ("soon_hours", est.soon_hours),
            ("base_probability", est.base_probability),
            ("high_priority_base_probability", est.high_priority_base_probability),
            ("lead_time_scale_hours", est.lead_time_scale_hours),
            ("lead_time_cap", est.lead_time_cap),
            ("verbosity_words", est.verbosity_words),
            ("min_probability", est.min_probability),
            ("max_probability", est.max_probability),
            ("unknown_deadline_hours", est.unknown_deadline_hours),
        ];
        for (name, value) in constants {
            if !value.is_finite() {
                return Err(anyhow::anyhow!("estimator.{name} must be finite (got {value})"));
            }
        }
        if est.lead_time_cap < 0.0 {
            return Err(anyhow::anyhow!(
                "estimator.lead_time_cap must not be negative (got {})",
                est.lead_time_cap
            ));
        }
        if !(0.0..=1.0).contains(&est.min_probability)
            || !(0.0..=1.0).contains(&est.max_probability)
            || est.min_probability > est.max_probability
        {
            return Err(anyhow::anyhow!(
                "Probability bounds must satisfy 0 <= min <= max <= 1 (got {}..{})",
                est.min_probability,
                est.max_probability
            ));
        }
        if est.lead_time_scale_hours <= 0.0 || est.verbosity_words <= 0.0 {
            return Err(anyhow::anyhow!(
                "estimator.lead_time_scale_hours and estimator.verbosity_words must be positive"
            ));
        }

        for entry in &self.keywords.categories {
            if entry.category == Category::Other {
                return Err(anyhow::anyhow!(
                    "'other' is the fallback category and cannot carry keywords"
                ));
            }
            if entry.keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(anyhow::anyhow!(
                    "Empty keyword in category '{}'",
                    entry.category.as_str()
                ));
            }
        }

        Ok(())
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = SchedulerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.prior.successes, 1);
        assert_eq!(config.prior.trials, 2);
        assert_eq!(config.selection.fallback_hour, 9);
        assert_eq!(config.keywords.categories.len(), 4);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
selection:
  fallback_hour: 7
keywords:
  urgency:
    high: ["now!"]
"#;
        let config = SchedulerConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.selection.fallback_hour, 7);
        assert_eq!(config.selection.deadline_margin_minutes, 120);
        assert_eq!(config.keywords.urgency.high, vec!["now!".to_string()]);
        // Medium tier falls back to its default list
        assert!(config.keywords.urgency.medium.contains(&"soon".to_string()));
        // Categories untouched
        assert_eq!(config.keywords.categories.len(), 4);
    }

    #[test]
    fn test_yaml_category_override() {
        let yaml = r#"
keywords:
  categories:
    - category: health
      keywords: ["dentist"]
"#;
        let config = SchedulerConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.keywords.categories.len(), 1);
        assert_eq!(config.keywords.categories[0].category, Category::Health);
    }

    #[test]
    fn test_invalid_prior_rejected() {
        let yaml = "prior:\n  successes: 3\n  trials: 2\n";
        assert!(SchedulerConfig::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_invalid_hour_rejected() {
        let yaml = "selection:\n  fallback_hour: 24\n";
        assert!(SchedulerConfig::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_other_category_rejected() {
        let yaml = r#"
keywords:
  categories:
    - category: other
      keywords: ["misc"]
"#;
        assert!(SchedulerConfig::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_negative_lead_time_cap_rejected() {
        assert!(SchedulerConfig::from_yaml_str("estimator:\n  lead_time_cap: -0.3\n").is_err());
        assert!(SchedulerConfig::from_yaml_str("estimator:\n  lead_time_cap: 0.0\n").is_ok());
    }

    #[test]
    fn test_non_finite_estimator_constant_rejected() {
        let mut config = SchedulerConfig::default();
        config.estimator.base_probability = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = SchedulerConfig::default();
        config.estimator.unknown_deadline_hours = f64::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_send_time_adjustments_bounded() {
        let huge = "selection:\n  past_nudge_minutes: 9223372036854775807\n";
        assert!(SchedulerConfig::from_yaml_str(huge).is_err());
        let negative = "selection:\n  deadline_margin_minutes: -30\n";
        assert!(SchedulerConfig::from_yaml_str(negative).is_err());
        let week = format!("selection:\n  deadline_margin_minutes: {MAX_ADJUST_MINUTES}\n");
        assert!(SchedulerConfig::from_yaml_str(&week).is_ok());
    }

    #[test]
    fn test_zero_smoothing_trials_rejected() {
        let mut config = SchedulerConfig::default();
        config.selection.smoothing_trials = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_probability_bounds_rejected() {
        let mut config = SchedulerConfig::default();
        config.estimator.min_probability = 0.9;
        config.estimator.max_probability = 0.1;
        assert!(config.validate().is_err());
    }
}
