//! # Feature: Text Interpretation
//!
//! Turns free task text into a candidate deadline, a category and a priority hint using
//! regex date parsing plus keyword heuristics. Keyword sets come from `SchedulerConfig`.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Keyword sets injected through SchedulerConfig
//! - 1.0.0: Initial release with deadline, category and urgency inference

pub mod deadline;
pub mod keywords;

pub use deadline::{DeadlineParser, ParseFailure};

use anyhow::Result;
use chrono::NaiveDateTime;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::core::time::deadline_opt;
use crate::core::{Category, KeywordConfig, Priority, SchedulerConfig};

/// Structured attributes inferred from free text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedIntent {
    #[serde(with = "deadline_opt")]
    pub detected_deadline: Option<NaiveDateTime>,
    pub inferred_category: Category,
    pub priority_hint: Priority,
}

pub struct TextInterpreter {
    keywords: KeywordConfig,
    deadlines: DeadlineParser,
}

impl TextInterpreter {
    pub fn new(config: &SchedulerConfig) -> Result<Self> {
        Ok(Self {
            keywords: keywords::normalize(config.keywords.clone()),
            deadlines: DeadlineParser::new(config.interpreter)?,
        })
    }

    pub fn interpret(&self, text: &str, now: NaiveDateTime) -> ParsedIntent {
        let intent = ParsedIntent {
            detected_deadline: self.detect_deadline(text, now),
            inferred_category: self.infer_category(text),
            priority_hint: self.priority_hint(text),
        };
        debug!(
            "Interpreted {:?}: deadline={:?} category={} priority={}",
            text,
            intent.detected_deadline,
            intent.inferred_category.as_str(),
            intent.priority_hint.as_str()
        );
        intent
    }

    pub fn detect_deadline(&self, text: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
        self.deadlines.detect(text, now)
    }

    pub fn infer_category(&self, text: &str) -> Category {
        keywords::infer_category(text, &self.keywords.categories)
    }

    pub fn priority_hint(&self, text: &str) -> Priority {
        keywords::infer_priority(text, &self.keywords.urgency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CategoryKeywords;
    use chrono::{Duration, NaiveDate};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 14)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_interpret_bill_reminder() {
        let interpreter = TextInterpreter::new(&SchedulerConfig::default()).unwrap();
        let intent = interpreter.interpret("urgent: pay the bill by tomorrow", now());

        assert_eq!(intent.inferred_category, Category::Finance);
        assert_eq!(intent.priority_hint, Priority::High);
        assert_eq!(
            intent.detected_deadline,
            NaiveDate::from_ymd_opt(2026, 10, 15).unwrap().and_hms_opt(9, 0, 0)
        );
    }

    #[test]
    fn test_interpret_relative_offset() {
        let interpreter = TextInterpreter::new(&SchedulerConfig::default()).unwrap();
        let intent = interpreter.interpret("in 3 hours", now());
        assert_eq!(intent.detected_deadline, Some(now() + Duration::hours(3)));
        assert_eq!(intent.inferred_category, Category::Other);
        assert_eq!(intent.priority_hint, Priority::Low);
    }

    #[test]
    fn test_serialized_intent_uses_boundary_format() {
        let interpreter = TextInterpreter::new(&SchedulerConfig::default()).unwrap();
        let json = serde_json::to_value(interpreter.interpret("gym session today", now())).unwrap();

        assert_eq!(json["detected_deadline"], "14-10-2026 18:00");
        assert_eq!(json["inferred_category"], "health");
        assert_eq!(json["priority_hint"], "High");

        let json = serde_json::to_value(interpreter.interpret("water plants", now())).unwrap();
        assert!(json["detected_deadline"].is_null());
    }

    #[test]
    fn test_substituted_keyword_sets() {
        let mut config = SchedulerConfig::default();
        config.keywords.urgency.high = vec!["Pronto".to_string()];
        config.keywords.categories = vec![CategoryKeywords {
            category: Category::Work,
            keywords: vec!["Sprint".to_string()],
        }];
        let interpreter = TextInterpreter::new(&config).unwrap();

        let intent = interpreter.interpret("sprint review pronto", now());
        assert_eq!(intent.inferred_category, Category::Work);
        assert_eq!(intent.priority_hint, Priority::High);

        // Default keywords no longer apply
        let intent = interpreter.interpret("urgent bill", now());
        assert_eq!(intent.inferred_category, Category::Other);
        assert_eq!(intent.priority_hint, Priority::Low);
    }
}
