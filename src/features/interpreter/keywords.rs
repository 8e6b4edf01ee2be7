//! Keyword scoring for category and priority-hint inference.
//!
//! Matching is plain case-insensitive substring search, so `"bill"` also hits `"billing"`.

use crate::core::{Category, CategoryKeywords, KeywordConfig, Priority, UrgencyKeywords};

/// Lower-case and trim every keyword so matching against lower-cased text is exact
pub fn normalize(mut keywords: KeywordConfig) -> KeywordConfig {
    let lower = |list: &mut Vec<String>| {
        for word in list.iter_mut() {
            *word = word.trim().to_lowercase();
        }
    };
    lower(&mut keywords.urgency.high);
    lower(&mut keywords.urgency.medium);
    lower(&mut keywords.urgency.low);
    for entry in keywords.categories.iter_mut() {
        lower(&mut entry.keywords);
    }
    keywords
}

/// Pick the category with the strictly highest number of keyword hits.
///
/// A tie for the top score, or no hits at all, yields `Category::Other`.
pub fn infer_category(text: &str, categories: &[CategoryKeywords]) -> Category {
    let lowered = text.to_lowercase();
    if lowered.trim().is_empty() {
        return Category::Other;
    }

    let mut best = Category::Other;
    let mut best_hits = 0;
    let mut tied = false;

    for entry in categories {
        let hits = entry
            .keywords
            .iter()
            .filter(|keyword| lowered.contains(keyword.as_str()))
            .count();

        if hits > best_hits {
            best = entry.category;
            best_hits = hits;
            tied = false;
        } else if hits > 0 && hits == best_hits {
            tied = true;
        }
    }

    if tied {
        Category::Other
    } else {
        best
    }
}

/// High keywords win over Medium ones; anything else is Low.
///
/// Only the empty string is Medium; whitespace-only text has no hits and is Low.
pub fn infer_priority(text: &str, urgency: &UrgencyKeywords) -> Priority {
    if text.is_empty() {
        return Priority::Medium;
    }
    let lowered = text.to_lowercase();

    if urgency.high.iter().any(|w| lowered.contains(w.as_str())) {
        return Priority::High;
    }
    if urgency.medium.iter().any(|w| lowered.contains(w.as_str())) {
        return Priority::Medium;
    }
    Priority::Low
}
