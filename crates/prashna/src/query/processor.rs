//! Query sanitization, classification and keyword extraction.
//!
//! All three operations are pure and total: they never fail and never touch
//! an external service.

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// Hard cap on sanitized query length, in characters.
pub const MAX_QUERY_CHARS: usize = 512;

static PROCEDURAL_START_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"(?i)^(?:how|what are the steps|what is the process)")
        .expect("procedural start regex is valid")
});

static PROCEDURAL_WORD_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"(?i)\b(?:steps|process|procedure|way to)\b")
        .expect("procedural word regex is valid")
});

static COMPARISON_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"(?i)\b(?:difference|vs|compare|contrast)\b")
        .expect("comparison regex is valid")
});

static CONCEPTUAL_START_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"(?i)^(?:why|explain|reason|what causes)")
        .expect("conceptual start regex is valid")
});

/// Coarse intent classes used to steer rewrite prompts and cache keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    Factual,
    Comparison,
    Procedural,
    Conceptual,
}

impl QueryType {
    /// Lowercase label, as used in prompts and cache keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::Factual => "factual",
            QueryType::Comparison => "comparison",
            QueryType::Procedural => "procedural",
            QueryType::Conceptual => "conceptual",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize raw input: trim, collapse whitespace runs to single spaces,
/// cap the length. Idempotent.
pub fn sanitize(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let capped: String = collapsed.chars().take(MAX_QUERY_CHARS).collect();
    capped.trim_end().to_string()
}

/// Assign a query type by pattern rules, first match wins.
pub fn classify(query: &str) -> QueryType {
    if PROCEDURAL_START_RE.is_match(query) || PROCEDURAL_WORD_RE.is_match(query) {
        QueryType::Procedural
    } else if COMPARISON_RE.is_match(query) {
        QueryType::Comparison
    } else if CONCEPTUAL_START_RE.is_match(query) {
        QueryType::Conceptual
    } else {
        QueryType::Factual
    }
}

/// Advisory keyword list: lowercased tokens with punctuation stripped,
/// deduplicated in first-seen order. Not consumed by later pipeline stages,
/// only exposed to callers.
pub fn extract_keywords(query: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    query
        .split_whitespace()
        .map(|token| {
            token
                .chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|token| !token.is_empty() && seen.insert(token.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_trims_and_collapses() {
        assert_eq!(sanitize("  what   is\t\nrust  "), "what is rust");
    }

    #[test]
    fn test_sanitize_caps_length() {
        let long = "word ".repeat(200);
        let sanitized = sanitize(&long);
        assert!(sanitized.chars().count() <= MAX_QUERY_CHARS);
        assert!(!sanitized.ends_with(' '));
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let inputs = ["  a   b  ", "plain", "", "   ", &"x".repeat(600)];
        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once);
        }
    }

    #[test]
    fn test_classify_procedural() {
        assert_eq!(classify("How do I bake bread"), QueryType::Procedural);
        assert_eq!(
            classify("what is the best way to learn rust"),
            QueryType::Procedural
        );
    }

    #[test]
    fn test_classify_comparison() {
        assert_eq!(
            classify("difference between tcp and udp"),
            QueryType::Comparison
        );
        assert_eq!(classify("rust vs go"), QueryType::Comparison);
    }

    #[test]
    fn test_classify_conceptual() {
        assert_eq!(classify("Why is the sky blue"), QueryType::Conceptual);
        assert_eq!(classify("explain recursion"), QueryType::Conceptual);
    }

    #[test]
    fn test_classify_defaults_to_factual() {
        assert_eq!(classify("capital of France"), QueryType::Factual);
    }

    #[test]
    fn test_classify_priority_order() {
        // "how" wins over "compare": procedural is checked first.
        assert_eq!(
            classify("how do I compare two files"),
            QueryType::Procedural
        );
    }

    #[test]
    fn test_classify_is_deterministic() {
        let query = "difference between a stack and a queue";
        assert_eq!(classify(query), classify(query));
    }

    #[test]
    fn test_extract_keywords_dedupes_and_strips() {
        let keywords = extract_keywords("What is Rust? rust, the language!");
        assert_eq!(keywords, vec!["what", "is", "rust", "the", "language"]);
    }

    #[test]
    fn test_extract_keywords_drops_pure_punctuation() {
        let keywords = extract_keywords("a - b");
        assert_eq!(keywords, vec!["a", "b"]);
    }
}
