//! Question decomposition via the model gateway, cache-first.

use std::sync::LazyLock;

use crate::cache::CacheClient;
use crate::config::DecompositionFallback;
use crate::llm::ModelGateway;

static NUMBERING_RE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^[-*0-9.]+\s*").expect("numbering regex is valid"));

static DELIMITER_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"(?i)\band\b|\bor\b|;|\?|&").expect("delimiter regex is valid")
});

/// Splits a complex question into atomic, independently answerable
/// sub-questions.
pub struct Decomposer {
    gateway: ModelGateway,
    cache: CacheClient,
    fallback: DecompositionFallback,
}

impl Decomposer {
    pub fn new(gateway: ModelGateway, cache: CacheClient, fallback: DecompositionFallback) -> Self {
        Self {
            gateway,
            cache,
            fallback,
        }
    }

    /// Break a sanitized question into sub-questions, in answering order.
    ///
    /// When the model is unavailable the result follows the configured
    /// fallback policy; with the default `Empty` policy callers must
    /// tolerate zero sub-questions.
    pub async fn decompose(&self, sanitized: &str) -> Vec<String> {
        let cache_key = format!("decomp:{sanitized}");
        if let Some(cached) = self.cache.get_json::<Vec<String>>(&cache_key).await {
            return cached;
        }

        let prompt = decomposition_prompt(sanitized);
        let Some(text) = self.gateway.complete(&prompt).await else {
            tracing::warn!("decomposition unavailable, applying fallback policy");
            return self.fallback_split(sanitized);
        };

        let sub_questions = parse_sub_questions(&text);
        self.cache.set_json(&cache_key, &sub_questions).await;
        sub_questions
    }

    fn fallback_split(&self, sanitized: &str) -> Vec<String> {
        match self.fallback {
            DecompositionFallback::Empty => Vec::new(),
            DecompositionFallback::DelimiterSplit => delimiter_split(sanitized),
        }
    }
}

fn decomposition_prompt(question: &str) -> String {
    format!(
        "You are an assistant that helps break down complex questions.\n\
         \n\
         Task:\n\
         Break down the following question into 3-8 simple, factual, non-overlapping \
         sub-questions. Do not include explanations. Each sub-question must be on its own line.\n\
         \n\
         Input:\n\
         \"{question}\"\n\
         \n\
         Output (one sub-question per line, no numbering or bullets):"
    )
}

/// One sub-question per line; leading bullet or numbering tokens stripped,
/// empty lines dropped.
fn parse_sub_questions(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| NUMBERING_RE.replace(line.trim(), "").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Deterministic split on question delimiters, for the opt-in fallback.
fn delimiter_split(question: &str) -> Vec<String> {
    DELIMITER_RE
        .split(question)
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}
