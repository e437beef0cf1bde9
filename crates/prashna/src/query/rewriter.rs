//! Query rewriting via the model gateway.
//!
//! Total by construction: every failure path returns the original sanitized
//! text unchanged, so callers never need an error branch.

use crate::cache::CacheClient;
use crate::llm::ModelGateway;
use crate::query::QueryType;

/// Produces a clarified single-line rewrite of a sanitized question.
pub struct Rewriter {
    gateway: ModelGateway,
    cache: CacheClient,
}

impl Rewriter {
    pub fn new(gateway: ModelGateway, cache: CacheClient) -> Self {
        Self { gateway, cache }
    }

    /// Rewrite `sanitized`, guided by sub-questions when any exist.
    ///
    /// Decomposition must already have run for complex queries: guided mode
    /// depends on the sub-question list.
    pub async fn rewrite(
        &self,
        sanitized: &str,
        query_type: QueryType,
        sub_questions: &[String],
    ) -> String {
        if !sub_questions.is_empty() {
            self.rewrite_guided(sanitized, query_type, sub_questions)
                .await
        } else {
            self.rewrite_plain(sanitized, query_type).await
        }
    }

    async fn rewrite_guided(
        &self,
        original: &str,
        query_type: QueryType,
        sub_questions: &[String],
    ) -> String {
        let cache_key = format!("{query_type}:sub:{original}");
        if let Some(cached) = self.cache.get(&cache_key).await {
            return cached;
        }

        let prompt = guided_prompt(original, query_type, sub_questions);
        self.complete_and_clean(&cache_key, &prompt, original).await
    }

    async fn rewrite_plain(&self, original: &str, query_type: QueryType) -> String {
        let cache_key = format!("{query_type}:{original}");
        if let Some(cached) = self.cache.get(&cache_key).await {
            return cached;
        }

        let prompt = plain_prompt(original, query_type);
        self.complete_and_clean(&cache_key, &prompt, original).await
    }

    async fn complete_and_clean(&self, cache_key: &str, prompt: &str, original: &str) -> String {
        let Some(rewritten) = self.gateway.complete(prompt).await else {
            tracing::warn!("no rewritten content received, falling back to original");
            return original.to_string();
        };

        let clean = clean_rewrite(&rewritten);
        if clean.is_empty() {
            return original.to_string();
        }
        self.cache.set(cache_key, &clean).await;
        clean
    }
}

fn guided_prompt(original: &str, query_type: QueryType, sub_questions: &[String]) -> String {
    let listed = sub_questions
        .iter()
        .map(|q| format!("- {q}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a helpful assistant rewriting complex questions.\n\
         \n\
         Your task:\n\
         - Rewrite the following {query_type} question.\n\
         - Use the sub-questions as context.\n\
         - DO NOT answer the question.\n\
         - DO NOT repeat all sub-questions.\n\
         - DO NOT include extra explanations.\n\
         - ONLY return one rewritten question suitable for high school or undergraduate students.\n\
         \n\
         Original Question:\n\
         \"{original}\"\n\
         \n\
         Sub-Questions:\n\
         {listed}\n\
         \n\
         Rewritten Question:"
    )
}

/// Prompt tiers keyed to input length, so the rewrite length tracks the
/// original.
fn plain_prompt(original: &str, query_type: QueryType) -> String {
    let word_count = original.split_whitespace().count();
    if word_count < 10 {
        format!(
            "Rewrite this short {query_type} question for clarity, but keep it simple and short. \
             Do NOT answer or elaborate:\n\n\"{original}\""
        )
    } else if word_count < 20 {
        format!(
            "Rewrite this {query_type} question with improved structure and clarity. \
             Do NOT answer or explain:\n\n\"{original}\""
        )
    } else {
        format!(
            "Rewrite the following {query_type} question to make it clearer and easier to understand.\n\
             DO NOT answer the question.\n\
             DO NOT add explanations.\n\
             ONLY return a rewritten version of the question:\n\n\"{original}\""
        )
    }
}

/// Strip wrapping quotes, a leading "Rewritten Question:" label and anything
/// past the first line.
fn clean_rewrite(raw: &str) -> String {
    let mut text = raw.trim();
    text = text
        .strip_prefix('"')
        .or_else(|| text.strip_prefix('\u{201c}'))
        .unwrap_or(text);
    text = text
        .strip_suffix('"')
        .or_else(|| text.strip_suffix('\u{201d}'))
        .unwrap_or(text);
    let text = strip_label(text);
    text.lines().next().unwrap_or("").trim().to_string()
}

fn strip_label(text: &str) -> &str {
    const LABEL: &str = "rewritten question:";
    match text.get(..LABEL.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(LABEL) => text[LABEL.len()..].trim_start(),
        _ => text,
    }
}
