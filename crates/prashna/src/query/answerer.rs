//! Per-sub-question answering and combined-answer assembly.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::cache::CacheClient;
use crate::llm::ModelGateway;

/// Placeholder returned when no real answer could be produced. Never
/// cached, so a later request can retry the model.
pub const NO_ANSWER_SENTINEL: &str = "no answer generated";

/// Answers one atomic sub-question at a time, cache-first.
pub struct SubQuestionAnswerer {
    gateway: ModelGateway,
    cache: CacheClient,
}

impl SubQuestionAnswerer {
    pub fn new(gateway: ModelGateway, cache: CacheClient) -> Self {
        Self { gateway, cache }
    }

    /// Answer a single sub-question with one concise paragraph, or the
    /// sentinel when the model is unavailable.
    pub async fn answer(&self, sub_question: &str) -> String {
        let cache_key = format!("subq:{sub_question}");
        if let Some(cached) = self.cache.get(&cache_key).await {
            return cached;
        }

        let prompt = format!(
            "Answer the following question clearly and concisely (1 paragraph max):\n\n\"{sub_question}\""
        );
        match self.gateway.complete(&prompt).await {
            Some(answer) => {
                self.cache.set(&cache_key, &answer).await;
                answer
            }
            None => {
                tracing::warn!(sub_question, "no answer generated");
                NO_ANSWER_SENTINEL.to_string()
            }
        }
    }
}

/// Fixed-interval gate: consecutive `wait` calls are spaced at least
/// `period` apart. Serializes a loop of model calls so a burst of
/// sub-questions cannot trip the service's request-rate ceiling.
pub struct IntervalGate {
    period: Duration,
    last: Mutex<Option<Instant>>,
}

impl IntervalGate {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            last: Mutex::new(None),
        }
    }

    /// Sleep until at least `period` has passed since the previous call.
    /// The first call returns immediately.
    pub async fn wait(&self) {
        let mut last = self.last.lock().await;
        if let Some(prev) = *last {
            let ready_at = prev + self.period;
            let now = Instant::now();
            if ready_at > now {
                tokio::time::sleep(ready_at - now).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// Render `(sub-question, answer)` pairs as labeled blocks separated by
/// blank lines, in original order. Empty when there are no pairs.
pub fn combine_answers(sub_questions: &[String], answers: &[String]) -> String {
    sub_questions
        .iter()
        .zip(answers.iter())
        .enumerate()
        .map(|(i, (question, answer))| {
            if answer == NO_ANSWER_SENTINEL {
                format!("**Q{}:** {}\n**A:** *(No answer generated)*", i + 1, question)
            } else {
                format!("**Q{}:** {}\n**A:** {}", i + 1, question, answer)
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
