//! prashna - query decomposition, rewriting and answer-synthesis pipeline.
//!
//! A raw question is sanitized, classified and scored for structural
//! complexity. Complex questions are decomposed into atomic sub-questions by
//! a generative model, the original question is rewritten with those
//! sub-questions as context, and each sub-question is answered in sequence
//! behind a rate-limit gate. Every model call is cached and retried with
//! backoff; every failure degrades to a stage-local fallback instead of
//! aborting the request.

pub mod cache;
pub mod config;
pub mod error;
pub mod llm;
pub mod metrics;
pub mod pipeline;
pub mod query;

// Re-export primary types for convenience
pub use cache::{CacheClient, CacheStore, MemoryStore};
pub use config::{DecompositionFallback, ModelConfig, PipelineConfig};
pub use error::PipelineError;
pub use llm::{CompletionModel, GeminiModel, ModelError, ModelGateway, RetryPolicy};
pub use metrics::{CounterMetrics, MetricsSink};
pub use pipeline::{AskResponse, QueryPipeline};
pub use query::{
    classify, combine_answers, extract_keywords, is_complex, sanitize, score_complexity,
    QueryType, NO_ANSWER_SENTINEL,
};

#[cfg(test)]
pub(crate) mod testing;
