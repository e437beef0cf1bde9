//! Model gateway - retrying access to a black-box text-completion service.

pub mod gemini;

pub use gemini::GeminiModel;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Failure modes of one completion call.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Rate-limit or temporary unavailability; worth retrying.
    #[error("model service transient failure (status {0})")]
    Transient(u16),

    /// Definitive service-side rejection.
    #[error("model service error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure.
    #[error("model request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with no usable text.
    #[error("model returned empty completion")]
    Empty,
}

impl ModelError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ModelError::Transient(_))
    }
}

/// A text-completion service: prompt in, text out.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError>;
}

/// Retry budget and backoff step for one call site.
///
/// The backoff unit is per-call-site configuration, not a global constant:
/// the decompose/rewrite path waits in 500 ms steps while the answer path
/// waits in 2 s steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_unit: Duration,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, backoff_unit: Duration) -> Self {
        Self {
            max_attempts,
            backoff_unit,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_unit: Duration::from_millis(500),
        }
    }
}

/// Wraps a completion model with retry-with-backoff.
///
/// Exhaustion and permanent failures both resolve to `None`; callers fall
/// back to their degraded branch rather than propagate an error to the
/// end user.
#[derive(Clone)]
pub struct ModelGateway {
    model: Arc<dyn CompletionModel>,
    policy: RetryPolicy,
}

impl ModelGateway {
    pub fn new(model: Arc<dyn CompletionModel>, policy: RetryPolicy) -> Self {
        Self { model, policy }
    }

    /// Attempt a completion, waiting `attempt x backoff_unit` after each
    /// transient failure. Returns `None` once the budget is spent or a
    /// permanent failure is seen.
    pub async fn complete(&self, prompt: &str) -> Option<String> {
        for attempt in 1..=self.policy.max_attempts {
            match self.model.complete(prompt).await {
                Ok(text) => {
                    let text = text.trim().to_string();
                    if text.is_empty() {
                        tracing::warn!("model returned empty completion");
                        return None;
                    }
                    return Some(text);
                }
                Err(err) if err.is_transient() && attempt < self.policy.max_attempts => {
                    let wait = self.policy.backoff_unit * attempt;
                    tracing::warn!(
                        attempt,
                        wait_ms = wait.as_millis() as u64,
                        "transient model failure, retrying"
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(err) => {
                    tracing::error!(error = %err, "model call failed");
                    return None;
                }
            }
        }
        None
    }
}
