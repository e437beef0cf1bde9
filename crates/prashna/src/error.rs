use thiserror::Error;

/// Errors surfaced by the pipeline to its caller.
///
/// Stage-level failures never reach this type: a failed decomposition yields
/// zero sub-questions, a failed rewrite yields the original text and a failed
/// answer yields a sentinel marker. Only request validation and genuinely
/// unexpected failures abort a request.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The request carried a missing or empty question.
    #[error("Invalid question")]
    InvalidQuestion,

    /// Unexpected failure during orchestration. Details go to the server
    /// log, never to the response body.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
