//! Request orchestration: the end-to-end ask pipeline.

use std::sync::Arc;

use serde::Serialize;

use crate::cache::CacheClient;
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::llm::{CompletionModel, ModelGateway};
use crate::query::{
    classify, combine_answers, extract_keywords, is_complex, sanitize, score_complexity,
    Decomposer, IntervalGate, QueryType, Rewriter, SubQuestionAnswerer,
};

/// Response body for one answered question.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskResponse {
    pub project_id: String,
    pub sanitized_question: String,
    pub query_type: QueryType,
    pub keywords: Vec<String>,
    pub complexity_score: u32,
    pub is_complex: bool,
    pub sub_questions: Vec<String>,
    pub rewritten_question: String,
    pub combined_answer: String,
}

/// Owns the stage objects and runs them in strict sequence for each
/// request. All collaborators are injected at construction; nothing global.
pub struct QueryPipeline {
    config: PipelineConfig,
    decomposer: Decomposer,
    rewriter: Rewriter,
    answerer: SubQuestionAnswerer,
}

impl QueryPipeline {
    pub fn new(
        config: PipelineConfig,
        model: Arc<dyn CompletionModel>,
        cache: CacheClient,
    ) -> Self {
        let rewrite_gateway = ModelGateway::new(model.clone(), config.rewrite_retry_policy());
        let answer_gateway = ModelGateway::new(model, config.answer_retry_policy());

        Self {
            decomposer: Decomposer::new(
                rewrite_gateway.clone(),
                cache.clone(),
                config.decomposition_fallback,
            ),
            rewriter: Rewriter::new(rewrite_gateway, cache.clone()),
            answerer: SubQuestionAnswerer::new(answer_gateway, cache),
            config,
        }
    }

    /// Process one question end to end.
    ///
    /// Decomposition runs before the rewrite when the query is complex: the
    /// guided rewrite depends on the sub-question list. The answer loop is
    /// strictly sequential behind a fixed-interval gate.
    pub async fn ask(
        &self,
        question: &str,
        project_id: &str,
    ) -> Result<AskResponse, PipelineError> {
        if question.is_empty() {
            return Err(PipelineError::InvalidQuestion);
        }

        let sanitized = sanitize(question);
        let query_type = classify(&sanitized);
        let keywords = extract_keywords(&sanitized);

        let complexity_score = score_complexity(&sanitized);
        let complex = is_complex(&sanitized, self.config.complexity_threshold);

        let sub_questions = if complex {
            self.decomposer.decompose(&sanitized).await
        } else {
            Vec::new()
        };

        if complex && sub_questions.is_empty() {
            tracing::warn!("expected sub-questions for a complex query but got none");
        }

        let rewritten = self
            .rewriter
            .rewrite(&sanitized, query_type, &sub_questions)
            .await;

        let gate = IntervalGate::new(self.config.answer_interval());
        let mut answers = Vec::with_capacity(sub_questions.len());
        for sub_question in &sub_questions {
            gate.wait().await;
            answers.push(self.answerer.answer(sub_question).await);
        }
        let combined_answer = combine_answers(&sub_questions, &answers);

        Ok(AskResponse {
            project_id: project_id.to_string(),
            sanitized_question: sanitized,
            query_type,
            keywords,
            complexity_score,
            is_complex: complex,
            sub_questions,
            rewritten_question: rewritten,
            combined_answer,
        })
    }
}
