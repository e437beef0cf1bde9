//! HTTP routes for the ask pipeline.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use prashna::{CacheClient, CounterMetrics, PipelineError, QueryPipeline};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<QueryPipeline>,
    pub cache: CacheClient,
    pub metrics: Arc<CounterMetrics>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/api/ask", post(ask))
        .route("/api/cache/invalidate", get(invalidate_cache))
        .route("/api/metrics", get(metrics))
        .with_state(state)
}

async fn health() -> &'static str {
    "prashna API is running"
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AskRequest {
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    project_id: Option<String>,
}

/// Answer one question. A missing, empty or non-string question is a client
/// error; anything unexpected inside the pipeline is a generic 500 whose
/// details stay in the server log.
async fn ask(
    State(state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(request)) = payload else {
        return invalid_question();
    };
    let Some(question) = request.question else {
        return invalid_question();
    };
    let project_id = request.project_id.unwrap_or_default();

    match state.pipeline.ask(&question, &project_id).await {
        Ok(response) => Json(response).into_response(),
        Err(PipelineError::InvalidQuestion) => invalid_question(),
        Err(PipelineError::Internal(err)) => {
            tracing::error!(error = %err, "ask request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"detail": "Internal Server Error"})),
            )
                .into_response()
        }
    }
}

fn invalid_question() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"detail": "Invalid question"})),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
struct InvalidateParams {
    key: Option<String>,
}

/// Delete exactly one cache key; no wildcard or prefix invalidation.
async fn invalidate_cache(
    State(state): State<AppState>,
    Query(params): Query<InvalidateParams>,
) -> Response {
    let Some(key) = params.key else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Missing `key` parameter"})),
        )
            .into_response();
    };

    match state.cache.delete(&key).await {
        Ok(()) => Json(json!({
            "message": format!("Cache entry \"{key}\" invalidated.")
        }))
        .into_response(),
        Err(err) => {
            tracing::error!(key = %key, error = %err, "cache invalidation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to invalidate cache"})),
            )
                .into_response()
        }
    }
}

async fn metrics(State(state): State<AppState>) -> Json<HashMap<String, u64>> {
    Json(state.metrics.snapshot())
}
