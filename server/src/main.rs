//! prashna HTTP server.
//!
//! Startup wires the dependency-injected clients together: the counter
//! metrics, the cache client over its backing store, the Gemini model and
//! the pipeline itself. A missing model credential aborts startup; it is a
//! configuration error, never a per-request one.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

use prashna::{CacheClient, CounterMetrics, GeminiModel, MemoryStore, PipelineConfig, QueryPipeline};

mod routes;

use routes::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = load_config()?;

    let metrics = Arc::new(CounterMetrics::new());
    let store = Arc::new(MemoryStore::new());
    let cache = CacheClient::new(store, metrics.clone()).with_default_ttl(config.cache_ttl());
    let model = Arc::new(GeminiModel::new(&config.model)?);
    let pipeline = Arc::new(QueryPipeline::new(config, model, cache.clone()));

    let state = AppState {
        pipeline,
        cache,
        metrics,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::router(state).layer(cors);

    let addr: SocketAddr = std::env::var("PRASHNA_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:7600".to_string())
        .parse()
        .context("invalid PRASHNA_ADDR")?;

    tracing::info!("🚀 prashna API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the pipeline config from `PRASHNA_CONFIG` (optional JSON file) and
/// the environment, then validate it. The model credential comes from
/// `GEMINI_API_KEY` unless the file already carries one.
fn load_config() -> Result<PipelineConfig> {
    let mut config = match std::env::var("PRASHNA_CONFIG") {
        Ok(path) => PipelineConfig::from_file(Path::new(&path)).map_err(|e| anyhow!(e))?,
        Err(_) => PipelineConfig::default(),
    };

    if config.model.api_key.is_empty() {
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            config.model.api_key = key;
        }
    }

    config.validate().map_err(|e| anyhow!(e))?;
    Ok(config)
}
