//! Test doubles shared across module tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::cache::{CacheClient, MemoryStore};
use crate::llm::{CompletionModel, ModelError};
use crate::metrics::CounterMetrics;

/// Scripted completion model: pops one scripted outcome per call and
/// records every prompt it sees. Unscripted calls fail permanently, so a
/// bare `MockModel::new()` behaves like a hard-down model service.
pub struct MockModel {
    responses: Mutex<VecDeque<Result<String, ModelError>>>,
    prompts: Mutex<Vec<String>>,
}

impl MockModel {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn push_text(&self, text: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(text.to_string()));
    }

    pub fn push_error(&self, error: ModelError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Prompts seen so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionModel for MockModel {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(ModelError::Api {
                    status: 500,
                    message: "unscripted model call".to_string(),
                })
            })
    }
}

/// Cache client over a fresh in-memory store and counter set.
pub fn test_cache() -> (CacheClient, Arc<CounterMetrics>, Arc<MemoryStore>) {
    let metrics = Arc::new(CounterMetrics::new());
    let store = Arc::new(MemoryStore::new());
    let cache = CacheClient::new(store.clone(), metrics.clone());
    (cache, metrics, store)
}
