use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::llm::RetryPolicy;

/// Behavior when the model cannot produce a decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DecompositionFallback {
    /// Return zero sub-questions; downstream stages take their
    /// no-sub-questions branch.
    #[default]
    Empty,
    /// Deterministic split on question delimiters (and/or/;/?/&).
    DelimiterSplit,
}

/// Connection settings for the generative-model service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Credential for the model service. Loaded from `GEMINI_API_KEY` by
    /// default; must be present before the pipeline starts.
    #[serde(skip_serializing)]
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("GEMINI_API_KEY").unwrap_or_default(),
            model: "gemini-1.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Score at or above which a query is decomposed.
    pub complexity_threshold: u32,
    /// Cache entry lifetime in seconds.
    pub cache_ttl_secs: u64,
    pub decomposition_fallback: DecompositionFallback,
    /// Retry budget and backoff step for the decompose/rewrite path.
    pub rewrite_retries: u32,
    pub rewrite_backoff_ms: u64,
    /// Retry budget and backoff step for the answer path.
    pub answer_retries: u32,
    pub answer_backoff_ms: u64,
    /// Minimum spacing between consecutive sub-question answer calls.
    pub answer_interval_ms: u64,
    pub model: ModelConfig,
}

impl PipelineConfig {
    /// Validate config values, returning errors for clearly broken
    /// configurations.
    pub fn validate(&self) -> Result<(), String> {
        if self.complexity_threshold == 0 {
            return Err("complexity_threshold must be > 0".into());
        }
        if self.rewrite_retries == 0 {
            return Err("rewrite_retries must be > 0".into());
        }
        if self.answer_retries == 0 {
            return Err("answer_retries must be > 0".into());
        }
        if self.model.model.is_empty() {
            return Err("model.model must be set".into());
        }
        if self.model.endpoint.is_empty() {
            return Err("model.endpoint must be set".into());
        }
        if self.model.api_key.is_empty() {
            return Err("model.api_key must be set (GEMINI_API_KEY)".into());
        }
        Ok(())
    }

    /// Load config from a JSON file, falling back to defaults for missing
    /// fields.
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        let config: Self =
            serde_json::from_str(&content).map_err(|e| format!("Failed to parse config: {}", e))?;
        Ok(config)
    }

    pub fn rewrite_retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.rewrite_retries,
            Duration::from_millis(self.rewrite_backoff_ms),
        )
    }

    pub fn answer_retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.answer_retries,
            Duration::from_millis(self.answer_backoff_ms),
        )
    }

    pub fn answer_interval(&self) -> Duration {
        Duration::from_millis(self.answer_interval_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            complexity_threshold: 15,
            cache_ttl_secs: 3600,
            decomposition_fallback: DecompositionFallback::Empty,
            rewrite_retries: 3,
            rewrite_backoff_ms: 500,
            answer_retries: 3,
            answer_backoff_ms: 2000,
            answer_interval_ms: 300,
            model: ModelConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key() -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.model.api_key = "test-key".to_string();
        config
    }

    #[test]
    fn test_default_config_is_valid_with_key() {
        assert!(config_with_key().validate().is_ok());
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let mut config = config_with_key();
        config.model.api_key.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_retries_are_rejected() {
        let mut config = config_with_key();
        config.rewrite_retries = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_retry_policies_reflect_config() {
        let config = config_with_key();
        assert_eq!(config.rewrite_retry_policy().max_attempts, 3);
        assert_eq!(
            config.rewrite_retry_policy().backoff_unit,
            Duration::from_millis(500)
        );
        assert_eq!(
            config.answer_retry_policy().backoff_unit,
            Duration::from_millis(2000)
        );
    }
}
