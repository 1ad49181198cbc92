//! Configuration for the extraction model.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for LLM-backed structured extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Model endpoint base URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// Sampling temperature. Low values keep extraction consistent.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Maximum characters of document text included in the prompt.
    #[serde(default = "default_max_input")]
    pub max_input_chars: usize,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: f64,
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "llama3.1:8b".to_string()
}

fn default_temperature() -> f64 {
    0.1
}

fn default_max_input() -> usize {
    8000
}

fn default_timeout() -> f64 {
    120.0
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            temperature: default_temperature(),
            max_input_chars: default_max_input(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl ExtractionConfig {
    /// Creates a new extraction configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the model identifier.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the prompt input cap.
    #[must_use]
    pub fn with_max_input_chars(mut self, max: usize) -> Self {
        self.max_input_chars = max;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Gets timeout as Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExtractionConfig::default();
        assert_eq!(config.model, "llama3.1:8b");
        assert_eq!(config.max_input_chars, 8000);
        assert!((config.temperature - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_builder() {
        let config = ExtractionConfig::new()
            .with_endpoint("http://models.internal:11434")
            .with_model("qwen2.5:14b")
            .with_max_input_chars(4000);

        assert_eq!(config.endpoint, "http://models.internal:11434");
        assert_eq!(config.model, "qwen2.5:14b");
        assert_eq!(config.max_input_chars, 4000);
    }
}
