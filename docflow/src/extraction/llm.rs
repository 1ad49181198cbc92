//! Extractor backed by an Ollama-style HTTP endpoint.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::config::ExtractionConfig;
use super::parse::parse_record;
use super::protocols::StructuredExtractor;
use crate::errors::{ConfigurationError, ExtractionError};
use crate::state::ToolRecord;
use crate::utils::truncate_chars;

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// A [`StructuredExtractor`] that prompts a local text model for a JSON
/// record and validates the answer.
#[derive(Debug, Clone)]
pub struct LlmExtractor {
    client: reqwest::Client,
    config: ExtractionConfig,
}

impl LlmExtractor {
    /// Creates a new extractor.
    pub fn new(config: ExtractionConfig) -> Result<Self, ConfigurationError> {
        if config.endpoint.is_empty() {
            return Err(ConfigurationError::new("extraction endpoint must not be empty"));
        }
        if config.model.is_empty() {
            return Err(ConfigurationError::new("extraction model must not be empty"));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ConfigurationError::new(format!("extraction HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Builds the extraction prompt for a tool and its document text.
    ///
    /// The document text is truncated to the configured prefix before it
    /// reaches the model.
    #[must_use]
    pub fn prompt_for(&self, tool: &str, text: &str) -> String {
        let excerpt = truncate_chars(text, self.config.max_input_chars);
        format!(
            "You are an expert at extracting installation and update instructions \
             from technical documentation.\n\
             Given the following documentation content for {tool}, extract structured \
             information about both installation AND update instructions.\n\
             Documentation content:\n{excerpt}\n\n\
             Please analyze the content and extract:\n\
             1. Step-by-step INSTALLATION instructions (as a list)\n\
             2. Step-by-step UPDATE instructions (as a list) - if not available, \
             provide reasonable update steps\n\
             3. Version information (if mentioned)\n\
             4. System requirements (as a list)\n\
             5. Important notes or warnings\n\n\
             Respond ONLY with a valid JSON object in this exact format:\n\
             {{\n\
                 \"install_steps\": [\"install step 1\", \"install step 2\"],\n\
                 \"update_steps\": [\"update step 1\", \"update step 2\"],\n\
                 \"version\": \"version number or 'unknown'\",\n\
                 \"requirements\": [\"requirement 1\", \"requirement 2\"],\n\
                 \"notes\": \"any important notes or warnings\"\n\
             }}\n\n\
             Do not include any other text outside the JSON object."
        )
    }

    async fn complete(&self, tool: &str, prompt: &str) -> Result<String, ExtractionError> {
        let url = format!("{}/api/generate", self.config.endpoint.trim_end_matches('/'));
        let body = serde_json::json!({
            "model": self.config.model,
            "prompt": prompt,
            "stream": false,
            "options": { "temperature": self.config.temperature },
        });

        let send = self.client.post(&url).json(&body).send();

        let response = tokio::time::timeout(self.config.timeout(), send)
            .await
            .map_err(|_| ExtractionError::timeout(tool, self.config.timeout_seconds))?
            .map_err(|e| {
                if e.is_timeout() {
                    ExtractionError::timeout(tool, self.config.timeout_seconds)
                } else {
                    ExtractionError::transport(tool, e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractionError::transport(
                tool,
                format!("model endpoint returned HTTP {}", status.as_u16()),
            ));
        }

        let decoded: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ExtractionError::transport(tool, e.to_string()))?;

        Ok(decoded.response)
    }
}

#[async_trait]
impl StructuredExtractor for LlmExtractor {
    async fn extract(&self, tool: &str, text: &str) -> Result<ToolRecord, ExtractionError> {
        let prompt = self.prompt_for(tool, text);
        let output = self.complete(tool, &prompt).await?;

        match parse_record(&output) {
            Some(record) => {
                debug!(
                    tool = %tool,
                    install_steps = record.install_steps.len(),
                    update_steps = record.update_steps.len(),
                    "extraction complete"
                );
                Ok(record)
            }
            None => {
                warn!(tool = %tool, "model output failed validation, using sentinel record");
                Ok(ToolRecord::sentinel())
            }
        }
    }
}
