//! Combined configuration for a documentation-gathering workflow.

use serde::{Deserialize, Serialize};

use crate::extraction::ExtractionConfig;
use crate::report::ReportConfig;
use crate::websearch::{FetchConfig, SearchConfig};

/// Combined configuration for the workflow and its collaborators.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Search provider configuration.
    #[serde(default)]
    pub search: SearchConfig,
    /// Page fetching configuration.
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Extraction model configuration.
    #[serde(default)]
    pub extraction: ExtractionConfig,
    /// Report persistence configuration.
    #[serde(default)]
    pub report: ReportConfig,
}

impl WorkflowConfig {
    /// Creates a new workflow configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the search configuration.
    #[must_use]
    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    /// Sets the fetch configuration.
    #[must_use]
    pub fn with_fetch(mut self, fetch: FetchConfig) -> Self {
        self.fetch = fetch;
        self
    }

    /// Sets the extraction configuration.
    #[must_use]
    pub fn with_extraction(mut self, extraction: ExtractionConfig) -> Self {
        self.extraction = extraction;
        self
    }

    /// Sets the report configuration.
    #[must_use]
    pub fn with_report(mut self, report: ReportConfig) -> Self {
        self.report = report;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_round_trip_through_json() {
        let config = WorkflowConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: WorkflowConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(back.search.max_results, config.search.max_results);
        assert_eq!(back.extraction.model, config.extraction.model);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: WorkflowConfig =
            serde_json::from_str(r#"{"search": {"api_key": "tvly-abc"}}"#).unwrap();

        assert_eq!(config.search.api_key, "tvly-abc");
        assert_eq!(config.search.max_results, 3);
        assert_eq!(config.extraction.model, "llama3.1:8b");
    }
}
