//! HTTP search client speaking a Tavily-style JSON API.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::config::SearchConfig;
use super::protocols::WebSearchClient;
use crate::errors::{ConfigurationError, SearchError};
use crate::state::CandidateSource;

/// Extracts the host portion of a URL, without scheme or path.
#[must_use]
pub fn extract_domain(url: &str) -> Option<String> {
    let start = url.find("://").map(|i| i + 3)?;
    let rest = &url[start..];
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    Some(rest[..end].to_lowercase())
}

/// Whether a URL's host matches one of the denied domains, subdomains
/// included.
#[must_use]
pub fn is_denied_domain(url: &str, denied: &[String]) -> bool {
    let Some(host) = extract_domain(url) else {
        return false;
    };
    denied.iter().any(|d| {
        let d = d.to_lowercase();
        host == d || host.ends_with(&format!(".{d}"))
    })
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<RawResult>,
}

#[derive(Debug, Deserialize)]
struct RawResult {
    url: String,
    #[serde(default)]
    title: String,
}

/// A [`WebSearchClient`] backed by an HTTP search provider.
#[derive(Debug, Clone)]
pub struct HttpSearchClient {
    client: reqwest::Client,
    config: SearchConfig,
}

impl HttpSearchClient {
    /// Creates a new search client.
    pub fn new(config: SearchConfig) -> Result<Self, ConfigurationError> {
        if config.endpoint.is_empty() {
            return Err(ConfigurationError::new("search endpoint must not be empty"));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ConfigurationError::new(format!("search HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    fn request_body(&self, tool: &str) -> serde_json::Value {
        serde_json::json!({
            "api_key": self.config.api_key,
            "query": self.config.query_for(tool),
            "max_results": self.config.max_results,
            "search_depth": self.config.search_depth,
            "include_raw_content": false,
            "exclude_domains": self.config.exclude_domains,
        })
    }

    /// Applies the denylist and the result cap to a decoded response.
    fn filter_results(&self, results: Vec<RawResult>) -> Vec<CandidateSource> {
        results
            .into_iter()
            .filter(|r| !r.url.is_empty())
            .filter(|r| !is_denied_domain(&r.url, &self.config.exclude_domains))
            .take(self.config.max_results)
            .map(|r| CandidateSource::new(r.url, r.title))
            .collect()
    }
}

#[async_trait]
impl WebSearchClient for HttpSearchClient {
    async fn search(&self, tool: &str) -> Result<Vec<CandidateSource>, SearchError> {
        debug!(tool = %tool, "searching documentation sources");

        let send = self
            .client
            .post(&self.config.endpoint)
            .json(&self.request_body(tool))
            .send();

        let response = tokio::time::timeout(self.config.timeout(), send)
            .await
            .map_err(|_| SearchError::timeout(tool, self.config.timeout_seconds))?
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::timeout(tool, self.config.timeout_seconds)
                } else {
                    SearchError::transport(tool, e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::transport(
                tool,
                format!("provider returned HTTP {}", status.as_u16()),
            ));
        }

        let decoded: SearchResponse = response
            .json()
            .await
            .map_err(|e| SearchError::malformed(tool, e.to_string()))?;

        let sources = self.filter_results(decoded.results);
        debug!(tool = %tool, count = sources.len(), "search complete");
        Ok(sources)
    }
}
