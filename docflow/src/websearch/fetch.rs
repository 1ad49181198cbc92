//! HTTP page fetcher with HTML cleaning.
//!
//! Fetched pages are reduced to readable plain text: scripts, styles and
//! navigation chrome are stripped, a main-content container is preferred
//! over the whole body, and whitespace collapses to blank-line-separated
//! paragraphs bounded by the configured maximum length.

use async_trait::async_trait;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::{debug, warn};

use super::config::FetchConfig;
use super::protocols::PageFetcher;
use crate::errors::{ConfigurationError, FetchError};
use crate::utils::{collapse_blank_lines, truncate_chars};

/// Reduces an HTML document to cleaned plain text.
///
/// The first matching main-content selector wins; when none matches, the
/// whole body is used. Text under any of the configured removal tags is
/// dropped. Malformed HTML never fails - the parser recovers and the
/// result is best-effort.
#[must_use]
pub fn clean_html(html: &str, config: &FetchConfig) -> String {
    let document = Html::parse_document(html);

    let container = config
        .main_content_selectors
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .find_map(|sel| document.select(&sel).next())
        .or_else(|| {
            Selector::parse("body")
                .ok()
                .and_then(|sel| document.select(&sel).next())
        });

    let Some(container) = container else {
        return String::new();
    };

    let removed: HashSet<&str> = config.remove_tags.iter().map(String::as_str).collect();
    let mut lines: Vec<&str> = Vec::new();

    for node in container.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let blocked = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| removed.contains(el.name()))
        });
        if blocked {
            continue;
        }
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed);
        }
    }

    let joined = lines.join("\n");
    let collapsed = collapse_blank_lines(&joined);
    truncate_chars(&collapsed, config.max_content_chars).to_string()
}

/// A [`PageFetcher`] backed by reqwest with bounded retries.
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

impl HttpPageFetcher {
    /// Creates a new page fetcher.
    pub fn new(config: FetchConfig) -> Result<Self, ConfigurationError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ConfigurationError::new(format!("fetch HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    async fn fetch_once(&self, url: &str) -> Result<String, FetchError> {
        let send = self.client.get(url).send();

        let response = tokio::time::timeout(self.config.timeout(), send)
            .await
            .map_err(|_| FetchError::timeout(url, self.config.timeout_seconds))?
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::timeout(url, self.config.timeout_seconds)
                } else {
                    FetchError::transport(url, e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::status(url, status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::transport(url, e.to_string()))?;

        Ok(clean_html(&body, &self.config))
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(url).await {
                Ok(text) => {
                    debug!(url = %url, chars = text.len(), "fetched page");
                    return Ok(text);
                }
                Err(err) => {
                    let retryable = matches!(
                        &err,
                        FetchError::Status { status, .. }
                            if self.config.retry.should_retry_status(*status)
                    );
                    if retryable && attempt < self.config.retry.max_retries {
                        let delay = self.config.retry.delay_for_attempt(attempt);
                        warn!(url = %url, attempt, "retrying fetch after {:?}: {err}", delay);
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(err);
                }
            }
        }
    }
}
