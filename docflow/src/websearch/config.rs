//! Configuration types for web search and fetching.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Configuration for the documentation search provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search API endpoint.
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,
    /// API key sent with every request.
    #[serde(default)]
    pub api_key: String,
    /// Query template; `{tool}` is replaced with the tool name.
    #[serde(default = "default_query_template")]
    pub query_template: String,
    /// Maximum number of candidate sources to return per tool.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Search depth hint passed to the provider.
    #[serde(default = "default_search_depth")]
    pub search_depth: String,
    /// Domains excluded from results (video platforms and social media
    /// rarely carry usable documentation).
    #[serde(default = "default_exclude_domains")]
    pub exclude_domains: Vec<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_search_timeout")]
    pub timeout_seconds: f64,
}

fn default_search_endpoint() -> String {
    "https://api.tavily.com/search".to_string()
}

fn default_query_template() -> String {
    "Install {tool} on linux".to_string()
}

fn default_max_results() -> usize {
    3
}

fn default_search_depth() -> String {
    "advanced".to_string()
}

fn default_exclude_domains() -> Vec<String> {
    vec![
        "youtube.com".to_string(),
        "youtu.be".to_string(),
        "vimeo.com".to_string(),
        "dailymotion.com".to_string(),
        "tiktok.com".to_string(),
        "facebook.com".to_string(),
        "twitter.com".to_string(),
        "instagram.com".to_string(),
        "x.com".to_string(),
    ]
}

fn default_search_timeout() -> f64 {
    15.0
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            api_key: String::new(),
            query_template: default_query_template(),
            max_results: default_max_results(),
            search_depth: default_search_depth(),
            exclude_domains: default_exclude_domains(),
            timeout_seconds: default_search_timeout(),
        }
    }
}

impl SearchConfig {
    /// Creates a new search configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    /// Sets the endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the maximum number of results.
    #[must_use]
    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }

    /// Adds a domain to the exclusion list.
    #[must_use]
    pub fn with_excluded_domain(mut self, domain: impl Into<String>) -> Self {
        self.exclude_domains.push(domain.into());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Builds the provider query for a tool name.
    #[must_use]
    pub fn query_for(&self, tool: &str) -> String {
        self.query_template.replace("{tool}", tool)
    }

    /// Gets timeout as Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_seconds)
    }
}

/// Retry configuration for failed page fetches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts.
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    /// Initial delay between retries in seconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_seconds: f64,
    /// Backoff multiplier.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Maximum delay between retries.
    #[serde(default = "default_max_delay")]
    pub max_delay_seconds: f64,
    /// Status codes that should trigger a retry.
    #[serde(default = "default_retry_status_codes")]
    pub retry_status_codes: HashSet<u16>,
}

fn default_max_retries() -> usize {
    2
}

fn default_retry_delay() -> f64 {
    1.0
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_max_delay() -> f64 {
    10.0
}

fn default_retry_status_codes() -> HashSet<u16> {
    [429, 500, 502, 503, 504].into_iter().collect()
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_seconds: default_retry_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            max_delay_seconds: default_max_delay(),
            retry_status_codes: default_retry_status_codes(),
        }
    }
}

impl RetryConfig {
    /// Calculates the delay for a given attempt.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        let delay = self.retry_delay_seconds * self.backoff_multiplier.powi(attempt as i32);
        let capped = delay.min(self.max_delay_seconds);
        Duration::from_secs_f64(capped)
    }

    /// Whether a status code should trigger a retry.
    #[must_use]
    pub fn should_retry_status(&self, status: u16) -> bool {
        self.retry_status_codes.contains(&status)
    }
}

/// Configuration for HTTP page fetching and cleaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_fetch_timeout")]
    pub timeout_seconds: f64,
    /// User agent string. Documentation sites often reject
    /// non-browser agents outright.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Maximum cleaned content length in characters per page.
    #[serde(default = "default_max_content")]
    pub max_content_chars: usize,
    /// Maximum in-flight fetches for one tool's candidate sources.
    /// Results are merged in source order regardless of this value.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// HTML elements stripped before text extraction.
    #[serde(default = "default_remove_tags")]
    pub remove_tags: Vec<String>,
    /// CSS selectors tried in order for the main content container.
    #[serde(default = "default_content_selectors")]
    pub main_content_selectors: Vec<String>,
    /// Retry configuration.
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_fetch_timeout() -> f64 {
    10.0
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/91.0.4472.124 Safari/537.36"
        .to_string()
}

fn default_max_content() -> usize {
    20_000
}

fn default_max_concurrent() -> usize {
    1
}

fn default_remove_tags() -> Vec<String> {
    vec![
        "script".to_string(),
        "style".to_string(),
        "noscript".to_string(),
        "iframe".to_string(),
        "nav".to_string(),
        "footer".to_string(),
        "header".to_string(),
        "aside".to_string(),
    ]
}

fn default_content_selectors() -> Vec<String> {
    vec![
        "main".to_string(),
        "article".to_string(),
        "[role=\"main\"]".to_string(),
        ".main-content".to_string(),
        ".content".to_string(),
        "#content".to_string(),
        ".documentation".to_string(),
        ".doc-content".to_string(),
    ]
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_fetch_timeout(),
            user_agent: default_user_agent(),
            max_content_chars: default_max_content(),
            max_concurrent: default_max_concurrent(),
            remove_tags: default_remove_tags(),
            main_content_selectors: default_content_selectors(),
            retry: RetryConfig::default(),
        }
    }
}

impl FetchConfig {
    /// Creates a new fetch configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the timeout.
    #[must_use]
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the maximum cleaned content length.
    #[must_use]
    pub fn with_max_content_chars(mut self, max: usize) -> Self {
        self.max_content_chars = max;
        self
    }

    /// Sets the maximum in-flight fetches per tool.
    #[must_use]
    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent = max.max(1);
        self
    }

    /// Gets timeout as Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_seconds)
    }
}
