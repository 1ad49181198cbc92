//! Protocol traits for the search and fetch collaborators.
//!
//! The stage graph receives these as injected dependencies, so alternate
//! search providers and fetching strategies can be substituted without
//! touching the orchestration logic.

use async_trait::async_trait;

use crate::errors::{FetchError, SearchError};
use crate::state::CandidateSource;

/// Protocol for searching documentation sources for a tool.
#[async_trait]
pub trait WebSearchClient: Send + Sync {
    /// Searches for install/update documentation for `tool`.
    ///
    /// Returns a ranked list of candidate sources, bounded by the configured
    /// maximum and with denylisted domains excluded. Transport problems are
    /// reported as errors; the caller recovers by treating them as an empty
    /// candidate list.
    async fn search(&self, tool: &str) -> Result<Vec<CandidateSource>, SearchError>;
}

/// Protocol for fetching and cleaning one documentation page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url` and returns cleaned plain text.
    ///
    /// Markup, scripts and navigation chrome are stripped; whitespace is
    /// collapsed to blank-line-separated paragraphs; output is bounded by
    /// the configured maximum length. The caller treats any error as an
    /// empty contribution for the URL.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}
