//! Error types for the docflow workflow.
//!
//! The taxonomy mirrors the recovery rules of the pipeline: search, fetch and
//! extraction failures are recovered locally inside their stage, persistence
//! failures are surfaced as run warnings, and only configuration errors fail
//! the run before any stage executes.

use thiserror::Error;

/// The main error type for docflow operations.
#[derive(Debug, Error)]
pub enum DocflowError {
    /// Invalid configuration or run input. Fails fast before any stage runs.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),

    /// A search provider failure.
    #[error("{0}")]
    Search(#[from] SearchError),

    /// A page fetch failure.
    #[error("{0}")]
    Fetch(#[from] FetchError),

    /// An extraction failure.
    #[error("{0}")]
    Extraction(#[from] ExtractionError),

    /// A report persistence failure.
    #[error("{0}")]
    Persistence(#[from] PersistenceError),

    /// The run was cancelled at a dispatch checkpoint.
    #[error("Workflow cancelled: {0}")]
    Cancelled(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error raised when the workflow is misconfigured.
///
/// These are the only errors that abort a run outright.
#[derive(Debug, Clone, Error)]
#[error("Configuration error: {message}")]
pub struct ConfigurationError {
    /// The error message.
    pub message: String,
}

impl ConfigurationError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors from the web search provider.
///
/// Recovered inside the search stage: the tool proceeds with an empty
/// candidate list.
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    /// Transport-level failure reaching the provider.
    #[error("Search transport error for '{tool}': {reason}")]
    Transport {
        /// The tool being searched for.
        tool: String,
        /// The underlying failure.
        reason: String,
    },

    /// The provider call exceeded the configured timeout.
    #[error("Search timed out for '{tool}' after {timeout_seconds}s")]
    Timeout {
        /// The tool being searched for.
        tool: String,
        /// The configured timeout in seconds.
        timeout_seconds: f64,
    },

    /// The provider returned a response that could not be decoded.
    #[error("Malformed search response for '{tool}': {reason}")]
    MalformedResponse {
        /// The tool being searched for.
        tool: String,
        /// The decode failure.
        reason: String,
    },
}

impl SearchError {
    /// Creates a transport error.
    #[must_use]
    pub fn transport(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Transport {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(tool: impl Into<String>, timeout_seconds: f64) -> Self {
        Self::Timeout {
            tool: tool.into(),
            timeout_seconds,
        }
    }

    /// Creates a malformed response error.
    #[must_use]
    pub fn malformed(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            tool: tool.into(),
            reason: reason.into(),
        }
    }
}

/// Errors from fetching a single candidate page.
///
/// Recovered per URL inside the fetch stage: the URL contributes an empty
/// chunk and the stage moves on.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Transport-level failure reaching the page.
    #[error("Fetch transport error for {url}: {reason}")]
    Transport {
        /// The URL being fetched.
        url: String,
        /// The underlying failure.
        reason: String,
    },

    /// The fetch exceeded the configured timeout.
    #[error("Fetch timed out for {url} after {timeout_seconds}s")]
    Timeout {
        /// The URL being fetched.
        url: String,
        /// The configured timeout in seconds.
        timeout_seconds: f64,
    },

    /// The server answered with a non-success status.
    #[error("Fetch failed for {url}: HTTP {status}")]
    Status {
        /// The URL being fetched.
        url: String,
        /// The HTTP status code.
        status: u16,
    },
}

impl FetchError {
    /// Creates a transport error.
    #[must_use]
    pub fn transport(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Transport {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(url: impl Into<String>, timeout_seconds: f64) -> Self {
        Self::Timeout {
            url: url.into(),
            timeout_seconds,
        }
    }

    /// Creates a status error.
    #[must_use]
    pub fn status(url: impl Into<String>, status: u16) -> Self {
        Self::Status {
            url: url.into(),
            status,
        }
    }
}

/// Errors from the structured extractor.
///
/// Recovered inside the extract stage: the tool receives the sentinel record.
#[derive(Debug, Clone, Error)]
pub enum ExtractionError {
    /// Transport-level failure reaching the model endpoint.
    #[error("Extraction transport error for '{tool}': {reason}")]
    Transport {
        /// The tool being extracted.
        tool: String,
        /// The underlying failure.
        reason: String,
    },

    /// The model call exceeded the configured timeout.
    #[error("Extraction timed out for '{tool}' after {timeout_seconds}s")]
    Timeout {
        /// The tool being extracted.
        tool: String,
        /// The configured timeout in seconds.
        timeout_seconds: f64,
    },

    /// The model output did not match the expected record shape.
    #[error("Unparseable extraction output for '{tool}': {reason}")]
    Parse {
        /// The tool being extracted.
        tool: String,
        /// The parse failure.
        reason: String,
    },
}

impl ExtractionError {
    /// Creates a transport error.
    #[must_use]
    pub fn transport(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Transport {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(tool: impl Into<String>, timeout_seconds: f64) -> Self {
        Self::Timeout {
            tool: tool.into(),
            timeout_seconds,
        }
    }

    /// Creates a parse error.
    #[must_use]
    pub fn parse(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            tool: tool.into(),
            reason: reason.into(),
        }
    }
}

/// Error raised when the report artifact cannot be written.
///
/// Surfaced as a warning on the run result; the in-memory report stands.
#[derive(Debug, Clone, Error)]
#[error("Failed to persist report to {path}: {reason}")]
pub struct PersistenceError {
    /// The target path.
    pub path: String,
    /// The underlying failure.
    pub reason: String,
}

impl PersistenceError {
    /// Creates a new persistence error.
    #[must_use]
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
