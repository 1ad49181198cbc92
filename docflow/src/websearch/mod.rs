//! Web search and page fetching.
//!
//! This module provides:
//! - Configuration for the search provider and the page fetcher
//! - Protocol traits so alternate providers can be substituted
//! - An HTTP search client speaking a Tavily-style JSON API
//! - An HTTP page fetcher that cleans HTML down to readable text

mod config;
mod fetch;
mod protocols;
mod search;

pub use config::{FetchConfig, RetryConfig, SearchConfig};
pub use fetch::{clean_html, HttpPageFetcher};
pub use protocols::{PageFetcher, WebSearchClient};
pub use search::{extract_domain, is_denied_domain, HttpSearchClient};
