//! Protocol trait for structured extraction.

use async_trait::async_trait;

use crate::errors::ExtractionError;
use crate::state::ToolRecord;

/// Protocol for extracting a structured record from merged page text.
#[async_trait]
pub trait StructuredExtractor: Send + Sync {
    /// Extracts install/update documentation for `tool` from `text`.
    ///
    /// Implementations truncate `text` to a bounded prefix before any model
    /// invocation and validate model output against the record shape,
    /// falling back to [`ToolRecord::sentinel`] when the output cannot be
    /// interpreted. Errors are reserved for transport-level failures; the
    /// caller recovers from those with the sentinel record as well.
    async fn extract(&self, tool: &str, text: &str) -> Result<ToolRecord, ExtractionError>;
}
