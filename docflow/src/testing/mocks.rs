//! Scripted collaborator doubles.
//!
//! Each double replays a queue of scripted outcomes, falling back to a
//! benign empty response when the queue runs dry, and records the calls it
//! received for later assertions.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

use crate::errors::{ExtractionError, FetchError, SearchError};
use crate::events::EventSink;
use crate::extraction::StructuredExtractor;
use crate::state::{CandidateSource, ToolRecord};
use crate::websearch::{PageFetcher, WebSearchClient};

/// A scripted [`WebSearchClient`].
#[derive(Debug, Default)]
pub struct ScriptedSearchClient {
    responses: Mutex<VecDeque<Result<Vec<CandidateSource>, SearchError>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedSearchClient {
    /// Creates a double that always returns no candidates.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful response.
    pub fn push_results(&self, sources: Vec<CandidateSource>) {
        self.responses.lock().push_back(Ok(sources));
    }

    /// Queues a failure.
    pub fn push_error(&self, err: SearchError) {
        self.responses.lock().push_back(Err(err));
    }

    /// The tools searched for, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// The number of search calls received.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl WebSearchClient for ScriptedSearchClient {
    async fn search(&self, tool: &str) -> Result<Vec<CandidateSource>, SearchError> {
        self.calls.lock().push(tool.to_string());
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// A scripted [`PageFetcher`].
#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    responses: Mutex<VecDeque<Result<String, FetchError>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    /// Creates a double that always returns empty content.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues cleaned page text.
    pub fn push_text(&self, text: impl Into<String>) {
        self.responses.lock().push_back(Ok(text.into()));
    }

    /// Queues a failure.
    pub fn push_error(&self, err: FetchError) {
        self.responses.lock().push_back(Err(err));
    }

    /// The URLs fetched, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// The number of fetch calls received.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.calls.lock().push(url.to_string());
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(String::new()))
    }
}

/// A scripted [`StructuredExtractor`].
#[derive(Debug, Default)]
pub struct ScriptedExtractor {
    responses: Mutex<VecDeque<Result<ToolRecord, ExtractionError>>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedExtractor {
    /// Creates a double that always returns an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful record.
    pub fn push_record(&self, record: ToolRecord) {
        self.responses.lock().push_back(Ok(record));
    }

    /// Queues a failure.
    pub fn push_error(&self, err: ExtractionError) {
        self.responses.lock().push_back(Err(err));
    }

    /// The `(tool, text)` pairs extracted, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().clone()
    }

    /// The number of extract calls received.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl StructuredExtractor for ScriptedExtractor {
    async fn extract(&self, tool: &str, text: &str) -> Result<ToolRecord, ExtractionError> {
        self.calls.lock().push((tool.to_string(), text.to_string()));
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(ToolRecord::new()))
    }
}

/// An event sink that records every event it receives.
#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<(String, Option<serde_json::Value>)>>,
}

impl RecordingEventSink {
    /// Creates an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded events in emission order.
    #[must_use]
    pub fn events(&self) -> Vec<(String, Option<serde_json::Value>)> {
        self.events.lock().clone()
    }

    /// Number of events of the given type.
    #[must_use]
    pub fn count(&self, event_type: &str) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|(ty, _)| ty == event_type)
            .count()
    }

    /// Number of `stage.started` events for the given stage name.
    #[must_use]
    pub fn stage_visits(&self, stage: &str) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|(ty, data)| {
                ty == "stage.started"
                    && data
                        .as_ref()
                        .and_then(|d| d.get("stage"))
                        .and_then(serde_json::Value::as_str)
                        == Some(stage)
            })
            .count()
    }
}

#[async_trait]
impl EventSink for RecordingEventSink {
    async fn emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        self.events.lock().push((event_type.to_string(), data));
    }

    fn try_emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        self.events.lock().push((event_type.to_string(), data));
    }
}
