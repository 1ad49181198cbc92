//! The stage graph: a fixed set of named stages with a deterministic
//! transition function.
//!
//! Control flow: `Dispatch` selects the next stage; the linear sub-chain
//! `Search -> Fetch -> Extract` processes one tool per pass and returns to
//! `Dispatch`; `Compile` runs once when the queue drains and transitions to
//! the terminal `Done`. Cancellation is observed at every dispatch
//! checkpoint; a stage already in progress finishes its current call.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::cancellation::CancellationToken;
use crate::config::WorkflowConfig;
use crate::errors::{ConfigurationError, DocflowError};
use crate::events::{EventSink, NoOpEventSink};
use crate::extraction::{LlmExtractor, StructuredExtractor};
use crate::report::{ReportCompiler, ReportWriter};
use crate::state::WorkflowState;
use crate::utils::Timestamp;
use crate::websearch::{HttpPageFetcher, HttpSearchClient, PageFetcher, WebSearchClient};

/// The named stages of the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStage {
    /// Selects the next stage; the only branching point.
    Dispatch,
    /// Finds candidate documentation sources for the next queued tool.
    Search,
    /// Fetches and merges page content for the current tool.
    Fetch,
    /// Turns merged content into a structured record.
    Extract,
    /// Renders and persists the final report.
    Compile,
    /// Terminal.
    Done,
}

impl WorkflowStage {
    /// The stage name used in events and logs.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Dispatch => "dispatch",
            Self::Search => "search",
            Self::Fetch => "fetch",
            Self::Extract => "extract",
            Self::Compile => "compile",
            Self::Done => "done",
        }
    }
}

/// Identity of a single workflow run.
#[derive(Debug, Clone)]
pub struct RunIdentity {
    /// Unique run identifier.
    pub run_id: Uuid,
    /// When the run started.
    pub started_at: Timestamp,
}

impl RunIdentity {
    /// Creates a fresh identity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
        }
    }
}

impl Default for RunIdentity {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a workflow run.
#[derive(Debug)]
pub struct RunResult {
    /// Unique run identifier.
    pub run_id: Uuid,
    /// The rendered report text. Empty when no tool produced a record.
    pub report: String,
    /// Where the report artifact was written, when persistence succeeded.
    pub artifact_path: Option<PathBuf>,
    /// Number of distinct tools with a record.
    pub tools_processed: usize,
    /// Total execution time in milliseconds.
    pub duration_ms: f64,
    /// Whether the run stopped at a cancellation checkpoint.
    pub cancelled: bool,
    /// Cancellation reason if cancelled.
    pub cancel_reason: Option<String>,
    /// Non-fatal problems, currently only persistence failures.
    pub warnings: Vec<String>,
}

/// The workflow orchestrator.
///
/// Owns the [`WorkflowState`] for the duration of a run and sequences the
/// stages against the injected collaborators. Construct with
/// [`StageGraph::builder`] or [`StageGraph::from_config`].
pub struct StageGraph {
    pub(super) search: Arc<dyn WebSearchClient>,
    pub(super) fetcher: Arc<dyn PageFetcher>,
    pub(super) extractor: Arc<dyn StructuredExtractor>,
    pub(super) compiler: ReportCompiler,
    pub(super) writer: ReportWriter,
    pub(super) events: Arc<dyn EventSink>,
    pub(super) cancel: Arc<CancellationToken>,
    pub(super) max_concurrent_fetches: usize,
}

impl std::fmt::Debug for StageGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageGraph")
            .field("max_concurrent_fetches", &self.max_concurrent_fetches)
            .finish_non_exhaustive()
    }
}

impl StageGraph {
    /// Starts building a stage graph.
    #[must_use]
    pub fn builder() -> StageGraphBuilder {
        StageGraphBuilder::new()
    }

    /// Wires a stage graph from configuration, using the HTTP-backed
    /// collaborators.
    pub fn from_config(config: WorkflowConfig) -> Result<Self, ConfigurationError> {
        let max_concurrent = config.fetch.max_concurrent;
        Self::builder()
            .search_client(Arc::new(HttpSearchClient::new(config.search)?))
            .page_fetcher(Arc::new(HttpPageFetcher::new(config.fetch)?))
            .extractor(Arc::new(LlmExtractor::new(config.extraction)?))
            .report_writer(ReportWriter::new(config.report))
            .max_concurrent_fetches(max_concurrent)
            .build()
    }

    /// The cancellation token observed at dispatch checkpoints.
    #[must_use]
    pub fn cancellation(&self) -> Arc<CancellationToken> {
        Arc::clone(&self.cancel)
    }

    /// The transition function, evaluated only from `Dispatch`.
    pub(super) fn next_stage(state: &WorkflowState) -> WorkflowStage {
        if state.has_pending() {
            WorkflowStage::Search
        } else if state.has_results() && !state.has_report() {
            WorkflowStage::Compile
        } else {
            WorkflowStage::Done
        }
    }

    /// Runs the workflow over an ordered list of tool names.
    ///
    /// Duplicates are allowed and reprocessed in order. Fails fast on
    /// invalid input; every other failure is recovered per stage and the
    /// run proceeds to a best-effort report.
    pub async fn run(&self, tools: Vec<String>) -> Result<RunResult, DocflowError> {
        if tools.iter().any(|t| t.trim().is_empty()) {
            return Err(ConfigurationError::new("tool names must be non-empty").into());
        }

        let identity = RunIdentity::new();
        let start = Instant::now();
        let mut state = WorkflowState::new(tools);
        let mut warnings: Vec<String> = Vec::new();
        let mut artifact_path: Option<PathBuf> = None;
        let mut stage = WorkflowStage::Dispatch;

        info!(run_id = %identity.run_id, pending = state.pending_count(), "workflow run started");
        self.events.try_emit(
            "pipeline.started",
            Some(serde_json::json!({
                "run_id": identity.run_id.to_string(),
                "started_at": identity.started_at.to_rfc3339(),
                "pending": state.pending_count(),
            })),
        );

        loop {
            match stage {
                WorkflowStage::Dispatch => {
                    self.events.try_emit(
                        "stage.started",
                        Some(serde_json::json!({ "stage": stage.name() })),
                    );

                    if self.cancel.checkpoint().is_err() {
                        let reason = self.cancel.reason();
                        self.events.try_emit(
                            "pipeline.cancelled",
                            Some(serde_json::json!({ "reason": reason })),
                        );
                        info!(reason = ?reason, "run stopped at dispatch checkpoint");

                        let tools_processed = state.results().len();
                        return Ok(RunResult {
                            run_id: identity.run_id,
                            report: state.into_report(),
                            artifact_path,
                            tools_processed,
                            duration_ms: to_millis(start),
                            cancelled: true,
                            cancel_reason: reason,
                            warnings,
                        });
                    }

                    stage = Self::next_stage(&state);
                    debug!(next = stage.name(), "dispatch");
                }
                WorkflowStage::Search => {
                    self.run_search(&mut state).await;
                    stage = WorkflowStage::Fetch;
                }
                WorkflowStage::Fetch => {
                    self.run_fetch(&mut state).await;
                    stage = WorkflowStage::Extract;
                }
                WorkflowStage::Extract => {
                    self.run_extract(&mut state).await;
                    stage = WorkflowStage::Dispatch;
                }
                WorkflowStage::Compile => {
                    if let Some(path) = self.run_compile(&mut state, &mut warnings) {
                        artifact_path = Some(path);
                    }
                    stage = WorkflowStage::Done;
                }
                WorkflowStage::Done => break,
            }
        }

        let tools_processed = state.results().len();
        let duration_ms = to_millis(start);
        self.events.try_emit(
            "pipeline.completed",
            Some(serde_json::json!({
                "run_id": identity.run_id.to_string(),
                "tools_processed": tools_processed,
                "duration_ms": duration_ms,
            })),
        );
        info!(
            run_id = %identity.run_id,
            tools_processed,
            duration_ms,
            "workflow run completed"
        );

        Ok(RunResult {
            run_id: identity.run_id,
            report: state.into_report(),
            artifact_path,
            tools_processed,
            duration_ms,
            cancelled: false,
            cancel_reason: None,
            warnings,
        })
    }
}

fn to_millis(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Builder for [`StageGraph`].
///
/// Collaborators are injected here; building without one of the three
/// required collaborators is a configuration error, reported before any
/// stage executes.
#[derive(Default)]
pub struct StageGraphBuilder {
    search: Option<Arc<dyn WebSearchClient>>,
    fetcher: Option<Arc<dyn PageFetcher>>,
    extractor: Option<Arc<dyn StructuredExtractor>>,
    writer: Option<ReportWriter>,
    events: Option<Arc<dyn EventSink>>,
    cancel: Option<Arc<CancellationToken>>,
    max_concurrent_fetches: usize,
}

impl StageGraphBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the search client.
    #[must_use]
    pub fn search_client(mut self, client: Arc<dyn WebSearchClient>) -> Self {
        self.search = Some(client);
        self
    }

    /// Sets the page fetcher.
    #[must_use]
    pub fn page_fetcher(mut self, fetcher: Arc<dyn PageFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Sets the structured extractor.
    #[must_use]
    pub fn extractor(mut self, extractor: Arc<dyn StructuredExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Sets the report writer. Defaults to the default output location.
    #[must_use]
    pub fn report_writer(mut self, writer: ReportWriter) -> Self {
        self.writer = Some(writer);
        self
    }

    /// Sets the event sink. Defaults to a no-op sink.
    #[must_use]
    pub fn event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = Some(sink);
        self
    }

    /// Sets the cancellation token. Defaults to a fresh token.
    #[must_use]
    pub fn cancellation(mut self, token: Arc<CancellationToken>) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Sets the maximum in-flight fetches per tool. Values below 1 are
    /// clamped; merged-content ordering is unaffected.
    #[must_use]
    pub fn max_concurrent_fetches(mut self, max: usize) -> Self {
        self.max_concurrent_fetches = max;
        self
    }

    /// Builds the stage graph.
    pub fn build(self) -> Result<StageGraph, ConfigurationError> {
        let search = self
            .search
            .ok_or_else(|| ConfigurationError::new("no web search client configured"))?;
        let fetcher = self
            .fetcher
            .ok_or_else(|| ConfigurationError::new("no page fetcher configured"))?;
        let extractor = self
            .extractor
            .ok_or_else(|| ConfigurationError::new("no structured extractor configured"))?;

        Ok(StageGraph {
            search,
            fetcher,
            extractor,
            compiler: ReportCompiler::new(),
            writer: self.writer.unwrap_or_default(),
            events: self.events.unwrap_or_else(|| Arc::new(NoOpEventSink)),
            cancel: self.cancel.unwrap_or_default(),
            max_concurrent_fetches: self.max_concurrent_fetches.max(1),
        })
    }
}
