//! Workflow state and the records it accumulates.
//!
//! A single [`WorkflowState`] is created per run and owned exclusively by the
//! stage graph for the run's duration. All mutation goes through methods so
//! the stage invariants hold at every boundary:
//!
//! - `current_tool` is non-empty only while a tool is mid-pipeline
//! - `candidate_sources` and `merged_content` are cleared once consumed
//! - `results` entries are final once written (a duplicate queue entry
//!   overwrites in place, keeping its original position)
//! - `report` is set at most once

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Fallback text used for step lists when extraction fails.
pub const SENTINEL_STEP: &str = "Failed to extract steps - please check documentation manually";

/// Fallback notes used when extraction fails.
pub const SENTINEL_NOTES: &str = "Extraction failed - manual review needed";

/// Version string used when no version could be determined.
pub const UNKNOWN_VERSION: &str = "unknown";

/// A candidate documentation source returned by the search provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSource {
    /// The page URL.
    pub url: String,
    /// The page title, possibly empty.
    #[serde(default)]
    pub title: String,
}

impl CandidateSource {
    /// Creates a new candidate source.
    #[must_use]
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }
}

/// Structured install/update documentation for one tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolRecord {
    /// Ordered installation steps.
    #[serde(default)]
    pub install_steps: Vec<String>,
    /// Ordered update steps.
    #[serde(default)]
    pub update_steps: Vec<String>,
    /// Version information, `"unknown"` when not determined.
    #[serde(default = "default_version")]
    pub version: String,
    /// System requirements.
    #[serde(default)]
    pub requirements: Vec<String>,
    /// Free-form notes or warnings, possibly empty.
    #[serde(default)]
    pub notes: String,
}

fn default_version() -> String {
    UNKNOWN_VERSION.to_string()
}

impl Default for ToolRecord {
    fn default() -> Self {
        Self {
            install_steps: Vec::new(),
            update_steps: Vec::new(),
            version: default_version(),
            requirements: Vec::new(),
            notes: String::new(),
        }
    }
}

impl ToolRecord {
    /// Creates an empty record with an unknown version.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the sentinel record produced when extraction cannot yield a
    /// valid structured result.
    #[must_use]
    pub fn sentinel() -> Self {
        Self {
            install_steps: vec![SENTINEL_STEP.to_string()],
            update_steps: vec![SENTINEL_STEP.to_string()],
            version: UNKNOWN_VERSION.to_string(),
            requirements: Vec::new(),
            notes: SENTINEL_NOTES.to_string(),
        }
    }

    /// Whether this record is the sentinel fallback.
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        self.notes == SENTINEL_NOTES
            && self.install_steps.len() == 1
            && self.install_steps[0] == SENTINEL_STEP
    }
}

/// The mutable context threaded through every stage of a run.
#[derive(Debug, Default)]
pub struct WorkflowState {
    /// Tools awaiting processing, head is processed next.
    pending_tools: VecDeque<String>,
    /// The tool currently mid-pipeline, empty when none is active.
    current_tool: String,
    /// Sources found by the most recent search, cleared once consumed.
    candidate_sources: Vec<CandidateSource>,
    /// Concatenated cleaned page text for the current tool.
    merged_content: String,
    /// Finished records in processing order, at most one per tool name.
    results: Vec<(String, ToolRecord)>,
    /// The rendered report, empty until the compile stage runs.
    report: String,
}

impl WorkflowState {
    /// Creates a state for the given processing queue.
    ///
    /// Order is preserved; duplicates are kept and reprocessed.
    #[must_use]
    pub fn new(tools: Vec<String>) -> Self {
        Self {
            pending_tools: tools.into(),
            ..Self::default()
        }
    }

    /// Number of tools still awaiting processing.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending_tools.len()
    }

    /// Whether any tools are awaiting processing.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending_tools.is_empty()
    }

    /// The tool currently mid-pipeline, empty when none is active.
    #[must_use]
    pub fn current_tool(&self) -> &str {
        &self.current_tool
    }

    /// The candidate sources from the most recent search.
    #[must_use]
    pub fn candidate_sources(&self) -> &[CandidateSource] {
        &self.candidate_sources
    }

    /// The merged page content for the current tool.
    #[must_use]
    pub fn merged_content(&self) -> &str {
        &self.merged_content
    }

    /// Finished records in processing order.
    #[must_use]
    pub fn results(&self) -> &[(String, ToolRecord)] {
        &self.results
    }

    /// Whether any record has been written.
    #[must_use]
    pub fn has_results(&self) -> bool {
        !self.results.is_empty()
    }

    /// The rendered report, empty until compiled.
    #[must_use]
    pub fn report(&self) -> &str {
        &self.report
    }

    /// Whether the report has been rendered.
    #[must_use]
    pub fn has_report(&self) -> bool {
        !self.report.is_empty()
    }

    /// Pops the head of the queue into `current_tool`, beginning a pipeline
    /// pass. Returns the tool name, or `None` when the queue is empty.
    pub fn begin_tool(&mut self) -> Option<String> {
        let tool = self.pending_tools.pop_front()?;
        self.current_tool.clone_from(&tool);
        Some(tool)
    }

    /// Records the search stage outcome for the current tool.
    pub fn set_candidate_sources(&mut self, sources: Vec<CandidateSource>) {
        self.candidate_sources = sources;
    }

    /// Records the fetch stage outcome for the current tool, consuming the
    /// candidate sources.
    pub fn set_merged_content(&mut self, content: String) {
        self.merged_content = content;
        self.candidate_sources.clear();
    }

    /// Writes the record for the current tool and clears all per-tool
    /// transient state.
    ///
    /// A tool name seen before overwrites its record in place, so the first
    /// occurrence keeps its position in the report ordering.
    pub fn finish_tool(&mut self, record: ToolRecord) {
        let tool = std::mem::take(&mut self.current_tool);
        if let Some(slot) = self.results.iter_mut().find(|(name, _)| *name == tool) {
            slot.1 = record;
        } else {
            self.results.push((tool, record));
        }
        self.candidate_sources.clear();
        self.merged_content.clear();
    }

    /// Sets the rendered report. Ignored if a report was already set.
    pub fn set_report(&mut self, report: String) {
        if self.report.is_empty() {
            self.report = report;
        }
    }

    /// Consumes the state, returning the rendered report.
    #[must_use]
    pub fn into_report(self) -> String {
        self.report
    }
}
