//! Stage implementations.
//!
//! Each stage mutates the [`WorkflowState`] and recovers locally from its
//! collaborator's failures: a failed search yields no candidates, a failed
//! fetch contributes nothing for that URL, a failed extraction yields the
//! sentinel record. No failure here aborts the run.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use super::graph::{StageGraph, WorkflowStage};
use crate::errors::FetchError;
use crate::state::{CandidateSource, ToolRecord, WorkflowState};

/// Title substituted when a search result carried none.
const UNTITLED_SOURCE: &str = "Unknown";

impl StageGraph {
    fn emit_stage(&self, stage: WorkflowStage, phase: &str, tool: &str) {
        self.events.try_emit(
            &format!("stage.{phase}"),
            Some(serde_json::json!({ "stage": stage.name(), "tool": tool })),
        );
    }

    /// Search stage: pops the next tool and finds candidate sources.
    ///
    /// The pop happens here, not at extract, so the tool stays in flight
    /// for the remainder of its pipeline pass. Provider failures degrade to
    /// an empty candidate list; the tool still reaches the extract stage.
    pub(super) async fn run_search(&self, state: &mut WorkflowState) {
        let Some(tool) = state.begin_tool() else {
            warn!("search stage entered with an empty queue");
            return;
        };
        self.emit_stage(WorkflowStage::Search, "started", &tool);

        let sources = match self.search.search(&tool).await {
            Ok(sources) => sources,
            Err(err) => {
                warn!(tool = %tool, "search failed, continuing without sources: {err}");
                self.events.try_emit(
                    "search.failed",
                    Some(serde_json::json!({ "tool": tool, "error": err.to_string() })),
                );
                Vec::new()
            }
        };

        debug!(tool = %tool, candidates = sources.len(), "search stage done");
        state.set_candidate_sources(sources);
        self.emit_stage(WorkflowStage::Search, "completed", &tool);
    }

    /// Fetch stage: retrieves every candidate source and merges the cleaned
    /// text, in source order, into delimited chunks.
    ///
    /// Per-URL failures contribute nothing and never abort the stage. With
    /// `max_concurrent_fetches > 1` pages are fetched with a bounded,
    /// order-preserving fan-out; the merged text is identical either way.
    pub(super) async fn run_fetch(&self, state: &mut WorkflowState) {
        let tool = state.current_tool().to_string();
        self.emit_stage(WorkflowStage::Fetch, "started", &tool);

        let sources: Vec<CandidateSource> = state.candidate_sources().to_vec();
        let outcomes: Vec<Result<String, FetchError>> = stream::iter(sources.clone())
            .map(|source| {
                let fetcher = Arc::clone(&self.fetcher);
                async move { fetcher.fetch(&source.url).await }
            })
            .buffered(self.max_concurrent_fetches)
            .collect()
            .await;

        let mut chunks: Vec<String> = Vec::new();
        for (index, (source, outcome)) in sources.iter().zip(outcomes).enumerate() {
            match outcome {
                Ok(text) if !text.is_empty() => {
                    chunks.push(delimited_chunk(index + 1, source, &text));
                }
                Ok(_) => {
                    debug!(url = %source.url, "fetched page had no usable content");
                }
                Err(err) => {
                    warn!(url = %source.url, "fetch failed, skipping source: {err}");
                    self.events.try_emit(
                        "fetch.failed",
                        Some(serde_json::json!({
                            "tool": tool,
                            "url": source.url,
                            "error": err.to_string(),
                        })),
                    );
                }
            }
        }

        debug!(tool = %tool, merged = chunks.len(), of = sources.len(), "fetch stage done");
        state.set_merged_content(chunks.join("\n\n"));
        self.emit_stage(WorkflowStage::Fetch, "completed", &tool);
    }

    /// Extract stage: turns merged content into a record and finishes the
    /// current tool.
    ///
    /// Empty merged content short-circuits to the sentinel record without
    /// invoking the extractor, so a tool with no reachable documentation
    /// still appears in the report. Extractor failures degrade to the
    /// sentinel as well.
    pub(super) async fn run_extract(&self, state: &mut WorkflowState) {
        let tool = state.current_tool().to_string();
        self.emit_stage(WorkflowStage::Extract, "started", &tool);

        let record = if state.merged_content().is_empty() {
            warn!(tool = %tool, "no content to extract from, using sentinel record");
            ToolRecord::sentinel()
        } else {
            match self.extractor.extract(&tool, state.merged_content()).await {
                Ok(record) => record,
                Err(err) => {
                    warn!(tool = %tool, "extraction failed, using sentinel record: {err}");
                    self.events.try_emit(
                        "extraction.failed",
                        Some(serde_json::json!({ "tool": tool, "error": err.to_string() })),
                    );
                    ToolRecord::sentinel()
                }
            }
        };

        let sentinel = record.is_sentinel();
        state.finish_tool(record);
        self.events.try_emit(
            "tool.processed",
            Some(serde_json::json!({ "tool": tool, "sentinel": sentinel })),
        );
        self.emit_stage(WorkflowStage::Extract, "completed", &tool);
    }

    /// Compile stage: renders the report over all accumulated records and
    /// persists it.
    ///
    /// A persistence failure becomes a run warning; the in-memory report
    /// stands either way. Returns the artifact path when the write
    /// succeeded.
    pub(super) fn run_compile(
        &self,
        state: &mut WorkflowState,
        warnings: &mut Vec<String>,
    ) -> Option<PathBuf> {
        self.emit_stage(WorkflowStage::Compile, "started", "");

        let generated_at = Utc::now();
        let report = self.compiler.render(state.results(), generated_at);
        state.set_report(report);

        let artifact = match self.writer.write(state.report(), generated_at) {
            Ok(path) => {
                self.events.try_emit(
                    "report.persisted",
                    Some(serde_json::json!({ "path": path.display().to_string() })),
                );
                Some(path)
            }
            Err(err) => {
                warn!("report persistence failed, keeping in-memory report: {err}");
                self.events.try_emit(
                    "report.persist_failed",
                    Some(serde_json::json!({ "error": err.to_string() })),
                );
                warnings.push(err.to_string());
                None
            }
        };

        self.emit_stage(WorkflowStage::Compile, "completed", "");
        artifact
    }
}

/// Wraps one page's cleaned text with its source index, title and URL so
/// the extractor can attribute claims.
fn delimited_chunk(index: usize, source: &CandidateSource, text: &str) -> String {
    let title = if source.title.is_empty() {
        UNTITLED_SOURCE
    } else {
        source.title.as_str()
    };

    let mut chunk = String::new();
    let _ = writeln!(chunk, "===== SOURCE {index}: {title} =====");
    let _ = writeln!(chunk, "URL: {}", source.url);
    chunk.push('\n');
    chunk.push_str(text);
    chunk.push('\n');
    let _ = write!(chunk, "\n===== END OF SOURCE {index} =====");
    chunk
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimited_chunk_shape() {
        let source = CandidateSource::new("https://x/docs", "Install Docs");
        let chunk = delimited_chunk(1, &source, "Step 1. Install.");

        assert!(chunk.starts_with("===== SOURCE 1: Install Docs =====\n"));
        assert!(chunk.contains("URL: https://x/docs\n"));
        assert!(chunk.contains("\n\nStep 1. Install.\n"));
        assert!(chunk.ends_with("\n===== END OF SOURCE 1 ====="));
    }

    #[test]
    fn test_delimited_chunk_untitled_source() {
        let source = CandidateSource::new("https://x", "");
        let chunk = delimited_chunk(2, &source, "text");
        assert!(chunk.starts_with("===== SOURCE 2: Unknown ====="));
    }
}
