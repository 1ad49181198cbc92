//! End-to-end runs over scripted collaborators.

use std::sync::Arc;

use async_trait::async_trait;
use pretty_assertions::assert_eq;

use crate::cancellation::CancellationToken;
use crate::errors::{ExtractionError, FetchError, SearchError};
use crate::pipeline::StageGraph;
use crate::report::{ReportConfig, ReportWriter};
use crate::state::{CandidateSource, ToolRecord, SENTINEL_STEP};
use crate::testing::{
    RecordingEventSink, ScriptedExtractor, ScriptedFetcher, ScriptedSearchClient,
};
use crate::websearch::PageFetcher;

struct Harness {
    search: Arc<ScriptedSearchClient>,
    fetcher: Arc<ScriptedFetcher>,
    extractor: Arc<ScriptedExtractor>,
    sink: Arc<RecordingEventSink>,
    _outdir: tempfile::TempDir,
}

impl Harness {
    fn new() -> Self {
        Self {
            search: Arc::new(ScriptedSearchClient::new()),
            fetcher: Arc::new(ScriptedFetcher::new()),
            extractor: Arc::new(ScriptedExtractor::new()),
            sink: Arc::new(RecordingEventSink::new()),
            _outdir: tempfile::tempdir().unwrap(),
        }
    }

    fn graph(&self) -> StageGraph {
        StageGraph::builder()
            .search_client(self.search.clone())
            .page_fetcher(self.fetcher.clone())
            .extractor(self.extractor.clone())
            .event_sink(self.sink.clone())
            .report_writer(ReportWriter::new(
                ReportConfig::new().with_output_dir(self._outdir.path()),
            ))
            .build()
            .unwrap()
    }
}

fn tools(names: &[&str]) -> Vec<String> {
    names.iter().map(ToString::to_string).collect()
}

#[tokio::test]
async fn empty_input_goes_straight_to_done() {
    let h = Harness::new();
    let result = h.graph().run(Vec::new()).await.unwrap();

    assert_eq!(result.report, "");
    assert!(result.artifact_path.is_none());
    assert_eq!(result.tools_processed, 0);
    assert!(!result.cancelled);

    assert_eq!(h.search.call_count(), 0);
    assert_eq!(h.fetcher.call_count(), 0);
    assert_eq!(h.extractor.call_count(), 0);
    assert_eq!(h.sink.stage_visits("dispatch"), 1);
    assert_eq!(h.sink.stage_visits("compile"), 0);
}

#[tokio::test]
async fn single_tool_happy_path() {
    let h = Harness::new();
    h.search
        .push_results(vec![CandidateSource::new("https://x", "Docs")]);
    h.fetcher.push_text("Step 1. Install. Step 2. Run.");
    h.extractor.push_record(ToolRecord {
        install_steps: vec!["Install".to_string()],
        update_steps: Vec::new(),
        version: "1.0".to_string(),
        requirements: Vec::new(),
        notes: String::new(),
    });

    let result = h.graph().run(tools(&["toolA"])).await.unwrap();

    assert_eq!(result.tools_processed, 1);
    assert!(result.report.contains("## toolA"));
    assert!(result.report.contains("**Version:** 1.0"));
    assert!(result.report.contains("1. Install"));
    assert!(result.report.contains("*No update steps available*"));
    assert!(result.warnings.is_empty());

    // Artifact persisted with the same bytes as the in-memory report
    let path = result.artifact_path.unwrap();
    assert_eq!(std::fs::read_to_string(path).unwrap(), result.report);

    // The extractor saw the delimited merged content
    let calls = h.extractor.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "toolA");
    assert!(calls[0].1.contains("===== SOURCE 1: Docs ====="));
    assert!(calls[0].1.contains("URL: https://x"));
    assert!(calls[0].1.contains("Step 1. Install. Step 2. Run."));
    assert!(calls[0].1.contains("===== END OF SOURCE 1 ====="));
}

#[tokio::test]
async fn search_failure_yields_sentinel_and_run_continues() {
    let h = Harness::new();
    h.search
        .push_error(SearchError::transport("nodejs", "provider down"));
    h.search
        .push_results(vec![CandidateSource::new("https://k9s.dev", "K9s")]);
    h.fetcher.push_text("k9s install docs");
    h.extractor.push_record(ToolRecord {
        version: "0.32".to_string(),
        ..ToolRecord::new()
    });

    let result = h.graph().run(tools(&["nodejs", "k9s"])).await.unwrap();

    assert_eq!(result.tools_processed, 2);
    assert!(result.report.contains("## nodejs"));
    assert!(result.report.contains(SENTINEL_STEP));
    assert!(result.report.contains("## k9s"));
    assert!(result.report.contains("**Version:** 0.32"));

    // nodejs had no sources: nothing fetched, extractor never invoked for it
    assert_eq!(h.fetcher.call_count(), 1);
    assert_eq!(h.extractor.call_count(), 1);
    assert_eq!(h.extractor.calls()[0].0, "k9s");
}

#[tokio::test]
async fn zero_candidates_yields_sentinel_without_extractor_call() {
    let h = Harness::new();
    // Scripted search defaults to an empty result list

    let result = h.graph().run(tools(&["obscure-tool"])).await.unwrap();

    assert_eq!(result.tools_processed, 1);
    assert!(result.report.contains("## obscure-tool"));
    assert!(result.report.contains(SENTINEL_STEP));
    assert_eq!(h.extractor.call_count(), 0);
}

#[tokio::test]
async fn all_fetches_failing_yields_sentinel() {
    let h = Harness::new();
    h.search.push_results(vec![
        CandidateSource::new("https://a", "A"),
        CandidateSource::new("https://b", "B"),
    ]);
    h.fetcher.push_error(FetchError::timeout("https://a", 10.0));
    h.fetcher.push_error(FetchError::status("https://b", 500));

    let result = h.graph().run(tools(&["toolA"])).await.unwrap();

    assert_eq!(h.fetcher.calls(), vec!["https://a".to_string(), "https://b".to_string()]);
    assert_eq!(h.extractor.call_count(), 0);
    assert!(result.report.contains(SENTINEL_STEP));
}

#[tokio::test]
async fn failed_fetch_skips_source_but_keeps_the_rest() {
    let h = Harness::new();
    h.search.push_results(vec![
        CandidateSource::new("https://a", "A"),
        CandidateSource::new("https://b", "B"),
        CandidateSource::new("https://c", "C"),
    ]);
    h.fetcher.push_text("content from a");
    h.fetcher.push_error(FetchError::status("https://b", 404));
    h.fetcher.push_text("content from c");
    h.extractor.push_record(ToolRecord::new());

    h.graph().run(tools(&["toolA"])).await.unwrap();

    let merged = &h.extractor.calls()[0].1;
    assert!(merged.contains("===== SOURCE 1: A ====="));
    assert!(merged.contains("content from a"));
    assert!(!merged.contains("SOURCE 2: B"));
    // Index reflects the source position, not the number of kept chunks
    assert!(merged.contains("===== SOURCE 3: C ====="));
    assert!(merged.contains("content from c"));
}

#[tokio::test]
async fn extraction_failure_yields_sentinel() {
    let h = Harness::new();
    h.search
        .push_results(vec![CandidateSource::new("https://x", "Docs")]);
    h.fetcher.push_text("some docs");
    h.extractor
        .push_error(ExtractionError::timeout("toolA", 120.0));

    let result = h.graph().run(tools(&["toolA"])).await.unwrap();

    assert_eq!(h.extractor.call_count(), 1);
    assert!(result.report.contains(SENTINEL_STEP));
}

#[tokio::test]
async fn report_preserves_input_order() {
    let h = Harness::new();
    // nodejs: one source, slow-ish pipeline; k9s: no sources at all
    h.search
        .push_results(vec![CandidateSource::new("https://nodejs.org", "Node")]);
    h.fetcher.push_text("node docs");
    h.extractor.push_record(ToolRecord::new());

    let result = h.graph().run(tools(&["nodejs", "k9s"])).await.unwrap();

    assert_eq!(h.search.calls(), vec!["nodejs".to_string(), "k9s".to_string()]);
    let nodejs_at = result.report.find("## nodejs").unwrap();
    let k9s_at = result.report.find("## k9s").unwrap();
    assert!(nodejs_at < k9s_at);
}

#[tokio::test]
async fn duplicate_tool_is_reprocessed_last_write_wins() {
    let h = Harness::new();
    // first pass over "a"
    h.search
        .push_results(vec![CandidateSource::new("https://a", "A")]);
    // "b"
    h.search
        .push_results(vec![CandidateSource::new("https://b", "B")]);
    // second pass over "a"
    h.search
        .push_results(vec![CandidateSource::new("https://a2", "A2")]);
    for text in ["first pass docs", "b docs", "second pass docs"] {
        h.fetcher.push_text(text);
    }
    for version in ["1.0", "0.5", "2.0"] {
        h.extractor.push_record(ToolRecord {
            version: version.to_string(),
            ..ToolRecord::new()
        });
    }

    let result = h.graph().run(tools(&["a", "b", "a"])).await.unwrap();

    assert_eq!(result.tools_processed, 2);
    assert_eq!(result.report.matches("## a\n").count(), 1);
    assert!(result.report.contains("**Version:** 2.0"));
    assert!(result.report.contains("**Version:** 0.5"));
    assert!(!result.report.contains("**Version:** 1.0"));
    // The overwritten record keeps its original position
    let a_at = result.report.find("## a\n").unwrap();
    let b_at = result.report.find("## b\n").unwrap();
    assert!(a_at < b_at);
    // All three queue entries ran a full pass
    assert_eq!(h.search.call_count(), 3);
}

#[tokio::test]
async fn dispatch_visit_count_is_bounded() {
    let h = Harness::new();
    let result = h.graph().run(tools(&["a", "b"])).await.unwrap();

    assert_eq!(result.tools_processed, 2);
    // One dispatch per tool plus the final one that routes to compile
    assert_eq!(h.sink.stage_visits("dispatch"), 3);
    assert_eq!(h.sink.stage_visits("search"), 2);
    assert_eq!(h.sink.stage_visits("compile"), 1);
}

#[tokio::test]
async fn cancelled_before_start_runs_no_stages() {
    let h = Harness::new();
    let graph = h.graph();
    graph.cancellation().cancel("shutting down");

    let result = graph.run(tools(&["nodejs"])).await.unwrap();

    assert!(result.cancelled);
    assert_eq!(result.cancel_reason.as_deref(), Some("shutting down"));
    assert_eq!(result.report, "");
    assert_eq!(h.search.call_count(), 0);
    assert_eq!(h.sink.count("pipeline.cancelled"), 1);
}

/// A fetcher that cancels the run while its stage is in flight.
struct CancellingFetcher {
    token: Arc<CancellationToken>,
}

#[async_trait]
impl PageFetcher for CancellingFetcher {
    async fn fetch(&self, _url: &str) -> Result<String, FetchError> {
        self.token.cancel("operator abort");
        Ok("fetched before the checkpoint".to_string())
    }
}

#[tokio::test]
async fn cancellation_mid_run_stops_at_next_dispatch() {
    let h = Harness::new();
    let token = Arc::new(CancellationToken::new());
    h.search
        .push_results(vec![CandidateSource::new("https://x", "Docs")]);
    h.extractor.push_record(ToolRecord::new());

    let graph = StageGraph::builder()
        .search_client(h.search.clone())
        .page_fetcher(Arc::new(CancellingFetcher {
            token: Arc::clone(&token),
        }))
        .extractor(h.extractor.clone())
        .event_sink(h.sink.clone())
        .cancellation(Arc::clone(&token))
        .build()
        .unwrap();

    let result = graph.run(tools(&["nodejs", "k9s"])).await.unwrap();

    // The in-flight pass for nodejs completed; k9s never started
    assert!(result.cancelled);
    assert_eq!(result.tools_processed, 1);
    assert_eq!(h.search.calls(), vec!["nodejs".to_string()]);
    assert_eq!(h.extractor.call_count(), 1);
    // Cancelled runs never reach compile, so there is no report
    assert_eq!(result.report, "");
    assert_eq!(h.sink.stage_visits("compile"), 0);
}

#[tokio::test]
async fn persistence_failure_is_a_warning_not_an_error() {
    let h = Harness::new();
    let blocker = h._outdir.path().join("blocker");
    std::fs::write(&blocker, "a file where the output dir should be").unwrap();

    let graph = StageGraph::builder()
        .search_client(h.search.clone())
        .page_fetcher(h.fetcher.clone())
        .extractor(h.extractor.clone())
        .event_sink(h.sink.clone())
        .report_writer(ReportWriter::new(
            ReportConfig::new().with_output_dir(&blocker),
        ))
        .build()
        .unwrap();

    let result = graph.run(tools(&["toolA"])).await.unwrap();

    assert!(result.artifact_path.is_none());
    assert_eq!(result.warnings.len(), 1);
    assert!(result.report.contains("## toolA"));
    assert_eq!(h.sink.count("report.persist_failed"), 1);
}

#[tokio::test]
async fn every_input_tool_appears_in_the_report() {
    let h = Harness::new();
    // No scripted responses at all: every tool degrades to the sentinel
    let names = ["alpha", "beta", "gamma"];
    let result = h.graph().run(tools(&names)).await.unwrap();

    assert_eq!(result.tools_processed, names.len());
    for name in names {
        assert!(result.report.contains(&format!("## {name}")));
    }
}
