//! Testing utilities for workflow runs.
//!
//! This module provides:
//! - Scripted collaborator doubles with call recording
//! - A recording event sink for asserting on stage transitions

mod mocks;

pub use mocks::{
    RecordingEventSink, ScriptedExtractor, ScriptedFetcher, ScriptedSearchClient,
};
