//! The workflow state machine and its stages.

mod graph;
mod stages;

#[cfg(test)]
mod integration_tests;

pub use graph::{RunIdentity, RunResult, StageGraph, StageGraphBuilder, WorkflowStage};
