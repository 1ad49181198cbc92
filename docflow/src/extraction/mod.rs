//! Structured extraction of install/update documentation.
//!
//! This module provides:
//! - Configuration for the extraction model
//! - The protocol trait the stage graph consumes
//! - Parsing and validation of model output, with sentinel fallback
//! - An extractor backed by an Ollama-style HTTP endpoint

mod config;
mod llm;
mod parse;
mod protocols;

pub use config::ExtractionConfig;
pub use llm::LlmExtractor;
pub use parse::{parse_record, strip_code_fences};
pub use protocols::StructuredExtractor;
