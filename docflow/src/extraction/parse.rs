//! Parsing and validation of model output.
//!
//! Models asked for "only JSON" still wrap their answer in markdown fences
//! or pad it with prose often enough that parsing has to be lenient. The
//! contract here: either the output yields a record that passes shape
//! validation, or the caller gets `None` and substitutes the sentinel.

use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

use crate::state::{ToolRecord, UNKNOWN_VERSION};

fn fenced_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    RE.get_or_init(|| {
        Regex::new(r"(?s)```(?:json)?\s*(.*?)```").expect("static pattern is valid")
    })
}

/// Unwraps a markdown code fence around the payload, if present.
///
/// Returns the fenced body when the output contains one, otherwise the
/// trimmed input.
#[must_use]
pub fn strip_code_fences(output: &str) -> &str {
    match fenced_block().captures(output) {
        Some(caps) => caps.get(1).map_or(output, |m| m.as_str()).trim(),
        None => output.trim(),
    }
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default)]
    install_steps: Vec<String>,
    #[serde(default)]
    update_steps: Vec<String>,
    #[serde(default)]
    version: String,
    #[serde(default)]
    requirements: Vec<String>,
    #[serde(default)]
    notes: String,
}

/// Parses model output into a validated [`ToolRecord`].
///
/// Returns `None` when the output is not a JSON object of the expected
/// shape. Missing fields default; an absent or blank version becomes
/// `"unknown"`.
#[must_use]
pub fn parse_record(output: &str) -> Option<ToolRecord> {
    let payload = strip_code_fences(output);
    let raw: RawRecord = serde_json::from_str(payload).ok()?;

    let version = if raw.version.trim().is_empty() {
        UNKNOWN_VERSION.to_string()
    } else {
        raw.version.trim().to_string()
    };

    Some(ToolRecord {
        install_steps: normalize_steps(raw.install_steps),
        update_steps: normalize_steps(raw.update_steps),
        version,
        requirements: normalize_steps(raw.requirements),
        notes: raw.notes.trim().to_string(),
    })
}

/// Drops blank entries and trims the rest.
fn normalize_steps(steps: Vec<String>) -> Vec<String> {
    steps
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
