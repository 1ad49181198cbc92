//! Persistence of the rendered report.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::errors::PersistenceError;
use crate::utils::{artifact_timestamp, Timestamp};

/// Configuration for report persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory the artifact is written to, created on demand.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// File name prefix for the artifact.
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./results")
}

fn default_file_prefix() -> String {
    "tool_guide".to_string()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            file_prefix: default_file_prefix(),
        }
    }
}

impl ReportConfig {
    /// Creates a new report configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output directory.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Sets the file name prefix.
    #[must_use]
    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }
}

/// Writes the rendered report to durable storage.
#[derive(Debug, Clone, Default)]
pub struct ReportWriter {
    config: ReportConfig,
}

impl ReportWriter {
    /// Creates a new writer.
    #[must_use]
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// The artifact path for a run that started at `at`.
    ///
    /// The timestamp component makes names unique per run.
    #[must_use]
    pub fn artifact_path(&self, at: Timestamp) -> PathBuf {
        let name = format!("{}_{}.md", self.config.file_prefix, artifact_timestamp(at));
        self.config.output_dir.join(name)
    }

    /// Persists `report` and returns the written path.
    ///
    /// The output directory is created when missing. Failures carry the
    /// target path so the caller can surface a useful warning.
    pub fn write(&self, report: &str, at: Timestamp) -> Result<PathBuf, PersistenceError> {
        let path = self.artifact_path(at);

        std::fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| persistence_error(&path, &e))?;
        std::fs::write(&path, report).map_err(|e| persistence_error(&path, &e))?;

        info!(path = %path.display(), bytes = report.len(), "report persisted");
        Ok(path)
    }
}

fn persistence_error(path: &Path, err: &std::io::Error) -> PersistenceError {
    PersistenceError::new(path.display().to_string(), err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn fixed_time() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 8, 6, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_artifact_path_shape() {
        let writer = ReportWriter::new(
            ReportConfig::new()
                .with_output_dir("/tmp/reports")
                .with_file_prefix("guide"),
        );

        let path = writer.artifact_path(fixed_time());
        assert_eq!(path, PathBuf::from("/tmp/reports/guide_20260806_093000.md"));
    }

    #[test]
    fn test_write_creates_directory_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("results");
        let writer = ReportWriter::new(ReportConfig::new().with_output_dir(&out));

        let path = writer.write("# Report\n", fixed_time()).unwrap();

        assert!(path.starts_with(&out));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Report\n");
    }

    #[test]
    fn test_write_failure_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file, not a directory").unwrap();

        let writer = ReportWriter::new(ReportConfig::new().with_output_dir(&blocker));
        let err = writer.write("# Report\n", fixed_time()).unwrap_err();

        assert!(err.path.contains("blocker"));
    }
}
