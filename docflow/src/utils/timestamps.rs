//! Timestamp helpers for report rendering and artifact naming.

use chrono::{DateTime, Utc};

/// A UTC timestamp.
pub type Timestamp = DateTime<Utc>;

/// Returns the current UTC time as an ISO 8601 formatted string.
///
/// # Examples
///
/// ```
/// use docflow::utils::iso_timestamp;
///
/// let ts = iso_timestamp();
/// assert!(ts.contains('T'));
/// assert!(ts.ends_with("+00:00"));
/// ```
#[must_use]
pub fn iso_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f+00:00").to_string()
}

/// Formats a timestamp for use in artifact file names.
///
/// The format is filesystem-safe and sorts lexicographically:
/// `YYYYMMDD_HHMMSS`.
#[must_use]
pub fn artifact_timestamp(at: Timestamp) -> String {
    at.format("%Y%m%d_%H%M%S").to_string()
}
