//! Tracing setup for embedders.

use tracing_subscriber::EnvFilter;

/// Initializes a process-wide fmt subscriber honoring `RUST_LOG`.
///
/// Falls back to `info` when no filter is set in the environment. Safe to
/// call more than once; later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing();
        init_tracing();
        tracing::debug!("still alive");
    }
}
