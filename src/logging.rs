//! Tracing setup shared by every binary. Logs go to stderr; stdout carries JSON output only.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn";

/// Installs the global subscriber, honouring `RUST_LOG`. Safe to call more than once.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
