//! # Logging
//!
//! `tracing` subscriber setup. The filter comes from `RUST_LOG`; without it
//! the service logs at `info` and its own crates at `debug`.
//!
//! Logs go to stderr: stdout carries command output (the CLI prints JSON).

use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "info,proposta=debug";

/// Installs the global subscriber.
///
/// ```no_run
/// proposta_service::logging::init();
/// tracing::info!("service starting");
/// ```
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .init();
}

/// Subscriber for tests: captured by the test harness, safe to call repeatedly.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
