//! Tracing subscriber setup
//!
//! Logs go to stderr so stdout carries only the balance CSV. `RUST_LOG`, when
//! set and valid, takes precedence over the level passed in.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber
///
/// Calling this more than once is harmless: later calls leave the first
/// subscriber in place.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| build_filter(level));

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_ansi(false);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init();
}

/// Filter for `level`, falling back to `warn` for unparseable input
fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
}
