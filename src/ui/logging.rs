//! ui::logging
//!
//! Install the `tracing` subscriber for the CLI.
//!
//! # Filter Precedence
//!
//! 1. `RUST_LOG`, when set and parseable
//! 2. `--debug` → `debug`
//! 3. `--quiet` → `warn`
//! 4. The configured `logging.level`

use tracing_subscriber::EnvFilter;

use super::output::Verbosity;

/// Pick the filter directive for the given flags and configured level.
///
/// `RUST_LOG` is handled separately by [`init`].
pub fn directive(verbosity: Verbosity, configured: &str) -> String {
    match verbosity {
        Verbosity::Debug => "debug".to_string(),
        Verbosity::Quiet => "warn".to_string(),
        Verbosity::Normal => configured.to_string(),
    }
}

/// Install a stderr `fmt` subscriber.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init(verbosity: Verbosity, configured: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive(verbosity, configured)));

    // Already installed (e.g. by a test harness) is fine
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}
