//! Logging setup.
//!
//! The engine emits `tracing` events; nothing is printed unless the host
//! installs a subscriber. These helpers install a `tracing-subscriber`
//! formatter filtered by `RUST_LOG`.
//!
//! # Levels
//! - `info`: run start/end and aggregate counts
//! - `debug`: per-exam placements, evictions, under-used slots
//! - `warn`: exams left unplaced after repair

use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber. `RUST_LOG` overrides the `info` default,
/// e.g. `RUST_LOG=u_examplan=debug`.
///
/// ```no_run
/// u_examplan::logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .init();
}

/// Installs a debug-level subscriber writing through the test harness.
/// Safe to call from several tests.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
