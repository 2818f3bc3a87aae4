//! Diagnostic tracing for the SDR pipeline.
//!
//! Tracing goes to stderr and is controlled by `RUST_LOG`. Stdout carries
//! only the setup summary and the final report.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter built from `RUST_LOG`-style directives.
///
/// Unparseable directives are skipped rather than discarding the whole
/// filter; with no usable directive the level is `warn`.
fn filter_from(directives: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .parse_lossy(directives.unwrap_or_default())
}

/// Initialize the tracing subscriber. Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=sdr=debug sdr run --no-prompt
/// ```
pub fn init() {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::registry()
        .with(filter_from(directives.as_deref()))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}
