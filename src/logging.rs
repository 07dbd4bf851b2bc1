//! Logging setup for the report CLI.
//!
//! Warnings are the delivery channel for every non-fatal condition in the
//! pipelines, so logging goes to stderr unconditionally; `RUST_LOG`
//! overrides the default `info` filter.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(true),
        )
        .init();
}
