//! Logging setup for PdfBuddy
//!
//! Structured `tracing` events go to stderr so stdout only carries answers.
//! `RUST_LOG` takes precedence over the verbosity flags.

use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::Verbosity;

/// Default filter directive for a verbosity level
pub fn default_directive(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::Quiet => "error",
        Verbosity::Normal => "warn",
        Verbosity::Verbose => "pdfbuddy=info,warn",
        Verbosity::VeryVerbose => "pdfbuddy=debug,info",
    }
}

/// Install the global subscriber; later calls are no-ops
pub fn init(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
