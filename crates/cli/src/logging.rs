//! Diagnostic logging setup.
//!
//! Events from the `fileinfo` crate are written to stderr through a
//! `tracing-subscriber` formatter. The filter comes from the `FILEINFO_LOG`
//! directive when one is set and from the `-v` count otherwise.

use std::io::{self, IsTerminal};

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;

use crate::config::QueryConfig;

/// Filter directive matching `verbosity` repetitions of `-v`.
#[must_use]
pub const fn verbosity_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "warn,fileinfo=debug,cli=debug",
        _ => "info,fileinfo=trace,cli=trace",
    }
}

/// Builds the filter for `config`.
///
/// Fails only when an explicit directive cannot be parsed.
pub fn build_filter(config: &QueryConfig) -> Result<EnvFilter, ParseError> {
    match config.log_filter.as_deref() {
        Some(directive) => EnvFilter::try_new(directive),
        None => Ok(EnvFilter::new(verbosity_directive(config.verbosity))),
    }
}

/// Installs the global subscriber.
///
/// An unparsable directive falls back to the verbosity level and returns the
/// parse error so the caller can report it. Installing twice is a no-op.
pub fn init_logging(config: &QueryConfig) -> Result<(), ParseError> {
    let (filter, outcome) = match build_filter(config) {
        Ok(filter) => (filter, Ok(())),
        Err(error) => (EnvFilter::new(verbosity_directive(config.verbosity)), Err(error)),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .with_ansi(io::stderr().is_terminal())
        .try_init();
    outcome
}
