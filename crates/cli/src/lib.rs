#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! Command-line front end for the `fileinfo` crate.
//!
//! # Overview
//!
//! [`run`] parses the arguments, installs logging, queries every path with
//! [`fileinfo::MetadataCollector`] and renders each bag to stdout. It never
//! touches the process streams directly so tests can drive it with in-memory
//! buffers.
//!
//! # Exit codes
//!
//! - `0`: every path was described.
//! - `1`: at least one path failed; each failure is reported on stderr as
//!   `fileinfo-query: <error>` and the remaining paths are still processed.
//! - `2`: the command line could not be parsed.

mod config;
mod logging;
mod render;

use std::env;
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::error::ErrorKind;
use fileinfo::{AttributeBag, FileInfoError, MetadataCollector, RequestSpec};
use tracing::debug;

pub use crate::config::{
    DEFAULT_ATTRIBUTES, LOG_ENV, OutputFormat, PROGRAM_NAME, QueryConfig, parse_args,
};
pub use crate::logging::{build_filter, init_logging, verbosity_directive};
pub use crate::render::write_bag;

/// Every path was described.
pub const EXIT_SUCCESS: i32 = 0;
/// At least one path could not be described.
pub const EXIT_FAILURE: i32 = 1;
/// The command line was rejected.
pub const EXIT_USAGE: i32 = 2;

/// Failure to describe a single path.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The metadata query failed.
    #[error(transparent)]
    Query(#[from] FileInfoError),
    /// The path could not be opened for a descriptor query.
    #[error("cannot open '{}': {source}", .path.display())]
    Open {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Descriptor queries are not available on this platform.
    #[error("descriptor queries are not supported on this platform")]
    DescriptorUnsupported,
}

/// Runs the CLI using the provided argument iterator and output handles.
///
/// Returns the process exit code. `FILEINFO_LOG` is read from the process
/// environment.
pub fn run<I, S, Out, Err>(arguments: I, stdout: &mut Out, stderr: &mut Err) -> i32
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
    Out: Write,
    Err: Write,
{
    match parse_args(arguments, env::var(LOG_ENV).ok()) {
        Ok(config) => execute(&config, stdout, stderr),
        Err(error) => report_usage(&error, stdout, stderr),
    }
}

/// Converts a numeric exit code into an [`ExitCode`].
#[must_use]
pub fn exit_code_from(status: i32) -> ExitCode {
    ExitCode::from(status.clamp(0, i32::from(u8::MAX)) as u8)
}

fn report_usage<Out, Err>(error: &clap::Error, stdout: &mut Out, stderr: &mut Err) -> i32
where
    Out: Write,
    Err: Write,
{
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            if write!(stdout, "{error}").is_err() {
                return EXIT_FAILURE;
            }
            EXIT_SUCCESS
        }
        _ => {
            let _ = write!(stderr, "{error}");
            EXIT_USAGE
        }
    }
}

/// Queries every configured path and renders the results.
pub fn execute<Out, Err>(config: &QueryConfig, stdout: &mut Out, stderr: &mut Err) -> i32
where
    Out: Write,
    Err: Write,
{
    if let Err(error) = init_logging(config) {
        let _ = writeln!(stderr, "{PROGRAM_NAME}: ignoring invalid {LOG_ENV}: {error}");
    }

    let request = config.request();
    let collector = MetadataCollector::new();
    let mut status = EXIT_SUCCESS;

    for path in &config.paths {
        match describe(&collector, config, &request, path) {
            Ok(bag) => {
                if let Err(error) = write_bag(stdout, config.format, path, &bag) {
                    let _ = writeln!(stderr, "{PROGRAM_NAME}: write error: {error}");
                    return EXIT_FAILURE;
                }
            }
            Err(error) => {
                debug!(target: "cli", path = %path.display(), %error, "query failed");
                let _ = writeln!(stderr, "{PROGRAM_NAME}: {error}");
                status = EXIT_FAILURE;
            }
        }
    }
    status
}

fn describe(
    collector: &MetadataCollector,
    config: &QueryConfig,
    request: &RequestSpec,
    path: &Path,
) -> Result<AttributeBag, QueryError> {
    if config.use_descriptor {
        return describe_descriptor(collector, config, request, path);
    }
    Ok(collector.collect_request(path, request, config.follow_symlinks)?)
}

/// Opens `path` (following symlinks) and queries the descriptor.
#[cfg(unix)]
fn describe_descriptor(
    collector: &MetadataCollector,
    config: &QueryConfig,
    request: &RequestSpec,
    path: &Path,
) -> Result<AttributeBag, QueryError> {
    use std::os::fd::AsFd;

    let file = std::fs::File::open(path).map_err(|source| QueryError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(collector.collect_fd(file.as_fd(), request.flags(), &config.attributes)?)
}

#[cfg(not(unix))]
fn describe_descriptor(
    _collector: &MetadataCollector,
    _config: &QueryConfig,
    _request: &RequestSpec,
    _path: &Path,
) -> Result<AttributeBag, QueryError> {
    Err(QueryError::DescriptorUnsupported)
}
