//! Argument parsing into a [`QueryConfig`].

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Arg, ArgAction, Command, value_parser};
use fileinfo::RequestSpec;

/// Name used in diagnostics and help output.
pub const PROGRAM_NAME: &str = "fileinfo-query";

/// Attribute request used when `--attributes` is not given.
pub const DEFAULT_ATTRIBUTES: &str = "standard:*,stat:*";

/// Environment variable holding a log filter directive.
pub const LOG_ENV: &str = "FILEINFO_LOG";

/// How collected bags are written to stdout.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OutputFormat {
    /// One `key: value` line per attribute under a `path:` header.
    #[default]
    Text,
    /// One JSON object per path and line.
    Json,
}

/// Fully resolved settings for one invocation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QueryConfig {
    /// Attribute request string.
    pub attributes: String,
    /// Describe the target of a final symlink instead of the link.
    pub follow_symlinks: bool,
    /// Open each path and query the descriptor.
    pub use_descriptor: bool,
    /// Output format.
    pub format: OutputFormat,
    /// Number of `-v` flags.
    pub verbosity: u8,
    /// Filter directive taken from [`LOG_ENV`], overriding `verbosity`.
    pub log_filter: Option<String>,
    /// Paths to query, in command-line order.
    pub paths: Vec<PathBuf>,
}

impl QueryConfig {
    /// Parses the attribute request.
    #[must_use]
    pub fn request(&self) -> RequestSpec {
        RequestSpec::parse(&self.attributes)
    }
}

fn clap_command() -> Command {
    Command::new(PROGRAM_NAME)
        .version(env!("CARGO_PKG_VERSION"))
        .about("Print filesystem metadata for each PATH.")
        .arg(
            Arg::new("attributes")
                .long("attributes")
                .short('a')
                .value_name("SPEC")
                .default_value(DEFAULT_ATTRIBUTES)
                .help("Comma separated attribute request, e.g. 'stat:size,xattr:*'."),
        )
        .arg(
            Arg::new("follow-symlinks")
                .long("follow-symlinks")
                .short('L')
                .help("Describe the target of a symlink instead of the link itself.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("fd")
                .long("fd")
                .help("Open each path and query the open descriptor.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print one JSON object per path.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Increase log verbosity; may be repeated.")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("paths")
                .value_name("PATH")
                .required(true)
                .num_args(1..)
                .action(ArgAction::Append)
                .value_parser(value_parser!(PathBuf)),
        )
}

/// Parses `arguments` (program name first) into a [`QueryConfig`].
///
/// `log_filter` is the value of [`LOG_ENV`], passed in so parsing never reads
/// the process environment.
pub fn parse_args<I, S>(
    arguments: I,
    log_filter: Option<String>,
) -> Result<QueryConfig, clap::Error>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    let mut args: Vec<OsString> = arguments.into_iter().map(Into::into).collect();
    if args.is_empty() {
        args.push(OsString::from(PROGRAM_NAME));
    }

    let mut matches = clap_command().try_get_matches_from(args)?;

    let attributes = matches
        .remove_one::<String>("attributes")
        .unwrap_or_else(|| DEFAULT_ATTRIBUTES.to_owned());
    let format = if matches.get_flag("json") {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let paths = matches
        .remove_many::<PathBuf>("paths")
        .map(Iterator::collect)
        .unwrap_or_default();

    Ok(QueryConfig {
        attributes,
        follow_symlinks: matches.get_flag("follow-symlinks"),
        use_descriptor: matches.get_flag("fd"),
        format,
        verbosity: matches.get_count("verbose"),
        log_filter: log_filter.filter(|filter| !filter.trim().is_empty()),
        paths,
    })
}
