//! Output of collected attribute bags.

use std::borrow::Cow;
use std::io::{self, Write};
use std::path::Path;

use fileinfo::AttributeBag;
use serde::Serialize;

use crate::config::OutputFormat;

#[derive(Serialize)]
struct Record<'a> {
    path: Cow<'a, str>,
    attributes: &'a AttributeBag,
}

/// Writes `bag` for `path` to `out` in the requested format.
pub fn write_bag<W: Write + ?Sized>(
    out: &mut W,
    format: OutputFormat,
    path: &Path,
    bag: &AttributeBag,
) -> io::Result<()> {
    match format {
        OutputFormat::Text => write_text(out, path, bag),
        OutputFormat::Json => write_json(out, path, bag),
    }
}

fn write_text<W: Write + ?Sized>(out: &mut W, path: &Path, bag: &AttributeBag) -> io::Result<()> {
    writeln!(out, "{}:", path.display())?;
    for (key, value) in bag {
        writeln!(out, "  {key}: {value}")?;
    }
    Ok(())
}

fn write_json<W: Write + ?Sized>(out: &mut W, path: &Path, bag: &AttributeBag) -> io::Result<()> {
    let record = Record {
        path: path.to_string_lossy(),
        attributes: bag,
    };
    serde_json::to_writer(&mut *out, &record)?;
    writeln!(out)
}
