//! Host implementation of [`Filesystem`] for platforms without the Unix APIs.
//!
//! Only stat is available, served from [`std::fs::Metadata`]. Symlink targets,
//! extended attributes and security labels report `Unsupported`.

use std::fs;
use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use super::{Filesystem, XattrTarget};
use crate::stat::{FileStat, FileType, Timespec};

/// [`Filesystem`] backed by the standard library.
#[derive(Clone, Copy, Debug, Default)]
pub struct HostFilesystem;

impl HostFilesystem {
    /// Creates a handle to the host filesystem.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn unsupported(what: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::Unsupported,
        format!("{what} is not supported on this platform"),
    )
}

fn timespec(time: io::Result<SystemTime>) -> Timespec {
    time.ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map_or_else(Timespec::default, |elapsed| Timespec {
            seconds: i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX),
            nanoseconds: elapsed.subsec_nanos(),
        })
}

fn file_stat(metadata: &fs::Metadata) -> FileStat {
    let file_type = metadata.file_type();
    let file_type = if file_type.is_symlink() {
        FileType::Symlink
    } else if file_type.is_dir() {
        FileType::Directory
    } else if file_type.is_file() {
        FileType::Regular
    } else {
        FileType::Unknown
    };

    FileStat {
        file_type,
        mode: 0,
        uid: 0,
        gid: 0,
        size: metadata.len(),
        dev: 0,
        inode: 0,
        nlink: 1,
        rdev: 0,
        blocks: 0,
        block_size: 0,
        accessed: timespec(metadata.accessed()),
        modified: timespec(metadata.modified()),
        changed: timespec(metadata.modified()),
    }
}

impl Filesystem for HostFilesystem {
    fn stat(&self, path: &Path, follow_symlinks: bool) -> io::Result<FileStat> {
        let metadata = if follow_symlinks {
            fs::metadata(path)?
        } else {
            fs::symlink_metadata(path)?
        };
        Ok(file_stat(&metadata))
    }

    fn read_link(&self, _path: &Path, _buffer: &mut [u8]) -> io::Result<usize> {
        Err(unsupported("reading symlink targets"))
    }

    fn list_xattrs(&self, _target: XattrTarget<'_>, _buffer: &mut [u8]) -> io::Result<usize> {
        Err(unsupported("listing extended attributes"))
    }

    fn get_xattr(
        &self,
        _target: XattrTarget<'_>,
        _name: &[u8],
        _buffer: &mut [u8],
    ) -> io::Result<usize> {
        Err(unsupported("reading extended attributes"))
    }

    fn security_labels_enabled(&self) -> bool {
        false
    }
}
