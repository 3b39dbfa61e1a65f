//! Operating-system seam used by every collector.
//!
//! All OS calls issued by the crate go through [`Filesystem`]. The buffer
//! based methods follow the kernel conventions the collectors are written
//! against: an empty buffer asks for the required size, a short buffer fails
//! with `ERANGE`, and a successful call returns the number of bytes written.

use std::io;
#[cfg(unix)]
use std::os::fd::BorrowedFd;
use std::path::Path;

use crate::stat::FileStat;

#[cfg(unix)]
mod unix;
#[cfg(not(unix))]
mod unsupported;

#[cfg(unix)]
pub use self::unix::HostFilesystem;
#[cfg(not(unix))]
pub use self::unsupported::HostFilesystem;

/// Object whose extended attributes are read.
#[derive(Clone, Copy, Debug)]
pub enum XattrTarget<'a> {
    /// A path, resolved with or without following a final symlink.
    Path {
        /// Path of the target.
        path: &'a Path,
        /// Use the symlink-following variant of the call.
        follow_symlinks: bool,
    },
    /// An already open descriptor.
    #[cfg(unix)]
    Descriptor(BorrowedFd<'a>),
}

impl<'a> XattrTarget<'a> {
    /// Targets `path`, following a final symlink when `follow_symlinks` is set.
    #[must_use]
    pub const fn path(path: &'a Path, follow_symlinks: bool) -> Self {
        Self::Path {
            path,
            follow_symlinks,
        }
    }
}

/// Blocking metadata calls the collectors rely on.
///
/// Implementations must be usable from several threads at once when they are
/// `Sync`; the collectors never hold state between calls.
pub trait Filesystem {
    /// Returns metadata for `path`, following a final symlink when requested.
    fn stat(&self, path: &Path, follow_symlinks: bool) -> io::Result<FileStat>;

    /// Returns metadata for an open descriptor.
    #[cfg(unix)]
    fn fstat(&self, fd: BorrowedFd<'_>) -> io::Result<FileStat>;

    /// Reads the target of the symlink at `path` into `buffer`.
    ///
    /// Returns the number of bytes written; a result equal to the buffer length
    /// means the target may have been truncated.
    fn read_link(&self, path: &Path, buffer: &mut [u8]) -> io::Result<usize>;

    /// Lists extended attribute names as NUL-terminated entries.
    fn list_xattrs(&self, target: XattrTarget<'_>, buffer: &mut [u8]) -> io::Result<usize>;

    /// Reads the value of the extended attribute `name`.
    fn get_xattr(
        &self,
        target: XattrTarget<'_>,
        name: &[u8],
        buffer: &mut [u8],
    ) -> io::Result<usize>;

    /// Reports whether mandatory access control labels are available.
    fn security_labels_enabled(&self) -> bool;
}

impl<F: Filesystem + ?Sized> Filesystem for &F {
    fn stat(&self, path: &Path, follow_symlinks: bool) -> io::Result<FileStat> {
        (**self).stat(path, follow_symlinks)
    }

    #[cfg(unix)]
    fn fstat(&self, fd: BorrowedFd<'_>) -> io::Result<FileStat> {
        (**self).fstat(fd)
    }

    fn read_link(&self, path: &Path, buffer: &mut [u8]) -> io::Result<usize> {
        (**self).read_link(path, buffer)
    }

    fn list_xattrs(&self, target: XattrTarget<'_>, buffer: &mut [u8]) -> io::Result<usize> {
        (**self).list_xattrs(target, buffer)
    }

    fn get_xattr(
        &self,
        target: XattrTarget<'_>,
        name: &[u8],
        buffer: &mut [u8],
    ) -> io::Result<usize> {
        (**self).get_xattr(target, name, buffer)
    }

    fn security_labels_enabled(&self) -> bool {
        (**self).security_labels_enabled()
    }
}

/// Reports whether `error` is the "buffer too small" failure.
#[must_use]
pub fn is_buffer_too_small(error: &io::Error) -> bool {
    #[cfg(unix)]
    {
        error.raw_os_error() == Some(libc::ERANGE)
    }
    #[cfg(not(unix))]
    {
        let _ = error;
        false
    }
}
