#![allow(unsafe_code)]

//! Host implementation of [`Filesystem`] for Unix platforms.
//!
//! Stat calls go through `rustix`. Symlink and extended attribute reads use
//! `libc` directly because the collectors drive the buffer sizing themselves
//! and need the raw `ERANGE` and size-query behaviour of the syscalls.

use std::ffi::CString;
use std::io;
use std::os::fd::{AsRawFd, BorrowedFd};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use super::{Filesystem, XattrTarget};
use crate::selinux;
use crate::stat::{FileStat, Timespec};

/// [`Filesystem`] backed by the running kernel.
#[derive(Clone, Copy, Debug, Default)]
pub struct HostFilesystem;

impl HostFilesystem {
    /// Creates a handle to the host filesystem.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn c_string(bytes: &[u8]) -> io::Result<CString> {
    CString::new(bytes).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "path or attribute name contains an interior NUL byte",
        )
    })
}

fn c_path(path: &Path) -> io::Result<CString> {
    c_string(path.as_os_str().as_bytes())
}

fn check_size(result: libc::ssize_t) -> io::Result<usize> {
    usize::try_from(result).map_err(|_| io::Error::last_os_error())
}

fn timespec(seconds: i64, nanoseconds: i64) -> Timespec {
    Timespec {
        seconds,
        nanoseconds: nanoseconds.clamp(0, 999_999_999) as u32,
    }
}

impl From<rustix::fs::Stat> for FileStat {
    fn from(stat: rustix::fs::Stat) -> Self {
        let mode = stat.st_mode as u32;
        Self {
            file_type: crate::stat::FileType::from_mode(mode),
            mode,
            uid: stat.st_uid as u32,
            gid: stat.st_gid as u32,
            size: stat.st_size as u64,
            dev: stat.st_dev as u64,
            inode: stat.st_ino as u64,
            nlink: stat.st_nlink as u64,
            rdev: stat.st_rdev as u64,
            blocks: stat.st_blocks as u64,
            block_size: stat.st_blksize as u32,
            accessed: timespec(stat.st_atime as i64, stat.st_atime_nsec as i64),
            modified: timespec(stat.st_mtime as i64, stat.st_mtime_nsec as i64),
            changed: timespec(stat.st_ctime as i64, stat.st_ctime_nsec as i64),
        }
    }
}

impl Filesystem for HostFilesystem {
    fn stat(&self, path: &Path, follow_symlinks: bool) -> io::Result<FileStat> {
        let stat = if follow_symlinks {
            rustix::fs::stat(path)
        } else {
            rustix::fs::lstat(path)
        }
        .map_err(io::Error::from)?;
        Ok(FileStat::from(stat))
    }

    fn fstat(&self, fd: BorrowedFd<'_>) -> io::Result<FileStat> {
        let stat = rustix::fs::fstat(fd).map_err(io::Error::from)?;
        Ok(FileStat::from(stat))
    }

    fn read_link(&self, path: &Path, buffer: &mut [u8]) -> io::Result<usize> {
        let path = c_path(path)?;
        // SAFETY: `path` is NUL terminated and `buffer` is valid for writes of
        // `buffer.len()` bytes.
        let result = unsafe {
            libc::readlink(
                path.as_ptr(),
                buffer.as_mut_ptr().cast::<libc::c_char>(),
                buffer.len(),
            )
        };
        check_size(result)
    }

    fn list_xattrs(&self, target: XattrTarget<'_>, buffer: &mut [u8]) -> io::Result<usize> {
        xattr_sys::list(target, buffer)
    }

    fn get_xattr(
        &self,
        target: XattrTarget<'_>,
        name: &[u8],
        buffer: &mut [u8],
    ) -> io::Result<usize> {
        xattr_sys::get(target, &c_string(name)?, buffer)
    }

    fn security_labels_enabled(&self) -> bool {
        selinux::security_labels_available()
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
mod xattr_sys {
    use super::{AsRawFd, CString, XattrTarget, c_path, check_size, io};

    fn buffer_parts(buffer: &mut [u8]) -> (*mut libc::c_void, usize) {
        if buffer.is_empty() {
            (std::ptr::null_mut(), 0)
        } else {
            (buffer.as_mut_ptr().cast(), buffer.len())
        }
    }

    pub(super) fn list(target: XattrTarget<'_>, buffer: &mut [u8]) -> io::Result<usize> {
        let (ptr, len) = buffer_parts(buffer);
        let ptr = ptr.cast::<libc::c_char>();
        // SAFETY: `ptr` is null with a zero length or points to `len` writable
        // bytes; path arguments are NUL terminated C strings.
        let result = match target {
            XattrTarget::Path {
                path,
                follow_symlinks: true,
            } => {
                let path = c_path(path)?;
                unsafe { libc::listxattr(path.as_ptr(), ptr, len) }
            }
            XattrTarget::Path {
                path,
                follow_symlinks: false,
            } => {
                let path = c_path(path)?;
                unsafe { libc::llistxattr(path.as_ptr(), ptr, len) }
            }
            XattrTarget::Descriptor(fd) => unsafe { libc::flistxattr(fd.as_raw_fd(), ptr, len) },
        };
        check_size(result)
    }

    pub(super) fn get(
        target: XattrTarget<'_>,
        name: &CString,
        buffer: &mut [u8],
    ) -> io::Result<usize> {
        let (ptr, len) = buffer_parts(buffer);
        // SAFETY: as for `list`; `name` is NUL terminated.
        let result = match target {
            XattrTarget::Path {
                path,
                follow_symlinks: true,
            } => {
                let path = c_path(path)?;
                unsafe { libc::getxattr(path.as_ptr(), name.as_ptr(), ptr, len) }
            }
            XattrTarget::Path {
                path,
                follow_symlinks: false,
            } => {
                let path = c_path(path)?;
                unsafe { libc::lgetxattr(path.as_ptr(), name.as_ptr(), ptr, len) }
            }
            XattrTarget::Descriptor(fd) => unsafe {
                libc::fgetxattr(fd.as_raw_fd(), name.as_ptr(), ptr, len)
            },
        };
        check_size(result)
    }
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
mod xattr_sys {
    use super::{CString, XattrTarget, io};

    fn unsupported() -> io::Error {
        io::Error::new(
            io::ErrorKind::Unsupported,
            "extended attributes are not supported on this platform",
        )
    }

    pub(super) fn list(_target: XattrTarget<'_>, _buffer: &mut [u8]) -> io::Result<usize> {
        Err(unsupported())
    }

    pub(super) fn get(
        _target: XattrTarget<'_>,
        _name: &CString,
        _buffer: &mut [u8],
    ) -> io::Result<usize> {
        Err(unsupported())
    }
}
