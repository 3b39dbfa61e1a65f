use std::io;
use std::path::{Path, PathBuf};

/// Error returned when the primary metadata call for a target fails.
///
/// Only the stat family of calls produces this error. Failures while reading
/// symlink targets, extended attributes, or security labels are absorbed by the
/// collectors and simply leave the corresponding key out of the bag.
#[derive(Debug, thiserror::Error)]
pub enum FileInfoError {
    /// `stat`/`lstat` failed for a path.
    #[error("error stating file '{}': {source}", .path.display())]
    Stat {
        /// Path whose metadata could not be retrieved.
        path: PathBuf,
        /// Underlying error emitted by the operating system.
        #[source]
        source: io::Error,
    },
    /// `fstat` failed for an open descriptor.
    #[error("error stating descriptor {fd}: {source}")]
    DescriptorStat {
        /// Raw descriptor number, kept for diagnostics only.
        fd: i32,
        /// Underlying error emitted by the operating system.
        #[source]
        source: io::Error,
    },
}

impl FileInfoError {
    pub(crate) fn stat(path: &Path, source: io::Error) -> Self {
        Self::Stat {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn descriptor_stat(fd: i32, source: io::Error) -> Self {
        Self::DescriptorStat { fd, source }
    }

    /// Returns the domain classification of the failure.
    #[must_use]
    pub fn kind(&self) -> FileInfoErrorKind {
        FileInfoErrorKind::from_io_error(self.source_error())
    }

    /// Returns the path involved in the failing call, if the call was path based.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Stat { path, .. } => Some(path),
            Self::DescriptorStat { .. } => None,
        }
    }

    /// Returns the raw OS error code attached to the failure.
    #[must_use]
    pub fn raw_os_error(&self) -> Option<i32> {
        self.source_error().raw_os_error()
    }

    /// Returns the underlying [`io::Error`].
    #[must_use]
    pub fn source_error(&self) -> &io::Error {
        match self {
            Self::Stat { source, .. } | Self::DescriptorStat { source, .. } => source,
        }
    }
}

/// Classification of stat failures surfaced to callers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FileInfoErrorKind {
    /// The target does not exist.
    NotFound,
    /// Search or read permission was denied.
    PermissionDenied,
    /// A path component is not a directory.
    NotADirectory,
    /// The path or one of its components is too long.
    NameTooLong,
    /// Too many symbolic links were encountered while resolving the path.
    SymlinkLoop,
    /// The descriptor is not valid.
    BadDescriptor,
    /// The path cannot be passed to the OS (for example it contains NUL).
    InvalidFilename,
    /// Any other I/O failure.
    Io,
}

impl FileInfoErrorKind {
    /// Maps an [`io::Error`] onto a kind, preferring the raw errno when present.
    #[must_use]
    pub fn from_io_error(error: &io::Error) -> Self {
        if let Some(kind) = error.raw_os_error().and_then(Self::from_errno) {
            return kind;
        }

        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            io::ErrorKind::InvalidInput => Self::InvalidFilename,
            _ => Self::Io,
        }
    }

    #[cfg(unix)]
    fn from_errno(code: i32) -> Option<Self> {
        Some(match code {
            libc::ENOENT => Self::NotFound,
            libc::EACCES | libc::EPERM => Self::PermissionDenied,
            libc::ENOTDIR => Self::NotADirectory,
            libc::ENAMETOOLONG => Self::NameTooLong,
            libc::ELOOP => Self::SymlinkLoop,
            libc::EBADF => Self::BadDescriptor,
            _ => Self::Io,
        })
    }

    #[cfg(not(unix))]
    fn from_errno(_code: i32) -> Option<Self> {
        None
    }

    /// Returns a short lowercase label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not-found",
            Self::PermissionDenied => "permission-denied",
            Self::NotADirectory => "not-a-directory",
            Self::NameTooLong => "name-too-long",
            Self::SymlinkLoop => "symlink-loop",
            Self::BadDescriptor => "bad-descriptor",
            Self::InvalidFilename => "invalid-filename",
            Self::Io => "io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn stat_error_display_names_path_and_cause() {
        let error = FileInfoError::stat(
            Path::new("/missing"),
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(error.to_string(), "error stating file '/missing': gone");
        assert_eq!(error.path(), Some(Path::new("/missing")));
    }

    #[test]
    fn descriptor_error_has_no_path() {
        let error = FileInfoError::descriptor_stat(7, io::Error::other("boom"));
        assert_eq!(error.to_string(), "error stating descriptor 7: boom");
        assert!(error.path().is_none());
        assert_eq!(error.kind(), FileInfoErrorKind::Io);
    }

    #[cfg(unix)]
    #[test]
    fn kind_follows_raw_errno() {
        let cases = [
            (libc::ENOENT, FileInfoErrorKind::NotFound),
            (libc::EACCES, FileInfoErrorKind::PermissionDenied),
            (libc::ENOTDIR, FileInfoErrorKind::NotADirectory),
            (libc::ELOOP, FileInfoErrorKind::SymlinkLoop),
            (libc::EBADF, FileInfoErrorKind::BadDescriptor),
            (libc::EIO, FileInfoErrorKind::Io),
        ];
        for (code, expected) in cases {
            let error = FileInfoError::stat(Path::new("p"), io::Error::from_raw_os_error(code));
            assert_eq!(error.kind(), expected, "errno {code}");
            assert_eq!(error.raw_os_error(), Some(code));
        }
    }

    #[test]
    fn invalid_input_maps_to_invalid_filename() {
        let error = io::Error::new(io::ErrorKind::InvalidInput, "nul byte");
        assert_eq!(
            FileInfoErrorKind::from_io_error(&error),
            FileInfoErrorKind::InvalidFilename
        );
    }

    #[test]
    fn source_exposes_io_error() {
        let error = FileInfoError::stat(Path::new("p"), io::Error::other("inner"));
        let source = error
            .source()
            .and_then(|err| err.downcast_ref::<io::Error>())
            .expect("stat error should expose the underlying io::Error");
        assert_eq!(source.to_string(), "inner");
    }
}
