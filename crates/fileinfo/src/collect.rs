//! Orchestration of a single metadata query.

use std::ffi::OsStr;
#[cfg(unix)]
use std::os::fd::{AsRawFd, BorrowedFd};
use std::path::Path;

use tracing::{debug, trace};

use crate::attribute::{
    AttributeBag, AttributeValue, STANDARD_IS_HIDDEN, STANDARD_NAME, STANDARD_SYMLINK_TARGET,
};
use crate::error::FileInfoError;
use crate::matcher::AttributeMatcher;
use crate::os::{Filesystem, HostFilesystem};
use crate::request::{RequestFlags, RequestSpec};
use crate::selinux::collect_security_context;
use crate::stat::populate_from_stat;
use crate::symlink::resolve_symlink;
use crate::xattrs::collect_xattrs;

/// Builds attribute bags for paths and descriptors.
///
/// The collector holds no per-query state; one instance can serve a whole
/// directory listing, or several threads at once when `F` is `Sync`.
#[derive(Clone, Debug, Default)]
pub struct MetadataCollector<F = HostFilesystem> {
    fs: F,
}

impl MetadataCollector<HostFilesystem> {
    /// Creates a collector backed by the host filesystem.
    #[must_use]
    pub const fn new() -> Self {
        Self { fs: HostFilesystem }
    }
}

impl<F: Filesystem> MetadataCollector<F> {
    /// Creates a collector that issues its OS calls through `fs`.
    #[must_use]
    pub const fn with_filesystem(fs: F) -> Self {
        Self { fs }
    }

    /// Returns the filesystem the collector talks to.
    #[must_use]
    pub const fn filesystem(&self) -> &F {
        &self.fs
    }

    /// Collects the attributes of `path`.
    ///
    /// `basename` feeds the name and hidden-file fields. When only those two
    /// fields are requested and `matcher` is `None`, no OS call is made. A
    /// failing stat aborts the query; every other failure just omits the
    /// affected field.
    pub fn collect(
        &self,
        basename: Option<&OsStr>,
        path: &Path,
        flags: RequestFlags,
        matcher: Option<&AttributeMatcher>,
        follow_symlinks: bool,
    ) -> Result<AttributeBag, FileInfoError> {
        let mut bag = AttributeBag::new();

        if flags.contains(RequestFlags::NAME) {
            if let Some(name) = basename {
                bag.set(STANDARD_NAME, AttributeValue::ByteString(os_bytes(name)));
            }
        }
        if flags.contains(RequestFlags::IS_HIDDEN) {
            let hidden = basename.is_some_and(|name| os_bytes(name).first() == Some(&b'.'));
            bag.set(STANDARD_IS_HIDDEN, hidden);
        }

        if flags.is_trivial() && matcher.is_none() {
            return Ok(bag);
        }

        let stat = self
            .fs
            .stat(path, follow_symlinks)
            .map_err(|error| FileInfoError::stat(path, error))?;
        populate_from_stat(&mut bag, flags, &stat);

        if flags.contains(RequestFlags::SYMLINK_TARGET) {
            match resolve_symlink(&self.fs, path) {
                Ok(target) => bag.set(STANDARD_SYMLINK_TARGET, AttributeValue::ByteString(target)),
                Err(error) => {
                    trace!(
                        target: "fileinfo::collect",
                        path = %path.display(),
                        %error,
                        "symlink target unavailable"
                    );
                }
            }
        }

        let placeholders = flags & RequestFlags::PLACEHOLDERS;
        if !placeholders.is_empty() {
            trace!(
                target: "fileinfo::collect",
                flags = ?placeholders,
                "requested fields are not collected"
            );
        }

        if let Some(matcher) = matcher {
            collect_security_context(&self.fs, path, matcher, follow_symlinks, &mut bag);
            collect_xattrs(&self.fs, path, matcher, follow_symlinks, &mut bag);
        }

        debug!(
            target: "fileinfo::collect",
            path = %path.display(),
            attributes = bag.len(),
            "collected file info"
        );
        Ok(bag)
    }

    /// Collects the attributes selected by a parsed [`RequestSpec`].
    ///
    /// The base name is the final component of `path`.
    pub fn collect_request(
        &self,
        path: &Path,
        request: &RequestSpec,
        follow_symlinks: bool,
    ) -> Result<AttributeBag, FileInfoError> {
        self.collect(
            path.file_name(),
            path,
            request.flags(),
            request.matcher(),
            follow_symlinks,
        )
    }

    /// Collects the attributes of an open descriptor.
    ///
    /// `attributes` is parsed into a fresh matcher that only gates the
    /// security label; extended attributes and name fields are not collected
    /// on this path.
    #[cfg(unix)]
    pub fn collect_fd(
        &self,
        fd: BorrowedFd<'_>,
        flags: RequestFlags,
        attributes: &str,
    ) -> Result<AttributeBag, FileInfoError> {
        let stat = self
            .fs
            .fstat(fd)
            .map_err(|error| FileInfoError::descriptor_stat(fd.as_raw_fd(), error))?;

        let mut bag = AttributeBag::new();
        populate_from_stat(&mut bag, flags, &stat);

        let matcher = AttributeMatcher::parse(attributes);
        crate::selinux::collect_security_context_fd(&self.fs, fd, &matcher, &mut bag);

        debug!(
            target: "fileinfo::collect",
            fd = fd.as_raw_fd(),
            attributes = bag.len(),
            "collected descriptor info"
        );
        Ok(bag)
    }
}

/// Queries `path` on the host filesystem with a textual request.
pub fn query_info(
    path: &Path,
    attributes: &str,
    follow_symlinks: bool,
) -> Result<AttributeBag, FileInfoError> {
    MetadataCollector::new().collect_request(path, &RequestSpec::parse(attributes), follow_symlinks)
}

#[cfg(unix)]
fn os_bytes(name: &OsStr) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    name.as_bytes().to_vec()
}

#[cfg(not(unix))]
fn os_bytes(name: &OsStr) -> Vec<u8> {
    name.to_string_lossy().into_owned().into_bytes()
}
