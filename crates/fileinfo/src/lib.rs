#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! Request-driven filesystem metadata collection.
//!
//! # Overview
//!
//! A caller describes the fields it wants with a comma separated attribute
//! string such as `"standard:name,stat:size,xattr:*"`. The crate turns the
//! string into a [`RequestSpec`], issues the minimum set of OS calls needed
//! to answer it, and returns the results as an [`AttributeBag`]: a map from
//! namespaced keys to typed [`AttributeValue`]s.
//!
//! Supported namespaces:
//!
//! - `standard`: base name, hidden flag and symlink target.
//! - `stat`: file type, size, timestamps and the raw stat fields.
//! - `xattr`: extended attributes, listed with `xattr:*` or named one by one.
//! - `selinux`: the security label (`selinux:context`) when SELinux is active.
//!
//! # Design
//!
//! - [`RequestSpec`] splits a request into [`RequestFlags`] for the fixed
//!   fields and an optional [`AttributeMatcher`] for the open namespaces.
//! - [`MetadataCollector`] orchestrates a query. All OS traffic goes through
//!   the [`Filesystem`] trait so the collectors can be exercised without a
//!   real kernel; [`HostFilesystem`] is the production implementation.
//! - Extended attribute values are arbitrary bytes. They are rendered into
//!   printable text with [`escape_bytes`] before being stored.
//!
//! # Invariants
//!
//! - Requests that only name `standard:name` and `standard:is-hidden` never
//!   touch the filesystem.
//! - A failing stat is the only error a query returns. Symlink, extended
//!   attribute and label failures omit the affected key.
//! - Buffers grow geometrically and never beyond 1 MiB.
//!
//! # Errors
//!
//! [`FileInfoError`] carries the path or descriptor that failed and the
//! underlying [`std::io::Error`]. [`FileInfoErrorKind`] classifies it.
//!
//! # Examples
//!
//! ```
//! use fileinfo::{AttributeValue, query_info};
//!
//! let dir = tempfile::tempdir()?;
//! let path = dir.path().join(".config");
//! std::fs::write(&path, b"abc")?;
//!
//! let bag = query_info(&path, "standard:is-hidden,stat:size", true)?;
//! assert_eq!(bag.is_hidden(), Some(true));
//! assert_eq!(bag.get("stat:size"), Some(&AttributeValue::Uint64(3)));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod attribute;
mod collect;
mod error;
mod escape;
#[cfg(all(test, unix))]
mod fake;
mod matcher;
mod os;
mod request;
mod selinux;
mod stat;
mod symlink;
mod xattrs;

pub use crate::attribute::{
    AttributeBag, AttributeValue, SELINUX_CONTEXT, STANDARD_IS_HIDDEN, STANDARD_NAME,
    STANDARD_SYMLINK_TARGET,
};
pub use crate::collect::{MetadataCollector, query_info};
pub use crate::error::{FileInfoError, FileInfoErrorKind};
pub use crate::escape::{ESCAPE_CHAR, escape_bytes};
pub use crate::matcher::{AttributeMatcher, ExplicitKeys};
pub use crate::os::{Filesystem, HostFilesystem, XattrTarget, is_buffer_too_small};
pub use crate::request::{RequestFlags, RequestSpec, STANDARD_NAMESPACE, STAT_NAMESPACE};
pub use crate::selinux::{
    CONTEXT_KEY, SELINUX_NAMESPACE, SELINUX_XATTR, collect_security_context,
    security_labels_available,
};
#[cfg(unix)]
pub use crate::selinux::collect_security_context_fd;
pub use crate::stat::{
    FileStat, FileType, STAT_ATIME, STAT_BLOCK_SIZE, STAT_BLOCKS, STAT_CTIME, STAT_DEV, STAT_GID,
    STAT_INODE, STAT_MODE, STAT_MTIME, STAT_NLINK, STAT_RDEV, STAT_SIZE, STAT_TYPE, STAT_UID,
    Timespec, populate_from_stat,
};
pub use crate::symlink::{INITIAL_LINK_BUFFER, MAX_LINK_BUFFER, resolve_symlink};
pub use crate::xattrs::{
    MAX_XATTR_BUFFER, VALUE_STACK_BUFFER, XATTR_NAMESPACE, collect_xattrs, with_xattr_value,
};
