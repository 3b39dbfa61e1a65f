//! Mandatory access control label retrieval.
//!
//! The label is stored under `selinux:context` when the request names it and
//! the host has SELinux active. Absence of the subsystem and any read failure
//! leave the bag untouched. Whether the subsystem is present is decided once
//! per process.

use std::path::Path;
#[cfg(target_os = "linux")]
use std::sync::OnceLock;

use tracing::trace;

use crate::attribute::{AttributeBag, SELINUX_CONTEXT};
use crate::matcher::AttributeMatcher;
use crate::os::{Filesystem, XattrTarget};
use crate::xattrs::with_xattr_value;

/// Namespace of the security label.
pub const SELINUX_NAMESPACE: &str = "selinux";
/// Key of the security label within [`SELINUX_NAMESPACE`].
pub const CONTEXT_KEY: &str = "context";
/// Extended attribute the kernel exposes the label through.
pub const SELINUX_XATTR: &str = "security.selinux";

#[cfg(target_os = "linux")]
const SELINUX_MOUNT: &str = "/sys/fs/selinux";

/// Reports whether SELinux labels can be queried on this host.
///
/// The check runs on first use and is cached for the lifetime of the process.
#[cfg(target_os = "linux")]
pub fn security_labels_available() -> bool {
    static AVAILABLE: OnceLock<bool> = OnceLock::new();
    *AVAILABLE.get_or_init(|| {
        let available = Path::new(SELINUX_MOUNT).join("enforce").exists();
        trace!(target: "fileinfo::selinux", available, "checked selinux support");
        available
    })
}

/// Reports whether SELinux labels can be queried on this host.
///
/// Always `false` on platforms without SELinux.
#[cfg(not(target_os = "linux"))]
pub fn security_labels_available() -> bool {
    false
}

fn requested<F: Filesystem + ?Sized>(fs: &F, matcher: &AttributeMatcher) -> bool {
    matcher.matches(SELINUX_NAMESPACE, CONTEXT_KEY) && fs.security_labels_enabled()
}

fn store_label<F: Filesystem + ?Sized>(fs: &F, target: XattrTarget<'_>, bag: &mut AttributeBag) {
    let label = with_xattr_value(fs, target, SELINUX_XATTR.as_bytes(), |raw| {
        let end = raw.iter().rposition(|&byte| byte != 0).map_or(0, |last| last + 1);
        String::from_utf8_lossy(&raw[..end]).into_owned()
    });
    match label {
        Ok(label) if !label.is_empty() => bag.set(SELINUX_CONTEXT, label),
        Ok(_) => {}
        Err(error) => {
            trace!(target: "fileinfo::selinux", %error, "security label unavailable");
        }
    }
}

/// Stores the label of `path` when `matcher` asks for it.
pub fn collect_security_context<F: Filesystem + ?Sized>(
    fs: &F,
    path: &Path,
    matcher: &AttributeMatcher,
    follow_symlinks: bool,
    bag: &mut AttributeBag,
) {
    if requested(fs, matcher) {
        store_label(fs, XattrTarget::path(path, follow_symlinks), bag);
    }
}

/// Stores the label of an open descriptor when `matcher` asks for it.
#[cfg(unix)]
pub fn collect_security_context_fd<F: Filesystem + ?Sized>(
    fs: &F,
    fd: std::os::fd::BorrowedFd<'_>,
    matcher: &AttributeMatcher,
    bag: &mut AttributeBag,
) {
    if requested(fs, matcher) {
        store_label(fs, XattrTarget::Descriptor(fd), bag);
    }
}
