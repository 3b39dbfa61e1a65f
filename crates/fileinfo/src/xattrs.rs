//! Best-effort extended attribute collection.
//!
//! Listing uses a query-then-grow protocol: ask for the required size with an
//! empty buffer, allocate it, and double the buffer whenever the list grew in
//! between (`ERANGE`). Values are read into a small stack buffer first and
//! only fall back to an exactly sized heap buffer when they do not fit.
//!
//! A failure to list or read any single attribute never aborts collection;
//! the affected key is left out of the bag.

use std::io;
use std::path::Path;

use tracing::trace;

use crate::attribute::AttributeBag;
use crate::escape::escape_bytes;
use crate::matcher::AttributeMatcher;
use crate::os::{Filesystem, XattrTarget, is_buffer_too_small};

/// Namespace under which attribute values are stored.
pub const XATTR_NAMESPACE: &str = "xattr";

/// Size of the stack buffer used for the first read of every value.
pub const VALUE_STACK_BUFFER: usize = 64;

/// Largest list or value buffer the collector will allocate.
pub const MAX_XATTR_BUFFER: usize = 1 << 20;

/// Adds the extended attributes selected by `matcher` to `bag`.
///
/// When the matcher enumerates the whole `xattr` namespace every attribute
/// of `path` is listed and read; otherwise only the explicitly named keys are
/// read and no listing happens. `follow_symlinks` selects the
/// symlink-following call variants for the whole pass.
pub fn collect_xattrs<F: Filesystem + ?Sized>(
    fs: &F,
    path: &Path,
    matcher: &AttributeMatcher,
    follow_symlinks: bool,
    bag: &mut AttributeBag,
) {
    if !matcher.matches_namespace(XATTR_NAMESPACE) {
        return;
    }
    let target = XattrTarget::path(path, follow_symlinks);

    if matcher.enumerates_all(XATTR_NAMESPACE) {
        let Some(names) = list_names(fs, target) else {
            return;
        };
        for name in names.split(|&byte| byte == 0).filter(|name| !name.is_empty()) {
            store_one(fs, target, name, bag);
        }
    } else {
        for key in matcher.explicit_keys(XATTR_NAMESPACE) {
            store_one(fs, target, key.as_bytes(), bag);
        }
    }
}

fn store_one<F: Filesystem + ?Sized>(
    fs: &F,
    target: XattrTarget<'_>,
    name: &[u8],
    bag: &mut AttributeBag,
) {
    match with_xattr_value(fs, target, name, |value| escape_bytes(value).into_owned()) {
        Ok(escaped) => {
            let key = format!("{XATTR_NAMESPACE}:{}", String::from_utf8_lossy(name));
            bag.set(key, escaped);
        }
        Err(error) => {
            trace!(
                target: "fileinfo::xattr",
                name = %String::from_utf8_lossy(name),
                %error,
                "skipping unreadable extended attribute"
            );
        }
    }
}

/// Returns the NUL separated attribute name list, or `None` when there are no
/// attributes or they cannot be listed.
fn list_names<F: Filesystem + ?Sized>(fs: &F, target: XattrTarget<'_>) -> Option<Vec<u8>> {
    let size = match fs.list_xattrs(target, &mut []) {
        Ok(0) => return None,
        Ok(size) => size,
        Err(error) => {
            trace!(target: "fileinfo::xattr", %error, "extended attribute listing unavailable");
            return None;
        }
    };

    let mut buffer = vec![0u8; size.min(MAX_XATTR_BUFFER)];
    loop {
        match fs.list_xattrs(target, &mut buffer) {
            Ok(written) => {
                buffer.truncate(written);
                return Some(buffer);
            }
            Err(error) if is_buffer_too_small(&error) => {
                if buffer.len() >= MAX_XATTR_BUFFER {
                    trace!(
                        target: "fileinfo::xattr",
                        size = buffer.len(),
                        "attribute list too large"
                    );
                    return None;
                }
                let next = (buffer.len().max(1) * 2).min(MAX_XATTR_BUFFER);
                trace!(target: "fileinfo::xattr", size = next, "attribute list grew, retrying");
                buffer.resize(next, 0);
            }
            Err(error) => {
                trace!(target: "fileinfo::xattr", %error, "listing extended attributes failed");
                return None;
            }
        }
    }
}

/// Reads the value of attribute `name` and hands it to `consume`.
///
/// The first read offers `VALUE_STACK_BUFFER - 1` bytes of a stack buffer.
/// If that is too small the exact size is queried, a buffer of that size is
/// allocated, and the value is read again. Any failure of the second read,
/// including another `ERANGE`, is returned.
pub fn with_xattr_value<F, R>(
    fs: &F,
    target: XattrTarget<'_>,
    name: &[u8],
    consume: impl FnOnce(&[u8]) -> R,
) -> io::Result<R>
where
    F: Filesystem + ?Sized,
{
    let mut stack = [0u8; VALUE_STACK_BUFFER];
    match fs.get_xattr(target, name, &mut stack[..VALUE_STACK_BUFFER - 1]) {
        Ok(len) => return Ok(consume(&stack[..len])),
        Err(error) if is_buffer_too_small(&error) => {}
        Err(error) => return Err(error),
    }

    let size = fs.get_xattr(target, name, &mut [])?;
    if size > MAX_XATTR_BUFFER {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("extended attribute value of {size} bytes exceeds {MAX_XATTR_BUFFER}"),
        ));
    }
    let mut heap = vec![0u8; size];
    let len = fs.get_xattr(target, name, &mut heap)?;
    Ok(consume(&heap[..len]))
}
