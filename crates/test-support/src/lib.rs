#![deny(unsafe_code)]
#![deny(missing_docs)]

//! Shared helpers for the workspace's tests.
//!
//! Extended attribute tests depend on the filesystem backing the temporary
//! directory. [`xattrs_supported`] lets a test detect that and skip itself
//! instead of failing on tmpfs or other filesystems without `user.*`
//! attribute support.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

const MARKER_ATTRIBUTE: &str = "user.test_support_marker";

/// Reports whether `user.*` extended attributes can be written on `path`.
///
/// The marker attribute is removed again before returning.
#[cfg(unix)]
pub fn xattrs_supported(path: &Path) -> bool {
    if xattr::set(path, MARKER_ATTRIBUTE, b"1").is_err() {
        return false;
    }
    let _ = xattr::remove(path, MARKER_ATTRIBUTE);
    true
}

/// Extended attributes are never available on this platform.
#[cfg(not(unix))]
pub fn xattrs_supported(_path: &Path) -> bool {
    let _ = MARKER_ATTRIBUTE;
    false
}

/// A temporary directory with helpers for populating it.
pub struct Scratch {
    dir: TempDir,
}

impl Scratch {
    /// Creates an empty scratch directory.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    /// Root of the scratch directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes `contents` to `name` inside the directory and returns its path.
    pub fn file(&self, name: &str, contents: &[u8]) -> io::Result<PathBuf> {
        let path = self.dir.path().join(name);
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Creates a symlink `name` pointing at `target` and returns its path.
    #[cfg(unix)]
    pub fn symlink(&self, name: &str, target: impl AsRef<Path>) -> io::Result<PathBuf> {
        let path = self.dir.path().join(name);
        std::os::unix::fs::symlink(target, &path)?;
        Ok(path)
    }
}
