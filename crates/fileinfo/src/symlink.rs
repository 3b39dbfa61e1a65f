//! Symlink target resolution with a growing buffer.

use std::io;
use std::path::Path;

use crate::os::Filesystem;

/// Size of the first buffer handed to `readlink`.
pub const INITIAL_LINK_BUFFER: usize = 256;

/// Largest buffer the resolver will allocate.
pub const MAX_LINK_BUFFER: usize = 1 << 20;

/// Reads the complete target of the symlink at `path`.
///
/// The buffer starts at [`INITIAL_LINK_BUFFER`] bytes and doubles until the
/// target fits with at least one byte to spare. No partial target is ever
/// returned.
pub fn resolve_symlink<F: Filesystem + ?Sized>(fs: &F, path: &Path) -> io::Result<Vec<u8>> {
    let mut buffer = vec![0u8; INITIAL_LINK_BUFFER];
    loop {
        let written = fs.read_link(path, &mut buffer)?;
        if written < buffer.len() {
            buffer.truncate(written);
            return Ok(buffer);
        }

        let next = buffer.len() * 2;
        if next > MAX_LINK_BUFFER {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("symlink target of '{}' exceeds {MAX_LINK_BUFFER} bytes", path.display()),
            ));
        }
        tracing::trace!(
            target: "fileinfo::symlink",
            path = %path.display(),
            size = next,
            "growing symlink buffer"
        );
        buffer.resize(next, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::os::XattrTarget;
    use crate::stat::FileStat;
    use std::cell::RefCell;

    /// Serves a fixed target and records the buffer sizes it was offered.
    struct LinkOnly {
        target: Vec<u8>,
        offered: RefCell<Vec<usize>>,
    }

    impl LinkOnly {
        fn new(target: Vec<u8>) -> Self {
            Self {
                target,
                offered: RefCell::new(Vec::new()),
            }
        }
    }

    impl Filesystem for LinkOnly {
        fn stat(&self, _path: &Path, _follow: bool) -> io::Result<FileStat> {
            unreachable!("resolver never stats")
        }

        #[cfg(unix)]
        fn fstat(&self, _fd: std::os::fd::BorrowedFd<'_>) -> io::Result<FileStat> {
            unreachable!("resolver never stats")
        }

        fn read_link(&self, _path: &Path, buffer: &mut [u8]) -> io::Result<usize> {
            self.offered.borrow_mut().push(buffer.len());
            let n = self.target.len().min(buffer.len());
            buffer[..n].copy_from_slice(&self.target[..n]);
            Ok(n)
        }

        fn list_xattrs(&self, _target: XattrTarget<'_>, _buffer: &mut [u8]) -> io::Result<usize> {
            unreachable!("resolver never lists xattrs")
        }

        fn get_xattr(
            &self,
            _target: XattrTarget<'_>,
            _name: &[u8],
            _buffer: &mut [u8],
        ) -> io::Result<usize> {
            unreachable!("resolver never reads xattrs")
        }

        fn security_labels_enabled(&self) -> bool {
            false
        }
    }

    #[test]
    fn short_target_needs_one_call() {
        let fs = LinkOnly::new(b"target".to_vec());
        let resolved = resolve_symlink(&fs, Path::new("link")).expect("resolve");
        assert_eq!(resolved, b"target");
        assert_eq!(*fs.offered.borrow(), vec![256]);
    }

    #[test]
    fn long_target_doubles_buffer() {
        let target = vec![b'a'; 500];
        let fs = LinkOnly::new(target.clone());
        let resolved = resolve_symlink(&fs, Path::new("link")).expect("resolve");
        assert_eq!(resolved, target);
        assert_eq!(*fs.offered.borrow(), vec![256, 512]);
    }

    #[test]
    fn target_filling_buffer_exactly_is_retried() {
        let target = vec![b'b'; 256];
        let fs = LinkOnly::new(target.clone());
        let resolved = resolve_symlink(&fs, Path::new("link")).expect("resolve");
        assert_eq!(resolved, target);
        assert_eq!(*fs.offered.borrow(), vec![256, 512]);
    }

    #[test]
    fn oversized_target_is_rejected() {
        let fs = LinkOnly::new(vec![b'c'; MAX_LINK_BUFFER]);
        let error = resolve_symlink(&fs, Path::new("link")).expect_err("too long");
        assert_eq!(error.kind(), io::ErrorKind::InvalidData);
    }

    #[cfg(unix)]
    #[test]
    fn resolves_long_target_on_host() {
        use crate::os::HostFilesystem;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let link = dir.path().join("link");
        let target: String = (0..50).map(|i| format!("segment{i:02}/")).collect();
        assert!(target.len() > INITIAL_LINK_BUFFER);
        std::os::unix::fs::symlink(&target, &link).expect("symlink");

        let resolved = resolve_symlink(&HostFilesystem::new(), &link).expect("resolve");
        assert_eq!(resolved, std::ffi::OsStr::new(&target).as_bytes());
    }

    #[cfg(unix)]
    #[test]
    fn missing_link_reports_error() {
        use crate::os::HostFilesystem;

        let dir = tempfile::tempdir().expect("tempdir");
        let error = resolve_symlink(&HostFilesystem::new(), &dir.path().join("absent"))
            .expect_err("missing link");
        assert_eq!(error.kind(), io::ErrorKind::NotFound);
    }
}
