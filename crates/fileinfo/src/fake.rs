//! In-memory [`Filesystem`] used by unit tests to observe OS traffic.

use std::cell::{Cell, RefCell};
use std::io;
use std::os::fd::BorrowedFd;
use std::path::Path;

use crate::os::{Filesystem, XattrTarget};
use crate::selinux::SELINUX_XATTR;
use crate::stat::{FileStat, FileType, Timespec};

/// Counts and records every call; behaviour is configured through fields.
pub(crate) struct FakeFilesystem {
    pub stat: Result<FileStat, i32>,
    pub link_target: Option<Vec<u8>>,
    pub xattrs: RefCell<Vec<(Vec<u8>, Vec<u8>)>>,
    /// Attributes that appear between the size query and the first listing.
    pub racing_xattrs: RefCell<Vec<(Vec<u8>, Vec<u8>)>>,
    /// Names whose reads fail with `EACCES`.
    pub unreadable: Vec<Vec<u8>>,
    pub list_error: Option<i32>,
    /// Every non-empty listing fails with `ERANGE`.
    pub list_always_too_small: bool,
    pub label: Option<Vec<u8>>,
    pub labels_enabled: bool,
    pub stat_calls: Cell<usize>,
    pub fstat_calls: Cell<usize>,
    pub read_link_calls: Cell<usize>,
    pub list_calls: Cell<usize>,
    pub get_calls: Cell<usize>,
    /// Buffer lengths offered to `list_xattrs`, in call order.
    pub list_buffers: RefCell<Vec<usize>>,
    /// Buffer lengths offered to `get_xattr`, in call order.
    pub get_buffers: RefCell<Vec<usize>>,
    /// `follow`, `nofollow` or `fd` for every xattr call.
    pub xattr_modes: RefCell<Vec<&'static str>>,
}

pub(crate) fn regular_stat(size: u64) -> FileStat {
    FileStat {
        file_type: FileType::Regular,
        mode: 0o100_644,
        uid: 1000,
        gid: 1000,
        size,
        dev: 1,
        inode: 42,
        nlink: 1,
        rdev: 0,
        blocks: 8,
        block_size: 4096,
        accessed: Timespec::default(),
        modified: Timespec {
            seconds: 1_700_000_000,
            nanoseconds: 5,
        },
        changed: Timespec::default(),
    }
}

impl Default for FakeFilesystem {
    fn default() -> Self {
        Self {
            stat: Ok(regular_stat(128)),
            link_target: None,
            xattrs: RefCell::new(Vec::new()),
            racing_xattrs: RefCell::new(Vec::new()),
            unreadable: Vec::new(),
            list_error: None,
            list_always_too_small: false,
            label: None,
            labels_enabled: false,
            stat_calls: Cell::new(0),
            fstat_calls: Cell::new(0),
            read_link_calls: Cell::new(0),
            list_calls: Cell::new(0),
            get_calls: Cell::new(0),
            list_buffers: RefCell::new(Vec::new()),
            get_buffers: RefCell::new(Vec::new()),
            xattr_modes: RefCell::new(Vec::new()),
        }
    }
}

impl FakeFilesystem {
    pub(crate) fn with_xattrs<V: AsRef<[u8]>>(pairs: &[(&str, V)]) -> Self {
        let fake = Self::default();
        fake.xattrs.replace(
            pairs
                .iter()
                .map(|(name, value)| (name.as_bytes().to_vec(), value.as_ref().to_vec()))
                .collect(),
        );
        fake
    }

    pub(crate) fn os_calls(&self) -> usize {
        self.stat_calls.get()
            + self.fstat_calls.get()
            + self.read_link_calls.get()
            + self.list_calls.get()
            + self.get_calls.get()
    }

    fn record_mode(&self, target: XattrTarget<'_>) {
        let mode = match target {
            XattrTarget::Path {
                follow_symlinks: true,
                ..
            } => "follow",
            XattrTarget::Path {
                follow_symlinks: false,
                ..
            } => "nofollow",
            XattrTarget::Descriptor(_) => "fd",
        };
        self.xattr_modes.borrow_mut().push(mode);
    }
}

fn bump(counter: &Cell<usize>) {
    counter.set(counter.get() + 1);
}

fn fill(buffer: &mut [u8], data: &[u8]) -> io::Result<usize> {
    if buffer.is_empty() {
        return Ok(data.len());
    }
    if buffer.len() < data.len() {
        return Err(io::Error::from_raw_os_error(libc::ERANGE));
    }
    buffer[..data.len()].copy_from_slice(data);
    Ok(data.len())
}

impl Filesystem for FakeFilesystem {
    fn stat(&self, _path: &Path, _follow_symlinks: bool) -> io::Result<FileStat> {
        bump(&self.stat_calls);
        self.stat.map_err(io::Error::from_raw_os_error)
    }

    fn fstat(&self, _fd: BorrowedFd<'_>) -> io::Result<FileStat> {
        bump(&self.fstat_calls);
        self.stat.map_err(io::Error::from_raw_os_error)
    }

    fn read_link(&self, _path: &Path, buffer: &mut [u8]) -> io::Result<usize> {
        bump(&self.read_link_calls);
        let target = self
            .link_target
            .as_ref()
            .ok_or_else(|| io::Error::from_raw_os_error(libc::EINVAL))?;
        let n = target.len().min(buffer.len());
        buffer[..n].copy_from_slice(&target[..n]);
        Ok(n)
    }

    fn list_xattrs(&self, target: XattrTarget<'_>, buffer: &mut [u8]) -> io::Result<usize> {
        bump(&self.list_calls);
        self.record_mode(target);
        self.list_buffers.borrow_mut().push(buffer.len());
        if let Some(code) = self.list_error {
            return Err(io::Error::from_raw_os_error(code));
        }
        if self.list_always_too_small && !buffer.is_empty() {
            return Err(io::Error::from_raw_os_error(libc::ERANGE));
        }
        if !buffer.is_empty() {
            let racing = self.racing_xattrs.take();
            self.xattrs.borrow_mut().extend(racing);
        }
        let mut list = Vec::new();
        for (name, _) in self.xattrs.borrow().iter() {
            list.extend_from_slice(name);
            list.push(0);
        }
        fill(buffer, &list)
    }

    fn get_xattr(
        &self,
        target: XattrTarget<'_>,
        name: &[u8],
        buffer: &mut [u8],
    ) -> io::Result<usize> {
        bump(&self.get_calls);
        self.record_mode(target);
        self.get_buffers.borrow_mut().push(buffer.len());
        if self.unreadable.iter().any(|candidate| candidate == name) {
            return Err(io::Error::from_raw_os_error(libc::EACCES));
        }
        if name == SELINUX_XATTR.as_bytes() {
            if let Some(label) = &self.label {
                return fill(buffer, label);
            }
        }
        let xattrs = self.xattrs.borrow();
        let value = xattrs
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| io::Error::from_raw_os_error(libc::ENODATA))?;
        fill(buffer, &value)
    }

    fn security_labels_enabled(&self) -> bool {
        self.labels_enabled
    }
}
