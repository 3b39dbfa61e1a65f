//! Platform-neutral stat results and their mapping onto bag keys.

use crate::attribute::{AttributeBag, AttributeValue};
use crate::request::RequestFlags;

/// Key for the file type.
pub const STAT_TYPE: &str = "stat:type";
/// Key for the size in bytes.
pub const STAT_SIZE: &str = "stat:size";
/// Key for the modification time.
pub const STAT_MTIME: &str = "stat:mtime";
/// Key for the full mode bits.
pub const STAT_MODE: &str = "stat:mode";
/// Key for the owner user id.
pub const STAT_UID: &str = "stat:uid";
/// Key for the owner group id.
pub const STAT_GID: &str = "stat:gid";
/// Key for the containing device.
pub const STAT_DEV: &str = "stat:dev";
/// Key for the inode number.
pub const STAT_INODE: &str = "stat:inode";
/// Key for the hard link count.
pub const STAT_NLINK: &str = "stat:nlink";
/// Key for the device number of special files.
pub const STAT_RDEV: &str = "stat:rdev";
/// Key for the number of allocated 512-byte blocks.
pub const STAT_BLOCKS: &str = "stat:blocks";
/// Key for the preferred I/O block size.
pub const STAT_BLOCK_SIZE: &str = "stat:block-size";
/// Key for the last access time.
pub const STAT_ATIME: &str = "stat:atime";
/// Key for the last status change time.
pub const STAT_CTIME: &str = "stat:ctime";

const S_IFMT: u32 = 0o170_000;
const S_IFSOCK: u32 = 0o140_000;
const S_IFLNK: u32 = 0o120_000;
const S_IFREG: u32 = 0o100_000;
const S_IFBLK: u32 = 0o060_000;
const S_IFDIR: u32 = 0o040_000;
const S_IFCHR: u32 = 0o020_000;
const S_IFIFO: u32 = 0o010_000;

/// Kind of filesystem object.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum FileType {
    /// Regular file.
    Regular,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
    /// Character device.
    CharDevice,
    /// Block device.
    BlockDevice,
    /// Named pipe.
    Fifo,
    /// Unix domain socket.
    Socket,
    /// Anything the mode bits do not identify.
    Unknown,
}

impl FileType {
    /// Decodes the `S_IFMT` bits of a mode.
    #[must_use]
    pub const fn from_mode(mode: u32) -> Self {
        match mode & S_IFMT {
            S_IFREG => Self::Regular,
            S_IFDIR => Self::Directory,
            S_IFLNK => Self::Symlink,
            S_IFCHR => Self::CharDevice,
            S_IFBLK => Self::BlockDevice,
            S_IFIFO => Self::Fifo,
            S_IFSOCK => Self::Socket,
            _ => Self::Unknown,
        }
    }

    /// Returns the name stored under [`STAT_TYPE`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Directory => "directory",
            Self::Symlink => "symlink",
            Self::CharDevice => "char-device",
            Self::BlockDevice => "block-device",
            Self::Fifo => "fifo",
            Self::Socket => "socket",
            Self::Unknown => "unknown",
        }
    }
}

/// Seconds and nanoseconds since the Unix epoch.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Timespec {
    /// Whole seconds; negative before the epoch.
    pub seconds: i64,
    /// Sub-second part.
    pub nanoseconds: u32,
}

impl From<Timespec> for AttributeValue {
    fn from(time: Timespec) -> Self {
        Self::Timestamp {
            seconds: time.seconds,
            nanoseconds: time.nanoseconds,
        }
    }
}

/// Result of a stat call, widened to fixed-size integers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FileStat {
    /// Object kind decoded from `mode`.
    pub file_type: FileType,
    /// Type and permission bits.
    pub mode: u32,
    /// Owner user id.
    pub uid: u32,
    /// Owner group id.
    pub gid: u32,
    /// Size in bytes.
    pub size: u64,
    /// Device containing the object.
    pub dev: u64,
    /// Inode number.
    pub inode: u64,
    /// Hard link count.
    pub nlink: u64,
    /// Device number for special files.
    pub rdev: u64,
    /// Allocated 512-byte blocks.
    pub blocks: u64,
    /// Preferred I/O block size.
    pub block_size: u32,
    /// Last access.
    pub accessed: Timespec,
    /// Last modification.
    pub modified: Timespec,
    /// Last status change.
    pub changed: Timespec,
}

/// Copies the fields selected by `flags` from `stat` into `bag`.
pub fn populate_from_stat(bag: &mut AttributeBag, flags: RequestFlags, stat: &FileStat) {
    if flags.contains(RequestFlags::TYPE) {
        bag.set(STAT_TYPE, stat.file_type.as_str());
    }
    if flags.contains(RequestFlags::SIZE) {
        bag.set(STAT_SIZE, stat.size);
    }
    if flags.contains(RequestFlags::MODIFICATION_TIME) {
        bag.set(STAT_MTIME, stat.modified);
    }
    if flags.contains(RequestFlags::UNIX) {
        bag.set(STAT_MODE, stat.mode);
        bag.set(STAT_UID, stat.uid);
        bag.set(STAT_GID, stat.gid);
        bag.set(STAT_DEV, stat.dev);
        bag.set(STAT_INODE, stat.inode);
        bag.set(STAT_NLINK, stat.nlink);
        bag.set(STAT_RDEV, stat.rdev);
        bag.set(STAT_BLOCKS, stat.blocks);
        bag.set(STAT_BLOCK_SIZE, stat.block_size);
        bag.set(STAT_ATIME, stat.accessed);
        bag.set(STAT_CTIME, stat.changed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FileStat {
        FileStat {
            file_type: FileType::Regular,
            mode: 0o100_644,
            uid: 1000,
            gid: 100,
            size: 4096,
            dev: 2049,
            inode: 77,
            nlink: 1,
            rdev: 0,
            blocks: 8,
            block_size: 4096,
            accessed: Timespec {
                seconds: 10,
                nanoseconds: 1,
            },
            modified: Timespec {
                seconds: 20,
                nanoseconds: 2,
            },
            changed: Timespec {
                seconds: 30,
                nanoseconds: 3,
            },
        }
    }

    #[test]
    fn file_type_decodes_mode_bits() {
        assert_eq!(FileType::from_mode(0o100_644), FileType::Regular);
        assert_eq!(FileType::from_mode(0o040_755), FileType::Directory);
        assert_eq!(FileType::from_mode(0o120_777), FileType::Symlink);
        assert_eq!(FileType::from_mode(0o020_620), FileType::CharDevice);
        assert_eq!(FileType::from_mode(0o060_660), FileType::BlockDevice);
        assert_eq!(FileType::from_mode(0o010_600), FileType::Fifo);
        assert_eq!(FileType::from_mode(0o140_755), FileType::Socket);
        assert_eq!(FileType::from_mode(0o644), FileType::Unknown);
    }

    #[test]
    fn only_requested_fields_are_copied() {
        let mut bag = AttributeBag::new();
        populate_from_stat(&mut bag, RequestFlags::SIZE, &sample());
        assert_eq!(bag.len(), 1);
        assert_eq!(bag.get(STAT_SIZE), Some(&AttributeValue::Uint64(4096)));
    }

    #[test]
    fn standard_only_flags_copy_nothing() {
        let mut bag = AttributeBag::new();
        populate_from_stat(&mut bag, RequestFlags::STANDARD, &sample());
        assert!(bag.is_empty());
    }

    #[test]
    fn stat_group_copies_every_field() {
        let mut bag = AttributeBag::new();
        populate_from_stat(&mut bag, RequestFlags::STAT, &sample());
        assert_eq!(bag.len(), 14);
        assert_eq!(bag.get(STAT_TYPE), Some(&AttributeValue::from("regular")));
        assert_eq!(bag.get(STAT_MODE), Some(&AttributeValue::Uint32(0o100_644)));
        assert_eq!(bag.get(STAT_UID), Some(&AttributeValue::Uint32(1000)));
        assert_eq!(bag.get(STAT_NLINK), Some(&AttributeValue::Uint64(1)));
        assert_eq!(
            bag.get(STAT_MTIME),
            Some(&AttributeValue::Timestamp {
                seconds: 20,
                nanoseconds: 2
            })
        );
        assert_eq!(
            bag.get(STAT_CTIME),
            Some(&AttributeValue::Timestamp {
                seconds: 30,
                nanoseconds: 3
            })
        );
    }
}
