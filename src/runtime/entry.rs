//! Entry kinds and metadata reported by the runtime.

use std::ffi::OsString;
use std::fmt;
use std::fs::FileType;

/// The kind of a filesystem entry found while walking a package tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    RegularFile,
    Symlink,
    /// Anything the link engine never places.
    Other(OtherKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtherKind {
    BlockDevice,
    CharDevice,
    Fifo,
    Socket,
    Unknown,
}

impl EntryKind {
    /// Classify a file type as reported by `lstat` or `readdir`.
    pub fn from_file_type(file_type: FileType) -> Self {
        use std::os::unix::fs::FileTypeExt;

        if file_type.is_symlink() {
            EntryKind::Symlink
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::RegularFile
        } else if file_type.is_block_device() {
            EntryKind::Other(OtherKind::BlockDevice)
        } else if file_type.is_char_device() {
            EntryKind::Other(OtherKind::CharDevice)
        } else if file_type.is_fifo() {
            EntryKind::Other(OtherKind::Fifo)
        } else if file_type.is_socket() {
            EntryKind::Other(OtherKind::Socket)
        } else {
            EntryKind::Other(OtherKind::Unknown)
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Directory => write!(f, "directory"),
            EntryKind::RegularFile => write!(f, "regular file"),
            EntryKind::Symlink => write!(f, "symlink"),
            EntryKind::Other(other) => write!(f, "{}", other),
        }
    }
}

impl fmt::Display for OtherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OtherKind::BlockDevice => "block device",
            OtherKind::CharDevice => "character device",
            OtherKind::Fifo => "fifo",
            OtherKind::Socket => "socket",
            OtherKind::Unknown => "unknown file type",
        };
        f.write_str(name)
    }
}

/// What `lstat` tells us about an existing path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryMeta {
    pub kind: EntryKind,
    /// Permission bits only (`st_mode & 0o7777`).
    pub mode: u32,
}

impl EntryMeta {
    pub fn new(kind: EntryKind, mode: u32) -> Self {
        Self {
            kind,
            mode: mode & 0o7777,
        }
    }
}

/// One child of a directory, as returned by [`super::Runtime::read_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: OsString,
    pub kind: EntryKind,
}

impl DirEntry {
    pub fn new(name: impl Into<OsString>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}
