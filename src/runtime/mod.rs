//! Runtime abstraction for system operations.
//!
//! Every filesystem call the link engine makes goes through [`Runtime`], so
//! the install and uninstall decisions can be unit tested against a
//! `MockRuntime` while [`RealRuntime`] does the actual work.
//!
//! # Structure
//!
//! - `entry` - Entry kinds and metadata reported by the runtime
//! - `path` - Path utility functions (combine, common prefix, relative path)
//! - `env` - Process information (privilege)
//! - `fs` - Directory operations (read, create, remove, permissions)
//! - `symlink` - Symlink operations (create, read, remove)

mod entry;
mod env;
mod fs;
pub mod path;
mod symlink;

use std::io;
use std::path::{Path, PathBuf};

pub use entry::{DirEntry, EntryKind, EntryMeta, OtherKind};
pub use path::{combine, common_prefix_length, relative_path, remainder_after_prefix};

#[cfg_attr(test, mockall::automock)]
pub trait Runtime {
    /// Resolve symlinks and `.`/`..` components into an absolute path.
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;

    /// Inspect `path` without following a final symlink.
    /// Returns `Ok(None)` when nothing exists at `path`.
    fn symlink_metadata(&self, path: &Path) -> io::Result<Option<EntryMeta>>;

    /// List the entries of a directory in enumeration order.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    /// Create a single directory (the parent must exist).
    fn create_dir(&self, path: &Path) -> io::Result<()>;

    /// Set the permission bits of `path`.
    fn set_permissions(&self, path: &Path, mode: u32) -> io::Result<()>;

    /// Create a symlink at `link` whose raw target is `original`.
    fn symlink(&self, original: &Path, link: &Path) -> io::Result<()>;

    /// Read the raw target of a symlink.
    fn read_link(&self, path: &Path) -> io::Result<PathBuf>;

    fn remove_symlink(&self, path: &Path) -> io::Result<()>;

    /// Remove an empty directory.
    fn remove_dir(&self, path: &Path) -> io::Result<()>;

    // Privilege
    fn is_privileged(&self) -> bool;
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        self.canonicalize_impl(path)
    }

    fn symlink_metadata(&self, path: &Path) -> io::Result<Option<EntryMeta>> {
        self.symlink_metadata_impl(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        self.read_dir_impl(path)
    }

    fn create_dir(&self, path: &Path) -> io::Result<()> {
        self.create_dir_impl(path)
    }

    fn set_permissions(&self, path: &Path, mode: u32) -> io::Result<()> {
        self.set_permissions_impl(path, mode)
    }

    fn symlink(&self, original: &Path, link: &Path) -> io::Result<()> {
        self.symlink_impl(original, link)
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        self.read_link_impl(path)
    }

    fn remove_symlink(&self, path: &Path) -> io::Result<()> {
        self.remove_symlink_impl(path)
    }

    fn remove_dir(&self, path: &Path) -> io::Result<()> {
        self.remove_dir_impl(path)
    }

    fn is_privileged(&self) -> bool {
        self.is_privileged_impl()
    }
}
