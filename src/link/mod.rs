//! Link placement visitors.
//!
//! Install and uninstall walk the same package tree and derive the same
//! destination and expected link target for every entry; there is no record
//! of what was installed. Uninstall only removes what still looks exactly
//! like what install would have produced.

mod installer;
mod pruner;
mod uninstaller;

pub use installer::{DIRECTORY_MODE, LinkInstaller};
pub use pruner::DirectoryPruner;
pub use uninstaller::LinkUninstaller;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::LinkError;
use crate::runtime::{EntryKind, OtherKind, Runtime, combine, relative_path, remainder_after_prefix};

/// Maps entries of a package's file tree onto the target root.
#[derive(Debug, Clone, Copy)]
pub struct Placement<'a> {
    files_root: &'a Path,
    target_root: &'a Path,
}

impl<'a> Placement<'a> {
    /// Both roots must be canonical absolute paths.
    pub fn new(files_root: &'a Path, target_root: &'a Path) -> Self {
        Self {
            files_root,
            target_root,
        }
    }

    pub fn files_root(&self) -> &Path {
        self.files_root
    }

    pub fn target_root(&self) -> &Path {
        self.target_root
    }

    /// Where `source` lands under the target root.
    pub fn destination(&self, source: &Path) -> Result<PathBuf, LinkError> {
        let rest = remainder_after_prefix(self.files_root, source)?;
        combine(self.target_root, rest)
    }

    /// The raw target install gives the link at `destination`.
    ///
    /// Regular files get a relative path back into the package; symlinks are
    /// copied verbatim. Other kinds have no link.
    pub fn expected_target<R: Runtime>(
        &self,
        runtime: &R,
        source: &Path,
        kind: EntryKind,
        destination: &Path,
    ) -> Result<Option<PathBuf>, LinkError> {
        match kind {
            EntryKind::RegularFile => {
                let parent = destination.parent().unwrap_or(self.target_root);
                relative_path(parent, source).map(Some)
            }
            EntryKind::Symlink => runtime
                .read_link(source)
                .map(Some)
                .map_err(|source_err| LinkError::LinkReadFailed {
                    path: source.to_path_buf(),
                    source: source_err,
                }),
            EntryKind::Directory | EntryKind::Other(_) => Ok(None),
        }
    }
}

/// Why an entry was left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The destination link no longer points where install put it.
    LinkMismatch { expected: PathBuf, actual: PathBuf },
    /// Something other than a symlink sits where install put a link.
    NotASymlink(EntryKind),
    /// Something other than a directory sits where install made one.
    NotADirectory(EntryKind),
    /// The directory's mode is not the one install gives its directories.
    DirectoryModeChanged(u32),
    UnsupportedEntryKind(OtherKind),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::LinkMismatch { expected, actual } => write!(
                f,
                "link points to {:?} instead of {:?}, modified since install",
                actual, expected
            ),
            SkipReason::NotASymlink(kind) => {
                write!(f, "expected a symlink but found a {}", kind)
            }
            SkipReason::NotADirectory(kind) => {
                write!(f, "expected a directory but found a {}", kind)
            }
            SkipReason::DirectoryModeChanged(mode) => {
                write!(f, "directory has mode {:o}, not created by install", mode)
            }
            SkipReason::UnsupportedEntryKind(kind) => write!(f, "{} not supported", kind),
        }
    }
}

/// An entry the engine deliberately did not touch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skip {
    pub path: PathBuf,
    pub reason: SkipReason,
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.path, self.reason)
    }
}

/// What one install or uninstall did to the target tree.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PackageReport {
    pub package: PathBuf,
    pub directories_created: usize,
    pub directories_reused: usize,
    pub directories_removed: usize,
    pub links_created: usize,
    /// Links install found already in place.
    pub links_unchanged: usize,
    pub links_removed: usize,
    /// Links uninstall found already gone.
    pub links_absent: usize,
    pub skipped: Vec<Skip>,
}

impl PackageReport {
    pub fn new(package: impl Into<PathBuf>) -> Self {
        Self {
            package: package.into(),
            ..Self::default()
        }
    }

    /// Fold the counters and skips of a later pass into this report.
    pub fn absorb(&mut self, other: PackageReport) {
        self.directories_created += other.directories_created;
        self.directories_reused += other.directories_reused;
        self.directories_removed += other.directories_removed;
        self.links_created += other.links_created;
        self.links_unchanged += other.links_unchanged;
        self.links_removed += other.links_removed;
        self.links_absent += other.links_absent;
        self.skipped.extend(other.skipped);
    }

    pub(crate) fn skip(&mut self, path: &Path, reason: SkipReason) {
        self.skipped.push(Skip {
            path: path.to_path_buf(),
            reason,
        });
    }
}
