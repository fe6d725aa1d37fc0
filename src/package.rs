//! On-disk package layout.
//!
//! A package is a directory holding a `pkginfo` metadata file (required but
//! never read) and a `pkgfiles` tree that gets mirrored into the target root.

use std::io;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::LinkError;
use crate::runtime::{EntryKind, Runtime, combine};

pub const FILES_DIR: &str = "pkgfiles";
pub const INFO_FILE: &str = "pkginfo";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    root: PathBuf,
    files_root: PathBuf,
    info_path: PathBuf,
}

impl Package {
    /// Canonicalize `dir` and check it has the package layout.
    pub fn resolve<R: Runtime>(runtime: &R, dir: &Path) -> Result<Self, LinkError> {
        let root = canonicalize(runtime, dir)?;
        let info_path = combine(&root, INFO_FILE)?;
        let files_root = canonicalize(runtime, &combine(&root, FILES_DIR)?)?;

        if runtime
            .symlink_metadata(&info_path)
            .map_err(|e| LinkError::io(&info_path, e))?
            .is_none()
        {
            return Err(LinkError::MissingPackageInfo(root));
        }

        debug!("Resolved package {:?} (files at {:?})", root, files_root);
        Ok(Self {
            root,
            files_root,
            info_path,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Canonical root of the tree to mirror.
    pub fn files_root(&self) -> &Path {
        &self.files_root
    }

    pub fn info_path(&self) -> &Path {
        &self.info_path
    }
}

/// Canonicalize a path, mapping "missing" to [`LinkError::NotFound`].
pub fn canonicalize<R: Runtime>(runtime: &R, path: &Path) -> Result<PathBuf, LinkError> {
    runtime.canonicalize(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => LinkError::NotFound(path.to_path_buf()),
        _ => LinkError::io(path, e),
    })
}

/// Canonicalize the target root and check it is a directory.
pub fn resolve_target<R: Runtime>(runtime: &R, path: &Path) -> Result<PathBuf, LinkError> {
    let target = canonicalize(runtime, path)?;
    match runtime
        .symlink_metadata(&target)
        .map_err(|e| LinkError::io(&target, e))?
    {
        Some(meta) if meta.kind == EntryKind::Directory => Ok(target),
        Some(_) => Err(LinkError::NotADirectory(target)),
        None => Err(LinkError::NotFound(target)),
    }
}
