use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use super::{DIRECTORY_MODE, PackageReport, Placement, SkipReason};
use crate::error::LinkError;
use crate::runtime::{EntryKind, Runtime};
use crate::walk::Visitor;

/// Visitor that removes the directories install created, once they are empty.
///
/// The walk visits parents before children, so directories are only
/// collected during the walk and removed deepest-first by [`Self::finish`].
pub struct DirectoryPruner<'a, R: Runtime> {
    runtime: &'a R,
    placement: Placement<'a>,
    pending: Vec<PathBuf>,
    report: PackageReport,
}

impl<'a, R: Runtime> DirectoryPruner<'a, R> {
    pub fn new(runtime: &'a R, placement: Placement<'a>, report: PackageReport) -> Self {
        Self {
            runtime,
            placement,
            pending: Vec::new(),
            report,
        }
    }

    /// Remove the collected directories in reverse visiting order.
    ///
    /// A directory that is not empty or already gone is not an error.
    pub fn finish(mut self) -> Result<PackageReport, LinkError> {
        while let Some(dir) = self.pending.pop() {
            self.prune(&dir)?;
        }
        Ok(self.report)
    }

    fn prune(&mut self, dir: &Path) -> Result<(), LinkError> {
        let existing = self
            .runtime
            .symlink_metadata(dir)
            .map_err(|e| LinkError::io(dir, e))?;

        match existing {
            None => {
                debug!("{:?} already absent", dir);
                return Ok(());
            }
            Some(meta) if meta.kind != EntryKind::Directory => {
                warn!("Leaving {:?} in place: found a {}", dir, meta.kind);
                self.report.skip(dir, SkipReason::NotADirectory(meta.kind));
                return Ok(());
            }
            Some(meta) if meta.mode != DIRECTORY_MODE => {
                warn!("Leaving {:?} in place: mode {:o}", dir, meta.mode);
                self.report
                    .skip(dir, SkipReason::DirectoryModeChanged(meta.mode));
                return Ok(());
            }
            Some(_) => {}
        }

        match self.runtime.remove_dir(dir) {
            Ok(()) => {
                info!("Removed directory {:?}", dir);
                self.report.directories_removed += 1;
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::DirectoryNotEmpty => {
                debug!("Keeping {:?}: not empty", dir);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("{:?} already absent", dir);
                Ok(())
            }
            Err(source) => Err(LinkError::RemoveFailed {
                path: dir.to_path_buf(),
                source,
            }),
        }
    }
}

impl<R: Runtime> Visitor for DirectoryPruner<'_, R> {
    fn visit(&mut self, path: &Path, kind: EntryKind) -> Result<(), LinkError> {
        if kind == EntryKind::Directory {
            self.pending.push(self.placement.destination(path)?);
        }
        Ok(())
    }
}
