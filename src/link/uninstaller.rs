use std::path::Path;

use log::{debug, info, warn};

use super::{PackageReport, Placement, SkipReason};
use crate::error::LinkError;
use crate::runtime::{EntryKind, Runtime};
use crate::walk::Visitor;

/// Visitor that removes the links install created for a package.
///
/// A link is only removed when its target is byte-for-byte what install
/// would write today. Directories are left for [`super::DirectoryPruner`].
pub struct LinkUninstaller<'a, R: Runtime> {
    runtime: &'a R,
    placement: Placement<'a>,
    report: PackageReport,
}

impl<'a, R: Runtime> LinkUninstaller<'a, R> {
    pub fn new(runtime: &'a R, placement: Placement<'a>, report: PackageReport) -> Self {
        Self {
            runtime,
            placement,
            report,
        }
    }

    pub fn into_report(self) -> PackageReport {
        self.report
    }

    fn remove_if_matching(&mut self, dest: &Path, expected: &Path) -> Result<(), LinkError> {
        let existing = self
            .runtime
            .symlink_metadata(dest)
            .map_err(|e| LinkError::io(dest, e))?;

        let meta = match existing {
            Some(meta) => meta,
            None => {
                debug!("{:?} already absent", dest);
                self.report.links_absent += 1;
                return Ok(());
            }
        };

        if meta.kind != EntryKind::Symlink {
            warn!(
                "Leaving {:?} in place: expected a symlink, found a {}",
                dest, meta.kind
            );
            self.report.skip(dest, SkipReason::NotASymlink(meta.kind));
            return Ok(());
        }

        let actual = self
            .runtime
            .read_link(dest)
            .map_err(|source| LinkError::LinkReadFailed {
                path: dest.to_path_buf(),
                source,
            })?;

        if actual != expected {
            warn!(
                "Leaving {:?} in place: points to {:?}, expected {:?}",
                dest, actual, expected
            );
            self.report.skip(
                dest,
                SkipReason::LinkMismatch {
                    expected: expected.to_path_buf(),
                    actual,
                },
            );
            return Ok(());
        }

        self.runtime
            .remove_symlink(dest)
            .map_err(|source| LinkError::RemoveFailed {
                path: dest.to_path_buf(),
                source,
            })?;
        info!("Removed link {:?}", dest);
        self.report.links_removed += 1;
        Ok(())
    }
}

impl<R: Runtime> Visitor for LinkUninstaller<'_, R> {
    fn visit(&mut self, path: &Path, kind: EntryKind) -> Result<(), LinkError> {
        match kind {
            EntryKind::RegularFile | EntryKind::Symlink => {
                let dest = self.placement.destination(path)?;
                match self
                    .placement
                    .expected_target(self.runtime, path, kind, &dest)?
                {
                    Some(expected) => self.remove_if_matching(&dest, &expected),
                    None => Ok(()),
                }
            }
            EntryKind::Directory => Ok(()),
            EntryKind::Other(other) => {
                debug!("Ignoring {:?} ({})", path, other);
                Ok(())
            }
        }
    }
}
