use std::io;
use std::path::Path;

use log::{debug, info, warn};

use super::{PackageReport, Placement, SkipReason};
use crate::error::LinkError;
use crate::runtime::{EntryKind, Runtime};
use crate::walk::Visitor;

/// Permission bits of every directory install creates, and the only mode an
/// existing directory may have to be reused.
pub const DIRECTORY_MODE: u32 = 0o755;

/// Visitor that mirrors a package tree into the target root.
pub struct LinkInstaller<'a, R: Runtime> {
    runtime: &'a R,
    placement: Placement<'a>,
    report: PackageReport,
}

impl<'a, R: Runtime> LinkInstaller<'a, R> {
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

    fn ensure_directory(&mut self, dest: &Path) -> Result<(), LinkError> {
        let existing = self
            .runtime
            .symlink_metadata(dest)
            .map_err(|e| LinkError::io(dest, e))?;

        match existing {
            None => {
                let create_failed = |source| LinkError::DirectoryCreateFailed {
                    path: dest.to_path_buf(),
                    source,
                };
                self.runtime.create_dir(dest).map_err(create_failed)?;
                // umask may have narrowed the mode
                self.runtime
                    .set_permissions(dest, DIRECTORY_MODE)
                    .map_err(create_failed)?;
                info!("Created directory {:?}", dest);
                self.report.directories_created += 1;
                Ok(())
            }
            Some(meta) if meta.kind == EntryKind::Directory && meta.mode == DIRECTORY_MODE => {
                debug!("Reusing directory {:?}", dest);
                self.report.directories_reused += 1;
                Ok(())
            }
            Some(meta) if meta.kind == EntryKind::Directory => Err(LinkError::DirectoryConflict {
                path: dest.to_path_buf(),
                reason: format!(
                    "directory has mode {:o}, expected {:o}",
                    meta.mode, DIRECTORY_MODE
                ),
            }),
            Some(meta) => Err(LinkError::DirectoryConflict {
                path: dest.to_path_buf(),
                reason: format!("found a {}", meta.kind),
            }),
        }
    }

    fn ensure_link(&mut self, dest: &Path, target: &Path) -> Result<(), LinkError> {
        let existing = self
            .runtime
            .symlink_metadata(dest)
            .map_err(|e| LinkError::io(dest, e))?;

        if let Some(meta) = existing {
            if meta.kind == EntryKind::Symlink {
                let actual = self
                    .runtime
                    .read_link(dest)
                    .map_err(|source| LinkError::LinkReadFailed {
                        path: dest.to_path_buf(),
                        source,
                    })?;
                if actual == target {
                    debug!("Link {:?} -> {:?} already in place", dest, target);
                    self.report.links_unchanged += 1;
                    return Ok(());
                }
            }
            return Err(LinkError::LinkCreateFailed {
                path: dest.to_path_buf(),
                target: target.to_path_buf(),
                source: io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("a {} already exists there", meta.kind),
                ),
            });
        }

        self.runtime
            .symlink(target, dest)
            .map_err(|source| LinkError::LinkCreateFailed {
                path: dest.to_path_buf(),
                target: target.to_path_buf(),
                source,
            })?;
        info!("Linked {:?} -> {:?}", dest, target);
        self.report.links_created += 1;
        Ok(())
    }
}

impl<R: Runtime> Visitor for LinkInstaller<'_, R> {
    fn visit(&mut self, path: &Path, kind: EntryKind) -> Result<(), LinkError> {
        match kind {
            EntryKind::Directory => {
                let dest = self.placement.destination(path)?;
                self.ensure_directory(&dest)
            }
            EntryKind::RegularFile | EntryKind::Symlink => {
                let dest = self.placement.destination(path)?;
                match self
                    .placement
                    .expected_target(self.runtime, path, kind, &dest)?
                {
                    Some(target) => self.ensure_link(&dest, &target),
                    None => Ok(()),
                }
            }
            EntryKind::Other(other) => {
                warn!("Skipping {:?}: {} not supported", path, other);
                self.report
                    .skip(path, SkipReason::UnsupportedEntryKind(other));
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{EntryMeta, MockRuntime, OtherKind};
    use mockall::predicate::eq;
    use std::path::PathBuf;

    const FILES: &str = "/store/tool/pkgfiles";
    const TARGET: &str = "/target";

    fn run(runtime: &MockRuntime, source: &str, kind: EntryKind) -> Result<PackageReport, LinkError> {
        let placement = Placement::new(Path::new(FILES), Path::new(TARGET));
        let mut installer = LinkInstaller::new(runtime, placement, PackageReport::new("/store/tool"));
        installer.visit(Path::new(source), kind)?;
        Ok(installer.into_report())
    }

    #[test]
    fn test_creates_missing_directory_with_mode() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_symlink_metadata()
            .with(eq(PathBuf::from("/target/usr")))
            .returning(|_| Ok(None));
        runtime
            .expect_create_dir()
            .with(eq(PathBuf::from("/target/usr")))
            .times(1)
            .returning(|_| Ok(()));
        runtime
            .expect_set_permissions()
            .with(eq(PathBuf::from("/target/usr")), eq(0o755))
            .times(1)
            .returning(|_, _| Ok(()));

        let report = run(&runtime, "/store/tool/pkgfiles/usr", EntryKind::Directory).unwrap();
        assert_eq!(report.directories_created, 1);
    }

    #[test]
    fn test_reuses_directory_with_expected_mode() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_symlink_metadata()
            .returning(|_| Ok(Some(EntryMeta::new(EntryKind::Directory, 0o755))));
        runtime.expect_create_dir().never();

        let report = run(&runtime, "/store/tool/pkgfiles/usr", EntryKind::Directory).unwrap();
        assert_eq!(report.directories_reused, 1);
        assert_eq!(report.directories_created, 0);
    }

    #[test]
    fn test_directory_with_other_mode_conflicts() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_symlink_metadata()
            .returning(|_| Ok(Some(EntryMeta::new(EntryKind::Directory, 0o700))));

        let err = run(&runtime, "/store/tool/pkgfiles/usr", EntryKind::Directory).unwrap_err();
        match err {
            LinkError::DirectoryConflict { path, reason } => {
                assert_eq!(path, PathBuf::from("/target/usr"));
                assert!(reason.contains("700"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_file_where_directory_expected_conflicts() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_symlink_metadata()
            .returning(|_| Ok(Some(EntryMeta::new(EntryKind::RegularFile, 0o755))));

        let err = run(&runtime, "/store/tool/pkgfiles/usr", EntryKind::Directory).unwrap_err();
        assert!(matches!(err, LinkError::DirectoryConflict { .. }));
    }

    #[test]
    fn test_symlink_where_directory_expected_conflicts() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_symlink_metadata()
            .returning(|_| Ok(Some(EntryMeta::new(EntryKind::Symlink, 0o777))));

        let err = run(&runtime, "/store/tool/pkgfiles/lib", EntryKind::Directory).unwrap_err();
        assert!(matches!(err, LinkError::DirectoryConflict { .. }));
    }

    #[test]
    fn test_links_regular_file_relatively() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_symlink_metadata()
            .with(eq(PathBuf::from("/target/bin/tool")))
            .returning(|_| Ok(None));
        runtime
            .expect_symlink()
            .with(
                eq(PathBuf::from("../../store/tool/pkgfiles/bin/tool")),
                eq(PathBuf::from("/target/bin/tool")),
            )
            .times(1)
            .returning(|_, _| Ok(()));

        let report = run(&runtime, "/store/tool/pkgfiles/bin/tool", EntryKind::RegularFile).unwrap();
        assert_eq!(report.links_created, 1);
    }

    #[test]
    fn test_copies_symlink_verbatim() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_read_link()
            .with(eq(PathBuf::from("/store/tool/pkgfiles/lib/libtool.so")))
            .returning(|_| Ok(PathBuf::from("libtool.so.1.2")));
        runtime
            .expect_symlink_metadata()
            .with(eq(PathBuf::from("/target/lib/libtool.so")))
            .returning(|_| Ok(None));
        runtime
            .expect_symlink()
            .with(
                eq(PathBuf::from("libtool.so.1.2")),
                eq(PathBuf::from("/target/lib/libtool.so")),
            )
            .times(1)
            .returning(|_, _| Ok(()));

        let report = run(&runtime, "/store/tool/pkgfiles/lib/libtool.so", EntryKind::Symlink).unwrap();
        assert_eq!(report.links_created, 1);
    }

    #[test]
    fn test_matching_link_is_left_in_place() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_symlink_metadata()
            .returning(|_| Ok(Some(EntryMeta::new(EntryKind::Symlink, 0o777))));
        runtime
            .expect_read_link()
            .with(eq(PathBuf::from("/target/bin/tool")))
            .returning(|_| Ok(PathBuf::from("../../store/tool/pkgfiles/bin/tool")));
        runtime.expect_symlink().never();

        let report = run(&runtime, "/store/tool/pkgfiles/bin/tool", EntryKind::RegularFile).unwrap();
        assert_eq!(report.links_unchanged, 1);
        assert_eq!(report.links_created, 0);
    }

    #[test]
    fn test_foreign_link_is_not_overwritten() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_symlink_metadata()
            .returning(|_| Ok(Some(EntryMeta::new(EntryKind::Symlink, 0o777))));
        runtime
            .expect_read_link()
            .returning(|_| Ok(PathBuf::from("/somewhere/else")));
        runtime.expect_symlink().never();

        let err = run(&runtime, "/store/tool/pkgfiles/bin/tool", EntryKind::RegularFile).unwrap_err();
        assert!(matches!(err, LinkError::LinkCreateFailed { .. }));
    }

    #[test]
    fn test_occupied_destination_fails() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_symlink_metadata()
            .returning(|_| Ok(Some(EntryMeta::new(EntryKind::RegularFile, 0o644))));
        runtime.expect_symlink().never();

        let err = run(&runtime, "/store/tool/pkgfiles/bin/tool", EntryKind::RegularFile).unwrap_err();
        match err {
            LinkError::LinkCreateFailed { path, source, .. } => {
                assert_eq!(path, PathBuf::from("/target/bin/tool"));
                assert_eq!(source.kind(), io::ErrorKind::AlreadyExists);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_symlink_failure_is_reported() {
        let mut runtime = MockRuntime::new();
        runtime.expect_symlink_metadata().returning(|_| Ok(None));
        runtime
            .expect_symlink()
            .returning(|_, _| Err(io::Error::from(io::ErrorKind::PermissionDenied)));

        let err = run(&runtime, "/store/tool/pkgfiles/bin/tool", EntryKind::RegularFile).unwrap_err();
        assert!(matches!(err, LinkError::LinkCreateFailed { .. }));
    }

    #[test]
    fn test_other_kinds_are_skipped() {
        let runtime = MockRuntime::new();
        let report = run(
            &runtime,
            "/store/tool/pkgfiles/dev/null",
            EntryKind::Other(OtherKind::CharDevice),
        )
        .unwrap();

        assert_eq!(report.skipped.len(), 1);
        assert_eq!(
            report.skipped[0].reason,
            SkipReason::UnsupportedEntryKind(OtherKind::CharDevice)
        );
        assert_eq!(
            report.skipped[0].path,
            PathBuf::from("/store/tool/pkgfiles/dev/null")
        );
    }
}
