//! Install and uninstall of whole packages.

use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use thiserror::Error;

use crate::error::LinkError;
use crate::link::{DirectoryPruner, LinkInstaller, LinkUninstaller, PackageReport, Placement};
use crate::package::{Package, resolve_target};
use crate::runtime::Runtime;
use crate::walk::TreeWalker;

/// One package that could not be installed or uninstalled.
#[derive(Debug)]
pub struct PackageFailure {
    pub package: PathBuf,
    pub error: LinkError,
    /// Set when the automatic rollback of a failed install failed as well.
    pub rollback_error: Option<LinkError>,
}

impl fmt::Display for PackageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.package, self.error)?;
        if let Some(rollback) = &self.rollback_error {
            write!(f, " (rollback also failed: {})", rollback)?;
        }
        Ok(())
    }
}

/// Raised when at least one package of a batch failed.
///
/// Packages that succeeded stay in `completed`.
#[derive(Debug, Error)]
#[error("{} of {} package(s) failed", .failures.len(), .total)]
pub struct AggregateError {
    pub total: usize,
    pub completed: Vec<PackageReport>,
    pub failures: Vec<PackageFailure>,
}

/// Places and removes packages under a target root.
///
/// One invocation must own the target root for its whole duration; nothing
/// guards against a concurrent install or uninstall into the same tree.
pub struct PackageManager<'a, R: Runtime> {
    runtime: &'a R,
}

impl<'a, R: Runtime> PackageManager<'a, R> {
    pub fn new(runtime: &'a R) -> Self {
        Self { runtime }
    }

    /// Install every package in order.
    ///
    /// A package that fails partway is uninstalled again before moving on to
    /// the next one.
    #[tracing::instrument(skip(self))]
    pub fn install(
        &self,
        packages: &[PathBuf],
        target_root: &Path,
    ) -> Result<Vec<PackageReport>, AggregateError> {
        self.run_batch(packages, |dir| self.install_one(dir, target_root))
    }

    /// Uninstall every package, continuing past failures.
    #[tracing::instrument(skip(self))]
    pub fn uninstall(
        &self,
        packages: &[PathBuf],
        target_root: &Path,
    ) -> Result<Vec<PackageReport>, AggregateError> {
        self.run_batch(packages, |dir| {
            let (package, target) = self.resolve(dir, target_root)?;
            self.uninstall_resolved(&package, &target)
        })
    }

    fn run_batch<F>(&self, packages: &[PathBuf], mut op: F) -> Result<Vec<PackageReport>, AggregateError>
    where
        F: FnMut(&Path) -> Result<PackageReport, PackageFailure>,
    {
        let mut completed = Vec::new();
        let mut failures = Vec::new();

        for dir in packages {
            match op(dir.as_path()) {
                Ok(report) => completed.push(report),
                Err(failure) => {
                    error!("{}", failure);
                    failures.push(failure);
                }
            }
        }

        if failures.is_empty() {
            Ok(completed)
        } else {
            Err(AggregateError {
                total: packages.len(),
                completed,
                failures,
            })
        }
    }

    fn resolve(&self, dir: &Path, target_root: &Path) -> Result<(Package, PathBuf), PackageFailure> {
        let failed = |error| PackageFailure {
            package: dir.to_path_buf(),
            error,
            rollback_error: None,
        };
        let package = Package::resolve(self.runtime, dir).map_err(failed)?;
        let target = resolve_target(self.runtime, target_root).map_err(failed)?;
        Ok((package, target))
    }

    fn install_one(&self, dir: &Path, target_root: &Path) -> Result<PackageReport, PackageFailure> {
        let (package, target) = self.resolve(dir, target_root)?;
        info!("Installing {:?} into {:?}", package.root(), target);

        let placement = Placement::new(package.files_root(), &target);
        let mut installer =
            LinkInstaller::new(self.runtime, placement, PackageReport::new(package.root()));

        match TreeWalker::new(self.runtime).walk(package.files_root(), &mut installer) {
            Ok(()) => Ok(installer.into_report()),
            Err(error) => {
                warn!(
                    "Install of {:?} failed, rolling back: {}",
                    package.root(),
                    error
                );
                let rollback_error = match self.uninstall_resolved(&package, &target) {
                    Ok(report) => {
                        debug!(
                            "Rollback removed {} link(s) and {} director(ies)",
                            report.links_removed, report.directories_removed
                        );
                        None
                    }
                    Err(rollback) => Some(rollback.error),
                };
                Err(PackageFailure {
                    package: package.root().to_path_buf(),
                    error,
                    rollback_error,
                })
            }
        }
    }

    fn uninstall_resolved(
        &self,
        package: &Package,
        target: &Path,
    ) -> Result<PackageReport, PackageFailure> {
        info!("Uninstalling {:?} from {:?}", package.root(), target);
        let failed = |error| PackageFailure {
            package: package.root().to_path_buf(),
            error,
            rollback_error: None,
        };

        let placement = Placement::new(package.files_root(), target);
        let walker = TreeWalker::new(self.runtime);

        let mut uninstaller =
            LinkUninstaller::new(self.runtime, placement, PackageReport::new(package.root()));
        walker
            .walk(package.files_root(), &mut uninstaller)
            .map_err(failed)?;

        let mut pruner =
            DirectoryPruner::new(self.runtime, placement, uninstaller.into_report());
        walker
            .walk(package.files_root(), &mut pruner)
            .map_err(failed)?;
        pruner.finish().map_err(failed)
    }
}
