use anyhow::Result;
use log::{debug, warn};
use std::path::PathBuf;

use crate::{
    link::PackageReport,
    manager::{AggregateError, PackageManager},
    runtime::Runtime,
};

pub mod config;
mod report;

use config::Config;
use report::{Action, print_failures, print_reports};

/// Install packages into a target root
#[tracing::instrument(skip(runtime))]
pub fn install<R: Runtime>(runtime: R, paths: Vec<PathBuf>, target: Option<PathBuf>) -> Result<()> {
    let config = prepare(&runtime, paths, target);
    let manager = PackageManager::new(&runtime);
    finish(Action::Install, manager.install(&config.packages, &config.target_root))
}

/// Remove previously installed packages from a target root
#[tracing::instrument(skip(runtime))]
pub fn uninstall<R: Runtime>(
    runtime: R,
    paths: Vec<PathBuf>,
    target: Option<PathBuf>,
) -> Result<()> {
    let config = prepare(&runtime, paths, target);
    let manager = PackageManager::new(&runtime);
    finish(
        Action::Uninstall,
        manager.uninstall(&config.packages, &config.target_root),
    )
}

fn prepare<R: Runtime>(runtime: &R, paths: Vec<PathBuf>, target: Option<PathBuf>) -> Config {
    let config = Config::resolve(paths, target);
    if config.targets_filesystem_root() && !runtime.is_privileged() {
        warn!(
            "Target root is {:?} but not running as root; writes will likely fail",
            config.target_root
        );
    }
    config
}

fn finish(
    action: Action,
    outcome: std::result::Result<Vec<PackageReport>, AggregateError>,
) -> Result<()> {
    match outcome {
        Ok(reports) => {
            debug!("{} package(s) done", reports.len());
            print_reports(action, &reports);
            Ok(())
        }
        Err(err) => {
            print_reports(action, &err.completed);
            print_failures(action, &err.failures);
            Err(err.into())
        }
    }
}
