use std::error::Error;
use std::fmt::Write as _;

use crate::link::PackageReport;
use crate::manager::PackageFailure;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    Install,
    Uninstall,
}

pub(crate) fn print_reports(action: Action, reports: &[PackageReport]) {
    for report in reports {
        println!("{}", summary(action, report));
        for skip in &report.skipped {
            eprintln!("Warning: Skipped {}", skip);
        }
    }
}

pub(crate) fn print_failures(action: Action, failures: &[PackageFailure]) {
    let verb = match action {
        Action::Install => "install",
        Action::Uninstall => "uninstall",
    };
    for failure in failures {
        eprintln!("Error: Failed to {} {}", verb, describe(failure));
    }
}

fn summary(action: Action, report: &PackageReport) -> String {
    match action {
        Action::Install => format!(
            "Installed {:?}: {} link(s) created, {} unchanged, {} director(ies) created",
            report.package, report.links_created, report.links_unchanged, report.directories_created
        ),
        Action::Uninstall => format!(
            "Uninstalled {:?}: {} link(s) removed, {} already absent, {} director(ies) removed",
            report.package, report.links_removed, report.links_absent, report.directories_removed
        ),
    }
}

/// The failure followed by its chain of causes.
fn describe(failure: &PackageFailure) -> String {
    let mut out = failure.to_string();
    let mut source = failure.error.source();
    while let Some(cause) = source {
        let _ = write!(out, ": {}", cause);
        source = cause.source();
    }
    out
}
