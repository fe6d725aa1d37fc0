use log::debug;
use std::path::{Path, PathBuf};

/// Target root used when none is given.
pub const DEFAULT_TARGET: &str = "/";

/// Package directory used when no path is given.
pub const DEFAULT_PACKAGE: &str = ".";

/// Packages and target root of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub packages: Vec<PathBuf>,
    pub target_root: PathBuf,
}

impl Config {
    /// Split positional paths into packages and a target root.
    ///
    /// With an explicit `target`, every path is a package. Otherwise the last
    /// of two or more paths is the target; a single path is a package going
    /// into `/`, and no path at all means the current directory.
    pub fn resolve(mut paths: Vec<PathBuf>, target: Option<PathBuf>) -> Self {
        let target_root = match target {
            Some(target) => target,
            None if paths.len() >= 2 => paths.pop().unwrap_or_else(|| DEFAULT_TARGET.into()),
            None => PathBuf::from(DEFAULT_TARGET),
        };
        if paths.is_empty() {
            paths.push(PathBuf::from(DEFAULT_PACKAGE));
        }

        debug!("Packages {:?} into {:?}", paths, target_root);
        Self {
            packages: paths,
            target_root,
        }
    }

    pub fn targets_filesystem_root(&self) -> bool {
        self.target_root == Path::new(DEFAULT_TARGET)
    }
}
