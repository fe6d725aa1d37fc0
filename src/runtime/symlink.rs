//! Symlink operations (create, read, remove).

use std::fs;
use std::io;
use std::os::unix::fs::symlink as unix_symlink;
use std::path::{Path, PathBuf};

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn symlink_impl(&self, original: &Path, link: &Path) -> io::Result<()> {
        unix_symlink(original, link)
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn read_link_impl(&self, path: &Path) -> io::Result<PathBuf> {
        fs::read_link(path)
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn remove_symlink_impl(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}
