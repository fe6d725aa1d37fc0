//! Directory operations (inspect, list, create, remove, permissions).

use std::fs;
use std::io;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::{Path, PathBuf};

use super::RealRuntime;
use super::entry::{DirEntry, EntryKind, EntryMeta};

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn canonicalize_impl(&self, path: &Path) -> io::Result<PathBuf> {
        fs::canonicalize(path)
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn symlink_metadata_impl(&self, path: &Path) -> io::Result<Option<EntryMeta>> {
        match fs::symlink_metadata(path) {
            Ok(meta) => Ok(Some(EntryMeta::new(
                EntryKind::from_file_type(meta.file_type()),
                meta.mode(),
            ))),
            // A path below a non-directory cannot exist either
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
                ) =>
            {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn read_dir_impl(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        // The ReadDir handle is closed when it goes out of scope, including on
        // the early return of a failed entry.
        fs::read_dir(path)?
            .map(|entry| {
                let entry = entry?;
                Ok(DirEntry::new(
                    entry.file_name(),
                    EntryKind::from_file_type(entry.file_type()?),
                ))
            })
            .collect()
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn create_dir_impl(&self, path: &Path) -> io::Result<()> {
        fs::create_dir(path)
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn set_permissions_impl(&self, path: &Path, mode: u32) -> io::Result<()> {
        fs::set_permissions(path, fs::Permissions::from_mode(mode))
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn remove_dir_impl(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir(path)
    }
}
