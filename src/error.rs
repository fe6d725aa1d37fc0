//! Error types for link placement.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can abort a walk over a package tree.
///
/// Skips (a modified link, an unsupported entry kind) are not errors and
/// never show up here; they are recorded in [`crate::link::PackageReport`].
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("path too long: {0:?}")]
    PathTooLong(PathBuf),

    #[error("path is not absolute: {0:?}")]
    NotAbsolute(PathBuf),

    /// A path handed to a visitor did not descend from the walked root.
    #[error("{path:?} is not under {prefix:?}")]
    NotAPrefix { prefix: PathBuf, path: PathBuf },

    #[error("{0:?} does not exist")]
    NotFound(PathBuf),

    #[error("{0:?} is not a directory")]
    NotADirectory(PathBuf),

    #[error("package {0:?} has no pkginfo file")]
    MissingPackageInfo(PathBuf),

    #[error("failed to read directory {path:?}")]
    DirectoryReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot use {path:?} as a directory: {reason}")]
    DirectoryConflict { path: PathBuf, reason: String },

    #[error("failed to create directory {path:?}")]
    DirectoryCreateFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create link {path:?} -> {target:?}")]
    LinkCreateFailed {
        path: PathBuf,
        target: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read link {path:?}")]
    LinkReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to remove {path:?}")]
    RemoveFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("i/o error on {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LinkError {
    /// Wrap a generic I/O failure on `path`.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        LinkError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_display_names_offending_path() {
        let err = LinkError::DirectoryConflict {
            path: PathBuf::from("/target/usr/bin"),
            reason: "found a regular file".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/target/usr/bin"));
        assert!(msg.contains("regular file"));
    }

    #[test]
    fn test_source_is_preserved() {
        let err = LinkError::LinkCreateFailed {
            path: PathBuf::from("/target/bin/tool"),
            target: PathBuf::from("../pkg/bin/tool"),
            source: io::Error::from(io::ErrorKind::AlreadyExists),
        };
        let source = err.source().unwrap();
        let io_err = source.downcast_ref::<io::Error>().unwrap();
        assert_eq!(io_err.kind(), io::ErrorKind::AlreadyExists);
    }
}
