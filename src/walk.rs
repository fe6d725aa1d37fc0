//! Pre-order traversal of a package tree.

use std::path::Path;

use log::trace;

use crate::error::LinkError;
use crate::runtime::{EntryKind, Runtime, combine};

/// Callback invoked for every entry of a walked tree.
///
/// Returning an error aborts the walk.
pub trait Visitor {
    fn visit(&mut self, path: &Path, kind: EntryKind) -> Result<(), LinkError>;
}

impl<F> Visitor for F
where
    F: FnMut(&Path, EntryKind) -> Result<(), LinkError>,
{
    fn visit(&mut self, path: &Path, kind: EntryKind) -> Result<(), LinkError> {
        self(path, kind)
    }
}

/// Recursive directory walker.
///
/// Each entry is handed to the visitor before the walker descends into it,
/// in the order the directory enumerates them. Nothing is cached between
/// walks.
pub struct TreeWalker<'a, R: Runtime> {
    runtime: &'a R,
}

impl<'a, R: Runtime> TreeWalker<'a, R> {
    pub fn new(runtime: &'a R) -> Self {
        Self { runtime }
    }

    /// Walk everything below `root`. The root itself is not visited.
    pub fn walk<V: Visitor + ?Sized>(&self, root: &Path, visitor: &mut V) -> Result<(), LinkError> {
        match self.runtime.symlink_metadata(root) {
            Ok(Some(meta)) if meta.kind == EntryKind::Directory => {}
            Ok(Some(_)) => return Err(LinkError::NotADirectory(root.to_path_buf())),
            Ok(None) => return Err(LinkError::NotFound(root.to_path_buf())),
            Err(source) => return Err(LinkError::io(root, source)),
        }
        self.walk_dir(root, visitor)
    }

    fn walk_dir<V: Visitor + ?Sized>(&self, dir: &Path, visitor: &mut V) -> Result<(), LinkError> {
        let entries = self
            .runtime
            .read_dir(dir)
            .map_err(|source| LinkError::DirectoryReadFailed {
                path: dir.to_path_buf(),
                source,
            })?;

        for entry in entries {
            if entry.name == "." || entry.name == ".." {
                continue;
            }
            let path = combine(dir, &entry.name)?;
            trace!("Visiting {:?} ({})", path, entry.kind);
            visitor.visit(&path, entry.kind)?;
            if entry.kind == EntryKind::Directory {
                self.walk_dir(&path, visitor)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{DirEntry, EntryMeta, MockRuntime, OtherKind, RealRuntime};
    use mockall::predicate::eq;
    use std::io;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn visitor<F>(f: F) -> F
    where
        F: FnMut(&Path, EntryKind) -> Result<(), LinkError>,
    {
        f
    }

    fn expect_root_dir(runtime: &mut MockRuntime, root: &'static str) {
        runtime
            .expect_symlink_metadata()
            .with(eq(PathBuf::from(root)))
            .returning(|_| Ok(Some(EntryMeta::new(EntryKind::Directory, 0o755))));
    }

    #[test]
    fn test_walk_visits_parent_before_children() {
        let mut runtime = MockRuntime::new();
        expect_root_dir(&mut runtime, "/pkg");
        runtime
            .expect_read_dir()
            .with(eq(PathBuf::from("/pkg")))
            .returning(|_| {
                Ok(vec![
                    DirEntry::new("usr", EntryKind::Directory),
                    DirEntry::new("README", EntryKind::RegularFile),
                ])
            });
        runtime
            .expect_read_dir()
            .with(eq(PathBuf::from("/pkg/usr")))
            .returning(|_| {
                Ok(vec![
                    DirEntry::new("bin", EntryKind::Directory),
                    DirEntry::new("lib", EntryKind::Symlink),
                ])
            });
        runtime
            .expect_read_dir()
            .with(eq(PathBuf::from("/pkg/usr/bin")))
            .returning(|_| Ok(vec![DirEntry::new("tool", EntryKind::RegularFile)]));

        let mut seen = Vec::new();
        TreeWalker::new(&runtime)
            .walk(Path::new("/pkg"), &mut visitor(|path, kind| {
                seen.push((path.to_path_buf(), kind));
                Ok(())
            }))
            .unwrap();

        assert_eq!(
            seen,
            vec![
                (PathBuf::from("/pkg/usr"), EntryKind::Directory),
                (PathBuf::from("/pkg/usr/bin"), EntryKind::Directory),
                (PathBuf::from("/pkg/usr/bin/tool"), EntryKind::RegularFile),
                (PathBuf::from("/pkg/usr/lib"), EntryKind::Symlink),
                (PathBuf::from("/pkg/README"), EntryKind::RegularFile),
            ]
        );
    }

    #[test]
    fn test_walk_skips_dot_entries() {
        let mut runtime = MockRuntime::new();
        expect_root_dir(&mut runtime, "/pkg");
        runtime.expect_read_dir().returning(|_| {
            Ok(vec![
                DirEntry::new(".", EntryKind::Directory),
                DirEntry::new("..", EntryKind::Directory),
                DirEntry::new(".hidden", EntryKind::RegularFile),
            ])
        });

        let mut seen = Vec::new();
        TreeWalker::new(&runtime)
            .walk(Path::new("/pkg"), &mut visitor(|path, _| {
                seen.push(path.to_path_buf());
                Ok(())
            }))
            .unwrap();

        assert_eq!(seen, vec![PathBuf::from("/pkg/.hidden")]);
    }

    #[test]
    fn test_walk_reports_other_kinds() {
        let mut runtime = MockRuntime::new();
        expect_root_dir(&mut runtime, "/pkg");
        runtime
            .expect_read_dir()
            .returning(|_| Ok(vec![DirEntry::new("fifo", EntryKind::Other(OtherKind::Fifo))]));

        let mut kinds = Vec::new();
        TreeWalker::new(&runtime)
            .walk(Path::new("/pkg"), &mut visitor(|_, kind| {
                kinds.push(kind);
                Ok(())
            }))
            .unwrap();

        assert_eq!(kinds, vec![EntryKind::Other(OtherKind::Fifo)]);
    }

    #[test]
    fn test_walk_visitor_error_aborts() {
        let mut runtime = MockRuntime::new();
        expect_root_dir(&mut runtime, "/pkg");
        runtime
            .expect_read_dir()
            .with(eq(PathBuf::from("/pkg")))
            .returning(|_| {
                Ok(vec![
                    DirEntry::new("a", EntryKind::RegularFile),
                    DirEntry::new("b", EntryKind::Directory),
                    DirEntry::new("c", EntryKind::RegularFile),
                ])
            });
        // "/pkg/b" must never be read because the visit of "b" fails

        let mut visited = 0;
        let err = TreeWalker::new(&runtime)
            .walk(Path::new("/pkg"), &mut visitor(|path, _| {
                visited += 1;
                if path.ends_with("b") {
                    return Err(LinkError::NotFound(path.to_path_buf()));
                }
                Ok(())
            }))
            .unwrap_err();

        assert!(matches!(err, LinkError::NotFound(p) if p == Path::new("/pkg/b")));
        assert_eq!(visited, 2);
    }

    #[test]
    fn test_walk_missing_root() {
        let mut runtime = MockRuntime::new();
        runtime.expect_symlink_metadata().returning(|_| Ok(None));

        let err = TreeWalker::new(&runtime)
            .walk(Path::new("/missing"), &mut visitor(|_, _| Ok(())))
            .unwrap_err();
        assert!(matches!(err, LinkError::NotFound(_)));
    }

    #[test]
    fn test_walk_root_not_a_directory() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_symlink_metadata()
            .returning(|_| Ok(Some(EntryMeta::new(EntryKind::RegularFile, 0o644))));

        let err = TreeWalker::new(&runtime)
            .walk(Path::new("/pkg/pkgfiles"), &mut visitor(|_, _| Ok(())))
            .unwrap_err();
        assert!(matches!(err, LinkError::NotADirectory(_)));
    }

    #[test]
    fn test_walk_read_failure() {
        let mut runtime = MockRuntime::new();
        expect_root_dir(&mut runtime, "/pkg");
        runtime
            .expect_read_dir()
            .returning(|_| Err(io::Error::from(io::ErrorKind::PermissionDenied)));

        let err = TreeWalker::new(&runtime)
            .walk(Path::new("/pkg"), &mut visitor(|_, _| Ok(())))
            .unwrap_err();
        match err {
            LinkError::DirectoryReadFailed { path, source } => {
                assert_eq!(path, PathBuf::from("/pkg"));
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_walk_real_tree() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("etc/conf.d")).unwrap();
        std::fs::write(root.join("etc/conf.d/a.conf"), "a").unwrap();
        std::fs::write(root.join("etc/hosts"), "h").unwrap();

        let mut seen = Vec::new();
        TreeWalker::new(&RealRuntime)
            .walk(root, &mut visitor(|path, kind| {
                seen.push((path.strip_prefix(root).unwrap().to_path_buf(), kind));
                Ok(())
            }))
            .unwrap();

        assert_eq!(seen.len(), 4);
        let position = |p: &str| seen.iter().position(|(q, _)| q == Path::new(p)).unwrap();
        assert!(position("etc") < position("etc/conf.d"));
        assert!(position("etc/conf.d") < position("etc/conf.d/a.conf"));
        assert!(position("etc") < position("etc/hosts"));
    }
}
