//! Path arithmetic on canonical absolute paths.
//!
//! These functions work on the raw bytes of a path and never touch the
//! filesystem. Callers canonicalize first (see [`super::Runtime::canonicalize`]).

use std::ffi::OsString;
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::path::{Path, PathBuf};

use crate::error::LinkError;

const SEPARATOR: u8 = b'/';

/// Longest path (in bytes, excluding the terminating NUL) the platform accepts.
pub const MAX_PATH_LEN: usize = nix::libc::PATH_MAX as usize - 1;

fn bytes(path: &Path) -> &[u8] {
    path.as_os_str().as_bytes()
}

fn absolute_bytes(path: &Path) -> Result<&[u8], LinkError> {
    let b = bytes(path);
    if b.first() != Some(&SEPARATOR) {
        return Err(LinkError::NotAbsolute(path.to_path_buf()));
    }
    Ok(b)
}

fn trim_leading_separators(mut b: &[u8]) -> &[u8] {
    while let [SEPARATOR, rest @ ..] = b {
        b = rest;
    }
    b
}

fn checked_path(out: Vec<u8>) -> Result<PathBuf, LinkError> {
    let too_long = out.len() > MAX_PATH_LEN;
    let path = PathBuf::from(OsString::from_vec(out));
    if too_long {
        return Err(LinkError::PathTooLong(path));
    }
    Ok(path)
}

/// Join `dir` and a relative `name`, inserting exactly one separator.
///
/// Fails with [`LinkError::PathTooLong`] instead of producing a path the
/// kernel would reject.
pub fn combine(dir: &Path, name: impl AsRef<Path>) -> Result<PathBuf, LinkError> {
    let dir = bytes(dir);
    let name = trim_leading_separators(bytes(name.as_ref()));
    let needs_separator = !dir.is_empty() && !dir.ends_with(&[SEPARATOR]) && !name.is_empty();

    let mut out = Vec::with_capacity(dir.len() + 1 + name.len());
    out.extend_from_slice(dir);
    if needs_separator {
        out.push(SEPARATOR);
    }
    out.extend_from_slice(name);
    checked_path(out)
}

/// Offset of the last separator shared by `a` and `b` before they diverge.
///
/// Returns 0 when the paths diverge right after the root. The end of a path
/// counts as a separator when the other path has a separator (or also ends)
/// at the same offset, so the result is always a segment boundary:
/// `/a/b` and `/a/b/c` share 4, while `/a/x` and `/a/xy` share only 2.
pub fn common_prefix_length(a: &Path, b: &Path) -> Result<usize, LinkError> {
    let a = absolute_bytes(a)?;
    let b = absolute_bytes(b)?;

    let mut last = 0;
    let mut i = 1;
    while i < a.len() && i < b.len() && a[i] == b[i] {
        if a[i] == SEPARATOR {
            last = i;
        }
        i += 1;
    }

    let at_boundary = |p: &[u8]| i == p.len() || p[i] == SEPARATOR;
    if at_boundary(a) && at_boundary(b) {
        last = i;
    }
    Ok(last)
}

/// Path that, resolved relative to `from_dir`, reaches `to_file`.
///
/// Both inputs must already be canonical absolute paths.
pub fn relative_path(from_dir: &Path, to_file: &Path) -> Result<PathBuf, LinkError> {
    let prefix = common_prefix_length(from_dir, to_file)?;
    let from = bytes(from_dir);
    let to = bytes(to_file);

    let ups = from[prefix..]
        .split(|&c| c == SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .count();
    let rest = trim_leading_separators(&to[prefix..]);

    let mut out = Vec::with_capacity(ups * 3 + rest.len());
    for _ in 0..ups {
        out.extend_from_slice(b"../");
    }
    if rest.is_empty() {
        out.pop();
    } else {
        out.extend_from_slice(rest);
    }
    if out.is_empty() {
        out.push(b'.');
    }
    checked_path(out)
}

/// Strip `prefix` from `full`, requiring the prefix to end on a segment
/// boundary. Leading separators are removed from the remainder.
pub fn remainder_after_prefix(prefix: &Path, full: &Path) -> Result<PathBuf, LinkError> {
    let not_a_prefix = || LinkError::NotAPrefix {
        prefix: prefix.to_path_buf(),
        path: full.to_path_buf(),
    };

    let p = bytes(prefix);
    let f = bytes(full);
    let rest = f.strip_prefix(p).ok_or_else(not_a_prefix)?;

    let aligned = rest.is_empty() || rest[0] == SEPARATOR || p.ends_with(&[SEPARATOR]);
    if !aligned {
        return Err(not_a_prefix());
    }
    Ok(PathBuf::from(OsString::from_vec(
        trim_leading_separators(rest).to_vec(),
    )))
}
