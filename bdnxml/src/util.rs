//! Miscellaneous path utilities.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{Error, Result};

/// Do `a` and `b` name the same file on disk? A path which doesn't exist is
/// never the same as anything.
pub(crate) fn is_same_file(a: &Path, b: &Path) -> Result<bool> {
    if !b.exists() {
        return Ok(false);
    }
    let a = fs::canonicalize(a).map_err(|e| Error::io(a, e))?;
    let b = fs::canonicalize(b).map_err(|e| Error::io(b, e))?;
    Ok(a == b)
}

/// The directory containing `path`, or `.` for a bare file name.
pub(crate) fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Build `{dir}/{stem}{suffix}{ext}` from the file name of `path`.
pub(crate) fn suffixed_path(dir: &Path, path: &Path, suffix: &str) -> Result<PathBuf> {
    Ok(dir.join(suffixed_file_name(path, suffix)?))
}

/// Build `{stem}{suffix}{ext}` from the file name of `path`.
pub(crate) fn suffixed_file_name(path: &Path, suffix: &str) -> Result<OsString> {
    let stem = path.file_stem().ok_or_else(|| Error::InvalidPath {
        path: path.to_owned(),
    })?;
    let mut name = stem.to_owned();
    name.push(suffix);
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    Ok(name)
}

#[test]
fn suffixed_path_keeps_extension() {
    let out = suffixed_path(Path::new("out"), Path::new("imgs/sub_0001.png"), ".crop").unwrap();
    assert_eq!(out, Path::new("out/sub_0001.crop.png"));
    let out = suffixed_path(Path::new("."), Path::new("README"), "").unwrap();
    assert_eq!(out, Path::new("./README"));
}

#[test]
fn parent_dir_of_bare_name_is_current_dir() {
    assert_eq!(parent_dir(Path::new("a.xml")), Path::new("."));
    assert_eq!(parent_dir(Path::new("/tmp/a.xml")), Path::new("/tmp"));
}
