//! Checks run on our command-line arguments before we do any work, so that
//! mistakes are reported before the converter is ever started.
//!
//! Each function has the signature clap expects from a `value_parser`.

use std::env;
use std::path::{Path, PathBuf};

/// A command-line argument which we refuse to accept.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Expected an existing file.
    #[error("{} is not a file", .0.display())]
    NotAFile(PathBuf),

    /// Expected an existing directory.
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    /// We won't replace an existing output file.
    #[error("file {} already exists", .0.display())]
    AlreadyExists(PathBuf),

    /// We couldn't create a file in this directory.
    #[error("cannot access directory {}", .0.display())]
    DirectoryNotWritable(PathBuf),

    /// The converter isn't a file, and isn't on the `PATH` either.
    #[error("cannot find executable {}", .0.display())]
    ExecutableNotFound(PathBuf),
}

/// An existing file.
pub fn existing_file(arg: &str) -> Result<PathBuf, ValidationError> {
    let path = PathBuf::from(arg);
    if path.is_file() {
        Ok(path)
    } else {
        Err(ValidationError::NotAFile(path))
    }
}

/// An existing directory.
pub fn existing_dir(arg: &str) -> Result<PathBuf, ValidationError> {
    let path = PathBuf::from(arg);
    if path.is_dir() {
        Ok(path)
    } else {
        Err(ValidationError::NotADirectory(path))
    }
}

/// A file which doesn't exist yet, in a directory where we can create it.
pub fn future_file(arg: &str) -> Result<PathBuf, ValidationError> {
    let path = PathBuf::from(arg);
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        // Permission bits don't tell the whole story, so actually try it.
        let writable = dir.is_dir() && tempfile::tempfile_in(dir).is_ok();
        if !writable {
            return Err(ValidationError::DirectoryNotWritable(dir.to_owned()));
        }
    }
    if path.exists() {
        return Err(ValidationError::AlreadyExists(path));
    }
    Ok(path)
}

/// An executable. A bare program name is looked up on the `PATH`; anything
/// with a directory in it must be an existing file.
pub fn executable(arg: &str) -> Result<PathBuf, ValidationError> {
    let path = PathBuf::from(arg);
    if path.components().count() == 1 && !path.is_file() {
        return find_on_path(&path).ok_or(ValidationError::ExecutableNotFound(path));
    }
    if path.is_file() {
        Ok(path)
    } else {
        Err(ValidationError::ExecutableNotFound(path))
    }
}

/// Search each directory on the `PATH` for `name`.
fn find_on_path(name: &Path) -> Option<PathBuf> {
    let dirs = env::var_os("PATH")?;
    env::split_paths(&dirs)
        .flat_map(|dir| {
            let candidate = dir.join(name);
            let exe = candidate.with_extension(env::consts::EXE_EXTENSION);
            [candidate, exe]
        })
        .find(|candidate| candidate.is_file())
}
