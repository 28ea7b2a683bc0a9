//! `.sha1` pointer files.
//!
//! A pointer sits next to the file it stands for (`app.bin` -> `app.bin.sha1`)
//! and holds the lowercase hex digest of that file's content.

use crate::digest::Digest;
use crate::error::{BinError, BinResult};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

/// Suffix appended to the full target file name.
pub const POINTER_SUFFIX: &str = ".sha1";

/// Pointer path for `target`: the full file name plus [`POINTER_SUFFIX`].
pub fn pointer_path(target: &Path) -> PathBuf {
    let mut name = OsString::from(target.as_os_str());
    name.push(POINTER_SUFFIX);
    PathBuf::from(name)
}

/// True if `path`'s file name is `<something>.sha1`.
pub fn is_pointer_path(path: &Path) -> bool {
    pointer_stem(path).is_some()
}

/// Path of the file a pointer resolves to.
pub fn target_path(pointer: &Path) -> BinResult<PathBuf> {
    let stem = pointer_stem(pointer).ok_or_else(|| BinError::Naming(pointer.to_path_buf()))?;
    Ok(pointer.with_file_name(stem))
}

#[cfg(unix)]
fn pointer_stem(path: &Path) -> Option<&OsStr> {
    use std::os::unix::ffi::OsStrExt;

    path.file_name()?
        .as_bytes()
        .strip_suffix(POINTER_SUFFIX.as_bytes())
        .filter(|stem| !stem.is_empty())
        .map(OsStr::from_bytes)
}

#[cfg(not(unix))]
fn pointer_stem(path: &Path) -> Option<&OsStr> {
    path.file_name()?
        .to_str()?
        .strip_suffix(POINTER_SUFFIX)
        .filter(|stem| !stem.is_empty())
        .map(OsStr::new)
}

/// Reads and parses the digest stored in a pointer file.
pub fn read_pointer(pointer: &Path) -> BinResult<Digest> {
    let bytes = fs::read(pointer).map_err(|source| BinError::Read {
        path: pointer.to_path_buf(),
        source,
    })?;
    std::str::from_utf8(&bytes)
        .map_err(|e| BinError::format("digest", e.to_string()))
        .and_then(str::parse::<Digest>)
        .map_err(|e| e.context(format!("pointer file {}", pointer.display())))
}

/// Writes `digest` to `pointer`, replacing any previous content.
pub fn write_pointer(pointer: &Path, digest: &Digest) -> BinResult<()> {
    fs::write(pointer, digest.to_hex()).map_err(|source| BinError::Write {
        path: pointer.to_path_buf(),
        source,
    })
}
