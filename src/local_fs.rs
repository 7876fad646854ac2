//! Capability-scoped reads of local files named on the command line.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};

/// Reads a whole file, resolving relative paths against the current
/// directory.
pub(crate) fn read_ambient(path: &Utf8Path) -> Result<Vec<u8>, String> {
    let resolved = resolve(path)?;
    let (dir, file_name) = open_parent(&resolved)?;
    dir.read(file_name).map_err(|err| err.to_string())
}

/// Reads a whole UTF-8 file, resolving relative paths against the current
/// directory.
pub(crate) fn read_to_string_ambient(path: &Utf8Path) -> Result<String, String> {
    let resolved = resolve(path)?;
    let (dir, file_name) = open_parent(&resolved)?;
    dir.read_to_string(file_name).map_err(|err| err.to_string())
}

// `..` components and symlinks are resolved here so the capability handle
// only ever sees a plain file name inside its directory.
fn resolve(path: &Utf8Path) -> Result<Utf8PathBuf, String> {
    path.canonicalize_utf8().map_err(|err| err.to_string())
}

fn open_parent(path: &Utf8Path) -> Result<(Dir, &str), String> {
    let parent = path
        .parent()
        .ok_or_else(|| format!("path has no parent directory: {path}"))?;
    let file_name = path
        .file_name()
        .ok_or_else(|| format!("path has no file name: {path}"))?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|err| err.to_string())?;
    Ok((dir, file_name))
}
