//! Enumerates backup generations under the backup root.
//!
//! Each immediate subdirectory of the root is one generation. Names must sort
//! lexicographically in creation order (ISO-8601 timestamps do).

use std::ffi::OsString;
use std::path::Path;
use walkdir::WalkDir;

/// Iterate the immediate children of `dir` without following symlinks.
///
/// An unreadable `dir` surfaces as the first error of the iterator.
pub(crate) fn immediate_entries(dir: &Path) -> walkdir::IntoIter {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .into_iter()
}

/// List generation directory names as stored on disk, newest first.
///
/// Names are kept as `OsString` so a directory whose name is not valid UTF-8
/// can still be opened.
pub fn list_generation_dirs(root: &Path) -> std::io::Result<Vec<OsString>> {
    let mut names = Vec::new();

    for entry in immediate_entries(root) {
        let entry = entry?;

        if !entry.file_type().is_dir() {
            continue;
        }

        names.push(entry.file_name().to_os_string());
    }

    names.sort_by(|a, b| b.cmp(a));

    Ok(names)
}

/// List generation names, newest first.
///
/// # Returns
/// * `Ok(names)` - Possibly empty when no backup exists yet
/// * `Err(io::Error)` - If the root is missing or cannot be read
pub fn list_generations(root: &Path) -> std::io::Result<Vec<String>> {
    Ok(list_generation_dirs(root)?
        .iter()
        .map(|name| name.to_string_lossy().into_owned())
        .collect())
}
