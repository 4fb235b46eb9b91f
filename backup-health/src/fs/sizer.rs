//! Builds the file-size map of a single backup generation.

use super::generations::immediate_entries;
use crate::history::model::{Generation, SkippedEntry};
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::DirEntry;

/// Size every direct file child of `root/name`.
///
/// Subdirectories are ignored. Symlinks are resolved to their target; a link
/// pointing at a directory is ignored like a directory. An entry whose
/// metadata cannot be read is recorded in [`Generation::skipped`] and the pass
/// continues. So are entries whose names are not valid UTF-8 and become
/// indistinguishable from another entry once converted.
///
/// `name` is the directory name as stored on disk; the generation is labelled
/// with its lossy UTF-8 form.
///
/// # Returns
/// * `Err(io::Error)` - Only if the generation directory itself cannot be read
pub fn size_generation(root: &Path, name: impl AsRef<OsStr>) -> std::io::Result<Generation> {
    let dir = root.join(name.as_ref());
    let mut generation = Generation::new(name.as_ref().to_string_lossy());

    // Converted name -> sizes of every entry that maps to it
    let mut sized: BTreeMap<String, Vec<u64>> = BTreeMap::new();

    for entry in immediate_entries(&dir) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                let file_name = e
                    .path()
                    .and_then(|p| p.file_name())
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                skip(&mut generation, file_name, e.to_string());
                continue;
            }
        };

        if entry.file_type().is_dir() {
            debug!(generation = %generation.name, entry = %entry.path().display(), "Skipping nested directory");
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().into_owned();
        match file_size(&entry) {
            Ok(Some(size)) => sized.entry(file_name).or_default().push(size),
            Ok(None) => {
                debug!(generation = %generation.name, entry = %entry.path().display(), "Skipping link to directory");
            }
            Err(e) => skip(&mut generation, file_name, e.to_string()),
        }
    }

    for (file_name, sizes) in sized {
        if let [size] = sizes.as_slice() {
            generation.files.insert(file_name, *size);
            continue;
        }

        let reason = format!(
            "{} entries share this name after UTF-8 conversion",
            sizes.len()
        );
        for _ in &sizes {
            skip(&mut generation, file_name.clone(), reason.clone());
        }
    }

    debug!(generation = %generation.name, files = generation.files.len(), "Sized generation");

    Ok(generation)
}

/// Size of a file entry, `None` for a symlink whose target is a directory.
fn file_size(entry: &DirEntry) -> std::io::Result<Option<u64>> {
    let metadata = if entry.path_is_symlink() {
        std::fs::metadata(entry.path())?
    } else {
        entry.metadata()?
    };

    if metadata.is_dir() {
        return Ok(None);
    }

    Ok(Some(metadata.len()))
}

fn skip(generation: &mut Generation, file_name: String, reason: String) {
    warn!(
        generation = %generation.name,
        file = %file_name,
        error = %reason,
        "Error getting file info, skipping entry"
    );
    generation.skipped.push(SkippedEntry {
        name: file_name,
        reason,
    });
}
