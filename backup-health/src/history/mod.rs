//! Backup history: generation listing, sizing and pairwise comparison.

pub mod diff;
pub mod format;
pub mod model;

pub use diff::diff_generations;
pub use format::{format_report, render_json, TextReport};
pub use model::{
    FileComparisonRecord, FileStatus, Generation, GenerationComparison, HistoryOutcome,
    HistoryReport, SkippedEntry,
};

use crate::fs::{list_generation_dirs, size_generation};
use crate::utils::{HealthError, Result};
use std::path::Path;
use tracing::info;

/// Smallest meaningful window: one pair of generations.
pub const MIN_WINDOW: usize = 2;

/// Inspect the backup root and compare the newest `window` generations.
///
/// Adjacent generations are compared pairwise, newest pair first, so a window
/// of N yields up to N-1 comparisons.
pub fn check_backup_history(root: &Path, window: usize) -> Result<HistoryOutcome> {
    let names = list_generation_dirs(root).map_err(|e| HealthError::io(root, e))?;

    info!(root = %root.display(), generations = names.len(), "Read backup root");

    match names.as_slice() {
        [] => return Ok(HistoryOutcome::NoBackup),
        [only] => {
            return Ok(HistoryOutcome::SingleGeneration(
                only.to_string_lossy().into_owned(),
            ))
        }
        _ => {}
    }

    let generations = names
        .iter()
        .take(window.max(MIN_WINDOW))
        .map(|name| size_generation(root, name).map_err(|e| HealthError::io(root.join(name), e)))
        .collect::<Result<Vec<_>>>()?;

    let comparisons = generations
        .windows(2)
        .map(|pair| GenerationComparison {
            backup_name: pair[0].name.clone(),
            backup_comparison_name: pair[1].name.clone(),
            compared_files: diff_generations(&pair[0], &pair[1]),
        })
        .collect();

    Ok(HistoryOutcome::Compared(HistoryReport { comparisons }))
}
