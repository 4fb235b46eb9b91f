//! Size-based comparison of two backup generations.

use super::model::{FileComparisonRecord, FileStatus, Generation};
use crate::utils::bytes::{format_bytes, format_delta};

/// Compare two generations file by file.
///
/// Files of `older` become `existing` or `deleted` records, files only in
/// `newer` become `new` records. Records are ordered by file name so reports
/// are stable between runs.
pub fn diff_generations(newer: &Generation, older: &Generation) -> Vec<FileComparisonRecord> {
    let mut records: Vec<FileComparisonRecord> = older
        .files
        .iter()
        .map(|(name, &old_size)| match newer.files.get(name) {
            Some(&new_size) => existing(name, new_size, old_size),
            None => FileComparisonRecord {
                file_name: name.clone(),
                status: FileStatus::Deleted,
                file_size_new: None,
                file_size_old: Some(old_size),
                difference: None,
                difference_humanized: String::new(),
            },
        })
        .collect();

    records.extend(
        newer
            .files
            .iter()
            .filter(|(name, _)| !older.files.contains_key(*name))
            .map(|(name, &new_size)| FileComparisonRecord {
                file_name: name.clone(),
                status: FileStatus::New,
                file_size_new: Some(new_size),
                file_size_old: None,
                difference: None,
                difference_humanized: String::new(),
            }),
    );

    records.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    records
}

fn existing(name: &str, new_size: u64, old_size: u64) -> FileComparisonRecord {
    let difference = signed_difference(new_size, old_size);

    FileComparisonRecord {
        file_name: name.to_string(),
        status: FileStatus::Existing,
        file_size_new: Some(new_size),
        file_size_old: Some(old_size),
        difference: Some(difference),
        difference_humanized: humanize_difference(difference, old_size, new_size),
    }
}

/// `new - old`, saturated to the `i64` range.
fn signed_difference(new_size: u64, old_size: u64) -> i64 {
    let diff = i128::from(new_size) - i128::from(old_size);
    diff.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

/// Render a size change. Shrinking files get an explicit negative delta.
pub fn humanize_difference(difference: i64, old_size: u64, new_size: u64) -> String {
    if difference == 0 {
        return format!("Difference: None, no growth (Current: {})", format_bytes(new_size));
    }

    format!(
        "Difference: {} (Old: {}, New: {})",
        format_delta(difference),
        format_bytes(old_size),
        format_bytes(new_size)
    )
}
