//! Types describing backup generations and the differences between them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One backup generation: a directory name and the sizes of its direct files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Generation {
    pub name: String,

    /// File name -> size in bytes
    pub files: BTreeMap<String, u64>,

    /// Entries that could not be sized and were left out of `files`
    pub skipped: Vec<SkippedEntry>,
}

impl Generation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder used by tests and callers that already know the sizes.
    pub fn with_file(mut self, file_name: impl Into<String>, size: u64) -> Self {
        self.files.insert(file_name.into(), size);
        self
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// A directory entry whose metadata lookup failed while sizing a generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEntry {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Existing,
    New,
    Deleted,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Existing => "existing",
            FileStatus::New => "new",
            FileStatus::Deleted => "deleted",
        }
    }
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of one file name between two adjacent generations.
///
/// `file_size_new` is set for `existing` and `new`, `file_size_old` for
/// `existing` and `deleted`. `difference` is only set for `existing`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileComparisonRecord {
    pub file_name: String,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size_new: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size_old: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difference: Option<i64>,
    pub difference_humanized: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationComparison {
    /// Newer generation
    pub backup_name: String,

    /// Older generation it was compared against
    pub backup_comparison_name: String,

    /// Sorted by file name
    pub compared_files: Vec<FileComparisonRecord>,
}

/// Adjacent-pair comparisons, newest pair first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryReport {
    pub comparisons: Vec<GenerationComparison>,
}

impl HistoryReport {
    /// Name of the newest generation covered by the report.
    pub fn latest_backup(&self) -> Option<&str> {
        self.comparisons.first().map(|c| c.backup_name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.comparisons.is_empty()
    }
}

/// What the backup root looked like when the history was checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryOutcome {
    /// No generation directory exists yet.
    NoBackup,

    /// Exactly one generation exists, there is nothing to compare it with.
    SingleGeneration(String),

    Compared(HistoryReport),
}

impl HistoryOutcome {
    pub fn backup_exists(&self) -> bool {
        !matches!(self, HistoryOutcome::NoBackup)
    }
}
