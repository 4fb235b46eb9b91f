//! End-to-end runs against real backup trees in temp directories.

use backup_health::config::OutputFormat;
use backup_health::executor::BackupRunner;
use backup_health::fs::list_generations;
use backup_health::history::{FileStatus, HistoryOutcome, HistoryReport};
use backup_health::notify::Notifier;
use backup_health::utils::ExecutionError;
use backup_health::{run_health_check, Result, Settings};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// Stands in for the backup script by creating a generation directory.
struct CreateGeneration {
    root: PathBuf,
    name: &'static str,
    files: &'static [(&'static str, usize)],
}

impl BackupRunner for CreateGeneration {
    fn run_backup(&self) -> std::result::Result<(), ExecutionError> {
        write_generation(&self.root, self.name, self.files);
        Ok(())
    }
}

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<HistoryReport>>,
}

impl Notifier for RecordingNotifier {
    async fn notify(&self, report: &HistoryReport) -> Result<()> {
        self.sent.lock().unwrap().push(report.clone());
        Ok(())
    }
}

fn write_generation(root: &Path, name: &str, files: &[(&str, usize)]) {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    for (file, size) in files {
        fs::write(dir.join(file), vec![b'x'; *size]).unwrap();
    }
}

fn settings(root: &Path, ignore_threshold: u64) -> Settings {
    Settings {
        backup_path: root.to_path_buf(),
        backup: None,
        ignore_threshold,
        generations: 2,
        format: OutputFormat::Text,
        mail: None,
    }
}

#[tokio::test]
async fn no_backup_sends_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let notifier = RecordingNotifier::default();
    let mut out = Vec::new();

    assert!(list_generations(temp_dir.path()).unwrap().is_empty());

    let outcome = run_health_check(&settings(temp_dir.path(), 0), None, Some(&notifier), &mut out)
        .await
        .unwrap();

    assert_eq!(outcome.history, HistoryOutcome::NoBackup);
    assert!(!outcome.notified);
    assert!(out.is_empty());
    assert!(notifier.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn single_generation_has_nothing_to_compare() {
    let temp_dir = TempDir::new().unwrap();
    write_generation(temp_dir.path(), "2024-01-01", &[("a", 10)]);
    let notifier = RecordingNotifier::default();
    let mut out = Vec::new();

    assert_eq!(list_generations(temp_dir.path()).unwrap(), vec!["2024-01-01"]);

    let outcome = run_health_check(&settings(temp_dir.path(), 0), None, Some(&notifier), &mut out)
        .await
        .unwrap();

    assert_eq!(
        outcome.history,
        HistoryOutcome::SingleGeneration("2024-01-01".to_string())
    );
    assert!(outcome.history.backup_exists());
    let text = String::from_utf8(out).unwrap();
    assert!(!text.contains("Comparison between"));

    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].is_empty());
}

#[tokio::test]
async fn backup_run_then_compare() {
    let temp_dir = TempDir::new().unwrap();
    write_generation(temp_dir.path(), "2024-01-01", &[("a", 200), ("c", 50)]);
    let runner = CreateGeneration {
        root: temp_dir.path().to_path_buf(),
        name: "2024-01-02",
        files: &[("a", 300), ("b", 100)],
    };
    let notifier = RecordingNotifier::default();
    let mut out = Vec::new();

    let outcome = run_health_check(
        &settings(temp_dir.path(), 0),
        Some(&runner),
        Some(&notifier),
        &mut out,
    )
    .await
    .unwrap();

    assert!(outcome.notified);
    let HistoryOutcome::Compared(report) = outcome.history else {
        panic!("expected a comparison");
    };
    assert_eq!(report.comparisons.len(), 1);

    let comparison = &report.comparisons[0];
    assert_eq!(comparison.backup_name, "2024-01-02");
    assert_eq!(comparison.backup_comparison_name, "2024-01-01");

    let files: Vec<_> = comparison
        .compared_files
        .iter()
        .map(|r| (r.file_name.as_str(), r.status, r.difference))
        .collect();
    assert_eq!(
        files,
        vec![
            ("a", FileStatus::Existing, Some(100)),
            ("b", FileStatus::New, None),
            ("c", FileStatus::Deleted, None),
        ]
    );

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Difference: +100.00 B (Old: 200.00 B, New: 300.00 B)"));
    assert_eq!(notifier.sent.lock().unwrap()[0], report);
}

#[tokio::test]
async fn threshold_hides_small_growth_only() {
    let temp_dir = TempDir::new().unwrap();
    write_generation(temp_dir.path(), "2024-01-01", &[("a", 200), ("c", 50)]);
    write_generation(temp_dir.path(), "2024-01-02", &[("a", 300), ("b", 100)]);
    let mut out = Vec::new();

    run_health_check(
        &settings(temp_dir.path(), 150),
        None,
        None::<&RecordingNotifier>,
        &mut out,
    )
    .await
    .unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("File: a\n"));
    assert!(!text.contains("Difference:"));
    assert!(text.contains("File: b\nStatus: new"));
    assert!(text.contains("File: c\nStatus: deleted"));
}

#[tokio::test]
async fn unreadable_root_aborts() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("missing");
    let mut out = Vec::new();

    let err = run_health_check(
        &settings(&missing, 0),
        None,
        None::<&RecordingNotifier>,
        &mut out,
    )
    .await
    .unwrap_err();

    assert!(err.to_string().contains("missing"));
}
