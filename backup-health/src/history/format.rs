//! Text and JSON rendering of a history report.

use super::model::{FileComparisonRecord, FileStatus, HistoryReport};
use crate::utils::bytes::format_bytes;
use std::fmt;

const SEPARATOR: &str = "-------------------------------------------------";

/// Text view of a report with a suppression threshold applied.
///
/// Size deltas of existing files are only printed when their magnitude is
/// strictly greater than `ignore_threshold` bytes. Status lines of new and
/// deleted files are always printed.
pub struct TextReport<'a> {
    pub report: &'a HistoryReport,
    pub ignore_threshold: u64,
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for comparison in &self.report.comparisons {
            writeln!(
                f,
                "Comparison between {} and {}:",
                comparison.backup_name, comparison.backup_comparison_name
            )?;
            for record in &comparison.compared_files {
                write_record(f, record, self.ignore_threshold)?;
            }
        }
        Ok(())
    }
}

/// Render the report as plain text, see [`TextReport`].
pub fn format_report(report: &HistoryReport, ignore_threshold: u64) -> String {
    TextReport {
        report,
        ignore_threshold,
    }
    .to_string()
}

fn write_record(
    f: &mut fmt::Formatter<'_>,
    record: &FileComparisonRecord,
    ignore_threshold: u64,
) -> fmt::Result {
    writeln!(f, "{SEPARATOR}")?;
    writeln!(f, "File: {}", record.file_name)?;

    match record.status {
        FileStatus::Existing => {
            if exceeds_threshold(record.difference.unwrap_or(0), ignore_threshold) {
                writeln!(f, "{}", record.difference_humanized)?;
            }
        }
        FileStatus::New => writeln!(
            f,
            "Status: new (Size: {})",
            format_bytes(record.file_size_new.unwrap_or(0))
        )?,
        FileStatus::Deleted => writeln!(
            f,
            "Status: deleted (Was: {})",
            format_bytes(record.file_size_old.unwrap_or(0))
        )?,
    }

    Ok(())
}

fn exceeds_threshold(difference: i64, ignore_threshold: u64) -> bool {
    difference.unsigned_abs() > ignore_threshold
}

/// Render the report as pretty-printed JSON.
pub fn render_json(report: &HistoryReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::diff::diff_generations;
    use crate::history::model::{Generation, GenerationComparison};

    fn sample_report() -> HistoryReport {
        let newer = Generation::new("2024-01-02")
            .with_file("a", 300)
            .with_file("b", 100);
        let older = Generation::new("2024-01-01")
            .with_file("a", 200)
            .with_file("c", 50);

        HistoryReport {
            comparisons: vec![GenerationComparison {
                backup_name: newer.name.clone(),
                backup_comparison_name: older.name.clone(),
                compared_files: diff_generations(&newer, &older),
            }],
        }
    }

    #[test]
    fn test_full_report() {
        let text = format_report(&sample_report(), 0);

        assert!(text.starts_with("Comparison between 2024-01-02 and 2024-01-01:\n"));
        assert!(text.contains("File: a\nDifference: +100.00 B (Old: 200.00 B, New: 300.00 B)\n"));
        assert!(text.contains("File: b\nStatus: new (Size: 100.00 B)\n"));
        assert!(text.contains("File: c\nStatus: deleted (Was: 50.00 B)\n"));
        assert_eq!(text.matches(SEPARATOR).count(), 3);
    }

    #[test]
    fn test_threshold_suppresses_small_delta() {
        let text = format_report(&sample_report(), 150);

        assert!(text.contains("File: a\n"));
        assert!(!text.contains("Difference:"));
        assert!(text.contains("Status: new"));
        assert!(text.contains("Status: deleted"));
    }

    #[test]
    fn test_threshold_boundary_is_strict() {
        assert!(!format_report(&sample_report(), 100).contains("Difference:"));
        assert!(format_report(&sample_report(), 99).contains("Difference:"));
    }

    #[test]
    fn test_unchanged_file_is_quiet() {
        let generation = Generation::new("g").with_file("same", 10);
        let report = HistoryReport {
            comparisons: vec![GenerationComparison {
                backup_name: "g".to_string(),
                backup_comparison_name: "g".to_string(),
                compared_files: diff_generations(&generation, &generation),
            }],
        };

        let text = format_report(&report, 0);
        assert!(text.contains("File: same\n"));
        assert!(!text.contains("no growth"));
    }

    #[test]
    fn test_shrink_counts_magnitude() {
        assert!(exceeds_threshold(-500, 499));
        assert!(!exceeds_threshold(-500, 500));
    }

    #[test]
    fn test_text_report_display_matches_format_report() {
        let report = sample_report();
        let view = TextReport {
            report: &report,
            ignore_threshold: 150,
        };

        assert_eq!(format!("{view}"), format_report(&report, 150));
    }

    #[test]
    fn test_empty_report() {
        assert_eq!(format_report(&HistoryReport::default(), 0), "");
    }

    #[test]
    fn test_render_json() {
        let json = render_json(&sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value[0]["backup_name"], "2024-01-02");
        assert_eq!(value[0]["compared_files"][0]["difference"], 100);
        assert_eq!(value[0]["compared_files"][1]["status"], "new");
    }
}
