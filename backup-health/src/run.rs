//! One health-check run: back up, inspect, report, notify.

use crate::config::{OutputFormat, Settings};
use crate::executor::BackupRunner;
use crate::history::{check_backup_history, format_report, render_json, HistoryOutcome, HistoryReport};
use crate::notify::Notifier;
use crate::utils::{HealthError, Result};
use std::io::Write;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub history: HistoryOutcome,

    /// Whether the report was handed to the notifier successfully
    pub notified: bool,
}

/// Run the health check once.
///
/// The report is written to `out` before delivery is attempted, so a failed
/// notification never loses it. Any fatal error aborts the remaining steps.
pub async fn run_health_check<N, W>(
    settings: &Settings,
    runner: Option<&dyn BackupRunner>,
    notifier: Option<&N>,
    out: &mut W,
) -> Result<RunOutcome>
where
    N: Notifier,
    W: Write,
{
    if let Some(runner) = runner {
        runner.run_backup()?;
        info!("Backup script finished");
    }

    let history = check_backup_history(&settings.backup_path, settings.generations)?;

    let report = match &history {
        HistoryOutcome::NoBackup => {
            info!("backup does not exist, no health status message sent");
            return Ok(RunOutcome {
                history,
                notified: false,
            });
        }
        HistoryOutcome::SingleGeneration(name) => {
            info!(generation = %name, "Only one backup generation, nothing to compare");
            HistoryReport::default()
        }
        HistoryOutcome::Compared(report) => {
            info!(comparisons = report.comparisons.len(), "Compared backup generations");
            report.clone()
        }
    };

    write_report(out, settings, &history, &report)?;

    let notified = match notifier {
        Some(notifier) => {
            info!("backup exists, send out health status message");
            notifier.notify(&report).await?;
            true
        }
        None => false,
    };

    Ok(RunOutcome { history, notified })
}

fn write_report<W: Write>(
    out: &mut W,
    settings: &Settings,
    history: &HistoryOutcome,
    report: &HistoryReport,
) -> Result<()> {
    let rendered = match settings.format {
        OutputFormat::Json => render_json(report)? + "\n",
        OutputFormat::Text => match history {
            HistoryOutcome::SingleGeneration(name) => {
                format!("Backup {name} exists, no previous generation to compare.\n")
            }
            _ => format_report(report, settings.ignore_threshold),
        },
    };

    out.write_all(rendered.as_bytes())
        .and_then(|_| out.flush())
        .map_err(|e| HealthError::io("<stdout>", e))
}
