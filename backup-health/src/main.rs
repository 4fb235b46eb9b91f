//! Backup Health - Main entry point
//!
//! Runs the backup script, diffs the newest generations and mails the report.

use backup_health::config::{self, Args, FileConfig, Settings};
use backup_health::executor::{BackupRunner, ScriptRunner};
use backup_health::notify::PostmarkNotifier;
use backup_health::{run_health_check, utils};
use clap::Parser;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    // Load configuration
    let file = match &args.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };

    // Initialize logging
    utils::logger::init(&config::log_level(&args, &file))?;

    tracing::info!("Starting backup-health v{}", env!("CARGO_PKG_VERSION"));

    let settings = match Settings::resolve(args, file) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("{}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    let runner = settings.backup.as_ref().map(|paths| {
        ScriptRunner::new(
            paths.script_path.clone(),
            paths.config_file_path.clone(),
            paths.pass_file_path.clone(),
        )
    });
    let notifier = settings.mail.clone().map(PostmarkNotifier::new);

    let mut stdout = std::io::stdout().lock();
    let result = run_health_check(
        &settings,
        runner.as_ref().map(|r| r as &dyn BackupRunner),
        notifier.as_ref(),
        &mut stdout,
    )
    .await;

    match result {
        Ok(outcome) => {
            tracing::info!(
                backup_exists = outcome.history.backup_exists(),
                notified = outcome.notified,
                "Health check complete"
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            Ok(ExitCode::FAILURE)
        }
    }
}
