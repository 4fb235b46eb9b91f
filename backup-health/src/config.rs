//! Configuration management for the backup health check.
//!
//! Options come from command-line flags or their environment variables,
//! layered over an optional TOML file. Flags win over the file.

use crate::history::MIN_WINDOW;
use crate::notify::{MailSettings, DEFAULT_API_URL};
use crate::utils::{HealthError, Result};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug, Default)]
#[command(name = "backup-health", author, version, about, long_about = None)]
pub struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE", env = "BACKUP_HEALTH_CONFIG")]
    pub config: Option<PathBuf>,

    /// The postmarkapp.com API token
    #[arg(long, env = "POSTMARK_TOKEN", hide_env_values = true)]
    pub postmark_token: Option<String>,

    /// The absolute path to the Postgres backup location
    #[arg(long, env = "BACKUP_PATH")]
    pub backup_path: Option<PathBuf>,

    /// The path to the config file used in the Postgres backup script
    #[arg(long, env = "CONFIG_FILE_PATH")]
    pub config_file_path: Option<PathBuf>,

    /// The path to the Postgres pass file
    #[arg(long, env = "PASS_FILE_PATH")]
    pub pass_file_path: Option<PathBuf>,

    /// The path to the backup script that should be executed
    #[arg(long, env = "BACKUP_SCRIPT_PATH")]
    pub backup_script_path: Option<PathBuf>,

    /// Size changes up to this many bytes are left out of the text report
    #[arg(long, env = "IGNORE_THRESHOLD", value_name = "BYTES")]
    pub ignore_threshold: Option<u64>,

    /// Number of newest generations to compare pairwise
    #[arg(long, env = "GENERATIONS")]
    pub generations: Option<usize>,

    /// Sender address of the health report
    #[arg(long, env = "MAIL_FROM")]
    pub mail_from: Option<String>,

    /// Recipient address of the health report
    #[arg(long, env = "MAIL_TO")]
    pub mail_to: Option<String>,

    /// Postmark template used for the health report
    #[arg(long, env = "TEMPLATE_ID")]
    pub template_id: Option<u64>,

    /// Postmark API base URL
    #[arg(long, env = "POSTMARK_API_URL")]
    pub postmark_api_url: Option<String>,

    /// Report format written to stdout
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Print the report without sending it
    #[arg(long)]
    pub dry_run: bool,

    /// Inspect the existing backups without running the backup script
    #[arg(long)]
    pub skip_backup: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// On-disk configuration. Every key is optional so flags can fill the gaps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub backup: BackupSection,
    pub report: ReportSection,
    pub notify: NotifySection,
    pub log: LogSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupSection {
    pub path: Option<PathBuf>,
    pub script_path: Option<PathBuf>,
    pub config_file_path: Option<PathBuf>,
    pub pass_file_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSection {
    pub ignore_threshold: Option<u64>,
    pub generations: Option<usize>,
    pub format: Option<OutputFormat>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifySection {
    pub postmark_token: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub template_id: Option<u64>,
    pub api_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Log level (trace, debug, info, warn, error)
    pub level: Option<String>,
}

impl FileConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| HealthError::io(path, e))?;
        let config: FileConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Paths handed to the backup script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupPaths {
    pub script_path: PathBuf,
    pub config_file_path: PathBuf,
    pub pass_file_path: PathBuf,
}

/// Validated settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub backup_path: PathBuf,

    /// `None` with `--skip-backup`
    pub backup: Option<BackupPaths>,

    pub ignore_threshold: u64,
    pub generations: usize,
    pub format: OutputFormat,

    /// `None` with `--dry-run`
    pub mail: Option<MailSettings>,
}

fn default_generations() -> usize {
    MIN_WINDOW
}

/// Level used before settings are validated, so errors can be logged.
pub fn log_level(args: &Args, file: &FileConfig) -> String {
    args.log_level
        .clone()
        .or_else(|| file.log.level.clone())
        .unwrap_or_else(|| "info".to_string())
}

impl Settings {
    /// Merge flags over the file and check that every required option is set.
    ///
    /// All missing options are reported together.
    pub fn resolve(args: Args, file: FileConfig) -> Result<Self> {
        let mut missing = Vec::new();

        let backup_path = require(args.backup_path.or(file.backup.path), "backup-path", &mut missing);

        let backup = if args.skip_backup {
            None
        } else {
            let script_path = require(
                args.backup_script_path.or(file.backup.script_path),
                "backup-script-path",
                &mut missing,
            );
            let config_file_path = require(
                args.config_file_path.or(file.backup.config_file_path),
                "config-file-path",
                &mut missing,
            );
            let pass_file_path = require(
                args.pass_file_path.or(file.backup.pass_file_path),
                "pass-file-path",
                &mut missing,
            );
            Some((script_path, config_file_path, pass_file_path))
        };

        let mail = if args.dry_run {
            None
        } else {
            let token = require(
                args.postmark_token.or(file.notify.postmark_token),
                "postmark-token",
                &mut missing,
            );
            let from = require(args.mail_from.or(file.notify.from), "mail-from", &mut missing);
            let to = require(args.mail_to.or(file.notify.to), "mail-to", &mut missing);
            let template_id = require(
                args.template_id.or(file.notify.template_id),
                "template-id",
                &mut missing,
            );
            Some((token, from, to, template_id))
        };

        if !missing.is_empty() {
            return Err(HealthError::Config(format!(
                "missing required options: {}",
                missing.join(", ")
            )));
        }

        let generations = args
            .generations
            .or(file.report.generations)
            .unwrap_or_else(default_generations);
        if generations < MIN_WINDOW {
            return Err(HealthError::Config(format!(
                "generations must be at least {MIN_WINDOW}, got {generations}"
            )));
        }

        // Everything required is present past the check above.
        let backup = backup.map(|(script, config, pass)| BackupPaths {
            script_path: script.unwrap_or_default(),
            config_file_path: config.unwrap_or_default(),
            pass_file_path: pass.unwrap_or_default(),
        });
        let mail = mail.map(|(token, from, to, template_id)| MailSettings {
            token: token.unwrap_or_default(),
            from: from.unwrap_or_default(),
            to: to.unwrap_or_default(),
            template_id: template_id.unwrap_or_default(),
            api_url: args
                .postmark_api_url
                .or(file.notify.api_url)
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        });

        Ok(Settings {
            backup_path: backup_path.unwrap_or_default(),
            backup,
            ignore_threshold: args
                .ignore_threshold
                .or(file.report.ignore_threshold)
                .unwrap_or(0),
            generations,
            format: args.format.or(file.report.format).unwrap_or_default(),
            mail,
        })
    }
}

/// Empty strings and paths count as missing, like an unset flag.
fn require<T: IsBlank>(value: Option<T>, name: &'static str, missing: &mut Vec<&'static str>) -> Option<T> {
    match value {
        Some(v) if !v.is_blank() => Some(v),
        _ => {
            missing.push(name);
            None
        }
    }
}

trait IsBlank {
    fn is_blank(&self) -> bool;
}

impl IsBlank for String {
    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }
}

impl IsBlank for PathBuf {
    fn is_blank(&self) -> bool {
        self.as_os_str().is_empty()
    }
}

impl IsBlank for u64 {
    fn is_blank(&self) -> bool {
        false
    }
}
