//! Backup script execution.
//!
//! The health check only consumes the side effect of a backup run (a new
//! generation directory) and whether it succeeded. [`BackupRunner`] is the
//! seam; [`ScriptRunner`] is the real implementation.

use crate::utils::ExecutionError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use tracing::{debug, info};

/// Produces a new backup generation.
pub trait BackupRunner {
    fn run_backup(&self) -> Result<(), ExecutionError>;
}

/// Backup script invocation settings
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    /// Shell script producing the dump
    pub script_path: PathBuf,

    /// Shell-sourceable config used by the script
    pub config_file_path: PathBuf,

    /// Exported to the script as `PGPASSFILE`
    pub pass_file_path: PathBuf,

    /// Interpreter for both the preflight and the script
    pub shell: PathBuf,

    /// Working directory of both shells; relative paths resolve against it.
    /// `None` keeps the current directory.
    pub work_dir: Option<PathBuf>,
}

impl ScriptRunner {
    pub fn new(script_path: PathBuf, config_file_path: PathBuf, pass_file_path: PathBuf) -> Self {
        Self {
            script_path,
            config_file_path,
            pass_file_path,
            shell: PathBuf::from("/bin/sh"),
            work_dir: None,
        }
    }

    /// Absolute form of `path`. POSIX `.` searches `$PATH` for a bare file
    /// name, so the shell must never see a relative path.
    fn resolve(&self, path: &Path) -> Result<PathBuf, ExecutionError> {
        let joined = match &self.work_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        };

        std::path::absolute(&joined).map_err(|e| ExecutionError::Spawn {
            path: joined.clone(),
            source: e,
        })
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.shell);
        if let Some(dir) = &self.work_dir {
            command.current_dir(dir);
        }
        command
    }

    /// Source the config file in a throwaway shell to catch syntax errors
    /// before the backup starts.
    fn preflight(&self, config_file: &Path) -> Result<(), ExecutionError> {
        let status = self
            .command()
            .arg("-c")
            .arg(". \"$1\"")
            .arg("backup-health")
            .arg(config_file)
            .status()
            .map_err(|e| spawn_error(&self.shell, e))?;

        if !status.success() {
            return Err(ExecutionError::Preflight {
                path: self.config_file_path.clone(),
                status,
            });
        }

        Ok(())
    }
}

impl BackupRunner for ScriptRunner {
    fn run_backup(&self) -> Result<(), ExecutionError> {
        if self.script_path.as_os_str().is_empty() {
            return Err(ExecutionError::EmptyPath("script path"));
        }
        if self.config_file_path.as_os_str().is_empty() {
            return Err(ExecutionError::EmptyPath("config file path"));
        }

        let config_file = self.resolve(&self.config_file_path)?;
        self.preflight(&config_file)?;
        debug!(config = %config_file.display(), "Config file sourced cleanly");

        let script = self.resolve(&self.script_path)?;
        if !script.exists() {
            return Err(ExecutionError::NotFound(script));
        }

        info!(script = %script.display(), "Running backup script");

        let status = self
            .command()
            .arg(&script)
            .env("PGPASSFILE", self.resolve(&self.pass_file_path)?)
            .status()
            .map_err(|e| spawn_error(&self.shell, e))?;

        check_status(status)
    }
}

fn check_status(status: ExitStatus) -> Result<(), ExecutionError> {
    if status.success() {
        Ok(())
    } else {
        Err(ExecutionError::ExitCode(status.code()))
    }
}

fn spawn_error(path: &Path, e: std::io::Error) -> ExecutionError {
    match e.kind() {
        ErrorKind::NotFound => ExecutionError::NotFound(path.to_path_buf()),
        ErrorKind::PermissionDenied => ExecutionError::PermissionDenied(path.to_path_buf()),
        _ => ExecutionError::Spawn {
            path: path.to_path_buf(),
            source: e,
        },
    }
}
