//! Error types for the backup health check.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HealthError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Backup execution failed: {0}")]
    Execution(#[from] ExecutionError),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config file error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl HealthError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HealthError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failure modes of the backup script invocation.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("{0} is empty")]
    EmptyPath(&'static str),

    #[error("sourcing config file {} failed ({status})", path.display())]
    Preflight {
        path: PathBuf,
        status: std::process::ExitStatus,
    },

    /// `None` when the script was terminated by a signal.
    #[error("exit code error: {}", .0.map(|c| c.to_string()).unwrap_or_else(|| "signal".to_string()))]
    ExitCode(Option<i32>),

    #[error("no such file: {}", .0.display())]
    NotFound(PathBuf),

    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("failed to spawn {}: {source}", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, HealthError>;
