//! Backup Health Library
//!
//! Runs the database backup script, compares the newest backup generations by
//! file size and delivers the resulting report.

pub mod config;
pub mod executor;
pub mod fs;
pub mod history;
pub mod notify;
pub mod run;
pub mod utils;

// Re-export commonly used types
pub use config::{Args, Settings};
pub use history::{HistoryOutcome, HistoryReport};
pub use run::{run_health_check, RunOutcome};
pub use utils::errors::HealthError;
pub type Result<T> = std::result::Result<T, HealthError>;
