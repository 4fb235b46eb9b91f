//! Utility modules for the backup health check.

pub mod bytes;
pub mod errors;
pub mod logger;

pub use errors::{ExecutionError, HealthError, Result};
