//! Error types for a benchmark run.
//!
//! Every variant is fatal to the run that raised it: there is no caller to
//! hand a partial result back to, so the binary reports the error and exits.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a benchmark run.
#[derive(Debug, Error)]
pub enum BenchError {
    /// The cycle counter could not be calibrated against wall-clock time.
    #[error("cycle counter unavailable: {reason}")]
    TimerUnavailable {
        /// What went wrong during calibration.
        reason: String,
    },

    /// Pinning the measuring thread to a CPU failed.
    #[error("failed to pin measuring thread to CPU {cpu}: {reason}")]
    Affinity {
        /// CPU index that was requested.
        cpu: usize,
        /// Underlying OS error.
        reason: String,
    },

    /// A configuration value is out of range.
    #[error("invalid configuration for `{field}`: {reason}")]
    InvalidConfig {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// Writing the JSON report failed.
    #[error("failed to write report to {}: {source}", path.display())]
    ReportIo {
        /// Path we attempted to write.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Report serialization failed.
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl BenchError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        BenchError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BenchError>;
