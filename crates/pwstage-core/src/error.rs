//! # Design
//!
//! - Provide structured, constant-message errors for staging operations.
//! - Capture operation context (paths, programs, exit codes) so failures are reproducible in tests.
//! - Preserve source errors without interpolating context into error messages.

use std::error::Error as StdError;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::model::Direction;

/// Result type for staging operations.
pub type StageResult<T> = Result<T, StageError>;

/// Errors produced while planning or executing data staging.
#[derive(Debug, Error)]
pub enum StageError {
    /// IO failures while preparing local directories.
    #[error("staging io failure")]
    Io {
        /// Operation that triggered the IO failure.
        operation: &'static str,
        /// Path involved in the IO failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The transfer program could not be started.
    #[error("failed to spawn transfer program")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The transfer program exited unsuccessfully.
    #[error("transfer command failed")]
    TransferFailed {
        /// Program that was executed.
        program: String,
        /// Rendered command line, for diagnostics.
        command: String,
        /// Exit code; `None` when the process was terminated by a signal.
        code: Option<i32>,
    },
    /// The executor is not present in the registry.
    #[error("unknown executor")]
    UnknownExecutor {
        /// Executor name supplied by the caller.
        name: String,
    },
    /// No registered provider can stage the file.
    #[error("no staging provider for file")]
    NoProvider {
        /// Scheme of the file that could not be staged.
        scheme: String,
        /// Direction that was requested.
        direction: Direction,
    },
    /// File descriptor validation failures.
    #[error("invalid file descriptor")]
    InvalidFile {
        /// Field that failed validation.
        field: &'static str,
        /// Static reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
    /// Provider configuration validation failures.
    #[error("invalid provider configuration")]
    InvalidProvider {
        /// Provider that rejected the value.
        provider: &'static str,
        /// Field that failed validation.
        field: &'static str,
        /// Static reason for the failure.
        reason: &'static str,
        /// Offending value.
        value: String,
    },
    /// The wrapped task itself failed.
    #[error("task failed")]
    Task {
        /// Underlying task failure.
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl StageError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) const fn invalid_file(
        field: &'static str,
        reason: &'static str,
        value: Option<String>,
    ) -> Self {
        Self::InvalidFile {
            field,
            reason,
            value,
        }
    }

    /// Wrap an arbitrary task failure.
    pub fn task(source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::Task {
            source: source.into(),
        }
    }

    /// Whether this error reports an unsuccessful transfer program.
    #[must_use]
    pub const fn is_transfer_failure(&self) -> bool {
        matches!(self, Self::TransferFailed { .. } | Self::Spawn { .. })
    }
}
