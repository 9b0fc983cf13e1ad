//! Subprocess execution seam used by the task wrappers.

use std::process::{Command, ExitStatus};

use tracing::debug;

use crate::command::TransferCommand;
use crate::error::{StageError, StageResult};

/// Exit information of a finished transfer program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome {
    /// Exit code; `None` when the process was terminated by a signal.
    pub code: Option<i32>,
}

impl ExitOutcome {
    /// Outcome of a process that exited with `code`.
    #[must_use]
    pub const fn code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    /// Outcome of a process killed by a signal.
    #[must_use]
    pub const fn signalled() -> Self {
        Self { code: None }
    }

    /// Only exit status zero counts as success.
    #[must_use]
    pub const fn success(self) -> bool {
        matches!(self.code, Some(0))
    }
}

impl From<ExitStatus> for ExitOutcome {
    fn from(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

/// Runs a transfer command to completion, blocking the caller.
pub trait CommandRunner: Send + Sync {
    /// Execute `command` and report how it exited.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::Spawn`] when the program cannot be started.
    fn run(&self, command: &TransferCommand) -> StageResult<ExitOutcome>;
}

/// Production runner: spawns the program directly (no shell) with inherited stdio.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, command: &TransferCommand) -> StageResult<ExitOutcome> {
        debug!(command = %command, "spawning transfer program");
        let status = Command::new(&command.program)
            .args(&command.args)
            .status()
            .map_err(|source| StageError::Spawn {
                program: command.program.clone(),
                source,
            })?;
        Ok(status.into())
    }
}
