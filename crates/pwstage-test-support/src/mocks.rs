//! Recording command runner for exercising wrappers without real transfers.

use std::collections::VecDeque;
use std::io;
use std::sync::{Mutex, MutexGuard, PoisonError};

use pwstage_core::{CommandRunner, ExitOutcome, StageError, StageResult, TransferCommand};

/// How the next recorded command should appear to finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedExit {
    /// Exit with the given status code.
    Code(i32),
    /// Terminated by a signal.
    Signalled,
    /// The program could not be started.
    SpawnFailure,
}

#[derive(Default)]
struct State {
    script: VecDeque<ScriptedExit>,
    commands: Vec<TransferCommand>,
}

/// Runner that records every command and replays scripted exits.
///
/// Once the script is exhausted every command succeeds.
#[derive(Default)]
pub struct RecordingRunner {
    state: Mutex<State>,
}

impl RecordingRunner {
    /// Runner where every command succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner replaying `script` in order.
    #[must_use]
    pub fn with_script(script: impl IntoIterator<Item = ScriptedExit>) -> Self {
        Self {
            state: Mutex::new(State {
                script: script.into_iter().collect(),
                commands: Vec::new(),
            }),
        }
    }

    /// Commands executed so far, in order.
    #[must_use]
    pub fn commands(&self) -> Vec<TransferCommand> {
        self.lock().commands.clone()
    }

    /// Rendered command lines executed so far, in order.
    #[must_use]
    pub fn rendered(&self) -> Vec<String> {
        self.lock()
            .commands
            .iter()
            .map(TransferCommand::render)
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, command: &TransferCommand) -> StageResult<ExitOutcome> {
        let mut state = self.lock();
        state.commands.push(command.clone());
        match state.script.pop_front().unwrap_or(ScriptedExit::Code(0)) {
            ScriptedExit::Code(code) => Ok(ExitOutcome::code(code)),
            ScriptedExit::Signalled => Ok(ExitOutcome::signalled()),
            ScriptedExit::SpawnFailure => Err(StageError::Spawn {
                program: command.program.clone(),
                source: io::Error::from(io::ErrorKind::NotFound),
            }),
        }
    }
}
