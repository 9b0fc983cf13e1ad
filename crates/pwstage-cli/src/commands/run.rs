//! `pwstage run`: stage files around a single program invocation.

use std::sync::Arc;

use pwstage_core::{CommandRunner, DataFile, DataManager, StageError, Task, TransferCommand};
use thiserror::Error;
use tracing::info;

use crate::cli::RunArgs;
use crate::error::{CliError, CliResult};

/// Exit code reported when the program was killed by a signal.
const SIGNALLED_EXIT_CODE: i32 = 1;

/// The wrapped program finished unsuccessfully; stage-out is skipped.
#[derive(Debug, Error)]
#[error("program exited unsuccessfully")]
struct ProgramFailed {
    code: i32,
}

pub(crate) fn handle_run(
    manager: &DataManager,
    runner: Arc<dyn CommandRunner>,
    args: RunArgs,
) -> CliResult<i32> {
    let mut inputs = parse_files(&args.stage_in)?;
    let mut outputs = parse_files(&args.stage_out)?;
    let (program, program_args) = args
        .command
        .split_first()
        .ok_or_else(|| CliError::validation("missing program to run"))?;
    let command = TransferCommand::new(program.as_str()).args(program_args.iter().cloned());

    let task = Task::fallible(move |()| {
        info!(command = %command, "running program");
        let outcome = runner.run(&command)?;
        match outcome.code {
            Some(0) => Ok(0),
            code => Err(StageError::task(ProgramFailed {
                code: code.unwrap_or(SIGNALLED_EXIT_CODE),
            })),
        }
    });
    let task = manager
        .prepare_task(&args.executor, &mut inputs, &mut outputs, task)
        .map_err(CliError::stage)?;

    match task.call(()) {
        Ok(code) => Ok(code),
        Err(StageError::Task { source }) => match source.downcast_ref::<ProgramFailed>() {
            Some(failed) => {
                info!(code = failed.code, "program failed; skipped stage-out");
                Ok(failed.code)
            }
            None => Err(CliError::stage(StageError::Task { source })),
        },
        Err(err) => Err(CliError::stage(err)),
    }
}

fn parse_files(specs: &[String]) -> CliResult<Vec<DataFile>> {
    specs.iter().map(|spec| parse_file(spec)).collect()
}

/// `URI` or `URI=LOCAL`; the first `=` separates the two.
fn parse_file(spec: &str) -> CliResult<DataFile> {
    let (uri, local) = match spec.split_once('=') {
        Some((uri, local)) if !local.is_empty() => (uri, Some(local)),
        Some((uri, _)) => (uri, None),
        None => (spec, None),
    };
    let mut file = DataFile::parse(uri).map_err(CliError::stage)?;
    if let Some(local) = local {
        file = file.with_local_path(local);
    }
    Ok(file)
}
