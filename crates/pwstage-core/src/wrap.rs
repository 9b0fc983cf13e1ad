//! Shared task wrappers performing stage-in before and stage-out after a task.
//!
//! # Design
//! - One implementation for every backend; behaviour differences come from the
//!   provider's [`TransferPlan`] and [`FailurePolicy`].
//! - The transfer plan and a tracing span are fixed when the wrapper is built
//!   (submission side); the wrapped task only executes them.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{Span, debug, debug_span, warn};

use crate::command::TransferPlan;
use crate::error::{StageError, StageResult};
use crate::model::{DataFile, Direction, FailurePolicy};
use crate::provider::StagingProvider;
use crate::runner::CommandRunner;
use crate::task::Task;

/// Everything a wrapped task needs to move one file.
struct Transfer {
    plan: TransferPlan,
    policy: FailurePolicy,
    runner: Arc<dyn CommandRunner>,
    span: Span,
}

impl Transfer {
    fn prepare(
        provider: &dyn StagingProvider,
        file: &DataFile,
        direction: Direction,
        runner: Arc<dyn CommandRunner>,
    ) -> StageResult<(Self, PathBuf)> {
        let local_path = file.require_local_path()?.to_path_buf();
        let plan = provider.transfer_plan(file, direction)?;
        let span = debug_span!(
            "stage",
            provider = provider.name(),
            direction = %direction,
            remote = %file,
            local = %local_path.display(),
        );
        let transfer = Self {
            plan,
            policy: provider.failure_policy(),
            runner,
            span,
        };
        Ok((transfer, local_path))
    }

    fn execute(&self) -> StageResult<()> {
        for command in &self.plan.preflight {
            match self.runner.run(command) {
                Ok(outcome) if outcome.success() => {
                    debug!(command = %command, "preflight command completed");
                }
                Ok(outcome) => {
                    warn!(command = %command, code = ?outcome.code, "preflight command failed; continuing");
                }
                Err(err) => {
                    warn!(command = %command, error = ?err, "preflight command could not start; continuing");
                }
            }
        }

        let command = &self.plan.transfer;
        debug!(command = %command, "running transfer");
        let failure = match self.runner.run(command) {
            Ok(outcome) if outcome.success() => {
                debug!(command = %command, "transfer completed");
                return Ok(());
            }
            Ok(outcome) => StageError::TransferFailed {
                program: command.program.clone(),
                command: command.render(),
                code: outcome.code,
            },
            Err(err) => err,
        };

        match self.policy {
            FailurePolicy::FailOnError => Err(failure),
            FailurePolicy::WarnOnError => {
                warn!(
                    command = %command,
                    error = ?failure,
                    "transfer failed; continuing without staged data"
                );
                Ok(())
            }
        }
    }
}

/// Wrap `task` so that `file` is fetched onto the worker before it runs.
///
/// The wrapped task creates `working_dir` and the parent of the local path,
/// runs the transfer, then calls `task` and returns its result unchanged.
///
/// # Errors
///
/// Returns an error when the file has no resolved local path or the provider
/// cannot build a transfer plan for it.
pub fn stage_in_wrapper<A: 'static, R: 'static>(
    task: Task<A, R>,
    provider: &dyn StagingProvider,
    file: &DataFile,
    working_dir: Option<&Path>,
    runner: Arc<dyn CommandRunner>,
) -> StageResult<Task<A, R>> {
    let (transfer, local_path) = Transfer::prepare(provider, file, Direction::In, runner)?;
    let working_dir = working_dir.map(Path::to_path_buf);

    Ok(Task::fallible(move |args| {
        let _entered = transfer.span.enter();
        debug!("stage-in start");
        if let Some(dir) = working_dir.as_deref() {
            create_dir_all("create_working_dir", dir)?;
        }
        if let Some(parent) = local_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_dir_all("create_local_parent", parent)?;
        }

        transfer.execute()?;

        debug!("calling wrapped task");
        let result = task.call(args);
        debug!("returned from wrapped task");
        result
    }))
}

/// Wrap `task` so that `file` is pushed to durable storage after it returns.
///
/// A failing task skips the transfer and returns its own error.
///
/// # Errors
///
/// Returns an error when the file has no resolved local path or the provider
/// cannot build a transfer plan for it.
pub fn stage_out_wrapper<A: 'static, R: 'static>(
    task: Task<A, R>,
    provider: &dyn StagingProvider,
    file: &DataFile,
    runner: Arc<dyn CommandRunner>,
) -> StageResult<Task<A, R>> {
    let (transfer, _) = Transfer::prepare(provider, file, Direction::Out, runner)?;

    Ok(Task::fallible(move |args| {
        let _entered = transfer.span.enter();
        debug!("stage-out start; calling wrapped task");
        let result = task.call(args)?;
        debug!("returned from wrapped task; transferring");
        transfer.execute()?;
        Ok(result)
    }))
}

fn create_dir_all(operation: &'static str, path: &Path) -> StageResult<()> {
    fs::create_dir_all(path).map_err(|source| StageError::io(operation, path, source))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::command::TransferCommand;
    use crate::runner::ExitOutcome;

    struct ScriptedRunner {
        exit_code: i32,
        seen: Mutex<Vec<String>>,
    }

    impl ScriptedRunner {
        fn new(exit_code: i32) -> Arc<Self> {
            Arc::new(Self {
                exit_code,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn seen(&self) -> Vec<String> {
            self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, command: &TransferCommand) -> StageResult<ExitOutcome> {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(command.render());
            }
            Ok(ExitOutcome::code(self.exit_code))
        }
    }

    struct EchoProvider {
        policy: FailurePolicy,
    }

    impl StagingProvider for EchoProvider {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn scheme(&self) -> &str {
            "file"
        }

        fn transfer_plan(&self, file: &DataFile, direction: Direction) -> StageResult<TransferPlan> {
            let local = file.require_local_path()?.display().to_string();
            Ok(TransferPlan::single(
                TransferCommand::new("copy").args([direction.as_str(), file.path.as_str(), local.as_str()]),
            ))
        }

        fn failure_policy(&self) -> FailurePolicy {
            self.policy
        }
    }

    fn scratch() -> StageResult<tempfile::TempDir> {
        tempfile::Builder::new()
            .prefix("pwstage-wrap-")
            .tempdir()
            .map_err(|source| StageError::io("tempdir", std::env::temp_dir(), source))
    }

    #[test]
    fn stage_in_creates_directories_and_returns_task_result() -> StageResult<()> {
        let temp = scratch()?;
        let working_dir = temp.path().join("work");
        let local = working_dir.join("nested/in.txt");
        let file = DataFile::new("file", "", "/remote/in.txt").with_local_path(&local);
        let runner = ScriptedRunner::new(0);
        let provider = EchoProvider {
            policy: FailurePolicy::FailOnError,
        };

        let wrapped = stage_in_wrapper(
            Task::new(|x: u32| x * 2),
            &provider,
            &file,
            Some(&working_dir),
            runner.clone(),
        )?;
        assert!(runner.seen().is_empty());

        assert_eq!(wrapped.call(21)?, 42);
        assert!(working_dir.is_dir());
        assert!(local.parent().is_some_and(Path::is_dir));
        assert_eq!(
            runner.seen(),
            vec![format!("copy in /remote/in.txt {}", local.display())]
        );
        Ok(())
    }

    #[test]
    fn fail_policy_aborts_before_task_runs() -> StageResult<()> {
        let file = DataFile::new("file", "", "/remote/in.txt").with_local_path("in.txt");
        let ran = Arc::new(AtomicBool::new(false));
        let ran_flag = Arc::clone(&ran);
        let provider = EchoProvider {
            policy: FailurePolicy::FailOnError,
        };

        let wrapped = stage_in_wrapper(
            Task::new(move |()| ran_flag.store(true, Ordering::SeqCst)),
            &provider,
            &file,
            None,
            ScriptedRunner::new(1),
        )?;

        let err = wrapped.call(()).err();
        assert!(matches!(
            err,
            Some(StageError::TransferFailed { code: Some(1), .. })
        ));
        assert!(!ran.load(Ordering::SeqCst));
        Ok(())
    }

    #[test]
    fn warn_policy_runs_task_anyway() -> StageResult<()> {
        let file = DataFile::new("file", "", "/remote/in.txt").with_local_path("in.txt");
        let provider = EchoProvider {
            policy: FailurePolicy::WarnOnError,
        };
        let wrapped = stage_in_wrapper(
            Task::new(|()| "done"),
            &provider,
            &file,
            None,
            ScriptedRunner::new(23),
        )?;
        assert_eq!(wrapped.call(())?, "done");
        Ok(())
    }

    #[test]
    fn stage_out_transfers_after_task() -> StageResult<()> {
        let file = DataFile::new("file", "", "/remote/out.txt").with_local_path("/tmp/out.txt");
        let runner = ScriptedRunner::new(0);
        let provider = EchoProvider {
            policy: FailurePolicy::FailOnError,
        };
        let wrapped = stage_out_wrapper(Task::new(|()| 7_u8), &provider, &file, runner.clone())?;
        assert_eq!(wrapped.call(())?, 7);
        assert_eq!(runner.seen(), vec!["copy out /remote/out.txt /tmp/out.txt"]);
        Ok(())
    }

    #[test]
    fn stage_out_skips_transfer_when_task_fails() -> StageResult<()> {
        let file = DataFile::new("file", "", "/remote/out.txt").with_local_path("/tmp/out.txt");
        let runner = ScriptedRunner::new(0);
        let provider = EchoProvider {
            policy: FailurePolicy::WarnOnError,
        };
        let wrapped: Task<(), ()> = stage_out_wrapper(
            Task::fallible(|()| Err(StageError::task("user code failed"))),
            &provider,
            &file,
            runner.clone(),
        )?;
        assert!(matches!(wrapped.call(()), Err(StageError::Task { .. })));
        assert!(runner.seen().is_empty());
        Ok(())
    }

    #[test]
    fn unresolved_local_path_is_rejected_at_wrap_time() {
        let file = DataFile::new("file", "", "/remote/in.txt");
        let provider = EchoProvider {
            policy: FailurePolicy::WarnOnError,
        };
        let result = stage_in_wrapper(
            Task::new(|()| ()),
            &provider,
            &file,
            None,
            ScriptedRunner::new(0),
        );
        assert!(matches!(result, Err(StageError::InvalidFile { .. })));
    }
}
