//! Host-facing facade: provider lookup, path planning and task replacement.

use std::sync::Arc;

use tracing::debug;

use crate::command::TransferPlan;
use crate::error::{StageError, StageResult};
use crate::executor::ExecutorRegistry;
use crate::model::{DataFile, Direction};
use crate::provider::StagingProvider;
use crate::runner::CommandRunner;
use crate::task::Task;
use crate::wrap::{stage_in_wrapper, stage_out_wrapper};

/// Registered providers plus the executor registry and the runner they share.
#[derive(Clone)]
pub struct DataManager {
    providers: Vec<Arc<dyn StagingProvider>>,
    executors: ExecutorRegistry,
    runner: Arc<dyn CommandRunner>,
}

impl DataManager {
    /// Build a manager with no providers registered.
    #[must_use]
    pub fn new(executors: ExecutorRegistry, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            providers: Vec::new(),
            executors,
            runner,
        }
    }

    /// Register a provider; earlier registrations win when several match a file.
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn StagingProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Executor registry backing path resolution.
    #[must_use]
    pub const fn executors(&self) -> &ExecutorRegistry {
        &self.executors
    }

    /// Whether any provider can stage `file` onto a worker.
    #[must_use]
    pub fn can_stage_in(&self, file: &DataFile) -> bool {
        self.find(file, Direction::In).is_some()
    }

    /// Whether any provider can stage `file` back out.
    #[must_use]
    pub fn can_stage_out(&self, file: &DataFile) -> bool {
        self.find(file, Direction::Out).is_some()
    }

    /// Resolve `file.local_path` for stage-in on `executor`. Pure path computation.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown executors, unsupported files or
    /// descriptors whose local path cannot be derived.
    pub fn stage_in(&self, executor: &str, file: &mut DataFile) -> StageResult<()> {
        self.plan_local_path(executor, file, Direction::In)
    }

    /// Resolve `file.local_path` for stage-out on `executor`. Pure path computation.
    ///
    /// # Errors
    ///
    /// Same conditions as [`stage_in`](Self::stage_in).
    pub fn stage_out(&self, executor: &str, file: &mut DataFile) -> StageResult<()> {
        self.plan_local_path(executor, file, Direction::Out)
    }

    /// Replace `task` with one that stages `file` in before running.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown executors, unsupported files or
    /// unresolved local paths.
    pub fn replace_task<A: 'static, R: 'static>(
        &self,
        executor: &str,
        file: &DataFile,
        task: Task<A, R>,
    ) -> StageResult<Task<A, R>> {
        let provider = self.require(file, Direction::In)?;
        let working_dir = self.executors.working_dir(executor)?;
        debug!(provider = provider.name(), file = %file, "replacing task for stage-in");
        stage_in_wrapper(
            task,
            provider.as_ref(),
            file,
            working_dir,
            Arc::clone(&self.runner),
        )
    }

    /// Replace `task` with one that stages `file` out after running.
    ///
    /// # Errors
    ///
    /// Same conditions as [`replace_task`](Self::replace_task).
    pub fn replace_task_stage_out<A: 'static, R: 'static>(
        &self,
        executor: &str,
        file: &DataFile,
        task: Task<A, R>,
    ) -> StageResult<Task<A, R>> {
        let provider = self.require(file, Direction::Out)?;
        self.executors.working_dir(executor)?;
        debug!(provider = provider.name(), file = %file, "replacing task for stage-out");
        stage_out_wrapper(task, provider.as_ref(), file, Arc::clone(&self.runner))
    }

    /// Resolve `file.local_path` and return the commands a wrapper would run.
    ///
    /// Nothing is executed; this is the preview used by `pwstage plan`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`stage_in`](Self::stage_in), plus provider failures
    /// building the plan.
    pub fn plan(
        &self,
        executor: &str,
        file: &mut DataFile,
        direction: Direction,
    ) -> StageResult<TransferPlan> {
        self.plan_local_path(executor, file, direction)?;
        self.require(file, direction)?
            .transfer_plan(file, direction)
    }

    /// Plan and wrap a task for all of its inputs and outputs.
    ///
    /// Inputs are fetched in order before the task; outputs are pushed in
    /// order after it.
    ///
    /// # Errors
    ///
    /// Returns the first planning or wrapping failure.
    pub fn prepare_task<A: 'static, R: 'static>(
        &self,
        executor: &str,
        inputs: &mut [DataFile],
        outputs: &mut [DataFile],
        task: Task<A, R>,
    ) -> StageResult<Task<A, R>> {
        let mut task = task;
        for file in outputs.iter_mut() {
            self.stage_out(executor, file)?;
            task = self.replace_task_stage_out(executor, file, task)?;
        }
        for file in inputs.iter_mut().rev() {
            self.stage_in(executor, file)?;
            task = self.replace_task(executor, file, task)?;
        }
        Ok(task)
    }

    fn plan_local_path(
        &self,
        executor: &str,
        file: &mut DataFile,
        direction: Direction,
    ) -> StageResult<()> {
        let provider = self.require(file, direction)?;
        let working_dir = self.executors.working_dir(executor)?;
        let resolved = provider.resolve_path(file, working_dir)?;
        debug!(
            provider = provider.name(),
            direction = %direction,
            file = %file,
            local = %resolved.display(),
            "resolved local path"
        );
        file.local_path = Some(resolved);
        Ok(())
    }

    fn find(&self, file: &DataFile, direction: Direction) -> Option<&Arc<dyn StagingProvider>> {
        self.providers
            .iter()
            .find(|provider| provider.supports(file, direction))
    }

    fn require(
        &self,
        file: &DataFile,
        direction: Direction,
    ) -> StageResult<&Arc<dyn StagingProvider>> {
        self.find(file, direction)
            .ok_or_else(|| StageError::NoProvider {
                scheme: file.scheme.clone(),
                direction,
            })
    }
}
