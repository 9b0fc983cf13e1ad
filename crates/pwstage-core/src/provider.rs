//! Capability interface implemented by each staging backend.

use std::path::{Path, PathBuf};

use crate::command::TransferPlan;
use crate::error::StageResult;
use crate::model::{DataFile, Direction, FailurePolicy};
use crate::path::resolve_local_path;

/// A storage backend able to move files to and from worker nodes.
///
/// Backends only describe *what* to run; the shared wrappers in
/// [`crate::wrap`] decide *when* to run it and how to react to failures.
pub trait StagingProvider: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    /// File scheme this backend stages.
    fn scheme(&self) -> &str;

    /// Whether this backend can bring `file` onto the worker.
    fn can_stage_in(&self, file: &DataFile) -> bool {
        file.scheme == self.scheme()
    }

    /// Whether this backend can push `file` back to durable storage.
    fn can_stage_out(&self, file: &DataFile) -> bool {
        file.scheme == self.scheme()
    }

    /// Whether this backend handles `file` in `direction`.
    fn supports(&self, file: &DataFile, direction: Direction) -> bool {
        match direction {
            Direction::In => self.can_stage_in(file),
            Direction::Out => self.can_stage_out(file),
        }
    }

    /// Local path the file lands at, given the executor working directory.
    ///
    /// # Errors
    ///
    /// Returns an error when the path cannot be derived from the descriptor.
    fn resolve_path(&self, file: &DataFile, working_dir: Option<&Path>) -> StageResult<PathBuf> {
        resolve_local_path(file, working_dir)
    }

    /// Commands that move `file` in `direction`. `file.local_path` must be resolved.
    ///
    /// # Errors
    ///
    /// Returns an error when the descriptor lacks the fields the command needs.
    fn transfer_plan(&self, file: &DataFile, direction: Direction) -> StageResult<TransferPlan>;

    /// Reaction to an unsuccessful transfer.
    fn failure_policy(&self) -> FailurePolicy;
}
