//! Cloud bucket staging through the `gsutil` client.
//!
//! Worker nodes must already be authenticated against the bucket; this
//! provider only runs the client.

use pwstage_core::{
    DataFile, Direction, FailurePolicy, StageResult, StagingProvider, TransferCommand,
    TransferPlan,
};

/// Scheme handled by [`GsutilStaging`].
pub const GSUTIL_SCHEME: &str = "gs";
/// Program invoked when none is configured.
pub const DEFAULT_GSUTIL_PROGRAM: &str = "gsutil";

const DIRECTORY_MODE: [&str; 3] = ["-m", "rsync", "-r"];
const OBJECT_MODE: [&str; 3] = ["-m", "cp", "-r"];

/// Stages `gs://` files with `gsutil`. Transfer failures are fatal by default.
#[derive(Debug, Clone)]
pub struct GsutilStaging {
    program: String,
    policy: FailurePolicy,
}

impl Default for GsutilStaging {
    fn default() -> Self {
        Self::new()
    }
}

impl GsutilStaging {
    /// Provider running `gsutil` from `PATH` with [`FailurePolicy::FailOnError`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            program: DEFAULT_GSUTIL_PROGRAM.to_string(),
            policy: FailurePolicy::FailOnError,
        }
    }

    /// Use a different client binary.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Override the failure policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Bucket URI for `file`: `gs://<netloc><path>`, or `gs://` followed by the
    /// path minus its leading slash when the descriptor has no network location.
    #[must_use]
    pub fn bucket_uri(file: &DataFile) -> String {
        if file.netloc.is_empty() {
            let path = file.path.strip_prefix('/').unwrap_or(&file.path);
            format!("{}://{path}", file.scheme)
        } else {
            format!("{}://{}{}", file.scheme, file.netloc, file.path)
        }
    }
}

impl StagingProvider for GsutilStaging {
    fn name(&self) -> &'static str {
        "gsutil"
    }

    fn scheme(&self) -> &str {
        GSUTIL_SCHEME
    }

    fn transfer_plan(&self, file: &DataFile, direction: Direction) -> StageResult<TransferPlan> {
        let local = file.local_path_str()?;
        let remote = Self::bucket_uri(file);
        let mode = if file.is_directory() {
            DIRECTORY_MODE
        } else {
            OBJECT_MODE
        };
        let (source, destination) = match direction {
            Direction::In => (remote.as_str(), local),
            Direction::Out => (local, remote.as_str()),
        };
        let command = TransferCommand::new(&self.program)
            .args(mode)
            .args([source, destination]);
        Ok(TransferPlan::single(command))
    }

    fn failure_policy(&self) -> FailurePolicy {
        self.policy
    }
}
