//! Typed configuration models.
//!
//! # Design
//! - Pure data carriers deserialized from the JSON document.
//! - Every section is optional; absent providers are simply not registered.

use std::path::PathBuf;
use std::time::Duration;

use pwstage_core::{ExecutorRegistry, FailurePolicy};
use serde::{Deserialize, Serialize};

use crate::defaults;

/// Root configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StagingConfig {
    /// Executors tasks may run on.
    #[serde(default)]
    pub executors: Vec<ExecutorConfig>,
    /// Cloud bucket provider; disabled when absent.
    #[serde(default)]
    pub gsutil: Option<GsutilConfig>,
    /// Remote host provider; disabled when absent.
    #[serde(default)]
    pub rsync: Option<RsyncConfig>,
    /// Logging preferences.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl StagingConfig {
    /// Registry view of the configured executors.
    #[must_use]
    pub fn executor_registry(&self) -> ExecutorRegistry {
        self.executors
            .iter()
            .fold(ExecutorRegistry::new(), |registry, executor| {
                registry.with_executor(executor.name.clone(), executor.working_dir.clone())
            })
    }
}

/// A named executor and its working directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExecutorConfig {
    /// Executor label referenced by tasks.
    pub name: String,
    /// Absolute directory staged files land in; unset means basename-only paths.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

/// Settings for the `gsutil` provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GsutilConfig {
    /// Client binary.
    #[serde(default = "default_gsutil_program")]
    pub program: String,
    /// Reaction to failed transfers.
    #[serde(default = "default_gsutil_policy")]
    pub policy: FailurePolicy,
}

impl Default for GsutilConfig {
    fn default() -> Self {
        Self {
            program: default_gsutil_program(),
            policy: default_gsutil_policy(),
        }
    }
}

/// Settings for the `rsync` provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RsyncConfig {
    /// Host holding the durable files (`host` or `user@host`).
    pub hostname: String,
    /// Optional jump host for indirect routing.
    #[serde(default)]
    pub jumphost: Option<String>,
    /// `rsync` binary.
    #[serde(default = "default_rsync_program")]
    pub program: String,
    /// `ssh` binary used by the warm-up.
    #[serde(default = "default_ssh_program")]
    pub ssh_program: String,
    /// Reaction to failed transfers.
    #[serde(default = "default_rsync_policy")]
    pub policy: FailurePolicy,
    /// Open a persistent multiplexed ssh connection before transfers.
    #[serde(default)]
    pub multiplex: Option<MultiplexConfig>,
    /// Pass `--protect-args` so remote paths skip the remote shell (rsync 3.0+).
    #[serde(default)]
    pub protect_args: bool,
}

/// Multiplexed ssh connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MultiplexConfig {
    /// How long the master connection outlives its last client.
    #[serde(default = "default_persist_secs")]
    pub persist_secs: u64,
    /// Master socket path shared by the warm-up and the transfers.
    #[serde(default = "default_control_path")]
    pub control_path: String,
}

impl MultiplexConfig {
    /// Persistence window as a duration.
    #[must_use]
    pub const fn persist(&self) -> Duration {
        Duration::from_secs(self.persist_secs)
    }
}

/// Logging preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingSettings {
    /// Log level used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `json` or `pretty`; inferred from the build profile when unset.
    #[serde(default)]
    pub format: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: None,
        }
    }
}

fn default_gsutil_program() -> String {
    defaults::GSUTIL_PROGRAM.to_string()
}

const fn default_gsutil_policy() -> FailurePolicy {
    FailurePolicy::FailOnError
}

fn default_rsync_program() -> String {
    defaults::RSYNC_PROGRAM.to_string()
}

fn default_ssh_program() -> String {
    defaults::SSH_PROGRAM.to_string()
}

const fn default_rsync_policy() -> FailurePolicy {
    FailurePolicy::WarnOnError
}

const fn default_persist_secs() -> u64 {
    defaults::MULTIPLEX_PERSIST_SECS
}

fn default_control_path() -> String {
    defaults::MULTIPLEX_CONTROL_PATH.to_string()
}

fn default_log_level() -> String {
    defaults::LOG_LEVEL.to_string()
}
