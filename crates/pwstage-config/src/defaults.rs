//! Default values shared by the configuration model.
//!
//! # Design
//! - Centralize defaults so serde fallbacks and documentation stay consistent.

/// Environment variable naming the configuration file.
pub const CONFIG_ENV_VAR: &str = "PWSTAGE_CONFIG";
/// Default `gsutil` binary.
pub(crate) const GSUTIL_PROGRAM: &str = "gsutil";
/// Default `rsync` binary.
pub(crate) const RSYNC_PROGRAM: &str = "rsync";
/// Default `ssh` binary used for connection warm-up.
pub(crate) const SSH_PROGRAM: &str = "ssh";
/// Default multiplexed connection lifetime, in seconds.
pub(crate) const MULTIPLEX_PERSIST_SECS: u64 = 60;
/// Default ssh `ControlPath` for the multiplexed master socket.
pub(crate) const MULTIPLEX_CONTROL_PATH: &str = "~/.ssh/cm-%r@%h:%p";
/// Default log level when `RUST_LOG` is not provided.
pub(crate) const LOG_LEVEL: &str = "info";
