#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

//! File-backed configuration for staging providers and executors.
//!
//! Layout: `model.rs` (typed config models), `validate.rs` (validation
//! helpers), `loader.rs` (file and environment resolution), `defaults.rs`
//! (shared default values).

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use defaults::CONFIG_ENV_VAR;
pub use error::{ConfigError, ConfigResult};
pub use loader::{load, load_from_path, load_from_str, resolve_config_path};
pub use model::{
    ExecutorConfig, GsutilConfig, LoggingSettings, MultiplexConfig, RsyncConfig, StagingConfig,
};
pub use validate::validate;
