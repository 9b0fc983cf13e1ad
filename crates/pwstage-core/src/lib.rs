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

//! Data-staging primitives shared by every storage backend.
//!
//! Layout: `model.rs` (file descriptors, direction, failure policy), `path.rs`
//! (local path resolution), `command.rs` (argument-vector commands),
//! `runner.rs` (subprocess seam), `host.rs` (ssh host checks), `provider.rs` (backend capability trait),
//! `task.rs` + `wrap.rs` (task wrapping), `executor.rs` + `manager.rs`
//! (host-facing facade).

pub mod command;
pub mod error;
pub mod executor;
pub mod host;
pub mod manager;
pub mod model;
pub mod path;
pub mod provider;
pub mod runner;
pub mod task;
pub mod wrap;

pub use command::{TransferCommand, TransferPlan, shell_quote};
pub use error::{StageError, StageResult};
pub use executor::ExecutorRegistry;
pub use host::host_rejection;
pub use manager::DataManager;
pub use model::{DataFile, Direction, FailurePolicy};
pub use path::{resolve_in_place, resolve_local_path};
pub use provider::StagingProvider;
pub use runner::{CommandRunner, ExitOutcome, ProcessRunner};
pub use task::Task;
pub use wrap::{stage_in_wrapper, stage_out_wrapper};
