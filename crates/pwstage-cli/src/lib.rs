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
#![allow(clippy::redundant_pub_crate)]

//! Command-line front end for staging task data.
//!
//! Layout:
//! - `cli.rs`: argument parsing and command dispatch
//! - `bootstrap.rs`: providers and logging built from configuration
//! - `commands/`: command handlers
//! - `error.rs`: error type and exit codes
//! - `main.rs`: thin entrypoint delegating to `run()`

pub(crate) mod bootstrap;
pub(crate) mod cli;
pub(crate) mod commands;
pub(crate) mod error;

pub use cli::{run, run_with};
