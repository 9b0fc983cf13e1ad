//! Test fixtures and environment helpers.

use std::path::Path;

use anyhow::{Context, Result};
use tempfile::TempDir;

/// Create a scratch directory removed on drop.
///
/// # Errors
///
/// Returns an error if the temporary directory cannot be created.
pub fn temp_dir(prefix: &str) -> Result<TempDir> {
    tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .context("failed to create temporary directory")
}

/// Returns `true` if `program` can be found on `PATH`.
#[must_use]
pub fn program_available(program: &str) -> bool {
    program_available_in(program, std::env::var_os("PATH").as_deref())
}

fn program_available_in(program: &str, path: Option<&std::ffi::OsStr>) -> bool {
    path.is_some_and(|paths| {
        std::env::split_paths(paths).any(|dir| is_file(&dir.join(program)))
    })
}

fn is_file(path: &Path) -> bool {
    path.metadata().is_ok_and(|meta| meta.is_file())
}
