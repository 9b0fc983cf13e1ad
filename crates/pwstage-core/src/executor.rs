//! Executor name to working directory lookup, as configured by the host.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{StageError, StageResult};

/// Registry of executors and their optional working directories.
#[derive(Debug, Clone, Default)]
pub struct ExecutorRegistry {
    executors: BTreeMap<String, Option<PathBuf>>,
}

impl ExecutorRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) an executor.
    pub fn register(&mut self, name: impl Into<String>, working_dir: Option<PathBuf>) {
        self.executors.insert(name.into(), working_dir);
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with_executor(mut self, name: impl Into<String>, working_dir: Option<PathBuf>) -> Self {
        self.register(name, working_dir);
        self
    }

    /// Working directory of `name`, `None` when the executor has none configured.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::UnknownExecutor`] when `name` was never registered.
    pub fn working_dir(&self, name: &str) -> StageResult<Option<&Path>> {
        self.executors
            .get(name)
            .map(Option::as_deref)
            .ok_or_else(|| StageError::UnknownExecutor {
                name: name.to_string(),
            })
    }

    /// Registered executor names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.executors.keys().map(String::as_str)
    }
}
