//! File descriptors and the small enums shared by every provider.
//!
//! # Design
//! - Pure data carriers; no IO happens here.
//! - URIs are split verbatim so trailing separators survive untouched.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{StageError, StageResult};

const SCHEME_SEPARATOR: &str = "://";
const DEFAULT_SCHEME: &str = "file";

/// A piece of data identified by a URI, plus where it lands on the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFile {
    /// Storage backend token, e.g. `gs` or `file`.
    pub scheme: String,
    /// Network location (bucket or host); empty when the URI has none.
    pub netloc: String,
    /// Path on the durable storage side, kept exactly as supplied.
    pub path: String,
    /// Worker-side staging path; resolved before any transfer runs.
    pub local_path: Option<PathBuf>,
}

impl DataFile {
    /// Build a descriptor from its parts.
    #[must_use]
    pub fn new(scheme: impl Into<String>, netloc: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            netloc: netloc.into(),
            path: path.into(),
            local_path: None,
        }
    }

    /// Parse `scheme://netloc/path`. Inputs without a scheme are treated as `file` paths.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::InvalidFile`] for empty input or a malformed scheme.
    pub fn parse(uri: &str) -> StageResult<Self> {
        if uri.is_empty() {
            return Err(StageError::invalid_file("uri", "must not be empty", None));
        }

        let Some((scheme, rest)) = uri.split_once(SCHEME_SEPARATOR) else {
            return Ok(Self::new(DEFAULT_SCHEME, "", uri));
        };

        if !is_valid_scheme(scheme) {
            return Err(StageError::invalid_file(
                "scheme",
                "must start with a letter and contain only alphanumerics, '+', '-' or '.'",
                Some(scheme.to_string()),
            ));
        }

        let (netloc, path) = rest
            .find('/')
            .map_or((rest, ""), |index| rest.split_at(index));
        Ok(Self::new(scheme.to_ascii_lowercase(), netloc, path))
    }

    /// Attach an explicit local staging path.
    #[must_use]
    pub fn with_local_path(mut self, local_path: impl Into<PathBuf>) -> Self {
        self.local_path = Some(local_path.into());
        self
    }

    /// Whether the remote path denotes a directory (trailing separator).
    #[must_use]
    pub fn is_directory(&self) -> bool {
        self.path.ends_with('/')
    }

    /// Final component of the remote path, ignoring a trailing separator.
    #[must_use]
    pub fn filename(&self) -> &str {
        let trimmed = self.path.trim_end_matches('/');
        trimmed.rsplit('/').next().unwrap_or(trimmed)
    }

    /// Directory part of the remote path: everything before the last `/`.
    ///
    /// A directory path (`/a/dir/`) yields the directory itself (`/a/dir`).
    #[must_use]
    pub fn remote_parent(&self) -> &str {
        let Some(index) = self.path.rfind('/') else {
            return "";
        };
        match self.path[..index].trim_end_matches('/') {
            "" => "/",
            head => head,
        }
    }

    /// The resolved local path.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::InvalidFile`] when path resolution has not run yet.
    pub fn require_local_path(&self) -> StageResult<&Path> {
        self.local_path.as_deref().ok_or_else(|| {
            StageError::invalid_file(
                "local_path",
                "must be resolved before transfer",
                Some(self.path.clone()),
            )
        })
    }

    /// The resolved local path as UTF-8, ready to become a command argument.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::InvalidFile`] when the path is unresolved or not UTF-8.
    pub fn local_path_str(&self) -> StageResult<&str> {
        let local = self.require_local_path()?;
        local.to_str().ok_or_else(|| {
            StageError::invalid_file(
                "local_path",
                "must be valid UTF-8",
                Some(local.display().to_string()),
            )
        })
    }
}

impl fmt::Display for DataFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}{}", self.scheme, self.netloc, self.path)
    }
}

fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    chars.next().is_some_and(|first| first.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Which way data moves relative to the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Durable storage to the worker, before the task.
    In,
    /// Worker to durable storage, after the task.
    Out,
}

impl Direction {
    /// Render the direction as its lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a wrapped task reacts to an unsuccessful transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort with an error; the user task does not run (stage-in) or its result is dropped (stage-out).
    FailOnError,
    /// Log a warning and carry on as if the transfer succeeded.
    WarnOnError,
}

impl FailurePolicy {
    /// Render the policy as its configuration label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FailOnError => "fail_on_error",
            Self::WarnOnError => "warn_on_error",
        }
    }
}
