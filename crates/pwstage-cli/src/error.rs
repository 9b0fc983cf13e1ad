//! CLI error type and exit-code mapping.

use std::fmt::{self, Display, Formatter};

use pwstage_config::ConfigError;
use pwstage_core::StageError;

/// Exit code reported for fatal staging failures.
pub(crate) const EXIT_FAILURE: i32 = 1;
/// Exit code reported for unusable configuration or arguments.
pub(crate) const EXIT_VALIDATION: i32 = 2;

/// Top-level error surfaced by CLI commands.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn config(error: &ConfigError) -> Self {
        let message = match error {
            ConfigError::Io { path, source, .. } => {
                format!("cannot read configuration {}: {source}", path.display())
            }
            ConfigError::Json {
                path: Some(path),
                source,
            } => format!("invalid configuration {}: {source}", path.display()),
            ConfigError::Json { path: None, source } => format!("invalid configuration: {source}"),
            ConfigError::InvalidField {
                section,
                field,
                value,
                reason,
            } => match value {
                Some(value) => format!("configuration {section}.{field} = {value:?} {reason}"),
                None => format!("configuration {section}.{field} {reason}"),
            },
            ConfigError::DuplicateExecutor { name } => {
                format!("configuration declares executor '{name}' more than once")
            }
        };
        Self::Validation(message)
    }

    pub(crate) fn stage(error: StageError) -> Self {
        let detail = stage_detail(&error);
        Self::Failure(anyhow::Error::new(error).context(detail))
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => EXIT_VALIDATION,
            Self::Failure(_) => EXIT_FAILURE,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

fn stage_detail(error: &StageError) -> String {
    match error {
        StageError::TransferFailed {
            command,
            code: Some(code),
            ..
        } => format!("`{command}` exited with status {code}"),
        StageError::TransferFailed { command, .. } => {
            format!("`{command}` was terminated by a signal")
        }
        StageError::Spawn { program, .. } => format!("could not start '{program}'"),
        StageError::Io {
            operation, path, ..
        } => format!("{operation} failed for {}", path.display()),
        StageError::UnknownExecutor { name } => format!("executor '{name}' is not configured"),
        StageError::NoProvider { scheme, direction } => {
            format!("no provider can stage '{scheme}' files {direction}")
        }
        StageError::InvalidFile { field, reason, .. } => format!("file {field} {reason}"),
        StageError::InvalidProvider {
            provider,
            field,
            reason,
            ..
        } => format!("{provider} {field} {reason}"),
        StageError::Task { .. } => "task failed".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pwstage_core::Direction;

    #[test]
    fn stage_failures_exit_with_one() {
        let err = CliError::stage(StageError::TransferFailed {
            program: "gsutil".into(),
            command: "gsutil -m cp -r gs://b/o o".into(),
            code: Some(1),
        });
        assert_eq!(err.exit_code(), EXIT_FAILURE);
        assert!(
            err.display_message()
                .starts_with("`gsutil -m cp -r gs://b/o o` exited with status 1")
        );
    }

    #[test]
    fn missing_provider_names_scheme_and_direction() {
        let err = CliError::stage(StageError::NoProvider {
            scheme: "s3".into(),
            direction: Direction::Out,
        });
        assert!(err.display_message().contains("'s3' files out"));
    }

    #[test]
    fn config_errors_are_validation_failures() {
        let err = CliError::config(&ConfigError::DuplicateExecutor {
            name: "compute".into(),
        });
        assert_eq!(err.exit_code(), EXIT_VALIDATION);
        assert!(err.display_message().contains("'compute'"));
    }
}
