//! Validation helpers for configuration documents.

use std::collections::HashSet;

use pwstage_core::host_rejection;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{GsutilConfig, LoggingSettings, RsyncConfig, StagingConfig};

const LOG_FORMATS: &[&str] = &["json", "pretty"];

/// Check a parsed document for values the providers would reject or misuse.
///
/// # Errors
///
/// Returns the first [`ConfigError`] found.
pub fn validate(config: &StagingConfig) -> ConfigResult<()> {
    validate_executors(config)?;
    if let Some(gsutil) = &config.gsutil {
        validate_gsutil(gsutil)?;
    }
    if let Some(rsync) = &config.rsync {
        validate_rsync(rsync)?;
    }
    validate_logging(&config.logging)
}

fn validate_executors(config: &StagingConfig) -> ConfigResult<()> {
    let mut seen = HashSet::new();
    for executor in &config.executors {
        if executor.name.trim().is_empty() {
            return Err(ConfigError::invalid(
                "executors",
                "name",
                Some(&executor.name),
                "must not be empty",
            ));
        }
        if !seen.insert(executor.name.as_str()) {
            return Err(ConfigError::DuplicateExecutor {
                name: executor.name.clone(),
            });
        }
        if let Some(dir) = &executor.working_dir
            && !dir.is_absolute()
        {
            return Err(ConfigError::InvalidField {
                section: "executors",
                field: "working_dir",
                value: Some(dir.display().to_string()),
                reason: "must be an absolute path",
            });
        }
    }
    Ok(())
}

fn validate_gsutil(gsutil: &GsutilConfig) -> ConfigResult<()> {
    validate_program("gsutil", "program", &gsutil.program)
}

fn validate_rsync(rsync: &RsyncConfig) -> ConfigResult<()> {
    validate_host("hostname", &rsync.hostname)?;
    if let Some(jumphost) = &rsync.jumphost {
        validate_host("jumphost", jumphost)?;
    }
    if let Some(multiplex) = &rsync.multiplex {
        validate_control_path(&multiplex.control_path)?;
    }
    validate_program("rsync", "program", &rsync.program)?;
    validate_program("rsync", "ssh_program", &rsync.ssh_program)
}

fn validate_logging(logging: &LoggingSettings) -> ConfigResult<()> {
    if logging.level.trim().is_empty() {
        return Err(ConfigError::invalid(
            "logging",
            "level",
            Some(&logging.level),
            "must not be empty",
        ));
    }
    match logging.format.as_deref() {
        Some(format) if !LOG_FORMATS.contains(&format) => Err(ConfigError::invalid(
            "logging",
            "format",
            Some(format),
            "must be 'json' or 'pretty'",
        )),
        _ => Ok(()),
    }
}

fn validate_host(field: &'static str, value: &str) -> ConfigResult<()> {
    host_rejection(value).map_or(Ok(()), |reason| {
        Err(ConfigError::invalid("rsync", field, Some(value), reason))
    })
}

fn validate_control_path(value: &str) -> ConfigResult<()> {
    let reason = if value.is_empty() {
        "must not be empty"
    } else if value.chars().any(char::is_whitespace) {
        "must not contain whitespace"
    } else {
        return Ok(());
    };
    Err(ConfigError::invalid("rsync", "control_path", Some(value), reason))
}

fn validate_program(section: &'static str, field: &'static str, value: &str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::invalid(section, field, Some(value), "must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::model::{ExecutorConfig, MultiplexConfig};

    fn rsync(hostname: &str) -> RsyncConfig {
        RsyncConfig {
            hostname: hostname.to_string(),
            jumphost: None,
            program: "rsync".into(),
            ssh_program: "ssh".into(),
            policy: pwstage_core::FailurePolicy::WarnOnError,
            multiplex: None,
            protect_args: false,
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert!(validate(&StagingConfig::default()).is_ok());
    }

    #[test]
    fn duplicate_executors_are_rejected() {
        let executor = ExecutorConfig {
            name: "compute".into(),
            working_dir: None,
        };
        let config = StagingConfig {
            executors: vec![executor.clone(), executor],
            ..StagingConfig::default()
        };
        assert!(matches!(
            validate(&config),
            Err(ConfigError::DuplicateExecutor { .. })
        ));
    }

    #[test]
    fn relative_working_dirs_are_rejected() {
        let config = StagingConfig {
            executors: vec![ExecutorConfig {
                name: "compute".into(),
                working_dir: Some(PathBuf::from("scratch")),
            }],
            ..StagingConfig::default()
        };
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidField {
                field: "working_dir",
                ..
            })
        ));
    }

    #[test]
    fn hosts_must_not_look_like_options() {
        assert!(validate_host("hostname", "user@login").is_ok());
        for bad in ["", "two words", "-oProxyCommand=x"] {
            assert!(validate_host("hostname", bad).is_err(), "{bad:?} accepted");
        }

        let mut config = StagingConfig {
            rsync: Some(rsync("login")),
            ..StagingConfig::default()
        };
        assert!(validate(&config).is_ok());
        if let Some(rsync) = config.rsync.as_mut() {
            rsync.jumphost = Some("-J".into());
        }
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidField {
                field: "jumphost",
                ..
            })
        ));
    }

    #[test]
    fn control_path_must_be_a_single_word() {
        let mut config = StagingConfig {
            rsync: Some(RsyncConfig {
                multiplex: Some(MultiplexConfig {
                    persist_secs: 60,
                    control_path: "/tmp/cm %h".into(),
                }),
                ..rsync("login")
            }),
            ..StagingConfig::default()
        };
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidField {
                field: "control_path",
                ..
            })
        ));
        if let Some(multiplex) = config.rsync.as_mut().and_then(|r| r.multiplex.as_mut()) {
            multiplex.control_path = "/tmp/cm-%C".into();
        }
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn log_format_must_be_known() {
        let config = StagingConfig {
            logging: LoggingSettings {
                level: "debug".into(),
                format: Some("xml".into()),
            },
            ..StagingConfig::default()
        };
        assert!(validate(&config).is_err());
    }

    #[test]
    fn empty_program_is_rejected() {
        let config = StagingConfig {
            gsutil: Some(GsutilConfig {
                program: " ".into(),
                ..GsutilConfig::default()
            }),
            ..StagingConfig::default()
        };
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidField {
                section: "gsutil",
                ..
            })
        ));
    }
}
