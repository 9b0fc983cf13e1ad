//! Reading configuration documents from disk or strings.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::defaults::CONFIG_ENV_VAR;
use crate::error::{ConfigError, ConfigResult};
use crate::model::StagingConfig;
use crate::validate::validate;

/// Parse and validate a configuration document held in memory.
///
/// # Errors
///
/// Returns [`ConfigError::Json`] for malformed documents and validation
/// errors for rejected values.
pub fn load_from_str(document: &str) -> ConfigResult<StagingConfig> {
    let config: StagingConfig = serde_json::from_str(document)
        .map_err(|source| ConfigError::Json { path: None, source })?;
    validate(&config)?;
    Ok(config)
}

/// Read, parse, and validate the configuration file at `path`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] when the file cannot be read, otherwise the
/// same errors as [`load_from_str`].
pub fn load_from_path(path: &Path) -> ConfigResult<StagingConfig> {
    let document = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        operation: "config.read",
        path: path.to_path_buf(),
        source,
    })?;
    let config: StagingConfig =
        serde_json::from_str(&document).map_err(|source| ConfigError::Json {
            path: Some(path.to_path_buf()),
            source,
        })?;
    validate(&config)?;
    debug!(
        path = %path.display(),
        executors = config.executors.len(),
        gsutil = config.gsutil.is_some(),
        rsync = config.rsync.is_some(),
        "configuration loaded"
    );
    Ok(config)
}

/// Pick the configuration file: an explicit path wins over `PWSTAGE_CONFIG`.
#[must_use]
pub fn resolve_config_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    explicit.or_else(|| {
        env::var_os(CONFIG_ENV_VAR)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    })
}

/// Load the resolved configuration file, or defaults when none is named.
///
/// # Errors
///
/// Propagates [`load_from_path`] failures.
pub fn load(explicit: Option<PathBuf>) -> ConfigResult<StagingConfig> {
    resolve_config_path(explicit).map_or_else(
        || Ok(StagingConfig::default()),
        |path| load_from_path(&path),
    )
}
