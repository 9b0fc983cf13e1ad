//! Builds the staging manager and logging from the loaded configuration.

use std::sync::Arc;

use pwstage_config::StagingConfig;
use pwstage_core::{CommandRunner, DataManager, StageResult};
use pwstage_providers::{GsutilStaging, RsyncStaging};
use pwstage_telemetry::{LoggingConfig, init_logging, log_format_from_str};
use tracing::debug;

/// Install the global subscriber; a subscriber installed earlier in the process is kept.
pub(crate) fn install_logging(config: &StagingConfig) {
    let logging = LoggingConfig {
        level: &config.logging.level,
        format: log_format_from_str(config.logging.format.as_deref()),
        build_version: env!("CARGO_PKG_VERSION"),
    };
    if let Err(err) = init_logging(&logging) {
        debug!(error = %err, "keeping existing tracing subscriber");
    }
}

/// Register every configured provider against `runner`.
pub(crate) fn build_manager(
    config: &StagingConfig,
    runner: Arc<dyn CommandRunner>,
) -> StageResult<DataManager> {
    let mut manager = DataManager::new(config.executor_registry(), runner);

    if let Some(gsutil) = &config.gsutil {
        let provider = GsutilStaging::new()
            .with_program(&gsutil.program)
            .with_policy(gsutil.policy);
        manager = manager.with_provider(Arc::new(provider));
    }

    if let Some(rsync) = &config.rsync {
        let mut provider = RsyncStaging::new(&rsync.hostname)?
            .with_program(&rsync.program)
            .with_ssh_program(&rsync.ssh_program)
            .with_policy(rsync.policy)
            .with_protect_args(rsync.protect_args);
        if let Some(jumphost) = &rsync.jumphost {
            provider = provider.with_jumphost(jumphost)?;
        }
        if let Some(multiplex) = &rsync.multiplex {
            provider = provider
                .with_multiplex(multiplex.persist())
                .with_control_path(&multiplex.control_path)?;
        }
        manager = manager.with_provider(Arc::new(provider));
    }

    debug!(
        executors = config.executors.len(),
        gsutil = config.gsutil.is_some(),
        rsync = config.rsync.is_some(),
        "staging manager ready"
    );
    Ok(manager)
}
