//! Remote-host staging through `rsync` over `ssh`.
//!
//! Worker nodes must be able to reach the host without interactive
//! authentication (for example a pre-installed key). Transfer failures are
//! logged and tolerated by default.
//!
//! Remote targets are passed as `host:path`. rsync older than 3.2.4 hands the
//! path to the remote shell unquoted, so paths with spaces or shell
//! metacharacters need [`RsyncStaging::with_protect_args`] (rsync 3.0 or newer
//! on both ends).

use std::time::Duration;

use pwstage_core::{
    DataFile, Direction, FailurePolicy, StageError, StageResult, StagingProvider,
    TransferCommand, TransferPlan, host_rejection, shell_quote,
};

/// Scheme handled by [`RsyncStaging`].
pub const RSYNC_SCHEME: &str = "file";
/// Program invoked when none is configured.
pub const DEFAULT_RSYNC_PROGRAM: &str = "rsync";
/// Program used for the connection warm-up.
pub const DEFAULT_SSH_PROGRAM: &str = "ssh";
/// Socket shared by the warm-up master and the transfers that reuse it.
pub const DEFAULT_CONTROL_PATH: &str = "~/.ssh/cm-%r@%h:%p";

const RSYNC_FLAGS: &str = "-avzq";
const PROTECT_ARGS_FLAG: &str = "--protect-args";
const PROVIDER: &str = "rsync";

/// Stages `file://` paths living on a remote host.
#[derive(Debug, Clone)]
pub struct RsyncStaging {
    hostname: String,
    jumphost: Option<String>,
    program: String,
    ssh_program: String,
    policy: FailurePolicy,
    multiplex: Option<Duration>,
    control_path: String,
    protect_args: bool,
}

impl RsyncStaging {
    /// Provider targeting `hostname` (`host` or `user@host`).
    ///
    /// # Errors
    ///
    /// Returns [`StageError::InvalidProvider`] when the host is empty, contains
    /// whitespace or starts with `-`.
    pub fn new(hostname: impl Into<String>) -> StageResult<Self> {
        let hostname = hostname.into();
        validate_host("hostname", &hostname)?;
        Ok(Self {
            hostname,
            jumphost: None,
            program: DEFAULT_RSYNC_PROGRAM.to_string(),
            ssh_program: DEFAULT_SSH_PROGRAM.to_string(),
            policy: FailurePolicy::WarnOnError,
            multiplex: None,
            control_path: DEFAULT_CONTROL_PATH.to_string(),
            protect_args: false,
        })
    }

    /// Route connections through `jumphost` (`ssh -J`).
    ///
    /// # Errors
    ///
    /// Same validation as [`new`](Self::new).
    pub fn with_jumphost(mut self, jumphost: impl Into<String>) -> StageResult<Self> {
        let jumphost = jumphost.into();
        validate_host("jumphost", &jumphost)?;
        self.jumphost = Some(jumphost);
        Ok(self)
    }

    /// Use a different `rsync` binary.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Use a different `ssh` binary for the warm-up.
    #[must_use]
    pub fn with_ssh_program(mut self, program: impl Into<String>) -> Self {
        self.ssh_program = program.into();
        self
    }

    /// Override the failure policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Open a persistent multiplexed ssh master before each transfer, kept
    /// alive for `persist` after the last client disconnects.
    #[must_use]
    pub const fn with_multiplex(mut self, persist: Duration) -> Self {
        self.multiplex = Some(persist);
        self
    }

    /// Socket path for the multiplexed master (ssh `ControlPath`, `%` tokens allowed).
    ///
    /// Only used when [`with_multiplex`](Self::with_multiplex) is set.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::InvalidProvider`] when the path is empty or
    /// contains whitespace; rsync splits its `-e` command on whitespace.
    pub fn with_control_path(mut self, path: impl Into<String>) -> StageResult<Self> {
        let path = path.into();
        let reason = if path.is_empty() {
            Some("must not be empty")
        } else if path.chars().any(char::is_whitespace) {
            Some("must not contain whitespace")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(StageError::InvalidProvider {
                provider: PROVIDER,
                field: "control_path",
                reason,
                value: path,
            });
        }
        self.control_path = path;
        Ok(self)
    }

    /// Pass `--protect-args` so remote paths reach the remote rsync verbatim
    /// instead of through the remote shell.
    #[must_use]
    pub const fn with_protect_args(mut self, enabled: bool) -> Self {
        self.protect_args = enabled;
        self
    }

    /// Host transfers are addressed to.
    #[must_use]
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Jump host, when configured.
    #[must_use]
    pub fn jumphost(&self) -> Option<&str> {
        self.jumphost.as_deref()
    }

    fn base_command(&self) -> TransferCommand {
        let mut command = TransferCommand::new(&self.program).arg(RSYNC_FLAGS);
        if self.protect_args {
            command = command.arg(PROTECT_ARGS_FLAG);
        }
        let mut ssh = Vec::new();
        if self.multiplex.is_some() {
            ssh.push(format!("-o ControlPath={}", self.control_path));
        }
        if let Some(jumphost) = &self.jumphost {
            ssh.push(format!("-J {jumphost}"));
        }
        if !ssh.is_empty() {
            command = command.arg("-e").arg(format!("ssh {}", ssh.join(" ")));
        }
        command
    }

    fn warm_up(&self, persist: Duration) -> TransferCommand {
        let mut command = TransferCommand::new(&self.ssh_program).args([
            "-o".to_string(),
            "ControlMaster=auto".to_string(),
            "-o".to_string(),
            format!("ControlPersist={}", persist.as_secs()),
            "-o".to_string(),
            format!("ControlPath={}", self.control_path),
        ]);
        if let Some(jumphost) = &self.jumphost {
            command = command.arg("-J").arg(jumphost);
        }
        command.arg(&self.hostname).arg("true")
    }

    fn remote_target(&self, file: &DataFile) -> String {
        format!("{}:{}", self.hostname, file.path)
    }
}

impl StagingProvider for RsyncStaging {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn scheme(&self) -> &str {
        RSYNC_SCHEME
    }

    fn transfer_plan(&self, file: &DataFile, direction: Direction) -> StageResult<TransferPlan> {
        let local = file.local_path_str()?;
        let remote = self.remote_target(file);
        let transfer = match direction {
            Direction::In => self.base_command().args([remote.as_str(), local]),
            Direction::Out => {
                let parent = match file.remote_parent() {
                    "" => ".",
                    parent => parent,
                };
                self.base_command()
                    .arg(format!("--rsync-path=mkdir -p {} && rsync", shell_quote(parent)))
                    .args([local, remote.as_str()])
            }
        };

        let mut plan = TransferPlan::single(transfer);
        if let Some(persist) = self.multiplex {
            plan = plan.with_preflight(self.warm_up(persist));
        }
        Ok(plan)
    }

    fn failure_policy(&self) -> FailurePolicy {
        self.policy
    }
}

fn validate_host(field: &'static str, value: &str) -> StageResult<()> {
    host_rejection(value).map_or(Ok(()), |reason| {
        Err(StageError::InvalidProvider {
            provider: PROVIDER,
            field,
            reason,
            value: value.to_string(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, local: &str) -> DataFile {
        DataFile::new("file", "", path).with_local_path(local)
    }

    fn rendered(provider: &RsyncStaging, file: &DataFile, direction: Direction) -> StageResult<Vec<String>> {
        Ok(provider.transfer_plan(file, direction)?.render_lines())
    }

    #[test]
    fn stage_in_without_jumphost_is_direct() -> StageResult<()> {
        let provider = RsyncStaging::new("h")?;
        assert_eq!(
            rendered(&provider, &file("/a/b", "/tmp/b"), Direction::In)?,
            vec!["rsync -avzq h:/a/b /tmp/b"]
        );
        Ok(())
    }

    #[test]
    fn stage_in_with_jumphost_adds_ssh_clause() -> StageResult<()> {
        let provider = RsyncStaging::new("user@cluster")?.with_jumphost("bastion")?;
        assert_eq!(
            rendered(&provider, &file("/data/in/", "/scratch/in"), Direction::In)?,
            vec!["rsync -avzq -e 'ssh -J bastion' user@cluster:/data/in/ /scratch/in"]
        );
        Ok(())
    }

    #[test]
    fn stage_out_creates_remote_parent() -> StageResult<()> {
        let provider = RsyncStaging::new("h")?;
        assert_eq!(
            rendered(&provider, &file("/results/run1/out.csv", "/tmp/out.csv"), Direction::Out)?,
            vec!["rsync -avzq '--rsync-path=mkdir -p /results/run1 && rsync' /tmp/out.csv h:/results/run1/out.csv"]
        );

        let jumped = provider.with_jumphost("jh")?;
        assert_eq!(
            rendered(&jumped, &file("/results/dir/", "/tmp/dir"), Direction::Out)?,
            vec!["rsync -avzq -e 'ssh -J jh' '--rsync-path=mkdir -p /results/dir && rsync' /tmp/dir h:/results/dir/"]
        );
        Ok(())
    }

    #[test]
    fn stage_out_quotes_remote_parent_for_the_remote_shell() -> StageResult<()> {
        let provider = RsyncStaging::new("h")?;
        let plan = provider.transfer_plan(&file("/my data/out.csv", "/tmp/out.csv"), Direction::Out)?;
        assert_eq!(plan.transfer.args[1], "--rsync-path=mkdir -p '/my data' && rsync");
        Ok(())
    }

    #[test]
    fn stage_out_of_bare_name_uses_current_directory() -> StageResult<()> {
        let provider = RsyncStaging::new("h")?;
        let plan = provider.transfer_plan(&file("out.csv", "/tmp/out.csv"), Direction::Out)?;
        assert_eq!(plan.transfer.args[1], "--rsync-path=mkdir -p . && rsync");
        Ok(())
    }

    #[test]
    fn multiplex_prepends_warm_up() -> StageResult<()> {
        let provider = RsyncStaging::new("h")?
            .with_jumphost("jh")?
            .with_multiplex(Duration::from_secs(60));
        assert_eq!(
            rendered(&provider, &file("/a/b", "/tmp/b"), Direction::In)?,
            vec![
                "ssh -o ControlMaster=auto -o ControlPersist=60 -o 'ControlPath=~/.ssh/cm-%r@%h:%p' -J jh h true",
                "rsync -avzq -e 'ssh -o ControlPath=~/.ssh/cm-%r@%h:%p -J jh' h:/a/b /tmp/b",
            ]
        );
        Ok(())
    }

    #[test]
    fn warm_up_and_transfer_share_the_control_socket() -> StageResult<()> {
        let provider = RsyncStaging::new("h")?
            .with_multiplex(Duration::from_secs(5))
            .with_control_path("/run/pwstage/%C")?;
        let plan = provider.transfer_plan(&file("/a/b", "/tmp/b"), Direction::Out)?;

        let warm_up = &plan.preflight[0];
        assert!(warm_up.args.iter().any(|arg| arg == "ControlPath=/run/pwstage/%C"));
        assert_eq!(plan.transfer.args[1], "-e");
        assert_eq!(plan.transfer.args[2], "ssh -o ControlPath=/run/pwstage/%C");
        Ok(())
    }

    #[test]
    fn control_path_is_ignored_without_multiplex() -> StageResult<()> {
        let provider = RsyncStaging::new("h")?.with_control_path("/run/pwstage/%C")?;
        assert_eq!(
            rendered(&provider, &file("/a/b", "/tmp/b"), Direction::In)?,
            vec!["rsync -avzq h:/a/b /tmp/b"]
        );
        assert!(matches!(
            provider.with_control_path("/tmp/with space"),
            Err(StageError::InvalidProvider {
                field: "control_path",
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn protect_args_follows_the_archive_flags() -> StageResult<()> {
        let provider = RsyncStaging::new("h")?
            .with_jumphost("jh")?
            .with_protect_args(true);
        assert_eq!(
            rendered(&provider, &file("/my data/in.csv", "/tmp/in.csv"), Direction::In)?,
            vec!["rsync -avzq --protect-args -e 'ssh -J jh' 'h:/my data/in.csv' /tmp/in.csv"]
        );
        Ok(())
    }

    #[test]
    fn host_validation_rejects_option_like_values() {
        assert!(matches!(
            RsyncStaging::new("-oProxyCommand=evil"),
            Err(StageError::InvalidProvider {
                field: "hostname",
                ..
            })
        ));
        assert!(RsyncStaging::new("").is_err());
        assert!(
            RsyncStaging::new("h")
                .and_then(|p| p.with_jumphost("bad host"))
                .is_err()
        );
    }

    #[test]
    fn defaults_tolerate_failures_and_stage_file_scheme() -> StageResult<()> {
        let provider = RsyncStaging::new("h")?;
        assert_eq!(provider.failure_policy(), FailurePolicy::WarnOnError);
        assert!(provider.can_stage_in(&DataFile::parse("file:///x")?));
        assert!(!provider.can_stage_out(&DataFile::parse("gs://b/x")?));
        assert_eq!(provider.hostname(), "h");
        assert_eq!(provider.jumphost(), None);
        Ok(())
    }
}
