//! Argument parsing and command dispatch for the `pwstage` binary.

use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use pwstage_core::{CommandRunner, Direction, ProcessRunner};
use tracing::info;

use crate::bootstrap::{build_manager, install_logging};
use crate::commands::{handle_plan, handle_run};
use crate::error::{CliError, CliResult};

/// Parse the process arguments, run the command, and return the exit code.
#[must_use]
pub fn run() -> i32 {
    run_with(std::env::args_os(), Arc::new(ProcessRunner))
}

/// Same as [`run`] with explicit arguments and command runner.
#[must_use]
pub fn run_with<I, T>(args: I, runner: Arc<dyn CommandRunner>) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return err.exit_code();
        }
    };

    match dispatch(cli, runner) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

fn dispatch(cli: Cli, runner: Arc<dyn CommandRunner>) -> CliResult<i32> {
    let config = pwstage_config::load(cli.config).map_err(|err| CliError::config(&err))?;
    install_logging(&config);
    info!(command = cli.command.label(), "pwstage starting");

    let manager = build_manager(&config, Arc::clone(&runner)).map_err(CliError::stage)?;
    match cli.command {
        Command::Plan(args) => handle_plan(&manager, args),
        Command::Run(args) => handle_run(&manager, runner, args),
    }
}

#[derive(Parser)]
#[command(
    name = "pwstage",
    version,
    about = "Stage workflow task data onto worker nodes and back"
)]
struct Cli {
    /// Configuration file; falls back to `PWSTAGE_CONFIG`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the local path and transfer commands for one file without running them.
    Plan(PlanArgs),
    /// Run a program with files staged in before and out after it.
    Run(RunArgs),
}

impl Command {
    const fn label(&self) -> &'static str {
        match self {
            Self::Plan(_) => "plan",
            Self::Run(_) => "run",
        }
    }
}

#[derive(Args)]
pub(crate) struct PlanArgs {
    /// Executor whose working directory applies.
    #[arg(long)]
    pub(crate) executor: String,
    /// Transfer direction relative to the worker.
    #[arg(long, value_enum)]
    pub(crate) direction: DirectionArg,
    /// Remote file URI, e.g. `gs://bucket/object` or `file:///path`.
    pub(crate) uri: String,
    /// Requested local path; relative paths land in the working directory.
    #[arg(long)]
    pub(crate) local: Option<PathBuf>,
}

#[derive(Args)]
pub(crate) struct RunArgs {
    /// Executor whose working directory applies.
    #[arg(long)]
    pub(crate) executor: String,
    /// File to fetch before the program runs, as `URI` or `URI=LOCAL`.
    #[arg(long = "stage-in", value_name = "URI[=LOCAL]")]
    pub(crate) stage_in: Vec<String>,
    /// File to push after the program succeeds, as `URI` or `URI=LOCAL`.
    #[arg(long = "stage-out", value_name = "URI[=LOCAL]")]
    pub(crate) stage_out: Vec<String>,
    /// Program and arguments to run.
    #[arg(last = true, required = true, num_args = 1..)]
    pub(crate) command: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum DirectionArg {
    In,
    Out,
}

impl From<DirectionArg> for Direction {
    fn from(value: DirectionArg) -> Self {
        match value {
            DirectionArg::In => Self::In,
            DirectionArg::Out => Self::Out,
        }
    }
}
