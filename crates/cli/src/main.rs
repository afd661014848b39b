mod cmd;
mod output;

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use stitch_lib::LogLevel;

use crate::cmd::{cmd_check, cmd_info, cmd_jobs, cmd_run};
use crate::output::OutputFormat;

/// stitch - process and freshness primitives for build scripts
#[derive(Parser)]
#[command(name = "stitch")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Minimum log level: info, warning, error or none
  #[arg(long, global = true, env = "STITCH_LOG", default_value_t = LogLevel::Info)]
  log_level: LogLevel,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Run a command and wait for it, optionally redirecting its standard streams
  Run {
    /// Read the command's stdin from this file
    #[arg(long)]
    stdin: Option<PathBuf>,

    /// Write the command's stdout to this file (truncated)
    #[arg(long)]
    stdout: Option<PathBuf>,

    /// Write the command's stderr to this file (truncated)
    #[arg(long)]
    stderr: Option<PathBuf>,

    /// Program and arguments, after `--`
    #[arg(last = true, required = true, value_name = "COMMAND")]
    command: Vec<OsString>,
  },

  /// Report whether OUTPUT is older than any of INPUTS
  Check {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    #[arg(value_name = "OUTPUT")]
    target: PathBuf,

    #[arg(value_name = "INPUTS")]
    inputs: Vec<PathBuf>,
  },

  /// Run several commands in parallel, separated by `:::`
  Jobs {
    #[arg(last = true, required = true, value_name = "COMMANDS")]
    commands: Vec<OsString>,
  },

  /// Show platform and rebuild settings
  Info {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
  },
}

fn main() -> Result<ExitCode> {
  let cli = Cli::parse();

  let filter = EnvFilter::builder()
    .with_default_directive(LevelFilter::from(cli.log_level).into())
    .from_env_lossy();
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .without_time()
    .init();

  let success = match cli.command {
    Commands::Run {
      stdin,
      stdout,
      stderr,
      command,
    } => cmd_run(command, stdin.as_deref(), stdout.as_deref(), stderr.as_deref())?,
    Commands::Check { output, target, inputs } => cmd_check(&target, &inputs, output)?,
    Commands::Jobs { commands } => cmd_jobs(commands)?,
    Commands::Info { output } => cmd_info(cli.log_level, output)?,
  };

  Ok(if success { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
