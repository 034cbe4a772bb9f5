mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use otsprep_lib::pipeline::PipelineError;

use crate::output::{OutputFormat, Status, status};

/// otsprep - provision a vendored OTS build for the pyots extension
#[derive(Parser)]
#[command(name = "otsprep")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Output format
  #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
  format: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Download, verify, unpack and patch the OTS release archive
  Download {
    /// Release version, e.g. 9.2.0
    #[arg(long)]
    version: String,

    /// Expected SHA-256 of the release archive
    #[arg(long)]
    sha256: String,

    /// Directory to unpack into (default: $OTSPREP_DOWNLOAD_DIR or ./src)
    #[arg(long)]
    download_dir: Option<PathBuf>,

    /// Remove an existing source tree first
    #[arg(long)]
    clean: bool,

    /// Log what would happen without touching disk or network
    #[arg(long)]
    dry_run: bool,

    /// Skip manifest rewrites whose anchor is missing instead of failing
    #[arg(long)]
    lenient: bool,
  },

  /// Configure and build the unpacked source tree
  Build {
    /// Reconfigure and clean before building
    #[arg(short, long)]
    force: bool,

    /// Ninja targets to build (default: all)
    targets: Vec<String>,
  },

  /// Print the libraries, include directories and sources to link against
  Resolve {
    /// Fail if any resolved path is missing on disk
    #[arg(long)]
    check: bool,
  },

  /// Download, build and resolve in one go
  Run {
    /// Release version, e.g. 9.2.0
    #[arg(long)]
    version: String,

    /// Expected SHA-256 of the release archive
    #[arg(long)]
    sha256: String,

    /// Remove an existing source tree first
    #[arg(long)]
    clean: bool,

    /// Reconfigure and clean before building
    #[arg(short, long)]
    force: bool,

    /// Ninja targets to build (default: all)
    targets: Vec<String>,
  },
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "info" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let result = match cli.command {
    Commands::Download {
      version,
      sha256,
      download_dir,
      clean,
      dry_run,
      lenient,
    } => cmd::cmd_download(
      cmd::DownloadArgs {
        version,
        sha256,
        download_dir,
        clean,
        dry_run,
        lenient,
      },
      cli.format,
    ),
    Commands::Build { force, targets } => cmd::cmd_build(force, targets, cli.format),
    Commands::Resolve { check } => cmd::cmd_resolve(check, cli.format),
    Commands::Run {
      version,
      sha256,
      clean,
      force,
      targets,
    } => cmd::cmd_run(&version, &sha256, clean, force, targets, cli.format),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      status(Status::Failed, &format!("{:#}", err));
      ExitCode::from(exit_code(&err))
    }
  }
}

/// A failed meson or ninja run propagates its own exit code.
fn exit_code(err: &anyhow::Error) -> u8 {
  let code = err.downcast_ref::<PipelineError>().map_or(1, PipelineError::exit_code);
  u8::try_from(code).ok().filter(|c| *c != 0).unwrap_or(1)
}
