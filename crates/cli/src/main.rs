mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use output::{OutputFormat, print_error};

/// wkpack - prepare and package wkhtmltox builds
#[derive(Parser)]
#[command(name = "wkpack")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging (overridden by RUST_LOG)
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

/// Arguments identifying one target build.
#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
  /// Path to the JSON build configuration
  #[arg(short, long)]
  pub config: PathBuf,

  /// Target identifier, e.g. osx-cocoa-x86-64 or msvc2015-win64
  #[arg(short, long)]
  pub target: String,

  /// Build directory (contains app/)
  #[arg(long, default_value = ".")]
  pub build_dir: PathBuf,

  /// Product source directory
  #[arg(long, default_value = ".")]
  pub src_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
  /// Show the host platform
  Info,

  /// Print the build environment and extra build arguments for a target
  Prepare {
    #[command(flatten)]
    build: BuildArgs,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t)]
    format: OutputFormat,
  },

  /// Stage the install output and build the platform package
  Package {
    #[command(flatten)]
    build: BuildArgs,

    /// Release version, e.g. 0.12.6
    #[arg(long)]
    release: String,

    /// Package iteration
    #[arg(long, default_value = "1")]
    iteration: String,

    /// NSIS install directory (skips registry discovery)
    #[arg(long)]
    nsis_dir: Option<PathBuf>,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t)]
    format: OutputFormat,
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
    Commands::Info => {
      cmd::cmd_info();
      Ok(())
    }
    Commands::Prepare { build, format } => cmd::cmd_prepare(&build, format),
    Commands::Package {
      build,
      release,
      iteration,
      nsis_dir,
      format,
    } => cmd::cmd_package(&build, &release, &iteration, nsis_dir, format),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      print_error(&format!("{e:#}"));
      ExitCode::FAILURE
    }
  }
}
