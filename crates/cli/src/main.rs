mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use packforge_lib::consts::DEFAULT_PROFILE;

use crate::output::{OutputFormat, Status, print_status};

/// packforge - build content packs and publish them safely
#[derive(Parser)]
#[command(name = "packforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Project directory
  #[arg(long, global = true, default_value = ".")]
  project: PathBuf,

  /// Output format
  #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
  output: OutputFormat,

  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Create a new project
  Init {
    /// Directory to initialize (defaults to --project)
    path: Option<PathBuf>,

    /// Project name (defaults to the directory name)
    #[arg(long)]
    name: Option<String>,
  },

  /// Run a profile's steps and export the result
  Run {
    #[arg(default_value = DEFAULT_PROFILE)]
    profile: String,
  },

  /// Show where a profile exports to
  Paths {
    #[arg(default_value = DEFAULT_PROFILE)]
    profile: String,
  },

  /// Check that exporting a profile would only replace files packforge created
  Check {
    #[arg(default_value = DEFAULT_PROFILE)]
    profile: String,
  },

  /// Remove the working copy and leftover backup directory
  Clean {
    /// Show what would be removed without removing it
    #[arg(long)]
    dry_run: bool,

    /// Also remove a backup directory that still holds files
    #[arg(long)]
    force: bool,
  },
}

fn init_tracing(verbose: bool) {
  let filter = if verbose {
    EnvFilter::new("debug")
  } else {
    // Step output is logged at info level and should stay visible.
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,packforge_lib::pipeline=info"))
  };

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let result = match cli.command {
    Commands::Init { path, name } => cmd::cmd_init(path.as_deref().unwrap_or(&cli.project), name, cli.output),
    Commands::Run { profile } => cmd::cmd_run(&cli.project, &profile, cli.output),
    Commands::Paths { profile } => cmd::cmd_paths(&cli.project, &profile, cli.output),
    Commands::Check { profile } => cmd::cmd_check(&cli.project, &profile, cli.output),
    Commands::Clean { dry_run, force } => cmd::cmd_clean(&cli.project, dry_run, force, cli.output),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      print_status(Status::Error, &format!("{e:#}"));
      ExitCode::FAILURE
    }
  }
}
