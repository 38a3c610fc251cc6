use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use arx_platform::Arch;

mod cmd;
mod prompts;

/// arx - static library build orchestrator
#[derive(Parser)]
#[command(name = "arx")]
#[command(author, version, about, long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build libraries (and their dependencies) into the shared prefix
  Build {
    /// Libraries to build, comma separated
    libraries: Option<String>,

    /// Build every library in the catalog
    #[arg(short = 'A', long)]
    all: bool,

    /// Remove the build root before building
    #[arg(long)]
    clean: bool,

    /// Skip confirmation prompts
    #[arg(short, long)]
    yes: bool,

    /// Mark this run as libraries-only for downstream phases
    #[arg(long)]
    libs_only: bool,

    /// Job count for the compile steps (defaults to the host parallelism)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Target architecture (defaults to the host)
    #[arg(long)]
    arch: Option<Arch>,

    /// Shared install prefix (default: ./buildroot, or $ARX_BUILD_ROOT)
    #[arg(long)]
    build_root: Option<PathBuf>,

    /// Root of the per-library source checkouts (default: ./source)
    #[arg(long)]
    source_root: Option<PathBuf>,
  },

  /// List the library catalog
  List,
}

fn main() -> Result<()> {
  // Initialize logging
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .without_time()
    .init();

  let cli = Cli::parse();

  match cli.command {
    Commands::Build {
      libraries,
      all,
      clean,
      yes,
      libs_only,
      jobs,
      arch,
      build_root,
      source_root,
    } => cmd::cmd_build(cmd::BuildArgs {
      libraries,
      all,
      clean,
      yes,
      libs_only,
      jobs,
      arch,
      build_root,
      source_root,
    }),
    Commands::List => cmd::cmd_list(),
  }
}
