//! Implementation of the `arx build` command.
//!
//! Parses the requested library list, optionally wipes the build root
//! (with confirmation), then hands the run to the orchestrator and prints
//! a human-readable summary. All build semantics live in arx-core; this
//! layer only owns argument handling and presentation.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use console::{Term, style};

use arx_core::{ArtifactStore, BuildContext, BuildOptions, ContextOptions, Orchestrator, registry};
use arx_platform::Arch;

use crate::prompts;

pub struct BuildArgs {
  pub libraries: Option<String>,
  pub all: bool,
  pub clean: bool,
  pub yes: bool,
  pub libs_only: bool,
  pub jobs: Option<usize>,
  pub arch: Option<Arch>,
  pub build_root: Option<PathBuf>,
  pub source_root: Option<PathBuf>,
}

pub fn cmd_build(args: BuildArgs) -> Result<()> {
  let term = Term::stderr();

  let requested = requested_libraries(&args)?;

  let ctx = BuildContext::new(ContextOptions {
    arch: args.arch,
    concurrency: args.jobs,
    build_root: args.build_root,
    source_root: args.source_root,
    env_overrides: Default::default(),
  });

  if args.clean {
    term.write_line(&format!(
      "{} Removing build root {}",
      style("::").yellow().bold(),
      ctx.build_root.display()
    ))?;
    if !prompts::confirm("This cannot be undone. Continue?", args.yes)? {
      term.write_line("Aborted.")?;
      return Ok(());
    }
    ArtifactStore::new(&ctx.build_root).clean()?;
  }

  term.write_line(&format!(
    "{} Building [{}] for {} with {} job(s)",
    style("::").cyan().bold(),
    requested.join(", "),
    ctx.triple,
    ctx.concurrency
  ))?;

  let options = BuildOptions {
    libs_only: args.libs_only,
  };
  let orchestrator = Orchestrator::new(&ctx);

  let started = Instant::now();
  let rt = tokio::runtime::Runtime::new().context("failed to create async runtime")?;
  let summary = rt.block_on(orchestrator.build_libraries(&requested, &options))?;

  for name in &summary.plan {
    let archives = summary
      .artifacts
      .get(name)
      .map(|set| set.archives.len())
      .unwrap_or(0);
    term.write_line(&format!(
      "  {} {} ({} archive(s))",
      style("+").green().bold(),
      name,
      archives
    ))?;
  }

  term.write_line(&format!(
    "{} Build complete, used {:.3} s",
    style("::").green().bold(),
    started.elapsed().as_secs_f64()
  ))?;

  Ok(())
}

fn requested_libraries(args: &BuildArgs) -> Result<Vec<String>> {
  if args.all {
    return Ok(registry::all().iter().map(|s| s.name.to_string()).collect());
  }

  let list = args.libraries.clone().unwrap_or_default();
  let names: Vec<String> = list
    .split(',')
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(str::to_string)
    .collect();

  if names.is_empty() {
    bail!("no libraries requested; pass a comma-separated list or --all");
  }
  Ok(names)
}
