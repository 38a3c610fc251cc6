//! Dependency-ordered build orchestration.
//!
//! The orchestrator turns a requested set of library names into a
//! deterministic build plan and walks it strictly sequentially: resolve
//! every name against the catalog, pull in the transitive hard
//! dependencies, order the set topologically (alphabetical tie-break, so
//! identical requests produce identical plans and logs), then invoke each
//! library's driver exactly once with the artifact sets of everything
//! already built. The first failure aborts the walk; finished libraries
//! stay installed and a later run can resume from the remainder.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::{error, info};

use arx_platform::{Backend, ExecError, Os};

use crate::context::BuildContext;
use crate::driver::Driver;
use crate::error::BuildError;
use crate::registry::{self, LibrarySpec};
use crate::store::{ArtifactSet, ArtifactStore};

/// Flags forwarded from the CLI.
///
/// `libs_only` is recorded in the summary for downstream phases; it does
/// not change anything about the walk itself.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
  pub libs_only: bool,
}

/// Outcome of a successful run.
#[derive(Debug)]
pub struct BuildSummary {
  /// The executed plan, in build order.
  pub plan: Vec<String>,
  /// Artifact sets of everything built, by library name.
  pub artifacts: BTreeMap<String, ArtifactSet>,
  pub libs_only: bool,
}

/// Drives a whole `build` run against one immutable context.
pub struct Orchestrator<'a> {
  ctx: &'a BuildContext,
  backend: Backend,
}

impl<'a> Orchestrator<'a> {
  pub fn new(ctx: &'a BuildContext) -> Self {
    Self {
      ctx,
      backend: Backend::new(),
    }
  }

  /// Resolve and order the requested names. Pure: no directory is
  /// touched and no process runs, so every specification error surfaces
  /// before any build starts.
  pub fn plan(&self, requested: &[String]) -> Result<Vec<&'static str>, BuildError> {
    plan_catalog(registry::all(), requested, self.ctx.platform.os)
  }

  /// Build the requested libraries in dependency order.
  pub async fn build_libraries(
    &self,
    requested: &[String],
    options: &BuildOptions,
  ) -> Result<BuildSummary, BuildError> {
    let plan = self.plan(requested)?;
    info!(plan = ?plan, triple = %self.ctx.triple, "computed build plan");

    let store = ArtifactStore::new(&self.ctx.build_root);
    let mut runner = DispatchRunner {
      backend: &self.backend,
    };

    let artifacts = walk(&plan, self.ctx, &store, &mut runner).await?;

    // Every *requested* library must be materialized, even if each
    // driver reported success on its own.
    let requested_names: BTreeSet<&str> = requested.iter().map(String::as_str).collect();
    for name in requested_names {
      if let Err(missing) = runner.collect(name, &store) {
        return Err(BuildError::Consistency {
          library: name.to_string(),
          missing,
        });
      }
    }

    Ok(BuildSummary {
      plan: plan.iter().map(|name| (*name).to_string()).collect(),
      artifacts,
      libs_only: options.libs_only,
    })
  }
}

/// Seam between the walk and the real drivers.
///
/// The orchestration loop is tested against a stub implementation; the
/// production implementation dispatches to [`Driver`].
trait DriverRunner {
  async fn build(
    &mut self,
    name: &str,
    ctx: &BuildContext,
    deps: &BTreeMap<String, ArtifactSet>,
  ) -> Result<(), BuildError>;

  /// Look up the library's materialized artifacts in the store.
  fn collect(&self, name: &str, store: &ArtifactStore) -> Result<ArtifactSet, PathBuf>;
}

struct DispatchRunner<'b> {
  backend: &'b Backend,
}

impl DriverRunner for DispatchRunner<'_> {
  async fn build(
    &mut self,
    name: &str,
    ctx: &BuildContext,
    deps: &BTreeMap<String, ArtifactSet>,
  ) -> Result<(), BuildError> {
    let driver =
      Driver::for_library(name).ok_or_else(|| BuildError::UnknownLibrary(name.to_string()))?;
    driver.build(ctx, self.backend, deps).await
  }

  fn collect(&self, name: &str, store: &ArtifactStore) -> Result<ArtifactSet, PathBuf> {
    match Driver::for_library(name) {
      Some(driver) => store.collect(&driver.expected()),
      None => Err(store.prefix().join(name)),
    }
  }
}

/// Execute a plan in order, accumulating artifact sets for downstream
/// drivers. Stops at the first failure; already-built libraries are left
/// installed.
async fn walk<R: DriverRunner>(
  plan: &[&'static str],
  ctx: &BuildContext,
  store: &ArtifactStore,
  runner: &mut R,
) -> Result<BTreeMap<String, ArtifactSet>, BuildError> {
  let mut artifacts = BTreeMap::new();

  for (step, name) in plan.iter().enumerate() {
    info!(
      library = %name,
      step = step + 1,
      total = plan.len(),
      "building library"
    );

    if let Err(err) = runner.build(name, ctx, &artifacts).await {
      if let BuildError::ExternalTool {
        library,
        source: ExecError::CommandFailed {
          command,
          code,
          stderr,
          ..
        },
      } = &err
      {
        error!(
          library = %library,
          command = %command,
          code = ?code,
          stderr = %stderr.trim_end(),
          "external tool failed"
        );
      }
      return Err(err);
    }

    let set = runner
      .collect(name, store)
      .map_err(|missing| BuildError::Consistency {
        library: (*name).to_string(),
        missing,
      })?;
    artifacts.insert((*name).to_string(), set);
  }

  Ok(artifacts)
}

/// Resolve, close over hard dependencies and order a requested set
/// against a catalog.
fn plan_catalog(
  catalog: &'static [LibrarySpec],
  requested: &[String],
  os: Os,
) -> Result<Vec<&'static str>, BuildError> {
  let lookup = |name: &str| catalog.iter().find(|spec| spec.name == name);

  // Resolve the requested names, deduplicating as we go.
  let mut pending: Vec<&'static LibrarySpec> = Vec::new();
  for name in requested {
    let spec = lookup(name).ok_or_else(|| BuildError::UnknownLibrary(name.clone()))?;
    pending.push(spec);
  }

  // Transitive closure over hard dependencies only. Suggests never pull
  // a library in; they only order it when something else requested it.
  let mut closure: BTreeMap<&'static str, &'static LibrarySpec> = BTreeMap::new();
  while let Some(spec) = pending.pop() {
    if closure.insert(spec.name, spec).is_some() {
      continue;
    }
    for dep in spec.deps {
      let dep_spec = lookup(dep).ok_or_else(|| BuildError::UnknownLibrary((*dep).to_string()))?;
      pending.push(dep_spec);
    }
  }

  for spec in closure.values() {
    if !spec.platforms.contains(&os) {
      return Err(BuildError::UnsupportedPlatform {
        library: spec.name.to_string(),
        os,
      });
    }
  }

  order(&closure)
}

/// Topological order with a stable alphabetical tie-break among libraries
/// that are ready at the same time.
fn order(
  closure: &BTreeMap<&'static str, &'static LibrarySpec>,
) -> Result<Vec<&'static str>, BuildError> {
  let mut graph: DiGraph<&'static str, ()> = DiGraph::new();
  let mut nodes: BTreeMap<&'static str, NodeIndex> = BTreeMap::new();

  for name in closure.keys() {
    nodes.insert(*name, graph.add_node(*name));
  }
  for (name, spec) in closure {
    let dependent = nodes[name];
    for dep in spec.deps.iter().chain(spec.suggests) {
      if let Some(&dep_idx) = nodes.get(dep) {
        graph.add_edge(dep_idx, dependent, ());
      }
    }
  }

  let mut in_degree: HashMap<NodeIndex, usize> = graph
    .node_indices()
    .map(|idx| {
      (
        idx,
        graph.neighbors_directed(idx, Direction::Incoming).count(),
      )
    })
    .collect();

  let mut ready: BTreeSet<&'static str> = closure
    .keys()
    .filter(|name| in_degree[&nodes[**name]] == 0)
    .copied()
    .collect();

  let mut plan = Vec::with_capacity(closure.len());
  while let Some(name) = ready.pop_first() {
    plan.push(name);
    for neighbor in graph.neighbors_directed(nodes[name], Direction::Outgoing) {
      if let Some(degree) = in_degree.get_mut(&neighbor) {
        *degree -= 1;
        if *degree == 0 {
          ready.insert(graph[neighbor]);
        }
      }
    }
  }

  if plan.len() != closure.len() {
    let names = closure
      .keys()
      .filter(|name| !plan.contains(name))
      .map(|name| (*name).to_string())
      .collect();
    return Err(BuildError::DependencyCycle { names });
  }

  Ok(plan)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::path::PathBuf;
  use tempfile::TempDir;

  fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
  }

  const BOTH: &[Os] = &[Os::Linux, Os::Darwin, Os::Windows];

  static DIAMOND: &[LibrarySpec] = &[
    LibrarySpec {
      name: "base",
      deps: &[],
      suggests: &[],
      platforms: BOTH,
    },
    LibrarySpec {
      name: "left",
      deps: &["base"],
      suggests: &[],
      platforms: BOTH,
    },
    LibrarySpec {
      name: "right",
      deps: &["base"],
      suggests: &[],
      platforms: BOTH,
    },
  ];

  static CYCLIC: &[LibrarySpec] = &[
    LibrarySpec {
      name: "ping",
      deps: &["pong"],
      suggests: &[],
      platforms: BOTH,
    },
    LibrarySpec {
      name: "pong",
      deps: &["ping"],
      suggests: &[],
      platforms: BOTH,
    },
  ];

  static LINUX_ONLY: &[LibrarySpec] = &[LibrarySpec {
    name: "epoll-shim",
    deps: &[],
    suggests: &[],
    platforms: &[Os::Linux],
  }];

  #[test]
  fn shared_dependency_appears_once_before_both_dependents() {
    let plan = plan_catalog(DIAMOND, &names(&["right", "left"]), Os::Linux).unwrap();
    assert_eq!(plan, vec!["base", "left", "right"]);

    // Deterministic across repeated runs with identical input.
    let again = plan_catalog(DIAMOND, &names(&["right", "left"]), Os::Linux).unwrap();
    assert_eq!(plan, again);
  }

  #[test]
  fn unknown_library_fails_before_anything_runs() {
    let err = plan_catalog(DIAMOND, &names(&["left", "imagick"]), Os::Linux).unwrap_err();
    assert!(matches!(err, BuildError::UnknownLibrary(name) if name == "imagick"));
  }

  #[test]
  fn cycle_is_reported_with_participants() {
    let err = plan_catalog(CYCLIC, &names(&["ping"]), Os::Linux).unwrap_err();
    match err {
      BuildError::DependencyCycle { names } => {
        assert_eq!(names, vec!["ping".to_string(), "pong".to_string()]);
      }
      other => panic!("unexpected error: {other:?}"),
    }
  }

  #[test]
  fn unsupported_target_os_is_a_plan_error() {
    let err = plan_catalog(LINUX_ONLY, &names(&["epoll-shim"]), Os::Windows).unwrap_err();
    assert!(matches!(err, BuildError::UnsupportedPlatform { library, os: Os::Windows } if library == "epoll-shim"));
  }

  #[test]
  fn duplicate_requests_build_once() {
    let plan = plan_catalog(DIAMOND, &names(&["left", "left"]), Os::Linux).unwrap();
    assert_eq!(plan, vec!["base", "left"]);
  }

  #[test]
  fn hard_dependencies_are_pulled_into_the_plan() {
    let plan = plan_catalog(registry::all(), &names(&["libxml2"]), Os::Linux).unwrap();
    assert_eq!(plan, vec!["xz", "zlib", "libxml2"]);
  }

  #[test]
  fn suggests_order_but_never_pull_in() {
    // zlib requested alongside openssl: ordered before it despite
    // openssl declaring no hard dependencies.
    let plan = plan_catalog(registry::all(), &names(&["openssl", "zlib"]), Os::Linux).unwrap();
    assert_eq!(plan, vec!["zlib", "openssl"]);

    // openssl alone: zlib is not dragged into the build set.
    let plan = plan_catalog(registry::all(), &names(&["openssl"]), Os::Linux).unwrap();
    assert_eq!(plan, vec!["openssl"]);
  }

  /// Scripted stand-in for the real drivers: records invocation order and
  /// the dependency keys each driver was handed.
  #[derive(Default)]
  struct StubRunner {
    fail_on: Option<&'static str>,
    missing_artifact_for: Option<&'static str>,
    log: Vec<String>,
    seen_deps: BTreeMap<String, Vec<String>>,
  }

  impl DriverRunner for StubRunner {
    async fn build(
      &mut self,
      name: &str,
      _ctx: &BuildContext,
      deps: &BTreeMap<String, ArtifactSet>,
    ) -> Result<(), BuildError> {
      self.log.push(name.to_string());
      self
        .seen_deps
        .insert(name.to_string(), deps.keys().cloned().collect());

      if self.fail_on == Some(name) {
        return Err(BuildError::ExternalTool {
          library: name.to_string(),
          source: ExecError::CommandFailed {
            command: "make -j1".to_string(),
            code: Some(2),
            stdout: String::new(),
            stderr: "fatal error".to_string(),
          },
        });
      }
      Ok(())
    }

    fn collect(&self, name: &str, store: &ArtifactStore) -> Result<ArtifactSet, PathBuf> {
      let archive = store.lib_dir().join(format!("lib{name}.a"));
      if self.missing_artifact_for == Some(name) {
        return Err(archive);
      }
      Ok(ArtifactSet {
        archives: vec![archive],
        headers: vec![],
      })
    }
  }

  fn test_ctx(dir: &TempDir) -> BuildContext {
    BuildContext::for_testing(dir.path().join("buildroot"), dir.path().join("source"))
  }

  #[tokio::test]
  async fn walk_visits_plan_in_order_and_accumulates_artifacts() {
    let dir = TempDir::new().unwrap();
    let ctx = test_ctx(&dir);
    let store = ArtifactStore::new(&ctx.build_root);
    let mut runner = StubRunner::default();

    let plan = plan_catalog(registry::all(), &names(&["openssl", "zlib"]), Os::Linux).unwrap();
    let artifacts = walk(&plan, &ctx, &store, &mut runner).await.unwrap();

    assert_eq!(runner.log, vec!["zlib", "openssl"]);
    assert_eq!(artifacts.len(), 2);
    // openssl saw zlib's artifacts because zlib preceded it.
    assert_eq!(runner.seen_deps["openssl"], vec!["zlib".to_string()]);
  }

  #[tokio::test]
  async fn soft_dependency_is_absent_when_not_requested() {
    let dir = TempDir::new().unwrap();
    let ctx = test_ctx(&dir);
    let store = ArtifactStore::new(&ctx.build_root);
    let mut runner = StubRunner::default();

    let plan = plan_catalog(registry::all(), &names(&["openssl"]), Os::Linux).unwrap();
    walk(&plan, &ctx, &store, &mut runner).await.unwrap();

    assert!(runner.seen_deps["openssl"].is_empty());
  }

  #[tokio::test]
  async fn first_failure_stops_the_walk() {
    let dir = TempDir::new().unwrap();
    let ctx = test_ctx(&dir);
    let store = ArtifactStore::new(&ctx.build_root);
    let mut runner = StubRunner {
      fail_on: Some("zlib"),
      ..Default::default()
    };

    let plan = plan_catalog(registry::all(), &names(&["openssl", "zlib"]), Os::Linux).unwrap();
    let err = walk(&plan, &ctx, &store, &mut runner).await.unwrap_err();

    match err {
      BuildError::ExternalTool { library, source } => {
        assert_eq!(library, "zlib");
        assert!(matches!(
          source,
          ExecError::CommandFailed { code: Some(2), .. }
        ));
      }
      other => panic!("unexpected error: {other:?}"),
    }
    // openssl's driver was never invoked.
    assert_eq!(runner.log, vec!["zlib"]);
  }

  #[tokio::test]
  async fn missing_artifact_after_success_is_a_consistency_error() {
    let dir = TempDir::new().unwrap();
    let ctx = test_ctx(&dir);
    let store = ArtifactStore::new(&ctx.build_root);
    let mut runner = StubRunner {
      missing_artifact_for: Some("zlib"),
      ..Default::default()
    };

    let plan = plan_catalog(registry::all(), &names(&["zlib"]), Os::Linux).unwrap();
    let err = walk(&plan, &ctx, &store, &mut runner).await.unwrap_err();

    match err {
      BuildError::Consistency { library, missing } => {
        assert_eq!(library, "zlib");
        assert!(missing.ends_with("lib/libzlib.a"));
      }
      other => panic!("unexpected error: {other:?}"),
    }
  }

  #[tokio::test]
  async fn empty_request_is_an_empty_run() {
    let dir = TempDir::new().unwrap();
    let ctx = test_ctx(&dir);
    let store = ArtifactStore::new(&ctx.build_root);
    let mut runner = StubRunner::default();

    let artifacts = walk(&[], &ctx, &store, &mut runner).await.unwrap();
    assert!(artifacts.is_empty());
    assert!(runner.log.is_empty());
  }
}
