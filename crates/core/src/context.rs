//! Per-run build configuration shared by every driver.

use std::collections::BTreeMap;
use std::path::PathBuf;

use arx_platform::{Arch, Os, Platform};

/// Environment variables captured into the toolchain environment at
/// construction time. The core never re-reads the environment mid-run.
const TOOLCHAIN_VARS: &[&str] = &[
  "PATH", "CC", "CXX", "AR", "RANLIB", "CFLAGS", "CXXFLAGS", "LDFLAGS",
];

/// Run-level inputs for [`BuildContext::new`]. Everything is optional;
/// unset fields fall back to host detection and the conventional layout.
#[derive(Debug, Clone, Default)]
pub struct ContextOptions {
  pub arch: Option<Arch>,
  pub concurrency: Option<usize>,
  pub build_root: Option<PathBuf>,
  pub source_root: Option<PathBuf>,
  /// Explicit toolchain overrides, merged over the captured environment.
  pub env_overrides: BTreeMap<String, String>,
}

/// Immutable per-run configuration.
///
/// Constructed once per invocation and shared by reference across all
/// drivers; no driver mutates it. Directories under `build_root` are
/// created lazily on first write, never assumed pre-existing.
#[derive(Debug, Clone)]
pub struct BuildContext {
  /// Target platform. The OS is always the host OS; only the
  /// architecture is selectable.
  pub platform: Platform,

  /// Target triple handed to configure scripts and cross toolchains.
  pub triple: String,

  /// Job count for parallel build tools (`make -jN`). Always >= 1.
  pub concurrency: usize,

  /// Toolchain environment injected into every external command.
  pub toolchain_env: BTreeMap<String, String>,

  /// Shared install prefix; `lib/` and `include/` live directly below.
  pub build_root: PathBuf,

  /// Root of the pre-fetched per-library source checkouts.
  pub source_root: PathBuf,
}

impl BuildContext {
  /// Build a context from run-level inputs and a one-time read of the
  /// process environment.
  pub fn new(options: ContextOptions) -> Self {
    let arch = options.arch.unwrap_or(Arch::current());
    let platform = Platform::new(arch, Os::current());
    let triple = platform.triple();

    let concurrency = options
      .concurrency
      .filter(|n| *n > 0)
      .unwrap_or_else(default_concurrency);

    let mut toolchain_env = BTreeMap::new();
    for var in TOOLCHAIN_VARS {
      if let Ok(value) = std::env::var(var) {
        toolchain_env.insert((*var).to_string(), value);
      }
    }
    toolchain_env.extend(options.env_overrides);

    let build_root = options
      .build_root
      .or_else(|| std::env::var_os("ARX_BUILD_ROOT").map(PathBuf::from))
      .unwrap_or_else(|| PathBuf::from("buildroot"));

    let source_root = options
      .source_root
      .or_else(|| std::env::var_os("ARX_SOURCE_ROOT").map(PathBuf::from))
      .unwrap_or_else(|| PathBuf::from("source"));

    Self {
      platform,
      triple,
      concurrency,
      toolchain_env,
      build_root,
      source_root,
    }
  }

  /// Context with fixed paths and no environment capture. Only for tests.
  pub fn for_testing(build_root: PathBuf, source_root: PathBuf) -> Self {
    let platform = Platform::current();
    Self {
      platform,
      triple: platform.triple(),
      concurrency: 1,
      toolchain_env: BTreeMap::new(),
      build_root,
      source_root,
    }
  }

  /// Where static archives land.
  pub fn lib_dir(&self) -> PathBuf {
    self.build_root.join("lib")
  }

  /// Where headers land.
  pub fn include_dir(&self) -> PathBuf {
    self.build_root.join("include")
  }

  /// Per-library destdir used transiently during one build.
  pub fn staging_dir(&self, library: &str) -> PathBuf {
    self.build_root.join(".staging").join(library)
  }

  /// Pre-fetched source checkout for a library.
  pub fn source_dir(&self, library: &str) -> PathBuf {
    self.source_root.join(library)
  }
}

fn default_concurrency() -> usize {
  std::thread::available_parallelism()
    .map(|n| n.get())
    .unwrap_or(4)
}
