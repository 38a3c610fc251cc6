//! Error types for arx-core

use std::path::PathBuf;

use thiserror::Error;

use arx_platform::{ExecError, Os};

/// Errors raised while planning or executing a build run.
///
/// Specification problems (unknown names, cycles, unsupported targets)
/// are detected before any external process runs. Nothing here is ever
/// silently recovered; the first error aborts the remaining plan.
#[derive(Debug, Error)]
pub enum BuildError {
  /// A requested name, or a dependency of one, is not in the catalog.
  #[error("unknown library: {0}")]
  UnknownLibrary(String),

  /// The dependency relation over the build set is not acyclic.
  #[error("dependency cycle involving: {}", names.join(", "))]
  DependencyCycle { names: Vec<String> },

  /// The library has no driver for the target operating system.
  #[error("library {library} cannot be built for {os}")]
  UnsupportedPlatform { library: String, os: Os },

  /// A configure/compile/install step exited non-zero.
  #[error("building {library} failed: {source}")]
  ExternalTool {
    library: String,
    #[source]
    source: ExecError,
  },

  /// Merging a staged install into the shared prefix failed.
  #[error("merging staged install for {library} failed: {source}")]
  StageMerge {
    library: String,
    #[source]
    source: ExecError,
  },

  /// A driver reported success but a declared artifact is absent from
  /// the store. A defect in that driver, not a user-input problem.
  #[error("{library} reported success but {} is absent from the install prefix", missing.display())]
  Consistency { library: String, missing: PathBuf },

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}
