//! Per-library build drivers.
//!
//! One driver per catalog entry, selected by name. Every driver is the
//! same small sequence — configure, clean, compile with the context's
//! concurrency, install into a staged destdir, merge into the shared
//! prefix — expressed through the platform backend, so a driver never
//! talks to a shell directly.
//!
//! Drivers never attempt partial cleanup on failure: a non-zero exit
//! aborts the driver immediately and the explicit clean operation is
//! responsible for removing the leftovers.

mod bzip2;
mod libxml2;
mod onig;
mod openssl;
mod xz;
mod zlib;

use std::collections::BTreeMap;
use std::fs;

use arx_platform::{Backend, ExecError, merge_tree};

use crate::context::BuildContext;
use crate::error::BuildError;
use crate::store::{ArtifactSet, ExpectedArtifacts};

/// Build driver, selected by library name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
  Bzip2,
  Libxml2,
  Onig,
  Openssl,
  Xz,
  Zlib,
}

impl Driver {
  pub fn for_library(name: &str) -> Option<Self> {
    match name {
      "bzip2" => Some(Driver::Bzip2),
      "libxml2" => Some(Driver::Libxml2),
      "onig" => Some(Driver::Onig),
      "openssl" => Some(Driver::Openssl),
      "xz" => Some(Driver::Xz),
      "zlib" => Some(Driver::Zlib),
      _ => None,
    }
  }

  /// Declared outputs under the shared prefix. The store checks these
  /// after the driver reports success.
  pub fn expected(&self) -> ExpectedArtifacts {
    match self {
      Driver::Bzip2 => bzip2::ARTIFACTS,
      Driver::Libxml2 => libxml2::ARTIFACTS,
      Driver::Onig => onig::ARTIFACTS,
      Driver::Openssl => openssl::ARTIFACTS,
      Driver::Xz => xz::ARTIFACTS,
      Driver::Zlib => zlib::ARTIFACTS,
    }
  }

  /// Run the full configure → compile → install sequence for this
  /// library.
  ///
  /// `deps` is the orchestrator-accumulated mapping of already-built
  /// artifact sets. Drivers with a soft dependency look it up here and
  /// silently omit the enrichment when it is absent.
  pub async fn build(
    &self,
    ctx: &BuildContext,
    backend: &Backend,
    deps: &BTreeMap<String, ArtifactSet>,
  ) -> Result<(), BuildError> {
    match self {
      Driver::Bzip2 => bzip2::build(ctx, backend).await,
      Driver::Libxml2 => libxml2::build(ctx, backend).await,
      Driver::Onig => onig::build(ctx, backend).await,
      Driver::Openssl => openssl::build(ctx, backend, deps).await,
      Driver::Xz => xz::build(ctx, backend).await,
      Driver::Zlib => zlib::build(ctx, backend).await,
    }
  }
}

/// Wrap a backend failure with the library it belongs to.
pub(crate) fn fail(library: &'static str) -> impl Fn(ExecError) -> BuildError {
  move |source| BuildError::ExternalTool {
    library: library.to_string(),
    source,
  }
}

/// Merge a library's staged destdir into the shared prefix and discard
/// the staging directory.
pub(crate) fn merge_staging(ctx: &BuildContext, library: &'static str) -> Result<(), BuildError> {
  let staged = ctx.staging_dir(library);
  merge_tree(&staged, &ctx.build_root).map_err(|source| BuildError::StageMerge {
    library: library.to_string(),
    source,
  })?;
  fs::remove_dir_all(&staged)?;
  Ok(())
}
