//! bzip2: bespoke Makefile, no configure step.
//!
//! The Makefile has no destdir-style install for the static target, so
//! the archive and header are installed into the prefix directly via the
//! atomic copy primitive instead of a staged merge.

use arx_platform::{Backend, install_file};

use crate::context::BuildContext;
use crate::error::BuildError;
use crate::store::ExpectedArtifacts;

use super::fail;

pub(crate) const ARTIFACTS: ExpectedArtifacts = ExpectedArtifacts {
  archives: &["libbz2.a"],
  headers: &["bzlib.h"],
};

pub(crate) async fn build(ctx: &BuildContext, backend: &Backend) -> Result<(), BuildError> {
  let src = ctx.source_dir("bzip2");
  let sh = backend.workdir(&src);
  let env = &ctx.toolchain_env;
  let err = fail("bzip2");

  sh.run("make clean", env).await.map_err(&err)?;
  sh.run(&format!("make -j{} libbz2.a", ctx.concurrency), env)
    .await
    .map_err(&err)?;

  let stage = |source| BuildError::StageMerge {
    library: "bzip2".to_string(),
    source,
  };
  install_file(&src.join("libbz2.a"), &ctx.lib_dir().join("libbz2.a")).map_err(stage)?;
  install_file(&src.join("bzlib.h"), &ctx.include_dir().join("bzlib.h")).map_err(stage)?;

  Ok(())
}
