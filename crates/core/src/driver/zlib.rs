//! zlib: configure-script build, static archive only.

use arx_platform::Backend;

use crate::context::BuildContext;
use crate::error::BuildError;
use crate::store::ExpectedArtifacts;

use super::{fail, merge_staging};

pub(crate) const ARTIFACTS: ExpectedArtifacts = ExpectedArtifacts {
  archives: &["libz.a"],
  headers: &["zlib.h", "zconf.h"],
};

pub(crate) async fn build(ctx: &BuildContext, backend: &Backend) -> Result<(), BuildError> {
  let sh = backend.workdir(ctx.source_dir("zlib"));
  let env = &ctx.toolchain_env;
  let err = fail("zlib");

  sh.run(&configure_cmd(ctx), env).await.map_err(&err)?;
  sh.run("make clean", env).await.map_err(&err)?;
  sh.run(&format!("make -j{}", ctx.concurrency), env)
    .await
    .map_err(&err)?;
  sh.run(
    &format!("make install DESTDIR={}", ctx.staging_dir("zlib").display()),
    env,
  )
  .await
  .map_err(&err)?;

  merge_staging(ctx, "zlib")
}

/// zlib's configure script takes the cross host through `CHOST` rather
/// than `--host`.
fn configure_cmd(ctx: &BuildContext) -> String {
  format!("CHOST={} ./configure --static --prefix=/", ctx.triple)
}
