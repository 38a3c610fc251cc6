//! oniguruma: plain autotools build.

use arx_platform::Backend;

use crate::context::BuildContext;
use crate::error::BuildError;
use crate::store::ExpectedArtifacts;

use super::{fail, merge_staging};

pub(crate) const ARTIFACTS: ExpectedArtifacts = ExpectedArtifacts {
  archives: &["libonig.a"],
  headers: &["oniguruma.h"],
};

pub(crate) async fn build(ctx: &BuildContext, backend: &Backend) -> Result<(), BuildError> {
  let sh = backend.workdir(ctx.source_dir("onig"));
  let env = &ctx.toolchain_env;
  let err = fail("onig");

  sh.run(&configure_cmd(ctx), env).await.map_err(&err)?;
  sh.run("make clean", env).await.map_err(&err)?;
  sh.run(&format!("make -j{}", ctx.concurrency), env)
    .await
    .map_err(&err)?;
  sh.run(
    &format!("make install DESTDIR={}", ctx.staging_dir("onig").display()),
    env,
  )
  .await
  .map_err(&err)?;

  merge_staging(ctx, "onig")
}

fn configure_cmd(ctx: &BuildContext) -> String {
  format!(
    "./configure --enable-static --disable-shared --host={} --prefix=/",
    ctx.triple
  )
}
