//! xz: static liblzma, command-line tools and docs disabled.

use arx_platform::Backend;

use crate::context::BuildContext;
use crate::error::BuildError;
use crate::store::ExpectedArtifacts;

use super::{fail, merge_staging};

pub(crate) const ARTIFACTS: ExpectedArtifacts = ExpectedArtifacts {
  archives: &["liblzma.a"],
  headers: &["lzma.h", "lzma"],
};

pub(crate) async fn build(ctx: &BuildContext, backend: &Backend) -> Result<(), BuildError> {
  let sh = backend.workdir(ctx.source_dir("xz"));
  let env = &ctx.toolchain_env;
  let err = fail("xz");

  sh.run(&configure_cmd(ctx), env).await.map_err(&err)?;
  sh.run("make clean", env).await.map_err(&err)?;
  sh.run(&format!("make -j{}", ctx.concurrency), env)
    .await
    .map_err(&err)?;
  sh.run(
    &format!("make install DESTDIR={}", ctx.staging_dir("xz").display()),
    env,
  )
  .await
  .map_err(&err)?;

  merge_staging(ctx, "xz")
}

fn configure_cmd(ctx: &BuildContext) -> String {
  format!(
    "./configure --enable-static --disable-shared --disable-xz --disable-xzdec \
     --disable-scripts --disable-doc --host={} --prefix=/",
    ctx.triple
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::path::PathBuf;

  #[test]
  fn configure_builds_only_the_library() {
    let ctx = BuildContext::for_testing(PathBuf::from("/b"), PathBuf::from("/s"));
    let cmd = configure_cmd(&ctx);

    assert!(cmd.contains("--disable-shared"));
    assert!(cmd.contains("--disable-xz"));
    assert!(cmd.contains("--disable-doc"));
  }
}
