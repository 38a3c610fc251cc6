//! libxml2: autotools, linked against the zlib and liblzma archives
//! already materialized in the shared prefix.
//!
//! Both are hard dependencies declared in the catalog, so the build order
//! guarantees their artifacts exist before this driver runs.

use arx_platform::Backend;

use crate::context::BuildContext;
use crate::error::BuildError;
use crate::store::ExpectedArtifacts;

use super::{fail, merge_staging};

pub(crate) const ARTIFACTS: ExpectedArtifacts = ExpectedArtifacts {
  archives: &["libxml2.a"],
  headers: &["libxml2"],
};

pub(crate) async fn build(ctx: &BuildContext, backend: &Backend) -> Result<(), BuildError> {
  let sh = backend.workdir(ctx.source_dir("libxml2"));
  let env = &ctx.toolchain_env;
  let err = fail("libxml2");

  sh.run(&configure_cmd(ctx), env).await.map_err(&err)?;
  sh.run("make clean", env).await.map_err(&err)?;
  sh.run(&format!("make -j{}", ctx.concurrency), env)
    .await
    .map_err(&err)?;
  sh.run(
    &format!(
      "make install DESTDIR={}",
      ctx.staging_dir("libxml2").display()
    ),
    env,
  )
  .await
  .map_err(&err)?;

  merge_staging(ctx, "libxml2")
}

fn configure_cmd(ctx: &BuildContext) -> String {
  let prefix = ctx.build_root.display();
  format!(
    "./configure --enable-static --disable-shared --without-python \
     --with-zlib={prefix} --with-lzma={prefix} --host={} --prefix=/",
    ctx.triple
  )
}
