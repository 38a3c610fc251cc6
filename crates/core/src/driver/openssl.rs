//! OpenSSL: its own Configure script and a per-platform compile target.
//!
//! zlib is a soft dependency: when the orchestrator hands us zlib
//! artifacts, compression support is enabled and zlib's archive is folded
//! into the link line via `CNF_EX_LIBS`. When zlib was not requested, the
//! build proceeds without it.

use std::collections::BTreeMap;

use arx_platform::{Backend, Os};

use crate::context::BuildContext;
use crate::error::BuildError;
use crate::store::{ArtifactSet, ExpectedArtifacts};

use super::{fail, merge_staging};

pub(crate) const ARTIFACTS: ExpectedArtifacts = ExpectedArtifacts {
  archives: &["libssl.a", "libcrypto.a"],
  headers: &["openssl"],
};

pub(crate) async fn build(
  ctx: &BuildContext,
  backend: &Backend,
  deps: &BTreeMap<String, ArtifactSet>,
) -> Result<(), BuildError> {
  let zlib = deps.get("zlib");

  let sh = backend.workdir(ctx.source_dir("openssl"));
  let env = &ctx.toolchain_env;
  let err = fail("openssl");

  sh.run(&configure_cmd(ctx, zlib.is_some()), env)
    .await
    .map_err(&err)?;
  sh.run("make clean", env).await.map_err(&err)?;
  sh.run(&make_cmd(ctx, zlib), env).await.map_err(&err)?;
  sh.run(
    &format!(
      "make install_sw DESTDIR={}",
      ctx.staging_dir("openssl").display()
    ),
    env,
  )
  .await
  .map_err(&err)?;

  merge_staging(ctx, "openssl")
}

fn configure_cmd(ctx: &BuildContext, with_zlib: bool) -> String {
  let zlib = if with_zlib { "zlib " } else { "" };
  format!(
    "./Configure no-shared {zlib}--prefix=/ --libdir=lib --openssldir=/etc/ssl {}",
    compile_target(ctx)
  )
}

fn make_cmd(ctx: &BuildContext, zlib: Option<&ArtifactSet>) -> String {
  let ex_libs = zlib.map(ArtifactSet::archive_args).unwrap_or_default();
  format!("make -j{} CNF_EX_LIBS=\"{ex_libs}\"", ctx.concurrency)
}

/// OpenSSL's Configure takes its own target name instead of a triple.
fn compile_target(ctx: &BuildContext) -> String {
  match ctx.platform.os {
    Os::Darwin => format!("darwin64-{}-cc", ctx.platform.arch),
    Os::Linux => format!("linux-{}", ctx.platform.arch),
    // Unreachable through the catalog; kept for the day a Windows
    // driver set lands.
    Os::Windows => "VC-WIN64A".to_string(),
  }
}
