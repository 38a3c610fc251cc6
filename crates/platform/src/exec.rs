//! Shell-mediated external command execution.
//!
//! Every build driver runs its configure/compile/install steps through the
//! [`Backend`] here. The backend hides which shell the host uses, injects
//! the toolchain environment on top of the inherited one, and captures the
//! full output of every command so failures can be reported verbatim.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::{debug, trace};

use crate::error::ExecError;

/// Captured result of one external command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
  pub code: Option<i32>,
  pub stdout: String,
  pub stderr: String,
}

/// External command runner for the host platform.
///
/// A single backend instance is shared by all drivers in a run. It never
/// changes the process-wide working directory: the directory is passed to
/// each spawned child, so scoping is restored on every exit path for free.
pub struct Backend {
  shell: String,
  shell_args: Vec<String>,
}

impl Backend {
  /// Backend using the host's default non-interactive shell.
  pub fn new() -> Self {
    let (shell, shell_args) = default_shell();
    Self { shell, shell_args }
  }

  /// Backend using an explicit shell (tests, unusual toolchains).
  pub fn with_shell(shell: &str) -> Self {
    let shell_args = shell_args_for(shell);
    Self {
      shell: shell.to_string(),
      shell_args,
    }
  }

  /// Scope a working directory for a sequence of commands.
  pub fn workdir(&self, dir: impl Into<PathBuf>) -> Workdir<'_> {
    Workdir {
      backend: self,
      dir: dir.into(),
    }
  }

  /// Run `command` with `workdir` as current directory and `env` injected
  /// on top of the inherited environment.
  ///
  /// Blocks the calling task until the whole process tree exits. A
  /// non-zero exit code is an error carrying the captured output; exit
  /// code zero is the only success signal.
  pub async fn run(
    &self,
    workdir: &Path,
    command: &str,
    env: &BTreeMap<String, String>,
  ) -> Result<CommandOutput, ExecError> {
    debug!(cmd = %command, dir = %workdir.display(), "exec");

    let mut child = Command::new(&self.shell);
    child
      .args(&self.shell_args)
      .arg(command)
      .current_dir(workdir)
      // Pin timestamps the native build tools embed into archives.
      .env("SOURCE_DATE_EPOCH", "315532800");

    for (key, value) in env {
      child.env(key, value);
    }

    let output = child.output().await.map_err(|source| ExecError::Spawn {
      command: command.to_string(),
      source,
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
      return Err(ExecError::CommandFailed {
        command: command.to_string(),
        code: output.status.code(),
        stdout,
        stderr,
      });
    }

    if !stdout.is_empty() {
      trace!(stdout = %stdout, "command output");
    }

    Ok(CommandOutput {
      code: output.status.code(),
      stdout,
      stderr,
    })
  }
}

impl Default for Backend {
  fn default() -> Self {
    Self::new()
  }
}

/// A working directory scoped to a sequence of commands.
///
/// Acquired from [`Backend::workdir`]; the prior context needs no explicit
/// restoration because the backend passes the directory per spawned child
/// instead of mutating process state.
pub struct Workdir<'a> {
  backend: &'a Backend,
  dir: PathBuf,
}

impl Workdir<'_> {
  pub fn path(&self) -> &Path {
    &self.dir
  }

  /// Run one command in this directory. See [`Backend::run`].
  pub async fn run(
    &self,
    command: &str,
    env: &BTreeMap<String, String>,
  ) -> Result<CommandOutput, ExecError> {
    self.backend.run(&self.dir, command, env).await
  }
}

/// The default non-interactive shell for the host.
///
/// Always `/bin/sh` on Unix rather than `$SHELL`: interactive shells source
/// profile files that mutate the environment mid-run.
fn default_shell() -> (String, Vec<String>) {
  #[cfg(unix)]
  {
    ("/bin/sh".to_string(), vec!["-c".to_string()])
  }

  #[cfg(windows)]
  {
    ("cmd.exe".to_string(), vec!["/C".to_string()])
  }
}

fn shell_args_for(shell: &str) -> Vec<String> {
  if shell.contains("powershell") || shell.contains("pwsh") {
    vec!["-NoProfile".to_string(), "-Command".to_string()]
  } else if shell.contains("cmd") {
    vec!["/C".to_string()]
  } else {
    vec!["-c".to_string()]
  }
}
