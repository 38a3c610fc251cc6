//! Error types for arx-platform

use thiserror::Error;

/// Errors raised by backend command execution and staged installs.
#[derive(Debug, Error)]
pub enum ExecError {
  /// External command exited non-zero.
  ///
  /// Carries the exact command line and the captured output so a failing
  /// step can be reproduced by hand.
  #[error("command exited with code {code:?}: {command}")]
  CommandFailed {
    command: String,
    code: Option<i32>,
    stdout: String,
    stderr: String,
  },

  /// The command could not be spawned at all (shell missing, bad workdir).
  #[error("failed to spawn `{command}`: {source}")]
  Spawn {
    command: String,
    #[source]
    source: std::io::Error,
  },

  /// I/O error during a staged install or merge.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}
