//! Target platform and architecture modelling

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Operating system a build targets.
///
/// arx only cross-compiles across architectures, never across operating
/// systems, so the target OS is always the host OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
  Linux,
  Darwin,
  Windows,
}

impl Os {
  /// Detect the current operating system at compile time
  #[cfg(target_os = "linux")]
  pub const fn current() -> Self {
    Os::Linux
  }

  #[cfg(target_os = "macos")]
  pub const fn current() -> Self {
    Os::Darwin
  }

  #[cfg(target_os = "windows")]
  pub const fn current() -> Self {
    Os::Windows
  }

  pub const fn as_str(&self) -> &'static str {
    match self {
      Os::Linux => "linux",
      Os::Darwin => "darwin",
      Os::Windows => "windows",
    }
  }
}

impl fmt::Display for Os {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// CPU architecture a build targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
  X86_64,
  Aarch64,
}

impl Arch {
  /// Detect the current architecture at compile time
  #[cfg(target_arch = "x86_64")]
  pub const fn current() -> Self {
    Arch::X86_64
  }

  #[cfg(target_arch = "aarch64")]
  pub const fn current() -> Self {
    Arch::Aarch64
  }

  pub const fn as_str(&self) -> &'static str {
    match self {
      Arch::X86_64 => "x86_64",
      Arch::Aarch64 => "aarch64",
    }
  }
}

impl FromStr for Arch {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "x86_64" | "amd64" => Ok(Arch::X86_64),
      "aarch64" | "arm64" => Ok(Arch::Aarch64),
      other => Err(format!("unsupported architecture: {other}")),
    }
  }
}

impl fmt::Display for Arch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Combined target identifier (e.g. "aarch64-darwin").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Platform {
  pub arch: Arch,
  pub os: Os,
}

impl Platform {
  pub const fn new(arch: Arch, os: Os) -> Self {
    Self { arch, os }
  }

  /// Detect the current platform at compile time
  pub const fn current() -> Self {
    Self {
      arch: Arch::current(),
      os: Os::current(),
    }
  }

  /// The target triple handed to configure scripts (`--host=`) and
  /// cross toolchains.
  pub fn triple(&self) -> String {
    match self.os {
      Os::Linux => format!("{}-unknown-linux", self.arch),
      Os::Darwin => format!("{}-apple-darwin", self.arch),
      Os::Windows => format!("{}-pc-windows", self.arch),
    }
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}-{}", self.arch, self.os)
  }
}
