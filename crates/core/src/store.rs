//! The shared on-disk artifact convention.
//!
//! All libraries install into one prefix: static archives under `lib/`,
//! headers under `include/`, flat across libraries. A driver's output
//! becomes the next driver's input purely through this layout; the store
//! only reads it and never writes anything except the explicit clean.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// On-disk outputs a driver declares for its library.
///
/// Archive names are relative to `lib/`; header entries (files or
/// directories) are relative to `include/`.
#[derive(Debug, Clone, Copy)]
pub struct ExpectedArtifacts {
  pub archives: &'static [&'static str],
  pub headers: &'static [&'static str],
}

/// The observable output of one library's successful build.
#[derive(Debug, Clone, Default)]
pub struct ArtifactSet {
  /// Absolute paths of the installed static archives.
  pub archives: Vec<PathBuf>,
  /// Absolute paths of the installed headers or header directories.
  pub headers: Vec<PathBuf>,
}

impl ArtifactSet {
  /// Archive paths joined with spaces, for splicing into another
  /// library's extra-libs link line.
  pub fn archive_args(&self) -> String {
    self
      .archives
      .iter()
      .map(|p| p.display().to_string())
      .collect::<Vec<_>>()
      .join(" ")
  }
}

/// Read access to the shared install prefix.
pub struct ArtifactStore {
  prefix: PathBuf,
}

impl ArtifactStore {
  pub fn new(prefix: impl Into<PathBuf>) -> Self {
    Self {
      prefix: prefix.into(),
    }
  }

  pub fn prefix(&self) -> &Path {
    &self.prefix
  }

  pub fn lib_dir(&self) -> PathBuf {
    self.prefix.join("lib")
  }

  pub fn include_dir(&self) -> PathBuf {
    self.prefix.join("include")
  }

  /// Look up the materialized artifacts for a declaration.
  ///
  /// Returns the first missing path on failure. Used both to hand a
  /// dependency's artifacts to downstream drivers and to catch drivers
  /// that mis-declare their own output location.
  pub fn collect(&self, expected: &ExpectedArtifacts) -> Result<ArtifactSet, PathBuf> {
    let mut set = ArtifactSet::default();

    for name in expected.archives {
      let path = self.lib_dir().join(name);
      if !path.is_file() {
        return Err(path);
      }
      set.archives.push(path);
    }

    for name in expected.headers {
      let path = self.include_dir().join(name);
      if !path.exists() {
        return Err(path);
      }
      set.headers.push(path);
    }

    Ok(set)
  }

  /// Remove the whole install root, staged leftovers included.
  ///
  /// The only operation that ever deletes artifacts; individual drivers
  /// never remove another library's output.
  pub fn clean(&self) -> io::Result<()> {
    if self.prefix.exists() {
      fs::remove_dir_all(&self.prefix)?;
    }
    Ok(())
  }
}
