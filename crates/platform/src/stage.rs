//! Atomic install primitives for staged library builds.
//!
//! Drivers install into a per-library staging directory (destdir) and the
//! result is merged into the shared install prefix here. Every file lands
//! via write-to-temp-then-rename in its final directory, so a crash mid
//! merge leaves the prefix either without the file or with the complete
//! file, never with a half-written archive.

use std::fs;
use std::io;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::ExecError;

/// Atomically install a single file at `dest`, replacing any existing one.
///
/// The contents are copied into a temporary file in the destination
/// directory and renamed into place, preserving the source permissions.
pub fn install_file(src: &Path, dest: &Path) -> Result<(), ExecError> {
  let parent = dest.parent().unwrap_or(Path::new("."));
  fs::create_dir_all(parent)?;

  let mut tmp = NamedTempFile::new_in(parent)?;
  let mut reader = fs::File::open(src)?;
  io::copy(&mut reader, tmp.as_file_mut())?;

  let perms = fs::metadata(src)?.permissions();
  fs::set_permissions(tmp.path(), perms)?;

  // Windows refuses to rename over an existing file.
  #[cfg(windows)]
  if dest.exists() {
    fs::remove_file(dest)?;
  }

  tmp.persist(dest).map_err(|e| ExecError::Io(e.error))?;
  Ok(())
}

/// Merge a staged install tree into the shared prefix.
///
/// Directories are created as encountered, regular files are installed
/// atomically, symlinks are recreated pointing at their original targets.
/// Returns the number of files installed. The staged tree is left intact;
/// the caller discards it.
pub fn merge_tree(staged: &Path, into: &Path) -> Result<usize, ExecError> {
  let mut installed = 0;

  for entry in WalkDir::new(staged) {
    let entry = entry.map_err(io::Error::from)?;
    let Ok(rel) = entry.path().strip_prefix(staged) else {
      continue;
    };
    if rel.as_os_str().is_empty() {
      continue;
    }
    let dest = into.join(rel);

    let file_type = entry.file_type();
    if file_type.is_dir() {
      fs::create_dir_all(&dest)?;
    } else if file_type.is_symlink() {
      let target = fs::read_link(entry.path())?;
      if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
      }
      if dest.symlink_metadata().is_ok() {
        fs::remove_file(&dest)?;
      }
      create_symlink(&target, &dest)?;
    } else {
      install_file(entry.path(), &dest)?;
      installed += 1;
    }
  }

  debug!(
    staged = %staged.display(),
    into = %into.display(),
    files = installed,
    "merged staged install"
  );

  Ok(installed)
}

fn create_symlink(target: &Path, link: &Path) -> Result<(), ExecError> {
  #[cfg(unix)]
  std::os::unix::fs::symlink(target, link)?;

  #[cfg(windows)]
  {
    if target.is_dir() {
      std::os::windows::fs::symlink_dir(target, link)?;
    } else {
      std::os::windows::fs::symlink_file(target, link)?;
    }
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn install_file_creates_parents_and_copies() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("libz.a");
    fs::write(&src, b"archive bytes").unwrap();

    let dest = dir.path().join("prefix/lib/libz.a");
    install_file(&src, &dest).unwrap();

    assert_eq!(fs::read(&dest).unwrap(), b"archive bytes");
  }

  #[test]
  fn install_file_replaces_existing_completely() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("new.a");
    fs::write(&src, b"new contents").unwrap();

    let dest = dir.path().join("old.a");
    fs::write(&dest, b"stale build from a previous architecture").unwrap();

    install_file(&src, &dest).unwrap();
    assert_eq!(fs::read(&dest).unwrap(), b"new contents");
  }

  #[test]
  fn install_file_leaves_no_temp_files() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("src.h");
    fs::write(&src, b"header").unwrap();

    let dest_dir = dir.path().join("include");
    install_file(&src, &dest_dir.join("src.h")).unwrap();

    let entries: Vec<_> = fs::read_dir(&dest_dir)
      .unwrap()
      .map(|e| e.unwrap().file_name())
      .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("src.h")]);
  }

  #[test]
  fn merge_tree_installs_whole_layout() {
    let dir = TempDir::new().unwrap();
    let staged = dir.path().join("staging/zlib");
    fs::create_dir_all(staged.join("lib")).unwrap();
    fs::create_dir_all(staged.join("include")).unwrap();
    fs::write(staged.join("lib/libz.a"), b"archive").unwrap();
    fs::write(staged.join("include/zlib.h"), b"header").unwrap();
    fs::write(staged.join("include/zconf.h"), b"header2").unwrap();

    let prefix = dir.path().join("buildroot");
    let count = merge_tree(&staged, &prefix).unwrap();

    assert_eq!(count, 3);
    assert!(prefix.join("lib/libz.a").exists());
    assert!(prefix.join("include/zlib.h").exists());
    assert!(prefix.join("include/zconf.h").exists());
  }

  #[test]
  fn merge_tree_overwrites_prior_install() {
    let dir = TempDir::new().unwrap();
    let staged = dir.path().join("staged");
    fs::create_dir_all(staged.join("lib")).unwrap();
    fs::write(staged.join("lib/libfoo.a"), b"rebuilt").unwrap();

    let prefix = dir.path().join("prefix");
    fs::create_dir_all(prefix.join("lib")).unwrap();
    fs::write(prefix.join("lib/libfoo.a"), b"previous").unwrap();

    merge_tree(&staged, &prefix).unwrap();
    assert_eq!(fs::read(prefix.join("lib/libfoo.a")).unwrap(), b"rebuilt");
  }

  #[cfg(unix)]
  #[test]
  fn merge_tree_recreates_symlinks() {
    let dir = TempDir::new().unwrap();
    let staged = dir.path().join("staged");
    fs::create_dir_all(staged.join("lib")).unwrap();
    fs::write(staged.join("lib/liblzma.a"), b"a").unwrap();
    std::os::unix::fs::symlink("liblzma.a", staged.join("lib/liblzma.a.0")).unwrap();

    let prefix = dir.path().join("prefix");
    merge_tree(&staged, &prefix).unwrap();

    let link = prefix.join("lib/liblzma.a.0");
    assert!(link.symlink_metadata().unwrap().file_type().is_symlink());
    assert_eq!(
      fs::read_link(&link).unwrap(),
      std::path::PathBuf::from("liblzma.a")
    );
  }
}
