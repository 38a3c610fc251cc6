//! Static catalog of buildable libraries.
//!
//! Pure data: name, hard dependencies, soft dependencies and supported
//! operating systems for every library arx knows how to build. Dependency
//! resolution and ordering live in the orchestrator; driver selection
//! lives in `driver`.

use arx_platform::Os;

/// One catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LibrarySpec {
  /// Unique key, also the source checkout directory name.
  pub name: &'static str,

  /// Hard dependencies: must be built (and are pulled into the build
  /// set) before this library.
  pub deps: &'static [&'static str],

  /// Soft dependencies: ordered before this library when both are in
  /// the build set, but never pulled in on their own. The driver decides
  /// what to do with the artifacts when they are present.
  pub suggests: &'static [&'static str],

  /// Operating systems this library's driver supports.
  pub platforms: &'static [Os],
}

const LINUX_DARWIN: &[Os] = &[Os::Linux, Os::Darwin];

/// Every library arx can build, sorted by name.
pub static CATALOG: &[LibrarySpec] = &[
  LibrarySpec {
    name: "bzip2",
    deps: &[],
    suggests: &[],
    platforms: LINUX_DARWIN,
  },
  LibrarySpec {
    name: "libxml2",
    deps: &["xz", "zlib"],
    suggests: &[],
    platforms: LINUX_DARWIN,
  },
  LibrarySpec {
    name: "onig",
    deps: &[],
    suggests: &[],
    platforms: LINUX_DARWIN,
  },
  LibrarySpec {
    name: "openssl",
    deps: &[],
    suggests: &["zlib"],
    platforms: LINUX_DARWIN,
  },
  LibrarySpec {
    name: "xz",
    deps: &[],
    suggests: &[],
    platforms: LINUX_DARWIN,
  },
  LibrarySpec {
    name: "zlib",
    deps: &[],
    suggests: &[],
    platforms: LINUX_DARWIN,
  },
];

/// Find a catalog entry by name.
pub fn lookup(name: &str) -> Option<&'static LibrarySpec> {
  CATALOG.iter().find(|spec| spec.name == name)
}

/// The whole catalog.
pub fn all() -> &'static [LibrarySpec] {
  CATALOG
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn lookup_known_and_unknown() {
    assert_eq!(lookup("zlib").unwrap().name, "zlib");
    assert!(lookup("imagemagick").is_none());
  }

  #[test]
  fn catalog_is_sorted_by_name() {
    let names: Vec<_> = CATALOG.iter().map(|s| s.name).collect();
    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(names, sorted);
  }

  #[test]
  fn every_dependency_resolves() {
    for spec in CATALOG {
      for dep in spec.deps.iter().chain(spec.suggests) {
        assert!(
          lookup(dep).is_some(),
          "{} references unknown library {}",
          spec.name,
          dep
        );
      }
    }
  }

  #[test]
  fn openssl_declares_no_hard_dependencies() {
    let spec = lookup("openssl").unwrap();
    assert!(spec.deps.is_empty());
    assert_eq!(spec.suggests, &["zlib"]);
  }
}
