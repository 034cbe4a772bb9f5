//! Known vendored dependencies and their fixed layouts.

use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// A subproject the extension needs, identified by directory-name prefix.
///
/// Subproject directories are named `<name>-<version>` and the version
/// changes between upstream releases, so matching is by prefix only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
  Brotli,
  Lz4,
  Woff2,
}

impl DependencyKind {
  /// Kinds that contribute static libraries, in link order. Within brotli
  /// the decoder must precede common.
  pub const LINK_ORDER: [DependencyKind; 2] = [DependencyKind::Brotli, DependencyKind::Lz4];

  pub const INCLUDE_ORDER: [DependencyKind; 3] = [DependencyKind::Lz4, DependencyKind::Brotli, DependencyKind::Woff2];

  pub fn name(self) -> &'static str {
    match self {
      DependencyKind::Brotli => "brotli",
      DependencyKind::Lz4 => "lz4",
      DependencyKind::Woff2 => "woff2",
    }
  }

  /// Directory-name prefix, e.g. `lz4-`.
  pub fn prefix(self) -> &'static str {
    match self {
      DependencyKind::Brotli => "brotli-",
      DependencyKind::Lz4 => "lz4-",
      DependencyKind::Woff2 => "woff2-",
    }
  }

  /// Whether the build directory must contain this subproject.
  pub fn required_in_build(self) -> bool {
    !self.libraries().is_empty()
  }

  /// Static libraries relative to the subproject's build directory.
  pub fn libraries(self) -> &'static [&'static str] {
    match self {
      DependencyKind::Brotli => &["libbrotli_decoder.a", "libbrotli_common.a"],
      DependencyKind::Lz4 => &["contrib/meson/meson/lib/liblz4.a"],
      // compiled into the extension from source
      DependencyKind::Woff2 => &[],
    }
  }

  /// Include directories relative to the subproject's source directory.
  pub fn include_dirs(self) -> &'static [&'static str] {
    match self {
      DependencyKind::Brotli => &["c/include"],
      DependencyKind::Lz4 => &["lib"],
      DependencyKind::Woff2 => &["include"],
    }
  }

  /// Sources the extension compiles itself, relative to the subproject's
  /// source directory.
  pub fn sources(self) -> &'static [&'static str] {
    match self {
      DependencyKind::Woff2 => &[
        "src/table_tags.cc",
        "src/variable_length.cc",
        "src/woff2_common.cc",
        "src/woff2_dec.cc",
        "src/woff2_out.cc",
      ],
      _ => &[],
    }
  }

  /// If `dir_name` is `<name>-<version>`, the version suffix.
  pub fn match_dir<'a>(self, dir_name: &'a str) -> Option<&'a str> {
    dir_name.strip_prefix(self.prefix())
  }

  pub fn from_dir_name(dir_name: &str) -> Option<(DependencyKind, &str)> {
    [DependencyKind::Brotli, DependencyKind::Lz4, DependencyKind::Woff2]
      .into_iter()
      .find_map(|kind| kind.match_dir(dir_name).map(|version| (kind, version)))
  }
}

impl fmt::Display for DependencyKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// A version-qualified subproject directory found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildGraphNode {
  pub kind: DependencyKind,
  pub version: String,
  pub root: PathBuf,
}

impl BuildGraphNode {
  pub fn dir_name(&self) -> String {
    format!("{}-{}", self.kind.name(), self.version)
  }

  /// The kind's static libraries rooted at this directory, in link order.
  pub fn artifact_paths(&self) -> Vec<PathBuf> {
    self.join_all(self.kind.libraries())
  }

  pub fn join_all(&self, relative: &[&str]) -> Vec<PathBuf> {
    relative.iter().map(|rel| join_relative(&self.root, rel)).collect()
  }
}

/// Order version strings by their dot-separated components. Components
/// that are both integers compare numerically, anything else as text. When
/// one version is a prefix of the other the longer one is newer.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
  let mut left = a.split('.');
  let mut right = b.split('.');
  loop {
    match (left.next(), right.next()) {
      (None, None) => return a.cmp(b),
      (Some(_), None) => return Ordering::Greater,
      (None, Some(_)) => return Ordering::Less,
      (Some(l), Some(r)) => {
        let ordering = match (l.parse::<u64>(), r.parse::<u64>()) {
          (Ok(l), Ok(r)) => l.cmp(&r),
          _ => l.cmp(r),
        };
        if ordering != Ordering::Equal {
          return ordering;
        }
      }
    }
  }
}

fn join_relative(root: &Path, rel: &str) -> PathBuf {
  rel.split('/').fold(root.to_path_buf(), |path, part| path.join(part))
}
