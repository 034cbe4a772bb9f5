//! Locate the compiled libraries, include directories, and vendored
//! sources a consumer needs to link against the built engine.
//!
//! Subproject directories carry upstream versions in their names
//! (`lz4-1.9.4`), so they are discovered by listing `subprojects/` on both
//! the build side and the source side rather than hard-coded.

mod kind;

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::consts::{MAIN_LIBRARY, SUBPROJECTS_DIR};

pub use kind::{BuildGraphNode, DependencyKind, compare_versions};

#[derive(Debug, Error)]
pub enum ResolveError {
  #[error("no '{name}-*' subproject found in {}", dir.display())]
  MissingDependency { name: &'static str, dir: PathBuf },

  #[error("expected build artifact does not exist: {}", path.display())]
  MissingArtifact { path: PathBuf },

  #[error("failed to read {}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Everything a consumer passes to its compiler and linker. Order matters
/// for `libraries`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkSet {
  pub libraries: Vec<PathBuf>,
  pub include_dirs: Vec<PathBuf>,
  pub sources: Vec<PathBuf>,
}

impl LinkSet {
  /// Paths listed in the set that are absent on disk.
  pub fn missing_paths(&self) -> Vec<&Path> {
    self
      .libraries
      .iter()
      .chain(&self.include_dirs)
      .chain(&self.sources)
      .map(PathBuf::as_path)
      .filter(|path| !path.exists())
      .collect()
  }
}

/// Subprojects found under one `subprojects/` directory.
#[derive(Debug)]
struct SubprojectDir {
  dir: PathBuf,
  nodes: Vec<BuildGraphNode>,
}

impl SubprojectDir {
  /// List `<parent>/subprojects`. A missing directory yields no nodes.
  fn scan(parent: &Path) -> Result<Self, ResolveError> {
    let dir = parent.join(SUBPROJECTS_DIR);
    let mut nodes = Vec::new();

    if dir.is_dir() {
      let entries = std::fs::read_dir(&dir).map_err(|source| ResolveError::Io {
        path: dir.clone(),
        source,
      })?;
      for entry in entries {
        let entry = entry.map_err(|source| ResolveError::Io {
          path: dir.clone(),
          source,
        })?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
          continue;
        };
        if let Some((kind, version)) = DependencyKind::from_dir_name(name) {
          nodes.push(BuildGraphNode {
            kind,
            version: version.to_string(),
            root: entry.path(),
          });
        }
      }
    }

    debug!(dir = %dir.display(), found = nodes.len(), "scanned subprojects");
    Ok(Self { dir, nodes })
  }

  /// The node for `kind`. When several versions are present the highest
  /// version wins.
  fn require(&self, kind: DependencyKind) -> Result<&BuildGraphNode, ResolveError> {
    let mut matches: Vec<&BuildGraphNode> = self.nodes.iter().filter(|n| n.kind == kind).collect();
    matches.sort_by(|a, b| compare_versions(&a.version, &b.version));

    let Some(chosen) = matches.last().copied() else {
      return Err(ResolveError::MissingDependency {
        name: kind.name(),
        dir: self.dir.clone(),
      });
    };
    if matches.len() > 1 {
      warn!(
        dependency = kind.name(),
        dir = %self.dir.display(),
        candidates = matches.len(),
        chosen = %chosen.dir_name(),
        "multiple subproject versions found"
      );
    }
    Ok(chosen)
  }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ArtifactResolver;

impl ArtifactResolver {
  /// Compute the [`LinkSet`] for a configured and built tree.
  ///
  /// Build-side and source-side versions are matched independently, so a
  /// build directory left over from an older release still resolves.
  pub fn resolve(build_dir: &Path, source_dir: &Path) -> Result<LinkSet, ResolveError> {
    let build_dir = absolute(build_dir)?;
    let source_dir = absolute(source_dir)?;

    let built = SubprojectDir::scan(&build_dir)?;
    let vendored = SubprojectDir::scan(&source_dir)?;

    let mut set = LinkSet {
      libraries: vec![build_dir.join(MAIN_LIBRARY)],
      include_dirs: vec![build_dir.clone(), source_dir.join("include")],
      sources: Vec::new(),
    };

    for kind in DependencyKind::LINK_ORDER {
      set.libraries.extend(built.require(kind)?.artifact_paths());
    }

    for kind in DependencyKind::INCLUDE_ORDER {
      let node = vendored.require(kind)?;
      set.include_dirs.extend(node.join_all(kind.include_dirs()));
      set.sources.extend(node.join_all(kind.sources()));
    }

    debug!(
      libraries = set.libraries.len(),
      include_dirs = set.include_dirs.len(),
      sources = set.sources.len(),
      "resolved link set"
    );
    Ok(set)
  }

  /// [`resolve`](Self::resolve), then require every path to exist.
  pub fn resolve_checked(build_dir: &Path, source_dir: &Path) -> Result<LinkSet, ResolveError> {
    let set = Self::resolve(build_dir, source_dir)?;
    if let Some(path) = set.missing_paths().first() {
      return Err(ResolveError::MissingArtifact { path: path.to_path_buf() });
    }
    Ok(set)
  }
}

fn absolute(path: &Path) -> Result<PathBuf, ResolveError> {
  dunce::canonicalize(path).map_err(|source| ResolveError::Io {
    path: path.to_path_buf(),
    source,
  })
}
