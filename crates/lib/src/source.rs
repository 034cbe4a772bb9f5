//! The on-disk source tree produced by a successful fetch.

use std::path::{Path, PathBuf};

use crate::consts::{MANIFEST_FILE, ORIGINAL_MANIFEST_FILE, SUBPROJECTS_DIR};

/// Extracted upstream sources plus the locally patched build manifest.
///
/// Persists across runs as a cache; only `fetch` with `clean` removes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTree {
  root: PathBuf,
}

impl SourceTree {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn exists(&self) -> bool {
    self.root.is_dir()
  }

  pub fn manifest_path(&self) -> PathBuf {
    self.root.join(MANIFEST_FILE)
  }

  /// Backup of the manifest as shipped upstream. Patching always starts here.
  pub fn original_manifest_path(&self) -> PathBuf {
    self.root.join(ORIGINAL_MANIFEST_FILE)
  }

  pub fn subprojects_dir(&self) -> PathBuf {
    self.root.join(SUBPROJECTS_DIR)
  }
}
