//! Pinned upstream release description.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::consts::{PRODUCT_NAME, SHA256_HEX_LEN, VERSION_PLACEHOLDER};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReleaseSpecError {
  #[error("must specify a version to download")]
  MissingVersion,

  #[error("must specify the SHA-256 of the downloaded file")]
  MissingDigest,

  #[error("SHA-256 digest must be 64 hex characters, got '{0}'")]
  MalformedDigest(String),
}

/// The single upstream artifact this tool provisions.
///
/// Immutable once constructed. Both the version and the expected digest are
/// mandatory; there is no default digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseSpec {
  version: String,
  expected_digest: String,
  download_dir: PathBuf,
}

impl ReleaseSpec {
  pub fn new(
    version: impl Into<String>,
    expected_digest: impl Into<String>,
    download_dir: impl Into<PathBuf>,
  ) -> Result<Self, ReleaseSpecError> {
    let version = version.into().trim().to_string();
    let expected_digest = expected_digest.into().trim().to_string();

    if version.is_empty() {
      return Err(ReleaseSpecError::MissingVersion);
    }
    if expected_digest.is_empty() {
      return Err(ReleaseSpecError::MissingDigest);
    }
    if expected_digest.len() != SHA256_HEX_LEN || !expected_digest.chars().all(|c| c.is_ascii_hexdigit()) {
      return Err(ReleaseSpecError::MalformedDigest(expected_digest));
    }

    Ok(Self {
      version,
      expected_digest,
      download_dir: download_dir.into(),
    })
  }

  pub fn version(&self) -> &str {
    &self.version
  }

  pub fn expected_digest(&self) -> &str {
    &self.expected_digest
  }

  pub fn download_dir(&self) -> &Path {
    &self.download_dir
  }

  /// The archive's file name, e.g. `ots-9.2.0.tar.xz`.
  pub fn archive_name(&self) -> String {
    format!("{}-{}.tar.xz", PRODUCT_NAME, self.version)
  }

  /// Expand a release URL template for this version.
  pub fn url(&self, template: &str) -> String {
    template.replace(VERSION_PLACEHOLDER, &self.version)
  }

  /// Where the extracted tree lives: `<download_dir>/ots`.
  pub fn source_dir(&self) -> PathBuf {
    self.download_dir.join(PRODUCT_NAME)
  }
}
