//! Materialize the source tree from the pinned release archive.
//!
//! The archive is downloaded into memory, checked against the caller's
//! SHA-256, unpacked under `<download_dir>/ots` and its manifest patched.
//! A tree that is already present is reused without any network access.

use std::fmt;

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, info};

use crate::archive::{self, ExtractError};
use crate::consts::DEFAULT_RELEASE_URL;
use crate::integrity::{self, ContentHash, IntegrityError};
use crate::manifest::{self, PatchError, PatchOptions};
use crate::release::ReleaseSpec;
use crate::source::SourceTree;

/// Errors that can occur while fetching the source tree.
///
/// A failure after the download leaves the destination in a partial state;
/// rerun with `clean` to recover.
#[derive(Debug, Error)]
pub enum FetchError {
  /// Transport-level failure.
  #[error("failed to download {url}: {message}")]
  Network { url: String, message: String },

  /// The server answered with a non-success status.
  #[error("failed to download {url}: HTTP {status}")]
  Http { url: String, status: u16 },

  #[error("{archive}: {source}")]
  Integrity {
    archive: String,
    #[source]
    source: IntegrityError,
  },

  #[error("{archive}: {source}")]
  Extract {
    archive: String,
    #[source]
    source: ExtractError,
  },

  #[error(transparent)]
  Patch(#[from] PatchError),

  #[error("failed to prepare {}: {source}", path.display())]
  Filesystem {
    path: std::path::PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Progress of a single fetch, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
  Absent,
  Downloading,
  Verifying,
  Extracting,
  Patching,
  Present,
}

impl fmt::Display for FetchState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      FetchState::Absent => "absent",
      FetchState::Downloading => "downloading",
      FetchState::Verifying => "verifying",
      FetchState::Extracting => "extracting",
      FetchState::Patching => "patching",
      FetchState::Present => "present",
    };
    f.write_str(s)
  }
}

/// A downloaded, verified archive. Never written to disk.
#[derive(Debug, Clone)]
pub struct FetchedArchive {
  pub bytes: Bytes,
  pub digest: ContentHash,
}

#[derive(Debug, Clone)]
pub struct ArchiveFetcher {
  client: reqwest::Client,
  url_template: String,
  patch: PatchOptions,
  dry_run: bool,
}

impl Default for ArchiveFetcher {
  fn default() -> Self {
    Self::new(DEFAULT_RELEASE_URL)
  }
}

impl ArchiveFetcher {
  pub fn new(url_template: impl Into<String>) -> Self {
    Self {
      client: reqwest::Client::new(),
      url_template: url_template.into(),
      patch: PatchOptions::default(),
      dry_run: false,
    }
  }

  pub fn with_patch_options(mut self, patch: PatchOptions) -> Self {
    self.patch = patch;
    self
  }

  /// Only log what would happen; touch neither disk nor network.
  pub fn with_dry_run(mut self, dry_run: bool) -> Self {
    self.dry_run = dry_run;
    self
  }

  /// Ensure the source tree for `spec` exists.
  ///
  /// With `clean`, any existing tree is removed first. Without it, an
  /// existing tree is returned as is.
  pub async fn fetch(&self, spec: &ReleaseSpec, clean: bool) -> Result<SourceTree, FetchError> {
    let tree = SourceTree::new(spec.source_dir());
    let url = spec.url(&self.url_template);
    let archive_name = spec.archive_name();

    if clean && tree.exists() {
      info!(path = %tree.root().display(), dry_run = self.dry_run, "removing existing source tree");
      if !self.dry_run {
        tokio::fs::remove_dir_all(tree.root())
          .await
          .map_err(|source| FetchError::Filesystem {
            path: tree.root().to_path_buf(),
            source,
          })?;
      }
    }

    if tree.exists() && !(clean && self.dry_run) {
      info!(path = %tree.root().display(), "{} was already downloaded", tree.root().display());
      return Ok(tree);
    }

    if self.dry_run {
      info!(url = %url, dest = %tree.root().display(), "would download and unarchive {}", archive_name);
      return Ok(tree);
    }

    tokio::fs::create_dir_all(spec.download_dir())
      .await
      .map_err(|source| FetchError::Filesystem {
        path: spec.download_dir().to_path_buf(),
        source,
      })?;

    self.transition(FetchState::Absent, FetchState::Downloading);
    let bytes = self.download(&url).await?;

    self.transition(FetchState::Downloading, FetchState::Verifying);
    let archive = FetchedArchive {
      digest: integrity::verify(&bytes, spec.expected_digest()).map_err(|source| FetchError::Integrity {
        archive: archive_name.clone(),
        source,
      })?,
      bytes,
    };
    debug!(digest = %archive.digest, "checksum verified");

    self.transition(FetchState::Verifying, FetchState::Extracting);
    info!(archive = %archive_name, dest = %tree.root().display(), "unarchiving");
    archive::extract(&archive.bytes, tree.root())
      .await
      .map_err(|source| FetchError::Extract {
        archive: archive_name.clone(),
        source,
      })?;

    self.transition(FetchState::Extracting, FetchState::Patching);
    manifest::patch_file(&tree, &self.patch)?;

    self.transition(FetchState::Patching, FetchState::Present);
    Ok(tree)
  }

  async fn download(&self, url: &str) -> Result<Bytes, FetchError> {
    info!(url = %url, "downloading");

    let response = self.client.get(url).send().await.map_err(|e| FetchError::Network {
      url: url.to_string(),
      message: e.to_string(),
    })?;

    if !response.status().is_success() {
      return Err(FetchError::Http {
        url: url.to_string(),
        status: response.status().as_u16(),
      });
    }

    let bytes = response.bytes().await.map_err(|e| FetchError::Network {
      url: url.to_string(),
      message: e.to_string(),
    })?;

    info!(url = %url, size = bytes.len(), "download complete");
    Ok(bytes)
  }

  fn transition(&self, from: FetchState, to: FetchState) {
    debug!(%from, %to, "fetch state");
  }
}
