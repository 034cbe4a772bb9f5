//! Unpacking of `.tar.xz` release archives.
//!
//! Release tarballs contain a single root directory `ots-{version}/`. That
//! segment is stripped so the tree lands directly under the destination.

use std::io::Cursor;
use std::path::{Component, Path, PathBuf};

use async_compression::tokio::bufread::XzDecoder;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

use crate::consts::PRODUCT_NAME;

#[derive(Debug, Error)]
pub enum ExtractError {
  #[error("the downloaded archive is not recognized as a valid ots source tarball")]
  UnrecognizedArchive,

  #[error("failed to decompress archive: {0}")]
  Decompress(#[source] std::io::Error),

  #[error("archive member escapes the destination: {}", .0.display())]
  UnsafePath(PathBuf),

  #[error("failed to unpack {}: {source}", path.display())]
  Unpack {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("extraction task failed: {0}")]
  Task(String),
}

/// Decompress an xz stream fully into memory.
pub async fn decompress_xz(compressed: &[u8]) -> Result<Vec<u8>, ExtractError> {
  let mut decoder = XzDecoder::new(compressed);
  let mut out = Vec::new();
  decoder
    .read_to_end(&mut out)
    .await
    .map_err(ExtractError::Decompress)?;
  Ok(out)
}

/// Unpack a `.tar.xz` archive into `dest`, stripping the root directory.
///
/// The first member must be a directory whose name starts with the product
/// prefix. Members outside that root are skipped. Returns the number of
/// members written. Members written before a failure are left in place.
pub async fn extract(compressed: &[u8], dest: &Path) -> Result<usize, ExtractError> {
  let tar_bytes = decompress_xz(compressed).await?;
  debug!(size = tar_bytes.len(), "decompressed archive");

  let dest = dest.to_path_buf();
  tokio::task::spawn_blocking(move || unpack_stripped(&tar_bytes, &dest))
    .await
    .map_err(|e| ExtractError::Task(e.to_string()))?
}

/// Unpack an uncompressed tar buffer into `dest`, stripping the root directory.
pub fn unpack_stripped(tar_bytes: &[u8], dest: &Path) -> Result<usize, ExtractError> {
  let mut archive = tar::Archive::new(Cursor::new(tar_bytes));
  let mut entries = archive.entries()?;

  let root = match entries.next() {
    Some(first) => {
      let first = first?;
      let path = first.path()?.into_owned();
      let is_product_dir = first.header().entry_type().is_dir()
        && path
          .components()
          .next()
          .and_then(|c| c.as_os_str().to_str())
          .is_some_and(|name| name.starts_with(PRODUCT_NAME));
      if !is_product_dir {
        return Err(ExtractError::UnrecognizedArchive);
      }
      path
    }
    None => return Err(ExtractError::UnrecognizedArchive),
  };

  std::fs::create_dir_all(dest)?;

  let mut written = 0;
  for entry in entries {
    let mut entry = entry?;
    let path = entry.path()?.into_owned();

    let Ok(relative) = path.strip_prefix(&root) else {
      debug!(path = %path.display(), "skipping member outside archive root");
      continue;
    };
    if relative.as_os_str().is_empty() {
      continue;
    }
    if !relative.components().all(|c| matches!(c, Component::Normal(_)))
      || entry.header().entry_type().is_hard_link()
    {
      return Err(ExtractError::UnsafePath(path));
    }
    if crosses_symlink(dest, relative)? {
      return Err(ExtractError::UnsafePath(path));
    }

    let target = dest.join(relative);
    if let Some(parent) = target.parent() {
      std::fs::create_dir_all(parent)?;
    }
    entry.unpack(&target).map_err(|source| ExtractError::Unpack {
      path: target.clone(),
      source,
    })?;
    written += 1;
  }

  info!(root = %root.display(), dest = %dest.display(), members = written, "unpacked archive");
  Ok(written)
}

/// Whether `relative` under `dest` passes through, or lands on, a symlink
/// already on disk. Earlier members may have planted one.
fn crosses_symlink(dest: &Path, relative: &Path) -> Result<bool, ExtractError> {
  let mut current = dest.to_path_buf();
  for component in relative.components() {
    current.push(component);
    match std::fs::symlink_metadata(&current) {
      Ok(meta) if meta.file_type().is_symlink() => return Ok(true),
      Ok(_) => {}
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
      Err(e) => return Err(e.into()),
    }
  }
  Ok(false)
}
