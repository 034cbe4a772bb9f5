//! Test utilities for otsprep-lib.
//!
//! Builders for in-memory release archives and stub `meson`/`ninja`
//! executables.

use std::path::Path;

use async_compression::tokio::bufread::XzEncoder;
use tokio::io::AsyncReadExt;

/// An abbreviated upstream `meson.build` with both patch anchors present.
pub const SAMPLE_MANIFEST: &str = r#"project('ots', 'c', 'cpp',
  version : '9.2.0',
  license : 'BSD-3-Clause',
  default_options : ['cpp_std=c++11', 'default_library=static'],
  meson_version : '>= 0.55.2',
)

libots = library('ots',
  ots_sources,
  include_directories : ots_include_dir,
  dependencies : ots_deps,
)

ots_sanitize = executable('ots-sanitize',
  'util/ots-sanitize.cc', 'util/test-context.h',
  dependencies : ots_deps,
  link_with : libots,
  install : true,
)

ots_idempotent = executable('ots-idempotent',
  'util/ots-idempotent.cc',
  link_with : libots,
)
"#;

/// Builds an uncompressed tar archive entry by entry, in order.
pub struct TarFixture {
  builder: tar::Builder<Vec<u8>>,
}

impl TarFixture {
  pub fn new() -> Self {
    Self {
      builder: tar::Builder::new(Vec::new()),
    }
  }

  pub fn dir(mut self, path: &str) -> Self {
    let mut header = tar::Header::new_gnu();
    header.set_entry_type(tar::EntryType::Directory);
    header.set_mode(0o755);
    header.set_size(0);
    self.builder.append_data(&mut header, path, std::io::empty()).unwrap();
    self
  }

  pub fn file(mut self, path: &str, contents: &str) -> Self {
    let mut header = tar::Header::new_gnu();
    header.set_entry_type(tar::EntryType::Regular);
    header.set_mode(0o644);
    header.set_size(contents.len() as u64);
    self.builder.append_data(&mut header, path, contents.as_bytes()).unwrap();
    self
  }

  pub fn symlink(self, path: &str, target: &Path) -> Self {
    self.link(tar::EntryType::Symlink, path, target)
  }

  pub fn hard_link(self, path: &str, target: &Path) -> Self {
    self.link(tar::EntryType::Link, path, target)
  }

  fn link(mut self, kind: tar::EntryType, path: &str, target: &Path) -> Self {
    let mut header = tar::Header::new_gnu();
    header.set_entry_type(kind);
    header.set_mode(0o777);
    header.set_size(0);
    header.set_link_name(target).unwrap();
    self.builder.append_data(&mut header, path, std::io::empty()).unwrap();
    self
  }

  /// A regular file whose name is written into the header verbatim,
  /// bypassing the builder's path validation (which refuses `..`).
  pub fn raw_file(mut self, path: &str, contents: &str) -> Self {
    let mut header = tar::Header::new_old();
    let name = &mut header.as_old_mut().name;
    name[..path.len()].copy_from_slice(path.as_bytes());
    header.set_entry_type(tar::EntryType::Regular);
    header.set_mode(0o644);
    header.set_size(contents.len() as u64);
    header.set_cksum();
    self.builder.append(&header, contents.as_bytes()).unwrap();
    self
  }

  pub fn into_tar(self) -> Vec<u8> {
    self.builder.into_inner().unwrap()
  }

  pub async fn xz(self) -> Vec<u8> {
    xz_compress(&self.into_tar()).await
  }
}

/// A minimal release archive for `version` containing the sample manifest
/// and the three vendored subprojects.
pub fn release_fixture(version: &str) -> TarFixture {
  let root = format!("ots-{}", version);
  TarFixture::new()
    .dir(&format!("{}/", root))
    .file(&format!("{}/meson.build", root), SAMPLE_MANIFEST)
    .file(&format!("{}/include/opentype-sanitiser.h", root), "#pragma once\n")
    .dir(&format!("{}/subprojects/brotli-1.1.0/c/include/", root))
    .dir(&format!("{}/subprojects/lz4-1.9.4/lib/", root))
    .dir(&format!("{}/subprojects/woff2-1.0.2/include/", root))
    .file(&format!("{}/subprojects/woff2-1.0.2/src/woff2_dec.cc", root), "")
}

pub async fn xz_compress(data: &[u8]) -> Vec<u8> {
  let mut encoder = XzEncoder::new(data);
  let mut out = Vec::new();
  encoder.read_to_end(&mut out).await.unwrap();
  out
}

/// Write an executable shell script.
#[cfg(unix)]
pub fn write_script(path: &Path, body: &str) {
  use std::os::unix::fs::PermissionsExt;

  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).unwrap();
  }
  std::fs::write(path, format!("#!/bin/sh\n{}\n", body)).unwrap();
  std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

/// Lines appended to a stub tool's invocation log.
pub fn read_log(path: &Path) -> Vec<String> {
  std::fs::read_to_string(path)
    .map(|s| s.lines().map(str::to_string).collect())
    .unwrap_or_default()
}
