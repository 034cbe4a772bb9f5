//! Shared helpers for provisioning tests.

use std::path::{Path, PathBuf};

use httpmock::prelude::*;
use otsprep_lib::config::Config;
use otsprep_lib::integrity::hash_bytes;
use tempfile::TempDir;

use super::testutil::{TarFixture, read_log, write_script};

pub const MANIFEST: &str = r#"project('ots', 'c', 'cpp',
  default_options : ['cpp_std=c++11', 'default_library=static'],
)

libots = library('ots', ots_sources)

ots_sanitize = executable('ots-sanitize',
  'util/ots-sanitize.cc',
  link_with : libots,
)
"#;

const WOFF2_SOURCES: [&str; 5] = [
  "table_tags.cc",
  "variable_length.cc",
  "woff2_common.cc",
  "woff2_dec.cc",
  "woff2_out.cc",
];

/// Subproject versions bundled in a generated release.
pub struct Release {
  pub version: &'static str,
  pub brotli: &'static str,
  pub lz4: &'static str,
  pub woff2: &'static str,
}

impl Release {
  pub fn new(version: &'static str) -> Self {
    Self {
      version,
      brotli: "1.1.0",
      lz4: "1.9.4",
      woff2: "1.0.2",
    }
  }

  pub fn url_path(&self) -> String {
    format!("/v{0}/ots-{0}.tar.xz", self.version)
  }

  /// A complete `ots-<version>.tar.xz` with every header and source
  /// the link set refers to.
  pub async fn archive(&self) -> Vec<u8> {
    let root = format!("ots-{}", self.version);
    let sub = format!("{}/subprojects", root);
    let mut fixture = TarFixture::new()
      .dir(&format!("{}/", root))
      .file(&format!("{}/meson.build", root), MANIFEST)
      .file(&format!("{}/include/opentype-sanitiser.h", root), "")
      .dir(&format!("{}/brotli-{}/c/include/", sub, self.brotli))
      .dir(&format!("{}/lz4-{}/lib/", sub, self.lz4))
      .dir(&format!("{}/woff2-{}/include/", sub, self.woff2));
    for source in WOFF2_SOURCES {
      fixture = fixture.file(&format!("{}/woff2-{}/src/{}", sub, self.woff2, source), "");
    }
    fixture.xz().await
  }

  /// Serve the archive and return its digest.
  pub async fn serve<'a>(&self, server: &'a MockServer) -> (httpmock::Mock<'a>, String) {
    let archive = self.archive().await;
    let digest = hash_bytes(&archive).0;
    let mock = server
      .mock_async(|when, then| {
        when.method(GET).path(self.url_path());
        then.status(200).body(archive);
      })
      .await;
    (mock, digest)
  }
}

/// Isolated project root with stub `meson` and `ninja`.
///
/// The meson stub mirrors the vendored subprojects into the build dir and
/// writes `build.ninja`. The ninja stub produces every static library and
/// then exits with the configured code. Both append to `tools.log`.
pub struct TestEnv {
  pub temp: TempDir,
  pub config: Config,
}

impl TestEnv {
  pub fn new(server: &MockServer, ninja_exit: i32) -> Self {
    let temp = TempDir::new().unwrap();
    let mut config = Config::with_root(temp.path());
    config.release_url = server.url("/v{version}/ots-{version}.tar.xz");
    config.meson = temp.path().join("bin/meson").display().to_string();
    config.ninja = temp.path().join("bin/ninja").display().to_string();

    let env = Self { temp, config };
    env.install_tools(ninja_exit);
    env
  }

  pub fn root(&self) -> &Path {
    self.temp.path()
  }

  pub fn log_path(&self) -> PathBuf {
    self.root().join("tools.log")
  }

  pub fn tool_log(&self) -> Vec<String> {
    read_log(&self.log_path())
  }

  fn install_tools(&self, ninja_exit: i32) {
    let log = self.log_path();
    let build = &self.config.build_dir;
    let source = self.config.source_dir();

    write_script(
      &self.root().join("bin/meson"),
      &format!(
        r#"echo "meson $*" >> '{log}'
mkdir -p '{build}/subprojects'
for d in '{source}'/subprojects/*/; do mkdir -p "{build}/subprojects/$(basename "$d")"; done
touch '{build}/build.ninja'"#,
        log = log.display(),
        build = build.display(),
        source = source.display(),
      ),
    );

    write_script(
      &self.root().join("bin/ninja"),
      &format!(
        r#"echo "ninja $*" >> '{log}'
touch '{build}/libots.a'
for d in '{build}'/subprojects/brotli-*; do touch "$d/libbrotli_decoder.a" "$d/libbrotli_common.a"; done
for d in '{build}'/subprojects/lz4-*; do mkdir -p "$d/contrib/meson/meson/lib"; touch "$d/contrib/meson/meson/lib/liblz4.a"; done
exit {ninja_exit}"#,
        log = log.display(),
        build = build.display(),
      ),
    );
  }
}
