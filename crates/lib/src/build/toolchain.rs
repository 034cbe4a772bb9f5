//! Discovery of the `meson` and `ninja` executables.

use std::path::PathBuf;

use tracing::debug;

use super::BuildError;
use crate::config::Config;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
  pub meson: PathBuf,
  pub ninja: PathBuf,
}

impl Toolchain {
  /// Resolve both tools, failing on the first one that cannot be found.
  ///
  /// Bare names are searched on `PATH`; anything with a separator is taken
  /// as a path.
  pub fn locate(meson: &str, ninja: &str) -> Result<Self, BuildError> {
    let toolchain = Self {
      meson: find("meson", meson)?,
      ninja: find("ninja", ninja)?,
    };
    debug!(meson = %toolchain.meson.display(), ninja = %toolchain.ninja.display(), "located toolchain");
    Ok(toolchain)
  }

  pub fn from_config(config: &Config) -> Result<Self, BuildError> {
    Self::locate(&config.meson, &config.ninja)
  }
}

fn find(name: &'static str, program: &str) -> Result<PathBuf, BuildError> {
  which::which(program).map_err(|_| BuildError::ToolNotFound {
    name,
    path: program.to_string(),
  })
}
