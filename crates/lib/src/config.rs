//! Runtime configuration resolved from the environment.
//!
//! | Variable               | Default                         |
//! |------------------------|---------------------------------|
//! | `OTSPREP_ROOT`         | current directory               |
//! | `OTSPREP_DOWNLOAD_DIR` | `<root>/src`                    |
//! | `OTSPREP_BUILD_DIR`    | `<root>/build/meson`            |
//! | `OTSPREP_RELEASE_URL`  | the upstream GitHub release URL |
//! | `MESON_EXE`            | `meson`                         |
//! | `NINJA_EXE`            | `ninja`                         |

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::consts::{DEFAULT_RELEASE_URL, PRODUCT_NAME, VERSION_PLACEHOLDER};

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to determine current directory: {0}")]
  CurrentDir(#[source] std::io::Error),

  #[error("release URL template must contain {{version}}: {0}")]
  InvalidUrlTemplate(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
  pub root: PathBuf,
  /// Parent of the extracted `ots` directory.
  pub download_dir: PathBuf,
  pub build_dir: PathBuf,
  pub release_url: String,
  pub meson: String,
  pub ninja: String,
}

impl Config {
  /// Configuration rooted at `root` with every other value defaulted.
  pub fn with_root(root: impl Into<PathBuf>) -> Self {
    let root = root.into();
    Self {
      download_dir: root.join("src"),
      build_dir: root.join("build").join("meson"),
      release_url: DEFAULT_RELEASE_URL.to_string(),
      meson: "meson".to_string(),
      ninja: "ninja".to_string(),
      root,
    }
  }

  pub fn from_env() -> Result<Self, ConfigError> {
    let root = match env_path("OTSPREP_ROOT") {
      Some(root) => root,
      None => std::env::current_dir().map_err(ConfigError::CurrentDir)?,
    };

    let mut config = Self::with_root(root);
    if let Some(dir) = env_path("OTSPREP_DOWNLOAD_DIR") {
      config.download_dir = dir;
    }
    if let Some(dir) = env_path("OTSPREP_BUILD_DIR") {
      config.build_dir = dir;
    }
    if let Some(url) = env_string("OTSPREP_RELEASE_URL") {
      config.release_url = url;
    }
    if let Some(meson) = env_string("MESON_EXE") {
      config.meson = meson;
    }
    if let Some(ninja) = env_string("NINJA_EXE") {
      config.ninja = ninja;
    }

    config.validate()?;
    Ok(config)
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if !self.release_url.contains(VERSION_PLACEHOLDER) {
      return Err(ConfigError::InvalidUrlTemplate(self.release_url.clone()));
    }
    Ok(())
  }

  pub fn with_download_dir(mut self, dir: impl AsRef<Path>) -> Self {
    self.download_dir = self.root.join(dir);
    self
  }

  /// The extracted tree: `<download_dir>/ots`.
  pub fn source_dir(&self) -> PathBuf {
    self.download_dir.join(PRODUCT_NAME)
  }
}

fn env_string(key: &str) -> Option<String> {
  std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_path(key: &str) -> Option<PathBuf> {
  env_string(key).map(PathBuf::from)
}
