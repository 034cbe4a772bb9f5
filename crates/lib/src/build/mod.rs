//! Configure and compile the source tree with meson and ninja.
//!
//! - `configure`: `meson setup` into a fixed build directory, skipped when
//!   the directory already holds `build.ninja` unless forced
//! - `build`: optional `ninja -t clean`, then `ninja` for the given targets
//!
//! Failures are never retried; the tool's exit code is carried in
//! [`BuildError::ToolFailed`].

mod cmd;
mod toolchain;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::consts::CONFIGURED_MARKER;

pub use cmd::run_tool;
pub use toolchain::Toolchain;

#[derive(Debug, Error)]
pub enum BuildError {
  #[error("{name} executable not found: '{path}'")]
  ToolNotFound { name: &'static str, path: String },

  #[error("failed to start {tool}: {source}")]
  Spawn {
    tool: &'static str,
    #[source]
    source: std::io::Error,
  },

  #[error("{tool} {}", exit_status(.code))]
  ToolFailed { tool: &'static str, code: Option<i32> },
}

fn exit_status(code: &Option<i32>) -> String {
  match code {
    Some(code) => format!("failed with exit code {code}"),
    None => "was terminated by a signal".to_string(),
  }
}

impl BuildError {
  /// The external tool's exit code, if it ran and exited normally.
  pub fn exit_code(&self) -> Option<i32> {
    match self {
      BuildError::ToolFailed { code, .. } => *code,
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigureOutcome {
  Configured,
  Reconfigured,
  AlreadyConfigured,
}

/// Drives meson and ninja against one source/build directory pair.
#[derive(Debug, Clone)]
pub struct BuildOrchestrator {
  toolchain: Toolchain,
  source_dir: PathBuf,
  build_dir: PathBuf,
}

impl BuildOrchestrator {
  pub fn new(toolchain: Toolchain, source_dir: impl Into<PathBuf>, build_dir: impl Into<PathBuf>) -> Self {
    Self {
      toolchain,
      source_dir: source_dir.into(),
      build_dir: build_dir.into(),
    }
  }

  pub fn source_dir(&self) -> &Path {
    &self.source_dir
  }

  pub fn build_dir(&self) -> &Path {
    &self.build_dir
  }

  pub fn is_configured(&self) -> bool {
    self.build_dir.join(CONFIGURED_MARKER).exists()
  }

  fn setup_args(&self, reconfigure: bool) -> Vec<OsString> {
    let mut args: Vec<OsString> = [
      "setup",
      "--backend=ninja",
      "--buildtype=release",
      "--strip",
      "-Ddebug=true",
    ]
    .into_iter()
    .map(OsString::from)
    .collect();
    if reconfigure {
      args.push("--reconfigure".into());
    }
    args.push(self.build_dir.clone().into());
    args.push(self.source_dir.clone().into());
    args
  }

  fn ninja_args(&self, pre: &[&str], targets: &[String]) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-C".into(), self.build_dir.clone().into()];
    args.extend(pre.iter().map(OsString::from));
    args.extend(targets.iter().map(OsString::from));
    args
  }

  /// Run `meson setup` if needed.
  ///
  /// Unconfigured: configure. Configured and `force`: reconfigure.
  /// Configured otherwise: no external invocation.
  pub async fn configure(&self, force: bool) -> Result<ConfigureOutcome, BuildError> {
    let outcome = if !self.is_configured() {
      run_tool("meson", &self.toolchain.meson, &self.setup_args(false)).await?;
      ConfigureOutcome::Configured
    } else if force {
      run_tool("meson", &self.toolchain.meson, &self.setup_args(true)).await?;
      ConfigureOutcome::Reconfigured
    } else {
      info!(build_dir = %self.build_dir.display(), "already configured");
      ConfigureOutcome::AlreadyConfigured
    };
    Ok(outcome)
  }

  /// Build `targets` (all targets when empty), cleaning them first if asked.
  pub async fn build(&self, targets: &[String], clean: bool) -> Result<(), BuildError> {
    if clean {
      run_tool("ninja", &self.toolchain.ninja, &self.ninja_args(&["-t", "clean"], targets)).await?;
    }
    run_tool("ninja", &self.toolchain.ninja, &self.ninja_args(&[], targets)).await
  }
}
