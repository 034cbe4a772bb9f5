//! External tool invocation.
//!
//! Tools run with the parent's environment unmodified, since meson and
//! ninja are configured through environment variables (`CC`, `CFLAGS`,
//! `PKG_CONFIG_PATH`, ...). Output streams are inherited so the operator
//! sees compiler diagnostics directly.

use std::ffi::OsString;
use std::path::Path;

use tokio::process::Command;
use tracing::{debug, info};

use super::BuildError;

/// Run `program` with `args` to completion.
///
/// # Arguments
///
/// * `tool` - Short name used in logs and errors (e.g. "meson")
/// * `program` - Resolved path to the executable
/// * `args` - Arguments passed verbatim
///
/// # Errors
///
/// [`BuildError::Spawn`] if the process cannot start and
/// [`BuildError::ToolFailed`] carrying the exit code if it exits non-zero.
pub async fn run_tool(tool: &'static str, program: &Path, args: &[OsString]) -> Result<(), BuildError> {
  info!(tool, program = %program.display(), args = ?args, "running");

  let status = Command::new(program)
    .args(args)
    .status()
    .await
    .map_err(|source| BuildError::Spawn { tool, source })?;

  if !status.success() {
    return Err(BuildError::ToolFailed {
      tool,
      code: status.code(),
    });
  }

  debug!(tool, "finished");
  Ok(())
}
