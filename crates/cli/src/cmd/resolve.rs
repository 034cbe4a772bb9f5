//! Implementation of the `otsprep resolve` command.

use anyhow::{Context, Result};

use crate::output::{self, OutputFormat};

/// Execute the resolve command.
///
/// Prints the libraries in link order followed by include directories and
/// vendored sources.
///
/// # Errors
///
/// Returns an error if a required subproject is missing, or with `check`,
/// if any resolved path does not exist.
pub fn cmd_resolve(check: bool, format: OutputFormat) -> Result<()> {
  let mut pipeline = super::pipeline()?;
  let set = pipeline.resolve(check).context("Failed to resolve build artifacts")?;
  output::link_set(set, format)
}
