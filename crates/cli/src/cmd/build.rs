//! Implementation of the `otsprep build` command.

use std::time::Instant;

use anyhow::{Context, Result};

use otsprep_lib::build::ConfigureOutcome;

use crate::output::{OutputFormat, Status, elapsed, field, print_json, status};

pub(super) fn outcome_label(outcome: ConfigureOutcome) -> &'static str {
  match outcome {
    ConfigureOutcome::Configured => "configured",
    ConfigureOutcome::Reconfigured => "reconfigured",
    ConfigureOutcome::AlreadyConfigured => "already configured",
  }
}

/// Execute the build command.
///
/// `force` reconfigures the build directory and cleans the targets before
/// building them.
///
/// # Errors
///
/// Returns an error if the source tree is missing, a tool cannot be found,
/// or meson or ninja fail.
pub fn cmd_build(force: bool, targets: Vec<String>, format: OutputFormat) -> Result<()> {
  let start = Instant::now();
  let mut pipeline = super::pipeline()?;

  let rt = super::runtime()?;
  let outcome = rt.block_on(pipeline.build(force, &targets)).context("Build failed")?;
  let build_dir = pipeline.context().config.build_dir.clone();

  if format.is_json() {
    return print_json(&serde_json::json!({
      "build_dir": build_dir,
      "configure": outcome_label(outcome),
      "targets": targets,
    }));
  }

  if outcome == ConfigureOutcome::AlreadyConfigured {
    status(Status::Skipped, &format!("{} already configured", build_dir.display()));
  }
  status(Status::Done, "Build complete");
  field("Build dir", build_dir.display());
  if !targets.is_empty() {
    field("Targets", targets.join(", "));
  }
  field("Time", elapsed(start));
  Ok(())
}
