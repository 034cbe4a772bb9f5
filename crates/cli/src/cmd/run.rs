//! Implementation of the `otsprep run` command.
//!
//! Runs download, build and resolve in sequence, stopping at the first
//! failure.

use std::time::Instant;

use anyhow::{Context, Result};

use otsprep_lib::pipeline::PipelineOptions;

use super::build::outcome_label;
use crate::output::{self, OutputFormat, Status, elapsed, field, print_json, status};

pub fn cmd_run(
  version: &str,
  sha256: &str,
  clean: bool,
  force: bool,
  targets: Vec<String>,
  format: OutputFormat,
) -> Result<()> {
  let start = Instant::now();
  let pipeline = super::pipeline()?;
  let release = pipeline.release(version, sha256)?;
  let options = PipelineOptions { clean, force, targets };

  let rt = super::runtime()?;
  let ctx = rt.block_on(pipeline.run(release, &options)).context("Provisioning failed")?;

  let link_set = ctx.link_set.unwrap_or_default();
  if format.is_json() {
    return print_json(&serde_json::json!({
      "version": version,
      "source_dir": ctx.source.as_ref().map(|s| s.root()),
      "build_dir": ctx.config.build_dir,
      "configure": ctx.configured.map(outcome_label),
      "link_set": link_set,
    }));
  }

  status(Status::Done, &format!("OTS {} provisioned", version));
  if let Some(outcome) = ctx.configured {
    field("Configure", outcome_label(outcome));
  }
  field("Time", elapsed(start));
  println!();
  output::link_set(&link_set, format)
}
