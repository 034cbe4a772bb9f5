//! Implementation of the `otsprep download` command.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};

use otsprep_lib::config::Config;
use otsprep_lib::manifest::{PatchOptions, PatchPolicy};
use otsprep_lib::pipeline::Pipeline;

use crate::output::{OutputFormat, Status, elapsed, field, print_json, short_digest, status};

pub struct DownloadArgs {
  pub version: String,
  pub sha256: String,
  pub download_dir: Option<PathBuf>,
  pub clean: bool,
  pub dry_run: bool,
  pub lenient: bool,
}

/// Execute the download command.
///
/// Reuses an existing source tree unless `clean` is set. With `dry_run`
/// nothing is downloaded or written.
///
/// # Errors
///
/// Returns an error if the arguments are invalid, the download or checksum
/// fails, or the archive cannot be unpacked and patched.
pub fn cmd_download(args: DownloadArgs, format: OutputFormat) -> Result<()> {
  let start = Instant::now();

  let mut config = Config::from_env().context("Failed to load configuration")?;
  if let Some(dir) = &args.download_dir {
    config = config.with_download_dir(dir);
  }

  let patch = PatchOptions {
    policy: if args.lenient {
      PatchPolicy::Lenient
    } else {
      PatchPolicy::Strict
    },
    ..PatchOptions::default()
  };
  let mut pipeline = Pipeline::new(config)?
    .with_patch_options(patch)
    .with_dry_run(args.dry_run);
  let release = pipeline.release(&args.version, &args.sha256)?;

  let rt = super::runtime()?;
  let tree = rt
    .block_on(pipeline.fetch(release.clone(), args.clean))
    .context("Download failed")?;

  if format.is_json() {
    return print_json(&serde_json::json!({
      "version": release.version(),
      "sha256": release.expected_digest(),
      "source_dir": tree.root(),
      "dry_run": args.dry_run,
    }));
  }

  if args.dry_run {
    status(Status::Skipped, &format!("Dry run - {} not downloaded", release.archive_name()));
  } else {
    status(Status::Done, &format!("{} ready", release.archive_name()));
  }
  field("Source", tree.root().display());
  field("SHA-256", short_digest(release.expected_digest()));
  field("Time", elapsed(start));
  Ok(())
}
