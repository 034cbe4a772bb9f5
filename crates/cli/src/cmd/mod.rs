mod build;
mod download;
mod resolve;
mod run;

pub use build::cmd_build;
pub use download::{DownloadArgs, cmd_download};
pub use resolve::cmd_resolve;
pub use run::cmd_run;

use anyhow::{Context, Result};
use otsprep_lib::config::Config;
use otsprep_lib::pipeline::Pipeline;
use tracing::debug;

/// Build a pipeline from the environment.
fn pipeline() -> Result<Pipeline> {
  let config = Config::from_env().context("Failed to load configuration")?;
  debug!(
    root = %config.root.display(),
    source_dir = %config.source_dir().display(),
    build_dir = %config.build_dir.display(),
    "loaded configuration"
  );
  Ok(Pipeline::new(config)?)
}

fn runtime() -> Result<tokio::runtime::Runtime> {
  tokio::runtime::Runtime::new().context("Failed to create async runtime")
}
