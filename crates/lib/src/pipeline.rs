//! Sequential provisioning: fetch → configure → build → resolve.
//!
//! Each stage records its result in a [`BuildContext`] owned by the
//! [`Pipeline`], so later stages read what earlier ones produced instead
//! of rediscovering it. The first failing stage aborts the run.

use thiserror::Error;
use tracing::{info, warn};

use crate::build::{BuildError, BuildOrchestrator, ConfigureOutcome, Toolchain};
use crate::config::{Config, ConfigError};
use crate::fetch::{ArchiveFetcher, FetchError};
use crate::manifest::PatchOptions;
use crate::release::{ReleaseSpec, ReleaseSpecError};
use crate::resolve::{ArtifactResolver, LinkSet, ResolveError};
use crate::source::SourceTree;

#[derive(Debug, Error)]
pub enum PipelineError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error(transparent)]
  Release(#[from] ReleaseSpecError),

  #[error(transparent)]
  Fetch(#[from] FetchError),

  #[error(transparent)]
  Build(#[from] BuildError),

  #[error(transparent)]
  Resolve(#[from] ResolveError),

  #[error("source tree not found at {}; download it first", .0.display())]
  SourceMissing(std::path::PathBuf),
}

impl PipelineError {
  /// Process exit code: the external tool's own code when it failed,
  /// otherwise 1.
  pub fn exit_code(&self) -> i32 {
    match self {
      PipelineError::Build(err) => err.exit_code().unwrap_or(1),
      _ => 1,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineOptions {
  /// Remove and re-download the source tree.
  pub clean: bool,
  /// Reconfigure and clean-build.
  pub force: bool,
  /// Ninja targets; empty builds everything.
  pub targets: Vec<String>,
}

/// State accumulated across stages.
#[derive(Debug, Clone)]
pub struct BuildContext {
  pub config: Config,
  pub release: Option<ReleaseSpec>,
  pub source: Option<SourceTree>,
  pub configured: Option<ConfigureOutcome>,
  pub link_set: Option<LinkSet>,
}

impl BuildContext {
  pub fn new(config: Config) -> Self {
    Self {
      config,
      release: None,
      source: None,
      configured: None,
      link_set: None,
    }
  }

  /// The fetched tree, or the configured location if it already exists.
  fn source_tree(&self) -> Result<SourceTree, PipelineError> {
    if let Some(tree) = &self.source {
      return Ok(tree.clone());
    }
    let tree = SourceTree::new(self.config.source_dir());
    if !tree.exists() {
      return Err(PipelineError::SourceMissing(tree.root().to_path_buf()));
    }
    Ok(tree)
  }
}

pub struct Pipeline {
  ctx: BuildContext,
  fetcher: ArchiveFetcher,
}

impl Pipeline {
  pub fn new(config: Config) -> Result<Self, PipelineError> {
    config.validate()?;
    let fetcher = ArchiveFetcher::new(config.release_url.clone());
    Ok(Self {
      ctx: BuildContext::new(config),
      fetcher,
    })
  }

  pub fn with_patch_options(mut self, patch: PatchOptions) -> Self {
    self.fetcher = self.fetcher.with_patch_options(patch);
    self
  }

  pub fn with_dry_run(mut self, dry_run: bool) -> Self {
    self.fetcher = self.fetcher.with_dry_run(dry_run);
    self
  }

  pub fn context(&self) -> &BuildContext {
    &self.ctx
  }

  pub fn into_context(self) -> BuildContext {
    self.ctx
  }

  /// A [`ReleaseSpec`] rooted at the configured download directory.
  pub fn release(&self, version: &str, digest: &str) -> Result<ReleaseSpec, PipelineError> {
    Ok(ReleaseSpec::new(version, digest, &self.ctx.config.download_dir)?)
  }

  pub async fn fetch(&mut self, release: ReleaseSpec, clean: bool) -> Result<&SourceTree, PipelineError> {
    let tree = self.fetcher.fetch(&release, clean).await?;
    self.ctx.release = Some(release);
    Ok(self.ctx.source.insert(tree))
  }

  /// Locate the toolchain and bind it to the source and build directories.
  pub fn orchestrator(&self) -> Result<BuildOrchestrator, PipelineError> {
    let source = self.ctx.source_tree()?;
    let toolchain = Toolchain::from_config(&self.ctx.config)?;
    Ok(BuildOrchestrator::new(
      toolchain,
      source.root(),
      self.ctx.config.build_dir.clone(),
    ))
  }

  /// Configure (reconfiguring when `force`), then build `targets`,
  /// cleaning them first when `force`.
  pub async fn build(&mut self, force: bool, targets: &[String]) -> Result<ConfigureOutcome, PipelineError> {
    let orchestrator = self.orchestrator()?;
    let outcome = orchestrator.configure(force).await?;
    self.ctx.configured = Some(outcome);
    orchestrator.build(targets, force).await?;
    Ok(outcome)
  }

  /// Compute the link set. With `check`, every listed path must exist.
  pub fn resolve(&mut self, check: bool) -> Result<&LinkSet, PipelineError> {
    let source = self.ctx.source_tree()?;
    let build_dir = &self.ctx.config.build_dir;
    let set = if check {
      ArtifactResolver::resolve_checked(build_dir, source.root())?
    } else {
      ArtifactResolver::resolve(build_dir, source.root())?
    };
    Ok(self.ctx.link_set.insert(set))
  }

  /// Run every stage in order.
  pub async fn run(mut self, release: ReleaseSpec, options: &PipelineOptions) -> Result<BuildContext, PipelineError> {
    info!(version = release.version(), "provisioning");
    self.fetch(release, options.clean).await?;
    self.build(options.force, &options.targets).await?;

    let missing: Vec<String> = self
      .resolve(false)?
      .missing_paths()
      .iter()
      .map(|p| p.display().to_string())
      .collect();
    for path in &missing {
      warn!(path = %path, "resolved path does not exist");
    }

    Ok(self.into_context())
  }
}
