//! Local adjustments to the upstream `meson.build`.
//!
//! Two textual rewrites are applied:
//! - extra entries appended to the project's `default_options : [...]` list
//!   (position independent static libraries by default)
//! - removal of an optional executable target and everything after it
//!
//! These are pattern substitutions, not a parse of the meson language. What
//! happens when an anchor is missing is controlled by [`PatchPolicy`].
//! Patching always starts from `meson.build.orig`, so it can be repeated.

use std::fmt;
use std::path::PathBuf;

use regex::{Captures, Regex};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::source::SourceTree;

/// What to do when a rewrite's anchor does not occur in the manifest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PatchPolicy {
  /// Fail with [`PatchError::AnchorNotFound`].
  #[default]
  Strict,
  /// Log a warning and leave the text unchanged for that rewrite.
  Lenient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rewrite {
  DefaultOptions,
  StripTarget,
}

impl fmt::Display for Rewrite {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Rewrite::DefaultOptions => write!(f, "default_options"),
      Rewrite::StripTarget => write!(f, "strip-target"),
    }
  }
}

#[derive(Debug, Error)]
pub enum PatchError {
  #[error("manifest rewrite '{rewrite}' found no match for anchor `{anchor}`")]
  AnchorNotFound { rewrite: Rewrite, anchor: String },

  #[error("invalid rewrite pattern: {0}")]
  Pattern(#[from] regex::Error),

  #[error("failed to access manifest {}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOptions {
  /// Entries appended to `default_options`, without quotes.
  pub extra_default_options: Vec<String>,
  /// Name of the executable target to remove, along with what follows it.
  pub strip_from_target: Option<String>,
  pub policy: PatchPolicy,
}

impl Default for PatchOptions {
  fn default() -> Self {
    Self {
      extra_default_options: vec!["b_staticpic=True".to_string()],
      strip_from_target: Some("ots-sanitize".to_string()),
      policy: PatchPolicy::Strict,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOutcome {
  pub text: String,
  pub applied: Vec<Rewrite>,
  /// Rewrites whose anchors were missing under [`PatchPolicy::Lenient`].
  pub skipped: Vec<Rewrite>,
}

/// Apply the configured rewrites to manifest text.
pub fn patch(text: &str, options: &PatchOptions) -> Result<PatchOutcome, PatchError> {
  let mut outcome = PatchOutcome {
    text: text.to_string(),
    applied: Vec::new(),
    skipped: Vec::new(),
  };

  if !options.extra_default_options.is_empty() {
    let re = Regex::new(r"default_options\s*:\s*\[(.*)\],")?;
    let found = re.is_match(&outcome.text);
    if found {
      outcome.text = re
        .replacen(&outcome.text, 1, |caps: &Captures| {
          extend_options(&caps[1], &options.extra_default_options)
        })
        .into_owned();
    }
    record(&mut outcome, Rewrite::DefaultOptions, found, re.as_str(), options.policy)?;
  }

  if let Some(target) = &options.strip_from_target {
    let pattern = format!(r"(?s)\w+\s*=\s*executable\(\s*'{}'\s*,.*", regex::escape(target));
    let re = Regex::new(&pattern)?;
    let found = re.is_match(&outcome.text);
    if found {
      outcome.text = re.replacen(&outcome.text, 1, "").into_owned();
    }
    record(&mut outcome, Rewrite::StripTarget, found, &pattern, options.policy)?;
  }

  Ok(outcome)
}

fn record(
  outcome: &mut PatchOutcome,
  rewrite: Rewrite,
  found: bool,
  anchor: &str,
  policy: PatchPolicy,
) -> Result<(), PatchError> {
  match (found, policy) {
    (true, _) => {
      debug!(%rewrite, "applied manifest rewrite");
      outcome.applied.push(rewrite);
      Ok(())
    }
    (false, PatchPolicy::Lenient) => {
      warn!(%rewrite, anchor, "manifest anchor not found, leaving text unchanged");
      outcome.skipped.push(rewrite);
      Ok(())
    }
    (false, PatchPolicy::Strict) => Err(PatchError::AnchorNotFound {
      rewrite,
      anchor: anchor.to_string(),
    }),
  }
}

/// Render `default_options : [<existing>, 'extra', ...],`, skipping extras
/// already present.
fn extend_options(existing: &str, extras: &[String]) -> String {
  let mut items: Vec<String> = Vec::new();
  let existing = existing.trim();
  if !existing.is_empty() {
    items.push(existing.to_string());
  }
  for extra in extras {
    let quoted = format!("'{}'", extra);
    if !existing.contains(&quoted) {
      items.push(quoted);
    }
  }
  format!("default_options : [{}],", items.join(", "))
}

/// Patch `meson.build` in a source tree from its preserved original.
///
/// The first call copies `meson.build` to `meson.build.orig`. Every call
/// reads the original and overwrites `meson.build` with the patched text.
pub fn patch_file(tree: &SourceTree, options: &PatchOptions) -> Result<PatchOutcome, PatchError> {
  let manifest = tree.manifest_path();
  let original = tree.original_manifest_path();

  if !original.exists() {
    std::fs::copy(&manifest, &original).map_err(|source| PatchError::Io {
      path: manifest.clone(),
      source,
    })?;
    debug!(path = %original.display(), "backed up original manifest");
  }

  let text = std::fs::read_to_string(&original).map_err(|source| PatchError::Io {
    path: original.clone(),
    source,
  })?;
  let outcome = patch(&text, options)?;

  std::fs::write(&manifest, &outcome.text).map_err(|source| PatchError::Io {
    path: manifest.clone(),
    source,
  })?;

  info!(path = %manifest.display(), applied = ?outcome.applied, skipped = ?outcome.skipped, "wrote custom manifest");
  Ok(outcome)
}
