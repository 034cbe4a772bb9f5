//! Terminal rendering for provisioning results.
//!
//! Text mode prints one status line per step followed by indented
//! `label: value` fields. JSON mode prints a single pretty document on
//! stdout. Problems always go to stderr.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::ValueEnum;
use otsprep_lib::resolve::LinkSet;
use owo_colors::{OwoColorize, Stream};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

/// Outcome of one provisioning step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
  /// The step ran and produced its result.
  Done,
  /// Nothing to do, the previous result was reused or the step was simulated.
  Skipped,
  Warning,
  Failed,
}

impl Status {
  fn symbol(self) -> &'static str {
    match self {
      Status::Done => "✓",
      Status::Skipped => "•",
      Status::Warning => "⚠",
      Status::Failed => "✗",
    }
  }

  fn stream(self) -> Stream {
    match self {
      Status::Done | Status::Skipped => Stream::Stdout,
      Status::Warning | Status::Failed => Stream::Stderr,
    }
  }
}

/// Print a status line: symbol, then message.
pub fn status(status: Status, message: &str) {
  let stream = status.stream();
  let symbol = status.symbol();
  let line = match status {
    Status::Done => format!("{} {}", symbol.if_supports_color(stream, |s| s.green()), message),
    Status::Skipped => format!("{} {}", symbol.if_supports_color(stream, |s| s.blue()), message),
    Status::Warning => format!(
      "{} {}",
      symbol.if_supports_color(stream, |s| s.yellow()),
      message.if_supports_color(stream, |s| s.yellow())
    ),
    Status::Failed => format!(
      "{} {}",
      symbol.if_supports_color(stream, |s| s.red()),
      message.if_supports_color(stream, |s| s.red())
    ),
  };
  match stream {
    Stream::Stderr => eprintln!("{line}"),
    _ => println!("{line}"),
  }
}

/// An indented `label: value` line under the last status line.
pub fn field(label: &str, value: impl std::fmt::Display) {
  println!("  {}: {}", label.if_supports_color(Stream::Stdout, |s| s.dimmed()), value);
}

/// The first 12 hex digits of a SHA-256 digest.
pub fn short_digest(digest: &str) -> &str {
  digest.get(..12).unwrap_or(digest)
}

/// Time since `start`, e.g. `850ms`, `12.40s` or `3m 5s`.
pub fn elapsed(start: Instant) -> String {
  format_duration(start.elapsed())
}

fn format_duration(duration: Duration) -> String {
  let secs = duration.as_secs();
  let millis = duration.subsec_millis();

  if secs >= 60 {
    format!("{}m {}s", secs / 60, secs % 60)
  } else if secs > 0 {
    format!("{}.{:02}s", secs, millis / 10)
  } else {
    format!("{}ms", millis)
  }
}

/// Render a [`LinkSet`] as three titled sections. Paths missing on disk
/// are flagged inline and repeated as warnings on stderr.
pub fn link_set(set: &LinkSet, format: OutputFormat) -> anyhow::Result<()> {
  if format.is_json() {
    return print_json(set);
  }

  section("Libraries (link order)", &set.libraries);
  section("Include directories", &set.include_dirs);
  section("Sources", &set.sources);

  for path in set.missing_paths() {
    status(Status::Warning, &format!("missing: {}", path.display()));
  }
  Ok(())
}

fn section(title: &str, paths: &[impl AsRef<Path>]) {
  println!(
    "{} ({})",
    title.if_supports_color(Stream::Stdout, |s| s.bold()),
    paths.len()
  );
  for path in paths {
    let path = path.as_ref();
    if path.exists() {
      println!("  → {}", path.display());
    } else {
      println!(
        "  → {} {}",
        path.display(),
        "(missing)".if_supports_color(Stream::Stdout, |s| s.red())
      );
    }
  }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}
