//! Terminal output for the packforge commands.
//!
//! Status lines go through [`print_status`]; export results are printed as
//! aligned fields and per-destination lines.

use std::fmt::Display;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

use packforge_lib::export::DestinationReport;

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

/// Kind of a one-line status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
  Success,
  Info,
  Warning,
  Error,
}

impl Status {
  fn symbol(self) -> &'static str {
    match self {
      Status::Success => "✓",
      Status::Info => "•",
      Status::Warning => "⚠",
      Status::Error => "✗",
    }
  }
}

/// Print a status line. Warnings and errors go to stderr.
pub fn print_status(status: Status, message: &str) {
  let symbol = status.symbol();
  match status {
    Status::Success => println!("{} {message}", symbol.if_supports_color(Stream::Stdout, |s| s.green())),
    Status::Info => println!("{} {message}", symbol.if_supports_color(Stream::Stdout, |s| s.blue())),
    Status::Warning => eprintln!(
      "{} {}",
      symbol.if_supports_color(Stream::Stderr, |s| s.yellow()),
      message.if_supports_color(Stream::Stderr, |s| s.yellow())
    ),
    Status::Error => eprintln!(
      "{} {}",
      symbol.if_supports_color(Stream::Stderr, |s| s.red()),
      message.if_supports_color(Stream::Stderr, |s| s.red())
    ),
  }
}

/// Print an indented `label: value` line, labels padded to one column.
pub fn print_field(label: &str, value: impl Display) {
  println!(
    "  {}  {}",
    format!("{label:<14}").if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

pub fn print_path(label: &str, path: &Path) {
  print_field(label, path.display());
}

/// Print where a pack ended up and how its files got there.
pub fn print_destination(label: &str, report: &DestinationReport) {
  let files = if report.files == 1 { "file" } else { "files" };
  print_field(
    label,
    format_args!(
      "{} ({} {files}, {})",
      report.path.display(),
      report.files,
      report.method().if_supports_color(Stream::Stdout, |s| s.cyan())
    ),
  );
}

/// Size with a binary unit, one decimal above bytes.
pub fn format_size(bytes: u64) -> String {
  const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
  if bytes < 1024 {
    return format!("{bytes} B");
  }
  let mut value = bytes as f64 / 1024.0;
  let mut unit = 0;
  while value >= 1024.0 && unit + 1 < UNITS.len() {
    value /= 1024.0;
    unit += 1;
  }
  format!("{value:.1} {}", UNITS[unit])
}

/// Elapsed time as milliseconds below one second, seconds otherwise.
pub fn format_elapsed(elapsed: Duration) -> String {
  if elapsed < Duration::from_secs(1) {
    format!("{}ms", elapsed.as_millis())
  } else {
    format!("{:.2}s", elapsed.as_secs_f64())
  }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{json}");
  Ok(())
}
