//! Implementation of the `packforge init` command.

use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::{OwoColorize, Stream};

use packforge_lib::init::{InitOptions, init};

use crate::output::{OutputFormat, Status, print_field, print_json, print_path, print_status};

/// Scaffold a project in `path`.
///
/// # Errors
///
/// Returns an error if `config.json` already exists or on permission issues.
pub fn cmd_init(path: &Path, name: Option<String>, output: OutputFormat) -> Result<()> {
  let options = InitOptions {
    project_dir: path.to_path_buf(),
    name,
  };

  let result = init(&options).context("Failed to initialize project")?;

  if output.is_json() {
    return print_json(&result);
  }

  print_status(Status::Success, "Initialized packforge project!");
  println!();
  print_path("Project", &result.project_dir);
  print_path("Config", &result.config_file);
  for dir in &result.created_dirs {
    print_path("Sources", dir);
  }
  if result.gitignore_written {
    print_field("Ignore file", ".gitignore");
  }
  println!();
  println!("{}", "Next steps:".if_supports_color(Stream::Stdout, |s| s.bold()));
  println!("  1. Put your packs in packs/BP and packs/RP");
  println!(
    "  2. Run: {}",
    format!("packforge --project {} run", result.project_dir.display()).if_supports_color(Stream::Stdout, |s| s.cyan())
  );

  Ok(())
}
