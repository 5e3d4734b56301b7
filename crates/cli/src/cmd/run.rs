//! Implementation of the `packforge run` command.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::debug;

use packforge_lib::pipeline::run_profile;
use packforge_lib::platform::PlatformContentLocator;
use packforge_lib::project::Project;

use crate::output::{
  OutputFormat, Status, format_elapsed, print_destination, print_field, print_json, print_status,
};

pub fn cmd_run(project_dir: &Path, profile: &str, output: OutputFormat) -> Result<()> {
  let start = Instant::now();
  let project = Project::open(project_dir).context("Failed to open project")?;
  debug!(root = %project.root.display(), workspace = %project.workspace.dir().display(), "opened project");

  let report = run_profile(&project, profile, &PlatformContentLocator)
    .with_context(|| format!("Profile \"{profile}\" failed"))?;

  if output.is_json() {
    return print_json(&report);
  }

  println!();
  print_status(Status::Success, &format!("Exported profile \"{}\"", report.profile));
  let ran = report.steps.iter().filter(|s| !s.skipped).count();
  print_field("Steps run", format_args!("{ran} of {}", report.steps.len()));
  print_field("Target", &report.export.target);
  print_destination("Behavior pack", &report.export.behavior_pack);
  print_destination("Resource pack", &report.export.resource_pack);
  if let Some(data) = &report.export.data {
    print_destination("Data", data);
  }
  if report.export.read_only_files > 0 {
    print_field("Read-only", report.export.read_only_files);
  }
  print_field("Duration", format_elapsed(start.elapsed()));

  Ok(())
}
