use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};

use packforge_lib::clean::{CleanOptions, clean_workspace};
use packforge_lib::project::Project;

use crate::output::{OutputFormat, Status, format_elapsed, format_size, print_field, print_json, print_status};

pub fn cmd_clean(project_dir: &Path, dry_run: bool, force: bool, output: OutputFormat) -> Result<()> {
  let start = Instant::now();
  let project = Project::open(project_dir).context("Failed to open project")?;

  let result = clean_workspace(&project.workspace, CleanOptions { dry_run, force }).context("Clean failed")?;

  if output.is_json() {
    return print_json(&result);
  }

  println!();
  if dry_run {
    print_status(Status::Info, "Dry run - no changes made");
  } else {
    print_status(Status::Success, "Clean complete!");
  }
  for removed in &result.removed_paths {
    print_field(if dry_run { "Would remove" } else { "Removed" }, removed.display());
  }
  print_field("Directories", result.stats.dirs_removed);
  print_field("Space freed", format_size(result.stats.bytes_freed));
  print_field("Duration", format_elapsed(start.elapsed()));
  for kept in &result.kept_paths {
    let message = format!(
      "Kept {} because it still holds files from an interrupted export. Use --force to remove it.",
      kept.display()
    );
    print_status(Status::Warning, &message);
  }

  Ok(())
}
