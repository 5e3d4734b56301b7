//! Implementation of the `packforge check` command.
//!
//! Runs the same deletion-safety check an export runs, without building or
//! touching anything.

use std::path::Path;

use anyhow::{Context, Result};

use packforge_lib::export::{ExportPaths, check_export};
use packforge_lib::pipeline::export_request;
use packforge_lib::platform::PlatformContentLocator;
use packforge_lib::project::Project;

use crate::output::{OutputFormat, Status, print_json, print_path, print_status};

pub fn cmd_check(project_dir: &Path, profile: &str, output: OutputFormat) -> Result<()> {
  let project = Project::open(project_dir).context("Failed to open project")?;
  let profile_config = project.config.profile(profile)?;
  let request = export_request(&project, profile_config);

  let backup = request.backup_dir.clone();
  let paths: ExportPaths = check_export(&request, &PlatformContentLocator)
    .with_context(|| format!("Profile \"{profile}\" cannot be exported safely"))?;
  let backup_left = backup.exists();

  if output.is_json() {
    return print_json(&serde_json::json!({
      "profile": profile,
      "safe": true,
      "bp": paths.bp,
      "rp": paths.rp,
      "backup_left": backup_left,
    }));
  }

  print_status(Status::Success, &format!("Profile \"{profile}\" can be exported safely"));
  print_path("Behavior pack", &paths.bp);
  print_path("Resource pack", &paths.rp);
  if backup_left {
    let message = format!(
      "A backup directory from an interrupted export exists at {}. Inspect it, then run `packforge clean --force`.",
      backup.display()
    );
    print_status(Status::Warning, &message);
  }

  Ok(())
}
