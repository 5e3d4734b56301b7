//! Implementation of the `packforge paths` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use packforge_lib::export::resolve_destinations;
use packforge_lib::pipeline::export_request;
use packforge_lib::platform::PlatformContentLocator;
use packforge_lib::project::Project;

use crate::output::{OutputFormat, Status, print_json, print_path, print_status};

#[derive(Serialize)]
struct PathsOutput {
  profile: String,
  target: String,
  bp: PathBuf,
  rp: PathBuf,
  workspace: PathBuf,
  manifest: PathBuf,
}

pub fn cmd_paths(project_dir: &Path, profile: &str, output: OutputFormat) -> Result<()> {
  let project = Project::open(project_dir).context("Failed to open project")?;
  let profile_config = project.config.profile(profile)?;
  let request = export_request(&project, profile_config);

  let paths = resolve_destinations(&request, &PlatformContentLocator)
    .with_context(|| format!("Failed to resolve export paths for profile \"{profile}\""))?;

  let result = PathsOutput {
    profile: profile.to_string(),
    target: request.target.target.clone(),
    bp: paths.bp,
    rp: paths.rp,
    workspace: project.workspace.dir().to_path_buf(),
    manifest: request.manifest_path,
  };

  if output.is_json() {
    return print_json(&result);
  }

  print_status(Status::Info, &format!("Profile \"{}\" exports to \"{}\"", result.profile, result.target));
  print_path("Behavior pack", &result.bp);
  print_path("Resource pack", &result.rp);
  print_path("Workspace", &result.workspace);

  Ok(())
}
