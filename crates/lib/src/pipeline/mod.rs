//! Running a profile: working copy, steps, export.
//!
//! The source packs are copied into the workspace's `tmp/` directory, every
//! enabled step runs there in order, and the result is exported with
//! [`export_project`].

mod steps;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::export::{BP_DIR, DATA_DIR, ExportError, ExportReport, ExportRequest, RP_DIR, export_project};
use crate::platform::ContentLocator;
use crate::project::{Profile, Project, ProjectError};

pub use steps::{StepReport, run_step};

#[derive(Debug, Error)]
pub enum PipelineError {
  #[error(transparent)]
  Project(#[from] ProjectError),

  #[error("failed to prepare working copy at {}: {source}", path.display())]
  Prepare {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("step \"{name}\": failed to start {command}: {source}")]
  Spawn {
    name: String,
    command: String,
    #[source]
    source: io::Error,
  },

  #[error("step \"{name}\" failed ({})", describe_exit(*code))]
  StepFailed { name: String, code: Option<i32> },

  #[error(transparent)]
  Export(#[from] ExportError),
}

fn describe_exit(code: Option<i32>) -> String {
  match code {
    Some(code) => format!("exit code {code}"),
    None => "terminated by signal".to_string(),
  }
}

/// Summary of a profile run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
  pub profile: String,
  pub steps: Vec<StepReport>,
  pub export: ExportReport,
}

/// Build the export request for `profile` of `project`, reading the built
/// output from the workspace's working copy.
pub fn export_request(project: &Project, profile: &Profile) -> ExportRequest {
  ExportRequest {
    output_dir: project.workspace.tmp_dir(),
    project_root: project.root.clone(),
    manifest_path: project.workspace.manifest_path(),
    backup_dir: project.workspace.backup_dir(),
    target: profile.export.clone(),
    project_name: project.config.name.clone(),
    data_path: project.config.data_dir(&project.root),
  }
}

fn prepare_err(path: &Path) -> impl FnOnce(io::Error) -> PipelineError + '_ {
  move |source| PipelineError::Prepare {
    path: path.to_path_buf(),
    source,
  }
}

/// Copy the contents of `source` into the existing directory `target`.
fn copy_tree(source: &Path, target: &Path) -> Result<u64, PipelineError> {
  let mut copied = 0;
  for entry in WalkDir::new(source).min_depth(1).sort_by_file_name() {
    let entry = entry.map_err(|e| {
      let path = e.path().unwrap_or(source).to_path_buf();
      PipelineError::Prepare {
        path,
        source: e.into(),
      }
    })?;
    let Ok(rel) = entry.path().strip_prefix(source) else {
      continue;
    };
    let dest = target.join(rel);
    if entry.file_type().is_dir() {
      fs::create_dir_all(&dest).map_err(prepare_err(&dest))?;
    } else {
      fs::copy(entry.path(), &dest).map_err(prepare_err(entry.path()))?;
      copied += 1;
    }
  }
  Ok(copied)
}

/// Recreate the working copy from the project's source directories.
///
/// Returns the working copy root, holding `BP/`, `RP/` and `data/`.
pub fn prepare_working_copy(project: &Project) -> Result<PathBuf, PipelineError> {
  let tmp = project.workspace.tmp_dir();
  match fs::remove_dir_all(&tmp) {
    Ok(()) => debug!(path = %tmp.display(), "removed previous working copy"),
    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
    Err(e) => return Err(prepare_err(&tmp)(e)),
  }

  let root = &project.root;
  let sources = [
    (BP_DIR, project.config.behavior_pack_dir(root)),
    (RP_DIR, project.config.resource_pack_dir(root)),
    (DATA_DIR, project.config.data_dir(root)),
  ];
  for (name, source) in sources {
    let target = tmp.join(name);
    fs::create_dir_all(&target).map_err(prepare_err(&target))?;
    if let Some(source) = source {
      let files = copy_tree(&source, &target)?;
      debug!(source = %source.display(), files, "copied into working copy");
    }
  }

  info!(path = %tmp.display(), "working copy ready");
  Ok(tmp)
}

/// Run `profile_name` of `project` and export the result.
pub fn run_profile(
  project: &Project,
  profile_name: &str,
  locator: &dyn ContentLocator,
) -> Result<RunReport, PipelineError> {
  let profile = project.config.profile(profile_name)?;
  project.config.validate(&project.root)?;
  profile.export.kind()?;

  let started = Instant::now();
  let work_dir = prepare_working_copy(project)?;

  let mut reports = Vec::with_capacity(profile.steps.len());
  for step in &profile.steps {
    reports.push(run_step(step, &project.root, &work_dir)?);
  }

  let export = export_project(&export_request(project, profile), locator)?;
  info!(
    profile = profile_name,
    elapsed_ms = started.elapsed().as_millis() as u64,
    "profile finished"
  );

  Ok(RunReport {
    profile: profile_name.to_string(),
    steps: reports,
    export,
  })
}
