use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::consts::{ROOT_DIR_ENV, WORK_DIR_ENV};
use crate::project::Step;

use super::PipelineError;

/// Outcome of one step.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
  pub name: String,
  pub skipped: bool,
  pub duration_ms: u64,
}

/// Relative commands containing a separator are taken relative to the
/// project root; bare names are looked up on `PATH`.
fn resolve_command(command: &str, project_root: &Path) -> PathBuf {
  let path = Path::new(command);
  if path.is_relative() && path.components().count() > 1 {
    project_root.join(path)
  } else {
    path.to_path_buf()
  }
}

/// Run `step` with `work_dir` as its working directory.
///
/// Output is forwarded to the log line by line. A non-zero exit status fails
/// the step.
pub fn run_step(step: &Step, project_root: &Path, work_dir: &Path) -> Result<StepReport, PipelineError> {
  if step.disabled {
    info!(step = %step.name, "step disabled, skipping");
    return Ok(StepReport {
      name: step.name.clone(),
      skipped: true,
      duration_ms: 0,
    });
  }

  let command = resolve_command(&step.command, project_root);
  info!(step = %step.name, command = %command.display(), "running step");
  let started = Instant::now();

  let output = Command::new(&command)
    .args(&step.args)
    .current_dir(work_dir)
    .envs(&step.env)
    .env(ROOT_DIR_ENV, project_root)
    .env(WORK_DIR_ENV, work_dir)
    .output()
    .map_err(|source| PipelineError::Spawn {
      name: step.name.clone(),
      command: command.display().to_string(),
      source,
    })?;

  for line in String::from_utf8_lossy(&output.stdout).lines() {
    info!(step = %step.name, "{line}");
  }
  for line in String::from_utf8_lossy(&output.stderr).lines() {
    warn!(step = %step.name, "{line}");
  }

  if !output.status.success() {
    return Err(PipelineError::StepFailed {
      name: step.name.clone(),
      code: output.status.code(),
    });
  }

  let duration_ms = started.elapsed().as_millis() as u64;
  debug!(step = %step.name, duration_ms, "step finished");
  Ok(StepReport {
    name: step.name.clone(),
    skipped: false,
    duration_ms,
  })
}
