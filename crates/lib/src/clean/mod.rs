//! Removal of scratch directories left in a project's workspace.
//!
//! The working copy is always safe to remove. A leftover backup directory is
//! different: after a failed undo it may hold the only copy of files that
//! were in an export destination, so it is only removed when it is empty or
//! when the caller forces it.

use std::path::{Path, PathBuf};
use std::{fs, io};

use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::platform::readonly::make_writable;
use crate::project::Workspace;

#[derive(Debug, Error)]
pub enum CleanError {
  #[error("failed to delete {}: {source}", path.display())]
  Delete {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CleanOptions {
  /// Report what would be removed without removing it.
  pub dry_run: bool,
  /// Remove the backup directory even if it holds files.
  pub force: bool,
}

#[derive(Debug, Default, serde::Serialize)]
pub struct CleanStats {
  pub dirs_removed: usize,
  pub bytes_freed: u64,
}

#[derive(Debug, Default, serde::Serialize)]
pub struct CleanResult {
  pub stats: CleanStats,
  pub removed_paths: Vec<PathBuf>,
  /// Non-empty backup directories kept because `force` was not set.
  pub kept_paths: Vec<PathBuf>,
}

fn dir_size(path: &Path) -> u64 {
  WalkDir::new(path)
    .into_iter()
    .filter_map(|e| e.ok())
    .filter(|e| e.file_type().is_file())
    .filter_map(|e| e.metadata().ok())
    .map(|m| m.len())
    .sum()
}

fn is_empty_dir(path: &Path) -> bool {
  fs::read_dir(path).map(|mut entries| entries.next().is_none()).unwrap_or(false)
}

fn remove(path: &Path, dry_run: bool, result: &mut CleanResult) -> Result<(), CleanError> {
  let size = dir_size(path);
  if !dry_run {
    let _ = make_writable(path);
    fs::remove_dir_all(path).map_err(|source| CleanError::Delete {
      path: path.to_path_buf(),
      source,
    })?;
  }
  debug!(path = %path.display(), bytes = size, dry_run, "removed");
  result.stats.dirs_removed += 1;
  result.stats.bytes_freed += size;
  result.removed_paths.push(path.to_path_buf());
  Ok(())
}

/// Remove the working copy and, when safe or forced, the backup directory.
pub fn clean_workspace(workspace: &Workspace, options: CleanOptions) -> Result<CleanResult, CleanError> {
  let mut result = CleanResult::default();

  let tmp = workspace.tmp_dir();
  if tmp.exists() {
    remove(&tmp, options.dry_run, &mut result)?;
  }

  let backup = workspace.backup_dir();
  if backup.exists() {
    if options.force || is_empty_dir(&backup) {
      remove(&backup, options.dry_run, &mut result)?;
    } else {
      warn!(
        path = %backup.display(),
        "backup directory holds files from an interrupted export, keeping it"
      );
      result.kept_paths.push(backup);
    }
  }

  info!(
    removed = result.stats.dirs_removed,
    bytes_freed = result.stats.bytes_freed,
    dry_run = options.dry_run,
    "clean complete"
  );
  Ok(result)
}
