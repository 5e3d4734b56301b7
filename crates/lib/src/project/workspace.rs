use std::path::{Path, PathBuf};

use crate::consts::{BACKUP_DIR, CACHE_DIR, DOT_DIR, MANIFEST_FILENAME, PROJECT_CACHE_DIR, TMP_DIR};
use crate::platform::paths::cache_dir;
use crate::util::hash::project_id;

use super::ProjectError;

/// The per-project cache area.
///
/// ```text
/// <workspace>/
/// ├── tmp/                     # working copy the steps run in
/// ├── backup/                  # transaction scratch, absent between runs
/// └── cache/owned_files.json   # ownership manifest
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
  dir: PathBuf,
}

impl Workspace {
  /// Use `dir` as the workspace directory.
  pub fn at(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }

  /// Workspace for the project at `root` (which should be absolute).
  ///
  /// Lives in `<root>/.packforge`, or under the user cache directory keyed by
  /// a hash of `root` when `use_app_data` is set.
  pub fn for_project(root: &Path, use_app_data: bool) -> Result<Self, ProjectError> {
    if !use_app_data {
      return Ok(Self::at(root.join(DOT_DIR)));
    }
    let cache = cache_dir().ok_or(ProjectError::NoCacheDir)?;
    Ok(Self::at(cache.join(PROJECT_CACHE_DIR).join(project_id(root))))
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }

  pub fn tmp_dir(&self) -> PathBuf {
    self.dir.join(TMP_DIR)
  }

  pub fn backup_dir(&self) -> PathBuf {
    self.dir.join(BACKUP_DIR)
  }

  pub fn manifest_path(&self) -> PathBuf {
    self.dir.join(CACHE_DIR).join(MANIFEST_FILENAME)
  }
}
