//! Scaffold a new packforge project.
//!
//! Creates, in the target directory:
//! - `config.json` with a `default` profile exporting to `build/`
//! - `packs/BP`, `packs/RP` and `packs/data`
//! - a `.gitignore` for the workspace and local export output

mod templates;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::consts::{CONFIG_FILENAME, DEFAULT_PROFILE};
use crate::export::{ExportTarget, TargetKind};
use crate::project::{Packs, Profile, ProjectConfig};

pub use templates::{BEHAVIOR_PACK_DIR, DATA_DIR, GITIGNORE_TEMPLATE, RESOURCE_PACK_DIR};

/// Errors that can occur during initialization.
#[derive(Debug, Error)]
pub enum InitError {
  #[error("file already exists: {}", path.display())]
  PathExists { path: PathBuf },

  #[error("failed to create directory {}: {source}", path.display())]
  CreateDir { path: PathBuf, source: std::io::Error },

  #[error("failed to write file {}: {source}", path.display())]
  WriteFile { path: PathBuf, source: std::io::Error },

  #[error("failed to canonicalize path {}: {source}", path.display())]
  Canonicalize { path: PathBuf, source: std::io::Error },

  #[error("failed to serialize config: {0}")]
  Serialize(#[from] serde_json::Error),
}

/// Options for initializing a project.
pub struct InitOptions {
  /// Directory to initialize, created if missing
  pub project_dir: PathBuf,
  /// Project name, defaults to the directory name
  pub name: Option<String>,
}

/// Result of a successful initialization.
#[derive(Debug, serde::Serialize)]
pub struct InitResult {
  /// The project directory (canonicalized)
  pub project_dir: PathBuf,
  pub config_file: PathBuf,
  /// Whether a `.gitignore` was written (an existing one is left alone)
  pub gitignore_written: bool,
  pub created_dirs: Vec<PathBuf>,
}

/// Config written by `init`.
pub fn default_config(name: &str) -> ProjectConfig {
  let mut config = ProjectConfig {
    name: name.to_string(),
    author: String::new(),
    packs: Packs {
      behavior_pack: Some(format!("./{BEHAVIOR_PACK_DIR}")),
      resource_pack: Some(format!("./{RESOURCE_PACK_DIR}")),
    },
    data_path: Some(format!("./{DATA_DIR}")),
    use_app_data: false,
    profiles: Default::default(),
  };
  config.profiles.insert(
    DEFAULT_PROFILE.to_string(),
    Profile {
      export: ExportTarget::new(TargetKind::Local),
      steps: Vec::new(),
    },
  );
  config
}

fn create_dir(path: &Path) -> Result<(), InitError> {
  fs::create_dir_all(path).map_err(|e| InitError::CreateDir {
    path: path.to_path_buf(),
    source: e,
  })
}

fn write_file(path: &Path, content: &str) -> Result<(), InitError> {
  fs::write(path, content).map_err(|e| InitError::WriteFile {
    path: path.to_path_buf(),
    source: e,
  })
}

/// Initialize a new project.
///
/// # Errors
///
/// Returns an error if `config.json` already exists or any file or
/// directory cannot be created.
pub fn init(options: &InitOptions) -> Result<InitResult, InitError> {
  create_dir(&options.project_dir)?;

  let project_dir = dunce::canonicalize(&options.project_dir).map_err(|e| InitError::Canonicalize {
    path: options.project_dir.clone(),
    source: e,
  })?;

  let config_file = project_dir.join(CONFIG_FILENAME);
  if config_file.exists() {
    return Err(InitError::PathExists { path: config_file });
  }

  let name = match &options.name {
    Some(name) => name.clone(),
    None => project_dir
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_else(|| "project".to_string()),
  };

  let mut created_dirs = Vec::new();
  for rel in [BEHAVIOR_PACK_DIR, RESOURCE_PACK_DIR, DATA_DIR] {
    let dir = project_dir.join(rel);
    create_dir(&dir)?;
    debug!(path = %dir.display(), "created directory");
    created_dirs.push(dir);
  }

  let gitignore = project_dir.join(".gitignore");
  let gitignore_written = !gitignore.exists();
  if gitignore_written {
    write_file(&gitignore, GITIGNORE_TEMPLATE)?;
  }

  let mut content = default_config(&name).to_json()?;
  content.push('\n');
  write_file(&config_file, &content)?;

  info!(path = %project_dir.display(), name = %name, "initialized project");
  Ok(InitResult {
    project_dir,
    config_file,
    gitignore_written,
    created_dirs,
  })
}
