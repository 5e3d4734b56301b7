//! Project configuration and on-disk layout.

mod config;
mod workspace;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::consts::CONFIG_FILENAME;

pub use config::{Packs, Profile, ProjectConfig, Step};
pub use workspace::Workspace;

#[derive(Debug, Error)]
pub enum ProjectError {
  #[error("{} not found, run `packforge init` to create a project", path.display())]
  NotFound { path: PathBuf },

  #[error("failed to read {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse {}: {source}", path.display())]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("profile \"{name}\" not found in {CONFIG_FILENAME} (available: {available})")]
  UnknownProfile { name: String, available: String },

  #[error("invalid {CONFIG_FILENAME}: {0}")]
  Invalid(String),

  #[error("configured directory does not exist: {}", path.display())]
  MissingDirectory { path: PathBuf },

  #[error("cannot determine the user cache directory for useAppData")]
  NoCacheDir,

  #[error("failed to resolve project directory {}: {source}", path.display())]
  Canonicalize {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// A loaded project: its root directory, config and workspace.
#[derive(Debug, Clone)]
pub struct Project {
  pub root: PathBuf,
  pub config: ProjectConfig,
  pub workspace: Workspace,
}

impl Project {
  /// Open the project whose `config.json` is in `root`.
  pub fn open(root: &Path) -> Result<Self, ProjectError> {
    let root = dunce::canonicalize(root).map_err(|source| ProjectError::Canonicalize {
      path: root.to_path_buf(),
      source,
    })?;
    let config = ProjectConfig::load(&root)?;
    let workspace = Workspace::for_project(&root, config.use_app_data)?;
    Ok(Self {
      root,
      config,
      workspace,
    })
  }
}
