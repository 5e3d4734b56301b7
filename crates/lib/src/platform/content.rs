//! Lookup of the platform's content staging directory and installed worlds.
//!
//! Export target resolution only talks to the [`ContentLocator`] trait, so
//! platform-specific locations stay in this module.

use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use crate::consts::CONTENT_DIR_ENV;

/// Directory (inside the content directory) holding installed worlds.
pub const WORLDS_DIR: &str = "minecraftWorlds";

/// File inside a world directory holding its display name.
const LEVEL_NAME_FILE: &str = "levelname.txt";

#[derive(Debug, Error)]
pub enum LocateError {
  #[error("content directory not found: {}", path.display())]
  NotFound { path: PathBuf },

  #[error("no default content directory on this platform, set {CONTENT_DIR_ENV} to point at it")]
  Unsupported,

  #[error("failed to list worlds in {}: {source}", path.display())]
  ListWorlds {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// An installed world.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct World {
  /// Display name, read from the world's `levelname.txt` (falls back to the directory name).
  pub name: String,
  pub path: PathBuf,
}

/// Narrow interface to the platform directories needed by export resolution.
pub trait ContentLocator {
  /// The well-known content staging directory.
  fn content_dir(&self) -> Result<PathBuf, LocateError>;

  /// Worlds installed under the content directory, sorted by directory name.
  fn worlds(&self) -> Result<Vec<World>, LocateError> {
    let dir = self.content_dir()?.join(WORLDS_DIR);
    list_worlds(&dir)
  }
}

/// Locator backed by the environment and the platform's default install location.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlatformContentLocator;

impl ContentLocator for PlatformContentLocator {
  fn content_dir(&self) -> Result<PathBuf, LocateError> {
    if let Some(dir) = std::env::var_os(CONTENT_DIR_ENV) {
      let path = PathBuf::from(dir);
      debug!(path = %path.display(), "using content directory from environment");
      return existing(path);
    }

    default_content_dir()
  }
}

fn existing(path: PathBuf) -> Result<PathBuf, LocateError> {
  if path.is_dir() {
    Ok(path)
  } else {
    Err(LocateError::NotFound { path })
  }
}

#[cfg(windows)]
fn default_content_dir() -> Result<PathBuf, LocateError> {
  let local = crate::platform::paths::local_app_data().ok_or(LocateError::Unsupported)?;
  existing(
    local
      .join("Packages")
      .join("Microsoft.MinecraftUWP_8wekyb3d8bbwe")
      .join("LocalState")
      .join("games")
      .join("com.mojang"),
  )
}

#[cfg(not(windows))]
fn default_content_dir() -> Result<PathBuf, LocateError> {
  Err(LocateError::Unsupported)
}

/// List the worlds stored in `dir`. A missing directory has no worlds.
pub fn list_worlds(dir: &std::path::Path) -> Result<Vec<World>, LocateError> {
  let entries = match fs::read_dir(dir) {
    Ok(entries) => entries,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
    Err(e) => {
      return Err(LocateError::ListWorlds {
        path: dir.to_path_buf(),
        source: e,
      });
    }
  };

  let mut paths: Vec<PathBuf> = entries
    .flatten()
    .map(|entry| entry.path())
    .filter(|path| path.is_dir())
    .collect();
  paths.sort();

  let worlds = paths
    .into_iter()
    .map(|path| {
      let name = fs::read_to_string(path.join(LEVEL_NAME_FILE))
        .map(|s| s.trim().to_string())
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default());
      World { name, path }
    })
    .collect();

  Ok(worlds)
}
