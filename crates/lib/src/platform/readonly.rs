//! Write protection for exported files.
//!
//! Published output can be marked read-only so that edits made directly in a
//! destination (instead of in the project sources) fail loudly rather than
//! being silently overwritten by the next export.
//!
//! Only files are touched. Directories stay writable so that a later export
//! can still relocate their contents.

use std::path::Path;

use tracing::{debug, warn};
use walkdir::WalkDir;

/// Error during permission changes.
#[derive(Debug, thiserror::Error)]
pub enum ReadOnlyError {
  #[error("failed to set permissions on {path}: {source}")]
  SetPermissions {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to read metadata for {path}: {source}")]
  Metadata {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to traverse directory {path}: {source}")]
  WalkDir {
    path: String,
    #[source]
    source: walkdir::Error,
  },
}

/// Remove write permission from every file under `path`.
///
/// Best-effort: per-file failures are logged and skipped. Only a failure to
/// traverse the tree is returned.
pub fn make_read_only(path: &Path) -> Result<usize, ReadOnlyError> {
  if !path.exists() {
    return Ok(0);
  }

  debug!(path = %path.display(), "marking files read-only");

  let mut changed = 0;
  for entry in WalkDir::new(path) {
    let entry = entry.map_err(|e| ReadOnlyError::WalkDir {
      path: path.display().to_string(),
      source: e,
    })?;

    if !entry.file_type().is_file() {
      continue;
    }

    match set_entry_read_only(entry.path(), true) {
      Ok(()) => changed += 1,
      Err(e) => warn!(path = %entry.path().display(), error = %e, "failed to mark read-only, continuing"),
    }
  }

  Ok(changed)
}

/// Restore write permission on every file under `path`.
///
/// Used before removing trees that may contain previously published,
/// write-protected files.
pub fn make_writable(path: &Path) -> Result<(), ReadOnlyError> {
  if !path.exists() {
    return Ok(());
  }

  for entry in WalkDir::new(path) {
    let entry = entry.map_err(|e| ReadOnlyError::WalkDir {
      path: path.display().to_string(),
      source: e,
    })?;

    if !entry.file_type().is_file() {
      continue;
    }

    if let Err(e) = set_entry_read_only(entry.path(), false) {
      warn!(path = %entry.path().display(), error = %e, "failed to restore write permission, continuing");
    }
  }

  Ok(())
}

#[cfg(unix)]
fn set_entry_read_only(path: &Path, read_only: bool) -> Result<(), ReadOnlyError> {
  use std::os::unix::fs::PermissionsExt;

  let metadata = std::fs::metadata(path).map_err(|e| ReadOnlyError::Metadata {
    path: path.display().to_string(),
    source: e,
  })?;

  let current_mode = metadata.permissions().mode();
  // Keep the executable bits, only toggle write access.
  let new_mode = if read_only {
    current_mode & !0o222
  } else {
    current_mode | 0o200
  };

  let mut perms = metadata.permissions();
  perms.set_mode(new_mode);
  std::fs::set_permissions(path, perms).map_err(|e| ReadOnlyError::SetPermissions {
    path: path.display().to_string(),
    source: e,
  })
}

#[cfg(not(unix))]
fn set_entry_read_only(path: &Path, read_only: bool) -> Result<(), ReadOnlyError> {
  let metadata = std::fs::metadata(path).map_err(|e| ReadOnlyError::Metadata {
    path: path.display().to_string(),
    source: e,
  })?;

  let mut perms = metadata.permissions();
  perms.set_readonly(read_only);
  std::fs::set_permissions(path, perms).map_err(|e| ReadOnlyError::SetPermissions {
    path: path.display().to_string(),
    source: e,
  })
}
