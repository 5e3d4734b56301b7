//! Reversible filesystem operations.
//!
//! A [`Transaction`] performs moves, copies, deletes and directory creation
//! while recording the inverse of every completed step. [`Transaction::undo`]
//! replays the inverses in reverse order; [`Transaction::commit`] discards them
//! together with the backup directory that holds deleted content.
//!
//! Deletes never destroy anything until commit: the deleted entry is moved
//! into a uniquely named slot in the backup directory.

mod primitives;
mod types;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::walk::{EntryKind, walk_postorder};

use primitives::{RenameFn, absolute, exists, first_missing_ancestor, force_move, is_dir_empty, rename};
pub use types::{InverseAction, TransactionError, Transfer, TransferStats};
use types::io_err;

/// Written into the backup directory when an undo cannot complete.
pub const UNDO_LOG_FILENAME: &str = "undo-log.json";

impl InverseAction {
  fn execute(&self) -> io::Result<()> {
    match self {
      Self::RestoreMoved { from, to } => force_move(from, to),
      Self::RemoveCreatedCopy { path } => ignore_not_found(remove_file(path)),
      Self::RemoveCreatedDirectoryChain { root } => ignore_not_found(fs::remove_dir_all(root)),
    }
  }
}

fn remove_file(path: &Path) -> io::Result<()> {
  #[cfg(windows)]
  {
    if let Ok(metadata) = fs::metadata(path) {
      let mut perms = metadata.permissions();
      if perms.readonly() {
        #[allow(clippy::permissions_set_readonly_false)]
        perms.set_readonly(false);
        let _ = fs::set_permissions(path, perms);
      }
    }
  }
  fs::remove_file(path)
}

fn ignore_not_found(result: io::Result<()>) -> io::Result<()> {
  match result {
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
    other => other,
  }
}

/// A log of reversible filesystem operations rooted at a backup directory.
///
/// Must be finished with [`commit`](Self::commit) or [`undo`](Self::undo).
/// Dropping an unfinished transaction leaves the backup directory on disk.
#[derive(Debug)]
pub struct Transaction {
  backup_dir: PathBuf,
  counter: u64,
  actions: Vec<InverseAction>,
  finished: bool,
}

impl Transaction {
  /// Start a transaction that stores deleted content under `backup_dir`.
  ///
  /// The directory is created if missing. An existing non-empty directory is
  /// refused since it may hold content from an interrupted run.
  pub fn begin(backup_dir: impl AsRef<Path>) -> Result<Self, TransactionError> {
    let backup_dir = absolute(backup_dir.as_ref())?;

    match fs::metadata(&backup_dir) {
      Ok(metadata) if !metadata.is_dir() => {
        return Err(TransactionError::NotADirectory { path: backup_dir });
      }
      Ok(_) => {
        if !is_dir_empty(&backup_dir).map_err(io_err("read", &backup_dir))? {
          return Err(TransactionError::BackupNotEmpty { path: backup_dir });
        }
      }
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        fs::create_dir_all(&backup_dir).map_err(io_err("create backup directory", &backup_dir))?;
      }
      Err(e) => return Err(io_err("inspect", &backup_dir)(e)),
    }

    debug!(backup_dir = %backup_dir.display(), "transaction started");
    Ok(Self {
      backup_dir,
      counter: 0,
      actions: Vec::new(),
      finished: false,
    })
  }

  pub fn backup_dir(&self) -> &Path {
    &self.backup_dir
  }

  /// The recorded inverse actions, oldest first.
  pub fn actions(&self) -> &[InverseAction] {
    &self.actions
  }

  fn record(&mut self, action: InverseAction) {
    debug!(%action, "recorded inverse");
    self.actions.push(action);
  }

  fn backup_slot(&mut self, path: &Path) -> PathBuf {
    let name = path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_else(|| "root".to_string());
    let slot = self.backup_dir.join(format!("{}_{}", self.counter, name));
    self.counter += 1;
    slot
  }

  /// Move `path` into the backup directory. A missing path is not an error.
  pub fn delete(&mut self, path: impl AsRef<Path>) -> Result<(), TransactionError> {
    let path = absolute(path.as_ref())?;
    if !exists(&path)? {
      debug!(path = %path.display(), "delete: nothing to do");
      return Ok(());
    }
    if self.backup_dir.starts_with(&path) {
      return Err(TransactionError::Conflict {
        path,
        reason: "cannot delete a directory containing the backup directory",
      });
    }

    let slot = self.backup_slot(&path);
    force_move(&path, &slot).map_err(io_err("move to backup", &path))?;
    self.record(InverseAction::RestoreMoved { from: slot, to: path });
    Ok(())
  }

  /// Delete a directory one entry at a time, deepest first.
  ///
  /// A plain file is handed to [`delete`](Self::delete). A missing path is
  /// not an error. On a walk error the entries processed so far stay recorded.
  pub fn delete_dir(&mut self, path: impl AsRef<Path>) -> Result<(), TransactionError> {
    let path = absolute(path.as_ref())?;
    let metadata = match fs::symlink_metadata(&path) {
      Ok(metadata) => metadata,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
      Err(e) => return Err(io_err("inspect", &path)(e)),
    };
    if !metadata.is_dir() {
      return self.delete(&path);
    }

    for entry in walk_postorder(&path) {
      let entry = entry?;
      self.delete(&entry.path)?;
    }
    debug!(path = %path.display(), "deleted directory");
    Ok(())
  }

  /// Rename `source` to `target`, creating the target's parents.
  pub fn move_path(&mut self, source: impl AsRef<Path>, target: impl AsRef<Path>) -> Result<(), TransactionError> {
    let (source, target) = (absolute(source.as_ref())?, absolute(target.as_ref())?);
    check_transfer(&source, &target)?;
    self.create_parent(&target)?;

    fs::rename(&source, &target).map_err(io_err("move", &source))?;
    self.record(InverseAction::RestoreMoved {
      from: target,
      to: source,
    });
    Ok(())
  }

  /// Copy the file `source` to `target`, creating the target's parents.
  pub fn copy(&mut self, source: impl AsRef<Path>, target: impl AsRef<Path>) -> Result<(), TransactionError> {
    let (source, target) = (absolute(source.as_ref())?, absolute(target.as_ref())?);
    check_transfer(&source, &target)?;
    self.create_parent(&target)?;
    self.copy_checked(&source, &target)
  }

  fn copy_checked(&mut self, source: &Path, target: &Path) -> Result<(), TransactionError> {
    let metadata = fs::symlink_metadata(source).map_err(io_err("inspect", source))?;
    if !metadata.is_file() {
      return Err(TransactionError::NotAFile {
        path: source.to_path_buf(),
      });
    }

    primitives::copy_file(source, target).map_err(io_err("copy", source))?;
    self.record(InverseAction::RemoveCreatedCopy {
      path: target.to_path_buf(),
    });
    Ok(())
  }

  /// Move `source` to `target`, or copy it if the rename fails.
  ///
  /// Only regular files can be copied; for anything else the rename error is
  /// returned.
  pub fn move_or_copy(
    &mut self,
    source: impl AsRef<Path>,
    target: impl AsRef<Path>,
  ) -> Result<Transfer, TransactionError> {
    self.move_or_copy_with(source.as_ref(), target.as_ref(), &rename)
  }

  fn move_or_copy_with(
    &mut self,
    source: &Path,
    target: &Path,
    rename: &RenameFn,
  ) -> Result<Transfer, TransactionError> {
    let (source, target) = (absolute(source)?, absolute(target)?);
    check_transfer(&source, &target)?;
    self.create_parent(&target)?;

    match rename(&source, &target) {
      Ok(()) => {
        self.record(InverseAction::RestoreMoved {
          from: target,
          to: source,
        });
        Ok(Transfer::Moved)
      }
      Err(e) => {
        let is_file = fs::symlink_metadata(&source).is_ok_and(|m| m.is_file());
        if !is_file {
          return Err(io_err("move", &source)(e));
        }
        debug!(source = %source.display(), error = %e, "rename failed, copying instead");
        self.copy_checked(&source, &target)?;
        Ok(Transfer::Copied)
      }
    }
  }

  /// Create `path` and any missing parents.
  ///
  /// Records one inverse for the shallowest directory that did not exist.
  pub fn mkdir_all(&mut self, path: impl AsRef<Path>) -> Result<(), TransactionError> {
    let path = absolute(path.as_ref())?;
    let Some(first_missing) = first_missing_ancestor(&path)? else {
      return Ok(());
    };

    if let Err(e) = fs::create_dir_all(&path) {
      let _ = fs::remove_dir_all(&first_missing);
      return Err(io_err("create directory", &path)(e));
    }
    self.record(InverseAction::RemoveCreatedDirectoryChain { root: first_missing });
    Ok(())
  }

  fn create_parent(&mut self, path: &Path) -> Result<(), TransactionError> {
    match path.parent() {
      Some(parent) if !parent.as_os_str().is_empty() => self.mkdir_all(parent),
      _ => Ok(()),
    }
  }

  /// Relocate the contents of directory `source` into `target`.
  ///
  /// `target` must be absent or empty. Files are moved (or copied when moving
  /// fails); source subdirectories emptied by the move are deleted through the
  /// log. The source root itself is kept.
  pub fn move_or_copy_dir(
    &mut self,
    source: impl AsRef<Path>,
    target: impl AsRef<Path>,
  ) -> Result<TransferStats, TransactionError> {
    self.move_or_copy_dir_with(source.as_ref(), target.as_ref(), &rename)
  }

  fn move_or_copy_dir_with(
    &mut self,
    source: &Path,
    target: &Path,
    rename: &RenameFn,
  ) -> Result<TransferStats, TransactionError> {
    let (source, target) = (absolute(source)?, absolute(target)?);

    match fs::symlink_metadata(&target) {
      Ok(metadata) if metadata.is_dir() => {
        if !is_dir_empty(&target).map_err(io_err("read", &target))? {
          return Err(TransactionError::Conflict {
            path: target,
            reason: "target must be an empty directory or not exist",
          });
        }
      }
      Ok(_) => {
        return Err(TransactionError::Conflict {
          path: target,
          reason: "target must be an empty directory or not exist",
        });
      }
      Err(e) if e.kind() == io::ErrorKind::NotFound => {}
      Err(e) => return Err(io_err("inspect", &target)(e)),
    }
    match fs::metadata(&source) {
      Ok(metadata) if metadata.is_dir() => {}
      Ok(_) => return Err(TransactionError::NotADirectory { path: source }),
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(TransactionError::NotFound { path: source }),
      Err(e) => return Err(io_err("inspect", &source)(e)),
    }

    self.mkdir_all(&target)?;

    let mut stats = TransferStats::default();
    for entry in walk_postorder(&source) {
      let entry = entry?;
      if entry.depth == 0 {
        continue;
      }
      let Ok(rel) = entry.path.strip_prefix(&source) else {
        continue;
      };
      let dest = target.join(rel);

      match entry.kind {
        EntryKind::Dir => {
          self.mkdir_all(&dest)?;
          stats.directories += 1;
          if is_dir_empty(&entry.path).map_err(io_err("read", &entry.path))? {
            self.delete(&entry.path)?;
          }
        }
        EntryKind::File | EntryKind::Symlink => {
          let transfer = self.move_or_copy_with(&entry.path, &dest, rename)?;
          stats.add(transfer);
        }
      }
    }

    info!(
      source = %source.display(),
      target = %target.display(),
      moved = stats.files_moved,
      copied = stats.files_copied,
      "relocated directory"
    );
    Ok(stats)
  }

  /// Revert every recorded operation, newest first.
  ///
  /// On success the backup directory is removed. If an inverse fails, the
  /// remaining log is saved to [`UNDO_LOG_FILENAME`] in the backup directory
  /// and [`TransactionError::FatalRecovery`] is returned; the backup
  /// directory is left in place.
  pub fn undo(mut self) -> Result<(), TransactionError> {
    self.finished = true;
    info!(
      actions = self.actions.len(),
      backup_dir = %self.backup_dir.display(),
      "undoing filesystem changes"
    );

    while let Some(action) = self.actions.pop() {
      debug!(%action, "undo");
      if let Err(source) = action.execute() {
        let mut remaining = std::mem::take(&mut self.actions);
        remaining.push(action.clone());
        self.write_undo_log(&remaining);
        error!(
          %action,
          error = %source,
          backup_dir = %self.backup_dir.display(),
          "undo failed"
        );
        return Err(TransactionError::FatalRecovery {
          backup_dir: self.backup_dir.clone(),
          action: Box::new(action),
          source,
        });
      }
    }

    if let Err(e) = fs::remove_dir_all(&self.backup_dir) {
      warn!(backup_dir = %self.backup_dir.display(), error = %e, "failed to remove backup directory after undo");
    }
    Ok(())
  }

  fn write_undo_log(&self, remaining: &[InverseAction]) {
    let path = self.backup_dir.join(UNDO_LOG_FILENAME);
    let result = serde_json::to_string_pretty(remaining)
      .map_err(io::Error::other)
      .and_then(|json| fs::write(&path, json));
    if let Err(e) = result {
      warn!(path = %path.display(), error = %e, "failed to write undo log");
    }
  }

  /// Make the operations permanent by removing the backup directory.
  pub fn commit(mut self) -> Result<(), TransactionError> {
    self.finished = true;
    self.actions.clear();

    #[cfg(windows)]
    {
      let _ = crate::platform::readonly::make_writable(&self.backup_dir);
    }

    match fs::remove_dir_all(&self.backup_dir) {
      Ok(()) => {}
      Err(e) if e.kind() == io::ErrorKind::NotFound => {}
      Err(e) => return Err(io_err("remove backup directory", &self.backup_dir)(e)),
    }
    debug!(backup_dir = %self.backup_dir.display(), "transaction committed");
    Ok(())
  }
}

impl Drop for Transaction {
  fn drop(&mut self) {
    if !self.finished && !self.actions.is_empty() {
      warn!(
        backup_dir = %self.backup_dir.display(),
        pending = self.actions.len(),
        "transaction dropped without commit or undo, backup directory left in place"
      );
    }
  }
}

/// Source must exist, target must not.
fn check_transfer(source: &Path, target: &Path) -> Result<(), TransactionError> {
  if !exists(source)? {
    return Err(TransactionError::NotFound {
      path: source.to_path_buf(),
    });
  }
  if exists(target)? {
    return Err(TransactionError::Conflict {
      path: target.to_path_buf(),
      reason: "target already exists",
    });
  }
  Ok(())
}
