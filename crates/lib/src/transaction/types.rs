use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::walk::WalkError;

/// The inverse of one completed forward operation.
///
/// Recorded only after the forward operation succeeded. Executing the recorded
/// actions in reverse order restores the state from before the transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum InverseAction {
  /// Move `from` back to `to` (undoes a delete into the backup directory or a rename).
  RestoreMoved { from: PathBuf, to: PathBuf },
  /// Remove a file that was created by copying.
  RemoveCreatedCopy { path: PathBuf },
  /// Remove the shallowest directory created by `mkdir_all`, with everything under it.
  RemoveCreatedDirectoryChain { root: PathBuf },
}

impl fmt::Display for InverseAction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::RestoreMoved { from, to } => write!(f, "restore {} -> {}", from.display(), to.display()),
      Self::RemoveCreatedCopy { path } => write!(f, "remove copied file {}", path.display()),
      Self::RemoveCreatedDirectoryChain { root } => write!(f, "remove created directory {}", root.display()),
    }
  }
}

/// How a single file ended up at its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transfer {
  Moved,
  Copied,
}

/// Counts for a directory relocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TransferStats {
  pub files_moved: usize,
  pub files_copied: usize,
  pub directories: usize,
}

impl TransferStats {
  pub fn files(&self) -> usize {
    self.files_moved + self.files_copied
  }

  pub(crate) fn add(&mut self, transfer: Transfer) {
    match transfer {
      Transfer::Moved => self.files_moved += 1,
      Transfer::Copied => self.files_copied += 1,
    }
  }
}

#[derive(Debug, Error)]
pub enum TransactionError {
  #[error("path does not exist: {}", path.display())]
  NotFound { path: PathBuf },

  #[error("{reason}: {}", path.display())]
  Conflict { path: PathBuf, reason: &'static str },

  #[error("not a directory: {}", path.display())]
  NotADirectory { path: PathBuf },

  #[error("expected a regular file: {}", path.display())]
  NotAFile { path: PathBuf },

  #[error(
    "backup directory is not empty: {}\n\
     It may hold files left behind by an interrupted run. Inspect it, recover anything you need, \
     and remove it before running again.",
    path.display()
  )]
  BackupNotEmpty { path: PathBuf },

  #[error("failed to {op} {}: {source}", path.display())]
  Io {
    op: &'static str,
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error(transparent)]
  Walk(#[from] WalkError),

  #[error(
    "failed to undo filesystem changes ({action}): {source}\n\
     The files that could not be restored are kept in the backup directory:\n  {}\n\
     The remaining undo steps are listed in {}. Restore the files manually and remove the \
     directory before running again.",
    backup_dir.display(),
    backup_dir.join(super::UNDO_LOG_FILENAME).display()
  )]
  FatalRecovery {
    backup_dir: PathBuf,
    action: Box<InverseAction>,
    #[source]
    source: io::Error,
  },
}

impl TransactionError {
  /// Whether this error means the filesystem could not be restored.
  pub fn is_fatal(&self) -> bool {
    matches!(self, Self::FatalRecovery { .. })
  }
}

/// Build a mapper from `io::Error` to [`TransactionError::Io`].
pub(crate) fn io_err<'a>(op: &'static str, path: &'a Path) -> impl FnOnce(io::Error) -> TransactionError + 'a {
  move |source| TransactionError::Io {
    op,
    path: path.to_path_buf(),
    source,
  }
}
