use std::cmp::Ordering;
use std::fmt;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::walk::WalkError;

/// Which half of the exported output a destination receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
  Behavior,
  Resource,
}

impl OutputKind {
  /// Key of this kind in the manifest file.
  pub fn key(self) -> &'static str {
    match self {
      Self::Behavior => "bp",
      Self::Resource => "rp",
    }
  }
}

impl fmt::Display for OutputKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Behavior => write!(f, "behavior pack"),
      Self::Resource => write!(f, "resource pack"),
    }
  }
}

#[derive(Debug, Error)]
pub enum OwnershipError {
  #[error(
    "{} contains {path}, which was not created by a previous export.\n\
     Move or delete it before exporting again, it would be removed otherwise.",
    destination.display()
  )]
  Untracked { destination: PathBuf, path: String },

  #[error("export destination is not a directory: {}", path.display())]
  NotADirectory { path: PathBuf },

  #[error("failed to inspect {}: {source}", path.display())]
  Inspect {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error(transparent)]
  Walk(#[from] WalkError),

  #[error("failed to write ownership manifest {}: {source}", path.display())]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to serialize ownership manifest: {0}")]
  Serialize(#[source] serde_json::Error),
}

/// Component-wise order of `/`-separated relative paths.
///
/// Matches the order in which a walk with sorted file names visits files,
/// so `a/b` sorts before `a.txt`.
pub fn path_order(a: &str, b: &str) -> Ordering {
  a.split('/').cmp(b.split('/'))
}
