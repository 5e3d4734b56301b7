use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ownership::OwnershipError;
use crate::platform::LocateError;
use crate::transaction::{TransactionError, TransferStats};

/// Where a profile's output is published, as written in the project config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportTarget {
  /// One of `development`, `exact`, `world` or `local`.
  pub target: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub bp_path: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub rp_path: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub world_name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub world_path: Option<String>,
  /// Mark exported files read-only so they are not edited in place by mistake.
  #[serde(default)]
  pub read_only: bool,
}

impl ExportTarget {
  pub fn new(kind: TargetKind) -> Self {
    Self {
      target: kind.as_str().to_string(),
      ..Default::default()
    }
  }

  pub fn kind(&self) -> Result<TargetKind, ExportError> {
    TargetKind::parse(&self.target)
      .ok_or_else(|| ExportError::Config(format!("unknown export target \"{}\"", self.target)))
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
  /// The platform's development pack folders.
  Development,
  /// Explicit `bpPath` and `rpPath`.
  Exact,
  /// A world's pack folders, by `worldName` or `worldPath`.
  World,
  /// `build/` in the project.
  Local,
}

impl TargetKind {
  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "development" => Some(Self::Development),
      "exact" => Some(Self::Exact),
      "world" => Some(Self::World),
      "local" => Some(Self::Local),
      _ => None,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Development => "development",
      Self::Exact => "exact",
      Self::World => "world",
      Self::Local => "local",
    }
  }
}

impl fmt::Display for TargetKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Resolved behavior pack and resource pack destinations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportPaths {
  pub bp: PathBuf,
  pub rp: PathBuf,
}

/// Everything one export run needs.
#[derive(Debug, Clone)]
pub struct ExportRequest {
  /// Built output root holding `BP/`, `RP/` and optionally `data/`.
  pub output_dir: PathBuf,
  /// Relative destinations are resolved against this directory.
  pub project_root: PathBuf,
  /// Location of the ownership manifest file.
  pub manifest_path: PathBuf,
  /// Scratch directory for the export transaction.
  pub backup_dir: PathBuf,
  pub target: ExportTarget,
  pub project_name: String,
  /// Project data directory that receives the built `data/` folder.
  pub data_path: Option<PathBuf>,
}

/// Outcome for one destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DestinationReport {
  pub path: PathBuf,
  pub files: usize,
  pub moved: usize,
  pub copied: usize,
}

impl DestinationReport {
  pub(crate) fn new(path: PathBuf, stats: TransferStats) -> Self {
    Self {
      path,
      files: stats.files(),
      moved: stats.files_moved,
      copied: stats.files_copied,
    }
  }

  /// `"moved"`, `"copied"`, or `"moved and copied"`.
  pub fn method(&self) -> &'static str {
    match (self.moved, self.copied) {
      (_, 0) => "moved",
      (0, _) => "copied",
      _ => "moved and copied",
    }
  }
}

/// Summary of a successful export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportReport {
  pub target: String,
  pub behavior_pack: DestinationReport,
  pub resource_pack: DestinationReport,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub data: Option<DestinationReport>,
  /// Files marked read-only, zero unless the target asks for it.
  pub read_only_files: usize,
}

#[derive(Debug, Error)]
pub enum ExportError {
  #[error("invalid export target: {0}")]
  Config(String),

  #[error("world \"{name}\" not found")]
  WorldNotFound { name: String },

  #[error(transparent)]
  Locate(#[from] LocateError),

  #[error(
    "refusing to export: {source}\n\
     The list of files created by previous exports is stored in {}.",
    manifest.display()
  )]
  Safety {
    manifest: PathBuf,
    #[source]
    source: OwnershipError,
  },

  #[error(transparent)]
  Transaction(#[from] TransactionError),

  #[error("export finished but the ownership manifest could not be updated: {0}")]
  Manifest(#[source] OwnershipError),
}
