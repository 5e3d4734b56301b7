//! Publishing built packs into their destinations.
//!
//! An export resolves the destinations for the configured target, refuses to
//! continue if they hold files that no earlier export created, and then
//! replaces their contents inside a [`Transaction`]. A failure at any point
//! of the replacement rolls the filesystem back to its state before the export.

mod paths;
mod types;

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::ownership::{OutputKind, OwnershipManifest};
use crate::platform::ContentLocator;
use crate::platform::readonly::make_read_only;
use crate::transaction::{Transaction, TransactionError, TransferStats};

pub use paths::resolve_export_paths;
pub use types::{DestinationReport, ExportError, ExportPaths, ExportReport, ExportRequest, ExportTarget, TargetKind};

/// Directory names inside the built output root.
pub const BP_DIR: &str = "BP";
pub const RP_DIR: &str = "RP";
pub const DATA_DIR: &str = "data";

fn resolve_against(root: &Path, path: PathBuf) -> PathBuf {
  let path = if path.is_absolute() { path } else { root.join(path) };
  path.components().collect()
}

/// Resolve the destinations for `request` to absolute paths.
pub fn resolve_destinations(request: &ExportRequest, locator: &dyn ContentLocator) -> Result<ExportPaths, ExportError> {
  let paths = resolve_export_paths(&request.target, &request.project_name, locator)?;
  Ok(ExportPaths {
    bp: resolve_against(&request.project_root, paths.bp),
    rp: resolve_against(&request.project_root, paths.rp),
  })
}

/// Run the deletion-safety check for `request` without changing anything.
pub fn check_export(request: &ExportRequest, locator: &dyn ContentLocator) -> Result<ExportPaths, ExportError> {
  let paths = resolve_destinations(request, locator)?;
  let manifest = OwnershipManifest::load(&request.manifest_path);
  check_safety(&manifest, request, &paths)?;
  Ok(paths)
}

fn check_safety(manifest: &OwnershipManifest, request: &ExportRequest, paths: &ExportPaths) -> Result<(), ExportError> {
  manifest
    .check_deletion_safety(&[
      (OutputKind::Behavior, paths.bp.as_path()),
      (OutputKind::Resource, paths.rp.as_path()),
    ])
    .map_err(|source| ExportError::Safety {
      manifest: request.manifest_path.clone(),
      source,
    })
}

struct Placed {
  bp: TransferStats,
  rp: TransferStats,
  data: Option<(PathBuf, TransferStats)>,
}

/// Replace the destinations' contents with the built output.
fn place(tx: &mut Transaction, request: &ExportRequest, paths: &ExportPaths) -> Result<Placed, TransactionError> {
  let data = request
    .data_path
    .as_ref()
    .map(|p| resolve_against(&request.project_root, p.clone()))
    .filter(|_| request.output_dir.join(DATA_DIR).is_dir());

  tx.delete_dir(&paths.bp)?;
  tx.delete_dir(&paths.rp)?;
  if let Some(data_path) = &data {
    tx.delete_dir(data_path)?;
  }

  let bp = tx.move_or_copy_dir(request.output_dir.join(BP_DIR), &paths.bp)?;
  let rp = tx.move_or_copy_dir(request.output_dir.join(RP_DIR), &paths.rp)?;
  let data = match data {
    Some(data_path) => {
      let stats = tx.move_or_copy_dir(request.output_dir.join(DATA_DIR), &data_path)?;
      Some((data_path, stats))
    }
    None => None,
  };

  Ok(Placed { bp, rp, data })
}

fn mark_read_only(path: &Path) -> usize {
  match make_read_only(path) {
    Ok(count) => count,
    Err(e) => {
      warn!(path = %path.display(), error = %e, "failed to mark exported files read-only");
      0
    }
  }
}

/// Publish the built output described by `request`.
///
/// Nothing is modified if the safety check fails. If replacing the contents
/// fails, every change made so far is undone and the original error is
/// returned, or [`TransactionError::FatalRecovery`] if the undo itself failed.
pub fn export_project(request: &ExportRequest, locator: &dyn ContentLocator) -> Result<ExportReport, ExportError> {
  let paths = resolve_destinations(request, locator)?;
  let mut manifest = OwnershipManifest::load(&request.manifest_path);
  check_safety(&manifest, request, &paths)?;

  info!(
    target = %request.target.target,
    bp = %paths.bp.display(),
    rp = %paths.rp.display(),
    "exporting project"
  );

  let mut tx = Transaction::begin(&request.backup_dir)?;
  let placed = match place(&mut tx, request, &paths) {
    Ok(placed) => placed,
    Err(err) => {
      error!(error = %err, "export failed, reverting changes");
      tx.undo()?;
      return Err(err.into());
    }
  };

  let mut read_only_files = 0;
  if request.target.read_only {
    read_only_files += mark_read_only(&paths.bp);
    read_only_files += mark_read_only(&paths.rp);
  }

  // The destinations are final from here on; keep the manifest in step with
  // them even if the backup directory cannot be removed.
  let committed = tx.commit();

  manifest
    .update_from_paths(&[
      (OutputKind::Behavior, paths.bp.as_path()),
      (OutputKind::Resource, paths.rp.as_path()),
    ])
    .map_err(ExportError::Manifest)?;
  manifest.dump(&request.manifest_path).map_err(ExportError::Manifest)?;
  committed?;

  let report = ExportReport {
    target: request.target.target.clone(),
    behavior_pack: DestinationReport::new(paths.bp, placed.bp),
    resource_pack: DestinationReport::new(paths.rp, placed.rp),
    data: placed.data.map(|(path, stats)| DestinationReport::new(path, stats)),
    read_only_files,
  };
  info!(
    bp_files = report.behavior_pack.files,
    rp_files = report.resource_pack.files,
    "export complete"
  );
  Ok(report)
}
