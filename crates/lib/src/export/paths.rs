use std::path::PathBuf;

use tracing::debug;

use crate::platform::ContentLocator;

use super::types::{ExportError, ExportPaths, ExportTarget, TargetKind};

const DEV_BP_DIR: &str = "development_behavior_packs";
const DEV_RP_DIR: &str = "development_resource_packs";
const WORLD_BP_DIR: &str = "behavior_packs";
const WORLD_RP_DIR: &str = "resource_packs";

fn non_empty(value: &Option<String>) -> Option<&str> {
  value.as_deref().filter(|s| !s.is_empty())
}

fn pack_dirs(root: PathBuf, bp_dir: &str, rp_dir: &str, project_name: &str) -> ExportPaths {
  ExportPaths {
    bp: root.join(bp_dir).join(format!("{project_name}_bp")),
    rp: root.join(rp_dir).join(format!("{project_name}_rp")),
  }
}

/// Compute the behavior pack and resource pack destinations for `target`.
///
/// The `local` target yields paths relative to the project root; every other
/// target yields whatever the configuration or the locator provides.
pub fn resolve_export_paths(
  target: &ExportTarget,
  project_name: &str,
  locator: &dyn ContentLocator,
) -> Result<ExportPaths, ExportError> {
  let kind = target.kind()?;
  let paths = match kind {
    TargetKind::Development => {
      let content = locator.content_dir()?;
      pack_dirs(content, DEV_BP_DIR, DEV_RP_DIR, project_name)
    }
    TargetKind::Exact => match (non_empty(&target.bp_path), non_empty(&target.rp_path)) {
      (Some(bp), Some(rp)) => ExportPaths {
        bp: PathBuf::from(bp),
        rp: PathBuf::from(rp),
      },
      _ => {
        return Err(ExportError::Config(
          "the \"exact\" export target requires both bpPath and rpPath".to_string(),
        ));
      }
    },
    TargetKind::World => {
      let world = match (non_empty(&target.world_path), non_empty(&target.world_name)) {
        (Some(path), None) => PathBuf::from(path),
        (None, Some(name)) => locator
          .worlds()?
          .into_iter()
          .find(|world| world.name == name)
          .map(|world| world.path)
          .ok_or_else(|| ExportError::WorldNotFound { name: name.to_string() })?,
        _ => {
          return Err(ExportError::Config(
            "the \"world\" export target requires exactly one of worldPath or worldName".to_string(),
          ));
        }
      };
      pack_dirs(world, WORLD_BP_DIR, WORLD_RP_DIR, project_name)
    }
    TargetKind::Local => ExportPaths {
      bp: PathBuf::from("build/BP/"),
      rp: PathBuf::from("build/RP/"),
    },
  };

  debug!(
    target = %kind,
    bp = %paths.bp.display(),
    rp = %paths.rp.display(),
    "resolved export paths"
  );
  Ok(paths)
}
