//! Record of the files each export placed in its destinations.
//!
//! Before an export clears a destination, [`OwnershipManifest::check_deletion_safety`]
//! verifies that every file currently there was put there by an earlier
//! export. Anything else (a user's own pack, a hand edit) aborts the export
//! before a single file is touched.
//!
//! # Storage
//!
//! ```text
//! <workspace>/cache/owned_files.json
//! {
//!   "bp": { "<destination>": ["manifest.json", "scripts/main.js"] },
//!   "rp": { "<destination>": [...] }
//! }
//! ```

mod types;

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::walk::{relative_slash_path, walk_postorder};

pub use types::{OutputKind, OwnershipError, path_order};

/// Per-destination lists of tool-owned files.
///
/// Lists are kept sorted with [`path_order`] and free of duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipManifest {
  #[serde(default)]
  bp: BTreeMap<String, Vec<String>>,
  #[serde(default)]
  rp: BTreeMap<String, Vec<String>>,
}

/// Manifest key for a destination directory.
fn destination_key(dir: &Path) -> String {
  dir.components().collect::<PathBuf>().to_string_lossy().into_owned()
}

fn normalize(mut files: Vec<String>) -> Vec<String> {
  files.sort_by(|a, b| path_order(a, b));
  files.dedup();
  files
}

impl OwnershipManifest {
  pub fn new() -> Self {
    Self::default()
  }

  /// Load the manifest from `path`.
  ///
  /// A missing or unreadable file yields an empty manifest, which makes the
  /// next export behave like a first export.
  pub fn load(path: &Path) -> Self {
    let content = match fs::read_to_string(path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        debug!(path = %path.display(), "no ownership manifest yet");
        return Self::default();
      }
      Err(e) => {
        warn!(path = %path.display(), error = %e, "failed to read ownership manifest, starting empty");
        return Self::default();
      }
    };

    match serde_json::from_str::<Self>(&content) {
      Ok(manifest) => Self {
        bp: manifest.bp.into_iter().map(|(k, v)| (k, normalize(v))).collect(),
        rp: manifest.rp.into_iter().map(|(k, v)| (k, normalize(v))).collect(),
      },
      Err(e) => {
        warn!(path = %path.display(), error = %e, "failed to parse ownership manifest, starting empty");
        Self::default()
      }
    }
  }

  /// Write the manifest to `path` as pretty JSON.
  ///
  /// Uses atomic write (write to temp, then rename) to prevent corruption.
  pub fn dump(&self, path: &Path) -> Result<(), OwnershipError> {
    let write_err = |source| OwnershipError::Write {
      path: path.to_path_buf(),
      source,
    };

    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).map_err(write_err)?;
    }

    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    let content = serde_json::to_string_pretty(self).map_err(OwnershipError::Serialize)?;
    fs::write(&temp_path, &content).map_err(write_err)?;
    fs::rename(&temp_path, path).map_err(write_err)?;

    debug!(path = %path.display(), "saved ownership manifest");
    Ok(())
  }

  fn map(&self, kind: OutputKind) -> &BTreeMap<String, Vec<String>> {
    match kind {
      OutputKind::Behavior => &self.bp,
      OutputKind::Resource => &self.rp,
    }
  }

  fn map_mut(&mut self, kind: OutputKind) -> &mut BTreeMap<String, Vec<String>> {
    match kind {
      OutputKind::Behavior => &mut self.bp,
      OutputKind::Resource => &mut self.rp,
    }
  }

  /// Files recorded for `dir`, sorted. Empty if the destination is unknown.
  pub fn files(&self, kind: OutputKind, dir: &Path) -> &[String] {
    self
      .map(kind)
      .get(&destination_key(dir))
      .map(Vec::as_slice)
      .unwrap_or_default()
  }

  /// Replace the recorded files for `dir`.
  pub fn set_files(&mut self, kind: OutputKind, dir: &Path, files: Vec<String>) {
    self.map_mut(kind).insert(destination_key(dir), normalize(files));
  }

  /// Destinations with a recorded list, in key order.
  pub fn destinations(&self, kind: OutputKind) -> impl Iterator<Item = &str> {
    self.map(kind).keys().map(String::as_str)
  }

  pub fn is_empty(&self) -> bool {
    self.bp.is_empty() && self.rp.is_empty()
  }

  /// Verify that clearing each destination would only remove owned files.
  ///
  /// Stops at the first destination that holds a file not in its list.
  pub fn check_deletion_safety(&self, destinations: &[(OutputKind, &Path)]) -> Result<(), OwnershipError> {
    for (kind, dir) in destinations {
      self.check_destination(*kind, dir)?;
    }
    Ok(())
  }

  /// Safety check for a single destination.
  ///
  /// A missing directory passes. Both the live walk and the recorded list are
  /// in [`path_order`], so one merge pass decides.
  pub fn check_destination(&self, kind: OutputKind, dir: &Path) -> Result<(), OwnershipError> {
    match fs::metadata(dir) {
      Ok(metadata) if metadata.is_dir() => {}
      Ok(_) => return Err(OwnershipError::NotADirectory { path: dir.to_path_buf() }),
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
      Err(source) => {
        return Err(OwnershipError::Inspect {
          path: dir.to_path_buf(),
          source,
        });
      }
    }

    let mut owned = self.files(kind, dir).iter().peekable();
    for live in list_files(dir)? {
      while owned
        .peek()
        .is_some_and(|recorded| path_order(recorded, &live).is_lt())
      {
        owned.next();
      }
      match owned.peek() {
        Some(recorded) if **recorded == live => {
          owned.next();
        }
        _ => {
          return Err(OwnershipError::Untracked {
            destination: dir.to_path_buf(),
            path: live,
          });
        }
      }
    }

    debug!(kind = %kind, path = %dir.display(), "destination holds only owned files");
    Ok(())
  }

  /// Re-scan each destination and record its current files.
  pub fn update_from_paths(&mut self, destinations: &[(OutputKind, &Path)]) -> Result<(), OwnershipError> {
    for (kind, dir) in destinations {
      let files = match fs::metadata(dir) {
        Ok(metadata) if metadata.is_dir() => list_files(dir)?,
        Ok(_) => return Err(OwnershipError::NotADirectory { path: dir.to_path_buf() }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
        Err(source) => {
          return Err(OwnershipError::Inspect {
            path: dir.to_path_buf(),
            source,
          });
        }
      };
      info!(kind = %kind, path = %dir.display(), files = files.len(), "recorded owned files");
      self.set_files(*kind, dir, files);
    }
    Ok(())
  }
}

/// Every non-directory entry under `dir`, as `/`-joined relative paths in
/// [`path_order`].
pub fn list_files(dir: &Path) -> Result<Vec<String>, OwnershipError> {
  let mut files = Vec::new();
  for entry in walk_postorder(dir) {
    let entry = entry?;
    if entry.is_dir() {
      continue;
    }
    if let Some(rel) = relative_slash_path(dir, &entry.path) {
      files.push(rel);
    }
  }
  Ok(files)
}

#[cfg(test)]
mod tests {
  use tempfile::TempDir;

  use super::*;
  use crate::util::testutil::write_files;

  fn manifest_with(kind: OutputKind, dir: &Path, files: &[&str]) -> OwnershipManifest {
    let mut manifest = OwnershipManifest::new();
    manifest.set_files(kind, dir, files.iter().map(|f| f.to_string()).collect());
    manifest
  }

  #[test]
  fn load_missing_file_is_empty() {
    let temp = TempDir::new().unwrap();
    let manifest = OwnershipManifest::load(&temp.path().join("owned_files.json"));
    assert!(manifest.is_empty());
  }

  #[test]
  fn load_corrupted_file_is_empty() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("owned_files.json");
    fs::write(&path, "{ not json").unwrap();

    assert!(OwnershipManifest::load(&path).is_empty());
  }

  #[test]
  fn load_partial_file_defaults_missing_kind() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("owned_files.json");
    fs::write(&path, r#"{"rp": {"/out/rp": ["b/c.txt", "a.txt", "a.txt"]}}"#).unwrap();

    let manifest = OwnershipManifest::load(&path);

    assert_eq!(manifest.files(OutputKind::Resource, Path::new("/out/rp")), ["a.txt", "b/c.txt"]);
    assert!(manifest.files(OutputKind::Behavior, Path::new("/out/rp")).is_empty());
  }

  #[test]
  fn dump_then_load_keeps_lists() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("cache/owned_files.json");
    let manifest = manifest_with(OutputKind::Behavior, Path::new("/out/bp"), &["z.json", "a/b.js"]);

    manifest.dump(&path).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("\"bp\""));
    assert!(!temp.path().join("cache/owned_files.json.tmp").exists());
    assert_eq!(OwnershipManifest::load(&path), manifest);
  }

  #[test]
  fn set_files_sorts_and_dedups() {
    let manifest = manifest_with(
      OutputKind::Resource,
      Path::new("/out/rp"),
      &["b.txt", "a.txt", "a/x.png", "b.txt"],
    );

    assert_eq!(
      manifest.files(OutputKind::Resource, Path::new("/out/rp")),
      ["a/x.png", "a.txt", "b.txt"]
    );
  }

  #[test]
  fn trailing_separator_maps_to_same_destination() {
    let manifest = manifest_with(OutputKind::Behavior, Path::new("/proj/build/BP/"), &["a.txt"]);
    assert_eq!(manifest.files(OutputKind::Behavior, Path::new("/proj/build/BP")), ["a.txt"]);
  }

  #[test]
  fn check_passes_when_all_files_owned() {
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("rp");
    write_files(&dest, &[("a.txt", "a"), ("b/c.txt", "c")]);
    let manifest = manifest_with(OutputKind::Resource, &dest, &["a.txt", "b/c.txt"]);

    manifest
      .check_deletion_safety(&[(OutputKind::Resource, dest.as_path())])
      .unwrap();
  }

  #[test]
  fn check_fails_on_extra_file() {
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("rp");
    write_files(&dest, &[("a.txt", "a"), ("b/c.txt", "c"), ("d.txt", "d")]);
    let manifest = manifest_with(OutputKind::Resource, &dest, &["a.txt", "b/c.txt"]);

    let err = manifest
      .check_deletion_safety(&[(OutputKind::Resource, dest.as_path())])
      .unwrap_err();

    assert!(matches!(err, OwnershipError::Untracked { ref path, .. } if path == "d.txt"));
  }

  #[test]
  fn check_passes_when_owned_files_were_removed() {
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("rp");
    write_files(&dest, &[("b/c.txt", "c")]);
    let manifest = manifest_with(OutputKind::Resource, &dest, &["a.txt", "b/c.txt", "z.txt"]);

    manifest.check_destination(OutputKind::Resource, &dest).unwrap();
  }

  #[test]
  fn check_orders_nested_paths_like_the_walk() {
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("bp");
    write_files(&dest, &[("a/b", "1"), ("a.txt", "2"), ("a-z/c", "3")]);
    let manifest = manifest_with(OutputKind::Behavior, &dest, &["a-z/c", "a.txt", "a/b"]);

    manifest.check_destination(OutputKind::Behavior, &dest).unwrap();
  }

  #[test]
  fn check_uses_list_of_matching_kind() {
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("out");
    write_files(&dest, &[("a.txt", "a")]);
    let manifest = manifest_with(OutputKind::Behavior, &dest, &["a.txt"]);

    assert!(manifest.check_destination(OutputKind::Resource, &dest).is_err());
  }

  #[test]
  fn check_missing_destination_passes() {
    let temp = TempDir::new().unwrap();
    let manifest = OwnershipManifest::new();
    manifest
      .check_destination(OutputKind::Behavior, &temp.path().join("missing"))
      .unwrap();
  }

  #[test]
  fn check_file_destination_fails() {
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("file");
    fs::write(&dest, "").unwrap();

    let err = OwnershipManifest::new()
      .check_destination(OutputKind::Behavior, &dest)
      .unwrap_err();

    assert!(matches!(err, OwnershipError::NotADirectory { .. }));
  }

  #[test]
  fn empty_directories_do_not_fail_check() {
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("bp");
    fs::create_dir_all(dest.join("empty/nested")).unwrap();

    OwnershipManifest::new()
      .check_destination(OutputKind::Behavior, &dest)
      .unwrap();
  }

  #[test]
  fn update_from_paths_records_current_files() {
    let temp = TempDir::new().unwrap();
    let bp = temp.path().join("bp");
    let rp = temp.path().join("rp");
    write_files(&bp, &[("manifest.json", "{}"), ("scripts/main.js", "")]);
    let mut manifest = manifest_with(OutputKind::Resource, &rp, &["stale.png"]);

    manifest
      .update_from_paths(&[(OutputKind::Behavior, bp.as_path()), (OutputKind::Resource, rp.as_path())])
      .unwrap();

    assert_eq!(
      manifest.files(OutputKind::Behavior, &bp),
      ["manifest.json", "scripts/main.js"]
    );
    assert!(manifest.files(OutputKind::Resource, &rp).is_empty());
    assert_eq!(manifest.destinations(OutputKind::Resource).count(), 1);
  }
}
