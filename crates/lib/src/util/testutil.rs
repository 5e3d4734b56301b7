//! Test helpers shared by the library's unit tests.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::platform::{ContentLocator, LocateError, World};

/// A file tree reduced to comparable values.
///
/// Keys are `/`-joined paths relative to the root; directories map to `None`,
/// files to their bytes, symlinks to their target prefixed with `->`.
pub type TreeSnapshot = BTreeMap<String, Option<Vec<u8>>>;

/// Capture every entry under `root` (the root itself excluded).
///
/// A missing root yields an empty snapshot.
pub fn snapshot_tree(root: &Path) -> TreeSnapshot {
  let mut snapshot = TreeSnapshot::new();
  if fs::symlink_metadata(root).is_err() {
    return snapshot;
  }
  for entry in WalkDir::new(root).follow_links(false).min_depth(1) {
    let entry = entry.unwrap();
    let rel = crate::walk::relative_slash_path(root, entry.path()).unwrap();
    let file_type = entry.file_type();
    let value = if file_type.is_dir() {
      None
    } else if file_type.is_symlink() {
      let target = fs::read_link(entry.path()).unwrap();
      Some(format!("->{}", target.display()).into_bytes())
    } else {
      Some(fs::read(entry.path()).unwrap())
    };
    snapshot.insert(rel, value);
  }
  snapshot
}

/// Write `files` (relative path, contents) under `root`, creating parents.
pub fn write_files(root: &Path, files: &[(&str, &str)]) {
  for (rel, contents) in files {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
  }
}

/// A [`ContentLocator`] with a fixed content directory and world list.
pub struct FixedLocator {
  pub content_dir: PathBuf,
  pub worlds: Vec<World>,
}

impl FixedLocator {
  pub fn new(content_dir: impl Into<PathBuf>) -> Self {
    Self {
      content_dir: content_dir.into(),
      worlds: Vec::new(),
    }
  }

  pub fn with_world(mut self, name: &str, path: impl Into<PathBuf>) -> Self {
    self.worlds.push(World {
      name: name.to_string(),
      path: path.into(),
    });
    self
  }
}

impl ContentLocator for FixedLocator {
  fn content_dir(&self) -> Result<PathBuf, LocateError> {
    Ok(self.content_dir.clone())
  }

  fn worlds(&self) -> Result<Vec<World>, LocateError> {
    Ok(self.worlds.clone())
  }
}

/// Returns the shell command and args to execute a shell script.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), script.to_string()])
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), script.to_string()])
}
