//! Single-path filesystem helpers used by [`super::Transaction`].
//!
//! None of these record anything; reversibility is the caller's job.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::consts::COPY_BUFFER_SIZE;

use super::types::{TransactionError, io_err};

/// Stream `source` into a newly created `target` through a fixed-size buffer.
///
/// Never overwrites: fails with `AlreadyExists` if `target` exists. A partially
/// written target is removed before the error is returned.
pub(crate) fn copy_file(source: &Path, target: &Path) -> io::Result<u64> {
  let mut reader = File::open(source)?;
  let mut writer = OpenOptions::new().write(true).create_new(true).open(target)?;

  let result = stream(&mut reader, &mut writer).and_then(|written| {
    writer.sync_all()?;
    Ok(written)
  });

  if result.is_err() {
    drop(writer);
    let _ = fs::remove_file(target);
  }
  result
}

fn stream(reader: &mut File, writer: &mut File) -> io::Result<u64> {
  let mut buf = vec![0u8; COPY_BUFFER_SIZE];
  let mut written = 0u64;
  loop {
    let n = match reader.read(&mut buf) {
      Ok(0) => return Ok(written),
      Ok(n) => n,
      Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
      Err(e) => return Err(e),
    };
    writer.write_all(&buf[..n])?;
    written += n as u64;
  }
}

/// Renames one path. Swappable so the copy fallbacks can be exercised.
pub(crate) type RenameFn = dyn Fn(&Path, &Path) -> io::Result<()>;

pub(crate) fn rename(source: &Path, target: &Path) -> io::Result<()> {
  fs::rename(source, target)
}

/// Move `source` to `target`, falling back to copy-then-remove when a rename
/// is impossible (typically across volumes). Directories are moved entry by
/// entry in the fallback.
pub(crate) fn force_move(source: &Path, target: &Path) -> io::Result<()> {
  force_move_with(source, target, &rename)
}

pub(crate) fn force_move_with(source: &Path, target: &Path, rename: &RenameFn) -> io::Result<()> {
  let rename_err = match rename(source, target) {
    Ok(()) => return Ok(()),
    Err(e) => e,
  };

  let metadata = fs::symlink_metadata(source)?;
  debug!(
    source = %source.display(),
    target = %target.display(),
    error = %rename_err,
    "rename failed, moving by copy"
  );

  if metadata.is_dir() {
    fs::create_dir_all(target)?;
    for entry in fs::read_dir(source)? {
      let entry = entry?;
      force_move_with(&entry.path(), &target.join(entry.file_name()), rename)?;
    }
    fs::remove_dir(source)
  } else if metadata.is_file() {
    copy_file(source, target)?;
    fs::remove_file(source)
  } else {
    // Links and special files cannot be reproduced by copying bytes.
    Err(rename_err)
  }
}

/// The shallowest ancestor of `path` (or `path` itself) that does not exist.
///
/// Returns `Ok(None)` if the whole path exists. An existing non-directory on
/// the way is an error, since nothing can be created below it.
pub(crate) fn first_missing_ancestor(path: &Path) -> Result<Option<PathBuf>, TransactionError> {
  let mut ancestors: Vec<&Path> = path.ancestors().filter(|a| !a.as_os_str().is_empty()).collect();
  ancestors.reverse();

  for ancestor in ancestors {
    match fs::metadata(ancestor) {
      Ok(metadata) if metadata.is_dir() => continue,
      Ok(_) => {
        return Err(TransactionError::NotADirectory {
          path: ancestor.to_path_buf(),
        });
      }
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Some(ancestor.to_path_buf())),
      Err(e) => return Err(io_err("inspect", ancestor)(e)),
    }
  }

  Ok(None)
}

pub(crate) fn is_dir_empty(path: &Path) -> io::Result<bool> {
  Ok(fs::read_dir(path)?.next().is_none())
}

/// Whether anything (including a dangling symlink) exists at `path`.
pub(crate) fn exists(path: &Path) -> Result<bool, TransactionError> {
  match fs::symlink_metadata(path) {
    Ok(_) => Ok(true),
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
    Err(e) => Err(io_err("inspect", path)(e)),
  }
}

pub(crate) fn absolute(path: &Path) -> Result<PathBuf, TransactionError> {
  std::path::absolute(path).map_err(io_err("resolve", path))
}
