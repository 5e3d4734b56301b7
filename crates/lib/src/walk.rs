//! Deterministic postorder directory traversal.
//!
//! [`PathWalker`] yields every entry under a root with all descendants of a
//! directory before the directory itself, and the root last. Children are
//! visited in sorted file-name order so that the sequence is reproducible.
//!
//! Directory-level moves and deletes are built on top of this: walking leaves
//! first turns one big non-undoable operation into many single-entry steps,
//! each of which can be reverted on its own.
//!
//! Errors (permission denied, entries vanishing mid-walk, a missing root) are
//! yielded in-line instead of aborting the walk; the caller decides whether to
//! keep going. Symbolic links are reported as such and never followed.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

/// Failure to read an entry during a walk.
#[derive(Debug, Error)]
#[error("failed to walk {}: {source}", path.display())]
pub struct WalkError {
  /// The path that could not be read.
  pub path: PathBuf,
  #[source]
  pub source: io::Error,
}

impl WalkError {
  /// Whether the entry did not exist (e.g. a missing walk root).
  pub fn is_not_found(&self) -> bool {
    self.source.kind() == io::ErrorKind::NotFound
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
  File,
  Dir,
  Symlink,
}

/// A single entry yielded by [`PathWalker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
  pub path: PathBuf,
  pub kind: EntryKind,
  /// Distance from the walk root (the root itself has depth 0).
  pub depth: usize,
}

impl WalkEntry {
  pub fn is_dir(&self) -> bool {
    self.kind == EntryKind::Dir
  }
}

/// Lazy postorder walk over a directory tree.
///
/// Not restartable: create a new walker to traverse again.
pub struct PathWalker {
  root: PathBuf,
  inner: walkdir::IntoIter,
}

impl PathWalker {
  pub fn new(root: impl AsRef<Path>) -> Self {
    let root = root.as_ref().to_path_buf();
    let inner = WalkDir::new(&root)
      .follow_links(false)
      .contents_first(true)
      .sort_by_file_name()
      .into_iter();
    Self { root, inner }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }
}

impl Iterator for PathWalker {
  type Item = Result<WalkEntry, WalkError>;

  fn next(&mut self) -> Option<Self::Item> {
    let item = self.inner.next()?;
    Some(match item {
      Ok(entry) => {
        let file_type = entry.file_type();
        let kind = if file_type.is_symlink() {
          EntryKind::Symlink
        } else if file_type.is_dir() {
          EntryKind::Dir
        } else {
          EntryKind::File
        };
        Ok(WalkEntry {
          depth: entry.depth(),
          path: entry.into_path(),
          kind,
        })
      }
      Err(err) => {
        let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| self.root.clone());
        let source = err
          .into_io_error()
          .unwrap_or_else(|| io::Error::other("filesystem loop detected"));
        Err(WalkError { path, source })
      }
    })
  }
}

/// Walk `root` in postorder. Shorthand for [`PathWalker::new`].
pub fn walk_postorder(root: impl AsRef<Path>) -> PathWalker {
  PathWalker::new(root)
}

/// Path of `path` relative to `base`, joined with `/` regardless of platform.
///
/// Returns `None` when `path` is not inside `base`.
pub fn relative_slash_path(base: &Path, path: &Path) -> Option<String> {
  let rel = path.strip_prefix(base).ok()?;
  let parts: Vec<String> = rel
    .components()
    .map(|c| c.as_os_str().to_string_lossy().into_owned())
    .collect();
  Some(parts.join("/"))
}
