//! Hashing helpers.
//!
//! Used to derive stable identifiers from paths, e.g. the per-project
//! directory name in the shared cache area.

use std::path::Path;

use sha2::{Digest, Sha256};

/// Full lowercase hex SHA-256 of `data`.
pub fn hash_bytes(data: &[u8]) -> String {
  let mut hasher = Sha256::new();
  hasher.update(data);
  hex::encode(hasher.finalize())
}

/// Stable identifier for a project, derived from its absolute root path.
///
/// Two checkouts of the same project in different locations get different ids.
pub fn project_id(root: &Path) -> String {
  hash_bytes(root.to_string_lossy().as_bytes())
}
