use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::CONFIG_FILENAME;
use crate::export::ExportTarget;

use super::ProjectError;

/// Contents of a project's `config.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
  pub name: String,
  #[serde(default)]
  pub author: String,
  #[serde(default)]
  pub packs: Packs,
  /// Directory with data that pipeline steps may read and rewrite.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub data_path: Option<String>,
  /// Keep the cache area in the user cache directory instead of the project.
  #[serde(default)]
  pub use_app_data: bool,
  #[serde(default)]
  pub profiles: BTreeMap<String, Profile>,
}

/// Source pack directories, relative to the project root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Packs {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub behavior_pack: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub resource_pack: Option<String>,
}

/// A named pipeline: the steps to run and where to export the result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
  pub export: ExportTarget,
  #[serde(default)]
  pub steps: Vec<Step>,
}

/// An external command run over the working copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
  pub name: String,
  pub command: String,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub args: Vec<String>,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub env: BTreeMap<String, String>,
  #[serde(default, skip_serializing_if = "std::ops::Not::not")]
  pub disabled: bool,
}

fn resolve(root: &Path, configured: Option<&str>) -> Option<PathBuf> {
  let configured = configured.filter(|s| !s.is_empty())?;
  let path = Path::new(configured);
  Some(if path.is_absolute() {
    path.to_path_buf()
  } else {
    root.join(path)
  })
}

impl ProjectConfig {
  /// Read `config.json` from `root`.
  pub fn load(root: &Path) -> Result<Self, ProjectError> {
    let path = root.join(CONFIG_FILENAME);
    let content = match fs::read_to_string(&path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(ProjectError::NotFound { path }),
      Err(source) => return Err(ProjectError::Read { path, source }),
    };
    let config: Self = serde_json::from_str(&content).map_err(|source| ProjectError::Parse {
      path: path.clone(),
      source,
    })?;
    debug!(path = %path.display(), profiles = config.profiles.len(), "loaded project config");
    Ok(config)
  }

  pub fn to_json(&self) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(self)
  }

  pub fn profile(&self, name: &str) -> Result<&Profile, ProjectError> {
    self.profiles.get(name).ok_or_else(|| ProjectError::UnknownProfile {
      name: name.to_string(),
      available: self.profiles.keys().cloned().collect::<Vec<_>>().join(", "),
    })
  }

  pub fn behavior_pack_dir(&self, root: &Path) -> Option<PathBuf> {
    resolve(root, self.packs.behavior_pack.as_deref())
  }

  pub fn resource_pack_dir(&self, root: &Path) -> Option<PathBuf> {
    resolve(root, self.packs.resource_pack.as_deref())
  }

  pub fn data_dir(&self, root: &Path) -> Option<PathBuf> {
    resolve(root, self.data_path.as_deref())
  }

  /// Check that every configured source directory exists.
  pub fn validate(&self, root: &Path) -> Result<(), ProjectError> {
    if self.name.trim().is_empty() {
      return Err(ProjectError::Invalid("\"name\" must not be empty".to_string()));
    }
    if self.behavior_pack_dir(root).is_none() && self.resource_pack_dir(root).is_none() {
      return Err(ProjectError::Invalid(
        "at least one of packs.behaviorPack or packs.resourcePack must be set".to_string(),
      ));
    }
    let configured = [
      self.behavior_pack_dir(root),
      self.resource_pack_dir(root),
      self.data_dir(root),
    ];
    for dir in configured.into_iter().flatten() {
      if !dir.is_dir() {
        return Err(ProjectError::MissingDirectory { path: dir });
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use tempfile::TempDir;

  use super::*;
  use crate::export::TargetKind;

  const SAMPLE: &str = r#"{
    "name": "demo",
    "author": "someone",
    "packs": { "behaviorPack": "./packs/BP", "resourcePack": "./packs/RP" },
    "dataPath": "./packs/data",
    "profiles": {
      "default": {
        "export": { "target": "local" },
        "steps": [
          { "name": "lint", "command": "lint-packs", "args": ["--strict"], "env": { "LEVEL": "2" } },
          { "name": "old", "command": "legacy", "disabled": true }
        ]
      },
      "release": {
        "export": { "target": "exact", "bpPath": "/out/bp", "rpPath": "/out/rp", "readOnly": true }
      }
    }
  }"#;

  fn write_config(content: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(CONFIG_FILENAME), content).unwrap();
    temp
  }

  #[test]
  fn load_parses_camel_case_fields() {
    let temp = write_config(SAMPLE);

    let config = ProjectConfig::load(temp.path()).unwrap();

    assert_eq!(config.name, "demo");
    assert_eq!(config.packs.behavior_pack.as_deref(), Some("./packs/BP"));
    assert!(!config.use_app_data);
    let default = config.profile("default").unwrap();
    assert_eq!(default.export.kind().unwrap(), TargetKind::Local);
    assert_eq!(default.steps.len(), 2);
    assert_eq!(default.steps[0].args, vec!["--strict"]);
    assert_eq!(default.steps[0].env.get("LEVEL").map(String::as_str), Some("2"));
    assert!(default.steps[1].disabled);
    let release = config.profile("release").unwrap();
    assert!(release.export.read_only);
    assert_eq!(release.export.rp_path.as_deref(), Some("/out/rp"));
  }

  #[test]
  fn load_missing_config() {
    let temp = TempDir::new().unwrap();

    let err = ProjectConfig::load(temp.path()).unwrap_err();

    assert!(matches!(err, ProjectError::NotFound { path } if path == temp.path().join(CONFIG_FILENAME)));
  }

  #[test]
  fn load_invalid_json() {
    let temp = write_config("{ \"name\": ");

    let err = ProjectConfig::load(temp.path()).unwrap_err();

    assert!(matches!(err, ProjectError::Parse { .. }));
  }

  #[test]
  fn unknown_profile_lists_available() {
    let temp = write_config(SAMPLE);
    let config = ProjectConfig::load(temp.path()).unwrap();

    let err = config.profile("nightly").unwrap_err();

    assert_eq!(
      err.to_string(),
      "profile \"nightly\" not found in config.json (available: default, release)"
    );
  }

  #[test]
  fn pack_dirs_resolve_against_root() {
    let temp = write_config(SAMPLE);
    let config = ProjectConfig::load(temp.path()).unwrap();

    assert_eq!(config.behavior_pack_dir(temp.path()), Some(temp.path().join("./packs/BP")));
    assert_eq!(config.data_dir(temp.path()), Some(temp.path().join("./packs/data")));
  }

  #[test]
  fn validate_requires_existing_pack_dirs() {
    let temp = write_config(SAMPLE);
    let config = ProjectConfig::load(temp.path()).unwrap();
    fs::create_dir_all(temp.path().join("packs/BP")).unwrap();
    fs::create_dir_all(temp.path().join("packs/data")).unwrap();

    let err = config.validate(temp.path()).unwrap_err();
    assert!(matches!(err, ProjectError::MissingDirectory { ref path } if path.ends_with("packs/RP")));

    fs::create_dir_all(temp.path().join("packs/RP")).unwrap();
    config.validate(temp.path()).unwrap();
  }

  #[test]
  fn validate_requires_a_pack() {
    let config = ProjectConfig {
      name: "demo".to_string(),
      ..Default::default()
    };

    let err = config.validate(Path::new("/project")).unwrap_err();

    assert!(matches!(err, ProjectError::Invalid(_)));
  }

  #[test]
  fn serialized_config_omits_defaults() {
    let config = ProjectConfig {
      name: "demo".to_string(),
      ..Default::default()
    };

    let json = config.to_json().unwrap();

    assert!(!json.contains("dataPath"));
    assert!(json.contains("\"useAppData\": false"));
  }
}
