//! Shared test helpers for CLI integration tests.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Config with a single `default` profile exporting to `build/`.
pub const LOCAL_CONFIG: &str = r#"{
  "name": "demo",
  "packs": { "behaviorPack": "./packs/BP", "resourcePack": "./packs/RP" },
  "dataPath": "./packs/data",
  "profiles": {
    "default": { "export": { "target": "local" } },
    "dev": { "export": { "target": "development" } }
  }
}"#;

/// Isolated test environment.
///
/// Each test gets its own project directory, content directory and user
/// cache directory.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  /// A project using `config` with a small behavior and resource pack.
  pub fn with_config(config: &str) -> Self {
    let env = Self {
      temp: TempDir::new().unwrap(),
    };
    env.write_file("project/config.json", config);
    env.write_file("project/packs/BP/manifest.json", "{\"bp\": 1}");
    env.write_file("project/packs/BP/scripts/main.js", "// main");
    env.write_file("project/packs/RP/manifest.json", "{\"rp\": 1}");
    std::fs::create_dir_all(env.temp.path().join("project/packs/data")).unwrap();
    env
  }

  pub fn local() -> Self {
    Self::with_config(LOCAL_CONFIG)
  }

  /// Write a file relative to the temp directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  /// The project root (canonicalized).
  pub fn project(&self) -> PathBuf {
    let p = self.temp.path().join("project");
    dunce::canonicalize(&p).unwrap_or(p)
  }

  /// Content directory handed to the locator.
  pub fn content_path(&self) -> PathBuf {
    let p = self.temp.path().join("content");
    std::fs::create_dir_all(&p).unwrap();
    dunce::canonicalize(&p).unwrap_or(p)
  }

  pub fn cache_path(&self) -> PathBuf {
    let p = self.temp.path().join("cache");
    std::fs::create_dir_all(&p).unwrap();
    dunce::canonicalize(&p).unwrap_or(p)
  }

  pub fn exists(&self, project_relative: &str) -> bool {
    self.project().join(project_relative).exists()
  }

  pub fn read(&self, project_relative: impl AsRef<Path>) -> String {
    std::fs::read_to_string(self.project().join(project_relative)).unwrap()
  }

  /// Get a pre-configured Command for the packforge binary.
  ///
  /// Runs inside the project directory with:
  /// - `PACKFORGE_CONTENT_DIR`: Isolated content directory
  /// - `XDG_CACHE_HOME` / `LOCALAPPDATA`: Isolated cache path
  pub fn packforge_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("packforge");
    cmd.current_dir(self.project());
    cmd.env("PACKFORGE_CONTENT_DIR", self.content_path());
    cmd.env("XDG_CACHE_HOME", self.cache_path());
    cmd.env("LOCALAPPDATA", self.cache_path()); // For Windows cache
    cmd.env_remove("RUST_LOG");
    cmd
  }
}
