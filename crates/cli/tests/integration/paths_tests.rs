use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn paths_shows_local_destinations() {
  let env = TestEnv::local();

  env
    .packforge_cmd()
    .arg("paths")
    .assert()
    .success()
    .stdout(predicate::str::contains("exports to \"local\""))
    .stdout(predicate::str::contains("build"));
}

#[test]
fn paths_json_output_is_valid() {
  let env = TestEnv::local();

  let output = env.packforge_cmd().args(["paths", "dev", "-o", "json"]).output().unwrap();

  assert!(output.status.success());
  let paths: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(paths["target"], "development");
  let bp = paths["bp"].as_str().unwrap();
  assert!(bp.ends_with("demo_bp"));
}

#[test]
fn paths_for_missing_content_dir_fails() {
  let env = TestEnv::local();

  env
    .packforge_cmd()
    .args(["paths", "dev"])
    .env("PACKFORGE_CONTENT_DIR", env.temp.path().join("nowhere"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("content directory not found"));
}
