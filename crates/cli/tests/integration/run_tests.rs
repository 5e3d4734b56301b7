use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn run_exports_to_build_dir() {
  let env = TestEnv::local();

  env
    .packforge_cmd()
    .arg("run")
    .assert()
    .success()
    .stdout(predicate::str::contains("Exported profile \"default\""));

  assert_eq!(env.read("build/BP/scripts/main.js"), "// main");
  assert_eq!(env.read("build/RP/manifest.json"), "{\"rp\": 1}");
  assert!(env.exists(".packforge/cache/owned_files.json"));
  assert!(!env.exists(".packforge/backup"));
  assert_eq!(env.read("packs/BP/scripts/main.js"), "// main");
}

#[test]
fn second_run_replaces_previous_export() {
  let env = TestEnv::local();
  env.packforge_cmd().arg("run").assert().success();
  std::fs::remove_file(env.project().join("packs/BP/scripts/main.js")).unwrap();

  env.packforge_cmd().arg("run").assert().success();

  assert!(!env.exists("build/BP/scripts/main.js"));
  assert!(env.exists("build/BP/manifest.json"));
}

#[test]
fn run_refuses_to_overwrite_foreign_files() {
  let env = TestEnv::local();
  env.write_file("project/build/BP/mine.txt", "do not delete");

  env
    .packforge_cmd()
    .arg("run")
    .assert()
    .failure()
    .stderr(predicate::str::contains("mine.txt"))
    .stderr(predicate::str::contains("owned_files.json"));

  assert_eq!(env.read("build/BP/mine.txt"), "do not delete");
  assert!(!env.exists("build/RP"));
}

#[test]
fn run_json_output_is_valid() {
  let env = TestEnv::local();

  let output = env.packforge_cmd().args(["run", "-o", "json"]).output().unwrap();

  assert!(output.status.success());
  let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(report["profile"], "default");
  assert_eq!(report["export"]["behavior_pack"]["files"], 2);
}

#[test]
fn run_development_target_uses_content_dir() {
  let env = TestEnv::local();

  env.packforge_cmd().args(["run", "dev"]).assert().success();

  let bp = env.content_path().join("development_behavior_packs/demo_bp/manifest.json");
  assert!(bp.exists());
}

#[test]
fn run_unknown_profile_fails() {
  let env = TestEnv::local();

  env
    .packforge_cmd()
    .args(["run", "nightly"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("available: default, dev"));
}

#[test]
#[cfg(unix)]
fn failing_step_stops_the_run() {
  let env = TestEnv::with_config(
    r#"{
      "name": "demo",
      "packs": { "behaviorPack": "./packs/BP", "resourcePack": "./packs/RP" },
      "profiles": {
        "default": {
          "export": { "target": "local" },
          "steps": [{ "name": "boom", "command": "/bin/sh", "args": ["-c", "echo step-says-hi; exit 4"] }]
        }
      }
    }"#,
  );

  env
    .packforge_cmd()
    .arg("run")
    .assert()
    .failure()
    .stderr(predicate::str::contains("step-says-hi"))
    .stderr(predicate::str::contains("exit code 4"));

  assert!(!env.exists("build"));
}
