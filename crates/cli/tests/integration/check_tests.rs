use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn check_passes_before_first_export() {
  let env = TestEnv::local();

  env
    .packforge_cmd()
    .arg("check")
    .assert()
    .success()
    .stdout(predicate::str::contains("can be exported safely"));
}

#[test]
fn check_reports_untracked_file() {
  let env = TestEnv::local();
  env.packforge_cmd().arg("run").assert().success();
  env.write_file("project/build/RP/textures/hand_made.png", "png");

  env
    .packforge_cmd()
    .arg("check")
    .assert()
    .failure()
    .stderr(predicate::str::contains("textures/hand_made.png"));

  assert!(env.exists("build/RP/textures/hand_made.png"));
}

#[test]
fn check_warns_about_leftover_backup() {
  let env = TestEnv::local();
  env.write_file("project/.packforge/backup/0_manifest.json", "{}");

  env
    .packforge_cmd()
    .arg("check")
    .assert()
    .success()
    .stderr(predicate::str::contains("clean --force"));
}
