use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn clean_removes_working_copy() {
  let env = TestEnv::local();
  env.packforge_cmd().arg("run").assert().success();
  assert!(env.exists(".packforge/tmp"));

  env
    .packforge_cmd()
    .arg("clean")
    .assert()
    .success()
    .stdout(predicate::str::contains("Clean complete"));

  assert!(!env.exists(".packforge/tmp"));
  assert!(env.exists(".packforge/cache/owned_files.json"));
}

#[test]
fn clean_keeps_backup_without_force() {
  let env = TestEnv::local();
  env.write_file("project/.packforge/backup/0_manifest.json", "{}");

  env
    .packforge_cmd()
    .arg("clean")
    .assert()
    .success()
    .stderr(predicate::str::contains("--force"));

  assert!(env.exists(".packforge/backup/0_manifest.json"));

  env.packforge_cmd().args(["clean", "--force"]).assert().success();

  assert!(!env.exists(".packforge/backup"));
}

#[test]
fn clean_dry_run_shows_what_would_be_removed() {
  let env = TestEnv::local();
  env.write_file("project/.packforge/tmp/BP/a.json", "{}");

  env
    .packforge_cmd()
    .args(["clean", "--dry-run"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Dry run"));

  assert!(env.exists(".packforge/tmp/BP/a.json"));
}

#[test]
fn clean_json_output_is_valid() {
  let env = TestEnv::local();

  env
    .packforge_cmd()
    .args(["clean", "-o", "json"])
    .assert()
    .success()
    .stdout(predicate::str::contains("dirs_removed"))
    .stdout(predicate::str::contains("kept_paths"));
}
