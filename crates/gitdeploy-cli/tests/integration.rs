//! Integration tests for the gitdeploy CLI.
//!
//! The update tests run real git against a local bare repository standing in
//! for the remote.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use serial_test::serial;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command as StdCommand;
use tempfile::TempDir;

/// Helper to run git in `dir`.
fn git(dir: &Path, args: &[&str]) {
    let status = StdCommand::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run git");
    assert!(status.status.success(), "git {args:?} failed: {status:?}");
}

/// Helper to create a bare "remote" with one commit on `main`.
fn setup_origin(root: &Path) -> PathBuf {
    let work = root.join("work");
    fs::create_dir_all(&work).unwrap();
    git(&work, &["init"]);
    git(&work, &["config", "user.email", "test@example.com"]);
    git(&work, &["config", "user.name", "Test User"]);
    fs::write(work.join("index.html"), "<h1>hello</h1>\n").unwrap();
    git(&work, &["add", "."]);
    git(&work, &["commit", "-m", "Initial commit"]);
    git(&work, &["branch", "-M", "main"]);

    let origin = root.join("origin.git");
    git(root, &["clone", "--bare", "work", "origin.git"]);
    origin
}

/// Helper to write a config file and return its path.
fn write_config(root: &Path, repos: &serde_json::Value) -> PathBuf {
    let config = serde_json::json!({
        "repos": repos,
        "web-access-key": "s3cret",
        "known-hosts": ["example.com ssh-ed25519 AAAA"],
        "private-key": ["-----BEGIN KEY-----", "abc", "-----END KEY-----"],
        "scratch-dir": root.join("scratch"),
    });
    let path = root.join("config.json");
    fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
    path
}

fn site_repo(root: &Path, origin: &Path, hooks: &[&str]) -> serde_json::Value {
    serde_json::json!({
        "name": "site",
        "id": "site",
        "branch": "main",
        "location": root.join("deploy/site"),
        "remote": origin,
        "hooks": { "post-update": hooks },
    })
}

/// Count files left under the scratch dir.
fn scratch_files(dir: &Path) -> usize {
    if !dir.exists() {
        return 0;
    }
    fs::read_dir(dir)
        .unwrap()
        .map(|e| {
            let path = e.unwrap().path();
            if path.is_dir() { scratch_files(&path) } else { 1 }
        })
        .sum()
}

/// Helper to get gitdeploy command.
fn gitdeploy() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_gitdeploy"));
    cmd.env_remove("GITDEPLOY_CONFIG")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

// ============================================================================
// Basic CLI tests
// ============================================================================

#[test]
fn test_version_flag() {
    gitdeploy()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("gitdeploy"));
}

#[test]
fn test_help_lists_commands() {
    gitdeploy()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("update"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("serve"));
}

#[test]
fn test_update_requires_targets() {
    gitdeploy().arg("update").assert().failure();
}

#[test]
fn test_missing_config_file() {
    let temp = TempDir::new().unwrap();
    gitdeploy()
        .args(["--config"])
        .arg(temp.path().join("nope.json"))
        .args(["update", "site"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
#[serial]
fn test_config_from_environment() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), &serde_json::json!([]));

    gitdeploy()
        .env("GITDEPLOY_CONFIG", &config)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No repositories configured"));
}

#[test]
fn test_unknown_repository_id() {
    let temp = TempDir::new().unwrap();
    let origin = temp.path().join("origin.git");
    let config = write_config(temp.path(), &serde_json::json!([site_repo(temp.path(), &origin, &[])]));

    gitdeploy()
        .arg("--config")
        .arg(&config)
        .args(["update", "site", "blog"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("repository not found: blog"));

    assert!(!temp.path().join("deploy/site").exists());
}

#[test]
fn test_list_shows_repositories() {
    let temp = TempDir::new().unwrap();
    let origin = temp.path().join("origin.git");
    let config = write_config(
        temp.path(),
        &serde_json::json!([site_repo(temp.path(), &origin, &["make -C [[location]]"])]),
    );

    gitdeploy()
        .arg("--config")
        .arg(&config)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("[site / origin main]"))
        .stdout(predicate::str::contains("hook: make -C [[location]]"));
}

#[test]
fn test_list_json() {
    let temp = TempDir::new().unwrap();
    let origin = temp.path().join("origin.git");
    let config = write_config(temp.path(), &serde_json::json!([site_repo(temp.path(), &origin, &[])]));

    let output = gitdeploy()
        .arg("--config")
        .arg(&config)
        .args(["list", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed[0]["id"], "site");
    assert_eq!(parsed[0]["branch"], "main");
    assert_eq!(parsed[0]["remote_name"], "origin");
}

#[test]
fn test_duplicate_ids_rejected() {
    let temp = TempDir::new().unwrap();
    let origin = temp.path().join("origin.git");
    let repo = site_repo(temp.path(), &origin, &[]);
    let config = write_config(temp.path(), &serde_json::json!([repo.clone(), repo]));

    gitdeploy()
        .arg("--config")
        .arg(&config)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("duplicate repository id: site"));
}

#[test]
fn test_completions() {
    gitdeploy()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gitdeploy"));
}

// ============================================================================
// Update against a real git remote
// ============================================================================

#[test]
fn test_update_clones_then_updates() {
    let temp = TempDir::new().unwrap();
    let origin = setup_origin(temp.path());
    let marker = temp.path().join("hook-ran");
    let hook = format!("touch {}", marker.display());
    let config = write_config(temp.path(), &serde_json::json!([site_repo(temp.path(), &origin, &[hook.as_str()])]));
    let location = temp.path().join("deploy/site");

    gitdeploy()
        .arg("--config")
        .arg(&config)
        .args(["update", "site"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated site"));

    assert_eq!(
        fs::read_to_string(location.join("index.html")).unwrap(),
        "<h1>hello</h1>\n"
    );
    assert!(marker.exists());
    assert_eq!(scratch_files(&temp.path().join("scratch")), 0);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(location.join(".git")).unwrap().permissions().mode();
        assert_eq!(mode & 0o055, 0);
    }

    // A second run pulls new commits into the existing checkout.
    let work = temp.path().join("work");
    fs::write(work.join("index.html"), "<h1>v2</h1>\n").unwrap();
    git(&work, &["commit", "-am", "v2"]);
    git(&work, &["push", origin.to_str().unwrap(), "main"]);

    gitdeploy()
        .arg("--config")
        .arg(&config)
        .args(["update", "*"])
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(location.join("index.html")).unwrap(),
        "<h1>v2</h1>\n"
    );
}

#[test]
fn test_update_cleans_untracked_files() {
    let temp = TempDir::new().unwrap();
    let origin = setup_origin(temp.path());
    let config = write_config(temp.path(), &serde_json::json!([site_repo(temp.path(), &origin, &[])]));
    let location = temp.path().join("deploy/site");

    gitdeploy().arg("--config").arg(&config).args(["update", "site"]).assert().success();
    fs::write(location.join("stray.txt"), "left behind").unwrap();
    gitdeploy().arg("--config").arg(&config).args(["update", "site"]).assert().success();

    assert!(!location.join("stray.txt").exists());
}

#[test]
fn test_update_hook_placeholders_stay_single_arguments() {
    let temp = TempDir::new().unwrap();
    let origin = setup_origin(temp.path());
    let config = write_config(
        temp.path(),
        &serde_json::json!([site_repo(temp.path(), &origin, &["touch [[location]]deployed-[[name]]-[[branch]]"])]),
    );

    gitdeploy().arg("--config").arg(&config).args(["update", "site"]).assert().success();

    assert!(temp.path().join("deploy/site/deployed-site-main").exists());
}

#[test]
fn test_failing_hook_fails_update() {
    let temp = TempDir::new().unwrap();
    let origin = setup_origin(temp.path());
    let marker = temp.path().join("never");
    let touch = format!("touch {}", marker.display());
    let config = write_config(
        temp.path(),
        &serde_json::json!([site_repo(temp.path(), &origin, &["false", touch.as_str()])]),
    );

    gitdeploy()
        .arg("--config")
        .arg(&config)
        .args(["update", "site"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("the post-update hook failed with code 1: false"));

    assert!(!marker.exists());
    assert_eq!(scratch_files(&temp.path().join("scratch")), 0);
}

#[test]
fn test_quiet_update_still_shows_failure_output() {
    let temp = TempDir::new().unwrap();
    let origin = setup_origin(temp.path());
    let config = write_config(
        temp.path(),
        &serde_json::json!([site_repo(temp.path(), &origin, &["sh -c 'echo hook-broke; exit 3'"])]),
    );

    gitdeploy()
        .arg("--config")
        .arg(&config)
        .args(["--quiet", "update", "site"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("The command returned 3."))
        .stderr(predicate::str::contains("hook-broke"));
}

#[test]
fn test_location_that_is_not_a_checkout() {
    let temp = TempDir::new().unwrap();
    let origin = setup_origin(temp.path());
    let config = write_config(temp.path(), &serde_json::json!([site_repo(temp.path(), &origin, &[])]));
    fs::create_dir_all(temp.path().join("deploy/site")).unwrap();

    gitdeploy()
        .arg("--config")
        .arg(&config)
        .args(["update", "site"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a git repository"));
}

#[test]
fn test_update_json_report() {
    let temp = TempDir::new().unwrap();
    let origin = setup_origin(temp.path());
    let config = write_config(temp.path(), &serde_json::json!([site_repo(temp.path(), &origin, &[])]));

    let output = gitdeploy()
        .arg("--config")
        .arg(&config)
        .args(["--quiet", "update", "site", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["succeeded"], serde_json::json!(["site"]));
    assert_eq!(parsed["failed"], serde_json::json!([]));
}

#[test]
fn test_check_reports_pending_clone() {
    let temp = TempDir::new().unwrap();
    let origin = temp.path().join("origin.git");
    let config = write_config(temp.path(), &serde_json::json!([site_repo(temp.path(), &origin, &["echo [[name]]"])]));

    gitdeploy()
        .arg("--config")
        .arg(&config)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("will be cloned"))
        .stdout(predicate::str::contains("hook: echo site"));
}

#[test]
fn test_check_flags_bad_hook() {
    let temp = TempDir::new().unwrap();
    let origin = temp.path().join("origin.git");
    let config = write_config(temp.path(), &serde_json::json!([site_repo(temp.path(), &origin, &["echo 'oops"])]));

    gitdeploy()
        .arg("--config")
        .arg(&config)
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid hook command"));
}
