//! Binary smoke tests driving the full lifecycle through the CLI
//! against the sandbox TMS backend.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use tempfile::TempDir;

fn locsync(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("locsync").unwrap();
    cmd.current_dir(root);
    cmd
}

fn stdout_of(assert: assert_cmd::assert::Assert) -> String {
    String::from_utf8(assert.get_output().stdout.clone()).unwrap()
}

fn init_project(root: &Path) {
    locsync(root)
        .args([
            "init",
            "--project-id",
            "proj-1",
            "--source-locale",
            "en",
            "--target-locale",
            "de",
            "--target-locale",
            "es",
        ])
        .assert()
        .success();
}

#[test]
fn test_version_runs() {
    let mut cmd = Command::cargo_bin("locsync").unwrap();
    let out = stdout_of(cmd.args(["--json", "version"]).assert().success());
    assert!(out.contains("locsync"));
}

#[test]
fn test_init_is_guarded_against_rerun() {
    let dir = TempDir::new().unwrap();
    init_project(dir.path());

    assert!(dir.path().join(".locsync/config.json").is_file());
    assert!(dir.path().join(".locsync/locsync.db").is_file());

    // Second init without --force fails with the database exit code.
    locsync(dir.path())
        .args(["init", "--project-id", "proj-1", "--target-locale", "de"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_full_lifecycle_through_sandbox() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("docs")).unwrap();
    fs::write(dir.path().join("docs/guide.md"), "# hello").unwrap();
    init_project(dir.path());

    locsync(dir.path())
        .args(["document", "upload", "docs/guide.md"])
        .assert()
        .success();
    locsync(dir.path())
        .args(["document", "check", "docs/guide.md"])
        .assert()
        .success();

    locsync(dir.path())
        .args(["target", "request", "docs/guide.md", "es"])
        .assert()
        .success();
    locsync(dir.path())
        .args(["target", "check", "docs/guide.md", "es"])
        .assert()
        .success();
    locsync(dir.path())
        .args(["target", "download", "docs/guide.md", "es"])
        .assert()
        .success();

    let translated = fs::read_to_string(
        dir.path().join("translations/es/docs/guide.md"),
    )
    .unwrap();
    assert_eq!(translated, "[es] # hello");

    let status = stdout_of(
        locsync(dir.path())
            .args(["--json", "status"])
            .assert()
            .success(),
    );
    assert!(status.contains("\"source_status\": \"current\""));
}

#[test]
fn test_webhook_unknown_document_succeeds() {
    let dir = TempDir::new().unwrap();
    init_project(dir.path());

    let payload = dir.path().join("payload.json");
    fs::write(
        &payload,
        r#"{"project_id": "proj-1", "document_id": "rem-ghost", "type": "document_uploaded", "complete": true}"#,
    )
    .unwrap();

    let out = stdout_of(
        locsync(dir.path())
            .args(["--json", "webhook", "--file"])
            .arg(&payload)
            .assert()
            .success(),
    );
    assert!(out.contains("document not found"));
}

#[test]
fn test_commands_outside_workspace_fail_with_hint() {
    let dir = TempDir::new().unwrap();
    locsync(dir.path())
        .args(["status"])
        .assert()
        .failure()
        .code(2);
}
