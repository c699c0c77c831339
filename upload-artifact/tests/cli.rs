use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

/// A job workspace with `out/a.txt` and `out/b.txt`, plus an empty artifact store.
fn workspace() -> (TempDir, TempDir) {
    let ws = tempdir().expect("workspace");
    fs::create_dir_all(ws.path().join("out")).unwrap();
    fs::write(ws.path().join("out/a.txt"), b"alpha").unwrap();
    fs::write(ws.path().join("out/b.txt"), b"beta").unwrap();
    (ws, tempdir().expect("store"))
}

fn command(ws: &Path, store: &Path) -> Command {
    let mut cmd = Command::cargo_bin("upload-artifact").expect("Binary exists");
    cmd.current_dir(ws)
        .env("ARTIFACT_STORE_DIR", store)
        .env("RUST_LOG", "warn")
        .env_remove("INPUT_NAME")
        .env_remove("INPUT_PATH")
        .env_remove("INPUT_IF-NO-FILES-FOUND")
        .env_remove("INPUT_RETENTION-DAYS")
        .env_remove("GITHUB_RETENTION_DAYS")
        .env_remove("RUNNER_DEBUG");
    cmd
}

#[test]
fn uploads_each_file_as_its_own_artifact() {
    let (ws, store) = workspace();

    command(ws.path(), store.path())
        .arg("--path")
        .arg("out/*.txt")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("With the provided path, there will be 2 files uploaded")
                .and(predicate::str::contains(
                    "2 artifacts have been successfully uploaded!",
                )),
        );

    assert_eq!(
        fs::read(store.path().join("a.txt/files/a.txt")).unwrap(),
        b"alpha"
    );
    assert_eq!(
        fs::read(store.path().join("b.txt/files/b.txt")).unwrap(),
        b"beta"
    );
}

#[test]
fn inputs_are_read_from_the_ci_environment() {
    let (ws, store) = workspace();

    command(ws.path(), store.path())
        .env("INPUT_PATH", "out/")
        .env("INPUT_NAME", "bundle")
        .env("INPUT_RETENTION-DAYS", "5")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 artifacts have been successfully uploaded!"));

    let manifest: serde_json::Value =
        serde_json::from_slice(&fs::read(store.path().join("bundle/artifact.json")).unwrap())
            .unwrap();
    assert_eq!(manifest["name"], "bundle");
    assert_eq!(manifest["retention_days"], 5);
    assert_eq!(manifest["files"].as_array().unwrap().len(), 2);
}

#[test]
fn no_files_with_warn_succeeds_with_a_warning() {
    let (ws, store) = workspace();

    command(ws.path(), store.path())
        .args(["--path", "missing/**", "--if-no-files-found", "warn"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "::warning::No files were found with the provided path: missing/**. No artifacts will be uploaded.",
        ));
}

#[test]
fn exclude_only_path_with_ignore_succeeds() {
    let (ws, store) = workspace();

    command(ws.path(), store.path())
        .args(["--path", "!out/*.tmp", "--if-no-files-found", "ignore"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("No files were found with the provided path: !out/*.tmp")
                .and(predicate::str::contains("::error::").not()),
        );

    assert_eq!(fs::read_dir(store.path()).unwrap().count(), 0);
}

#[test]
fn no_files_with_error_fails_the_job() {
    let (ws, store) = workspace();

    command(ws.path(), store.path())
        .args(["--path", "missing/**", "--if-no-files-found", "error"])
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "::error::No files were found with the provided path: missing/**",
        ));
}

#[test]
fn unknown_policy_fails_before_uploading() {
    let (ws, store) = workspace();

    command(ws.path(), store.path())
        .args(["--path", "out/", "--if-no-files-found", "sometimes"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("::error::Unrecognized if-no-files-found input"));

    assert_eq!(fs::read_dir(store.path()).unwrap().count(), 0);
}

#[test]
fn invalid_artifact_name_fails_the_job() {
    let (ws, store) = workspace();

    command(ws.path(), store.path())
        .args(["--path", "out/a.txt", "--name", "bad:name"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("::error::Artifact name is not valid: bad:name"));
}

#[test]
fn missing_path_is_reported() {
    let (ws, store) = workspace();

    command(ws.path(), store.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("Input required and not supplied: path"));
}
