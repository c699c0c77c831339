use std::fs;
use std::path::{Path, PathBuf};

use tempfile::{tempdir, TempDir};
use upload_artifact_core::contract::FileFinder;
use upload_artifact_core::search::GlobFinder;

/// Builds a small workspace:
///
/// ```text
/// dist/app.js
/// dist/app.js.map
/// dist/assets/logo.png
/// reports/junit.xml
/// reports/coverage/index.html
/// ```
fn workspace() -> TempDir {
    let dir = tempdir().unwrap();
    for file in [
        "dist/app.js",
        "dist/app.js.map",
        "dist/assets/logo.png",
        "reports/junit.xml",
        "reports/coverage/index.html",
    ] {
        let path = dir.path().join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, file.as_bytes()).unwrap();
    }
    dir
}

fn relative(root: &Path, files: &[PathBuf]) -> Vec<String> {
    files
        .iter()
        .map(|f| f.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
        .collect()
}

#[tokio::test]
async fn single_file_uses_its_parent_as_root() {
    let ws = workspace();
    let finder = GlobFinder::with_working_dir(ws.path());

    let result = finder.find_files_to_upload("reports/junit.xml").await.unwrap();

    assert_eq!(result.files_to_upload, vec![ws.path().join("reports/junit.xml")]);
    assert_eq!(result.root_directory, ws.path().join("reports"));
}

#[tokio::test]
async fn directory_includes_every_file_beneath_it() {
    let ws = workspace();
    let finder = GlobFinder::with_working_dir(ws.path());

    let result = finder.find_files_to_upload("dist").await.unwrap();

    assert_eq!(result.root_directory, ws.path().join("dist"));
    assert_eq!(
        relative(ws.path(), &result.files_to_upload),
        vec!["dist/app.js", "dist/app.js.map", "dist/assets/logo.png"]
    );
}

#[tokio::test]
async fn single_star_stays_in_one_directory() {
    let ws = workspace();
    let finder = GlobFinder::with_working_dir(ws.path());

    let result = finder.find_files_to_upload("dist/*.js").await.unwrap();

    assert_eq!(relative(ws.path(), &result.files_to_upload), vec!["dist/app.js"]);
    assert_eq!(result.root_directory, ws.path().join("dist"));
}

#[tokio::test]
async fn double_star_crosses_directories() {
    let ws = workspace();
    let finder = GlobFinder::with_working_dir(ws.path());

    let result = finder.find_files_to_upload("**/*.html").await.unwrap();

    assert_eq!(
        relative(ws.path(), &result.files_to_upload),
        vec!["reports/coverage/index.html"]
    );
    assert_eq!(result.root_directory, ws.path().to_path_buf());
}

#[tokio::test]
async fn exclude_lines_remove_matches() {
    let ws = workspace();
    let finder = GlobFinder::with_working_dir(ws.path());

    let result = finder
        .find_files_to_upload("dist/**\n!dist/**/*.map\n!dist/assets")
        .await
        .unwrap();

    assert_eq!(relative(ws.path(), &result.files_to_upload), vec!["dist/app.js"]);
}

#[tokio::test]
async fn multiple_lines_share_the_common_root_and_dedupe() {
    let ws = workspace();
    let finder = GlobFinder::with_working_dir(ws.path());

    let result = finder
        .find_files_to_upload("reports/junit.xml\n\n  dist/*.js  \nreports/*.xml\n")
        .await
        .unwrap();

    assert_eq!(result.root_directory, ws.path().to_path_buf());
    assert_eq!(
        relative(ws.path(), &result.files_to_upload),
        vec!["reports/junit.xml", "dist/app.js"]
    );
}

#[tokio::test]
async fn absolute_patterns_are_used_as_given() {
    let ws = workspace();
    let finder = GlobFinder::with_working_dir("/nonexistent-working-dir");
    let pattern = format!("{}/reports/**/*.html", ws.path().display());

    let result = finder.find_files_to_upload(&pattern).await.unwrap();

    assert_eq!(
        result.files_to_upload,
        vec![ws.path().join("reports/coverage/index.html")]
    );
}

#[tokio::test]
async fn missing_path_yields_an_empty_result() {
    let ws = workspace();
    let finder = GlobFinder::with_working_dir(ws.path());

    let result = finder.find_files_to_upload("does/not/exist/**").await.unwrap();

    assert!(result.is_empty());
}

#[tokio::test]
async fn blank_search_path_matches_nothing() {
    let ws = workspace();
    let finder = GlobFinder::with_working_dir(ws.path());

    let result = finder.find_files_to_upload("  \n ").await.unwrap();

    assert!(result.is_empty());
    assert_eq!(result.root_directory, ws.path());
}

#[tokio::test]
async fn exclude_only_search_path_matches_nothing() {
    let ws = workspace();
    let finder = GlobFinder::with_working_dir(ws.path());

    let result = finder.find_files_to_upload("!dist/*.map").await.unwrap();

    assert!(result.is_empty());
    assert_eq!(result.root_directory, ws.path());
}

#[tokio::test]
async fn glob_characters_in_the_working_dir_are_literal() {
    let tmp = tempdir().unwrap();
    let build = tmp.path().join("build[1]");
    fs::create_dir_all(build.join("out")).unwrap();
    fs::write(build.join("out/a.txt"), "a").unwrap();
    fs::write(build.join("out/b.log"), "b").unwrap();
    let finder = GlobFinder::with_working_dir(&build);

    let result = finder.find_files_to_upload("out/*.txt").await.unwrap();
    assert_eq!(result.files_to_upload, vec![build.join("out/a.txt")]);
    assert_eq!(result.root_directory, build.join("out"));

    let result = finder.find_files_to_upload("out/a.txt").await.unwrap();
    assert_eq!(result.files_to_upload, vec![build.join("out/a.txt")]);

    let result = finder
        .find_files_to_upload("out/**\n!out/*.log")
        .await
        .unwrap();
    assert_eq!(relative(&build, &result.files_to_upload), vec!["out/a.txt"]);
}

#[tokio::test]
async fn invalid_glob_is_an_error() {
    let ws = workspace();
    let finder = GlobFinder::with_working_dir(ws.path());

    assert!(finder.find_files_to_upload("dist/[a-").await.is_err());
}
