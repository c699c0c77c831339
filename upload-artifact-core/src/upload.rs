//! Upload pipeline: discovery → empty-result policy → one upload per file.
//!
//! # Responsibilities
//! - Expand the search path through a [`FileFinder`]
//! - Route an empty result through [`policy::report_no_files`]
//! - Upload every file as its own call to the [`ArtifactClient`], named after the
//!   configured artifact name or, failing that, the file's base name
//! - Stop at the first call that reports failed items; later files are never attempted
//!
//! # Error Handling
//! [`upload_artifacts`] returns `Err` for anything unexpected (discovery or
//! transport raising). [`run`] is the boundary that turns such an error into a
//! job failure carrying its message, so a run never panics on collaborator errors.
//!
//! Calls are awaited one after the other. Running the pipeline twice uploads
//! everything twice; nothing here detects duplicates.

use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::config::UploadInputs;
use crate::contract::{ArtifactClient, FileFinder, JobReporter, SearchResult, UploadOptions};
use crate::error::UploadError;
use crate::policy;

/// Above this many files an advisory warning suggests archiving first.
pub const LARGE_UPLOAD_FILE_COUNT: usize = 10_000;

/// One file that was persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedArtifact {
    pub artifact_name: String,
    pub file: PathBuf,
}

/// How a run that did not raise ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Nothing matched; the policy decided what was emitted.
    NoFilesFound,
    /// Every file was uploaded.
    Uploaded(Vec<UploadedArtifact>),
    /// `file` reported failed items. `uploaded` holds the files before it.
    Failed {
        file: PathBuf,
        uploaded: Vec<UploadedArtifact>,
    },
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, UploadOutcome::Failed { .. })
    }
}

/// Artifact name for one file: the shared name if configured, else the base name.
pub fn artifact_name_for(
    artifact_name: Option<&str>,
    file: &Path,
) -> Result<String, UploadError> {
    match artifact_name {
        Some(name) => Ok(name.to_owned()),
        None => file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| UploadError::UnnamedFile(file.to_path_buf())),
    }
}

fn containing_directory(file: &Path) -> PathBuf {
    match file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn files_message(count: usize) -> String {
    let s = if count == 1 { "" } else { "s" };
    format!("With the provided path, there will be {count} file{s} uploaded")
}

fn success_message(count: usize) -> String {
    if count > 1 {
        format!("{count} artifacts have been successfully uploaded!")
    } else {
        format!("{count} artifact has been successfully uploaded!")
    }
}

/// Discovers files for `inputs.search_path` and uploads them.
pub async fn upload_artifacts<F, C, R>(
    inputs: &UploadInputs,
    finder: &F,
    client: &C,
    reporter: &R,
) -> Result<UploadOutcome, UploadError>
where
    F: FileFinder + ?Sized,
    C: ArtifactClient + ?Sized,
    R: JobReporter + ?Sized,
{
    info!(search_path = %inputs.search_path, "[UPLOAD] Searching for files");
    let search_result = finder
        .find_files_to_upload(&inputs.search_path)
        .await
        .map_err(UploadError::Discovery)?;

    if search_result.is_empty() {
        policy::report_no_files(inputs.if_no_files_found, &inputs.search_path, reporter);
        return Ok(UploadOutcome::NoFilesFound);
    }

    upload_search_result(&search_result, inputs, &inputs.upload_options(), client, reporter).await
}

/// Uploads a non-empty search result, one transport call per file.
pub async fn upload_search_result<C, R>(
    search_result: &SearchResult,
    inputs: &UploadInputs,
    options: &UploadOptions,
    client: &C,
    reporter: &R,
) -> Result<UploadOutcome, UploadError>
where
    C: ArtifactClient + ?Sized,
    R: JobReporter + ?Sized,
{
    let files = &search_result.files_to_upload;
    reporter.info(&files_message(files.len()));
    reporter.debug(&format!(
        "Root artifact directory is {}",
        search_result.root_directory.display()
    ));

    if files.len() > LARGE_UPLOAD_FILE_COUNT {
        warn!(count = files.len(), "[UPLOAD] Large number of files");
        reporter.warning(
            "There are over 10,000 files in this artifact, consider create an archive before upload to improve the upload performance.",
        );
    }

    let mut uploaded = Vec::with_capacity(files.len());
    for (index, file) in files.iter().enumerate() {
        let artifact_name = artifact_name_for(inputs.artifact_name.as_deref(), file)?;
        let root = containing_directory(file);
        debug!(file = %file.display(), artifact_name = %artifact_name, "[UPLOAD] Uploading file");

        let response = client
            .upload_artifact(&artifact_name, std::slice::from_ref(file), &root, options)
            .await
            .map_err(|error| UploadError::Transport {
                artifact_name: artifact_name.clone(),
                error,
            })?;

        if !response.failed_items.is_empty() {
            error!(
                file = %file.display(),
                failed_items = ?response.failed_items,
                "[UPLOAD][ERROR] Upload reported failed items"
            );
            debug!(
                not_attempted = files.len() - index - 1,
                "[UPLOAD] Remaining files skipped"
            );
            reporter.set_failed(&format!(
                "An error was encountered when uploading {}.",
                file.display()
            ));
            return Ok(UploadOutcome::Failed {
                file: file.clone(),
                uploaded,
            });
        }

        debug!(file = %file.display(), artifact_name = %artifact_name, size = response.size, "[UPLOAD] Upload succeeded");
        uploaded.push(UploadedArtifact {
            artifact_name,
            file: file.clone(),
        });
    }

    info!(uploaded = uploaded.len(), "[UPLOAD] All files uploaded");
    reporter.info(&success_message(uploaded.len()));
    Ok(UploadOutcome::Uploaded(uploaded))
}

/// Runs the pipeline and converts any error into a job failure.
///
/// Returns `None` when the run raised; the failure has already been reported.
pub async fn run<F, C, R>(
    inputs: &UploadInputs,
    finder: &F,
    client: &C,
    reporter: &R,
) -> Option<UploadOutcome>
where
    F: FileFinder + ?Sized,
    C: ArtifactClient + ?Sized,
    R: JobReporter + ?Sized,
{
    match upload_artifacts(inputs, finder, client, reporter).await {
        Ok(outcome) => Some(outcome),
        Err(e) => {
            error!(error = %e, "[UPLOAD][ERROR] Upload run failed");
            reporter.set_failed(&e.to_string());
            None
        }
    }
}
