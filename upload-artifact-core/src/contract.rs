#![allow(unused)]

//! # contract: seams between the upload pipeline and its collaborators
//!
//! The pipeline never touches the filesystem or an artifact backend directly.
//! It talks to three traits:
//!
//! - [`FileFinder`] expands a search path into a [`SearchResult`].
//! - [`ArtifactClient`] persists a list of files under an artifact name.
//! - [`JobReporter`] receives the job-facing log lines and the failure marking.
//!
//! All three are annotated for `mockall`, so tests can script discovery and
//! transport results and count emissions without a real CI host.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use mockall::{automock, predicate::*};

/// Boxed error returned by collaborator implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Output of discovery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    /// Matched files in discovery order. Never contains directories.
    pub files_to_upload: Vec<PathBuf>,
    /// Common ancestor of the search roots.
    pub root_directory: PathBuf,
}

impl SearchResult {
    pub fn is_empty(&self) -> bool {
        self.files_to_upload.is_empty()
    }
}

/// Options handed to the artifact client on every call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadOptions {
    /// Whether the client keeps going after an item fails to persist.
    pub continue_on_error: bool,
    /// Days to keep the artifact. `None` leaves the backend default in place.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_days: Option<u32>,
}

/// What the artifact client reports back for one upload call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadResponse {
    pub artifact_name: String,
    /// Files that were persisted.
    pub artifact_items: Vec<PathBuf>,
    /// Total bytes persisted.
    pub size: u64,
    /// Files the backend could not persist.
    pub failed_items: Vec<PathBuf>,
}

/// Expands a search path into the concrete files to upload.
///
/// Implementations return an empty [`SearchResult`] rather than an error when
/// nothing matches.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait FileFinder: Send + Sync {
    async fn find_files_to_upload(&self, search_path: &str) -> Result<SearchResult, BoxError>;
}

/// Persists files as a named artifact.
///
/// `root_directory` is the ancestor the backend strips from each file path to
/// obtain its location inside the artifact.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ArtifactClient: Send + Sync {
    async fn upload_artifact(
        &self,
        name: &str,
        files: &[PathBuf],
        root_directory: &Path,
        options: &UploadOptions,
    ) -> Result<UploadResponse, BoxError>;
}

/// Job-facing log sink of the CI host.
///
/// `set_failed` both emits the message and marks the job as failed; it does
/// not stop the process.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait JobReporter: Send + Sync {
    fn info(&self, message: &str);
    fn warning(&self, message: &str);
    fn debug(&self, message: &str);
    fn set_failed(&self, message: &str);
}
