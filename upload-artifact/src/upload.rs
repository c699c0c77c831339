#![doc = "Artifact transport for the CLI: persists uploaded files into a local artifact store directory."]
//
//! # Filesystem artifact store
//!
//! [`FsArtifactClient`] implements the core [`ArtifactClient`] trait against a
//! directory. Each artifact lives under `<store>/<name>/`:
//!
//! - `files/` holds the uploaded files at their path relative to the root directory
//! - `artifact.json` lists every file with its size and SHA-256 digest, plus the
//!   retention period and creation time
//!
//! Uploading several times under the same name adds to the same artifact.
//!
//! The CLI picks the store directory from `--artifact-dir` or `ARTIFACT_STORE_DIR`,
//! defaulting to `./artifacts`.

use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use upload_artifact_core::contract::{ArtifactClient, BoxError, UploadOptions, UploadResponse};

pub const DEFAULT_STORE_DIR: &str = "artifacts";
pub const MANIFEST_FILE: &str = "artifact.json";

const INVALID_NAME_CHARS: &[char] = &['"', ':', '<', '>', '|', '*', '?', '\r', '\n', '\\', '/'];

/// Rejects names the artifact store cannot hold.
pub fn check_artifact_name(name: &str) -> Result<(), BoxError> {
    if name.is_empty() {
        return Err("Artifact name is not valid: the name must not be empty".into());
    }
    if let Some(c) = name.chars().find(|c| INVALID_NAME_CHARS.contains(c)) {
        return Err(format!(
            "Artifact name is not valid: {name}. Contains character: {c:?}. Invalid characters include: \", :, <, >, |, *, ?, \\r, \\n, \\, /"
        )
        .into());
    }
    if name == "." || name == ".." {
        return Err(format!("Artifact name is not valid: {name}").into());
    }
    Ok(())
}

/// Manifest written next to the files of an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_days: Option<u32>,
    /// Unix seconds of the first upload under this name.
    pub created_at: u64,
    pub files: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Path inside the artifact, `/`-separated.
    pub path: String,
    pub size: u64,
    pub sha256: String,
}

#[derive(Debug, Clone)]
pub struct FsArtifactClient {
    store_dir: PathBuf,
}

impl FsArtifactClient {
    pub fn new(store_dir: impl Into<PathBuf>) -> Self {
        Self {
            store_dir: store_dir.into(),
        }
    }

    pub fn store_dir(&self) -> &Path {
        &self.store_dir
    }

    pub fn artifact_dir(&self, name: &str) -> PathBuf {
        self.store_dir.join(name)
    }

    /// Reads the manifest of an existing artifact.
    pub async fn read_manifest(&self, name: &str) -> Result<Option<ArtifactManifest>, BoxError> {
        let path = self.artifact_dir(name).join(MANIFEST_FILE);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    async fn store_file(
        &self,
        files_dir: &Path,
        file: &Path,
        root_directory: &Path,
    ) -> Result<ManifestEntry, BoxError> {
        let relative = relative_item_path(file, root_directory)?;
        let content = tokio::fs::read(file).await?;
        let sha256 = format!("{:x}", Sha256::digest(&content));

        let destination = files_dir.join(&relative);
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&destination, &content).await?;

        Ok(ManifestEntry {
            path: relative,
            size: content.len() as u64,
            sha256,
        })
    }
}

/// Path of `file` inside the artifact. Fails for files outside `root_directory`.
fn relative_item_path(file: &Path, root_directory: &Path) -> Result<String, BoxError> {
    let relative = file.strip_prefix(root_directory).map_err(|_| {
        format!(
            "{} is not under the root directory {}",
            file.display(),
            root_directory.display()
        )
    })?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| match c {
            Component::Normal(part) => Ok(part.to_string_lossy().into_owned()),
            _ => Err(format!("Unsupported path component in {}", file.display())),
        })
        .collect::<Result<_, _>>()?;
    if parts.is_empty() {
        return Err(format!("{} is not a file below {}", file.display(), root_directory.display()).into());
    }
    Ok(parts.join("/"))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[async_trait]
impl ArtifactClient for FsArtifactClient {
    async fn upload_artifact(
        &self,
        name: &str,
        files: &[PathBuf],
        root_directory: &Path,
        options: &UploadOptions,
    ) -> Result<UploadResponse, BoxError> {
        check_artifact_name(name)?;
        tracing::debug!(
            artifact_name = name,
            files = files.len(),
            root_directory = %root_directory.display(),
            retention_days = ?options.retention_days,
            "Uploading artifact"
        );

        let artifact_dir = self.artifact_dir(name);
        let files_dir = artifact_dir.join("files");
        tokio::fs::create_dir_all(&files_dir).await?;

        let mut manifest = match self.read_manifest(name).await? {
            Some(manifest) => manifest,
            None => ArtifactManifest {
                name: name.to_owned(),
                retention_days: None,
                created_at: unix_now(),
                files: Vec::new(),
            },
        };
        if options.retention_days.is_some() {
            manifest.retention_days = options.retention_days;
        }

        let mut response = UploadResponse {
            artifact_name: name.to_owned(),
            ..UploadResponse::default()
        };
        for (index, file) in files.iter().enumerate() {
            match self.store_file(&files_dir, file, root_directory).await {
                Ok(entry) => {
                    tracing::debug!(file = %file.display(), sha256 = %entry.sha256, "Stored artifact item");
                    response.size += entry.size;
                    response.artifact_items.push(file.clone());
                    manifest.files.retain(|existing| existing.path != entry.path);
                    manifest.files.push(entry);
                }
                Err(e) => {
                    tracing::error!(error = %e, file = %file.display(), "Failed to store artifact item");
                    response.failed_items.push(file.clone());
                    if !options.continue_on_error {
                        response.failed_items.extend(files[index + 1..].iter().cloned());
                        break;
                    }
                }
            }
        }

        let manifest_json = serde_json::to_vec_pretty(&manifest)?;
        tokio::fs::write(artifact_dir.join(MANIFEST_FILE), manifest_json).await?;

        tracing::debug!(
            artifact_name = name,
            uploaded = response.artifact_items.len(),
            failed = response.failed_items.len(),
            size = response.size,
            "Finished uploading artifact"
        );
        Ok(response)
    }
}
