use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::contract::UploadOptions;
use crate::error::UploadError;

/// Behavior when the search path matches no files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoFileOptions {
    /// Emit a warning; the job is not failed.
    Warn,
    /// Fail the job.
    Error,
    /// Emit an informational line only.
    Ignore,
}

impl NoFileOptions {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoFileOptions::Warn => "warn",
            NoFileOptions::Error => "error",
            NoFileOptions::Ignore => "ignore",
        }
    }
}

impl fmt::Display for NoFileOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoFileOptions {
    type Err = UploadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "warn" => Ok(NoFileOptions::Warn),
            "error" => Ok(NoFileOptions::Error),
            "ignore" => Ok(NoFileOptions::Ignore),
            other => Err(UploadError::Config(format!(
                "Unrecognized if-no-files-found input. Provided: {other}. Available options: warn, error, ignore"
            ))),
        }
    }
}

/// Resolved inputs of one run. Built once, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadInputs {
    /// Shared artifact name. When `None`, each file is uploaded under its own base name.
    pub artifact_name: Option<String>,
    pub search_path: String,
    pub if_no_files_found: NoFileOptions,
    pub retention_days: Option<u32>,
}

impl UploadInputs {
    /// Options for every transport call of this run.
    pub fn upload_options(&self) -> UploadOptions {
        UploadOptions {
            continue_on_error: false,
            retention_days: self.retention_days,
        }
    }

    pub fn trace_loaded(&self) {
        info!(
            search_path = %self.search_path,
            artifact_name = ?self.artifact_name,
            if_no_files_found = %self.if_no_files_found,
            "Loaded upload inputs"
        );
        debug!(?self, "Upload inputs loaded (full debug)");
    }
}
