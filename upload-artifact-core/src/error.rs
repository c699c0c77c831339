use std::path::PathBuf;

use crate::contract::BoxError;

/// Errors surfaced by the upload pipeline.
///
/// Every variant renders as the bare underlying message so that the hosting
/// boundary can hand it to the job as the failure text unchanged.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// An input value was missing or not one of the accepted values.
    #[error("{0}")]
    Config(String),

    /// The file finder could not expand the search path.
    #[error("{0}")]
    Discovery(BoxError),

    /// The artifact client raised instead of reporting failed items.
    #[error("{error}")]
    Transport {
        artifact_name: String,
        error: BoxError,
    },

    /// A discovered path has no file name to derive an artifact name from.
    #[error("Unable to derive an artifact name from {}", .0.display())]
    UnnamedFile(PathBuf),
}
