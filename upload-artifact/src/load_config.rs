/// `load_config` module: resolves the step inputs into a validated [`UploadInputs`].
///
/// Inputs come from three places, highest precedence first:
/// 1. command-line flags,
/// 2. `INPUT_*` environment variables set by the CI host (wired through clap),
/// 3. an optional YAML file passed with `--config`.
///
/// The CI host passes unset inputs as empty strings, so blank values count as absent.
///
/// # Errors
/// Any invalid value is a configuration error and fails the run before discovery.
/// All errors use `anyhow::Error` and are surfaced at the CLI boundary.
use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{error, info};
use upload_artifact_core::config::{NoFileOptions, UploadInputs};

/// Environment variable carrying the repository's maximum retention period.
pub const MAX_RETENTION_ENV: &str = "GITHUB_RETENTION_DAYS";

/// Policy used when neither a flag, the environment nor the file names one.
pub const DEFAULT_IF_NO_FILES_FOUND: &str = "warn";

/// Raw, unvalidated inputs as they arrive from flags or the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawInputs {
    pub name: Option<String>,
    pub path: Option<String>,
    pub if_no_files_found: Option<String>,
    pub retention_days: Option<String>,
}

impl RawInputs {
    /// Fills every blank field of `self` from `fallback`.
    pub fn or(self, fallback: RawInputs) -> RawInputs {
        RawInputs {
            name: present(self.name).or(present(fallback.name)),
            path: present(self.path).or(present(fallback.path)),
            if_no_files_found: present(self.if_no_files_found)
                .or(present(fallback.if_no_files_found)),
            retention_days: present(self.retention_days).or(present(fallback.retention_days)),
        }
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Reads a YAML inputs file, e.g.
///
/// ```yaml
/// name: test-results
/// path: |
///   reports/**/*.xml
///   !reports/tmp
/// if-no-files-found: error
/// retention-days: "7"
/// ```
pub fn load_inputs_file<P: AsRef<Path>>(path: P) -> Result<RawInputs> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading inputs from file");

    let content = fs::read_to_string(path_ref).map_err(|e| {
        error!(error = ?e, config_path = ?path_ref, "Failed to read inputs file");
        anyhow!("Failed to read inputs file {:?}: {}", path_ref, e)
    })?;

    #[derive(Deserialize)]
    #[serde(rename_all = "kebab-case", deny_unknown_fields)]
    struct FileInputs {
        name: Option<String>,
        path: Option<String>,
        if_no_files_found: Option<String>,
        retention_days: Option<serde_yaml::Value>,
    }

    let raw: FileInputs = serde_yaml::from_str(&content).map_err(|e| {
        error!(error = ?e, config_path = ?path_ref, "Failed to parse inputs YAML");
        anyhow!("Failed to parse inputs YAML: {e}")
    })?;

    // Accept both `retention-days: 7` and `retention-days: "7"`.
    let retention_days = match raw.retention_days {
        None | Some(serde_yaml::Value::Null) => None,
        Some(serde_yaml::Value::String(s)) => Some(s),
        Some(serde_yaml::Value::Number(n)) => Some(n.to_string()),
        Some(other) => bail!("Invalid retention-days in inputs file: {other:?}"),
    };

    Ok(RawInputs {
        name: raw.name,
        path: raw.path,
        if_no_files_found: raw.if_no_files_found,
        retention_days,
    })
}

/// Parses `retention-days`: a positive integer, capped by `max` when the host sets one.
pub fn parse_retention_days(raw: &str, max: Option<u32>) -> Result<u32> {
    let days: i64 = raw
        .trim()
        .parse()
        .with_context(|| format!("Invalid retention-days: {raw}"))?;
    if days < 1 {
        bail!("Invalid retention-days: {raw}. The value must be at least 1");
    }
    let days = u32::try_from(days).with_context(|| format!("Invalid retention-days: {raw}"))?;
    if let Some(max) = max {
        if days > max {
            bail!("Invalid retention-days: {raw}. The maximum allowed by this repository is {max}");
        }
    }
    Ok(days)
}

/// Maximum retention from the host environment, if set and numeric.
pub fn max_retention_from_env() -> Option<u32> {
    std::env::var(MAX_RETENTION_ENV)
        .ok()
        .and_then(|v| v.trim().parse().ok())
}

/// Validates raw inputs into the immutable [`UploadInputs`] of the run.
pub fn resolve_inputs(raw: RawInputs, max_retention_days: Option<u32>) -> Result<UploadInputs> {
    let raw = raw.or(RawInputs::default());

    let search_path = raw
        .path
        .ok_or_else(|| anyhow!("Input required and not supplied: path"))?;
    let if_no_files_found: NoFileOptions = raw
        .if_no_files_found
        .as_deref()
        .unwrap_or(DEFAULT_IF_NO_FILES_FOUND)
        .parse()?;
    let retention_days = raw
        .retention_days
        .as_deref()
        .map(|d| parse_retention_days(d, max_retention_days))
        .transpose()?;

    let inputs = UploadInputs {
        artifact_name: raw.name.map(|n| n.trim().to_owned()),
        search_path,
        if_no_files_found,
        retention_days,
    };
    inputs.trace_loaded();
    Ok(inputs)
}
