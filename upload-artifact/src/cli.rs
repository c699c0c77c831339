///
/// This module implements the CLI interface for upload-artifact: argument
/// parsing, input resolution and wiring the default collaborators into the
/// core pipeline.
///
/// All decision logic (discovery, the no-files policy, the upload loop) lives in
/// the [`upload-artifact-core`] crate. This module is strictly glue.
///
/// ## How To Use
/// - In a CI step: set `INPUT_PATH` (and optionally `INPUT_NAME`,
///   `INPUT_IF-NO-FILES-FOUND`, `INPUT_RETENTION-DAYS`) and run `upload-artifact`.
/// - From a shell: pass the same values as `--path`, `--name`, ... flags.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
///
/// [`upload-artifact-core`]: ../../upload-artifact-core/
use crate::load_config::{load_inputs_file, max_retention_from_env, resolve_inputs, RawInputs};
use crate::upload::{FsArtifactClient, DEFAULT_STORE_DIR};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use upload_artifact_core::config::UploadInputs;
use upload_artifact_core::contract::JobReporter;
use upload_artifact_core::search::GlobFinder;
use upload_artifact_core::upload::{self, UploadOutcome};

/// Upload files matching a search path as job artifacts.
#[derive(Parser, Debug, Clone, Default)]
#[clap(
    name = "upload-artifact",
    version,
    about = "Upload files matching a search path as CI job artifacts"
)]
pub struct Cli {
    /// Artifact name shared by every file. Without it each file is its own artifact, named after the file
    #[clap(long, env = "INPUT_NAME")]
    pub name: Option<String>,

    /// Files to upload: one path or glob per line, `!` prefix to exclude
    #[clap(long, env = "INPUT_PATH")]
    pub path: Option<String>,

    /// What to do when nothing matches: warn, error or ignore [default: warn]
    #[clap(long, env = "INPUT_IF-NO-FILES-FOUND")]
    pub if_no_files_found: Option<String>,

    /// Days to keep the artifacts; the store default applies when omitted
    #[clap(long, env = "INPUT_RETENTION-DAYS")]
    pub retention_days: Option<String>,

    /// YAML file supplying any of the inputs above
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Directory of the artifact store
    #[clap(long, env = "ARTIFACT_STORE_DIR", default_value = DEFAULT_STORE_DIR)]
    pub artifact_dir: PathBuf,
}

impl Cli {
    fn raw_inputs(&self) -> RawInputs {
        RawInputs {
            name: self.name.clone(),
            path: self.path.clone(),
            if_no_files_found: self.if_no_files_found.clone(),
            retention_days: self.retention_days.clone(),
        }
    }

    /// Flags and environment first, then the `--config` file.
    pub fn resolve_inputs(&self) -> Result<UploadInputs> {
        let mut raw = self.raw_inputs();
        if let Some(config) = &self.config {
            let from_file = load_inputs_file(config)
                .with_context(|| format!("Failed to load inputs from {}", config.display()))?;
            raw = raw.or(from_file);
        }
        resolve_inputs(raw, max_retention_from_env())
    }
}

/// Entrypoint for main() and integration tests.
///
/// Every failure, including invalid inputs, ends up as a single
/// `reporter.set_failed` call; the returned outcome is `None` in that case.
pub async fn run<R: JobReporter>(cli: Cli, reporter: &R) -> Option<UploadOutcome> {
    tracing::info!("trace_initialised");

    let inputs = match cli.resolve_inputs() {
        Ok(inputs) => inputs,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Invalid inputs");
            reporter.set_failed(&format!("{e:#}"));
            return None;
        }
    };
    let finder = match GlobFinder::new() {
        Ok(finder) => finder,
        Err(e) => {
            tracing::error!(error = %e, "Unable to determine working directory");
            reporter.set_failed(&e.to_string());
            return None;
        }
    };
    let client = FsArtifactClient::new(cli.artifact_dir);
    tracing::info!(store_dir = %client.store_dir().display(), "Using filesystem artifact store");

    upload::run(&inputs, &finder, &client, reporter).await
}
