//! Reporting for a search path that matched nothing.

use tracing::{info, warn};

use crate::config::NoFileOptions;
use crate::contract::JobReporter;

pub fn no_files_message(search_path: &str) -> String {
    format!("No files were found with the provided path: {search_path}. No artifacts will be uploaded.")
}

/// Emits exactly one line for an empty search result; `Error` also fails the job.
pub fn report_no_files<R>(policy: NoFileOptions, search_path: &str, reporter: &R)
where
    R: JobReporter + ?Sized,
{
    let message = no_files_message(search_path);
    match policy {
        NoFileOptions::Warn => {
            warn!(search_path, "No files found");
            reporter.warning(&message);
        }
        NoFileOptions::Error => {
            warn!(search_path, "No files found, failing the job");
            reporter.set_failed(&message);
        }
        NoFileOptions::Ignore => {
            info!(search_path, "No files found");
            reporter.info(&message);
        }
    }
}
