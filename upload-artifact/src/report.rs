//! Job reporting through GitHub Actions workflow commands.
//!
//! Warnings, errors and debug lines are written to stdout as `::warning::`,
//! `::error::` and `::debug::` commands, which the runner turns into
//! annotations. Info lines are written as-is. Debug lines only appear when the
//! runner has step debugging enabled (`RUNNER_DEBUG=1`).

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use upload_artifact_core::contract::JobReporter;

/// Environment variable the runner sets when step debug logging is on.
pub const RUNNER_DEBUG_ENV: &str = "RUNNER_DEBUG";

pub struct WorkflowReporter {
    out: Mutex<Box<dyn Write + Send>>,
    debug_enabled: bool,
    failed: AtomicBool,
}

impl std::fmt::Debug for WorkflowReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowReporter")
            .field("debug_enabled", &self.debug_enabled)
            .field("failed", &self.is_failed())
            .finish()
    }
}

impl WorkflowReporter {
    pub fn new(out: Box<dyn Write + Send>, debug_enabled: bool) -> Self {
        Self {
            out: Mutex::new(out),
            debug_enabled,
            failed: AtomicBool::new(false),
        }
    }

    /// Reporter on stdout, with debug lines enabled by `RUNNER_DEBUG=1`.
    pub fn stdout_from_env() -> Self {
        let debug_enabled = std::env::var(RUNNER_DEBUG_ENV).is_ok_and(|v| v == "1");
        Self::new(Box::new(std::io::stdout()), debug_enabled)
    }

    /// Whether [`JobReporter::set_failed`] has been called.
    pub fn is_failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }

    fn write_line(&self, line: &str) {
        let mut out = match self.out.lock() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = writeln!(out, "{line}").and_then(|_| out.flush()) {
            tracing::error!(error = %e, "Failed to write job output");
        }
    }

    fn command(&self, command: &str, message: &str) {
        self.write_line(&format!("::{command}::{}", escape_data(message)));
    }
}

/// Escapes a workflow command message so it stays on one line.
pub fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

impl JobReporter for WorkflowReporter {
    fn info(&self, message: &str) {
        self.write_line(message);
    }

    fn warning(&self, message: &str) {
        self.command("warning", message);
    }

    fn debug(&self, message: &str) {
        if self.debug_enabled {
            self.command("debug", message);
        }
    }

    fn set_failed(&self, message: &str) {
        self.failed.store(true, Ordering::SeqCst);
        self.command("error", message);
    }
}
