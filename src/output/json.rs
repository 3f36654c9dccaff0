//! JSON output formatter for machine processing
//!
//! This module provides:
//! - JSON serialization of run reports
//! - Captured process output only in verbose mode

use crate::domain::{ManifestChange, RunReport, Step, StepReport, StepStatus};
use crate::output::{OutputFormatter, Verbosity};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Verbosity level affects detail in output
    verbosity: Verbosity,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

/// JSON representation of the full report
#[derive(Serialize)]
struct JsonOutput<'a> {
    /// Whether every step succeeded or was skipped
    success: bool,
    /// Whether this was a dry-run
    dry_run: bool,
    /// Project root
    project_root: String,
    /// Run start time
    started_at: DateTime<Utc>,
    /// Run end time
    #[serde(skip_serializing_if = "Option::is_none")]
    finished_at: Option<DateTime<Utc>>,
    /// What happened to the requirements file
    #[serde(skip_serializing_if = "Option::is_none")]
    manifest: Option<&'a ManifestChange>,
    /// Per-step results
    steps: Vec<JsonStep<'a>>,
}

/// JSON representation of a step
#[derive(Serialize)]
struct JsonStep<'a> {
    /// Step identifier
    step: Step,
    /// Status, with `reason` or `error` when applicable
    #[serde(flatten)]
    status: &'a StepStatus,
    /// Executed command line
    #[serde(skip_serializing_if = "Option::is_none")]
    command: Option<&'a str>,
    /// Short detail
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<&'a str>,
    /// Captured stdout (only in verbose mode)
    #[serde(skip_serializing_if = "Option::is_none")]
    stdout: Option<&'a str>,
    /// Captured stderr (only in verbose mode)
    #[serde(skip_serializing_if = "Option::is_none")]
    stderr: Option<&'a str>,
}

impl JsonFormatter {
    /// Convert a step report to JSON representation
    fn step_to_json<'a>(&self, step: &'a StepReport) -> JsonStep<'a> {
        let captured = |s: &'a str| {
            (self.verbosity == Verbosity::Verbose && !s.is_empty()).then_some(s)
        };

        JsonStep {
            step: step.step,
            status: &step.status,
            command: step.command.as_deref(),
            detail: step.detail.as_deref(),
            stdout: captured(&step.stdout),
            stderr: captured(&step.stderr),
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, report: &RunReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let output = JsonOutput {
            success: report.is_success(),
            dry_run: report.dry_run,
            project_root: report.project_root.display().to_string(),
            started_at: report.started_at,
            finished_at: report.finished_at,
            manifest: report.manifest_change.as_ref(),
            steps: report.steps.iter().map(|s| self.step_to_json(s)).collect(),
        };

        let json = serde_json::to_string_pretty(&output).map_err(std::io::Error::other)?;

        writeln!(writer, "{}", json)?;

        Ok(())
    }
}
