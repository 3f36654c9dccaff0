//! Pipeline step and run report types
//!
//! Provides structures for tracking what each step of a bootstrap run did.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Steps of the bootstrap pipeline, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Add or replace the Django requirement in requirements.txt
    UpdateManifest,
    /// Query the interpreter for its major version
    DetectPython,
    /// Create the virtual environment
    CreateVenv,
    /// Locate the venv activation script
    ResolveActivation,
    /// pip install -r requirements.txt
    InstallDependencies,
    /// django-admin startproject
    BootstrapProject,
}

impl Step {
    /// Returns all steps in pipeline order
    pub fn all() -> &'static [Step] {
        &[
            Step::UpdateManifest,
            Step::DetectPython,
            Step::CreateVenv,
            Step::ResolveActivation,
            Step::InstallDependencies,
            Step::BootstrapProject,
        ]
    }

    /// Returns the display name for this step
    pub fn display_name(&self) -> &'static str {
        match self {
            Step::UpdateManifest => "Update requirements",
            Step::DetectPython => "Detect Python",
            Step::CreateVenv => "Create virtual environment",
            Step::ResolveActivation => "Resolve activation",
            Step::InstallDependencies => "Install dependencies",
            Step::BootstrapProject => "Bootstrap project",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Outcome of a single step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepStatus {
    /// The step ran and succeeded
    Succeeded,
    /// The step was intentionally not needed
    Skipped { reason: String },
    /// The step ran and failed
    Failed { error: String },
    /// An earlier step failed, so this one never ran
    NotRun,
}

impl StepStatus {
    /// Creates a Skipped status
    pub fn skipped(reason: impl Into<String>) -> Self {
        StepStatus::Skipped {
            reason: reason.into(),
        }
    }

    /// Creates a Failed status
    pub fn failed(error: impl fmt::Display) -> Self {
        StepStatus::Failed {
            error: error.to_string(),
        }
    }

    /// Returns true if this status is a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, StepStatus::Failed { .. })
    }

    /// Returns the short label for this status
    pub fn label(&self) -> &'static str {
        match self {
            StepStatus::Succeeded => "ok",
            StepStatus::Skipped { .. } => "skipped",
            StepStatus::Failed { .. } => "failed",
            StepStatus::NotRun => "not run",
        }
    }
}

/// Change made to requirements.txt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum ManifestChange {
    /// The file did not exist and was created with the requirement
    Created,
    /// The requirement was appended after existing lines
    Appended,
    /// An existing line for the package was replaced in place
    Replaced { previous: String },
    /// The requirement was already present and identical
    Unchanged,
}

impl fmt::Display for ManifestChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestChange::Created => write!(f, "created"),
            ManifestChange::Appended => write!(f, "appended"),
            ManifestChange::Replaced { previous } => write!(f, "replaced '{}'", previous),
            ManifestChange::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// Report of a single pipeline step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    /// Which step this is
    pub step: Step,
    /// What happened
    #[serde(flatten)]
    pub status: StepStatus,
    /// The command line that was executed, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Short human-readable detail (detected version, activation path, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Captured standard output
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub stdout: String,
    /// Captured standard error
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub stderr: String,
}

impl StepReport {
    /// Creates a new StepReport with no command or output
    pub fn new(step: Step, status: StepStatus) -> Self {
        Self {
            step,
            status,
            command: None,
            detail: None,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    /// Sets the executed command line
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Sets the detail text
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Attaches captured process output
    pub fn with_output(mut self, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        self.stdout = stdout.into();
        self.stderr = stderr.into();
        self
    }
}

/// Report of a whole bootstrap run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Project root the pipeline ran in
    pub project_root: PathBuf,
    /// Whether this was a dry run
    pub dry_run: bool,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run finished
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    /// What happened to requirements.txt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_change: Option<ManifestChange>,
    /// Per-step reports in execution order
    pub steps: Vec<StepReport>,
}

impl RunReport {
    /// Creates a new, empty RunReport
    pub fn new(project_root: impl Into<PathBuf>, dry_run: bool) -> Self {
        Self {
            project_root: project_root.into(),
            dry_run,
            started_at: Utc::now(),
            finished_at: None,
            manifest_change: None,
            steps: Vec::new(),
        }
    }

    /// Records a step report
    pub fn push(&mut self, report: StepReport) {
        self.steps.push(report);
    }

    /// Marks every step that has no report yet as not run
    pub fn mark_remaining_not_run(&mut self) {
        for step in Step::all() {
            if self.get(*step).is_none() {
                self.steps.push(StepReport::new(*step, StepStatus::NotRun));
            }
        }
    }

    /// Stamps the finish time
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Returns the report for a given step
    pub fn get(&self, step: Step) -> Option<&StepReport> {
        self.steps.iter().find(|r| r.step == step)
    }

    /// Returns the first failed step, if any
    pub fn failed_step(&self) -> Option<&StepReport> {
        self.steps.iter().find(|r| r.status.is_failure())
    }

    /// Returns true if no step failed
    pub fn is_success(&self) -> bool {
        self.failed_step().is_none()
    }
}
