//! Bootstrap orchestrator for coordinating the entire workflow
//!
//! This module provides:
//! - Workflow coordination: manifest → python → venv → activation → install → startproject
//! - Short-circuiting: the first failing step stops the pipeline
//! - Dry-run mode support (nothing is written or executed except read-only queries)

use crate::bootstrap::{bootstrap_project, project_exists, startproject_command, MANAGE_PY};
use crate::config::Settings;
use crate::domain::{RunReport, Step, StepReport, StepStatus, VenvMode};
use crate::environment::{
    create_venv, creation_commands, resolve_activation, resolve_interpreter, version_query,
    Activation, Interpreter,
};
use crate::error::{AppError, EnvironmentError};
use crate::installer::{install_command, install_dependencies};
use crate::manifest::{ManifestWriter, Requirement};
use crate::process::{CommandRunner, DryRunRunner, Executed};
use crate::progress::Progress;

/// Orchestrator for coordinating the bootstrap workflow
pub struct Orchestrator<'a> {
    /// Resolved settings
    settings: Settings,
    /// Runner for real commands
    runner: &'a dyn CommandRunner,
    /// Runner substituted for side-effecting commands in dry-run mode
    dry_runner: DryRunRunner,
}

/// Marker for a failed step; its report has already been recorded
struct StepFailed(Step);

impl<'a> Orchestrator<'a> {
    /// Create a new orchestrator
    pub fn new(settings: Settings, runner: &'a dyn CommandRunner) -> Self {
        Self {
            settings,
            runner,
            dry_runner: DryRunRunner::new(),
        }
    }

    /// Run the workflow without progress display
    pub fn run(&self) -> RunReport {
        self.run_with_progress(false)
    }

    /// Run the workflow with optional progress display
    pub fn run_with_progress(&self, show_progress: bool) -> RunReport {
        let mut progress = Progress::new(show_progress);
        let mut report = RunReport::new(&self.settings.project_root, self.settings.dry_run);

        progress.start(Step::all().len() as u64, "Bootstrapping");
        let outcome = self.run_steps(&mut report, &progress);
        progress.finish_and_clear();

        if let Err(StepFailed(step)) = outcome {
            tracing::warn!(step = %step, "remaining steps were not run");
            report.mark_remaining_not_run();
        }

        report.finish();
        report
    }

    /// Runner for commands with side effects
    fn executor(&self) -> &dyn CommandRunner {
        if self.settings.dry_run {
            &self.dry_runner
        } else {
            self.runner
        }
    }

    fn run_steps(&self, report: &mut RunReport, progress: &Progress) -> Result<(), StepFailed> {
        progress.set_message(Step::UpdateManifest.display_name());
        self.update_manifest(report)?;
        progress.inc();

        progress.set_message(Step::DetectPython.display_name());
        let interpreter = self.detect_python(report)?;
        progress.inc();

        progress.set_message(Step::CreateVenv.display_name());
        self.create_venv(report, interpreter.as_ref())?;
        progress.inc();

        progress.set_message(Step::ResolveActivation.display_name());
        let activation = self.resolve_activation(report)?;
        progress.inc();

        let python = interpreter
            .as_ref()
            .map_or(self.settings.python.as_str(), |i| i.command.as_str());

        progress.set_message(Step::InstallDependencies.display_name());
        self.install(report, activation.as_ref(), python)?;
        progress.inc();

        progress.set_message(Step::BootstrapProject.display_name());
        self.bootstrap(report, activation.as_ref())?;
        progress.inc();

        Ok(())
    }

    fn update_manifest(&self, report: &mut RunReport) -> Result<(), StepFailed> {
        let requirement = Requirement::django(self.settings.django_version);
        let path = self.settings.requirements_path();
        let writer = ManifestWriter::new(self.settings.dry_run);

        match writer.apply(&path, &requirement) {
            Ok(result) => {
                tracing::info!(
                    path = %path.display(),
                    change = %result.change,
                    "{} applied",
                    requirement
                );
                report.push(
                    StepReport::new(Step::UpdateManifest, StepStatus::Succeeded)
                        .with_detail(format!("{} ({})", requirement, result.change)),
                );
                report.manifest_change = Some(result.change);
                Ok(())
            }
            Err(e) => Err(fail(report, Step::UpdateManifest, e, None)),
        }
    }

    /// The venv is already usable when its activation script exists
    fn venv_exists(&self) -> bool {
        resolve_activation(&self.settings.venv_dir()).is_ok()
    }

    fn detect_python(&self, report: &mut RunReport) -> Result<Option<Interpreter>, StepFailed> {
        let needed = match self.settings.venv {
            VenvMode::Create => !self.venv_exists(),
            VenvMode::Disabled => !self.settings.skip_install,
            VenvMode::Existing => false,
        };

        if !needed {
            report.push(StepReport::new(
                Step::DetectPython,
                StepStatus::skipped("interpreter not needed"),
            ));
            return Ok(None);
        }

        // Read-only query: runs for real even in dry-run mode
        match resolve_interpreter(
            self.runner,
            &self.settings.python,
            self.settings.python_version,
            &self.settings.project_root,
        ) {
            Ok(interpreter) => {
                report.push(
                    StepReport::new(Step::DetectPython, StepStatus::Succeeded).with_detail(format!(
                        "{} is Python {}",
                        interpreter.command, interpreter.version
                    )),
                );
                Ok(Some(interpreter))
            }
            Err(e) => Err(fail(
                report,
                Step::DetectPython,
                e,
                Some(version_query(&self.settings.python).to_string()),
            )),
        }
    }

    fn create_venv(
        &self,
        report: &mut RunReport,
        interpreter: Option<&Interpreter>,
    ) -> Result<(), StepFailed> {
        let skip_reason = match self.settings.venv {
            VenvMode::Disabled => Some("virtual environment disabled".to_string()),
            VenvMode::Existing => Some("using existing virtual environment".to_string()),
            VenvMode::Create if self.venv_exists() => Some(format!(
                "{} already exists",
                self.settings.venv_path
            )),
            VenvMode::Create => None,
        };

        if let Some(reason) = skip_reason {
            report.push(StepReport::new(Step::CreateVenv, StepStatus::skipped(reason)));
            return Ok(());
        }

        let Some(interpreter) = interpreter else {
            return Err(fail(report, Step::CreateVenv, EnvironmentError::NoInterpreter, None));
        };

        match create_venv(
            self.executor(),
            interpreter,
            &self.settings.venv_path,
            &self.settings.project_root,
        ) {
            Ok(executed) => {
                report.push(
                    executed_report(Step::CreateVenv, &executed)
                        .with_detail(self.settings.venv_path.clone()),
                );
                Ok(())
            }
            Err(e) => {
                let planned = creation_commands(interpreter, &self.settings.venv_path)
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" && ");
                Err(fail(report, Step::CreateVenv, e, Some(planned)))
            }
        }
    }

    /// A dry run that planned (but did not perform) the venv creation
    fn venv_creation_planned(&self, report: &RunReport) -> bool {
        self.settings.dry_run
            && self.settings.venv == VenvMode::Create
            && report
                .get(Step::CreateVenv)
                .is_some_and(|r| r.status == StepStatus::Succeeded)
    }

    fn resolve_activation(&self, report: &mut RunReport) -> Result<Option<Activation>, StepFailed> {
        if !self.settings.venv.uses_venv() {
            report.push(StepReport::new(
                Step::ResolveActivation,
                StepStatus::skipped("virtual environment disabled"),
            ));
            return Ok(None);
        }

        let venv_dir = self.settings.venv_dir();
        match resolve_activation(&venv_dir) {
            Ok(activation) => {
                report.push(
                    StepReport::new(Step::ResolveActivation, StepStatus::Succeeded)
                        .with_detail(activation.script().display().to_string()),
                );
                Ok(Some(activation))
            }
            Err(_) if self.venv_creation_planned(report) => {
                // The venv was not really created; assume the host layout
                let activation = Activation::for_host(&venv_dir);
                report.push(
                    StepReport::new(Step::ResolveActivation, StepStatus::Succeeded).with_detail(
                        format!("{} (predicted)", activation.script().display()),
                    ),
                );
                Ok(Some(activation))
            }
            Err(e) => Err(fail(report, Step::ResolveActivation, e, None)),
        }
    }

    fn install(
        &self,
        report: &mut RunReport,
        activation: Option<&Activation>,
        python: &str,
    ) -> Result<(), StepFailed> {
        if self.settings.skip_install {
            report.push(StepReport::new(
                Step::InstallDependencies,
                StepStatus::skipped("--skip-install"),
            ));
            return Ok(());
        }

        match install_dependencies(
            self.executor(),
            &self.settings.requirements,
            activation,
            python,
            &self.settings.project_root,
        ) {
            Ok(executed) => {
                report.push(executed_report(Step::InstallDependencies, &[executed]));
                Ok(())
            }
            Err(e) => {
                let command = install_command(&self.settings.requirements, activation, python);
                Err(fail(
                    report,
                    Step::InstallDependencies,
                    e,
                    Some(command.to_string()),
                ))
            }
        }
    }

    fn bootstrap(
        &self,
        report: &mut RunReport,
        activation: Option<&Activation>,
    ) -> Result<(), StepFailed> {
        let skip_reason = if self.settings.skip_bootstrap {
            Some("--skip-bootstrap".to_string())
        } else if project_exists(&self.settings.project_root) {
            Some(format!("{} already exists", MANAGE_PY))
        } else {
            None
        };

        if let Some(reason) = skip_reason {
            report.push(StepReport::new(
                Step::BootstrapProject,
                StepStatus::skipped(reason),
            ));
            return Ok(());
        }

        match bootstrap_project(
            self.executor(),
            &self.settings.project_name,
            activation,
            &self.settings.project_root,
        ) {
            Ok(executed) => {
                report.push(
                    executed_report(Step::BootstrapProject, &[executed])
                        .with_detail(self.settings.project_name.clone()),
                );
                Ok(())
            }
            Err(e) => {
                let command = startproject_command(&self.settings.project_name, activation);
                Err(fail(
                    report,
                    Step::BootstrapProject,
                    e,
                    Some(command.to_string()),
                ))
            }
        }
    }
}

/// Log and record a failed step, with the command line it attempted
fn fail(
    report: &mut RunReport,
    step: Step,
    error: impl Into<AppError>,
    command: Option<String>,
) -> StepFailed {
    let error = error.into();
    tracing::error!(step = %step, command = command.as_deref().unwrap_or(""), "{}", error);

    let mut step_report = StepReport::new(step, StepStatus::failed(&error));
    if let Some(command) = command {
        step_report = step_report.with_command(command);
    }
    report.push(step_report);
    StepFailed(step)
}

/// Build a succeeded report from executed commands
fn executed_report(step: Step, executed: &[Executed]) -> StepReport {
    let command = executed
        .iter()
        .map(|e| e.command.to_string())
        .collect::<Vec<_>>()
        .join(" && ");
    let stdout = executed
        .iter()
        .map(|e| e.output.stdout.trim_end())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    let stderr = executed
        .iter()
        .map(|e| e.output.stderr.trim_end())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    StepReport::new(step, StepStatus::Succeeded)
        .with_command(command)
        .with_output(stdout, stderr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DjangoVersion, ManifestChange};
    use crate::environment::POSIX_ACTIVATE;
    use crate::process::testing::MockRunner;
    use crate::process::CommandOutput;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn settings(root: &Path) -> Settings {
        Settings {
            project_root: root.to_path_buf(),
            django_version: DjangoVersion::new(2, 1),
            python: "python".to_string(),
            python_version: None,
            venv: VenvMode::Create,
            venv_path: "venv/".to_string(),
            requirements: "requirements.txt".to_string(),
            project_name: "mysite".to_string(),
            dry_run: false,
            skip_install: false,
            skip_bootstrap: false,
        }
    }

    fn create_activate_script(root: &Path) {
        let path = root.join("venv").join(POSIX_ACTIVATE);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn statuses(report: &RunReport) -> Vec<&'static str> {
        report.steps.iter().map(|s| s.status.label()).collect()
    }

    #[test]
    fn test_existing_venv_full_run() {
        let temp_dir = TempDir::new().unwrap();
        create_activate_script(temp_dir.path());

        let mut settings = settings(temp_dir.path());
        settings.venv = VenvMode::Existing;
        let runner = MockRunner::new();

        let report = Orchestrator::new(settings, &runner).run();

        assert!(report.is_success());
        assert_eq!(
            statuses(&report),
            vec!["ok", "skipped", "skipped", "ok", "ok", "ok"]
        );
        assert_eq!(report.manifest_change, Some(ManifestChange::Created));
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("requirements.txt")).unwrap(),
            "Django~=2.1\n"
        );

        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].contains("pip install -r requirements.txt"));
        assert!(calls[1].contains("django-admin startproject mysite ."));
        assert!(calls.iter().all(|c| c.starts_with("sh -c")));
        assert!(report.finished_at.is_some());
    }

    #[test]
    fn test_create_venv_with_python3() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_path_buf();
        let runner = MockRunner::new().respond("python -c", CommandOutput::success("3.8.10"));

        // The mock creates no files, so activation cannot be resolved afterwards
        let report = Orchestrator::new(settings(&root), &runner).run();

        assert!(runner.called("python -m venv venv/"));
        assert_eq!(report.failed_step().unwrap().step, Step::ResolveActivation);
        assert_eq!(
            report.get(Step::InstallDependencies).unwrap().status,
            StepStatus::NotRun
        );
        assert!(!runner.called("pip install"));
        assert!(!runner.called("startproject"));
    }

    #[test]
    fn test_create_skipped_when_venv_exists() {
        let temp_dir = TempDir::new().unwrap();
        create_activate_script(temp_dir.path());
        let runner = MockRunner::new();

        let report = Orchestrator::new(settings(temp_dir.path()), &runner).run();

        assert!(report.is_success());
        assert!(matches!(
            report.get(Step::CreateVenv).unwrap().status,
            StepStatus::Skipped { .. }
        ));
        assert!(matches!(
            report.get(Step::DetectPython).unwrap().status,
            StepStatus::Skipped { .. }
        ));
        assert!(!runner.called("-m venv"));
    }

    #[test]
    fn test_python2_uses_virtualenv() {
        let temp_dir = TempDir::new().unwrap();
        let runner = MockRunner::new().respond("python -c", CommandOutput::success("2.7.18"));

        Orchestrator::new(settings(temp_dir.path()), &runner).run();

        let calls = runner.calls();
        assert!(calls.iter().any(|c| c == "python -m pip install virtualenv"));
        assert!(calls.iter().any(|c| c == "python -m virtualenv venv/"));
        assert!(!runner.called("-m venv"));
    }

    #[test]
    fn test_failed_detection_stops_pipeline() {
        let temp_dir = TempDir::new().unwrap();
        let runner = MockRunner::new().spawn_error("python -c");

        let report = Orchestrator::new(settings(temp_dir.path()), &runner).run();

        assert_eq!(report.failed_step().unwrap().step, Step::DetectPython);
        assert_eq!(
            statuses(&report),
            vec!["ok", "failed", "not run", "not run", "not run", "not run"]
        );
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn test_failed_install_stops_before_bootstrap() {
        let temp_dir = TempDir::new().unwrap();
        create_activate_script(temp_dir.path());
        let runner = MockRunner::new().respond(
            "pip install",
            CommandOutput::failure(1, "Could not find a version that satisfies Django~=2.1"),
        );

        let report = Orchestrator::new(settings(temp_dir.path()), &runner).run();

        let failed = report.failed_step().unwrap();
        assert_eq!(failed.step, Step::InstallDependencies);
        assert!(matches!(&failed.status, StepStatus::Failed { error } if error.contains("Could not find")));
        assert!(!runner.called("startproject"));
    }

    #[test]
    fn test_manifest_failure_runs_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let mut settings = settings(temp_dir.path());
        // A directory where the requirements file should be
        settings.requirements = "reqs".to_string();
        fs::create_dir(temp_dir.path().join("reqs")).unwrap();
        let runner = MockRunner::new();

        let report = Orchestrator::new(settings, &runner).run();

        assert_eq!(report.failed_step().unwrap().step, Step::UpdateManifest);
        assert!(runner.calls().is_empty());
        assert_eq!(report.steps.len(), Step::all().len());
    }

    #[test]
    fn test_disabled_venv_runs_plain_commands() {
        let temp_dir = TempDir::new().unwrap();
        let mut settings = settings(temp_dir.path());
        settings.venv = VenvMode::Disabled;
        settings.python_version = Some(crate::domain::PythonMajor::Three);
        let runner = MockRunner::new()
            .respond("python3 -c", CommandOutput::success("3.11.2"))
            .respond("python -c", CommandOutput::success("2.7.18"));

        let report = Orchestrator::new(settings, &runner).run();

        assert!(report.is_success());
        assert!(runner.called("python3 -m pip install -r requirements.txt"));
        assert!(runner.called("django-admin startproject mysite ."));
        assert!(!runner.called("sh -c"));
    }

    #[test]
    fn test_bootstrap_skipped_when_manage_py_exists() {
        let temp_dir = TempDir::new().unwrap();
        create_activate_script(temp_dir.path());
        fs::write(temp_dir.path().join(MANAGE_PY), "").unwrap();
        let runner = MockRunner::new();

        let report = Orchestrator::new(settings(temp_dir.path()), &runner).run();

        assert!(report.is_success());
        assert!(matches!(
            report.get(Step::BootstrapProject).unwrap().status,
            StepStatus::Skipped { .. }
        ));
        assert!(!runner.called("startproject"));
    }

    #[test]
    fn test_skip_flags() {
        let temp_dir = TempDir::new().unwrap();
        create_activate_script(temp_dir.path());
        let mut settings = settings(temp_dir.path());
        settings.skip_install = true;
        settings.skip_bootstrap = true;
        let runner = MockRunner::new();

        let report = Orchestrator::new(settings, &runner).run();

        assert!(report.is_success());
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_dry_run_executes_only_version_query() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("requirements.txt"), "django==1.8\n").unwrap();
        let mut settings = settings(temp_dir.path());
        settings.dry_run = true;
        let runner = MockRunner::new().respond("python -c", CommandOutput::success("3.10.0"));

        let report = Orchestrator::new(settings, &runner).run();

        assert!(report.is_success());
        assert!(report.dry_run);
        assert_eq!(runner.calls().len(), 1);
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("requirements.txt")).unwrap(),
            "django==1.8\n"
        );
        assert!(!temp_dir.path().join("venv").exists());
        let activation = report.get(Step::ResolveActivation).unwrap();
        assert!(activation.detail.as_deref().unwrap().contains("(predicted)"));
        assert!(matches!(
            report.manifest_change,
            Some(ManifestChange::Replaced { .. })
        ));
    }

    #[test]
    fn test_dry_run_existing_mode_requires_real_venv() {
        let temp_dir = TempDir::new().unwrap();
        let mut settings = settings(temp_dir.path());
        settings.venv = VenvMode::Existing;
        settings.dry_run = true;
        let runner = MockRunner::new();

        let report = Orchestrator::new(settings, &runner).run();

        let failed = report.failed_step().unwrap();
        assert_eq!(failed.step, Step::ResolveActivation);
        assert!(matches!(&failed.status, StepStatus::Failed { error } if error.contains("no activation script")));
        assert_eq!(
            report.get(Step::InstallDependencies).unwrap().status,
            StepStatus::NotRun
        );
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_dry_run_existing_mode_with_venv() {
        let temp_dir = TempDir::new().unwrap();
        create_activate_script(temp_dir.path());
        let mut settings = settings(temp_dir.path());
        settings.venv = VenvMode::Existing;
        settings.dry_run = true;
        let runner = MockRunner::new();

        let report = Orchestrator::new(settings, &runner).run();

        assert!(report.is_success());
        let activation = report.get(Step::ResolveActivation).unwrap();
        assert!(!activation.detail.as_deref().unwrap().contains("(predicted)"));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_failed_steps_record_attempted_command() {
        let temp_dir = TempDir::new().unwrap();
        create_activate_script(temp_dir.path());
        let runner = MockRunner::new().respond("pip install", CommandOutput::failure(1, "offline"));

        let report = Orchestrator::new(settings(temp_dir.path()), &runner).run();

        let failed = report.failed_step().unwrap();
        assert_eq!(failed.step, Step::InstallDependencies);
        let command = failed.command.as_deref().unwrap();
        assert!(command.contains("pip install -r requirements.txt"));
        assert!(command.contains("activate"));
    }

    #[test]
    fn test_failed_venv_creation_records_command() {
        let temp_dir = TempDir::new().unwrap();
        let runner = MockRunner::new()
            .respond("python -c", CommandOutput::success("3.8.10"))
            .respond("-m venv", CommandOutput::failure(1, "ensurepip is not available"));

        let report = Orchestrator::new(settings(temp_dir.path()), &runner).run();

        let failed = report.failed_step().unwrap();
        assert_eq!(failed.step, Step::CreateVenv);
        assert_eq!(failed.command.as_deref(), Some("python -m venv venv/"));
        assert!(matches!(&failed.status, StepStatus::Failed { error } if error.contains("ensurepip")));
    }

    #[test]
    fn test_failed_detection_records_version_query() {
        let temp_dir = TempDir::new().unwrap();
        let runner = MockRunner::new().spawn_error("python -c");

        let report = Orchestrator::new(settings(temp_dir.path()), &runner).run();

        let failed = report.failed_step().unwrap();
        assert!(failed.command.as_deref().unwrap().starts_with("python -c"));
    }

    #[test]
    fn test_missing_interpreter_fails_venv_creation() {
        let temp_dir = TempDir::new().unwrap();
        let mut report = RunReport::new(temp_dir.path(), false);
        let runner = MockRunner::new();
        let orchestrator = Orchestrator::new(settings(temp_dir.path()), &runner);

        let outcome = orchestrator.create_venv(&mut report, None);

        assert!(matches!(outcome, Err(StepFailed(Step::CreateVenv))));
        let failed = report.failed_step().unwrap();
        assert!(matches!(&failed.status, StepStatus::Failed { error } if error.contains("no Python interpreter")));
        assert!(failed.command.is_none());
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_executed_report_joins_commands() {
        use crate::process::CommandSpec;

        let executed = vec![
            Executed {
                command: CommandSpec::new("a"),
                output: CommandOutput::success("one\n"),
            },
            Executed {
                command: CommandSpec::new("b"),
                output: CommandOutput::success(""),
            },
        ];
        let report = executed_report(Step::CreateVenv, &executed);

        assert_eq!(report.command.as_deref(), Some("a && b"));
        assert_eq!(report.stdout, "one");
        assert!(report.stderr.is_empty());
    }
}
