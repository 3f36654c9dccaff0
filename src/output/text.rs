//! Text output formatter for human-readable display
//!
//! This module provides:
//! - One line per pipeline step with a status marker
//! - Executed commands and captured output in verbose mode
//! - A closing summary line

use crate::domain::{RunReport, StepReport, StepStatus};
use crate::output::{OutputFormatter, Verbosity};
use colored::Colorize;
use std::io::Write;

/// Width of the step name column
const NAME_WIDTH: usize = 28;

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether this is a dry-run
    dry_run: bool,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity, dry_run: bool) -> Self {
        Self {
            verbosity,
            dry_run,
            color: true,
        }
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, dry_run: bool, color: bool) -> Self {
        Self {
            verbosity,
            dry_run,
            color,
        }
    }

    /// Get the dry-run prefix if applicable
    fn dry_run_prefix(&self) -> String {
        if self.dry_run {
            if self.color {
                format!("{} ", "(dry-run)".cyan())
            } else {
                "(dry-run) ".to_string()
            }
        } else {
            String::new()
        }
    }

    /// Status marker shown in front of the step name
    fn marker(&self, status: &StepStatus) -> String {
        if self.color {
            match status {
                StepStatus::Succeeded => "✓".green().to_string(),
                StepStatus::Skipped { .. } => "-".dimmed().to_string(),
                StepStatus::Failed { .. } => "✗".red().bold().to_string(),
                StepStatus::NotRun => "·".dimmed().to_string(),
            }
        } else {
            format!("[{}]", status.label())
        }
    }

    /// Text after the step name
    fn status_text(&self, step: &StepReport) -> String {
        let text = match (&step.status, &step.detail) {
            (StepStatus::Succeeded, Some(detail)) => detail.clone(),
            (StepStatus::Succeeded, None) => String::new(),
            (StepStatus::Skipped { reason }, _) => format!("skipped: {}", reason),
            (StepStatus::Failed { error }, _) => error.clone(),
            (StepStatus::NotRun, _) => "not run".to_string(),
        };

        if !self.color {
            return text;
        }
        match step.status {
            StepStatus::Succeeded => text,
            StepStatus::Failed { .. } => text.red().to_string(),
            StepStatus::Skipped { .. } | StepStatus::NotRun => text.dimmed().to_string(),
        }
    }

    /// Format a single step line, plus command and output in verbose mode
    fn format_step(&self, step: &StepReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let name = format!("{:width$}", step.step.display_name(), width = NAME_WIDTH);
        let name = if self.color && step.status == StepStatus::NotRun {
            name.dimmed().to_string()
        } else {
            name
        };
        writeln!(
            writer,
            "  {} {} {}",
            self.marker(&step.status),
            name,
            self.status_text(step)
        )?;

        if self.verbosity != Verbosity::Verbose {
            return Ok(());
        }

        if let Some(command) = &step.command {
            if self.color {
                writeln!(writer, "      {} {}", "$".dimmed(), command.dimmed())?;
            } else {
                writeln!(writer, "      $ {}", command)?;
            }
        }
        for line in step.stdout.lines().chain(step.stderr.lines()) {
            writeln!(writer, "      {}", line)?;
        }
        Ok(())
    }

    /// Format the closing summary
    fn format_summary(&self, report: &RunReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let prefix = self.dry_run_prefix();

        if let Some(failed) = report.failed_step() {
            let error = match &failed.status {
                StepStatus::Failed { error } => error.as_str(),
                _ => "",
            };
            if self.color {
                writeln!(
                    writer,
                    "{}{} {}: {}",
                    prefix,
                    "Failed at".red().bold(),
                    failed.step.display_name().bold(),
                    error
                )
            } else {
                writeln!(
                    writer,
                    "{}Failed at {}: {}",
                    prefix,
                    failed.step.display_name(),
                    error
                )
            }
        } else {
            let ran = report
                .steps
                .iter()
                .filter(|s| s.status == StepStatus::Succeeded)
                .count();
            let skipped = report
                .steps
                .iter()
                .filter(|s| matches!(s.status, StepStatus::Skipped { .. }))
                .count();
            if self.color {
                writeln!(
                    writer,
                    "{}{} {} step(s) done, {} skipped",
                    prefix,
                    "Done:".green().bold(),
                    ran,
                    skipped
                )
            } else {
                writeln!(
                    writer,
                    "{}Done: {} step(s) done, {} skipped",
                    prefix, ran, skipped
                )
            }
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, report: &RunReport, writer: &mut dyn Write) -> std::io::Result<()> {
        // In quiet mode, only show summary
        if self.verbosity == Verbosity::Quiet {
            return self.format_summary(report, writer);
        }

        let prefix = self.dry_run_prefix();
        let root = report.project_root.display().to_string();
        if self.color {
            writeln!(writer, "{}{} {}", prefix, "Bootstrapping".bold(), root.bold())?;
        } else {
            writeln!(writer, "{}Bootstrapping {}", prefix, root)?;
        }

        for step in &report.steps {
            self.format_step(step, writer)?;
        }

        writeln!(writer)?;
        self.format_summary(report, writer)
    }
}
