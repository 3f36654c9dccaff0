//! External process execution
//!
//! This module provides:
//! - A program + arguments command description with shell rendering
//! - The `CommandRunner` seam used by every pipeline step
//! - `SystemRunner`, which executes real processes one at a time

use crate::error::CommandError;
use std::fmt;
use std::path::Path;
use std::process::Command;

/// A program invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
    raw: bool,
}

impl CommandSpec {
    /// Create a command for `program` with no arguments
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            raw: false,
        }
    }

    /// Pass the arguments verbatim, already quoted for the program's own parser
    ///
    /// On Windows they skip the C runtime quoting `Command::args` applies.
    pub fn raw(mut self) -> Self {
        self.raw = true;
        self
    }

    /// Whether the arguments are passed verbatim
    pub fn is_raw(&self) -> bool {
        self.raw
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The program name
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The arguments
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Render as a POSIX shell command line
    pub fn to_posix_line(&self) -> String {
        self.render(posix_quote)
    }

    /// Render as a Windows `cmd` command line
    pub fn to_windows_line(&self) -> String {
        self.render(windows_quote)
    }

    fn render(&self, quote: fn(&str) -> String) -> String {
        std::iter::once(quote(&self.program))
            .chain(self.args.iter().map(|arg| {
                if self.raw {
                    arg.clone()
                } else {
                    quote(arg)
                }
            }))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_posix_line())
    }
}

fn is_word_safe(s: &str, extra: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=~+,@%".contains(c) || extra.contains(c))
}

/// Quote a word for a POSIX shell, using single quotes when needed
pub fn posix_quote(s: &str) -> String {
    if is_word_safe(s, "") {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', r"'\''"))
    }
}

/// Quote a word for `cmd.exe`, using double quotes when needed
pub fn windows_quote(s: &str) -> String {
    if is_word_safe(s, "\\") {
        s.to_string()
    } else {
        format!("\"{}\"", s.replace('"', "\"\""))
    }
}

/// Captured result of a finished process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Whether the process exited successfully
    pub success: bool,
    /// Exit code, `None` when terminated by a signal
    pub code: Option<i32>,
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
}

impl CommandOutput {
    /// Create a successful output
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Create a failed output
    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Convert an unsuccessful exit into a `CommandError::Failed`
    pub fn check(self, command: &CommandSpec) -> Result<CommandOutput, CommandError> {
        if self.success {
            Ok(self)
        } else {
            Err(CommandError::failed(
                command.to_string(),
                self.code,
                self.stderr.trim(),
            ))
        }
    }
}

/// Trait for running external commands
///
/// `Err` means the process could not be spawned; a non-zero exit is reported
/// through `CommandOutput::success`.
pub trait CommandRunner {
    /// Run `command` in `working_dir` and wait for it to finish
    fn run(&self, command: &CommandSpec, working_dir: &Path) -> Result<CommandOutput, CommandError>;
}

/// Runner that executes real processes
#[derive(Debug, Default)]
pub struct SystemRunner;

impl SystemRunner {
    /// Create a new system runner
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, command: &CommandSpec, working_dir: &Path) -> Result<CommandOutput, CommandError> {
        tracing::debug!(command = %command, cwd = %working_dir.display(), "running");

        let mut cmd = Command::new(command.program());
        cmd.current_dir(working_dir);
        add_arguments(&mut cmd, command);

        let output = cmd
            .output()
            .map_err(|e| CommandError::spawn_failed(command.to_string(), e))?;

        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

#[cfg(windows)]
fn add_arguments(cmd: &mut Command, command: &CommandSpec) {
    use std::os::windows::process::CommandExt;

    if command.is_raw() {
        for arg in command.arguments() {
            cmd.raw_arg(arg);
        }
    } else {
        cmd.args(command.arguments());
    }
}

#[cfg(not(windows))]
fn add_arguments(cmd: &mut Command, command: &CommandSpec) {
    cmd.args(command.arguments());
}

/// Runner used in dry-run mode: logs the command and reports success
#[derive(Debug, Default)]
pub struct DryRunRunner;

impl DryRunRunner {
    /// Create a new dry-run runner
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for DryRunRunner {
    fn run(&self, command: &CommandSpec, working_dir: &Path) -> Result<CommandOutput, CommandError> {
        tracing::info!(command = %command, cwd = %working_dir.display(), "dry-run: would run");
        Ok(CommandOutput::success(""))
    }
}

/// A command together with its successful output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Executed {
    /// What was run
    pub command: CommandSpec,
    /// What it printed
    pub output: CommandOutput,
}

/// Run `command` and turn a non-zero exit into an error
pub fn execute(
    runner: &dyn CommandRunner,
    command: CommandSpec,
    working_dir: &Path,
) -> Result<Executed, CommandError> {
    let output = runner.run(&command, working_dir)?.check(&command)?;
    Ok(Executed { command, output })
}
