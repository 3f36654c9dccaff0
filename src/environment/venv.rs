//! Virtual environment creation

use super::Interpreter;
use crate::error::EnvironmentError;
use crate::process::{execute, CommandRunner, CommandSpec, Executed};
use std::path::Path;

/// Normalize a venv location to forward slashes with a single trailing `/`
pub fn normalize_venv_path(input: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    let replaced = input.trim().replace('\\', "/");
    let absolute = replaced.starts_with('/');

    for part in replaced.split('/') {
        match part {
            "" | "." => {}
            ".." if parts.last().is_some_and(|p| *p != "..") => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }

    let mut out = if absolute { "/".to_string() } else { String::new() };
    if parts.is_empty() {
        if !absolute {
            out.push_str("./");
        }
        return out;
    }

    out.push_str(&parts.join("/"));
    out.push('/');
    out
}

/// Commands that create a venv at `venv_path` with `interpreter`
///
/// Python 3 uses the built-in `venv` module. Python 2 first installs
/// `virtualenv` with pip and then runs it.
pub fn creation_commands(interpreter: &Interpreter, venv_path: &str) -> Vec<CommandSpec> {
    let python = interpreter.command.as_str();
    if interpreter.major.has_builtin_venv() {
        vec![CommandSpec::new(python).args(["-m", "venv", venv_path])]
    } else {
        vec![
            CommandSpec::new(python).args(["-m", "pip", "install", "virtualenv"]),
            CommandSpec::new(python).args(["-m", "virtualenv", venv_path]),
        ]
    }
}

/// Create the venv, stopping at the first failing command
pub fn create_venv(
    runner: &dyn CommandRunner,
    interpreter: &Interpreter,
    venv_path: &str,
    working_dir: &Path,
) -> Result<Vec<Executed>, EnvironmentError> {
    let mut executed = Vec::new();
    for command in creation_commands(interpreter, venv_path) {
        tracing::info!(command = %command, "creating virtual environment");
        executed.push(execute(runner, command, working_dir)?);
    }
    Ok(executed)
}
