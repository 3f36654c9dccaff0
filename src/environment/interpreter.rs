//! Python interpreter detection

use crate::domain::PythonMajor;
use crate::error::EnvironmentError;
use crate::process::{execute, CommandRunner, CommandSpec};
use std::path::Path;

/// Snippet that prints the full interpreter version, e.g. `3.11.4`
const VERSION_SNIPPET: &str = "import platform; print(platform.python_version())";

/// A resolved interpreter command and its version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreter {
    /// Command used to invoke the interpreter
    pub command: String,
    /// Major version line
    pub major: PythonMajor,
    /// Full version string as printed by the interpreter
    pub version: String,
}

/// Build the version query for `python`
pub fn version_query(python: &str) -> CommandSpec {
    CommandSpec::new(python).args(["-c", VERSION_SNIPPET])
}

/// Parse the major version from interpreter output such as `3.11.4` or `Python 2.7.18`
pub fn parse_major(output: &str) -> Result<u32, EnvironmentError> {
    let trimmed = output.trim();
    let version = trimmed.strip_prefix("Python ").unwrap_or(trimmed).trim();

    version
        .split('.')
        .next()
        .and_then(|major| major.parse::<u32>().ok())
        .ok_or_else(|| EnvironmentError::unparseable_version(trimmed))
}

/// Run `python` and determine its version
pub fn detect_interpreter(
    runner: &dyn CommandRunner,
    python: &str,
    working_dir: &Path,
) -> Result<Interpreter, EnvironmentError> {
    let executed = execute(runner, version_query(python), working_dir)?;
    let version = executed.output.stdout.trim().to_string();
    let major = PythonMajor::from_major(parse_major(&version)?)?;

    tracing::debug!(python, %version, "detected interpreter");

    Ok(Interpreter {
        command: python.to_string(),
        major,
        version,
    })
}

/// Pick the interpreter to use
///
/// Without an explicit major version the configured command is used as is.
/// With one, a mismatching command is retried as `python<major>`.
pub fn resolve_interpreter(
    runner: &dyn CommandRunner,
    python: &str,
    requested: Option<PythonMajor>,
    working_dir: &Path,
) -> Result<Interpreter, EnvironmentError> {
    let detected = detect_interpreter(runner, python, working_dir);

    let Some(requested) = requested else {
        return detected;
    };

    let primary_error = match detected {
        Ok(interpreter) if interpreter.major == requested => return Ok(interpreter),
        Ok(interpreter) => EnvironmentError::InterpreterMismatch {
            command: python.to_string(),
            requested: requested.number(),
            found: interpreter.major.number(),
        },
        Err(e) => e,
    };

    let fallback = requested.versioned_command();
    if fallback != python {
        tracing::info!(
            python,
            %fallback,
            "configured interpreter is not Python {}, trying fallback",
            requested
        );
        if let Ok(interpreter) = detect_interpreter(runner, &fallback, working_dir) {
            if interpreter.major == requested {
                return Ok(interpreter);
            }
        }
    }

    Err(primary_error)
}
