//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ManifestError: Issues reading or writing requirements.txt
//! - CommandError: External process spawn or exit failures
//! - EnvironmentError: Interpreter and virtual environment problems
//! - ConfigError: Issues with CLI or settings file configuration

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
///
/// Every failed pipeline step is recorded and logged through this type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Manifest file related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// External command related errors
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Interpreter / venv related errors
    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors related to manifest file operations
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Failed to read manifest file
    #[error("failed to read manifest file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write manifest file
    #[error("failed to write manifest file {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to running external commands
#[derive(Error, Debug)]
pub enum CommandError {
    /// The process could not be started at all
    #[error("failed to execute '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The process ran but exited unsuccessfully
    #[error("'{command}' exited with {}: {stderr}", describe_exit(.code))]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// Errors related to the Python interpreter and virtual environment
#[derive(Error, Debug)]
pub enum EnvironmentError {
    /// Interpreter printed something that is not a version
    #[error("could not parse Python version from '{output}'")]
    UnparseableVersion { output: String },

    /// Interpreter major version is neither 2 nor 3
    #[error("unsupported Python major version {major}")]
    UnsupportedVersion { major: u32 },

    /// Neither the configured command nor its fallback has the requested version
    #[error("'{command}' is Python {found}, but Python {requested} was requested")]
    InterpreterMismatch {
        command: String,
        requested: u32,
        found: u32,
    },

    /// A venv has to be created but no interpreter was resolved
    #[error("no Python interpreter was resolved for venv creation")]
    NoInterpreter,

    /// No activation script in the venv
    #[error("no activation script found in virtual environment {venv_path}")]
    ActivationNotFound { venv_path: PathBuf },

    /// Underlying command failure
    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Django version is not major.minor
    #[error("invalid Django version '{value}': expected major.minor such as '1.11' or '2.1'")]
    InvalidDjangoVersion { value: String },

    /// Python version is not 2 or 3
    #[error("invalid Python version '{value}': expected '2' or '3'")]
    InvalidPythonVersion { value: String },

    /// Project name is not a Python identifier
    #[error("invalid project name '{value}': must be a valid Python identifier")]
    InvalidProjectName { value: String },

    /// Settings file could not be read
    #[error("failed to read settings file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Settings file is not valid TOML for our schema
    #[error("failed to parse settings file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    /// Invalid path
    #[error("invalid path '{path}': {message}")]
    InvalidPath { path: PathBuf, message: String },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "signal".to_string(),
    }
}

impl ManifestError {
    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new WriteError
    pub fn write_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::WriteError {
            path: path.into(),
            source,
        }
    }
}

impl CommandError {
    /// Creates a new SpawnFailed error
    pub fn spawn_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        CommandError::SpawnFailed {
            command: command.into(),
            source,
        }
    }

    /// Creates a new Failed error
    pub fn failed(command: impl Into<String>, code: Option<i32>, stderr: impl Into<String>) -> Self {
        CommandError::Failed {
            command: command.into(),
            code,
            stderr: stderr.into(),
        }
    }
}

impl EnvironmentError {
    /// Creates a new UnparseableVersion error
    pub fn unparseable_version(output: impl Into<String>) -> Self {
        EnvironmentError::UnparseableVersion {
            output: output.into(),
        }
    }

    /// Creates a new ActivationNotFound error
    pub fn activation_not_found(venv_path: impl Into<PathBuf>) -> Self {
        EnvironmentError::ActivationNotFound {
            venv_path: venv_path.into(),
        }
    }
}

impl ConfigError {
    /// Creates a new ParseError
    pub fn parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ConfigError::ParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidPath error
    pub fn invalid_path(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ConfigError::InvalidPath {
            path: path.into(),
            message: message.into(),
        }
    }
}
