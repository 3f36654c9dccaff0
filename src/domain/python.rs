//! Python interpreter and virtual environment selection types

use crate::error::{ConfigError, EnvironmentError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported Python major versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum PythonMajor {
    /// Python 2.x (venvs are created with virtualenv)
    Two,
    /// Python 3.x (venvs are created with the built-in venv module)
    Three,
}

impl PythonMajor {
    /// Maps a numeric major version to a supported variant
    pub fn from_major(major: u32) -> Result<Self, EnvironmentError> {
        match major {
            2 => Ok(PythonMajor::Two),
            3 => Ok(PythonMajor::Three),
            _ => Err(EnvironmentError::UnsupportedVersion { major }),
        }
    }

    /// Returns the numeric major version
    pub fn number(&self) -> u32 {
        match self {
            PythonMajor::Two => 2,
            PythonMajor::Three => 3,
        }
    }

    /// Returns the versioned interpreter command, e.g. `python3`
    pub fn versioned_command(&self) -> String {
        format!("python{}", self.number())
    }

    /// Returns true if the standard library ships a venv module
    pub fn has_builtin_venv(&self) -> bool {
        matches!(self, PythonMajor::Three)
    }
}

impl fmt::Display for PythonMajor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

impl FromStr for PythonMajor {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "2" => Ok(PythonMajor::Two),
            "3" => Ok(PythonMajor::Three),
            other => Err(ConfigError::InvalidPythonVersion {
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<u32> for PythonMajor {
    type Error = ConfigError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        value.to_string().parse()
    }
}

impl From<PythonMajor> for u32 {
    fn from(value: PythonMajor) -> Self {
        value.number()
    }
}

/// How the virtual environment should be handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum VenvMode {
    /// Create a new venv (skipped if one already exists at the path)
    #[default]
    Create,
    /// Use an already existing venv
    Existing,
    /// Do not use a venv; commands run against the configured interpreter
    #[serde(rename = "none")]
    #[value(name = "none")]
    Disabled,
}

impl VenvMode {
    /// Returns true if commands should run inside a venv
    pub fn uses_venv(&self) -> bool {
        !matches!(self, VenvMode::Disabled)
    }
}

impl fmt::Display for VenvMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VenvMode::Create => write!(f, "create"),
            VenvMode::Existing => write!(f, "existing"),
            VenvMode::Disabled => write!(f, "none"),
        }
    }
}
